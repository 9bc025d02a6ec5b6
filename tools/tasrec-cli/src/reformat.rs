//! Load a TAS file and write it back in canonical form

use std::path::PathBuf;

use anyhow::{Context, Result};
use tasrec_core::{TasConfig, TasContext, TickSequence, format};

pub fn execute(input: PathBuf, output: PathBuf, flavor: Option<String>, config: TasConfig) -> Result<()> {
    let mut ctx = TasContext::new(config);
    let sequence = format::load_file(&mut ctx, &input, None)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    format::save_file(&ctx, &sequence, &output, flavor.as_deref())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Wrote {} ticks from {} to {}",
        sequence.len(),
        input.display(),
        output.display()
    );
    Ok(())
}

//! Parse a TAS file without playing it

use std::path::PathBuf;

use anyhow::{Context, Result};
use tasrec_core::extensions::{DesyncMonitorExtension, LabelExtension, label};
use tasrec_core::{TasConfig, TasContext, TickSequence, format};

/// Validate a TAS file and print what it contains
pub fn execute(file: PathBuf, flavor: Option<String>, config: TasConfig) -> Result<()> {
    println!("Validating: {}", file.display());

    let mut ctx = TasContext::new(config);
    let sequence = format::load_file(&mut ctx, &file, flavor.as_deref())
        .with_context(|| format!("Failed to load {}", file.display()))?;

    let data_lines: usize = sequence.iter().map(|t| t.subtick_count()).sum();
    let split_ticks = sequence.iter().filter(|t| t.subtick_count() > 1).count();
    let comments: usize = sequence
        .iter()
        .map(|t| t.comments.inline().len() + t.comments.endline().iter().flatten().count())
        .sum();

    println!();
    println!("=== File Valid ===");
    println!("Ticks: {}", sequence.len());
    println!("Data lines: {}", data_lines);
    println!("Ticks with subticks: {}", split_ticks);
    println!("Comments: {}", comments);

    let enabled = ctx.file_commands.enabled_names();
    if enabled.is_empty() {
        println!("File commands: (none)");
    } else {
        println!("File commands: {}", enabled.join(", "));
    }

    if let Some(labels) = ctx.file_commands.get::<LabelExtension>()
        && ctx.file_commands.is_enabled(label::NAME)
    {
        println!("Labels: {}", labels.labels().count());
    }
    if let Some(monitor) = ctx.file_commands.get::<DesyncMonitorExtension>() {
        let samples = (0..sequence.len())
            .filter(|&tick| monitor.sample(tick).is_some())
            .count();
        if samples > 0 {
            println!("Desync samples: {}", samples);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mctas");
        std::fs::write(&path, "Flavor: beta1\n0|;|;0,0,0|;\n").unwrap();
        assert!(execute(path, None, TasConfig::default()).is_err());
    }

    #[test]
    fn test_accepts_saved_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.mctas");
        let ctx = TasContext::new(TasConfig::default());
        let sequence = tasrec_core::MemorySequence::from(vec![tasrec_core::TickContainer::new(); 3]);
        format::save_file(&ctx, &sequence, &path, None).unwrap();
        execute(path, None, TasConfig::default()).unwrap();
    }
}

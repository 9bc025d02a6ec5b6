//! Show a TAS file's header

use std::path::PathBuf;

use anyhow::{Context, Result};
use tasrec_core::extensions::credits::format_playing_time;
use tasrec_core::extensions::{Credits, StartPosition};
use tasrec_core::{TasConfig, TasContext, TickSequence, format};

pub fn execute(file: PathBuf, config: TasConfig) -> Result<()> {
    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let mut ctx = TasContext::new(config);
    let sequence = format::deserialise(&mut ctx, &text, None)
        .with_context(|| format!("Failed to load {}", file.display()))?;

    let lines: Vec<&str> = text.lines().collect();
    println!("File: {}", file.display());
    println!(
        "Flavor: {}",
        format::detect_flavor(&lines).unwrap_or_default()
    );
    println!("Ticks: {}", sequence.len());

    if let Some(credits) = ctx.metadata.get::<Credits>() {
        println!();
        println!("Title: {}", credits.title);
        println!("Author: {}", credits.author);
        println!("Playing time: {}", format_playing_time(credits.playing_time));
        println!("Rerecords: {}", credits.rerecords);
    }

    if let Some(start) = ctx.metadata.get::<StartPosition>().and_then(|s| s.position()) {
        println!();
        println!(
            "Start: {} {} {} (pitch {}, yaw {})",
            start.x, start.y, start.z, start.pitch, start.yaw
        );
    }

    println!();
    println!("Registered file commands:");
    for name in ctx.file_commands.all_names() {
        let marker = if ctx.file_commands.is_enabled(&name) { "x" } else { " " };
        println!("  [{}] {}", marker, name);
    }
    Ok(())
}

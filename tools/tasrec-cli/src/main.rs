//! tasrec CLI - inspect and rewrite TAS files
//!
//! # Commands
//!
//! - `tasrec validate <file>` - Parse a file and report what it contains
//! - `tasrec info <file>` - Show the header: flavor, extensions, credits
//! - `tasrec reformat <file> -o <out>` - Load and save again in canonical form
//! - `tasrec config` - Show where the config lives and what it resolves to
//!
//! Paths without an extension get `.mctas`; relative paths are looked up in
//! the configured TAS directory when they do not exist as given.

mod info;
mod reformat;
mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tasrec_core::TasConfig;
use tasrec_core::config;

/// tasrec - TAS file tool
#[derive(Parser)]
#[command(name = "tasrec")]
#[command(about = "Inspect and rewrite sub-tick TAS files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file without playing it
    Validate {
        /// TAS file (.mctas)
        file: PathBuf,

        /// Require this flavor instead of detecting it
        #[arg(long)]
        flavor: Option<String>,
    },

    /// Show the file header
    Info {
        /// TAS file (.mctas)
        file: PathBuf,
    },

    /// Load a file and write it back out
    Reformat {
        /// Input TAS file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Flavor to write (defaults to the configured one)
        #[arg(long)]
        flavor: Option<String>,

        /// Write camera angles as deltas where exact
        #[arg(long)]
        relative_camera: bool,
    },

    /// Show the config file location and effective settings
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load();

    match cli.command {
        Commands::Validate { file, flavor } => {
            validate::execute(locate(&config, &file), flavor, config)
        }
        Commands::Info { file } => info::execute(locate(&config, &file), config),
        Commands::Reformat {
            input,
            output,
            flavor,
            relative_camera,
        } => {
            let input = locate(&config, &input);
            let config = TasConfig {
                relative_camera: relative_camera || config.relative_camera,
                ..config
            };
            reformat::execute(input, output, flavor, config)
        }
        Commands::Config => show_config(&config),
    }
}

/// Use `file` as given when it exists, otherwise resolve it like the recorder
/// resolves names typed by the player
fn locate(config: &TasConfig, file: &Path) -> PathBuf {
    if file.exists() {
        file.to_path_buf()
    } else {
        config::resolve_path(config, &file.to_string_lossy())
    }
}

fn show_config(config: &TasConfig) -> Result<()> {
    match config::config_dir() {
        Some(dir) => println!("Config directory: {}", dir.display()),
        None => println!("Config directory: (unavailable)"),
    }
    println!("TAS directory: {}", config::tas_dir(config).display());
    println!();
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

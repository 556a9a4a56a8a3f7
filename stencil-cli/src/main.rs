//! Stencil — render a template tree into multiple target directories.
//!
//! # Usage
//!
//! ```text
//! stencil [--config stencil.yaml] render [--target <name>]... [--json]
//! stencil [--config stencil.yaml] targets [--json]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{render::RenderArgs, targets::TargetsArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "stencil",
    version,
    about = "Render a template directory tree into per-target output directories",
    long_about = None,
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, default_value = "stencil.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the template tree into every (or the selected) target.
    Render(RenderArgs),

    /// List configured targets and their output directories.
    Targets(TargetsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => args.run(&cli.config),
        Commands::Targets(args) => args.run(&cli.config),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

//! Development tasks for the battle engine
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::{InspectStage, Simulate};

/// Development tasks for the battle engine
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for the battle engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run a stage headless and print the outcome
    Simulate(Simulate),

    /// Validate a stage file and describe its layout
    InspectStage(InspectStage),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Simulate(cmd) => cmd.execute(),
        Command::InspectStage(cmd) => cmd.execute(),
    }
}

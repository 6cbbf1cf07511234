//! Run a stage headless
//!
//! Loads a stage (and optionally a config), replays its attack schedule and
//! prints who is left standing together with the final state digest. Two
//! runs with the same inputs must print the same digest.

use std::path::PathBuf;

use anyhow::{Context, Result};
use battle_content::{ConfigLoader, Scenario, ScenarioOutcome, StageLoader, Survivor};
use battle_core::{BattleConfig, Team};
use clap::Parser;
use console::style;
use serde::Serialize;

use crate::logging;

/// Run a stage headless and print the outcome
#[derive(Parser)]
pub struct Simulate {
    /// Stage file (RON)
    #[arg(short, long, value_name = "FILE")]
    stage: PathBuf,

    /// Battle config (TOML). Defaults apply when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the config's RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many frames even if attacks are still in flight
    #[arg(long, default_value_t = 3600)]
    frames: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,

    /// Write engine logs to this directory instead of stderr
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Survivors, winner and digest
    Summary,
    /// Full JSON output
    Json,
}

#[derive(Serialize)]
struct Report<'a> {
    stage: &'a str,
    frames: u64,
    finished: bool,
    winner: Option<Team>,
    survivors: &'a [Survivor],
    digest: String,
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        let _guard = logging::init(self.log_dir.as_deref())?;

        let mut config = match &self.config {
            Some(path) => ConfigLoader::load(path)?,
            None => BattleConfig::new(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        let stage = StageLoader::load(&self.stage)?;
        let mut scenario = Scenario::from_stage(&stage, config)
            .with_context(|| format!("Failed to build stage: {}", self.stage.display()))?;
        let outcome = scenario.run(self.frames);

        match self.format {
            OutputFormat::Summary => print_summary(&stage.name, &outcome),
            OutputFormat::Json => print_json(&stage.name, &outcome)?,
        }

        Ok(())
    }
}

fn print_summary(stage: &str, outcome: &ScenarioOutcome) {
    println!("{} {}", style("Stage:").bold().cyan(), stage);
    println!("{} {}", style("Frames:").bold().cyan(), outcome.frames);
    if !outcome.finished {
        println!(
            "{}",
            style("Frame limit reached before the schedule finished").yellow()
        );
    }
    println!();

    println!("{}", style("Survivors:").bold().yellow());
    if outcome.survivors.is_empty() {
        println!("  (none)");
    }
    for survivor in &outcome.survivors {
        let position = survivor
            .position
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} {} [{}] HP {} at {}",
            survivor.id, survivor.name, survivor.team, survivor.health, position
        );
    }
    println!();

    match outcome.winner {
        Some(team) => println!("{} {}", style("Winner:").bold().green(), team),
        None => println!("{} undecided", style("Winner:").bold().green()),
    }
    println!(
        "{} {}",
        style("Digest:").bold().cyan(),
        hex::encode(outcome.digest)
    );
}

fn print_json(stage: &str, outcome: &ScenarioOutcome) -> Result<()> {
    let report = Report {
        stage,
        frames: outcome.frames,
        finished: outcome.finished,
        winner: outcome.winner,
        survivors: &outcome.survivors,
        digest: hex::encode(outcome.digest),
    };
    let json =
        serde_json::to_string_pretty(&report).context("Failed to serialize outcome to JSON")?;
    println!("{}", json);
    Ok(())
}

//! Validate and describe a stage file
//!
//! Parses the stage, builds it against a config and prints the resulting
//! grid, so layout mistakes show up before a simulation is run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use battle_content::{ConfigLoader, StageBuilder, StageLoader};
use battle_core::{BattleConfig, EntityKind, Field, Team, TileState};
use clap::Parser;
use console::style;

/// Validate a stage file and describe its layout
#[derive(Parser)]
pub struct InspectStage {
    /// Stage file (RON)
    #[arg(value_name = "STAGE")]
    stage: PathBuf,

    /// Battle config (TOML). Defaults apply when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl InspectStage {
    pub fn execute(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => ConfigLoader::load(path)?,
            None => BattleConfig::new(),
        };
        let stage = StageLoader::load(&self.stage)?;
        let field = StageBuilder::build(&stage, config)
            .with_context(|| format!("Failed to build stage: {}", self.stage.display()))?;

        println!(
            "{} {} ({}x{})",
            style("Stage:").bold().cyan(),
            stage.name,
            field.width(),
            field.height()
        );
        println!(
            "{} {}",
            style("Scheduled attacks:").bold().cyan(),
            stage.attacks.len()
        );
        println!();

        println!("{}", style("Grid:").bold().yellow());
        print_grid(&field);
        println!();

        println!("{}", style("Entities:").bold().yellow());
        for entity in field.entities() {
            let rules: Vec<&str> = entity.defenses().iter().map(|e| e.rule().name()).collect();
            let position = entity
                .position()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {} {} {} [{}] HP {} at {} defenses: {}",
                entity.id(),
                entity.kind(),
                entity.name(),
                entity.team(),
                entity.health(),
                position,
                if rules.is_empty() {
                    "none".to_string()
                } else {
                    rules.join(", ")
                }
            );
        }

        println!();
        println!("{} stage is valid", style("✓").green().bold());
        Ok(())
    }
}

/// One cell per tile: terrain initial, occupant marker, team color.
fn print_grid(field: &Field) {
    for y in 1..=field.height() {
        let mut row = String::from("  ");
        for x in 1..=field.width() {
            let Some(tile) = field.tile_at(x, y) else {
                continue;
            };
            let occupant = tile
                .characters()
                .iter()
                .filter_map(|id| field.entity(*id))
                .map(|e| match e.kind() {
                    EntityKind::Obstacle => 'O',
                    _ => 'C',
                })
                .next()
                .unwrap_or(' ');
            let cell = format!("{}{}", terrain_symbol(tile.state()), occupant);
            let cell = match tile.team() {
                Team::Red => style(cell).red(),
                Team::Blue => style(cell).blue(),
                Team::Unknown => style(cell).dim(),
            };
            row.push_str(&format!("[{}]", cell));
        }
        println!("{}", row);
    }
}

fn terrain_symbol(state: TileState) -> char {
    match state {
        TileState::Normal => '.',
        TileState::Cracked => 'c',
        TileState::Broken | TileState::Empty => ' ',
        TileState::Poison => 'p',
        TileState::Lava => 'l',
        TileState::Ice => 'i',
        TileState::Grass => 'g',
        TileState::DirectionUp => '^',
        TileState::DirectionDown => 'v',
        TileState::DirectionLeft => '<',
        TileState::DirectionRight => '>',
        TileState::Volcano => 'V',
        TileState::Holy => 'h',
        TileState::Hidden => '#',
    }
}

//! Data-driven battle content: stage descriptions, stock spell behaviors and
//! scripted scenarios.
//!
//! This crate turns files into a ready [`battle_core::Field`]:
//! - Battle configuration (TOML)
//! - Stage layouts with tile overrides, entities and their defenses (RON)
//! - Scheduled attacks replayed frame by frame by a [`Scenario`]
//!
//! The core never reads files; everything here is built on its public API.

pub mod error;
pub mod scenario;
pub mod spells;
pub mod stage;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use error::StageError;
pub use scenario::{Scenario, ScenarioOutcome, Survivor};
pub use spells::Projectile;
pub use stage::{
    AttackKind, DefenseKind, DefenseSpec, EntitySpec, ScheduledAttack, StageBuilder, StageSpec,
    TileOverride,
};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, LoadResult, StageLoader};

//! Tile-based battle simulation: hit properties, defense chains, tiles and the field.
//!
//! `battle-core` owns the rules that decide what happens when an attack lands
//! on a tile. It performs no I/O; hosts drive it by calling
//! [`Field::update`] once per frame and plug in content through
//! [`EntityBehavior`]. Every piece of mutable state is owned by the
//! [`Field`], so two peers fed the same inputs produce the same
//! [`Field::state_digest`].
pub mod audio;
pub mod config;
pub mod defense;
pub mod entity;
pub mod error;
pub mod field;
pub mod hit;
pub mod rng;
pub mod tile;
pub mod types;

pub use audio::{AudioEvent, AudioPriority, AudioSink, SilentAudio};
pub use config::{BattleConfig, HazardTuning, StatusTimings, TileTimings};
pub use defense::{
    DefenseAntiDamage, DefenseAura, DefenseBubbleWrap, DefenseCallback, DefenseChain,
    DefenseEntry, DefenseFrameStateJudge, DefenseGuard, DefenseIndestructable,
    DefenseObstacleBody, DefenseOrder, DefensePriority, DefenseRule, DefenseRuleId,
    DefenseStatusGuard, DefenseSuperArmor, DefenseVirusBody, Trigger, run_defense_check,
};
pub use entity::{
    ActionSequence, Entity, EntityBehavior, EntityKind, Hitbox, Intangibility, MoveKind,
    Movement, SequenceStep, StatusResolution, StatusState,
};
pub use error::{BattleError, ErrorSeverity, FieldError};
pub use field::{Field, SpawnResult, SpawnStatus};
pub use hit::{Drag, Element, HitFlags, HitProperties};
pub use rng::SyncedRng;
pub use tile::{Tile, TileHighlight, TileState};
pub use types::{Direction, EntityId, Position, Team, Tick};

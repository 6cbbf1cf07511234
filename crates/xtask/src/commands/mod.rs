//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod inspect_stage;
mod simulate;

pub use inspect_stage::InspectStage;
pub use simulate::Simulate;

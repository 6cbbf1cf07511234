//! Errors raised while turning a stage description into a field.

use battle_core::{BattleError, ErrorSeverity, FieldError, Position, Team, TileState};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("entity '{name}': unknown defense '{rule}'")]
    UnknownDefense { name: String, rule: String },

    #[error("entity '{name}' is invalid: {reason}")]
    InvalidEntity { name: String, reason: &'static str },

    #[error("tile {position} cannot become {state}")]
    TileRejected { position: Position, state: TileState },

    #[error("tile {position} cannot be handed to {team}")]
    TeamRejected { position: Position, team: Team },
}

impl BattleError for StageError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Field(err) => err.severity(),
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Field(err) => err.error_code(),
            Self::UnknownDefense { .. } => "STAGE_UNKNOWN_DEFENSE",
            Self::InvalidEntity { .. } => "STAGE_INVALID_ENTITY",
            Self::TileRejected { .. } => "STAGE_TILE_REJECTED",
            Self::TeamRejected { .. } => "STAGE_TEAM_REJECTED",
        }
    }
}

//! Common error infrastructure for battle-core.
//!
//! Most engine operations are defensive no-ops: an out-of-range lookup returns
//! `None` and a rejected tile change returns `false`. The typed errors here cover
//! the few operations that can genuinely fail, such as building a field.

use crate::types::Position;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; a different request may succeed.
    Recoverable,

    /// Invalid input that should be rejected without retry.
    Validation,

    /// Unexpected state inconsistency.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all battle errors.
///
/// - Use `#[derive(thiserror::Error)]` for the Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised while constructing or populating a field.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("field dimensions {width}x{height} are invalid (both must be at least 1)")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("position {position} is outside the {width}x{height} field")]
    OutOfBounds {
        position: Position,
        width: i32,
        height: i32,
    },
}

impl BattleError for FieldError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDimensions { .. } => "FIELD_INVALID_DIMENSIONS",
            Self::OutOfBounds { .. } => "FIELD_OUT_OF_BOUNDS",
        }
    }
}

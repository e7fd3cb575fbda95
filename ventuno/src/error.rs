use thiserror::Error;

use crate::game::GamePhase;

/// Everything that can go wrong inside the engine. Shoe exhaustion is absent
/// on purpose: the shoe rebuilds itself and play continues.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{operation} is only allowed in {phase:?} phase")]
    WrongPhase {
        operation: &'static str,
        phase: GamePhase,
    },
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
    #[error("{reason}")]
    Precondition { reason: String },
    #[error("corrupt snapshot: {reason}")]
    CorruptSnapshot { reason: String },
}

impl EngineError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn precondition(reason: impl Into<String>) -> Self {
        EngineError::Precondition {
            reason: reason.into(),
        }
    }

    pub fn corrupt(reason: impl Into<String>) -> Self {
        EngineError::CorruptSnapshot {
            reason: reason.into(),
        }
    }
}

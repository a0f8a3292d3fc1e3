//! Error types.
//!
//! Three families, matching who has to react:
//!
//! - [`ActionError`]: bad action content (unknown type, missing or malformed
//!   parameter, a board that cannot support the action). During a battle
//!   these abort it.
//! - [`EngineError`]: the engine control surface. Illegal moves are
//!   recoverable and never reach the battle log.
//! - [`LogError`]: battle log I/O, format and replay divergence.

use thiserror::Error;

/// Content error raised while constructing or applying an action.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("unknown action type `{0}`")]
    UnknownAction(String),

    #[error("action `{action}` is missing required parameter `{param}`")]
    MissingParam { action: String, param: String },

    #[error("action `{action}` has invalid value `{value}` for parameter `{param}`")]
    InvalidParam {
        action: String,
        param: String,
        value: String,
    },

    #[error("action `{action}` cannot apply to the board: {reason}")]
    InconsistentBoard { action: String, reason: String },
}

impl ActionError {
    /// Shorthand for [`ActionError::InconsistentBoard`].
    pub fn inconsistent(action: &str, reason: impl Into<String>) -> Self {
        Self::InconsistentBoard {
            action: action.to_string(),
            reason: reason.into(),
        }
    }
}

/// Error from the action engine control surface.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Content(#[from] ActionError),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("battle aborted: {0}")]
    Aborted(String),

    #[error("battle is over")]
    BattleOver,
}

/// Error from writing, reading or replaying a battle log.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("battle log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("battle log line is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("board snapshot encoding failed: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("malformed battle log: {0}")]
    Format(String),

    #[error("replay diverged at turn {turn}: expected digest {expected:#018x}, got {actual:#018x}")]
    ReplayDivergence { expected: u64, actual: u64, turn: u32 },

    #[error("replay failed: {0}")]
    Engine(#[from] EngineError),
}

use thiserror::Error;

/// Failure reported by the playback engine boundary.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors surfaced by player control operations.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The operation is not valid in the player's current state.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// The underlying playback engine failed.
    #[error("playback engine failure: {0}")]
    Engine(#[from] EngineError),
}

//! Error types for swarm-engine.

use thiserror::Error;

/// Errors surfaced by the engine.
///
/// Only construction errors abort a run; sink errors during a tick are
/// logged and swallowed by the tick itself.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("sink error: {0}")]
    Sink(#[from] swarm_sink::SinkError),
}

impl From<swarm_core::CoreError> for EngineError {
    fn from(e: swarm_core::CoreError) -> Self {
        EngineError::Config(e.to_string())
    }
}

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

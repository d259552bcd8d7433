//! Core error type.
//!
//! Sub-crates define their own error enums (`SinkError`, `EngineError`) and
//! either wrap `CoreError` as a variant or convert via `From`.

use thiserror::Error;

/// Errors surfaced by `swarm-core` and shared with sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `swarm-core`.
pub type CoreResult<T> = Result<T, CoreError>;

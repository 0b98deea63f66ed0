use logchain_core::SinkError;
use thiserror::Error;

/// Errors surfaced by node operations
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Attaching logger {to} to {from} would create an infinite loop")]
    Cycle { from: String, to: String },

    #[error("Level '{level}' is not installed on '{tag}'")]
    LevelNotInstalled { tag: String, level: String },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Every sink failure collected while forwarding one record
///
/// Dispatch never stops early; all reachable nodes are attempted first.
#[derive(Debug, Error)]
#[error("{} node(s) failed while dispatching", .failures.len())]
pub struct DispatchError {
    pub failures: Vec<SinkFailure>,
}

/// A sink error, unchanged, tagged with the node whose sink raised it
#[derive(Debug, Error)]
#[error("Sink '{tag}' failed: {error}")]
pub struct SinkFailure {
    pub tag: String,
    #[source]
    pub error: SinkError,
}

/// Result type alias for node operations
pub type Result<T> = std::result::Result<T, ChainError>;

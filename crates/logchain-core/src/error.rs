use thiserror::Error;

/// Errors raised by a sink while writing or managing transports
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Unknown level '{level}' for sink '{tag}'")]
    UnknownLevel { tag: String, level: String },

    #[error("Transport already attached: {0}")]
    TransportExists(String),

    #[error("Transport {0} not attached to this instance")]
    TransportNotFound(String),

    #[error("Transport '{transport}' failed: {source}")]
    Transport {
        transport: String,
        #[source]
        source: TransportError,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors specific to individual transports
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Console write error: {0}")]
    Console(String),

    #[error("File write error: {0}")]
    File(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for sink operations
pub type Result<T> = std::result::Result<T, SinkError>;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Structured metadata attached to a record
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A single log call as it travels through the graph
///
/// The same record is handed to every node a call reaches, so all of them
/// observe identical arguments, timestamp included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Time the call was made
    pub timestamp: DateTime<Utc>,

    /// Level name, resolved against each sink's own level table
    pub level: String,

    pub message: String,

    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: Metadata,
}

impl LogRecord {
    /// Create a new record stamped with the current time
    pub fn new(level: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level: level.into(),
            message: message.into(),
            metadata: Metadata::new(),
        }
    }

    /// Replace the metadata map
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add a single metadata field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Notification emitted once per transport that accepted a record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggingEvent {
    /// Tag of the sink (or node) raising the event
    pub tag: String,

    /// Name of the transport that wrote the record
    pub transport: String,

    pub level: String,
    pub message: String,

    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: Metadata,
}

impl LoggingEvent {
    pub fn new(tag: impl Into<String>, transport: impl Into<String>, record: &LogRecord) -> Self {
        Self {
            tag: tag.into(),
            transport: transport.into(),
            level: record.level.clone(),
            message: record.message.clone(),
            metadata: record.metadata.clone(),
        }
    }
}

/// Observer callback for `logging` notifications
pub type Listener = Arc<dyn Fn(&LoggingEvent) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

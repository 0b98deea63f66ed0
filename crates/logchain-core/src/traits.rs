use crate::config::SinkConfig;
use crate::error::{Result, TransportError};
use crate::level::LevelTable;
use crate::record::{Listener, LogRecord, SubscriptionId};
use std::sync::Arc;

/// A single output destination owned by a sink
///
/// The owning sink decides whether a record passes the transport's level
/// before calling `write`; transports only format and emit.
pub trait Transport: Send {
    /// Returns the transport name, unique within one sink
    fn name(&self) -> &str;

    /// The transport's own threshold level, if it has one
    fn level(&self) -> Option<&str> {
        None
    }

    /// Write an accepted record
    fn write(&mut self, record: &LogRecord) -> std::result::Result<(), TransportError>;

    fn flush(&mut self) -> std::result::Result<(), TransportError> {
        Ok(())
    }
}

/// Per-attachment options for a transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Overrides the transport's own threshold level
    pub level: Option<String>,
}

impl TransportOptions {
    pub fn level(level: impl Into<String>) -> Self {
        Self {
            level: Some(level.into()),
        }
    }
}

/// Severity-filtered, transport-backed log destination held by one node
///
/// Methods take `&self`; implementations synchronize internally so a node
/// can be shared across threads.
pub trait Sink: Send + Sync {
    fn tag(&self) -> &str;

    /// The recognized level names and their ranks
    fn levels(&self) -> LevelTable;

    /// Replace the level table used for filtering
    fn set_levels(&self, levels: LevelTable);

    /// Write a record; the sink decides whether its level passes
    fn log(&self, record: &LogRecord) -> Result<()>;

    fn add_transport(&self, transport: Box<dyn Transport>, options: TransportOptions) -> Result<()>;

    fn remove_transport(&self, name: &str) -> Result<()>;

    /// Names of the attached transports, in insertion order
    fn transports(&self) -> Vec<String>;

    /// Register an observer for `logging` notifications
    fn subscribe(&self, listener: Listener) -> SubscriptionId;

    /// Remove an observer; returns false if it was not registered
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Push buffered output of every transport to its destination
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Allocates a fresh sink for a newly constructed node
pub trait SinkFactory: Send + Sync {
    fn create(&self, tag: &str, config: &SinkConfig) -> Result<Arc<dyn Sink>>;
}

//! Logchain Core
//!
//! Shared types and collaborator traits for logchain: level tables, log
//! records, sink configuration, and the `Sink`/`Transport` seams a node
//! writes through.

pub mod config;
pub mod error;
pub mod level;
pub mod record;
pub mod traits;

// Re-export commonly used types
pub use config::{ConsoleConfig, FileConfig, MemoryConfig, SinkConfig};
pub use error::{Result, SinkError, TransportError};
pub use level::LevelTable;
pub use record::{Listener, LogRecord, LoggingEvent, Metadata, SubscriptionId};
pub use traits::{Sink, SinkFactory, Transport, TransportOptions};

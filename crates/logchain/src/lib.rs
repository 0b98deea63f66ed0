//! Logchain
//!
//! Compose independently configured loggers into a directed, acyclic
//! forwarding graph. A record logged at one node is written to that node's
//! own sink and then re-emitted to every node reachable through its
//! attachments, each of which applies its own level filtering.
//!
//! ```no_run
//! use logchain::{ConsoleConfig, Node, SinkConfig};
//!
//! # fn main() -> logchain::Result<()> {
//! let root = Node::new("root", &SinkConfig::default().with_console(ConsoleConfig::at_level("error")))?;
//! let child = root.new_child("child", &SinkConfig::default().with_level("debug"))?;
//! child.info("reaches child only")?;
//! child.error("reaches child and root")?;
//! # Ok(())
//! # }
//! ```

pub mod dispatch;
pub mod error;
pub mod graph;
pub mod levels;
pub mod node;
pub mod registry;

mod observers;

// Re-export commonly used types
pub use error::{ChainError, DispatchError, Result, SinkFailure};
pub use levels::LevelMethod;
pub use node::Node;
pub use registry::Registry;

pub use logchain_sink::{ConsoleTransport, FileTransport, MemoryBuffer, MemoryTransport};

pub use logchain_core::{
    ConsoleConfig, FileConfig, LevelTable, Listener, LogRecord, LoggingEvent, MemoryConfig,
    Metadata, SinkConfig, SubscriptionId, TransportOptions,
};

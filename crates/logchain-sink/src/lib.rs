//! Logchain Sink
//!
//! The sink every logchain node owns: a level-gated logger that routes
//! accepted records to its transports and notifies `logging` observers.
//! Ships console, file, and in-memory transports.

pub mod console;
pub mod file;
pub mod format;
pub mod logger;
pub mod memory;

pub use console::ConsoleTransport;
pub use file::FileTransport;
pub use logger::{Logger, LoggerFactory};
pub use memory::{MemoryBuffer, MemoryTransport};

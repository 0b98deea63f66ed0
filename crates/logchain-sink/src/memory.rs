use logchain_core::config::MemoryConfig;
use logchain_core::{LogRecord, Transport, TransportError};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared handle onto the records captured by a `MemoryTransport`
///
/// Cloning the handle shares the same storage, so callers can keep one
/// after the transport itself has been moved into a sink.
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, record: LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Snapshot of every captured record
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Captured `(level, message)` pairs
    pub fn messages(&self) -> Vec<(String, String)> {
        self.records()
            .into_iter()
            .map(|r| (r.level, r.message))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Keeps accepted records in memory
pub struct MemoryTransport {
    name: String,
    level: Option<String>,
    buffer: MemoryBuffer,
}

impl MemoryTransport {
    /// Create a memory transport named `memory`
    pub fn new() -> Self {
        Self::named("memory")
    }

    /// Create a memory transport with a custom name
    ///
    /// Several memory transports can live on one sink as long as their
    /// names differ.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: None,
            buffer: MemoryBuffer::new(),
        }
    }

    pub fn with_config(config: MemoryConfig) -> Self {
        Self {
            level: config.level,
            ..Self::new()
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Handle for reading back captured records
    pub fn buffer(&self) -> MemoryBuffer {
        self.buffer.clone()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn level(&self) -> Option<&str> {
        self.level.as_deref()
    }

    fn write(&mut self, record: &LogRecord) -> Result<(), TransportError> {
        self.buffer.push(record.clone());
        Ok(())
    }
}

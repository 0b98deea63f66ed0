use crate::format::format_line;
use logchain_core::config::ConsoleConfig;
use logchain_core::{LogRecord, Transport, TransportError};
use std::io::Write;
use tracing::debug;

/// Writes accepted records to stdout, or stderr for configured levels
pub struct ConsoleTransport {
    config: ConsoleConfig,
}

impl ConsoleTransport {
    /// Create a console transport with default settings
    pub fn new() -> Self {
        Self {
            config: ConsoleConfig::default(),
        }
    }

    /// Create a console transport from configuration
    pub fn with_config(config: ConsoleConfig) -> Self {
        Self { config }
    }

    fn uses_stderr(&self, level: &str) -> bool {
        self.config.stderr_levels.iter().any(|l| l == level)
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ConsoleTransport {
    fn name(&self) -> &str {
        "console"
    }

    fn level(&self) -> Option<&str> {
        self.config.level.as_deref()
    }

    fn write(&mut self, record: &LogRecord) -> Result<(), TransportError> {
        let mut line = format_line(record, self.config.json, self.config.timestamp)?;
        line.push('\n');

        let result = if self.uses_stderr(&record.level) {
            std::io::stderr().lock().write_all(line.as_bytes())
        } else {
            std::io::stdout().lock().write_all(line.as_bytes())
        };
        result.map_err(|e| TransportError::Console(e.to_string()))?;

        debug!(level = %record.level, "Wrote record to console");
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        std::io::stdout()
            .flush()
            .map_err(|e| TransportError::Console(e.to_string()))
    }
}

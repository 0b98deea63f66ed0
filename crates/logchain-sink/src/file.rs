use crate::format::format_line;
use logchain_core::config::FileConfig;
use logchain_core::{LogRecord, Transport, TransportError};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Appends accepted records to a single file
///
/// Output is buffered. Records reach the file on `flush`, when the
/// transport is removed from its sink, or when it is dropped.
pub struct FileTransport {
    config: FileConfig,
    path: PathBuf,
    file: BufWriter<File>,
    bytes_written: u64,
    entries_written: u64,
}

impl FileTransport {
    /// Open (or create) the configured file for appending
    pub fn new(config: FileConfig) -> Result<Self, TransportError> {
        let path = PathBuf::from(&config.filename);

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| TransportError::File(format!("Failed to create directory: {}", e)))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| TransportError::File(format!("Failed to open file {:?}: {}", path, e)))?;

        info!(path = %path.display(), "Opened log file for writing");

        Ok(Self {
            config,
            path,
            file: BufWriter::new(file),
            bytes_written: 0,
            entries_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the number of entries written
    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl Transport for FileTransport {
    fn name(&self) -> &str {
        "file"
    }

    fn level(&self) -> Option<&str> {
        self.config.level.as_deref()
    }

    fn write(&mut self, record: &LogRecord) -> Result<(), TransportError> {
        let output = format_line(record, self.config.json, self.config.timestamp)?;

        self.file
            .write_all(output.as_bytes())
            .map_err(|e| TransportError::File(format!("Failed to write to file: {}", e)))?;
        self.file
            .write_all(b"\n")
            .map_err(|e| TransportError::File(format!("Failed to write newline: {}", e)))?;

        self.bytes_written += output.len() as u64 + 1;
        self.entries_written += 1;

        debug!(path = %self.path.display(), "Wrote record to file");
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.file
            .flush()
            .map_err(|e| TransportError::File(format!("Failed to flush file: {}", e)))?;
        debug!(path = %self.path.display(), entries = self.entries_written, "Flushed log file");
        Ok(())
    }
}

use crate::error::SinkError;
use crate::level::LevelTable;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Option bag handed to a sink when a node is constructed
///
/// Only the transports that are present get created. A config with no
/// transport sections gets a single console transport at `level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Default threshold for transports without their own level
    pub level: String,

    /// Custom level table (npm levels when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<LevelTable>,

    /// Console transport
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console: Option<ConsoleConfig>,

    /// File transport
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileConfig>,

    /// In-memory transport
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryConfig>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            levels: None,
            console: None,
            file: None,
            memory: None,
        }
    }
}

impl SinkConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SinkError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SinkError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, SinkError> {
        toml::from_str(content)
            .map_err(|e| SinkError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, SinkError> {
        toml::to_string_pretty(self)
            .map_err(|e| SinkError::Config(format!("Failed to serialize config: {}", e)))
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_levels(mut self, levels: LevelTable) -> Self {
        self.levels = Some(levels);
        self
    }

    pub fn with_console(mut self, console: ConsoleConfig) -> Self {
        self.console = Some(console);
        self
    }

    pub fn with_file(mut self, file: FileConfig) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_memory(mut self, memory: MemoryConfig) -> Self {
        self.memory = Some(memory);
        self
    }

    /// True if at least one transport section is present
    pub fn has_transports(&self) -> bool {
        self.console.is_some() || self.file.is_some() || self.memory.is_some()
    }
}

/// Console transport configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Write JSON lines instead of `level: message`
    pub json: bool,
    /// Prefix each line with an RFC 3339 timestamp
    pub timestamp: bool,
    /// Levels written to stderr instead of stdout
    pub stderr_levels: Vec<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            level: None,
            json: false,
            timestamp: false,
            stderr_levels: Vec::new(),
        }
    }
}

impl ConsoleConfig {
    pub fn at_level(level: impl Into<String>) -> Self {
        Self {
            level: Some(level.into()),
            ..Default::default()
        }
    }
}

/// File transport configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Output file path
    pub filename: String,
    /// Write JSON lines (true) or plain text (false)
    pub json: bool,
    pub timestamp: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            level: None,
            filename: "logchain.log".to_string(),
            json: true,
            timestamp: true,
        }
    }
}

impl FileConfig {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }
}

/// In-memory transport configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl MemoryConfig {
    pub fn at_level(level: impl Into<String>) -> Self {
        Self {
            level: Some(level.into()),
        }
    }
}

use logchain::{ChainError, ConsoleConfig, Node, Registry, SinkConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Node graph description loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Topology {
    /// General settings
    pub general: GeneralConfig,

    /// Nodes keyed by tag
    pub nodes: BTreeMap<String, NodeSpec>,
}

impl Default for Topology {
    fn default() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "app".to_string(),
            NodeSpec {
                sink: SinkConfig::default().with_console(ConsoleConfig::at_level("info")),
                ..Default::default()
            },
        );
        Self {
            general: GeneralConfig::default(),
            nodes,
        }
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Internal log level: trace, debug, info, warn, error
    pub log_level: String,

    /// Node that receives stdin lines when `--node` is not given
    pub entry: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            entry: None,
        }
    }
}

/// One node: its parent, extra attachments, and sink options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    /// Node this one is created under (its first attachment)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Further nodes to forward to
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attach: Vec<String>,

    #[serde(flatten)]
    pub sink: SinkConfig,
}

impl Topology {
    /// Load a topology from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ChainError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ChainError::Config(format!("Failed to read topology file: {}", e)))?;
        Self::from_str(&content)
    }

    /// Parse a topology from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ChainError> {
        toml::from_str(content)
            .map_err(|e| ChainError::Config(format!("Failed to parse topology: {}", e)))
    }

    pub fn to_toml(&self) -> Result<String, ChainError> {
        toml::to_string_pretty(self)
            .map_err(|e| ChainError::Config(format!("Failed to serialize topology: {}", e)))
    }

    /// The node stdin is piped into: `general.entry`, else the first tag
    pub fn entry(&self) -> Option<&str> {
        self.general
            .entry
            .as_deref()
            .or_else(|| self.nodes.keys().next().map(String::as_str))
    }

    /// Create every node, then add the extra attachments
    ///
    /// Attachments that would close a cycle are skipped with a warning, the
    /// same as any other attach.
    pub fn build(&self) -> Result<Registry, ChainError> {
        let registry = Registry::new();

        for tag in self.nodes.keys() {
            self.build_node(tag, &registry, &mut Vec::new())?;
        }

        for (tag, spec) in &self.nodes {
            let node = self.lookup(&registry, tag)?;
            for target in &spec.attach {
                let target = self.lookup(&registry, target)?;
                node.attach(&target);
            }
        }

        info!(nodes = registry.len(), "Built topology");
        Ok(registry)
    }

    fn lookup(&self, registry: &Registry, tag: &str) -> Result<Node, ChainError> {
        registry
            .get(tag)
            .ok_or_else(|| ChainError::Config(format!("Unknown node '{}'", tag)))
    }

    fn build_node(&self, tag: &str, registry: &Registry, path: &mut Vec<String>) -> Result<Node, ChainError> {
        if let Some(node) = registry.get(tag) {
            return Ok(node);
        }

        let spec = self
            .nodes
            .get(tag)
            .ok_or_else(|| ChainError::Config(format!("Unknown node '{}'", tag)))?;

        if path.iter().any(|seen| seen == tag) {
            return Err(ChainError::Config(format!(
                "Parent chain of '{}' loops back on itself",
                tag
            )));
        }
        path.push(tag.to_string());

        let node = match spec.parent {
            Some(ref parent) => {
                let parent = self.build_node(parent, registry, path)?;
                parent.new_child(tag, &spec.sink)?
            }
            None => Node::new(tag, &spec.sink)?,
        };

        path.pop();
        registry.insert(node.clone());
        Ok(node)
    }
}

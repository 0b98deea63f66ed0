use crate::error::Result;
use crate::node::Node;
use logchain_core::{SinkConfig, SinkFactory};
use logchain_sink::LoggerFactory;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Explicit, caller-owned lookup of nodes by tag
///
/// Nothing is registered implicitly: only nodes created through
/// [`Registry::add`] or handed to [`Registry::insert`] are tracked. The
/// registry keeps its nodes alive until they are removed.
pub struct Registry {
    factory: Arc<dyn SinkFactory>,
    nodes: RwLock<HashMap<String, Node>>,
}

impl Registry {
    /// Create an empty registry using `Logger` sinks
    pub fn new() -> Self {
        Self::with_factory(Arc::new(LoggerFactory))
    }

    pub fn with_factory(factory: Arc<dyn SinkFactory>) -> Self {
        Self {
            factory,
            nodes: RwLock::new(HashMap::new()),
        }
    }

    /// Get the node registered under `tag`, creating a root node if absent
    ///
    /// `config` is ignored when the tag already exists.
    pub fn add(&self, tag: &str, config: &SinkConfig) -> Result<Node> {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = nodes.get(tag) {
            return Ok(existing.clone());
        }

        let node = Node::with_factory(tag, config, Arc::clone(&self.factory))?;
        nodes.insert(tag.to_string(), node.clone());
        info!(tag = %tag, "Registered node");
        Ok(node)
    }

    /// Track an existing node under its tag, returning any node it replaced
    pub fn insert(&self, node: Node) -> Option<Node> {
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node.tag().to_string(), node)
    }

    pub fn get(&self, tag: &str) -> Option<Node> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tag)
            .cloned()
    }

    pub fn has(&self, tag: &str) -> bool {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(tag)
    }

    /// Stop tracking `tag`; the node lives on if other handles exist
    pub fn remove(&self, tag: &str) -> Option<Node> {
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(tag)
    }

    /// Registered tags, sorted
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        tags.sort();
        tags
    }

    pub fn len(&self) -> usize {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("tags", &self.tags()).finish()
    }
}

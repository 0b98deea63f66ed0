use crate::error::Result;
use crate::observers::Observers;
use logchain_core::{
    LevelTable, Listener, LoggingEvent, Sink, SinkConfig, SinkFactory, SubscriptionId, Transport,
    TransportOptions,
};
use logchain_sink::LoggerFactory;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::debug;

pub(crate) struct NodeInner {
    pub(crate) tag: String,
    pub(crate) sink: Arc<dyn Sink>,
    pub(crate) factory: Arc<dyn SinkFactory>,
    pub(crate) levels: RwLock<LevelTable>,
    /// Downstream nodes, non-owning, in insertion order
    pub(crate) attached: RwLock<Vec<Weak<NodeInner>>>,
    /// The node this one was created under; kept alive for the child's lifetime
    _parent: Option<Arc<NodeInner>>,
    pub(crate) observers: Arc<Observers>,
    relay: SubscriptionId,
}

impl NodeInner {
    /// Live downstream nodes; dropped targets are skipped
    pub(crate) fn attached_snapshot(&self) -> Vec<Arc<NodeInner>> {
        self.attached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }
}

impl Drop for NodeInner {
    fn drop(&mut self) {
        self.sink.unsubscribe(self.relay);
    }
}

/// One logger identity in the forwarding graph
///
/// A node owns its sink and forwards every log call to the nodes it is
/// attached to. Cloning a `Node` yields another handle to the same node.
/// A child holds a strong reference to the parent it was created under, so
/// a tree built top-down stays alive through its leaves. Edges added with
/// `attach` are weak: the target lives as long as some caller (or a child)
/// keeps a handle to it.
#[derive(Clone)]
pub struct Node {
    pub(crate) inner: Arc<NodeInner>,
}

impl Node {
    /// Create a root node backed by the default `Logger` sink
    pub fn new(tag: impl Into<String>, config: &SinkConfig) -> Result<Self> {
        Self::with_factory(tag, config, Arc::new(LoggerFactory))
    }

    /// Create a root node whose sinks (and its children's) come from `factory`
    pub fn with_factory(
        tag: impl Into<String>,
        config: &SinkConfig,
        factory: Arc<dyn SinkFactory>,
    ) -> Result<Self> {
        let tag = tag.into();
        let sink = factory.create(&tag, config)?;
        Ok(Self::build(tag, sink, factory, None))
    }

    /// Create a root node around an existing sink
    ///
    /// Children of this node get `Logger` sinks.
    pub fn with_sink(tag: impl Into<String>, sink: Arc<dyn Sink>) -> Self {
        Self::build(tag.into(), sink, Arc::new(LoggerFactory), None)
    }

    /// Create a child node whose only initial attachment is `self`
    pub fn new_child(&self, tag: impl Into<String>, config: &SinkConfig) -> Result<Self> {
        let tag = tag.into();
        let sink = self.inner.factory.create(&tag, config)?;
        Ok(Self::build(tag, sink, Arc::clone(&self.inner.factory), Some(self)))
    }

    fn build(
        tag: String,
        sink: Arc<dyn Sink>,
        factory: Arc<dyn SinkFactory>,
        parent: Option<&Node>,
    ) -> Self {
        let observers = Arc::new(Observers::default());

        // Re-raise the sink's acceptance notifications under this node's tag
        let relay = {
            let observers = Arc::clone(&observers);
            let tag = tag.clone();
            sink.subscribe(Arc::new(move |event: &LoggingEvent| {
                let event = LoggingEvent {
                    tag: tag.clone(),
                    ..event.clone()
                };
                observers.notify(&event);
            }))
        };

        let attached = match parent {
            Some(parent) => vec![Arc::downgrade(&parent.inner)],
            None => Vec::new(),
        };
        let owner = parent.map(|p| Arc::clone(&p.inner));

        let levels = sink.levels();
        let node = Self {
            inner: Arc::new(NodeInner {
                tag,
                sink,
                factory,
                levels: RwLock::new(levels.clone()),
                attached: RwLock::new(attached),
                _parent: owner,
                observers,
                relay,
            }),
        };
        node.set_levels(levels);

        debug!(
            tag = %node.tag(),
            parent = parent.map(|p| p.tag()),
            "Created node"
        );
        node
    }

    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    /// The sink this node writes to
    pub fn sink(&self) -> &dyn Sink {
        self.inner.sink.as_ref()
    }

    /// Currently installed level table
    pub fn levels(&self) -> LevelTable {
        self.inner
            .levels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Live downstream nodes in attachment order
    pub fn attached(&self) -> Vec<Node> {
        self.inner
            .attached_snapshot()
            .into_iter()
            .map(|inner| Node { inner })
            .collect()
    }

    /// True if `other` is one of this node's direct attachments
    pub fn is_attached_to(&self, other: &Node) -> bool {
        self.inner
            .attached_snapshot()
            .iter()
            .any(|inner| Arc::ptr_eq(inner, &other.inner))
    }

    /// True if both handles refer to the same node
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Add a transport to this node's sink
    pub fn add(&self, transport: Box<dyn Transport>, options: TransportOptions) -> Result<&Self> {
        self.inner.sink.add_transport(transport, options)?;
        Ok(self)
    }

    /// Alias for [`Node::add`]
    pub fn use_transport(&self, transport: Box<dyn Transport>, options: TransportOptions) -> Result<&Self> {
        self.add(transport, options)
    }

    /// Remove a transport from this node's sink by name
    pub fn remove(&self, transport: &str) -> Result<&Self> {
        self.inner.sink.remove_transport(transport)?;
        Ok(self)
    }

    /// Flush this node's sink; attached nodes are not touched
    pub fn flush(&self) -> Result<()> {
        self.inner.sink.flush()?;
        Ok(())
    }

    /// Observe every record this node's sink accepts
    pub fn subscribe(&self, listener: Listener) -> SubscriptionId {
        self.inner.observers.subscribe(listener, false)
    }

    /// Observe the next record this node's sink accepts, then stop
    pub fn once(&self, listener: Listener) -> SubscriptionId {
        self.inner.observers.subscribe(listener, true)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.observers.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.observers.len()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attached: Vec<String> = self
            .inner
            .attached_snapshot()
            .iter()
            .map(|inner| inner.tag.clone())
            .collect();
        f.debug_struct("Node")
            .field("tag", &self.inner.tag)
            .field("attached", &attached)
            .finish()
    }
}

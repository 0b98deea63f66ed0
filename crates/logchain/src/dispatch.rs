//! Fan-out of log calls through the attachment graph.

use crate::error::{ChainError, DispatchError, Result, SinkFailure};
use crate::node::{Node, NodeInner};
use logchain_core::{LogRecord, Metadata};
use std::sync::Arc;
use tracing::debug;

/// Write `record` at `start`, then at every node reachable from it
///
/// Nodes are visited depth-first in attachment order, the same order a
/// recursive forward would produce. A node reachable along several paths is
/// written once per path. Termination follows from the graph being acyclic.
fn dispatch(start: &Arc<NodeInner>, record: &LogRecord) -> Vec<SinkFailure> {
    let mut failures = Vec::new();
    let mut pending = vec![Arc::clone(start)];

    while let Some(node) = pending.pop() {
        if let Err(error) = node.sink.log(record) {
            debug!(tag = %node.tag, error = %error, "Sink rejected record");
            failures.push(SinkFailure {
                tag: node.tag.clone(),
                error,
            });
        }

        // The attachment lock is released before any downstream write
        let attached = node.attached_snapshot();
        pending.extend(attached.into_iter().rev());
    }

    failures
}

impl Node {
    /// Log `message` at `level` here and at every attached node
    pub fn log(&self, level: &str, message: impl Into<String>) -> Result<()> {
        self.log_with(level, message, Metadata::new())
    }

    /// Log with metadata here and at every attached node
    pub fn log_with(&self, level: &str, message: impl Into<String>, metadata: Metadata) -> Result<()> {
        let record = LogRecord::new(level, message).with_metadata(metadata);
        self.log_record(&record).map_err(ChainError::from)
    }

    /// Dispatch a prepared record
    ///
    /// Level filtering is left to each node's sink: every reachable node
    /// receives the record, including nodes below one whose sink dropped
    /// it. Sink failures do not stop forwarding; they are collected and
    /// returned together once every node has been attempted.
    pub fn log_record(&self, record: &LogRecord) -> std::result::Result<(), DispatchError> {
        let failures = dispatch(&self.inner, record);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError { failures })
        }
    }
}

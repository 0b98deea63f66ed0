//! Attachment graph management.
//!
//! Every new edge is checked for cycles before it becomes visible. All
//! checks run under one process-wide lock, so the reachable set seen by a
//! check cannot change until its edge has been inserted.

use crate::error::{ChainError, Result};
use crate::node::{Node, NodeInner};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Serializes every attach and detach across all graphs
static ATTACH_LOCK: Mutex<()> = Mutex::new(());

fn key(node: &Arc<NodeInner>) -> *const NodeInner {
    Arc::as_ptr(node)
}

/// Depth-first search for `goal` along `attached` edges, starting at `start`
///
/// Walks children in insertion order and stops at the first hit. Nodes
/// already explored are not revisited, so shared descendants cost one visit.
fn reaches(start: &Arc<NodeInner>, goal: &Arc<NodeInner>) -> bool {
    let mut stack = vec![Arc::clone(start)];
    let mut visited = HashSet::new();

    while let Some(node) = stack.pop() {
        if Arc::ptr_eq(&node, goal) {
            return true;
        }
        if !visited.insert(key(&node)) {
            continue;
        }
        // Reversed so the first attachment is explored first
        stack.extend(node.attached_snapshot().into_iter().rev());
    }

    false
}

impl Node {
    /// Forward this node's log calls to `target` as well
    ///
    /// An edge that would close a cycle (including `target == self`) is not
    /// added; a warning is logged and the attachment set stays as it was.
    /// Use [`Node::try_attach`] to get the rejection as an error.
    pub fn attach(&self, target: &Node) -> &Self {
        if let Err(e) = self.try_attach(target) {
            warn!(from = %self.tag(), to = %target.tag(), "{}", e);
        }
        self
    }

    /// Like [`Node::attach`], but reports a rejected edge
    pub fn try_attach(&self, target: &Node) -> Result<&Self> {
        let _guard = ATTACH_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        if reaches(&target.inner, &self.inner) {
            return Err(ChainError::Cycle {
                from: self.tag().to_string(),
                to: target.tag().to_string(),
            });
        }

        let mut attached = self
            .inner
            .attached
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        attached.retain(|weak| weak.strong_count() > 0);
        attached.push(Arc::downgrade(&target.inner));

        debug!(from = %self.tag(), to = %target.tag(), "Attached node");
        Ok(self)
    }

    /// Remove the first attachment to `target`; returns false if there was none
    pub fn detach(&self, target: &Node) -> bool {
        let _guard = ATTACH_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let mut attached = self
            .inner
            .attached
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let position = attached
            .iter()
            .position(|weak| std::ptr::eq(weak.as_ptr(), Arc::as_ptr(&target.inner)));

        match position {
            Some(index) => {
                attached.remove(index);
                debug!(from = %self.tag(), to = %target.tag(), "Detached node");
                true
            }
            None => false,
        }
    }

    /// True if `other` is reachable from this node through attachments
    pub fn forwards_to(&self, other: &Node) -> bool {
        !self.ptr_eq(other) && reaches(&self.inner, &other.inner)
    }

    /// Every node reachable from this one, each listed once, in
    /// depth-first order
    pub fn downstream(&self) -> Vec<Node> {
        let mut stack: Vec<Arc<NodeInner>> = self.inner.attached_snapshot().into_iter().rev().collect();
        let mut visited = HashSet::new();
        let mut nodes = Vec::new();

        while let Some(inner) = stack.pop() {
            if !visited.insert(key(&inner)) {
                continue;
            }
            stack.extend(inner.attached_snapshot().into_iter().rev());
            nodes.push(Node { inner });
        }

        nodes
    }
}

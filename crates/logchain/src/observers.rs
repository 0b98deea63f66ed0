use logchain_core::{Listener, LoggingEvent, SubscriptionId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

struct Entry {
    id: SubscriptionId,
    listener: Listener,
    once: bool,
}

/// Listeners for the `logging` notifications a node re-raises
#[derive(Default)]
pub(crate) struct Observers {
    next_id: AtomicU64,
    entries: RwLock<Vec<Entry>>,
}

impl Observers {
    pub(crate) fn subscribe(&self, listener: Listener, once: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Entry { id, listener, once });
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Call every listener with `event`
    ///
    /// One-shot listeners are removed under the write lock before any
    /// listener runs, so each fires at most once even under concurrent
    /// notifications.
    pub(crate) fn notify(&self, event: &LoggingEvent) {
        let listeners: Vec<Listener> = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let snapshot = entries.iter().map(|e| Arc::clone(&e.listener)).collect();
            entries.retain(|entry| !entry.once);
            snapshot
        };

        for listener in listeners {
            listener(event);
        }
    }
}

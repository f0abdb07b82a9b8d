//! Process-wide registry of live collectors

use crate::collector::Collector;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry every [`Collector`] joins on construction.
///
/// The reporting side polls this to enumerate live probe points.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Opaque receipt for one registration.
///
/// Ids are handed out monotonically and never reused, so a stale handle can
/// never alias a later registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorHandle(u64);

/// Ordered collection of non-owning references to live collectors.
///
/// Entries are weak: the registry never extends a collector's lifetime, it
/// only observes it. Most programs use the shared [`registry()`] instance;
/// separate instances can be constructed where isolation is needed.
pub struct Registry {
    inner: Mutex<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    entries: HashMap<u64, Weak<Collector>>,
    next_id: u64,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    // The map of weak references stays valid even if a holder panicked, so
    // a poisoned lock is recovered rather than surfaced.
    fn lock_inner(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a collector and return the handle that removes it again.
    pub fn register(&self, collector: &Arc<Collector>) -> CollectorHandle {
        let mut inner = self.lock_inner();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.insert(id, Arc::downgrade(collector));
        tracing::trace!(
            target: "profiling::registry",
            name = collector.get_key(),
            id,
            "collector registered"
        );
        CollectorHandle(id)
    }

    /// Remove a previously registered collector. Removing a handle that is
    /// already gone is a no-op.
    pub fn unregister(&self, handle: CollectorHandle) {
        let mut inner = self.lock_inner();
        if inner.entries.remove(&handle.0).is_some() {
            tracing::trace!(
                target: "profiling::registry",
                id = handle.0,
                "collector unregistered"
            );
        }
    }

    /// Snapshot of the live collectors, in registration order.
    ///
    /// The returned `Arc`s stay valid however collectors register or drop
    /// afterwards.
    pub fn list(&self) -> Vec<Arc<Collector>> {
        let mut live: Vec<(u64, Arc<Collector>)> = {
            let inner = self.lock_inner();
            inner
                .entries
                .iter()
                .filter_map(|(&id, weak)| weak.upgrade().map(|collector| (id, collector)))
                .collect()
        };
        live.sort_unstable_by_key(|entry| entry.0);
        live.into_iter().map(|(_, collector)| collector).collect()
    }

    /// Reset every live collector's buckets.
    pub fn reset_all(&self) {
        // Snapshot first so no ring lock is taken while the registry lock
        // is held.
        for collector in self.list() {
            collector.reset();
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

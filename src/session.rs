//! Caller-keyed session store.
//!
//! One entry per caller: the stored source path and the pages the ingest
//! pass extracted from it. Last write wins — a new upload overwrites the
//! previous snapshot wholesale, there are no merge semantics. `clear`
//! removes the whole entry in one operation, so no partial state is ever
//! observable after it returns.
//!
//! Same-key operations are serialized by the map's shard locks; operations
//! on different keys proceed in parallel. This replaces the ad hoc shared
//! dictionary a naive implementation would reach for.

use crate::model::Snapshot;
use dashmap::DashMap;

/// Keyed store of per-caller extraction snapshots.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: DashMap<String, Snapshot>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or overwrite) a caller's snapshot.
    pub fn put(&self, key: &str, snapshot: Snapshot) {
        self.inner.insert(key.to_string(), snapshot);
    }

    /// Fetch a clone of the caller's snapshot, if any.
    pub fn get(&self, key: &str) -> Option<Snapshot> {
        self.inner.get(key).map(|entry| entry.value().clone())
    }

    /// Whether the caller currently has a snapshot.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Remove the caller's entry entirely. Returns whether one existed.
    pub fn clear(&self, key: &str) -> bool {
        self.inner.remove(key).is_some()
    }

    /// Number of live sessions (diagnostics only).
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

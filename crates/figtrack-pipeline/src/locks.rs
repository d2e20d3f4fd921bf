//! Per-natural-key serialization.
//!
//! The diff step is a read-compare-write against the repository; two
//! concurrent items resolving to the same product must not interleave
//! inside that span. Each observed key gets its own async mutex and the
//! owned guard is held across the whole span.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use figtrack_core::NaturalKey;

/// Lazily grown map of one async mutex per observed natural key.
#[derive(Default)]
pub(crate) struct KeyedLocks {
    inner: Mutex<HashMap<NaturalKey, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `key`, creating it on first sight. The
    /// returned guard owns the key's mutex for the read-compare-write
    /// span; dropping it releases the key.
    pub(crate) async fn acquire(&self, key: &NaturalKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            Arc::clone(map.entry(key.clone()).or_default())
        };
        lock.lock_owned().await
    }
}

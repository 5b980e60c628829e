use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::queue::WorkKey;

/// Keys currently owned by a worker.
///
/// A key is in the set iff exactly one worker holds a [`Claim`] for it.
/// The lock is only taken for the insert and the removal, never across a process call.
pub(crate) struct InProgress<K> {
    keys: Mutex<HashSet<K>>,
}

impl<K: WorkKey> InProgress<K> {
    pub(crate) fn new() -> Self {
        Self {
            keys: Mutex::new(HashSet::new()),
        }
    }

    /// Take ownership of `key`, or `None` if another worker already owns it.
    pub(crate) fn try_claim(&self, key: &K) -> Option<Claim<'_, K>> {
        if !self.lock().insert(key.clone()) {
            return None;
        }
        Some(Claim {
            set: self,
            key: key.clone(),
        })
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    // insert/remove are single calls, so a poisoned set is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashSet<K>> {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ownership of one key. Dropping it (normally or while unwinding) releases the key.
pub(crate) struct Claim<'a, K: WorkKey> {
    set: &'a InProgress<K>,
    key: K,
}

impl<K: WorkKey> Drop for Claim<'_, K> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.key);
    }
}

use std::collections::HashMap;
use std::sync::RwLock;

use crate::identity::Identity;
use crate::merge::{IdentityMergeStrategy, MergeStrategy};
use crate::observer::{Subject, Subscription};
use crate::utils::{read, write};

/// Process-local directory of identities keyed by JID.
///
/// Every write goes through [`IdentityMergeStrategy`], so a good name or
/// avatar is never replaced by a placeholder. Share one instance across
/// the application behind an `Arc`.
#[derive(Default)]
pub struct IdentityCache {
    entries: RwLock<HashMap<String, Identity>>,
    changes: Subject,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time read. Use [`crate::watch::IdentityWatch`] to follow
    /// later updates.
    pub fn get(&self, key: &str) -> Option<Identity> {
        if key.is_empty() {
            return None;
        }
        read(&self.entries).get(key).cloned()
    }

    /// Merges `incoming` into the stored identity and returns the result.
    ///
    /// Subscribers are notified after every call on a non-empty key, even
    /// when the merge changed nothing.
    pub fn remember(&self, key: &str, incoming: Identity) -> Identity {
        if key.is_empty() {
            log::debug!("cache: ignoring identity without a key");
            return IdentityMergeStrategy::merge(None, &incoming);
        }

        let merged = {
            let mut entries = write(&self.entries);
            let merged =
                IdentityMergeStrategy::merge(entries.get(key), &incoming);
            entries.insert(key.to_owned(), merged.clone());
            merged
        };

        log::trace!("cache: remembered {} as {:?}", key, merged.name);
        self.changes.notify();
        merged
    }

    pub fn clear(&self, key: &str) {
        write(&self.entries).remove(key);
    }

    pub fn clear_all(&self) {
        write(&self.entries).clear();
    }

    /// Owned copy of every entry; mutating it does not affect the cache.
    pub fn snapshot(&self) -> HashMap<String, Identity> {
        read(&self.entries).clone()
    }

    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.entries).is_empty()
    }

    /// Registers a change callback. It runs synchronously inside
    /// [`IdentityCache::remember`], after the write lock is released,
    /// so it may read the cache.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.changes.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.changes.subscriber_count()
    }
}

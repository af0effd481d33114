use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

use crate::utils::lock;

type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    // Ids grow monotonically, so map order is registration order.
    callbacks: BTreeMap<u64, Callback>,
}

/// Synchronous change notifier.
///
/// Callbacks run on the thread calling [`Subject::notify`], one after
/// another, in the order they subscribed.
#[derive(Default)]
pub struct Subject {
    listeners: Arc<Mutex<Listeners>>,
}

impl Subject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` until the returned handle is dropped
    /// or explicitly unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.listeners);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners
            .callbacks
            .insert(id, Arc::new(callback));

        log::trace!(
            "observer: subscriber {} registered, total {}",
            id,
            listeners.callbacks.len()
        );

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn notify(&self) {
        // Snapshot first: a callback may subscribe or unsubscribe.
        let callbacks: Vec<Callback> = lock(&self.listeners)
            .callbacks
            .values()
            .cloned()
            .collect();

        for callback in callbacks {
            callback();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.listeners).callbacks.len()
    }
}

/// Handle returned by [`Subject::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            let removed = lock(&listeners)
                .callbacks
                .remove(&self.id);
            if removed.is_some() {
                log::trace!("observer: subscriber {} removed", self.id);
            }
        }
    }
}

use std::sync::Arc;

use tokio::sync::watch;

use crate::cache::IdentityCache;
use crate::identity::Identity;
use crate::observer::Subscription;

/// Live view of one JID's identity.
///
/// Subscribes to the cache on creation and unsubscribes when dropped.
/// Every cache write bumps [`IdentityWatch::version`] and wakes
/// [`IdentityWatch::changed`]; [`IdentityWatch::get`] always re-reads.
pub struct IdentityWatch {
    jid: String,
    cache: Arc<IdentityCache>,
    ticks: watch::Receiver<u64>,
    _subscription: Subscription,
}

impl IdentityWatch {
    pub fn new(cache: Arc<IdentityCache>, jid: &str) -> Self {
        let (sender, ticks) = watch::channel(0u64);
        let subscription = cache.subscribe(move || {
            sender.send_modify(|tick| *tick = tick.wrapping_add(1));
        });

        Self {
            jid: jid.to_owned(),
            cache,
            ticks,
            _subscription: subscription,
        }
    }

    pub fn jid(&self) -> &str {
        &self.jid
    }

    pub fn get(&self) -> Option<Identity> {
        self.cache.get(&self.jid)
    }

    /// Number of cache notifications observed so far.
    pub fn version(&self) -> u64 {
        *self.ticks.borrow()
    }

    /// Waits for the next cache write, then returns the current identity.
    pub async fn changed(&mut self) -> Option<Identity> {
        // The sender lives inside our own subscription, so it cannot
        // be dropped while `self` is alive.
        let _ = self.ticks.changed().await;
        self.get()
    }
}

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::utils::lock;

/// Minimum time between two sync attempts for the same contact.
pub const SYNC_TTL: Duration = Duration::from_millis(60_000);

/// Source of wall-clock time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn starting_at(millis: u64) -> Self {
        Self {
            now: AtomicU64::new(millis),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Contact record handed to the sync callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhatsAppContact {
    pub owner_id: String,
    pub phone: String,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub whatsapp_name: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<String>,
    #[serde(default)]
    pub unread_count: Option<u32>,
    #[serde(default)]
    pub connection_id: Option<String>,
}

impl WhatsAppContact {
    pub fn new(owner_id: &str, phone: &str) -> Self {
        Self {
            owner_id: owner_id.to_owned(),
            phone: phone.to_owned(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub total_entries: usize,
    pub recent_entries: usize,
    /// Epoch millis of the oldest recorded attempt, `0` when empty.
    pub oldest_entry: u64,
}

/// Per-`(owner, phone)` gate that lets one sync attempt through per
/// [`SYNC_TTL`] window. Failed attempts release their slot.
pub struct HydrationThrottle {
    last_attempt: Mutex<HashMap<String, u64>>,
    clock: Arc<dyn Clock>,
}

impl Default for HydrationThrottle {
    fn default() -> Self {
        Self::new()
    }
}

fn throttle_key(owner_id: &str, phone: &str) -> String {
    format!("{}:{}", owner_id, phone)
}

impl HydrationThrottle {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            last_attempt: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Claims the sync slot for this contact if the window has elapsed.
    ///
    /// The slot is taken before the sync runs; see
    /// [`HydrationThrottle::sync_contact_safe`] for the release on failure.
    pub fn should_sync(&self, owner_id: &str, phone: &str) -> bool {
        if owner_id.is_empty() || phone.is_empty() {
            return false;
        }

        let key = throttle_key(owner_id, phone);
        let now = self.clock.now_millis();
        let ttl = SYNC_TTL.as_millis() as u64;

        let mut last_attempt = lock(&self.last_attempt);
        if let Some(&last) = last_attempt.get(&key) {
            if now.saturating_sub(last) < ttl {
                log::trace!("throttle: {} synced recently, skipping", key);
                return false;
            }
        }

        last_attempt.insert(key, now);
        true
    }

    /// Runs `sync_fn` unless the contact was synced within the window.
    ///
    /// Contacts without owner or phone are skipped silently. When
    /// `sync_fn` fails the slot is released, so the next attempt goes
    /// through immediately, and the error is returned unchanged.
    pub async fn sync_contact_safe<'a, F, Fut, E>(
        &self,
        contact: &'a WhatsAppContact,
        sync_fn: F,
    ) -> std::result::Result<(), E>
    where
        F: FnOnce(&'a WhatsAppContact) -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
    {
        if contact.owner_id.is_empty() || contact.phone.is_empty() {
            return Ok(());
        }

        if !self.should_sync(&contact.owner_id, &contact.phone) {
            return Ok(());
        }

        match sync_fn(contact).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let key = throttle_key(&contact.owner_id, &contact.phone);
                lock(&self.last_attempt).remove(&key);
                log::debug!("throttle: sync of {} failed, slot released", key);
                Err(e)
            }
        }
    }

    pub fn clear(&self) {
        lock(&self.last_attempt).clear();
    }

    pub fn stats(&self) -> SyncStats {
        let now = self.clock.now_millis();
        let ttl = SYNC_TTL.as_millis() as u64;
        let last_attempt = lock(&self.last_attempt);

        SyncStats {
            total_entries: last_attempt.len(),
            recent_entries: last_attempt
                .values()
                .filter(|&&t| now.saturating_sub(t) < ttl)
                .count(),
            oldest_entry: last_attempt
                .values()
                .copied()
                .min()
                .unwrap_or(0),
        }
    }
}

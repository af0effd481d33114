use std::collections::HashSet;
use std::sync::Arc;

use crate::backend::MessagingBackend;
use crate::cache::IdentityCache;
use crate::classifier::{
    is_empty, is_placeholder_name, resolve_display_name, NameCandidates,
};
use crate::group::GroupMetadata;
use crate::identity::Identity;

/// Fills the identity cache and fetches group metadata from a
/// [`MessagingBackend`].
///
/// Enrichment is best-effort: backend failures are logged and
/// otherwise ignored, and consumers keep whatever the cache already
/// knew.
pub struct IdentityHydrator<B> {
    backend: Arc<B>,
    cache: Arc<IdentityCache>,
}

impl<B> Clone for IdentityHydrator<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<B: MessagingBackend> IdentityHydrator<B> {
    pub fn new(backend: Arc<B>, cache: Arc<IdentityCache>) -> Self {
        Self { backend, cache }
    }

    pub fn cache(&self) -> &Arc<IdentityCache> {
        &self.cache
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// True if the cache has nothing worth showing for `jid`.
    pub fn is_unknown(&self, jid: &str) -> bool {
        match self.cache.get(jid) {
            None => true,
            Some(identity) => {
                is_placeholder_name(identity.name.as_deref())
                    && is_empty(identity.avatar.as_deref())
            }
        }
    }

    /// Fetches names and avatars for the JIDs the cache does not know
    /// yet, in a single backend call, and returns how many identities
    /// were written.
    pub async fn hydrate_identities(
        &self,
        jids: &[String],
        owner_id: Option<&str>,
    ) -> usize {
        let mut seen = HashSet::new();
        let unknown: Vec<String> = jids
            .iter()
            .filter(|jid| !jid.trim().is_empty())
            .filter(|jid| seen.insert(*jid))
            .filter(|jid| self.is_unknown(jid))
            .cloned()
            .collect();

        if unknown.is_empty() {
            log::trace!("hydrator: all {} identities known", jids.len());
            return 0;
        }

        let rows = match self
            .backend
            .fetch_identities(&unknown, owner_id)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                log::debug!(
                    "hydrator: identity lookup for {} JIDs failed: {}",
                    unknown.len(),
                    e
                );
                return 0;
            }
        };

        let mut written = 0;
        for row in rows {
            if row.jid.is_empty() {
                continue;
            }
            let name = resolve_display_name(NameCandidates {
                contact_name: row.name.as_deref(),
                jid: Some(&row.jid),
                ..Default::default()
            });
            let avatar = row.avatar.filter(|a| !a.is_empty());

            self.cache
                .remember(&row.jid, Identity::new(Some(name), avatar));
            written += 1;
        }

        log::debug!(
            "hydrator: {} of {} requested identities resolved",
            written,
            unknown.len()
        );
        written
    }

    /// Fetches one group's metadata. `None` covers both "no such group"
    /// and any transport or server failure.
    pub async fn hydrate_group(
        &self,
        chat_id: &str,
        owner_id: Option<&str>,
    ) -> Option<GroupMetadata> {
        if chat_id.is_empty() {
            return None;
        }

        match self.backend.fetch_group(chat_id, owner_id).await {
            Ok(meta) => Some(meta),
            Err(e) if e.is_not_found() => {
                log::trace!("hydrator: no group {}", chat_id);
                None
            }
            Err(e) => {
                log::debug!("hydrator: group {} unavailable: {}", chat_id, e);
                None
            }
        }
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::Serialize;

use crate::backend::MessagingBackend;
use crate::group::GroupMetadata;
use crate::hydrator::IdentityHydrator;
use crate::merge::{GroupMergeStrategy, MergeStrategy};
use crate::utils::lock;

/// What a group consumer renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupView {
    pub meta: Option<GroupMetadata>,
    pub loading: bool,
}

/// Group metadata for one chat, owned by the consumer that opened it.
///
/// Each [`GroupSession::load`] fetches the group, folds it into the
/// current metadata with [`GroupMergeStrategy`], and then hydrates the
/// participants' identities into the shared cache.
pub struct GroupSession<B> {
    hydrator: IdentityHydrator<B>,
    chat_id: String,
    owner_id: Option<String>,
    meta: Mutex<Option<GroupMetadata>>,
    loading: AtomicBool,
}

struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<B: MessagingBackend> GroupSession<B> {
    pub fn new(
        hydrator: IdentityHydrator<B>,
        chat_id: &str,
        owner_id: Option<&str>,
    ) -> Self {
        Self {
            hydrator,
            chat_id: chat_id.to_owned(),
            owner_id: owner_id
                .filter(|o| !o.is_empty())
                .map(str::to_owned),
            meta: Mutex::new(None),
            loading: AtomicBool::new(false),
        }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    pub fn state(&self) -> GroupView {
        GroupView {
            meta: lock(&self.meta).clone(),
            loading: self.loading.load(Ordering::SeqCst),
        }
    }

    /// Runs one load cycle and returns the resulting view.
    ///
    /// Does nothing for an empty chat id or while another load of this
    /// session is in flight. After the first completed load `meta` is
    /// always `Some`, even if the backend had nothing.
    pub async fn load(&self) -> GroupView {
        if self.chat_id.is_empty() || self.loading.swap(true, Ordering::SeqCst)
        {
            return self.state();
        }
        let loading = LoadingGuard(&self.loading);

        let owner = self.owner_id.as_deref();
        let incoming = self
            .hydrator
            .hydrate_group(&self.chat_id, owner)
            .await
            .unwrap_or_default();

        {
            let mut meta = lock(&self.meta);
            *meta = Some(GroupMergeStrategy::merge(meta.as_ref(), &incoming));
        }

        let jids = incoming.participant_jids();
        if !jids.is_empty() {
            self.hydrator
                .hydrate_identities(&jids, owner)
                .await;
        }

        drop(loading);
        self.state()
    }
}

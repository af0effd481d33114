//! Identity resolution and reconciliation for chat contacts and groups.
//!
//! Names and avatars reach the application from a WhatsApp-style
//! messaging backend in bits and pieces: a push name here, a generic
//! "Operador" there, a group listing without participants. This crate
//! keeps the best value seen so far for each JID and hands out change
//! notifications so consumers can re-render.
//!
//! ```no_run
//! use std::sync::Arc;
//! use wa_identity::{BackendConfig, HttpBackend, IdentityCache, IdentityHydrator};
//!
//! # async fn run() -> wa_identity::Result<()> {
//! let backend = Arc::new(HttpBackend::new(&BackendConfig::from_env()?)?);
//! let cache = Arc::new(IdentityCache::new());
//! let hydrator = IdentityHydrator::new(backend, cache.clone());
//!
//! hydrator
//!     .hydrate_identities(&["554796643900@s.whatsapp.net".to_owned()], None)
//!     .await;
//! println!("{:?}", cache.get("554796643900@s.whatsapp.net"));
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cache;
pub mod classifier;
pub mod config;
mod errors;
pub mod group;
pub mod group_session;
pub mod hydrator;
pub mod identity;
pub mod jid;
pub mod merge;
pub mod observer;
pub mod throttle;
mod utils;
pub mod watch;

pub use backend::{HttpBackend, MessagingBackend};
pub use cache::IdentityCache;
pub use config::BackendConfig;
pub use errors::{IdentityError, Result};
pub use group::{GroupMetadata, Participant};
pub use group_session::{GroupSession, GroupView};
pub use hydrator::IdentityHydrator;
pub use identity::{Identity, RemoteIdentity};
pub use jid::Jid;
pub use merge::{GroupMergeStrategy, IdentityMergeStrategy, MergeStrategy};
pub use throttle::{HydrationThrottle, SyncStats, WhatsAppContact, SYNC_TTL};
pub use watch::IdentityWatch;

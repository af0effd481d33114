use async_trait::async_trait;
use itertools::Itertools;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::BackendConfig;
use crate::group::GroupMetadata;
use crate::identity::RemoteIdentity;
use crate::{IdentityError, Result};

/// The two enrichment endpoints of the messaging backend.
///
/// Failures are reported, not hidden: deciding that enrichment is
/// best-effort is up to the caller.
#[async_trait]
pub trait MessagingBackend: Send + Sync {
    /// `IdentityError::NotFound` when the backend has no such group.
    async fn fetch_group(
        &self,
        chat_id: &str,
        owner_id: Option<&str>,
    ) -> Result<GroupMetadata>;

    async fn fetch_identities(
        &self,
        jids: &[String],
        owner_id: Option<&str>,
    ) -> Result<Vec<RemoteIdentity>>;
}

/// [`MessagingBackend`] over HTTP/JSON.
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base: Url::parse(config.base_url())?,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                IdentityError::Config(format!(
                    "{} cannot be used as a base URL",
                    self.base
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        what: &str,
    ) -> Result<T> {
        log::trace!("backend: GET {}", url);
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(IdentityError::NotFound(what.to_owned())),
            status if !status.is_success() => {
                Err(IdentityError::Status(status.as_u16()))
            }
            _ => {
                let body = response.bytes().await?;
                Ok(serde_json::from_slice(&body)?)
            }
        }
    }
}

fn scope_to_owner(url: &mut Url, owner_id: Option<&str>) {
    if let Some(owner) = owner_id.filter(|o| !o.is_empty()) {
        url.query_pairs_mut()
            .append_pair("ownerId", owner);
    }
}

#[async_trait]
impl MessagingBackend for HttpBackend {
    async fn fetch_group(
        &self,
        chat_id: &str,
        owner_id: Option<&str>,
    ) -> Result<GroupMetadata> {
        let mut url = self.endpoint(&["api", "whatsapp", "group", chat_id])?;
        scope_to_owner(&mut url, owner_id);
        self.get_json(url, &format!("group {}", chat_id))
            .await
    }

    async fn fetch_identities(
        &self,
        jids: &[String],
        owner_id: Option<&str>,
    ) -> Result<Vec<RemoteIdentity>> {
        let mut url = self.endpoint(&["api", "whatsapp", "identities"])?;
        url.query_pairs_mut()
            .append_pair("jids", &jids.iter().join(","));
        scope_to_owner(&mut url, owner_id);
        self.get_json(url, "identities").await
    }
}

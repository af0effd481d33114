use std::env;
use std::time::Duration;

use url::Url;

use crate::{IdentityError, Result};

pub const BASE_URL_ENV: &str = "WA_IDENTITY_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "WA_IDENTITY_HTTP_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the messaging backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    base_url: String,
    timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl BackendConfig {
    /// Validates `base_url` and strips its trailing slashes.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed)?;
        if parsed.cannot_be_a_base() {
            return Err(IdentityError::Config(format!(
                "{} cannot be used as a base URL",
                trimmed
            )));
        }

        Ok(Self {
            base_url: trimmed.to_owned(),
            timeout,
        })
    }

    /// Reads the environment, falling back to defaults for unset
    /// or blank variables.
    pub fn from_env() -> Result<Self> {
        let base_url = non_blank_var(BASE_URL_ENV)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let timeout = match non_blank_var(TIMEOUT_ENV) {
            Some(secs) => Duration::from_secs(secs.trim().parse()?),
            None => DEFAULT_TIMEOUT,
        };

        log::debug!("config: backend at {} (timeout {:?})", base_url, timeout);
        Self::new(&base_url, timeout)
    }

    pub fn with_base_url(self, base_url: &str) -> Result<Self> {
        Self::new(base_url, self.timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:3000", "http://localhost:3000")]
    #[case("http://localhost:3000/", "http://localhost:3000")]
    #[case("https://api.example.com/v1///", "https://api.example.com/v1")]
    #[case("  http://10.0.0.2:8080/ ", "http://10.0.0.2:8080")]
    fn trailing_slashes_are_stripped(
        #[case] raw: &str,
        #[case] expected: &str,
    ) {
        let config = BackendConfig::new(raw, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(config.base_url(), expected);
    }

    #[rstest]
    #[case("localhost:3000/api")]
    #[case("not a url")]
    #[case("mailto:ops@example.com")]
    fn invalid_base_is_rejected(#[case] raw: &str) {
        assert!(BackendConfig::new(raw, DEFAULT_TIMEOUT).is_err());
    }

    #[test]
    fn default_points_at_local_backend() {
        let config = BackendConfig::default();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdentityError>;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {0}")]
    Status(u16),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Parsing error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IdentityError {
    /// True for the "no such record" outcome, which callers treat
    /// as expected absence rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<std::num::ParseIntError> for IdentityError {
    fn from(e: std::num::ParseIntError) -> Self {
        Self::Config(e.to_string())
    }
}

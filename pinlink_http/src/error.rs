use pinlink_traits::LinkError;
use std::time::Duration;
use thiserror::Error;

/// Failures while setting up a link (request failures are `LinkError`).
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid base url '{0}': expected http:// or https://")]
    BaseUrl(String),
    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SetupError>;

/// Map a transport error from reqwest into the link error kinds.
pub(crate) fn classify(err: &reqwest::Error, timeout: Option<Duration>) -> LinkError {
    if err.is_timeout() {
        return LinkError::Timeout(timeout.unwrap_or_default());
    }
    if let Some(status) = err.status() {
        return LinkError::Http(status.as_u16());
    }
    LinkError::Network(err.to_string())
}

//! Device link over plain HTTP GET.

use std::time::Duration;

use pinlink_traits::{DeviceLink, Endpoint, LinkError};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use tracing::{Span, field, instrument};

use crate::error::{Result, classify};
use crate::util::normalize_base_url;

/// HTTP transport to the device. Every request bypasses caches.
#[derive(Debug, Clone)]
pub struct HttpLink {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLink {
    /// Create a link for a device reachable at `base_url` (e.g. `http://esp32.local`).
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("pinlink/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint.
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

impl DeviceLink for HttpLink {
    #[instrument(name = "fetch", skip(self), fields(url = field::Empty, status = field::Empty))]
    async fn fetch(
        &self,
        endpoint: Endpoint,
        timeout: Option<Duration>,
    ) -> std::result::Result<String, LinkError> {
        let url = self.url(endpoint);
        Span::current().record("url", url.as_str());

        let mut request = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache");
        if let Some(t) = timeout {
            request = request.timeout(t);
        }

        let response = request.send().await.map_err(|e| classify(&e, timeout))?;
        let status = response.status();
        Span::current().record("status", status.as_u16());
        if !status.is_success() {
            tracing::debug!(%status, "device answered with error status");
            return Err(LinkError::Http(status.as_u16()));
        }

        response.text().await.map_err(|e| classify(&e, timeout))
    }
}

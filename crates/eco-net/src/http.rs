//! HTTP fetching via reqwest's blocking client

use std::time::Duration;

use url::Url;

use crate::{Fetcher, NetError, Response};

/// Default user agent
pub const USER_AGENT: &str = concat!("eco-browser/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP fetcher
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout (30s)
    pub fn new() -> Result<Self, NetError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a fetcher with a custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, NetError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| NetError::RequestFailed(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Response, NetError> {
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(NetError::InvalidUrl(format!("unsupported scheme {other}: {url}"))),
        }

        tracing::debug!("Fetching from network: {}", url);

        let response = self.client
            .get(url.as_str())
            .send()
            .map_err(|e| NetError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response.headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes()
            .map_err(|e| NetError::RequestFailed(e.to_string()))?
            .to_vec();

        tracing::debug!("HTTP {} for {} ({} bytes)", status, url, body.len());
        Ok(Response { status, headers, body })
    }
}

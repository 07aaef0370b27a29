//! EcoConsciência Networking
//!
//! Document fetching behind the [`Fetcher`] trait: HTTP through reqwest,
//! a static-site directory on disk, or an in-memory site for tests.

mod cache_bust;
mod http;
mod local;

pub use cache_bust::{cache_busted, without_param};
pub use http::HttpFetcher;
pub use local::{DirFetcher, MemoryFetcher};
pub use url::Url;

/// Something that can retrieve a document for a URL
///
/// Non-success HTTP statuses are returned as responses, not errors;
/// callers decide what a 404 means for them.
pub trait Fetcher {
    fn fetch(&self, url: &Url) -> Result<Response, NetError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &Url) -> Result<Response, NetError> {
        (**self).fetch(url)
    }
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn fetch(&self, url: &Url) -> Result<Response, NetError> {
        (**self).fetch(url)
    }
}

/// HTTP Response
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// Build a response from a status and body
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// HTML response with a `Content-Type` header
    pub fn html(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let mut response = Self::new(status, body);
        response.headers.push(("Content-Type".into(), "text/html; charset=utf-8".into()));
        response
    }

    /// Check if response is OK (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get header value (case-insensitive name)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get body as text
    pub fn text(&self) -> Result<String, NetError> {
        std::str::from_utf8(&self.body)
            .map(str::to_owned)
            .map_err(|e| NetError::InvalidEncoding(e.to_string()))
    }
}

/// Network error
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//! Local fetchers: a static site directory and an in-memory site

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use url::Url;

use crate::{Fetcher, NetError, Response};

/// Serves a static site from a directory as if it were hosted at `origin`
///
/// `/` and paths ending in `/` map to `index.html`; a missing file is a 404
/// response rather than an error.
pub struct DirFetcher {
    root: PathBuf,
    origin: Url,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>, origin: Url) -> Self {
        Self { root: root.into(), origin }
    }

    /// Site root on disk
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Origin the directory is served under
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    fn file_for(&self, url: &Url) -> Result<PathBuf, NetError> {
        if url.origin() != self.origin.origin() {
            return Err(NetError::InvalidUrl(format!("{url} is outside {}", self.origin)));
        }

        let mut path = self.root.clone();
        let segments = url.path_segments().map(|s| s.collect::<Vec<_>>()).unwrap_or_default();
        for segment in &segments {
            let name = percent_decode_str(segment)
                .decode_utf8()
                .map_err(|_| NetError::InvalidUrl(url.to_string()))?;
            if name.is_empty() || name == "." {
                continue;
            }
            if name == ".." || name.contains(['/', '\\', '\0']) {
                return Err(NetError::InvalidUrl(url.to_string()));
            }
            path.push(&*name);
        }
        if segments.last().is_none_or(|s| s.is_empty()) {
            path.push("index.html");
        }
        Ok(path)
    }
}

impl Fetcher for DirFetcher {
    fn fetch(&self, url: &Url) -> Result<Response, NetError> {
        let path = self.file_for(url)?;
        tracing::debug!("Serving {} from {}", url, path.display());

        match std::fs::read(&path) {
            Ok(body) => Ok(Response::html(200, body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Response::html(404, "Not Found")),
            Err(e) => Err(NetError::Io(e)),
        }
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Page(Response),
    Failure(String),
}

/// In-memory site keyed by URL path; records every request it sees
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    entries: HashMap<String, Entry>,
    requests: RefCell<Vec<Url>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` with status 200 at `path`
    pub fn page(mut self, path: &str, html: &str) -> Self {
        self.insert(path, Response::html(200, html));
        self
    }

    /// Serve `body` with an arbitrary status at `path`
    pub fn status(mut self, path: &str, status: u16, body: &str) -> Self {
        self.insert(path, Response::html(status, body));
        self
    }

    /// Make requests for `path` fail at the transport level
    pub fn failing(mut self, path: &str, reason: &str) -> Self {
        self.entries.insert(path.to_string(), Entry::Failure(reason.to_string()));
        self
    }

    /// Add or replace a response
    pub fn insert(&mut self, path: &str, response: Response) {
        self.entries.insert(path.to_string(), Entry::Page(response));
    }

    /// Every URL fetched so far, in order
    pub fn requests(&self) -> Vec<Url> {
        self.requests.borrow().clone()
    }

    /// Number of fetches so far
    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, url: &Url) -> Result<Response, NetError> {
        self.requests.borrow_mut().push(url.clone());
        match self.entries.get(url.path()) {
            Some(Entry::Page(response)) => Ok(response.clone()),
            Some(Entry::Failure(reason)) => Err(NetError::RequestFailed(reason.clone())),
            None => Ok(Response::html(404, "Not Found")),
        }
    }
}

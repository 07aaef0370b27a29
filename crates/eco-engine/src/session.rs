//! Session - drives pages through a fetcher
//!
//! A session is one browser tab: it performs full page loads, serves the
//! page's queued content fetches and replaces the page whenever it asks for
//! a traditional navigation. Local storage and history carry over between
//! pages; everything else is rebuilt.

use std::sync::Arc;

use eco_dom::Document;
use eco_net::{Fetcher, NetError};
use url::Url;

use crate::config::SiteConfig;
use crate::page::Page;
use crate::storage::Storage;

/// Upper bound on settle rounds; a page that keeps asking for work past
/// this is left as is
const MAX_SETTLE_ROUNDS: usize = 64;

/// Session error
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to load {url}: {source}")]
    Load { url: Url, source: NetError },

    #[error("Failed to decode {url}: {source}")]
    Decode { url: Url, source: NetError },

    #[error("Failed to parse {url}: {source}")]
    Parse { url: Url, source: eco_html::ParseError },
}

/// A tab bound to a fetcher
pub struct Session<F: Fetcher> {
    fetcher: F,
    config: Arc<SiteConfig>,
    system_dark: bool,
    page: Page,
    full_loads: usize,
}

impl<F: Fetcher> Session<F> {
    /// Load `url` as a fresh page
    pub fn open(fetcher: F, url: Url, storage: Box<dyn Storage>, config: SiteConfig) -> Result<Self, SessionError> {
        Self::open_with(fetcher, url, storage, config, false)
    }

    /// Load `url` with an initial OS colour-scheme preference
    pub fn open_with(
        fetcher: F,
        url: Url,
        storage: Box<dyn Storage>,
        config: SiteConfig,
        system_dark: bool,
    ) -> Result<Self, SessionError> {
        let config = Arc::new(config);
        let document = load_document(&fetcher, &url)?;
        let page = Page::builder(document, url)
            .storage(storage)
            .config(Arc::clone(&config))
            .system_dark(system_dark)
            .build();
        tracing::info!("Opened {}", page.url());

        Ok(Self {
            fetcher,
            config,
            system_dark,
            page,
            full_loads: 1,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Full page loads so far, the first one included
    pub fn full_loads(&self) -> usize {
        self.full_loads
    }

    /// Track OS colour-scheme changes across page loads
    pub fn set_system_dark(&mut self, dark: bool) {
        self.system_dark = dark;
        self.page.set_system_dark(dark);
    }

    /// Run deferred tasks, serve content fetches and perform requested full
    /// loads until the page has nothing left to do
    pub fn settle(&mut self) -> Result<(), SessionError> {
        for _ in 0..MAX_SETTLE_ROUNDS {
            let mut busy = self.page.run_deferred() > 0;

            for request in self.page.take_fetch_requests() {
                busy = true;
                let outcome = self.fetcher.fetch(&request.url);
                let result = self.page.complete_fetch(&request, outcome);
                tracing::debug!("{} -> {:?}", request.target, result);
            }

            if let Some(url) = self.page.take_full_navigation() {
                busy = true;
                self.load(url)?;
            }

            if !busy {
                return Ok(());
            }
        }
        tracing::warn!("Page {} did not settle", self.page.url());
        Ok(())
    }

    /// Replace the page with a traditional load of `url`
    pub fn load(&mut self, url: Url) -> Result<(), SessionError> {
        let document = load_document(&self.fetcher, &url)?;
        let (storage, history) = self.page.take_parts();

        self.page = Page::builder(document, url)
            .storage(storage)
            .config(Arc::clone(&self.config))
            .history(history)
            .system_dark(self.system_dark)
            .build();
        self.full_loads += 1;
        tracing::info!("Loaded {}", self.page.url());
        Ok(())
    }
}

fn load_document(fetcher: &impl Fetcher, url: &Url) -> Result<Document, SessionError> {
    let response = fetcher.fetch(url).map_err(|source| SessionError::Load {
        url: url.clone(),
        source,
    })?;
    if !response.ok() {
        tracing::warn!("{} answered {}", url, response.status);
    }
    let html = response.text().map_err(|source| SessionError::Decode {
        url: url.clone(),
        source,
    })?;
    eco_html::parse(&html, url.as_str()).map_err(|source| SessionError::Parse {
        url: url.clone(),
        source,
    })
}

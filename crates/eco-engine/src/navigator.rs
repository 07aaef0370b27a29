//! Content navigation
//!
//! Same-origin link clicks fetch the target page and swap its primary
//! content region into the current document instead of reloading. Every
//! attempt carries a [`NavigationToken`]; only the newest attempt may touch
//! the document. Any failure falls back to a full page load.
//!
//! ```text
//! Idle ──click──▶ Fetching ──ok──▶ Spliced
//!                    │
//!                    └──error──▶ FallbackNavigate
//! ```

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use eco_dom::{Document, DomError, ElementData, EventKind, NodeId, SelectorList, UiEvent};
use eco_html::ParseError;
use eco_net::{NetError, Response, cache_busted, without_param};
use url::Url;

use crate::behavior::{Behavior, PageNotice};
use crate::config::SiteConfig;
use crate::page::PageContext;

/// Identifies one navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NavigationToken(u64);

impl fmt::Display for NavigationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nav-{}", self.0)
    }
}

/// A content fetch waiting to be served
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub token: NavigationToken,
    /// URL to fetch, cache-busting parameter included
    pub url: Url,
    /// URL the page will show once spliced
    pub target: Url,
    /// Whether success adds a history entry (false for back/forward)
    pub push_history: bool,
}

/// Which document lacked a content region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionSide {
    Fetched,
    Current,
}

impl fmt::Display for RegionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetched => write!(f, "fetched"),
            Self::Current => write!(f, "current"),
        }
    }
}

/// Reason a content navigation fell back to a full load
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("Server answered with status {0}")]
    HttpStatus(u16),

    #[error("No content region in the {0} document")]
    MissingRegion(RegionSide),

    #[error("Response body is not valid UTF-8: {0}")]
    Decode(NetError),

    #[error("Fetch failed: {0}")]
    Fetch(NetError),

    #[error("Failed to parse fetched page: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to update document: {0}")]
    Dom(#[from] DomError),
}

impl NavigationError {
    /// Expected site conditions rather than faults
    fn is_expected(&self) -> bool {
        matches!(self, Self::HttpStatus(_) | Self::MissingRegion(_))
    }
}

/// Result of completing a fetch
#[derive(Debug)]
pub enum NavigationOutcome {
    /// Content swapped in place
    Spliced,
    /// A full navigation to the target was requested instead
    FellBack(NavigationError),
    /// A newer attempt replaced this one; the document is untouched
    Superseded,
}

/// Same-origin content swapper
#[derive(Debug)]
pub struct ContentNavigator {
    regions: Vec<SelectorList>,
    next_token: u64,
    current: Option<NavigationToken>,
}

impl ContentNavigator {
    pub fn new(config: &SiteConfig) -> Self {
        let regions = config
            .content_regions
            .iter()
            .filter_map(|s| match SelectorList::parse(s) {
                Ok(list) => Some(list),
                Err(e) => {
                    tracing::warn!("Ignoring content region {:?}: {}", s, e);
                    None
                }
            })
            .collect();
        Self {
            regions,
            next_token: 1,
            current: None,
        }
    }

    /// Attempt currently allowed to complete
    pub fn pending(&self) -> Option<NavigationToken> {
        self.current
    }

    /// Primary content region of `document`, trying each selector in order
    pub fn find_region(&self, document: &Document) -> Option<NodeId> {
        let tree = document.tree();
        self.regions
            .iter()
            .find_map(|list| tree.select_first(tree.root(), list))
    }

    /// Start navigating to `target`
    ///
    /// A target on the current path only scrolls to the top. Either way any
    /// attempt still in flight is invalidated.
    pub fn begin(&mut self, ctx: &mut PageContext, target: Url, push_history: bool) {
        if let Some(stale) = self.current.take() {
            tracing::debug!("Navigation {} superseded", stale);
        }

        let target = without_param(&target, &ctx.config.cache_bust_param);
        if push_history && target.path() == ctx.url.path() {
            tracing::debug!("Already on {}, scrolling to top", target.path());
            ctx.scroll_to(0, 0);
            return;
        }

        let token = NavigationToken(self.next_token);
        self.next_token += 1;
        self.current = Some(token);

        let mut url = cache_busted(&target, &ctx.config.cache_bust_param, &nonce(token));
        url.set_fragment(None);
        tracing::debug!("Navigation {} fetching {}", token, url);
        ctx.request_fetch(FetchRequest {
            token,
            url,
            target,
            push_history,
        });
    }

    /// Finish an attempt with the fetch result
    pub fn complete(
        &mut self,
        ctx: &mut PageContext,
        request: &FetchRequest,
        outcome: Result<Response, NetError>,
    ) -> NavigationOutcome {
        if self.current != Some(request.token) {
            tracing::debug!("Discarding stale completion of {}", request.token);
            return NavigationOutcome::Superseded;
        }
        self.current = None;

        match self.splice(ctx, request, outcome) {
            Ok(()) => {
                tracing::info!("Navigated to {}", request.target);
                NavigationOutcome::Spliced
            }
            Err(e) => {
                if e.is_expected() {
                    tracing::warn!("Falling back to full load of {}: {}", request.target, e);
                } else {
                    tracing::error!("Falling back to full load of {}: {}", request.target, e);
                }
                ctx.notify(PageNotice::NavigationFellBack {
                    url: request.target.clone(),
                    reason: e.to_string(),
                });
                ctx.navigate_full(request.target.clone());
                NavigationOutcome::FellBack(e)
            }
        }
    }

    fn splice(
        &self,
        ctx: &mut PageContext,
        request: &FetchRequest,
        outcome: Result<Response, NetError>,
    ) -> Result<(), NavigationError> {
        let response = outcome.map_err(NavigationError::Fetch)?;
        if !response.ok() {
            return Err(NavigationError::HttpStatus(response.status));
        }
        let html = response.text().map_err(NavigationError::Decode)?;
        let fetched = eco_html::parse(&html, request.target.as_str())?;

        let source = self
            .find_region(&fetched)
            .ok_or(NavigationError::MissingRegion(RegionSide::Fetched))?;
        let dest = self
            .find_region(&ctx.document)
            .ok_or(NavigationError::MissingRegion(RegionSide::Current))?;

        // Copy everything before touching the live region
        let tree = ctx.document.tree_mut();
        let imported = fetched
            .tree()
            .child_ids(source)
            .into_iter()
            .map(|child| tree.import_subtree(fetched.tree(), child))
            .collect::<Result<Vec<_>, _>>()?;
        let removed = tree.clear_children(dest);
        for node in imported {
            tree.append_child(dest, node)?;
        }
        tracing::debug!("Replaced {} node(s) in content region", removed);

        let title = fetched
            .title()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| ctx.config.default_title.clone());
        ctx.document.set_title(&title)?;
        ctx.scroll_to(0, 0);
        if request.push_history {
            ctx.history.push(request.target.clone());
        }
        ctx.url = request.target.clone();
        ctx.document.set_url(request.target.as_str());
        Ok(())
    }
}

impl Behavior for ContentNavigator {
    fn name(&self) -> &'static str {
        "navigator"
    }

    fn attach(&mut self, ctx: &mut PageContext) {
        if self.find_region(&ctx.document).is_none() {
            tracing::debug!("No content region on {}; links will load fully", ctx.url);
        }
    }

    fn handle_event(&mut self, ctx: &mut PageContext, event: &mut UiEvent) {
        match event.kind {
            EventKind::Click => {
                if event.is_default_prevented() {
                    return;
                }
                let Some(target) = link_target(&ctx.document, &ctx.url, event.target) else {
                    return;
                };
                event.prevent_default();
                self.begin(ctx, target, true);
            }
            EventKind::PopState => {
                let target = ctx.history.current().clone();
                self.begin(ctx, target, false);
            }
            _ => {}
        }
    }

    fn page_ready(&mut self, _ctx: &mut PageContext) {}
}

/// URL a click on `node` should swap in, if it qualifies
///
/// The click must land in an `<a href>` that is not a bare fragment, points
/// at the same origin as `base`, opens in the same context and is not a
/// download.
pub fn link_target(document: &Document, base: &Url, node: NodeId) -> Option<Url> {
    let tree = document.tree();
    let link = tree.closest(node, "a[href]")?;
    let elem = tree.element(link)?;

    let href = elem.get_attr("href")?.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    if !replaces_current_page(elem) {
        return None;
    }

    let url = base.join(href).ok()?;
    if url.origin() != base.origin() {
        return None;
    }
    Some(url)
}

/// Whether following `link` replaces the current page: no browsing context
/// other than `_self` and no `download`
pub(crate) fn replaces_current_page(link: &ElementData) -> bool {
    let same_context = link
        .get_attr("target")
        .is_none_or(|t| t.is_empty() || t.eq_ignore_ascii_case("_self"));
    same_context && !link.has_attr("download")
}

fn nonce(token: NavigationToken) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{millis}-{}", token.0)
}

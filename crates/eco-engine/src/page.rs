//! Page - a loaded document with its behaviours attached
//!
//! The page owns all per-document state in a [`PageContext`] and routes
//! events to its behaviours in a fixed order: dropdowns, menu, theme,
//! masks, validator, then the content navigator. Nothing here performs
//! I/O; content fetches are queued for the caller (usually a
//! [`Session`](crate::Session)) to serve through [`Page::complete_fetch`].

use std::collections::VecDeque;
use std::sync::Arc;

use eco_dom::{Document, EventKind, Key, NodeId, UiEvent};
use eco_net::{NetError, Response};
use url::Url;

use crate::behavior::{Behavior, DeferredTask, PageNotice};
use crate::config::SiteConfig;
use crate::dropdown::DropdownController;
use crate::history::History;
use crate::masks::MaskBinder;
use crate::menu::MenuController;
use crate::navigator::{ContentNavigator, FetchRequest, NavigationOutcome, replaces_current_page};
use crate::storage::{MemoryStorage, Storage};
use crate::theme::ThemeController;
use crate::validation::{FormValidator, ValidationReport};

/// State shared by every behaviour of a page
pub struct PageContext {
    pub document: Document,
    /// URL the page currently shows
    pub url: Url,
    pub history: History,
    pub storage: Box<dyn Storage>,
    pub config: Arc<SiteConfig>,
    scroll: (i64, i64),
    system_dark: bool,
    tasks: VecDeque<DeferredTask>,
    fetches: Vec<FetchRequest>,
    notices: Vec<PageNotice>,
    last_report: Option<ValidationReport>,
    full_navigation: Option<Url>,
}

impl PageContext {
    /// Viewport scroll offset
    pub fn scroll_position(&self) -> (i64, i64) {
        self.scroll
    }

    pub fn scroll_to(&mut self, x: i64, y: i64) {
        self.scroll = (x, y);
    }

    /// OS `prefers-color-scheme: dark`
    pub fn system_prefers_dark(&self) -> bool {
        self.system_dark
    }

    /// Run `task` once the current event has been handled
    pub fn defer(&mut self, task: DeferredTask) {
        self.tasks.push_back(task);
    }

    /// Queue a content fetch
    pub fn request_fetch(&mut self, request: FetchRequest) {
        self.fetches.push(request);
    }

    pub fn notify(&mut self, notice: PageNotice) {
        self.notices.push(notice);
    }

    /// Keep the outcome of a form submission
    pub fn record_report(&mut self, report: ValidationReport) {
        self.last_report = Some(report);
    }

    /// Ask for a traditional page load of `url`
    pub fn navigate_full(&mut self, url: Url) {
        tracing::debug!("Full navigation requested to {}", url);
        self.full_navigation = Some(url);
    }
}

/// Builder for [`Page`]
pub struct PageBuilder {
    document: Document,
    url: Url,
    storage: Option<Box<dyn Storage>>,
    config: Option<Arc<SiteConfig>>,
    history: Option<History>,
    system_dark: bool,
}

impl PageBuilder {
    pub fn new(document: Document, url: Url) -> Self {
        Self {
            document,
            url,
            storage: None,
            config: None,
            history: None,
            system_dark: false,
        }
    }

    pub fn storage(mut self, storage: Box<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn config(mut self, config: Arc<SiteConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Continue an existing history; the page URL becomes its newest entry
    pub fn history(mut self, history: History) -> Self {
        self.history = Some(history);
        self
    }

    /// OS colour-scheme preference at load time
    pub fn system_dark(mut self, dark: bool) -> Self {
        self.system_dark = dark;
        self
    }

    /// Create the page and attach its behaviours
    pub fn build(self) -> Page {
        let config = self.config.unwrap_or_default();
        let history = match self.history {
            Some(mut history) => {
                if history.current() != &self.url {
                    history.push(self.url.clone());
                }
                history
            }
            None => History::new(self.url.clone()),
        };

        let ctx = PageContext {
            document: self.document,
            url: self.url,
            history,
            storage: self.storage.unwrap_or_else(|| Box::new(MemoryStorage::new())),
            config: Arc::clone(&config),
            scroll: (0, 0),
            system_dark: self.system_dark,
            tasks: VecDeque::new(),
            fetches: Vec::new(),
            notices: Vec::new(),
            last_report: None,
            full_navigation: None,
        };

        let behaviors: Vec<Box<dyn Behavior>> = vec![
            Box::new(DropdownController::new()),
            Box::new(MenuController::new()),
            Box::new(ThemeController::new()),
            Box::new(MaskBinder::new()),
            Box::new(FormValidator::new()),
        ];

        let mut page = Page {
            ctx,
            behaviors,
            navigator: ContentNavigator::new(&config),
        };
        page.attach_all();
        page
    }
}

/// A loaded page
pub struct Page {
    ctx: PageContext,
    behaviors: Vec<Box<dyn Behavior>>,
    navigator: ContentNavigator,
}

impl Page {
    /// Page with the default behaviours
    pub fn new(document: Document, url: Url, storage: Box<dyn Storage>, config: Arc<SiteConfig>) -> Self {
        PageBuilder::new(document, url).storage(storage).config(config).build()
    }

    pub fn builder(document: Document, url: Url) -> PageBuilder {
        PageBuilder::new(document, url)
    }

    fn attach_all(&mut self) {
        for behavior in &mut self.behaviors {
            behavior.attach(&mut self.ctx);
        }
        self.navigator.attach(&mut self.ctx);
        tracing::debug!("Page {} ready", self.ctx.url);
    }

    fn page_ready(&mut self) {
        for behavior in &mut self.behaviors {
            tracing::trace!("page_ready -> {}", behavior.name());
            behavior.page_ready(&mut self.ctx);
        }
        self.navigator.page_ready(&mut self.ctx);
    }

    // === State ===

    pub fn document(&self) -> &Document {
        &self.ctx.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.ctx.document
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    pub fn url(&self) -> &Url {
        &self.ctx.url
    }

    pub fn title(&self) -> String {
        self.ctx.document.title().unwrap_or_default()
    }

    pub fn history(&self) -> &History {
        &self.ctx.history
    }

    pub fn storage(&self) -> &dyn Storage {
        self.ctx.storage.as_ref()
    }

    pub fn config(&self) -> &SiteConfig {
        &self.ctx.config
    }

    pub fn scroll_position(&self) -> (i64, i64) {
        self.ctx.scroll
    }

    /// User scroll
    pub fn scroll_to(&mut self, x: i64, y: i64) {
        self.ctx.scroll_to(x, y);
    }

    pub fn notices(&self) -> &[PageNotice] {
        &self.ctx.notices
    }

    pub fn take_notices(&mut self) -> Vec<PageNotice> {
        std::mem::take(&mut self.ctx.notices)
    }

    /// Result of the latest form submission
    pub fn last_report(&self) -> Option<&ValidationReport> {
        self.ctx.last_report.as_ref()
    }

    /// Full navigation requested by the page, if any
    pub fn full_navigation(&self) -> Option<&Url> {
        self.ctx.full_navigation.as_ref()
    }

    pub fn take_full_navigation(&mut self) -> Option<Url> {
        self.ctx.full_navigation.take()
    }

    /// Names of the attached behaviours in dispatch order
    pub fn behavior_names(&self) -> Vec<&'static str> {
        self.behaviors
            .iter()
            .map(|b| b.name())
            .chain(std::iter::once(self.navigator.name()))
            .collect()
    }

    /// Move out what outlives a full load
    ///
    /// The page is left with empty storage and a history holding only its
    /// own URL; it is about to be replaced.
    pub fn take_parts(&mut self) -> (Box<dyn Storage>, History) {
        let storage = std::mem::replace(&mut self.ctx.storage, Box::new(MemoryStorage::new()));
        let history = std::mem::replace(&mut self.ctx.history, History::new(self.ctx.url.clone()));
        (storage, history)
    }

    // === Events ===

    /// Deliver `event` to every behaviour until one stops propagation,
    /// then run the default action if nobody prevented it
    pub fn dispatch(&mut self, mut event: UiEvent) -> UiEvent {
        tracing::trace!("Dispatching {:?} at {}", event.kind, event.target);
        for behavior in &mut self.behaviors {
            if event.is_propagation_stopped() {
                break;
            }
            behavior.handle_event(&mut self.ctx, &mut event);
        }
        if !event.is_propagation_stopped() {
            self.navigator.handle_event(&mut self.ctx, &mut event);
        }

        if !event.is_default_prevented() {
            self.default_action(&event);
        }
        event
    }

    fn default_action(&mut self, event: &UiEvent) {
        match event.kind {
            EventKind::Click => {
                let tree = self.ctx.document.tree();
                let Some(link) = tree.closest(event.target, "a[href]") else {
                    return;
                };
                let Some(elem) = tree.element(link) else {
                    return;
                };
                let href = elem.get_attr("href").unwrap_or("").trim().to_string();
                if href.is_empty() || href.starts_with('#') {
                    return;
                }
                if !replaces_current_page(elem) {
                    tracing::debug!("Link to {} does not replace the page", href);
                    return;
                }
                match self.ctx.url.join(&href) {
                    Ok(url) => self.ctx.navigate_full(url),
                    Err(e) => tracing::warn!("Ignoring link with bad href {:?}: {}", href, e),
                }
            }
            EventKind::Submit => {
                tracing::debug!("Form {} submitted without a handler; not sent", event.target);
            }
            _ => {}
        }
    }

    pub fn click(&mut self, target: NodeId) -> UiEvent {
        self.dispatch(UiEvent::click(target))
    }

    /// Press `key` on the focused element (the body when nothing is focused)
    pub fn press_key(&mut self, key: Key) -> UiEvent {
        let target = self
            .ctx
            .document
            .active_element()
            .unwrap_or_else(|| self.ctx.document.body());
        self.key_down(target, key)
    }

    /// Press `key` with `target` as the event target
    pub fn key_down(&mut self, target: NodeId, key: Key) -> UiEvent {
        self.dispatch(UiEvent::key_down(target, key))
    }

    /// Replace a control's value as typing would, then fire `Input`
    pub fn type_into(&mut self, target: NodeId, text: &str) -> UiEvent {
        if let Err(e) = self.ctx.document.tree_mut().set_value(target, text) {
            tracing::warn!("Cannot type into {}: {}", target, e);
        }
        self.dispatch(UiEvent::new(EventKind::Input, target))
    }

    pub fn submit(&mut self, form: NodeId) -> UiEvent {
        self.dispatch(UiEvent::new(EventKind::Submit, form))
    }

    /// Move focus, firing `FocusOut` on the element that loses it
    pub fn focus(&mut self, target: NodeId) -> bool {
        let previous = self.ctx.document.active_element();
        if !self.ctx.document.focus(target) {
            return false;
        }
        if let Some(previous) = previous.filter(|&p| p != target) {
            self.dispatch(UiEvent::new(EventKind::FocusOut, previous));
        }
        true
    }

    /// Drop focus, firing `FocusOut`
    pub fn blur(&mut self) {
        let previous = self.ctx.document.active_element();
        self.ctx.document.blur();
        if let Some(previous) = previous {
            self.dispatch(UiEvent::new(EventKind::FocusOut, previous));
        }
    }

    /// OS colour scheme changed
    pub fn set_system_dark(&mut self, dark: bool) {
        if self.ctx.system_dark == dark {
            return;
        }
        self.ctx.system_dark = dark;
        self.dispatch(UiEvent::window(EventKind::ColorSchemeChange { dark }));
    }

    /// History back; returns whether there was an entry to go to
    pub fn back(&mut self) -> bool {
        if self.ctx.history.back().is_none() {
            return false;
        }
        self.dispatch(UiEvent::window(EventKind::PopState));
        true
    }

    /// History forward
    pub fn forward(&mut self) -> bool {
        if self.ctx.history.forward().is_none() {
            return false;
        }
        self.dispatch(UiEvent::window(EventKind::PopState));
        true
    }

    /// Start a content navigation to `url` as a link click would
    pub fn navigate_to(&mut self, url: Url) {
        if url.origin() != self.ctx.url.origin() {
            self.ctx.navigate_full(url);
            return;
        }
        self.navigator.begin(&mut self.ctx, url, true);
    }

    // === Deferred work ===

    /// Run queued tasks, including any they queue; returns how many ran
    pub fn run_deferred(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.ctx.tasks.pop_front() {
            for behavior in &mut self.behaviors {
                behavior.run_task(&mut self.ctx, &task);
            }
            self.navigator.run_task(&mut self.ctx, &task);
            ran += 1;
        }
        ran
    }

    pub fn pending_tasks(&self) -> usize {
        self.ctx.tasks.len()
    }

    /// Content fetches waiting to be served
    pub fn take_fetch_requests(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.ctx.fetches)
    }

    pub fn pending_fetches(&self) -> usize {
        self.ctx.fetches.len()
    }

    /// Hand a fetch result back to the navigator
    pub fn complete_fetch(
        &mut self,
        request: &FetchRequest,
        outcome: Result<Response, NetError>,
    ) -> NavigationOutcome {
        let result = self.navigator.complete(&mut self.ctx, request, outcome);
        if matches!(result, NavigationOutcome::Spliced) {
            self.page_ready();
        }
        result
    }
}

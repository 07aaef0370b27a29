//! Mobile navigation menu

use eco_a11y::{AriaState, aria_bool};
use eco_dom::{EventKind, Key, NodeId, UiEvent};

use crate::behavior::Behavior;
use crate::dropdown;
use crate::page::PageContext;

const OPEN_CLASS: &str = "menu-open";

/// Opens and closes the `.main-nav` panel
#[derive(Debug, Default)]
pub struct MenuController {
    toggle: Option<NodeId>,
    close: Option<NodeId>,
    panel: Option<NodeId>,
}

impl MenuController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the panel is open
    pub fn is_open(&self, ctx: &PageContext) -> bool {
        self.panel.is_some_and(|p| ctx.document.has_class(p, OPEN_CLASS))
    }

    fn set_open(&self, ctx: &mut PageContext, open: bool) {
        let Some(panel) = self.panel else {
            return;
        };
        if let Err(e) = ctx.document.set_class(panel, OPEN_CLASS, open) {
            tracing::error!("Failed to update menu panel: {}", e);
        }
        if let Some(toggle) = self.toggle {
            if let Err(e) = ctx.document.set_attr(toggle, AriaState::Expanded.attr(), aria_bool(open)) {
                tracing::error!("Failed to update menu toggle: {}", e);
            }
        }
        tracing::debug!("Menu {}", if open { "opened" } else { "closed" });
    }

    fn on_click(&self, ctx: &mut PageContext, target: NodeId) {
        let Some(panel) = self.panel else {
            return;
        };
        let tree = ctx.document.tree();
        let within = |node: Option<NodeId>| node.is_some_and(|n| tree.contains(n, target));

        if within(self.toggle) {
            self.set_open(ctx, true);
        } else if within(self.close) {
            self.set_open(ctx, false);
        } else if tree.contains(panel, target) {
            // Picking a link closes; opening a nested dropdown does not
            let picked = tree
                .closest(target, "a")
                .is_some_and(|link| tree.contains(panel, link) && !tree.matches(link, ".dropdown-toggle"));
            if picked && self.is_open(ctx) {
                self.set_open(ctx, false);
            }
        } else if self.is_open(ctx) {
            self.set_open(ctx, false);
        }
    }
}

impl Behavior for MenuController {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn attach(&mut self, ctx: &mut PageContext) {
        let doc = &ctx.document;
        self.toggle = doc.query_selector(".menu-toggle");
        self.close = doc.query_selector(".menu-close");
        self.panel = doc.query_selector(".main-nav");

        if self.panel.is_none() {
            tracing::debug!("No navigation panel; menu disabled");
            return;
        }
        let open = self.is_open(ctx);
        self.set_open(ctx, open);
    }

    fn handle_event(&mut self, ctx: &mut PageContext, event: &mut UiEvent) {
        match &event.kind {
            EventKind::Click => self.on_click(ctx, event.target),
            EventKind::KeyDown(Key::Escape) => {
                // The dropdown layer closes first
                if self.is_open(ctx) && !dropdown::any_expanded(&ctx.document) {
                    self.set_open(ctx, false);
                }
            }
            _ => {}
        }
    }

    fn page_ready(&mut self, ctx: &mut PageContext) {
        self.attach(ctx);
        if self.is_open(ctx) {
            self.set_open(ctx, false);
        }
    }
}

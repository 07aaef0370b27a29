//! Dropdown menus
//!
//! Each `.dropdown` holds a `.dropdown-toggle` trigger and a
//! `.dropdown-menu` panel. The expanded state lives in the DOM (`open` on
//! the container, `aria-expanded` on the trigger) so it survives re-binding.

use eco_a11y::{AriaState, FocusStep, RovingFocus, aria_bool, parse_aria_bool};
use eco_dom::{Document, EventKind, Key, NodeId, UiEvent};

use crate::behavior::{Behavior, DeferredTask};
use crate::page::PageContext;

const CONTAINER: &str = ".dropdown";
const TRIGGER: &str = ".dropdown-toggle";
const PANEL: &str = ".dropdown-menu";
const ITEMS: &str = "a, [role=menuitem]";
const OPEN_CLASS: &str = "open";

/// Whether any bindable dropdown in `document` is expanded; triggers outside
/// a complete `.dropdown` are ignored
pub fn any_expanded(document: &Document) -> bool {
    bindable(document)
        .iter()
        .any(|d| trigger_expanded(document, d.trigger))
}

/// Containers holding both a trigger and a panel
fn bindable(document: &Document) -> Vec<Dropdown> {
    let tree = document.tree();
    document
        .query_selector_all(CONTAINER)
        .into_iter()
        .filter_map(|container| {
            Some(Dropdown {
                container,
                trigger: tree.query_selector(container, TRIGGER)?,
                panel: tree.query_selector(container, PANEL)?,
            })
        })
        .collect()
}

fn trigger_expanded(document: &Document, trigger: NodeId) -> bool {
    document
        .attr(trigger, AriaState::Expanded.attr())
        .and_then(parse_aria_bool)
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Dropdown {
    container: NodeId,
    trigger: NodeId,
    panel: NodeId,
}

impl Dropdown {
    fn contains(&self, document: &Document, node: NodeId) -> bool {
        let tree = document.tree();
        tree.contains(self.trigger, node) || tree.contains(self.panel, node)
    }
}

/// Keyboard-navigable disclosure widgets
#[derive(Debug, Default)]
pub struct DropdownController {
    dropdowns: Vec<Dropdown>,
}

impl DropdownController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bound dropdowns
    pub fn len(&self) -> usize {
        self.dropdowns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dropdowns.is_empty()
    }

    /// Whether dropdown `index` is expanded
    pub fn is_expanded(&self, document: &Document, index: usize) -> bool {
        self.dropdowns
            .get(index)
            .is_some_and(|d| trigger_expanded(document, d.trigger))
    }

    fn items(&self, document: &Document, dropdown: &Dropdown) -> RovingFocus<NodeId> {
        RovingFocus::new(document.tree().query_selector_all(dropdown.panel, ITEMS))
    }

    fn set_expanded(&self, ctx: &mut PageContext, index: usize, expanded: bool) {
        let dropdown = self.dropdowns[index];
        let doc = &mut ctx.document;
        if let Err(e) = doc.set_class(dropdown.container, OPEN_CLASS, expanded) {
            tracing::error!("Failed to update dropdown class: {}", e);
        }
        if let Err(e) = doc.set_attr(dropdown.trigger, AriaState::Expanded.attr(), aria_bool(expanded)) {
            tracing::error!("Failed to update dropdown trigger: {}", e);
        }
    }

    fn open(&self, ctx: &mut PageContext, index: usize) {
        self.set_expanded(ctx, index, true);
        self.focus_first(ctx, index);
    }

    fn close(&self, ctx: &mut PageContext, index: usize, return_focus: bool) {
        self.set_expanded(ctx, index, false);
        if return_focus {
            ctx.document.focus(self.dropdowns[index].trigger);
        }
    }

    fn focus_first(&self, ctx: &mut PageContext, index: usize) {
        let items = self.items(&ctx.document, &self.dropdowns[index]);
        if let Some(first) = items.first() {
            ctx.document.focus(first);
        }
    }

    fn on_trigger_key(&self, ctx: &mut PageContext, index: usize, key: &Key) -> bool {
        let expanded = self.is_expanded(&ctx.document, index);
        match key {
            Key::Enter | Key::Space => {
                if expanded {
                    self.close(ctx, index, false);
                } else {
                    self.open(ctx, index);
                }
                true
            }
            Key::ArrowDown => {
                if expanded {
                    self.focus_first(ctx, index);
                } else {
                    self.open(ctx, index);
                }
                true
            }
            _ => false,
        }
    }

    fn on_item_key(&self, ctx: &mut PageContext, index: usize, item: NodeId, key: &Key) -> bool {
        let items = self.items(&ctx.document, &self.dropdowns[index]);
        match key {
            Key::ArrowDown => {
                if let Some(next) = items.next(Some(item)) {
                    ctx.document.focus(next);
                }
                true
            }
            Key::ArrowUp => {
                match items.prev(item) {
                    FocusStep::Move(prev) => {
                        ctx.document.focus(prev);
                    }
                    FocusStep::Exit => self.close(ctx, index, true),
                }
                true
            }
            _ => false,
        }
    }

    fn on_key(&self, ctx: &mut PageContext, event: &mut UiEvent, key: &Key) {
        if *key == Key::Escape {
            let expanded: Vec<usize> = (0..self.dropdowns.len())
                .filter(|&i| self.is_expanded(&ctx.document, i))
                .collect();
            if expanded.is_empty() {
                return;
            }
            for index in expanded {
                self.close(ctx, index, true);
            }
            event.prevent_default();
            event.stop_propagation();
            return;
        }

        // (dropdown, focused item); no item means the trigger
        let target = event.target;
        let location = {
            let tree = ctx.document.tree();
            if let Some(index) = self.dropdowns.iter().position(|d| tree.contains(d.trigger, target)) {
                Some((index, None))
            } else if let Some(index) = self.dropdowns.iter().position(|d| tree.contains(d.panel, target)) {
                let panel = self.dropdowns[index].panel;
                tree.closest(target, ITEMS)
                    .filter(|&item| tree.contains(panel, item))
                    .map(|item| (index, Some(item)))
            } else {
                None
            }
        };

        let handled = match location {
            Some((index, None)) => self.on_trigger_key(ctx, index, key),
            Some((index, Some(item))) => self.on_item_key(ctx, index, item, key),
            None => false,
        };

        if handled {
            event.prevent_default();
        }
    }

    fn on_click(&self, ctx: &mut PageContext, target: NodeId) {
        let tree = ctx.document.tree();
        let toggled = self.dropdowns.iter().position(|d| tree.contains(d.trigger, target));

        for index in 0..self.dropdowns.len() {
            if Some(index) == toggled {
                if self.is_expanded(&ctx.document, index) {
                    self.close(ctx, index, false);
                } else {
                    self.open(ctx, index);
                }
            } else if self.is_expanded(&ctx.document, index)
                && !self.dropdowns[index].contains(&ctx.document, target)
            {
                self.close(ctx, index, false);
            }
        }
    }
}

impl Behavior for DropdownController {
    fn name(&self) -> &'static str {
        "dropdowns"
    }

    fn attach(&mut self, ctx: &mut PageContext) {
        self.dropdowns = bindable(&ctx.document);

        // Mirror the container class into ARIA for markup that omits it
        for index in 0..self.dropdowns.len() {
            let open = ctx.document.has_class(self.dropdowns[index].container, OPEN_CLASS);
            self.set_expanded(ctx, index, open);
        }
        tracing::debug!("Bound {} dropdown(s)", self.dropdowns.len());
    }

    fn handle_event(&mut self, ctx: &mut PageContext, event: &mut UiEvent) {
        if self.dropdowns.is_empty() {
            return;
        }
        match &event.kind {
            EventKind::KeyDown(key) => {
                let key = key.clone();
                self.on_key(ctx, event, &key);
            }
            EventKind::Click => self.on_click(ctx, event.target),
            EventKind::FocusOut => {
                let target = event.target;
                for (index, dropdown) in self.dropdowns.iter().enumerate() {
                    if self.is_expanded(&ctx.document, index) && dropdown.contains(&ctx.document, target) {
                        ctx.defer(DeferredTask::DropdownFocusCheck { dropdown: index });
                    }
                }
            }
            _ => {}
        }
    }

    fn run_task(&mut self, ctx: &mut PageContext, task: &DeferredTask) {
        let DeferredTask::DropdownFocusCheck { dropdown: index } = *task;
        let Some(dropdown) = self.dropdowns.get(index).copied() else {
            return;
        };
        if !self.is_expanded(&ctx.document, index) {
            return;
        }
        // A removed or missing active element counts as outside
        let inside = ctx
            .document
            .active_element()
            .is_some_and(|active| dropdown.contains(&ctx.document, active));
        if !inside {
            tracing::debug!("Focus left dropdown {}, closing", index);
            self.close(ctx, index, false);
        }
    }
}

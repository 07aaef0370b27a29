//! Dark mode
//!
//! The stored preference wins; without one the page follows the OS colour
//! scheme, including later changes to it. Toggling always stores a value.

use eco_a11y::{AriaState, aria_bool};
use eco_dom::{EventKind, NodeId, UiEvent};

use crate::behavior::Behavior;
use crate::page::PageContext;

/// Theme toggle id
pub const TOGGLE_ID: &str = "theme-toggle";

/// Applied colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Parse a stored value; anything but `light`/`dark` is `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn from_dark(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }

    pub fn is_dark(&self) -> bool {
        *self == Self::Dark
    }

    pub fn toggled(&self) -> Self {
        Self::from_dark(!self.is_dark())
    }

    /// Icon shown on the toggle; it offers the other scheme
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Dark => "☀️",
            Self::Light => "🌙",
        }
    }

    /// Label shown on the toggle
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dark => "Modo claro",
            Self::Light => "Modo escuro",
        }
    }
}

/// Light/dark switch backed by local storage
#[derive(Debug, Default)]
pub struct ThemeController {
    toggle: Option<NodeId>,
}

impl ThemeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preference in storage, if valid
    pub fn stored(ctx: &PageContext) -> Option<Theme> {
        let key = &ctx.config.theme_storage_key;
        let value = ctx.storage.get_item(key)?;
        let theme = Theme::parse(&value);
        if theme.is_none() {
            tracing::debug!("Ignoring stored theme {:?}", value);
        }
        theme
    }

    /// Theme the page should show now
    pub fn resolve(ctx: &PageContext) -> Theme {
        Self::stored(ctx).unwrap_or_else(|| Theme::from_dark(ctx.system_prefers_dark()))
    }

    /// Theme currently applied to the document
    pub fn applied(ctx: &PageContext) -> Theme {
        Theme::from_dark(ctx.document.has_class(Self::marker(ctx), &ctx.config.dark_class))
    }

    fn marker(ctx: &PageContext) -> NodeId {
        let body = ctx.document.body();
        if body.is_valid() {
            body
        } else {
            ctx.document.document_element()
        }
    }

    fn apply(&self, ctx: &mut PageContext, theme: Theme) {
        let marker = Self::marker(ctx);
        let dark_class = ctx.config.dark_class.clone();
        if let Err(e) = ctx.document.set_class(marker, &dark_class, theme.is_dark()) {
            tracing::error!("Failed to apply theme: {}", e);
        }

        let Some(toggle) = self.toggle else {
            return;
        };
        let doc = &mut ctx.document;
        if let Err(e) = doc.set_attr(toggle, AriaState::Pressed.attr(), aria_bool(theme.is_dark())) {
            tracing::error!("Failed to update theme toggle: {}", e);
        }
        for (selector, text) in [(".theme-icon", theme.icon()), (".theme-label", theme.label())] {
            if let Some(node) = doc.tree().query_selector(toggle, selector) {
                if let Err(e) = doc.tree_mut().set_text_content(node, text) {
                    tracing::error!("Failed to update theme toggle: {}", e);
                }
            }
        }
    }
}

impl Behavior for ThemeController {
    fn name(&self) -> &'static str {
        "theme"
    }

    fn attach(&mut self, ctx: &mut PageContext) {
        self.toggle = ctx.document.get_element_by_id(TOGGLE_ID);
        let theme = Self::resolve(ctx);
        tracing::debug!("Applying {} theme", theme.as_str());
        self.apply(ctx, theme);
    }

    fn handle_event(&mut self, ctx: &mut PageContext, event: &mut UiEvent) {
        match event.kind {
            EventKind::Click => {
                let Some(toggle) = self.toggle else {
                    return;
                };
                if !ctx.document.tree().contains(toggle, event.target) {
                    return;
                }
                let theme = Self::applied(ctx).toggled();
                let key = ctx.config.theme_storage_key.clone();
                if let Err(e) = ctx.storage.set_item(&key, theme.as_str()) {
                    tracing::warn!("Failed to persist theme: {}", e);
                }
                tracing::info!("Switched to {} theme", theme.as_str());
                self.apply(ctx, theme);
            }
            EventKind::ColorSchemeChange { dark } => {
                if Self::stored(ctx).is_none() {
                    self.apply(ctx, Theme::from_dark(dark));
                }
            }
            _ => {}
        }
    }
}

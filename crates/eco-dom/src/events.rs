//! UI Events
//!
//! The user-input and window events page behaviours react to.

use crate::NodeId;

/// Keyboard key, reduced to what the behaviours distinguish
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Tab,
    ArrowUp,
    ArrowDown,
    Character(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` string
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Enter" => Self::Enter,
            " " | "Spacebar" => Self::Space,
            "Escape" | "Esc" => Self::Escape,
            "Tab" => Self::Tab,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            other => Self::Character(other.to_string()),
        }
    }
}

/// Event types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Pointer or keyboard activation
    Click,
    /// Key pressed while `target` has focus
    KeyDown(Key),
    /// Value of a form control changed
    Input,
    /// Form submission
    Submit,
    /// `target` lost focus
    FocusOut,
    /// History traversal (back/forward)
    PopState,
    /// `prefers-color-scheme` media query changed
    ColorSchemeChange { dark: bool },
}

/// A dispatched event
#[derive(Debug, Clone)]
pub struct UiEvent {
    pub kind: EventKind,
    pub target: NodeId,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl UiEvent {
    /// Create an event aimed at `target`
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Click on `target`
    pub fn click(target: NodeId) -> Self {
        Self::new(EventKind::Click, target)
    }

    /// Key press on `target`
    pub fn key_down(target: NodeId, key: Key) -> Self {
        Self::new(EventKind::KeyDown(key), target)
    }

    /// Window-level event (no element target)
    pub fn window(kind: EventKind) -> Self {
        Self::new(kind, NodeId::ROOT)
    }

    /// The pressed key, for key events
    pub fn key(&self) -> Option<&Key> {
        match &self.kind {
            EventKind::KeyDown(key) => Some(key),
            _ => None,
        }
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Stop propagation to later listeners
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

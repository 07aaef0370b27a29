//! EcoConsciência Accessibility
//!
//! The ARIA vocabulary the page behaviours mirror their state into, and
//! roving focus for keyboard-navigable item lists.

pub mod aria;
pub mod focus;

pub use aria::{AriaState, aria_bool, parse_aria_bool};
pub use focus::{FocusStep, RovingFocus};

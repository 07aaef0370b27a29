//! EcoConsciência Engine
//!
//! Page behaviours for the EcoConsciência site, run headlessly against an
//! [`eco_dom::Document`]:
//!
//! - [`MenuController`]: mobile navigation panel
//! - [`DropdownController`]: keyboard-navigable dropdown menus
//! - [`MaskBinder`]: CPF, phone and CEP input masks
//! - [`FormValidator`]: registration form validation
//! - [`ThemeController`]: persisted light/dark theme
//! - [`ContentNavigator`]: same-origin content swaps with full-load fallback
//!
//! A [`Page`] hosts the behaviours; a [`Session`] serves its fetches.

mod behavior;
mod config;
mod dropdown;
mod history;
mod masks;
mod menu;
mod navigator;
mod page;
mod session;
mod storage;
mod theme;
mod validation;

pub use behavior::{Behavior, DeferredTask, PageNotice};
pub use config::{ConfigError, SiteConfig};
pub use dropdown::{DropdownController, any_expanded};
pub use history::History;
pub use masks::{CEP_MASK, CPF_MASK, MASKED_FIELDS, Mask, MaskBinder, PHONE_MASK};
pub use menu::MenuController;
pub use navigator::{
    ContentNavigator, FetchRequest, NavigationError, NavigationOutcome, NavigationToken, RegionSide,
    link_target,
};
pub use page::{Page, PageBuilder, PageContext};
pub use session::{Session, SessionError};
pub use storage::{JsonFileStorage, MemoryStorage, Storage, StorageError};
pub use theme::{Theme, ThemeController};
pub use validation::{
    FORM_ID, FieldResult, FormValidator, ValidationReport, clear_errors, field_ids, is_valid_email,
    show_error, validate_fields,
};

pub use eco_dom::{Document, EventKind, Key, NodeId, UiEvent};
pub use url::Url;

//! Behaviour plumbing
//!
//! Every interactive feature of a page is a [`Behavior`]. The page owns
//! them, hands each one the shared [`PageContext`] and routes events,
//! deferred tasks and page-ready notifications to them in a fixed order.

use eco_dom::UiEvent;
use url::Url;

use crate::page::PageContext;

/// An interactive feature bound to the current document
pub trait Behavior {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Locate the elements this behaviour drives. Missing elements
    /// disable the affected feature without error.
    fn attach(&mut self, ctx: &mut PageContext);

    /// React to an event
    fn handle_event(&mut self, ctx: &mut PageContext, event: &mut UiEvent);

    /// Run a task this behaviour deferred earlier
    fn run_task(&mut self, _ctx: &mut PageContext, _task: &DeferredTask) {}

    /// Document content was replaced in place
    fn page_ready(&mut self, ctx: &mut PageContext) {
        self.attach(ctx);
    }
}

/// Work scheduled to run after the current event finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Close dropdown `dropdown` unless focus is still inside it
    DropdownFocusCheck { dropdown: usize },
}

/// Something a behaviour wants the user to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageNotice {
    /// The registration form passed validation
    RegistrationAccepted,
    /// A content navigation failed and became a full page load
    NavigationFellBack { url: Url, reason: String },
}

impl PageNotice {
    /// User-facing text
    pub fn message(&self) -> String {
        match self {
            Self::RegistrationAccepted => "Cadastro realizado com sucesso!".to_string(),
            Self::NavigationFellBack { url, .. } => format!("Carregando {url}"),
        }
    }
}

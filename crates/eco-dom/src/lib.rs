//! EcoConsciência DOM - Document Object Model
//!
//! Arena-backed document tree that page behaviours run against.
//! Nodes are addressed by [`NodeId`] and never freed: a removed subtree is
//! simply detached, so stale ids stay safe to look up but stop being
//! connected to the document.

mod node;
mod tree;
mod document;
mod forms;
mod selector;
mod events;
mod operations;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::{DomTree, Children};
pub use document::Document;
pub use selector::{Selector, SelectorList, Compound, AttrMatch};
pub use events::{UiEvent, EventKind, Key};
pub use operations::{DomError, DomResult};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this id refers to a node at all
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#none")
        }
    }
}

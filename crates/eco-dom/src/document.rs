//! Document - High-level document API

use crate::{DomError, DomResult, DomTree, NodeId};

/// HTML Document
#[derive(Debug, Clone)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
    /// Focused element and its slot generation
    active: Option<(NodeId, u32)>,
}

impl Document {
    /// Create a new document with an empty html/head/body skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Fresh nodes under the root cannot violate the hierarchy.
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
            active: None,
        }
    }

    /// Create an empty document (no structure); call [`Document::finalize`]
    /// once the tree is populated
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
            active: None,
        }
    }

    /// Locate and cache the html, head and body elements
    pub fn finalize(&mut self) {
        let find = |tree: &DomTree, tag: &str| {
            tree.descendants(tree.root())
                .into_iter()
                .find(|&id| tree.element(id).is_some_and(|e| e.is(tag)))
                .unwrap_or(NodeId::NONE)
        };
        self.html_element = find(&self.tree, "html");
        self.head_element = find(&self.tree, "head");
        self.body_element = find(&self.tree, "body");
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Update the document URL (history navigation without reload)
    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }

    fn title_element(&self) -> Option<NodeId> {
        self.tree.query_selector(self.tree.root(), "title")
    }

    /// Document title, whitespace collapsed; `None` without a `<title>`
    pub fn title(&self) -> Option<String> {
        let id = self.title_element()?;
        let text = self.tree.text_content(id);
        Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    /// Replace the title text, creating `<title>` in `<head>` if needed
    pub fn set_title(&mut self, title: &str) -> DomResult<()> {
        let id = match self.title_element() {
            Some(id) => id,
            None => {
                let parent = [self.head_element, self.html_element]
                    .into_iter()
                    .find(|id| id.is_valid())
                    .unwrap_or(NodeId::ROOT);
                let id = self.tree.create_element("title");
                self.tree.append_child(parent, id)?;
                id
            }
        };
        self.tree.set_text_content(id, title)
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get a connected element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|&node| self.tree.element(node).and_then(|e| e.id()) == Some(id))
    }

    /// `querySelector` from the document root
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.tree.query_selector(self.tree.root(), selector)
    }

    /// `querySelectorAll` from the document root
    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        self.tree.query_selector_all(self.tree.root(), selector)
    }

    /// Focused element; a focused node that was removed or released reads
    /// as `None`, even once its slot holds another node
    pub fn active_element(&self) -> Option<NodeId> {
        let (id, generation) = self.active?;
        (self.tree.generation(id) == Some(generation) && self.tree.is_connected(id)).then_some(id)
    }

    /// Move focus to a connected element; returns whether focus moved
    pub fn focus(&mut self, id: NodeId) -> bool {
        let focusable = self.tree.element(id).is_some() && self.tree.is_connected(id);
        match self.tree.generation(id).filter(|_| focusable) {
            Some(generation) => {
                self.active = Some((id, generation));
                true
            }
            None => {
                tracing::debug!("Ignoring focus on disconnected node {}", id);
                false
            }
        }
    }

    /// Clear focus
    pub fn blur(&mut self) {
        self.active = None;
    }

    /// Attribute value of an element
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.element(id).and_then(|e| e.get_attr(name))
    }

    /// Set an attribute on an element
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.tree
            .element_mut(id)
            .ok_or(DomError::NotAnElement)?
            .set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute from an element
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        self.tree
            .element_mut(id)
            .ok_or(DomError::NotAnElement)?
            .remove_attr(name);
        Ok(())
    }

    /// Class check
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.tree.element(id).is_some_and(|e| e.has_class(class))
    }

    /// Add or remove a class
    pub fn set_class(&mut self, id: NodeId, class: &str, on: bool) -> DomResult<()> {
        self.tree
            .element_mut(id)
            .ok_or(DomError::NotAnElement)?
            .set_class(class, on);
        Ok(())
    }

    /// Tag name check
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tree.element(id).is_some_and(|e| e.is(tag))
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

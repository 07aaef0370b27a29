//! html5ever front end
//!
//! html5ever builds an `RcDom`; the nodes are then copied into the arena
//! tree breadth-first with an explicit work list, so deep markup cannot
//! exhaust the stack.

use std::collections::VecDeque;

use eco_dom::{Document, DomTree, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::ParseError;

/// Elements whose whitespace-only text is content
const WHITESPACE_SIGNIFICANT: &[&str] = &["pre", "textarea"];

/// Page parser
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser {
    keep_comments: bool,
}

impl HtmlParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `<!-- -->` nodes in the tree
    pub fn keep_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }

    /// Parse a page with no address
    pub fn parse(&self, html: &str) -> Result<Document, ParseError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse a page fetched from `url`
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, ParseError> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut document = Document::empty(url);
        self.copy_into(&dom.document, document.tree_mut())?;
        document.finalize();

        tracing::debug!("Parsed {} ({} nodes)", url, document.tree().len());
        Ok(document)
    }

    fn copy_into(&self, root: &Handle, tree: &mut DomTree) -> Result<(), ParseError> {
        // (source node, arena parent, parent keeps whitespace)
        let mut work: VecDeque<(Handle, NodeId, bool)> = root
            .children
            .borrow()
            .iter()
            .map(|child| (child.clone(), NodeId::ROOT, false))
            .collect();

        while let Some((handle, parent, keep_space)) = work.pop_front() {
            let created = match &handle.data {
                RcNodeData::Element { name, attrs, .. } => {
                    let id = tree.create_element(&name.local);
                    if let Some(element) = tree.element_mut(id) {
                        for attr in attrs.borrow().iter() {
                            element.set_attr(&attr.name.local, &attr.value);
                        }
                    }
                    let keeps = WHITESPACE_SIGNIFICANT.contains(&&*name.local);
                    for child in handle.children.borrow().iter() {
                        work.push_back((child.clone(), id, keeps));
                    }
                    Some(id)
                }
                RcNodeData::Text { contents } => {
                    let text = contents.borrow();
                    if keep_space || !text.trim().is_empty() {
                        Some(tree.create_text(&text))
                    } else {
                        None
                    }
                }
                RcNodeData::Comment { contents } if self.keep_comments => Some(tree.create_comment(contents)),
                RcNodeData::Doctype { name, .. } => Some(tree.create_doctype(name)),
                _ => None,
            };

            if let Some(id) = created {
                tree.append_child(parent, id)?;
            }
        }
        Ok(())
    }
}

//! Element Query and Methods
//!
//! A small selector engine: compound selectors (`tag`, `#id`, `.class`,
//! `[attr]`, `[attr=value]`, `*`) joined by descendant combinators, plus
//! comma-separated lists. That covers every lookup the page behaviours make.

use std::str::FromStr;

use crate::{DomError, DomResult, DomTree, ElementData, NodeId};

/// Attribute condition inside a compound selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatch {
    Exists(String),
    Equals(String, String),
}

/// One compound selector, e.g. `a.nav-link[href]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrMatch>,
}

impl Compound {
    fn parse(input: &str) -> DomResult<Self> {
        let invalid = || DomError::InvalidSelector(input.to_string());
        let mut compound = Compound::default();
        let mut rest = input;

        let tag_len = rest
            .find(|c: char| matches!(c, '#' | '.' | '['))
            .unwrap_or(rest.len());
        let (tag, tail) = rest.split_at(tag_len);
        match tag {
            "" | "*" => {}
            name if name.chars().all(is_ident_char) => {
                compound.tag = Some(name.to_ascii_lowercase());
            }
            _ => return Err(invalid()),
        }
        rest = tail;

        while let Some(first) = rest.chars().next() {
            match first {
                '#' | '.' => {
                    let body = &rest[1..];
                    let len = body.find(|c: char| !is_ident_char(c)).unwrap_or(body.len());
                    if len == 0 {
                        return Err(invalid());
                    }
                    let ident = body[..len].to_string();
                    if first == '#' {
                        compound.id = Some(ident);
                    } else {
                        compound.classes.push(ident);
                    }
                    rest = &body[len..];
                }
                '[' => {
                    let close = rest.find(']').ok_or_else(invalid)?;
                    let inner = rest[1..close].trim();
                    let attr = match inner.split_once('=') {
                        Some((name, value)) => {
                            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                            AttrMatch::Equals(name.trim().to_string(), value.to_string())
                        }
                        None => AttrMatch::Exists(inner.to_string()),
                    };
                    match &attr {
                        AttrMatch::Exists(name) | AttrMatch::Equals(name, _)
                            if name.is_empty() || !name.chars().all(is_ident_char) =>
                        {
                            return Err(invalid());
                        }
                        _ => {}
                    }
                    compound.attrs.push(attr);
                    rest = &rest[close + 1..];
                }
                _ => return Err(invalid()),
            }
        }

        Ok(compound)
    }

    /// Check an element against this compound
    pub fn matches(&self, elem: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if !elem.is(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if elem.id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| elem.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|attr| match attr {
            AttrMatch::Exists(name) => elem.has_attr(name),
            AttrMatch::Equals(name, value) => elem.get_attr(name) == Some(value.as_str()),
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Descendant chain of compounds; the last one is the subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    parts: Vec<Compound>,
}

impl Selector {
    /// Parse a single selector (no commas)
    pub fn parse(input: &str) -> DomResult<Self> {
        let input = input.trim();
        if input.is_empty() || input.contains(['>', '+', '~']) {
            return Err(DomError::InvalidSelector(input.to_string()));
        }
        let parts = input
            .split_ascii_whitespace()
            .map(Compound::parse)
            .collect::<DomResult<Vec<_>>>()?;
        Ok(Self { parts })
    }

    /// Whether `id` matches this selector within `tree`
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some((subject, ancestors)) = self.parts.split_last() else {
            return false;
        };
        if !tree.element(id).is_some_and(|e| subject.matches(e)) {
            return false;
        }

        // Descendant combinators only, so nearest-ancestor matching is exact.
        let mut current = tree.parent(id);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(ancestor) = current else { return false };
                current = tree.parent(ancestor);
                if tree.element(ancestor).is_some_and(|e| compound.matches(e)) {
                    break;
                }
            }
        }
        true
    }
}

/// Comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<Selector>);

impl SelectorList {
    /// Parse a selector list such as `a, [role=menuitem]`
    pub fn parse(input: &str) -> DomResult<Self> {
        let selectors = input
            .split(',')
            .map(Selector::parse)
            .collect::<DomResult<Vec<_>>>()?;
        Ok(Self(selectors))
    }

    /// Whether any selector in the list matches
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.0.iter().any(|s| s.matches(tree, id))
    }
}

impl FromStr for SelectorList {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl DomTree {
    /// All descendants of `root` matching `list`, in document order
    pub fn select_all(&self, root: NodeId, list: &SelectorList) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| list.matches(self, id))
            .collect()
    }

    /// First descendant of `root` matching `list`
    pub fn select_first(&self, root: NodeId, list: &SelectorList) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&id| list.matches(self, id))
    }

    /// Nearest inclusive ancestor matching `list`
    pub fn closest_matching(&self, id: NodeId, list: &SelectorList) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if list.matches(self, node) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// String-based `querySelector`; an invalid selector finds nothing
    pub fn query_selector(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        parse_logged(selector).and_then(|list| self.select_first(root, &list))
    }

    /// String-based `querySelectorAll`; an invalid selector finds nothing
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        parse_logged(selector)
            .map(|list| self.select_all(root, &list))
            .unwrap_or_default()
    }

    /// String-based `closest`
    pub fn closest(&self, id: NodeId, selector: &str) -> Option<NodeId> {
        parse_logged(selector).and_then(|list| self.closest_matching(id, &list))
    }

    /// String-based `matches`
    pub fn matches(&self, id: NodeId, selector: &str) -> bool {
        parse_logged(selector).is_some_and(|list| list.matches(self, id))
    }
}

fn parse_logged(selector: &str) -> Option<SelectorList> {
    match SelectorList::parse(selector) {
        Ok(list) => Some(list),
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    }
}

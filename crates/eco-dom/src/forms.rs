//! Form control values
//!
//! The current value of `<input>` lives in its `value` attribute, a
//! `<textarea>` value is its text, and a `<select>` value comes from its
//! selected `<option>` (the first one when nothing is marked selected).

use crate::{DomError, DomResult, DomTree, NodeId};

impl DomTree {
    /// Current value of a form control; `None` for other nodes
    pub fn value(&self, id: NodeId) -> Option<String> {
        let elem = self.element(id)?;
        match elem.name.as_str() {
            "input" => Some(elem.get_attr("value").unwrap_or("").to_string()),
            "textarea" => Some(self.text_content(id)),
            "select" => {
                let options = self.options(id);
                let chosen = options
                    .iter()
                    .copied()
                    .find(|&o| self.element(o).is_some_and(|e| e.has_attr("selected")))
                    .or_else(|| options.first().copied());
                Some(chosen.map(|o| self.option_value(o)).unwrap_or_default())
            }
            _ => None,
        }
    }

    /// Set the value of a form control
    pub fn set_value(&mut self, id: NodeId, value: &str) -> DomResult<()> {
        let name = self.element(id).ok_or(DomError::NotAnElement)?.name.clone();
        match name.as_str() {
            "input" => {
                if let Some(elem) = self.element_mut(id) {
                    elem.set_attr("value", value);
                }
                Ok(())
            }
            "textarea" => self.set_text_content(id, value),
            "select" => {
                let options = self.options(id);
                let target = options.iter().copied().find(|&o| self.option_value(o) == value);
                for option in options {
                    if let Some(elem) = self.element_mut(option) {
                        if Some(option) == target {
                            elem.set_attr("selected", "");
                        } else {
                            elem.remove_attr("selected");
                        }
                    }
                }
                if target.is_none() {
                    tracing::debug!("No <option> with value {:?} in select {}", value, id);
                }
                Ok(())
            }
            _ => Err(DomError::NotAnElement),
        }
    }

    fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants(select)
            .into_iter()
            .filter(|&o| self.element(o).is_some_and(|e| e.is("option")))
            .collect()
    }

    fn option_value(&self, option: NodeId) -> String {
        match self.element(option).and_then(|e| e.get_attr("value")) {
            Some(value) => value.to_string(),
            None => self.text_content(option).trim().to_string(),
        }
    }
}

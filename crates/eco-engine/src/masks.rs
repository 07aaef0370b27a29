//! Input masks
//!
//! A mask pattern uses `0` for a digit slot; every other character is a
//! literal separator. Formatting is a pure function of the raw value and the
//! pattern, so re-applying it to already formatted text is a no-op.

use eco_dom::{EventKind, NodeId, UiEvent};

use crate::behavior::Behavior;
use crate::page::PageContext;

/// `000.000.000-00`
pub const CPF_MASK: &str = "000.000.000-00";
/// `(00) 00000-0000`
pub const PHONE_MASK: &str = "(00) 00000-0000";
/// `00000-000`
pub const CEP_MASK: &str = "00000-000";

/// Field ids and their masks
pub const MASKED_FIELDS: &[(&str, &str)] = &[
    ("cpf", CPF_MASK),
    ("telefone", PHONE_MASK),
    ("cep", CEP_MASK),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Digit,
    Literal(char),
}

/// A parsed mask pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pattern: String,
    slots: Vec<Slot>,
}

impl Mask {
    pub fn new(pattern: &str) -> Self {
        let slots = pattern
            .chars()
            .map(|c| if c == '0' { Slot::Digit } else { Slot::Literal(c) })
            .collect();
        Self {
            pattern: pattern.to_string(),
            slots,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Length of a fully filled value, in characters
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of digit slots
    pub fn digit_slots(&self) -> usize {
        self.slots.iter().filter(|s| matches!(s, Slot::Digit)).count()
    }

    /// Format `raw` against the pattern.
    ///
    /// Non-digits in `raw` are dropped, digits fill slots in order, a
    /// literal is written only once a later digit follows it, and digits
    /// beyond the last slot are discarded.
    pub fn apply(&self, raw: &str) -> String {
        let mut digits = raw.chars().filter(char::is_ascii_digit);
        let mut out = String::with_capacity(self.pattern.len());
        let mut pending = String::new();

        for slot in &self.slots {
            match slot {
                Slot::Literal(c) => pending.push(*c),
                Slot::Digit => match digits.next() {
                    Some(d) => {
                        out.push_str(&pending);
                        pending.clear();
                        out.push(d);
                    }
                    None => break,
                },
            }
        }
        out
    }

    /// Whether `value` reaches the fully masked length
    pub fn is_complete(&self, value: &str) -> bool {
        value.chars().count() >= self.len()
    }
}

/// Keeps masked fields formatted as the user types
#[derive(Debug)]
pub struct MaskBinder {
    masks: Vec<(String, Mask)>,
    bound: Vec<(NodeId, usize)>,
}

impl MaskBinder {
    /// Binder for the site's masked fields
    pub fn new() -> Self {
        Self::with_masks(MASKED_FIELDS.iter().map(|&(id, pattern)| (id, pattern)))
    }

    /// Binder for arbitrary `(field id, pattern)` pairs
    pub fn with_masks<'a>(masks: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            masks: masks
                .into_iter()
                .map(|(id, pattern)| (id.to_string(), Mask::new(pattern)))
                .collect(),
            bound: Vec::new(),
        }
    }

    /// Mask configured for a field id
    pub fn mask_for(&self, field_id: &str) -> Option<&Mask> {
        self.masks.iter().find(|(id, _)| id == field_id).map(|(_, m)| m)
    }

    /// Currently bound elements
    pub fn bound_elements(&self) -> Vec<NodeId> {
        self.bound.iter().map(|&(node, _)| node).collect()
    }

    fn reformat(&self, ctx: &mut PageContext, node: NodeId, mask: usize) {
        let Some(value) = ctx.document.tree().value(node) else {
            return;
        };
        let formatted = self.masks[mask].1.apply(&value);
        if formatted == value {
            return;
        }
        if let Err(e) = ctx.document.tree_mut().set_value(node, &formatted) {
            tracing::error!("Failed to write masked value: {}", e);
        }
    }
}

impl Default for MaskBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl Behavior for MaskBinder {
    fn name(&self) -> &'static str {
        "masks"
    }

    fn attach(&mut self, ctx: &mut PageContext) {
        self.bound.clear();
        for (index, (id, _)) in self.masks.iter().enumerate() {
            if let Some(node) = ctx.document.get_element_by_id(id) {
                self.bound.push((node, index));
            }
        }
        let bound = self.bound.clone();
        for (node, mask) in bound {
            self.reformat(ctx, node, mask);
        }
        tracing::debug!("Bound {} masked field(s)", self.bound.len());
    }

    fn handle_event(&mut self, ctx: &mut PageContext, event: &mut UiEvent) {
        if event.kind != EventKind::Input {
            return;
        }
        if let Some(&(node, mask)) = self.bound.iter().find(|(n, _)| *n == event.target) {
            self.reformat(ctx, node, mask);
        }
    }
}

//! Focus Management
//!
//! Roving focus over an ordered list of items (menu items in a dropdown).

/// Outcome of moving backwards through the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusStep<T> {
    /// Focus this item
    Move(T),
    /// Already on the first item: leave the list
    Exit,
}

/// Ordered focus targets
#[derive(Debug, Clone)]
pub struct RovingFocus<T> {
    items: Vec<T>,
}

impl<T: Copy + PartialEq> RovingFocus<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// First item
    pub fn first(&self) -> Option<T> {
        self.items.first().copied()
    }

    /// Index of an item
    pub fn position(&self, item: T) -> Option<usize> {
        self.items.iter().position(|&i| i == item)
    }

    /// Item after `current`, wrapping from last to first.
    /// Unknown or missing `current` starts at the first item.
    pub fn next(&self, current: Option<T>) -> Option<T> {
        let pos = current.and_then(|c| self.position(c));
        match pos {
            Some(p) if p + 1 < self.items.len() => Some(self.items[p + 1]),
            _ => self.first(),
        }
    }

    /// Item before `current`; the first item (or an unknown one) exits
    pub fn prev(&self, current: T) -> FocusStep<T> {
        match self.position(current) {
            Some(p) if p > 0 => FocusStep::Move(self.items[p - 1]),
            _ => FocusStep::Exit,
        }
    }
}

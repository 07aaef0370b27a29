//! Session history
//!
//! A linear list of visited URLs with a cursor, like a browser tab's
//! back/forward stack.

use url::Url;

/// Tab history
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Url>,
    index: usize,
}

impl History {
    pub fn new(initial: Url) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    /// Entry under the cursor
    pub fn current(&self) -> &Url {
        &self.entries[self.index]
    }

    /// Add an entry after the cursor, dropping any forward entries
    pub fn push(&mut self, url: Url) {
        self.entries.truncate(self.index + 1);
        self.entries.push(url);
        self.index = self.entries.len() - 1;
    }

    /// Move back one entry
    pub fn back(&mut self) -> Option<&Url> {
        if self.can_go_back() {
            self.index -= 1;
            Some(self.current())
        } else {
            None
        }
    }

    /// Move forward one entry
    pub fn forward(&mut self) -> Option<&Url> {
        if self.can_go_forward() {
            self.index += 1;
            Some(self.current())
        } else {
            None
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[Url] {
        &self.entries
    }
}

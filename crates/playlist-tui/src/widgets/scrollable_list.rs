//! Generic scrollable list with a keyboard cursor.
//!
//! The cursor is navigation only.  Whatever "selected" means to the owner
//! (e.g. the active station) is tracked elsewhere.

pub struct ScrollableList<T> {
    pub items: Vec<T>,
    pub cursor: usize,
    pub scroll_offset: usize,
}

impl<T> Default for ScrollableList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            scroll_offset: 0,
        }
    }
}

impl<T> ScrollableList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        if self.cursor >= self.items.len() {
            self.cursor = self.items.len().saturating_sub(1);
        }
        self.scroll_offset = self.scroll_offset.min(self.cursor);
    }

    pub fn cursor_up(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_sub(n);
    }

    pub fn cursor_down(&mut self, n: usize) {
        if self.items.is_empty() {
            return;
        }
        self.cursor = (self.cursor + n).min(self.items.len() - 1);
    }

    pub fn cursor_first(&mut self) {
        self.cursor = 0;
        self.scroll_offset = 0;
    }

    pub fn cursor_last(&mut self) {
        self.cursor = self.items.len().saturating_sub(1);
    }

    pub fn set_cursor(&mut self, idx: usize) {
        if idx < self.items.len() {
            self.cursor = idx;
        }
    }

    pub fn cursor_item(&self) -> Option<&T> {
        self.items.get(self.cursor)
    }

    /// `(index, &item)` pairs visible in a window of `rows` entries.
    /// Call `ensure_visible` first to update `scroll_offset`.
    pub fn visible_items(&self, rows: usize) -> Vec<(usize, &T)> {
        if rows == 0 || self.items.is_empty() {
            return Vec::new();
        }
        let start = self.scroll_offset.min(self.items.len());
        let end = (start + rows).min(self.items.len());
        self.items[start..end]
            .iter()
            .enumerate()
            .map(|(i, item)| (start + i, item))
            .collect()
    }

    pub fn ensure_visible(&mut self, rows: usize) {
        if rows == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + rows {
            self.scroll_offset = self.cursor + 1 - rows;
        }
    }

    /// Move the cursor to the entry drawn at window position `entry`.
    /// Returns the item index hit, if any.
    pub fn handle_click(&mut self, entry: usize) -> Option<usize> {
        let target = self.scroll_offset + entry;
        if target < self.items.len() {
            self.cursor = target;
            Some(target)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

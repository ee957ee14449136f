//! FocusRing: manages keyboard focus cycling between components.

use crate::action::ComponentId;

pub struct FocusRing {
    items: Vec<ComponentId>,
    current: usize,
}

impl FocusRing {
    pub fn new(items: Vec<ComponentId>) -> Self {
        Self { items, current: 0 }
    }

    pub fn current(&self) -> Option<ComponentId> {
        self.items.get(self.current).copied()
    }

    pub fn next(&mut self) -> Option<ComponentId> {
        if self.items.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.items.len();
        self.current()
    }

    pub fn prev(&mut self) -> Option<ComponentId> {
        if self.items.is_empty() {
            return None;
        }
        self.current = if self.current == 0 {
            self.items.len() - 1
        } else {
            self.current - 1
        };
        self.current()
    }

    pub fn set(&mut self, id: ComponentId) {
        if let Some(pos) = self.items.iter().position(|&x| x == id) {
            self.current = pos;
        }
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.current() == Some(id)
    }

    /// Replace the ring contents (the playback panel comes and goes).
    /// Keeps the focused id if it survives, else falls back to the first.
    pub fn set_items(&mut self, items: Vec<ComponentId>) {
        let old = self.current();
        self.items = items;
        self.current = old
            .and_then(|id| self.items.iter().position(|&x| x == id))
            .unwrap_or(0);
    }
}

impl Default for FocusRing {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle() {
        let mut ring = FocusRing::new(vec![
            ComponentId::StationSelector,
            ComponentId::PlaybackPanel,
        ]);
        assert_eq!(ring.current(), Some(ComponentId::StationSelector));
        assert_eq!(ring.next(), Some(ComponentId::PlaybackPanel));
        assert_eq!(ring.next(), Some(ComponentId::StationSelector));
        assert_eq!(ring.prev(), Some(ComponentId::PlaybackPanel));
    }

    #[test]
    fn test_set_items_falls_back_when_focused_item_removed() {
        let mut ring = FocusRing::new(vec![
            ComponentId::StationSelector,
            ComponentId::PlaybackPanel,
        ]);
        ring.set(ComponentId::PlaybackPanel);
        ring.set_items(vec![ComponentId::StationSelector]);
        assert!(ring.is_focused(ComponentId::StationSelector));

        ring.set_items(vec![
            ComponentId::StationSelector,
            ComponentId::PlaybackPanel,
        ]);
        assert!(ring.is_focused(ComponentId::StationSelector));
    }

    #[test]
    fn test_empty_ring() {
        let mut ring = FocusRing::default();
        assert_eq!(ring.next(), None);
        assert_eq!(ring.prev(), None);
        assert!(!ring.is_focused(ComponentId::PlaybackPanel));
    }
}

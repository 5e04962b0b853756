//! The inbox: a FIFO backlog of captured notes.

use chrono::{DateTime, Utc};

use crate::entry::CaptureItem;
use crate::list::ListStore;
use crate::types::{IdGenerator, ItemId};

/// Ordered backlog of captures, oldest first.
///
/// Each queue owns its own id generator, so ids issued by one queue are
/// strictly increasing and never collide with each other.
#[derive(Debug, Clone, Default)]
pub struct CaptureQueue {
    items: ListStore<CaptureItem>,
    ids: IdGenerator,
}

impl PartialEq for CaptureQueue {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl CaptureQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures `text` at the tail of the queue.
    pub fn add(&mut self, text: impl Into<String>) -> ItemId {
        self.add_at(text, Utc::now())
    }

    /// Captures `text` with an id derived from `now`.
    pub fn add_at(&mut self, text: impl Into<String>, now: DateTime<Utc>) -> ItemId {
        let id = self.ids.next_at(now);
        self.items.insert(id.clone(), CaptureItem::new(text));
        tracing::debug!(%id, "captured inbox item");
        id
    }

    /// Oldest item, the next one to triage.
    pub fn front(&self) -> Option<(&ItemId, &CaptureItem)> {
        self.items.first()
    }

    /// Removes and returns the oldest item.
    pub fn pop_front(&mut self) -> Option<(ItemId, CaptureItem)> {
        self.items.pop_first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates items oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &CaptureItem)> {
        self.items.iter()
    }

    /// The backing keyed store.
    pub const fn items(&self) -> &ListStore<CaptureItem> {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut ListStore<CaptureItem> {
        &mut self.items
    }

    /// Replaces the backlog wholesale, keeping the id generator.
    pub(crate) fn replace(&mut self, items: ListStore<CaptureItem>) {
        self.items = items;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_is_oldest_capture() {
        let mut queue = CaptureQueue::new();
        let first = queue.add("Buy milk");
        let second = queue.add("Call mom");

        let (id, item) = queue.front().unwrap();
        assert_eq!(id, &first);
        assert_eq!(item.text, "Buy milk");

        let (popped, _) = queue.pop_front().unwrap();
        assert_eq!(popped, first);
        assert_eq!(queue.front().map(|(id, _)| id), Some(&second));
    }

    #[test]
    fn rapid_captures_get_distinct_ids() {
        let mut queue = CaptureQueue::new();
        let now = Utc::now();
        let ids: Vec<_> = (0..5).map(|n| queue.add_at(format!("note {n}"), now)).collect();

        assert_eq!(queue.len(), 5);
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn queues_do_not_share_items() {
        let mut first = CaptureQueue::new();
        let second = CaptureQueue::new();
        first.add("only in the first queue");
        assert!(second.is_empty());
    }
}

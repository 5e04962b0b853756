//! In-process remote store and event source.
//!
//! Used by tests and for offline sessions where nothing should leave the
//! process.

use std::cell::RefCell;

use chrono::{Duration, Local, Utc};
use serde_json::Value;

use crate::entry::{CalendarEntry, EventTime};
use crate::sync::{Collection, EventSource, RemoteError, RemoteStore, Snapshot};
use crate::types::ItemId;

/// A remote store held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: RefCell<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing remote contents.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RefCell::new(snapshot),
        }
    }

    /// A copy of the current contents.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }
}

impl RemoteStore for MemoryStore {
    fn fetch(&self) -> Result<Snapshot, RemoteError> {
        Ok(self.snapshot())
    }

    fn replace(&self, collection: &str, records: &Collection) -> Result<(), RemoteError> {
        let mut snapshot = self.snapshot.borrow_mut();
        if records.is_empty() {
            snapshot.remove(collection);
        } else {
            snapshot.insert(collection, records.clone());
        }
        Ok(())
    }

    fn upsert(&self, collection: &str, id: &ItemId, record: &Value) -> Result<(), RemoteError> {
        let mut snapshot = self.snapshot.borrow_mut();
        let mut records = snapshot.remove(collection).unwrap_or_default();
        records.insert(id.to_string(), record.clone());
        snapshot.insert(collection, records);
        Ok(())
    }
}

/// An event source held in memory.
#[derive(Debug, Default)]
pub struct MemoryCalendar {
    events: RefCell<Vec<CalendarEntry>>,
    unavailable: bool,
}

impl MemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// A calendar whose every call fails as unreachable.
    pub fn unavailable() -> Self {
        Self {
            events: RefCell::default(),
            unavailable: true,
        }
    }

    /// Every stored event, in creation order.
    pub fn events(&self) -> Vec<CalendarEntry> {
        self.events.borrow().clone()
    }

    fn check(&self) -> Result<(), RemoteError> {
        if self.unavailable {
            return Err(RemoteError::Unavailable("calendar offline".to_string()));
        }
        Ok(())
    }
}

impl EventSource for MemoryCalendar {
    fn upcoming(&self, days: u32) -> Result<Vec<CalendarEntry>, RemoteError> {
        self.check()?;
        let now = Local::now().naive_local();
        let until = now + Duration::days(i64::from(days));
        let mut events: Vec<_> = self
            .events
            .borrow()
            .iter()
            .filter(|event| event.end.local() >= now && event.start.local() <= until)
            .cloned()
            .collect();
        events.sort_by_key(|event| event.start.local());
        Ok(events)
    }

    fn create(
        &self,
        start: EventTime,
        end: EventTime,
        summary: &str,
    ) -> Result<CalendarEntry, RemoteError> {
        self.check()?;
        let entry = CalendarEntry {
            start,
            end,
            summary: summary.to_string(),
            created: Utc::now(),
        };
        self.events.borrow_mut().push(entry.clone());
        Ok(entry)
    }
}

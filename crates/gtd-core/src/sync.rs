//! The boundary to the remote store and the external event source.
//!
//! # Consistency
//!
//! The remote store is authoritative and is written with whole-collection
//! overwrite: [`SyncCoordinator::export`] replaces every collection with the
//! local contents, so anything missing locally is deleted remotely. Exporting
//! is therefore only safe after an [`import`](SyncCoordinator::import) in the
//! same process. Collections are written one at a time; an interrupted export
//! can leave some collections updated and others not.
//!
//! The calendar never round-trips: import always refreshes it from the event
//! source, and export only mirrors it for other readers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::entry::{CalendarEntry, CaptureItem, EventTime};
use crate::list::{CalendarList, ListKind};
use crate::types::ItemId;
use crate::workspace::Workspace;

/// Records of one remote collection, keyed by entry id.
pub type Collection = BTreeMap<String, Value>;

/// All collections of the remote store, keyed by collection name.
///
/// A collection that does not exist remotely is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    collections: BTreeMap<String, Collection>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, collection: &str) -> Option<&Collection> {
        self.collections.get(collection)
    }

    pub fn insert(&mut self, collection: impl Into<String>, records: Collection) {
        self.collections.insert(collection.into(), records);
    }

    pub fn remove(&mut self, collection: &str) -> Option<Collection> {
        self.collections.remove(collection)
    }

    /// Iterates collections by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Collection)> {
        self.collections
            .iter()
            .map(|(name, records)| (name.as_str(), records))
    }
}

/// Remote store and event source errors.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service could not be reached.
    #[error("remote unavailable: {0}")]
    Unavailable(String),
    /// The service answered with an error (e.g. bad credentials).
    #[error("remote rejected request: {0}")]
    Rejected(String),
    /// A remote record did not have the shape of its list.
    #[error("invalid record {id} in {collection}: {message}")]
    InvalidRecord {
        collection: &'static str,
        id: String,
        message: String,
    },
    /// A local entry could not be encoded.
    #[error("failed to encode {collection}: {source}")]
    Encode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// Failure inside a storage backend.
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

/// A keyed document store with named top-level collections.
pub trait RemoteStore {
    /// Reads every collection.
    fn fetch(&self) -> Result<Snapshot, RemoteError>;

    /// Replaces one collection wholesale. An empty map deletes it.
    fn replace(&self, collection: &str, records: &Collection) -> Result<(), RemoteError>;

    /// Writes a single record, leaving the rest of the collection alone.
    fn upsert(&self, collection: &str, id: &ItemId, record: &Value) -> Result<(), RemoteError>;
}

/// The external calendar.
pub trait EventSource {
    /// Events starting within the next `days` days, ordered by start.
    fn upcoming(&self, days: u32) -> Result<Vec<CalendarEntry>, RemoteError>;

    /// Creates one event and returns it as the source recorded it.
    fn create(
        &self,
        start: EventTime,
        end: EventTime,
        summary: &str,
    ) -> Result<CalendarEntry, RemoteError>;
}

/// What an import changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Lists replaced by their remote copy.
    pub imported: Vec<ListKind>,
    /// Lists with no remote collection; they kept their local contents.
    pub missing: Vec<ListKind>,
    /// Events loaded from the event source.
    pub calendar_events: usize,
}

/// Moves list data between the local workspace and the remote collaborators.
///
/// Holds explicit handles to both collaborators; they are constructed once at
/// startup and passed in.
pub struct SyncCoordinator<'a> {
    store: &'a dyn RemoteStore,
    events: &'a dyn EventSource,
    lookahead_days: u32,
}

impl<'a> SyncCoordinator<'a> {
    /// Days of upcoming events loaded on import.
    pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 10;

    pub fn new(store: &'a dyn RemoteStore, events: &'a dyn EventSource) -> Self {
        Self {
            store,
            events,
            lookahead_days: Self::DEFAULT_LOOKAHEAD_DAYS,
        }
    }

    #[must_use]
    pub const fn with_lookahead(mut self, days: u32) -> Self {
        self.lookahead_days = days;
        self
    }

    /// Overwrites every remote collection with the local contents.
    pub fn export(&self, workspace: &Workspace) -> Result<(), RemoteError> {
        let mut snapshot = workspace.to_snapshot()?;
        for kind in ListKind::ALL {
            let records = snapshot.remove(kind.collection()).unwrap_or_default();
            tracing::debug!(
                collection = kind.collection(),
                records = records.len(),
                "replacing remote collection"
            );
            self.store.replace(kind.collection(), &records)?;
        }
        Ok(())
    }

    /// Loads the remote lists and refreshes the calendar.
    ///
    /// Both collaborators are read before anything local changes, so a
    /// failure leaves the workspace untouched.
    pub fn import(&self, workspace: &mut Workspace) -> Result<ImportReport, RemoteError> {
        let snapshot = self.store.fetch()?;
        let events = self.events.upcoming(self.lookahead_days)?;

        let mut report = workspace.apply_snapshot(&snapshot)?;
        for kind in &report.missing {
            tracing::debug!(collection = kind.collection(), "no remote collection, keeping local list");
        }
        report.calendar_events = events.len();
        workspace.calendar = CalendarList::from(events);
        tracing::debug!(
            imported = report.imported.len(),
            calendar_events = report.calendar_events,
            "import finished"
        );
        Ok(report)
    }

    /// Stores one new capture remotely without touching other records.
    pub fn capture(&self, id: &ItemId, item: &CaptureItem) -> Result<(), RemoteError> {
        let record = serde_json::to_value(item).map_err(|source| RemoteError::Encode {
            collection: ListKind::Inbox.collection(),
            source,
        })?;
        self.store
            .upsert(ListKind::Inbox.collection(), id, &record)
    }

    /// Creates an event in the external calendar.
    pub fn schedule(
        &self,
        start: EventTime,
        end: EventTime,
        summary: &str,
    ) -> Result<CalendarEntry, RemoteError> {
        tracing::debug!(summary, "creating calendar event");
        self.events.create(start, end, summary)
    }
}

//! SQLite storage for gtd.
//!
//! A local stand-in for the remote document store and the calendar service,
//! so the whole workflow runs offline against a single file.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not
//! `Sync`. Move it between threads if needed; do not share it.
//!
//! # Schema
//!
//! ## Records
//!
//! `records` holds one row per list entry, keyed by `(collection, id)`. The
//! `data` column stores the entry fields as JSON, exactly as they would be
//! stored remotely. A collection exists only while it has rows, which matches
//! remote semantics where writing an empty collection deletes it.
//!
//! ## Events
//!
//! `events` holds calendar events. `starts_at` and `ends_at` are local
//! wall-clock times (`2024-06-02T15:00:00`) used for range queries; the
//! `start_time` and `end_time` columns keep the exact JSON form of each
//! bound so all-day events stay all-day.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Duration, Local, NaiveDateTime, SecondsFormat, Utc};
use gtd_core::{
    CalendarEntry, Collection, EventSource, EventTime, ItemId, RemoteError, RemoteStore, Snapshot,
};
use rusqlite::{Connection, params};
use serde_json::Value;
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored record is not valid JSON.
    #[error("invalid data for {collection}/{id}: {source}")]
    InvalidData {
        collection: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },
    /// A stored event could not be decoded.
    #[error("invalid event {event_id}: {message}")]
    InvalidEvent { event_id: i64, message: String },
    /// An event time could not be encoded.
    #[error("failed to encode event time: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<DbError> for RemoteError {
    fn from(err: DbError) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database, destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the schema. Idempotent.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS records (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            );

            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                starts_at TEXT NOT NULL,
                ends_at TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                summary TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_events_starts_at ON events(starts_at);
            ",
        )?;
        Ok(())
    }

    /// Reads every collection.
    pub fn collections(&self) -> Result<Snapshot, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT collection, id, data
            FROM records
            ORDER BY collection ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            let collection: String = row.get(0)?;
            let id: String = row.get(1)?;
            let data: String = row.get(2)?;
            Ok((collection, id, data))
        })?;

        let mut grouped: BTreeMap<String, Collection> = BTreeMap::new();
        for row in rows {
            let (collection, id, data) = row?;
            let record = serde_json::from_str::<Value>(&data).map_err(|source| {
                DbError::InvalidData {
                    collection: collection.clone(),
                    id: id.clone(),
                    source,
                }
            })?;
            grouped.entry(collection).or_default().insert(id, record);
        }

        let mut snapshot = Snapshot::new();
        for (name, records) in grouped {
            snapshot.insert(name, records);
        }
        Ok(snapshot)
    }

    /// Replaces a collection wholesale in one transaction.
    ///
    /// Returns the number of records written.
    pub fn replace_collection(
        &self,
        collection: &str,
        records: &Collection,
    ) -> Result<usize, DbError> {
        let updated_at = format_timestamp(Utc::now());
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM records WHERE collection = ?", [collection])?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (collection, id, data, updated_at) VALUES (?, ?, ?, ?)",
            )?;
            for (id, record) in records {
                written += stmt.execute(params![collection, id, record.to_string(), updated_at])?;
            }
        }
        tx.commit()?;
        tracing::debug!(collection, written, "replaced collection");
        Ok(written)
    }

    /// Inserts or overwrites one record.
    pub fn upsert_record(&self, collection: &str, id: &str, record: &Value) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO records (collection, id, data, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(collection, id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            ",
            params![
                collection,
                id,
                record.to_string(),
                format_timestamp(Utc::now())
            ],
        )?;
        Ok(())
    }

    /// Stores an event and returns it as recorded.
    pub fn insert_event(
        &self,
        start: EventTime,
        end: EventTime,
        summary: &str,
        created: DateTime<Utc>,
    ) -> Result<CalendarEntry, DbError> {
        let entry = CalendarEntry {
            start,
            end,
            summary: summary.to_string(),
            created,
        };
        self.conn.execute(
            "
            INSERT INTO events (starts_at, ends_at, start_time, end_time, summary, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![
                format_local(entry.start.local()),
                format_local(entry.end.local()),
                serde_json::to_string(&entry.start).map_err(DbError::Encode)?,
                serde_json::to_string(&entry.end).map_err(DbError::Encode)?,
                entry.summary,
                entry.created.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;
        Ok(entry)
    }

    /// Events that have not ended by `from` and start no later than `until`,
    /// ordered by start.
    pub fn events_between(
        &self,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<CalendarEntry>, DbError> {
        if until < from {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "
            SELECT id, start_time, end_time, summary, created_at
            FROM events
            WHERE ends_at >= ? AND starts_at <= ?
            ORDER BY starts_at ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([format_local(from), format_local(until)], |row| {
            let id: i64 = row.get(0)?;
            let start: String = row.get(1)?;
            let end: String = row.get(2)?;
            let summary: String = row.get(3)?;
            let created: String = row.get(4)?;
            Ok((id, start, end, summary, created))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (event_id, start, end, summary, created) = row?;
            let invalid = |message: String| DbError::InvalidEvent { event_id, message };
            let start = serde_json::from_str(&start).map_err(|e| invalid(e.to_string()))?;
            let end = serde_json::from_str(&end).map_err(|e| invalid(e.to_string()))?;
            let created = DateTime::parse_from_rfc3339(&created)
                .map_err(|e| invalid(format!("created_at: {e}")))?
                .with_timezone(&Utc);
            events.push(CalendarEntry {
                start,
                end,
                summary,
                created,
            });
        }
        Ok(events)
    }
}

impl RemoteStore for Database {
    fn fetch(&self) -> Result<Snapshot, RemoteError> {
        Ok(self.collections()?)
    }

    fn replace(&self, collection: &str, records: &Collection) -> Result<(), RemoteError> {
        self.replace_collection(collection, records)?;
        Ok(())
    }

    fn upsert(&self, collection: &str, id: &ItemId, record: &Value) -> Result<(), RemoteError> {
        Ok(self.upsert_record(collection, id.as_str(), record)?)
    }
}

impl EventSource for Database {
    fn upcoming(&self, days: u32) -> Result<Vec<CalendarEntry>, RemoteError> {
        let now = Local::now().naive_local();
        Ok(self.events_between(now, now + Duration::days(i64::from(days)))?)
    }

    fn create(
        &self,
        start: EventTime,
        end: EventTime,
        summary: &str,
    ) -> Result<CalendarEntry, RemoteError> {
        Ok(self.insert_event(start, end, summary, Utc::now())?)
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_local(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

//! Core domain logic for gtd.
//!
//! This crate contains the fundamental types and logic for:
//! - Capture: the FIFO inbox of raw notes and its time-derived ids
//! - Triage: the per-item classification loop that files captures into lists
//! - Maintenance: completing or trashing entries of an existing list
//! - Sync: whole-collection export/import against a remote store

pub mod collector;
pub mod entry;
mod error;
pub mod list;
pub mod maintenance;
pub mod memory;
mod queue;
pub mod sync;
pub mod triage;
pub mod types;
pub mod when;
mod workspace;

pub use collector::{Collector, CollectorError, ScriptedCollector};
pub use entry::{
    CalendarEntry, CaptureItem, CompletedItem, Entry, EventTime, MaybeSomeday, NextAction,
    Project, WaitingFor,
};
pub use error::Error;
pub use list::{CalendarList, ListKind, ListSelector, ListStore, UnknownList};
pub use maintenance::{MaintainedList, MaintenanceEngine, MaintenanceSummary};
pub use queue::CaptureQueue;
pub use sync::{
    Collection, EventSource, ImportReport, RemoteError, RemoteStore, Snapshot, SyncCoordinator,
};
pub use triage::{TriageAction, TriageEngine, TriageSummary};
pub use types::{IdGenerator, ItemId, ValidationError};
pub use workspace::Workspace;

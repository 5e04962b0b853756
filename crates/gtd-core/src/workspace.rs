//! The local working set: every list in one place.

use crate::entry::{CompletedItem, Entry, MaybeSomeday, NextAction, Project, WaitingFor};
use crate::list::{CalendarList, ListKind, ListSelector, ListStore};
use crate::maintenance::MaintainedList;
use crate::queue::CaptureQueue;
use crate::sync::{Collection, ImportReport, RemoteError, Snapshot};
use crate::types::ItemId;

/// All lists of one session.
///
/// Every field is constructed fresh per workspace; nothing is shared
/// between instances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspace {
    pub inbox: CaptureQueue,
    pub next_actions: ListStore<NextAction>,
    pub waiting_for: ListStore<WaitingFor>,
    pub projects: ListStore<Project>,
    pub maybe_someday: ListStore<MaybeSomeday>,
    pub completed_items: ListStore<CompletedItem>,
    pub calendar: CalendarList,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the triage destinations (everything but the inbox).
    pub fn filed_count(&self) -> usize {
        self.next_actions.len()
            + self.waiting_for.len()
            + self.projects.len()
            + self.maybe_someday.len()
            + self.completed_items.len()
            + self.calendar.len()
    }

    /// A list opened for maintenance, plus the archive that `done` moves into.
    pub fn maintained(
        &mut self,
        selector: ListSelector,
    ) -> (&mut dyn MaintainedList, &mut ListStore<CompletedItem>) {
        let list: &mut dyn MaintainedList = match selector {
            ListSelector::Inbox => &mut self.inbox,
            ListSelector::NextActions => &mut self.next_actions,
            ListSelector::WaitingFor => &mut self.waiting_for,
            ListSelector::Projects => &mut self.projects,
            ListSelector::MaybeSomeday => &mut self.maybe_someday,
            ListSelector::Calendar => &mut self.calendar,
        };
        (list, &mut self.completed_items)
    }

    /// Encodes every list as remote collections.
    pub fn to_snapshot(&self) -> Result<Snapshot, RemoteError> {
        let mut snapshot = Snapshot::new();
        snapshot.insert(ListKind::Inbox.collection(), encode(self.inbox.items())?);
        snapshot.insert(ListKind::NextActions.collection(), encode(&self.next_actions)?);
        snapshot.insert(ListKind::WaitingFor.collection(), encode(&self.waiting_for)?);
        snapshot.insert(ListKind::Projects.collection(), encode(&self.projects)?);
        snapshot.insert(ListKind::MaybeSomeday.collection(), encode(&self.maybe_someday)?);
        snapshot.insert(
            ListKind::CompletedItems.collection(),
            encode(&self.completed_items)?,
        );

        let mut calendar = Collection::new();
        for entry in self.calendar.iter() {
            let record = serde_json::to_value(entry).map_err(|source| RemoteError::Encode {
                collection: ListKind::Calendar.collection(),
                source,
            })?;
            calendar.insert(entry.remote_id().to_string(), record);
        }
        snapshot.insert(ListKind::Calendar.collection(), calendar);
        Ok(snapshot)
    }

    /// Replaces each keyed list that exists in `snapshot` with a decoded copy.
    ///
    /// Lists without a remote collection keep their current contents. All
    /// lists are decoded before any is replaced, so a malformed record leaves
    /// the workspace unchanged. The calendar is never read from a snapshot.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Result<ImportReport, RemoteError> {
        let inbox = decode(snapshot)?;
        let next_actions = decode(snapshot)?;
        let waiting_for = decode(snapshot)?;
        let projects = decode(snapshot)?;
        let maybe_someday = decode(snapshot)?;
        let completed_items = decode(snapshot)?;

        let mut report = ImportReport::default();
        let mut track = |kind: ListKind, present: bool| {
            if present {
                report.imported.push(kind);
            } else {
                report.missing.push(kind);
            }
        };
        track(ListKind::Inbox, inbox.is_some());
        track(ListKind::NextActions, next_actions.is_some());
        track(ListKind::WaitingFor, waiting_for.is_some());
        track(ListKind::Projects, projects.is_some());
        track(ListKind::MaybeSomeday, maybe_someday.is_some());
        track(ListKind::CompletedItems, completed_items.is_some());

        if let Some(inbox) = inbox {
            self.inbox.replace(inbox);
        }
        if let Some(list) = next_actions {
            self.next_actions = list;
        }
        if let Some(list) = waiting_for {
            self.waiting_for = list;
        }
        if let Some(list) = projects {
            self.projects = list;
        }
        if let Some(list) = maybe_someday {
            self.maybe_someday = list;
        }
        if let Some(list) = completed_items {
            self.completed_items = list;
        }
        Ok(report)
    }
}

fn encode<T: Entry>(store: &ListStore<T>) -> Result<Collection, RemoteError> {
    store
        .iter()
        .map(|(id, entry)| {
            let record = serde_json::to_value(entry).map_err(|source| RemoteError::Encode {
                collection: T::KIND.collection(),
                source,
            })?;
            Ok((id.to_string(), record))
        })
        .collect()
}

/// Decodes the collection for `T`, or `None` when it is absent.
fn decode<T: Entry>(snapshot: &Snapshot) -> Result<Option<ListStore<T>>, RemoteError> {
    let collection = T::KIND.collection();
    let Some(records) = snapshot.get(collection) else {
        return Ok(None);
    };
    let invalid = |id: &str, message: String| RemoteError::InvalidRecord {
        collection,
        id: id.to_string(),
        message,
    };
    records
        .iter()
        .map(|(raw_id, record)| {
            let id = ItemId::new(raw_id.clone()).map_err(|err| invalid(raw_id, err.to_string()))?;
            let entry = serde_json::from_value::<T>(record.clone())
                .map_err(|err| invalid(raw_id, err.to_string()))?;
            Ok((id, entry))
        })
        .collect::<Result<ListStore<T>, RemoteError>>()
        .map(Some)
}

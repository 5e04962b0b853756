//! List identities and the containers that hold their entries.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::entry::CalendarEntry;
use crate::types::ItemId;

/// Every list the remote store knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListKind {
    Inbox,
    NextActions,
    WaitingFor,
    Projects,
    MaybeSomeday,
    CompletedItems,
    Calendar,
}

impl ListKind {
    /// All lists, in export order.
    pub const ALL: [Self; 7] = [
        Self::Inbox,
        Self::NextActions,
        Self::WaitingFor,
        Self::Projects,
        Self::MaybeSomeday,
        Self::CompletedItems,
        Self::Calendar,
    ];

    /// Name of the top-level remote collection.
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::NextActions => "next_actions",
            Self::WaitingFor => "waiting_for",
            Self::Projects => "projects",
            Self::MaybeSomeday => "maybe_someday",
            Self::CompletedItems => "completed_items",
            Self::Calendar => "calendar",
        }
    }

    /// Human-readable title.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::NextActions => "Next Actions",
            Self::WaitingFor => "Waiting For",
            Self::Projects => "Projects",
            Self::MaybeSomeday => "Maybe Someday",
            Self::CompletedItems => "Completed Items",
            Self::Calendar => "Calendar",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collection())
    }
}

/// Lists that can be opened for maintenance.
///
/// Completed items are an archive and cannot be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListSelector {
    Inbox,
    NextActions,
    WaitingFor,
    Projects,
    MaybeSomeday,
    Calendar,
}

impl ListSelector {
    pub const fn kind(self) -> ListKind {
        match self {
            Self::Inbox => ListKind::Inbox,
            Self::NextActions => ListKind::NextActions,
            Self::WaitingFor => ListKind::WaitingFor,
            Self::Projects => ListKind::Projects,
            Self::MaybeSomeday => ListKind::MaybeSomeday,
            Self::Calendar => ListKind::Calendar,
        }
    }
}

/// Error for list selectors that match no list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownList(String);

impl fmt::Display for UnknownList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown list: {} (expected inbox, next, waiting, projects, maybe or calendar)",
            self.0
        )
    }
}

impl std::error::Error for UnknownList {}

impl FromStr for ListSelector {
    type Err = UnknownList;

    /// Selects by first letter, so `n`, `next` and `next_actions` all work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let first = s.trim().chars().next().map(|c| c.to_ascii_lowercase());
        match first {
            Some('i') => Ok(Self::Inbox),
            Some('n') => Ok(Self::NextActions),
            Some('w') => Ok(Self::WaitingFor),
            Some('p') => Ok(Self::Projects),
            Some('m') => Ok(Self::MaybeSomeday),
            Some('c') => Ok(Self::Calendar),
            _ => Err(UnknownList(s.to_string())),
        }
    }
}

/// Entries of one keyed list, ordered by id.
///
/// Because ids are time-derived, id order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListStore<T> {
    entries: BTreeMap<ItemId, T>,
}

impl<T> Default for ListStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ListStore<T> {
    /// Creates an empty store.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Inserts an entry, returning the one it replaced.
    pub fn insert(&mut self, id: ItemId, entry: T) -> Option<T> {
        self.entries.insert(id, entry)
    }

    pub fn get(&self, id: &ItemId) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn remove(&mut self, id: &ItemId) -> Option<T> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &T)> {
        self.entries.iter()
    }

    /// The entry at a rendered position.
    pub fn entry_at(&self, index: usize) -> Option<(&ItemId, &T)> {
        self.entries.iter().nth(index)
    }

    /// Removes the entry at a rendered position.
    pub fn remove_at(&mut self, index: usize) -> Option<(ItemId, T)> {
        let id = self.entries.keys().nth(index)?.clone();
        self.entries.remove_entry(&id)
    }

    pub(crate) fn first(&self) -> Option<(&ItemId, &T)> {
        self.entries.first_key_value()
    }

    pub(crate) fn pop_first(&mut self) -> Option<(ItemId, T)> {
        self.entries.pop_first()
    }
}

impl<T> FromIterator<(ItemId, T)> for ListStore<T> {
    fn from_iter<I: IntoIterator<Item = (ItemId, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Calendar entries in the order the event source returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarList {
    entries: Vec<CalendarEntry>,
}

impl CalendarList {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: CalendarEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CalendarEntry> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&CalendarEntry> {
        self.entries.get(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<CalendarEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }
}

impl From<Vec<CalendarEntry>> for CalendarList {
    fn from(entries: Vec<CalendarEntry>) -> Self {
        Self { entries }
    }
}

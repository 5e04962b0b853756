//! Completing and trashing entries of one list.
//!
//! The operator types a combined token such as `2d`, `0 t` or `q`: an
//! optional index into the rendered list followed by a command letter.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use thiserror::Error;

use crate::collector::{Collector, CollectorError};
use crate::entry::{CompletedItem, Entry};
use crate::list::{CalendarList, ListKind, ListStore};
use crate::queue::CaptureQueue;
use crate::types::ItemId;

static INDEX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static VERB_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[dteq]").unwrap());

/// Command letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Done,
    Trash,
    Edit,
    Quit,
}

/// A token split into its parts, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCommand {
    pub index: Option<usize>,
    pub verb: Option<Verb>,
}

/// A validated command against a list of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Done(usize),
    Trash(usize),
    Edit(usize),
}

/// Rejected tokens. Reported to the operator, never propagated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid input!")]
    NoCommand,
    #[error("You must enter a number to specify target.")]
    MissingIndex,
    #[error("Value out of range.")]
    OutOfRange { index: usize, len: usize },
}

/// Splits a token: the first digit run is the index, the first of `d`, `t`,
/// `e` or `q` anywhere in the token is the command.
pub fn parse_command(input: &str) -> ParsedCommand {
    let input = input.to_lowercase();
    let index = INDEX_RE
        .find(&input)
        .map(|m| m.as_str().parse().unwrap_or(usize::MAX));
    let verb = VERB_RE.find(&input).map(|m| match m.as_str() {
        "d" => Verb::Done,
        "t" => Verb::Trash,
        "e" => Verb::Edit,
        _ => Verb::Quit,
    });
    ParsedCommand { index, verb }
}

impl ParsedCommand {
    /// Checks, in order: a command is present, quit needs nothing else, other
    /// commands need an index, and the index is inside the list.
    pub fn validate(self, len: usize) -> Result<Command, InputError> {
        let verb = self.verb.ok_or(InputError::NoCommand)?;
        if verb == Verb::Quit {
            return Ok(Command::Quit);
        }
        let index = self.index.ok_or(InputError::MissingIndex)?;
        if index >= len {
            return Err(InputError::OutOfRange { index, len });
        }
        Ok(match verb {
            Verb::Done => Command::Done(index),
            Verb::Trash => Command::Trash(index),
            Verb::Edit => Command::Edit(index),
            Verb::Quit => Command::Quit,
        })
    }
}

/// A list that can be shown with indices and have entries taken out.
pub trait MaintainedList {
    fn kind(&self) -> ListKind;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display text per entry, in rendered order.
    fn lines(&self) -> Vec<String>;

    /// Removes the entry at `index`, returning its id and text.
    fn take(&mut self, index: usize) -> Option<(ItemId, String)>;
}

impl<T: Entry> MaintainedList for ListStore<T> {
    fn kind(&self) -> ListKind {
        T::KIND
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn lines(&self) -> Vec<String> {
        self.iter().map(|(_, entry)| entry.text().to_string()).collect()
    }

    fn take(&mut self, index: usize) -> Option<(ItemId, String)> {
        self.remove_at(index)
            .map(|(id, entry)| (id, entry.text().to_string()))
    }
}

impl MaintainedList for CaptureQueue {
    fn kind(&self) -> ListKind {
        ListKind::Inbox
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn lines(&self) -> Vec<String> {
        self.items().lines()
    }

    fn take(&mut self, index: usize) -> Option<(ItemId, String)> {
        self.items_mut().take(index)
    }
}

impl MaintainedList for CalendarList {
    fn kind(&self) -> ListKind {
        ListKind::Calendar
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn lines(&self) -> Vec<String> {
        self.iter().map(|entry| entry.summary.clone()).collect()
    }

    fn take(&mut self, index: usize) -> Option<(ItemId, String)> {
        self.remove_at(index)
            .map(|entry| (entry.remote_id(), entry.summary))
    }
}

/// Moves the entry at `index` into the archive.
///
/// Returns the moved id, or `None` (with nothing changed) when the index is
/// out of range.
pub fn complete(
    list: &mut dyn MaintainedList,
    completed: &mut ListStore<CompletedItem>,
    index: usize,
    now: DateTime<Utc>,
) -> Option<ItemId> {
    let (id, text) = list.take(index)?;
    completed.insert(id.clone(), CompletedItem::new(text, now));
    Some(id)
}

/// Counts of what one maintenance session did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceSummary {
    pub completed: usize,
    pub trashed: usize,
    pub rejected: usize,
}

/// The interactive done/trash loop over one list.
#[derive(Debug, Default)]
pub struct MaintenanceEngine;

impl MaintenanceEngine {
    pub const fn new() -> Self {
        Self
    }

    /// Runs until the operator quits.
    ///
    /// Indices refer to the listing printed in the same iteration; the list
    /// is re-rendered after every command.
    pub fn run(
        &self,
        list: &mut dyn MaintainedList,
        completed: &mut ListStore<CompletedItem>,
        collector: &mut dyn Collector,
    ) -> Result<MaintenanceSummary, CollectorError> {
        let mut summary = MaintenanceSummary::default();
        loop {
            collector.say("")?;
            collector.say(list.kind().title())?;
            for (index, line) in list.lines().iter().enumerate() {
                collector.say(&format!("  {index} {line}"))?;
            }
            collector.say("Enter number (if appropriate) followed by command [ie 1 d, 5t]:")?;
            collector.say("(#d)one, (#t)rash, (#e)dit, (q)uit")?;
            let answer = collector.ask("> ")?;

            let command = match parse_command(&answer).validate(list.len()) {
                Ok(command) => command,
                Err(err) => {
                    collector.say(&err.to_string())?;
                    summary.rejected += 1;
                    continue;
                }
            };
            tracing::debug!(?command, list = %list.kind(), "maintenance command");

            match command {
                Command::Quit => {
                    collector.say("Goodbye!")?;
                    return Ok(summary);
                }
                Command::Done(index) => {
                    if complete(list, completed, index, Utc::now()).is_some() {
                        summary.completed += 1;
                        collector
                            .say("Item marked complete and moved to Completed Items list.")?;
                    }
                }
                Command::Trash(index) => {
                    let text = list.lines().swap_remove(index);
                    collector.say(&format!("Delete task: {text}"))?;
                    if collector.confirm("(y/n) ")? {
                        list.take(index);
                        summary.trashed += 1;
                        collector.say("Item deleted.")?;
                    } else {
                        collector.say("Delete aborted.")?;
                    }
                }
                Command::Edit(_) => {
                    collector.say("Editing is not supported.")?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::collector::ScriptedCollector;
    use crate::entry::NextAction;

    fn list(texts: &[&str]) -> ListStore<NextAction> {
        texts
            .iter()
            .enumerate()
            .map(|(n, text)| {
                (
                    ItemId::new(format!("1700000000-00000{n}")).unwrap(),
                    NextAction {
                        text: (*text).to_string(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn parse_finds_index_and_command_anywhere() {
        assert_eq!(
            parse_command("2d"),
            ParsedCommand {
                index: Some(2),
                verb: Some(Verb::Done)
            }
        );
        assert_eq!(
            parse_command("T 10"),
            ParsedCommand {
                index: Some(10),
                verb: Some(Verb::Trash)
            }
        );
        assert_eq!(
            parse_command("quit"),
            ParsedCommand {
                index: None,
                verb: Some(Verb::Quit)
            }
        );
        assert_eq!(parse_command("5x").verb, None);
    }

    #[test]
    fn validation_order() {
        assert_eq!(parse_command("7").validate(3), Err(InputError::NoCommand));
        assert_eq!(parse_command("9q").validate(3), Ok(Command::Quit));
        assert_eq!(parse_command("d").validate(3), Err(InputError::MissingIndex));
        assert_eq!(
            parse_command("3d").validate(3),
            Err(InputError::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(parse_command("0e").validate(3), Ok(Command::Edit(0)));
        assert!(matches!(
            parse_command("99999999999999999999999t").validate(3),
            Err(InputError::OutOfRange { .. })
        ));
    }

    #[test]
    fn done_moves_last_entry_to_archive() {
        let mut store = list(&["x", "y", "z"]);
        let mut completed = ListStore::new();
        let mut collector = ScriptedCollector::new(["2d", "q"]);

        let summary = MaintenanceEngine::new()
            .run(&mut store, &mut completed, &mut collector)
            .unwrap();

        assert_eq!(summary.completed, 1);
        assert_eq!(store.lines(), ["x", "y"]);
        let z_id = ItemId::new("1700000000-000002").unwrap();
        let archived = completed.get(&z_id).unwrap();
        assert_eq!(archived.text, "z");
        assert!(archived.completed_at <= Utc::now());
    }

    #[test]
    fn complete_is_one_step() {
        let mut store = list(&["x", "y"]);
        let mut completed = ListStore::new();
        let before = (store.len(), completed.len());

        assert!(complete(&mut store, &mut completed, 0, Utc::now()).is_some());
        assert_eq!((store.len(), completed.len()), (before.0 - 1, before.1 + 1));

        assert!(complete(&mut store, &mut completed, 5, Utc::now()).is_none());
        assert_eq!((store.len(), completed.len()), (1, 1));
    }

    #[test]
    fn declined_trash_leaves_list_unchanged() {
        let mut store = list(&["x", "y"]);
        let before = store.clone();
        let mut completed = ListStore::new();
        let mut collector = ScriptedCollector::new(["1t", "n", "q"]);

        let summary = MaintenanceEngine::new()
            .run(&mut store, &mut completed, &mut collector)
            .unwrap();

        assert_eq!(store, before);
        assert_eq!(summary.trashed, 0);
        assert!(collector.showed("Delete task: y"));
        assert!(collector.showed("Delete aborted."));
    }

    #[test]
    fn confirmed_trash_removes_without_archiving() {
        let mut store = list(&["x", "y"]);
        let mut completed = ListStore::new();
        let mut collector = ScriptedCollector::new(["0 t", "y", "q"]);

        MaintenanceEngine::new()
            .run(&mut store, &mut completed, &mut collector)
            .unwrap();

        assert_eq!(store.lines(), ["y"]);
        assert!(completed.is_empty());
    }

    #[test]
    fn rejected_commands_do_not_mutate() {
        let mut store = list(&["x", "y"]);
        let before = store.clone();
        let mut completed = ListStore::new();
        let mut collector = ScriptedCollector::new(["2d", "d", "zz", "0e", "q"]);

        let summary = MaintenanceEngine::new()
            .run(&mut store, &mut completed, &mut collector)
            .unwrap();

        assert_eq!(store, before);
        assert!(completed.is_empty());
        assert_eq!(summary.rejected, 3);
        assert!(collector.showed("Value out of range."));
        assert!(collector.showed("You must enter a number to specify target."));
        assert!(collector.showed("Invalid input!"));
        assert!(collector.showed("Editing is not supported."));
    }

    #[test]
    fn listing_and_prompts_are_shown_each_round() {
        let mut store = list(&["x", "y"]);
        let mut completed = ListStore::new();
        let mut collector = ScriptedCollector::new(["1t", "y", "q"]);

        MaintenanceEngine::new()
            .run(&mut store, &mut completed, &mut collector)
            .unwrap();

        let shown: Vec<&str> = collector
            .transcript
            .iter()
            .map(|line| line.trim_end())
            .filter(|line| !line.is_empty())
            .collect();
        insta::assert_snapshot!(shown.join("\n"), @r"
        Next Actions
          0 x
          1 y
        Enter number (if appropriate) followed by command [ie 1 d, 5t]:
        (#d)one, (#t)rash, (#e)dit, (q)uit
        >
        Delete task: y
        (y/n)
        Item deleted.
        Next Actions
          0 x
        Enter number (if appropriate) followed by command [ie 1 d, 5t]:
        (#d)one, (#t)rash, (#e)dit, (q)uit
        >
        Goodbye!
        ");
    }

    #[test]
    fn indices_follow_the_fresh_listing() {
        let mut store = list(&["x", "y", "z"]);
        let mut completed = ListStore::new();
        let mut collector = ScriptedCollector::new(["0d", "0d", "q"]);

        MaintenanceEngine::new()
            .run(&mut store, &mut completed, &mut collector)
            .unwrap();

        assert_eq!(store.lines(), ["z"]);
        assert_eq!(completed.len(), 2);
        assert!(collector.showed("  0 y"));
    }
}

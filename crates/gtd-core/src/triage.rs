//! Inbox processing: one capture at a time, filed into exactly one list.
//!
//! The loop is an explicit state machine. [`transition`] is pure; the engine
//! performs the side effects of each state and feeds the result back in as a
//! [`TriageEvent`].

use chrono::Utc;

use crate::collector::Collector;
use crate::entry::{CompletedItem, EventTime, MaybeSomeday, NextAction, Project, WaitingFor};
use crate::error::Error;
use crate::list::ListKind;
use crate::sync::SyncCoordinator;
use crate::types::ItemId;
use crate::workspace::Workspace;

/// Menu choices for a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageAction {
    NextAction,
    DoNow,
    Schedule,
    WaitingFor,
    Project,
    Someday,
    Reference,
    Trash,
}

impl TriageAction {
    /// Menu order, which is also matching priority.
    pub const ALL: [Self; 8] = [
        Self::NextAction,
        Self::DoNow,
        Self::Schedule,
        Self::WaitingFor,
        Self::Project,
        Self::Someday,
        Self::Reference,
        Self::Trash,
    ];

    pub const fn key(self) -> char {
        match self {
            Self::NextAction => 'a',
            Self::DoNow => 'd',
            Self::Schedule => 'c',
            Self::WaitingFor => 'w',
            Self::Project => 'p',
            Self::Someday => 's',
            Self::Reference => 'r',
            Self::Trash => 't',
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NextAction => "Add to Next Actions",
            Self::DoNow => "Do it now in 2 minutes",
            Self::Schedule => "Schedule it -- add to Calendar",
            Self::WaitingFor => "Add to Waiting For list",
            Self::Project => "Add to Projects list",
            Self::Someday => "Add to Someday/Maybe",
            Self::Reference => "Add to Reference",
            Self::Trash => "Already done/Trash",
        }
    }

    /// The first action, in menu order, whose key appears in `input`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|action| input.contains(action.key()))
    }
}

/// Why the current capture is presented again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// No menu key in the answer.
    InvalidInput,
    /// The action exists in the menu but cannot be applied.
    Unsupported(TriageAction),
    /// The operator did not confirm a do-now.
    Declined,
}

impl RetryReason {
    fn message(self) -> Option<&'static str> {
        match self {
            Self::InvalidInput => Some("Invalid input"),
            Self::Unsupported(_) => Some("Not implemented"),
            Self::Declined => None,
        }
    }
}

/// Result of applying an action to the current capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Filed(ListKind),
    Trashed,
    Declined,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageState {
    Presenting,
    AwaitingChoice,
    Applying(TriageAction),
    Retry(RetryReason),
    Advance,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageEvent {
    Presented { has_item: bool },
    Chosen(Option<TriageAction>),
    Applied(Outcome),
    Acknowledged,
}

/// Next state of the loop. Events that do not fit the state leave it as is.
pub fn transition(state: TriageState, event: TriageEvent) -> TriageState {
    use TriageEvent as E;
    use TriageState as S;

    match (state, event) {
        (S::Presenting, E::Presented { has_item: false }) => S::Done,
        (S::Presenting, E::Presented { has_item: true }) => S::AwaitingChoice,
        (S::AwaitingChoice, E::Chosen(None)) => S::Retry(RetryReason::InvalidInput),
        (S::AwaitingChoice, E::Chosen(Some(action))) => S::Applying(action),
        (S::Applying(_), E::Applied(Outcome::Filed(_) | Outcome::Trashed)) => S::Advance,
        (S::Applying(_), E::Applied(Outcome::Declined)) => S::Retry(RetryReason::Declined),
        (S::Applying(action), E::Applied(Outcome::Unsupported)) => {
            S::Retry(RetryReason::Unsupported(action))
        }
        (S::Retry(_) | S::Advance, E::Acknowledged) => S::Presenting,
        (state, _) => state,
    }
}

/// Counts of what one triage session did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriageSummary {
    /// Captures moved into a list, including completed and scheduled ones.
    pub filed: usize,
    pub trashed: usize,
    /// Times a capture was presented again.
    pub retries: usize,
}

/// Drains the inbox front to back.
pub struct TriageEngine<'a> {
    sync: &'a SyncCoordinator<'a>,
    countdown_secs: u64,
}

impl<'a> TriageEngine<'a> {
    /// Length of the do-now countdown.
    pub const DEFAULT_COUNTDOWN_SECS: u64 = 120;

    pub const fn new(sync: &'a SyncCoordinator<'a>) -> Self {
        Self {
            sync,
            countdown_secs: Self::DEFAULT_COUNTDOWN_SECS,
        }
    }

    #[must_use]
    pub const fn with_countdown(mut self, seconds: u64) -> Self {
        self.countdown_secs = seconds;
        self
    }

    /// Processes captures until the inbox is empty.
    ///
    /// The workspace is exported before every capture is presented and once
    /// more when the inbox runs empty. A capture leaves the inbox only after
    /// every prompt for it has been answered and the event source accepted
    /// any scheduled event; errors leave it at the head.
    pub fn process(
        &self,
        workspace: &mut Workspace,
        collector: &mut dyn Collector,
    ) -> Result<TriageSummary, Error> {
        let mut summary = TriageSummary::default();
        let mut state = TriageState::Presenting;
        loop {
            let event = match state {
                TriageState::Presenting => {
                    self.sync.export(workspace)?;
                    TriageEvent::Presented {
                        has_item: present(workspace, collector)?,
                    }
                }
                TriageState::AwaitingChoice => {
                    for action in TriageAction::ALL {
                        collector.say(&format!("({}) {}", action.key(), action.label()))?;
                    }
                    let answer = collector.ask("> ")?;
                    TriageEvent::Chosen(TriageAction::parse(&answer))
                }
                TriageState::Applying(action) => {
                    let outcome = self.apply(action, workspace, collector)?;
                    tracing::debug!(?action, ?outcome, "applied triage action");
                    match outcome {
                        Outcome::Filed(_) => summary.filed += 1,
                        Outcome::Trashed => summary.trashed += 1,
                        Outcome::Declined | Outcome::Unsupported => {}
                    }
                    TriageEvent::Applied(outcome)
                }
                TriageState::Retry(reason) => {
                    if let Some(message) = reason.message() {
                        collector.say(message)?;
                    }
                    summary.retries += 1;
                    TriageEvent::Acknowledged
                }
                TriageState::Advance => TriageEvent::Acknowledged,
                TriageState::Done => {
                    tracing::info!(
                        filed = summary.filed,
                        trashed = summary.trashed,
                        "inbox processed"
                    );
                    return Ok(summary);
                }
            };
            state = transition(state, event);
        }
    }

    fn apply(
        &self,
        action: TriageAction,
        workspace: &mut Workspace,
        collector: &mut dyn Collector,
    ) -> Result<Outcome, Error> {
        let Some((id, text)) = workspace
            .inbox
            .front()
            .map(|(id, item)| (id.clone(), item.text.clone()))
        else {
            return Ok(Outcome::Declined);
        };

        let filed = match action {
            TriageAction::NextAction => {
                collector.say(
                    "Next Action: What's the next thing you need to do to move toward the \
                     desired outcome?\nVisualize yourself doing it and describe it in a \
                     sentence. Be specific. Ie not 'set up meeting', but 'pick up the phone \
                     and call X'.",
                )?;
                let text = collector.ask("NEXT ACTION> ")?;
                take(workspace, &id);
                workspace.next_actions.insert(id, NextAction { text });
                collector.say("New item added to Next Actions list.")?;
                ListKind::NextActions
            }
            TriageAction::DoNow => {
                collector.say("Do it now!")?;
                collector.ask(&format!(
                    "Press Enter to start the {} timer...",
                    describe_duration(self.countdown_secs)
                ))?;
                collector.countdown(self.countdown_secs)?;
                if !collector.confirm("Done? (y/n): ")? {
                    return Ok(Outcome::Declined);
                }
                take(workspace, &id);
                workspace
                    .completed_items
                    .insert(id, CompletedItem::new(text, Utc::now()));
                collector.say("Item marked complete and moved to Completed Items list.")?;
                ListKind::CompletedItems
            }
            TriageAction::Schedule => {
                collector.say("Describe scheduled item:")?;
                let summary = collector.ask("> ")?;
                collector.say("Date (and time, optional):")?;
                let when = collector.ask_date("> ")?;
                let start = EventTime::from_local(when);
                let entry = self.sync.schedule(start, start.default_end(), &summary)?;
                take(workspace, &id);
                workspace.calendar.push(entry);
                collector.say("New item added to Calendar.")?;
                ListKind::Calendar
            }
            TriageAction::WaitingFor => {
                collector.say("Who are you waiting on to do this? (Press Enter to skip.)")?;
                let who = collector.ask("> ")?.trim().to_string();
                collector.say("What are you waiting for?")?;
                let text = collector.ask("> ")?;
                collector.say("When do you expect it to happen? (Press Enter to skip.)")?;
                let due = collector.ask_optional_date("> ")?;
                take(workspace, &id);
                workspace.waiting_for.insert(
                    id,
                    WaitingFor {
                        text,
                        who: (!who.is_empty()).then_some(who),
                        due,
                    },
                );
                collector.say("New item added to Waiting For list.")?;
                ListKind::WaitingFor
            }
            TriageAction::Project => {
                collector.say(
                    "Project: What's the desired outcome? What are you committed to \
                     accomplishing or finishing about this? What would 'done' look like?",
                )?;
                let text = collector.ask("> ")?;
                let title = collector.ask("Short name: ")?;
                take(workspace, &id);
                workspace.projects.insert(
                    id,
                    Project {
                        text,
                        title,
                        next_actions: Vec::new(),
                    },
                );
                collector.say("New Project added to Projects list.")?;
                ListKind::Projects
            }
            TriageAction::Someday => {
                take(workspace, &id);
                workspace.maybe_someday.insert(id, MaybeSomeday { text });
                collector.say("Item added to Someday/Maybe list.")?;
                ListKind::MaybeSomeday
            }
            TriageAction::Reference => return Ok(Outcome::Unsupported),
            TriageAction::Trash => {
                take(workspace, &id);
                collector.say("Item deleted.")?;
                return Ok(Outcome::Trashed);
            }
        };
        Ok(Outcome::Filed(filed))
    }
}

/// Shows the head of the inbox. Returns whether there was one.
fn present(workspace: &Workspace, collector: &mut dyn Collector) -> Result<bool, Error> {
    let Some((_, item)) = workspace.inbox.front() else {
        return Ok(false);
    };
    let left = workspace.inbox.len();
    let noun = if left == 1 { "item" } else { "items" };
    collector.say("")?;
    collector.say(&format!("Process Item ({left} {noun} left)"))?;
    collector.say("")?;
    collector.say(&item.text)?;
    collector.say("")?;
    Ok(true)
}

/// Removes the capture being triaged.
fn take(workspace: &mut Workspace, id: &ItemId) {
    let removed = workspace.inbox.pop_front();
    debug_assert_eq!(removed.as_ref().map(|(removed, _)| removed), Some(id));
}

fn describe_duration(seconds: u64) -> String {
    if seconds % 60 == 0 {
        format!("{} minute", seconds / 60)
    } else {
        format!("{seconds} second")
    }
}

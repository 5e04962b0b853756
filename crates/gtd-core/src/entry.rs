//! Record shapes stored in each list.
//!
//! Every list holds exactly one entry type. Entries carry only their fields;
//! the id lives in the owning [`ListStore`](crate::ListStore) as the key, which
//! is also how the remote store lays records out (`collection -> id -> fields`).

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::list::ListKind;
use crate::types::{ItemId, ValidationError};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

mod private {
    pub trait Sealed {}
}

/// A record type that can live in a keyed list.
///
/// Sealed: the set of list shapes is fixed.
pub trait Entry:
    Serialize + DeserializeOwned + Clone + PartialEq + std::fmt::Debug + private::Sealed
{
    /// The list this entry type belongs to.
    const KIND: ListKind;

    /// The main text of the entry.
    fn text(&self) -> &str;

    /// One-line rendering for the overview.
    fn render(&self, _now: NaiveDateTime) -> String {
        self.text().to_string()
    }
}

/// A raw captured note waiting in the inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureItem {
    pub text: String,
}

impl CaptureItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// The next physical action to take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAction {
    pub text: String,
}

/// Something delegated or expected from someone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingFor {
    pub text: String,
    #[serde(default)]
    pub who: Option<String>,
    /// Expected date in local wall-clock time.
    #[serde(default)]
    pub due: Option<NaiveDateTime>,
}

/// A multi-step outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Desired outcome.
    pub text: String,
    /// Short name.
    #[serde(default)]
    pub title: String,
    /// Ids of the next actions that move the project forward, in order.
    #[serde(default)]
    pub next_actions: Vec<ItemId>,
}

/// Parked for later consideration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaybeSomeday {
    pub text: String,
}

/// An entry that was finished, archived under the id it had before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedItem {
    pub text: String,
    pub completed_at: DateTime<Utc>,
}

impl CompletedItem {
    pub fn new(text: impl Into<String>, completed_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            completed_at,
        }
    }
}

impl private::Sealed for CaptureItem {}
impl private::Sealed for NextAction {}
impl private::Sealed for WaitingFor {}
impl private::Sealed for Project {}
impl private::Sealed for MaybeSomeday {}
impl private::Sealed for CompletedItem {}

impl Entry for CaptureItem {
    const KIND: ListKind = ListKind::Inbox;

    fn text(&self) -> &str {
        &self.text
    }
}

impl Entry for NextAction {
    const KIND: ListKind = ListKind::NextActions;

    fn text(&self) -> &str {
        &self.text
    }
}

impl Entry for WaitingFor {
    const KIND: ListKind = ListKind::WaitingFor;

    fn text(&self) -> &str {
        &self.text
    }

    /// `...<text>[ from <who>][ in <N> days]`
    fn render(&self, now: NaiveDateTime) -> String {
        let mut line = format!("...{}", self.text);
        if let Some(who) = self.who.as_deref().filter(|who| !who.is_empty()) {
            line.push_str(" from ");
            line.push_str(who);
        }
        if let Some(due) = self.due {
            // Whole days, rounded down: a due time a few hours ago is "-1 days".
            let days = (due - now).num_seconds().div_euclid(SECONDS_PER_DAY);
            if days != 0 {
                line.push_str(&format!(" in {days} days"));
            }
        }
        line
    }
}

impl Entry for Project {
    const KIND: ListKind = ListKind::Projects;

    fn text(&self) -> &str {
        &self.text
    }

    fn render(&self, _now: NaiveDateTime) -> String {
        format!("[{}] {}", self.title, self.text)
    }
}

impl Entry for MaybeSomeday {
    const KIND: ListKind = ListKind::MaybeSomeday;

    fn text(&self) -> &str {
        &self.text
    }
}

impl Entry for CompletedItem {
    const KIND: ListKind = ListKind::CompletedItems;

    fn text(&self) -> &str {
        &self.text
    }
}

/// Start or end of a calendar event.
///
/// On the wire this is `{"date": "2024-06-02"}` for all-day events or
/// `{"dateTime": "2024-06-02T15:00:00+02:00"}` for timed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EventTimeWire", into = "EventTimeWire")]
pub enum EventTime {
    AllDay(NaiveDate),
    At(DateTime<FixedOffset>),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTimeWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_time: Option<DateTime<FixedOffset>>,
}

impl TryFrom<EventTimeWire> for EventTime {
    type Error = ValidationError;

    fn try_from(wire: EventTimeWire) -> Result<Self, Self::Error> {
        match (wire.date_time, wire.date) {
            (Some(at), _) => Ok(Self::At(at)),
            (None, Some(date)) => Ok(Self::AllDay(date)),
            (None, None) => Err(ValidationError::Empty {
                field: "event time",
            }),
        }
    }
}

impl From<EventTime> for EventTimeWire {
    fn from(time: EventTime) -> Self {
        match time {
            EventTime::AllDay(date) => Self {
                date: Some(date),
                date_time: None,
            },
            EventTime::At(at) => Self {
                date: None,
                date_time: Some(at),
            },
        }
    }
}

impl EventTime {
    /// Interprets a local wall-clock time: midnight means a whole day.
    pub fn from_local(when: NaiveDateTime) -> Self {
        if when.time() == NaiveTime::MIN {
            return Self::AllDay(when.date());
        }
        let local = Local
            .from_local_datetime(&when)
            .earliest()
            .unwrap_or_else(|| Utc.from_utc_datetime(&when).with_timezone(&Local));
        Self::At(local.fixed_offset())
    }

    /// The event span the scheduler creates for a start time.
    ///
    /// All-day events end the next day, timed events last one hour.
    pub fn default_end(&self) -> Self {
        match self {
            Self::AllDay(date) => Self::AllDay(date.succ_opt().unwrap_or(*date)),
            Self::At(at) => Self::At(*at + chrono::TimeDelta::hours(1)),
        }
    }

    /// Local wall-clock time of this instant.
    pub fn local(&self) -> NaiveDateTime {
        match self {
            Self::AllDay(date) => date.and_time(NaiveTime::MIN),
            Self::At(at) => at.with_timezone(&Local).naive_local(),
        }
    }
}

/// A scheduled event mirrored from the external event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub start: EventTime,
    pub end: EventTime,
    pub summary: String,
    /// Creation time reported by the event source.
    pub created: DateTime<Utc>,
}

impl CalendarEntry {
    /// Key of this event in the remote `calendar` collection.
    ///
    /// Derived from the creation time so exporting the same event twice
    /// writes the same record.
    pub fn remote_id(&self) -> ItemId {
        ItemId::from_timestamp(self.created)
    }

    /// Overview line, or `None` when the event is past or beyond `period_days`.
    ///
    /// `{Tue, Jun 02 03:00PM} <summary> (<d> days, <h> hours)`; the time is
    /// left out for events starting at midnight.
    pub fn render_upcoming(&self, now: NaiveDateTime, period_days: i64) -> Option<String> {
        let start = self.start.local();
        if start < now {
            return None;
        }
        let delta = start - now;
        let days = delta.num_days();
        if days > period_days {
            return None;
        }
        let mut label = start.format("%a, %b %d").to_string();
        if start.hour() != 0 || start.minute() != 0 {
            label.push(' ');
            label.push_str(&start.format("%I:%M%p").to_string());
        }
        let remainder = delta - chrono::TimeDelta::days(days);
        let hours = (remainder.num_minutes() + 30) / 60;
        Some(format!(
            "{{{label}}} {} ({days} days, {hours} hours)",
            self.summary
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn waiting_for_renders_who_and_days() {
        let item = WaitingFor {
            text: "affidavit".to_string(),
            who: Some("PenFed".to_string()),
            due: Some(naive("2024-06-08 00:00")),
        };
        assert_eq!(
            item.render(naive("2024-06-01 00:00")),
            "...affidavit from PenFed in 7 days"
        );

        let bare = WaitingFor {
            text: "refund".to_string(),
            who: Some(String::new()),
            due: None,
        };
        assert_eq!(bare.render(naive("2024-06-01 00:00")), "...refund");
    }

    #[test]
    fn overdue_waiting_for_counts_whole_days_down() {
        let item = WaitingFor {
            text: "refund".to_string(),
            who: None,
            due: Some(naive("2024-06-01 06:00")),
        };
        assert_eq!(item.render(naive("2024-06-01 09:00")), "...refund in -1 days");
        assert_eq!(item.render(naive("2024-06-01 05:00")), "...refund");
        assert_eq!(item.render(naive("2024-05-30 05:00")), "...refund in 2 days");
    }

    #[test]
    fn upcoming_hours_round_to_nearest() {
        let entry = CalendarEntry {
            start: EventTime::AllDay(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()),
            end: EventTime::AllDay(NaiveDate::from_ymd_opt(2024, 6, 4).unwrap()),
            summary: "Dentist".to_string(),
            created: Utc::now(),
        };
        assert_eq!(
            entry.render_upcoming(naive("2024-06-01 09:31"), 30).as_deref(),
            Some("{Mon, Jun 03} Dentist (1 days, 14 hours)")
        );
        assert_eq!(
            entry.render_upcoming(naive("2024-06-01 09:29"), 30).as_deref(),
            Some("{Mon, Jun 03} Dentist (1 days, 15 hours)")
        );
        assert!(entry.render_upcoming(naive("2024-06-03 00:01"), 30).is_none());
    }

    #[test]
    fn project_renders_title() {
        let project = Project {
            text: "New kitchen installed".to_string(),
            title: "kitchen".to_string(),
            next_actions: Vec::new(),
        };
        assert_eq!(
            project.render(naive("2024-06-01 00:00")),
            "[kitchen] New kitchen installed"
        );
    }

    #[test]
    fn event_time_wire_format() {
        let all_day = EventTime::AllDay(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        assert_eq!(
            serde_json::to_string(&all_day).unwrap(),
            r#"{"date":"2024-06-02"}"#
        );

        let timed: EventTime =
            serde_json::from_str(r#"{"dateTime":"2024-06-02T15:00:00+02:00"}"#).unwrap();
        assert!(matches!(timed, EventTime::At(at) if at.to_rfc3339() == "2024-06-02T15:00:00+02:00"));

        assert!(serde_json::from_str::<EventTime>("{}").is_err());
    }

    #[test]
    fn midnight_is_all_day() {
        let start = EventTime::from_local(naive("2024-06-02 00:00"));
        assert_eq!(
            start,
            EventTime::AllDay(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap())
        );
        assert_eq!(
            start.default_end(),
            EventTime::AllDay(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap())
        );
    }

    #[test]
    fn timed_event_lasts_an_hour() {
        let start = EventTime::from_local(naive("2024-06-02 15:00"));
        let EventTime::At(begin) = start else {
            panic!("expected a timed event");
        };
        let EventTime::At(end) = start.default_end() else {
            panic!("expected a timed end");
        };
        assert_eq!(end - begin, chrono::TimeDelta::hours(1));
        assert_eq!(start.local(), naive("2024-06-02 15:00"));
    }

    #[test]
    fn calendar_remote_id_is_stable() {
        let created = DateTime::parse_from_rfc3339("2024-05-01T10:00:00.250Z")
            .unwrap()
            .with_timezone(&Utc);
        let entry = CalendarEntry {
            start: EventTime::AllDay(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()),
            end: EventTime::AllDay(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()),
            summary: "Dentist".to_string(),
            created,
        };
        assert_eq!(entry.remote_id().as_str(), "1714557600-250000");
        assert_eq!(entry.remote_id(), entry.clone().remote_id());
    }

    #[test]
    fn upcoming_filters_past_and_far_events() {
        let entry = |start: &str| CalendarEntry {
            start: EventTime::AllDay(NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap()),
            end: EventTime::AllDay(NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap()),
            summary: "Dentist".to_string(),
            created: Utc::now(),
        };
        let now = naive("2024-06-01 12:00");

        assert_eq!(entry("2024-05-30").render_upcoming(now, 30), None);
        assert_eq!(entry("2024-08-30").render_upcoming(now, 30), None);
        assert_eq!(
            entry("2024-06-04").render_upcoming(now, 30).as_deref(),
            Some("{Tue, Jun 04} Dentist (2 days, 12 hours)")
        );
    }
}

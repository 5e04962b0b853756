//! Core type definitions with validation.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// A validated item identifier.
///
/// Ids are derived from the capture time as `<unix seconds>-<fraction>`
/// (e.g. `1527184756-204772`) and double as the insertion-order key of every
/// keyed list. Filing an item keeps its id, so an entry can be traced back to
/// the capture it came from.
///
/// Ordering is numeric on the time components, so ids written with a
/// different number of fraction digits still sort chronologically. Ids that
/// do not follow the time format sort after all time-derived ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "item ID" });
        }
        Ok(Self(id))
    }

    /// Derives the id for an instant, at microsecond resolution.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(format!(
            "{}-{:06}",
            at.timestamp(),
            at.timestamp_subsec_micros()
        ))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits a time-derived id into whole seconds and significant fraction digits.
    fn time_parts(&self) -> Option<(i64, &str)> {
        let (secs, fraction) = self.0.split_once('-')?;
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let secs = secs.parse().ok()?;
        Some((secs, fraction.trim_end_matches('0')))
    }
}

impl Ord for ItemId {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_time = match (self.time_parts(), other.time_parts()) {
            // Digit strings without trailing zeros compare like decimal fractions.
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_time.then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ItemId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<String> for ItemId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Issues time-derived ids that are strictly increasing within one generator.
///
/// Two captures inside the same microsecond would otherwise share an id and
/// the later one would silently replace the earlier. The generator bumps the
/// instant by one microsecond whenever the clock has not advanced past the
/// previously issued id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdGenerator {
    last: Option<DateTime<Utc>>,
}

impl IdGenerator {
    /// Creates a generator that has not issued any id yet.
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Issues an id for the current time.
    pub fn next_id(&mut self) -> ItemId {
        self.next_at(Utc::now())
    }

    /// Issues an id for `now`, or for one microsecond after the last id.
    pub fn next_at(&mut self, now: DateTime<Utc>) -> ItemId {
        let mut at = now.trunc_subsecs(6);
        if let Some(last) = self.last {
            if at <= last {
                at = last + TimeDelta::microseconds(1);
            }
        }
        self.last = Some(at);
        ItemId::from_timestamp(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn at(secs: i64, micros: u32) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, micros * 1000).unwrap()
    }

    #[test]
    fn id_rejects_blank() {
        assert_eq!(
            ItemId::new("  ").unwrap_err(),
            ValidationError::Empty { field: "item ID" }
        );
    }

    #[test]
    fn id_from_timestamp_uses_dash_separator() {
        let id = ItemId::from_timestamp(at(1_527_184_756, 204_772));
        assert_eq!(id.as_str(), "1527184756-204772");
    }

    #[test]
    fn ids_order_numerically() {
        let early = ItemId::new("999999999-5").unwrap();
        let late = ItemId::new("1000000000-1").unwrap();
        assert!(early < late);

        // Seven fraction digits written by older clients still compare by value.
        let legacy = ItemId::new("1527184756-2047727").unwrap();
        let current = ItemId::new("1527184756-204772").unwrap();
        assert!(current < legacy);
        assert!(legacy < ItemId::new("1527184756-300000").unwrap());
    }

    #[test]
    fn non_time_ids_sort_last() {
        let time = ItemId::new("1527184756-1").unwrap();
        let other = ItemId::new("imported").unwrap();
        assert!(time < other);
    }

    #[test]
    fn generator_is_strictly_monotonic_within_one_instant() {
        let mut ids = IdGenerator::new();
        let now = at(1_700_000_000, 10);
        let first = ids.next_at(now);
        let second = ids.next_at(now);
        let third = ids.next_at(at(1_699_999_999, 0));

        assert_eq!(first.as_str(), "1700000000-000010");
        assert_eq!(second.as_str(), "1700000000-000011");
        assert_eq!(third.as_str(), "1700000000-000012");
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = ItemId::new("1700000000-000001").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""1700000000-000001""#);
        let parsed: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
        assert!(serde_json::from_str::<ItemId>(r#""""#).is_err());
    }
}

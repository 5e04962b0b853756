//! Free-form date parsing for prompts.
//!
//! Supports:
//! - ISO 8601: "2026-01-15", "2026-01-15 10:30", "2026-01-15T10:30:00Z"
//! - US style: "6/2", "6/2/2026"
//! - Month names: "june 2", "Jun 2 2026"
//! - Relative: "today", "tomorrow", "friday", "next week", "in 3 days"
//!
//! Any date may be followed by a time such as "3pm", "at 3:30pm" or "15:00".
//! Without a time the result is midnight, which the scheduler treats as an
//! all-day event.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;
use thiserror::Error;

/// Trailing time of day: "3pm", "at 3:30 pm", "15:00".
static TIME_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s+)(?:at\s+)?(\d{1,2})(?::(\d{2}))?\s*(am|pm)?$").unwrap()
});

/// Relative offsets: "in 3 days", "in 2 weeks".
static RELATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^in\s+(\d+)\s+(minute|hour|day|week)s?$").unwrap());

/// Upper bound for relative offsets (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Errors from [`parse_when`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WhenError {
    #[error("no date given")]
    Empty,
    #[error("could not understand date: {0}")]
    Unrecognized(String),
    #[error("relative offset too large: {0}")]
    TooLarge(String),
}

/// Parses a date (and optional time) relative to the local time `now`.
pub fn parse_when(input: &str, now: NaiveDateTime) -> Result<NaiveDateTime, WhenError> {
    let text = input.trim().to_lowercase();
    if text.is_empty() {
        return Err(WhenError::Empty);
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(&text.to_uppercase()) {
        return Ok(at.with_timezone(&Local).naive_local());
    }
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dt%H:%M", "%Y-%m-%dt%H:%M:%S"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(&text, format) {
            return Ok(at);
        }
    }

    if let Some(caps) = RELATIVE_RE.captures(&text) {
        return relative(&caps[1], &caps[2], now);
    }

    if let Some(date) = parse_date(&text, now.date()) {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    // "<date> <time>" or a bare time ("3pm" means today).
    let caps = TIME_SUFFIX_RE
        .captures(&text)
        .ok_or_else(|| WhenError::Unrecognized(input.trim().to_string()))?;
    let has_marker = caps.get(2).is_some() || caps.get(3).is_some();
    let whole = caps.get(0).map_or(0, |m| m.start());
    let date_part = text[..whole].trim();
    let date = if date_part.is_empty() {
        Some(now.date())
    } else {
        parse_date(date_part, now.date())
    };
    let time = parse_time(&caps[1], caps.get(2).map(|m| m.as_str()), caps.get(3).map(|m| m.as_str()));
    match (has_marker, date, time) {
        (true, Some(date), Some(time)) => Ok(date.and_time(time)),
        _ => Err(WhenError::Unrecognized(input.trim().to_string())),
    }
}

fn relative(amount: &str, unit: &str, now: NaiveDateTime) -> Result<NaiveDateTime, WhenError> {
    let too_large = || WhenError::TooLarge(format!("{amount} {unit}"));
    let n: i64 = amount.parse().map_err(|_| too_large())?;
    let (max_for_unit, minutes_per_unit) = match unit {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        _ => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
    };
    if n > max_for_unit {
        return Err(too_large());
    }
    let at = now + Duration::minutes(n * minutes_per_unit);
    // Day and week offsets land on a date, like "tomorrow" does.
    if minutes_per_unit >= 60 * 24 {
        Ok(at.date().and_time(NaiveTime::MIN))
    } else {
        Ok(at)
    }
}

fn parse_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    match text {
        "today" => return Some(today),
        "tomorrow" => return today.succ_opt(),
        "next week" => return today.checked_add_signed(Duration::days(7)),
        _ => {}
    }
    if let Some(weekday) = parse_weekday(text) {
        return Some(next_weekday(today, weekday));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%m/%d/%Y") {
        return Some(date);
    }
    let slash_year = format!("{text}/{}", today.year());
    let with_year = format!("{text} {}", today.year());
    for (format, candidate) in [
        ("%m/%d/%Y", slash_year.as_str()),
        ("%B %d %Y", text),
        ("%B %d %Y", with_year.as_str()),
    ] {
        if let Ok(date) = NaiveDate::parse_from_str(candidate, format) {
            return Some(date);
        }
    }
    None
}

fn parse_weekday(text: &str) -> Option<Weekday> {
    let name = text.strip_prefix("next ").unwrap_or(text);
    if name.len() < 3 {
        return None;
    }
    [
        ("monday", Weekday::Mon),
        ("tuesday", Weekday::Tue),
        ("wednesday", Weekday::Wed),
        ("thursday", Weekday::Thu),
        ("friday", Weekday::Fri),
        ("saturday", Weekday::Sat),
        ("sunday", Weekday::Sun),
    ]
    .into_iter()
    .find(|(full, _)| full.starts_with(name))
    .map(|(_, weekday)| weekday)
}

/// The next `weekday` strictly after `today`.
fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (7 + weekday.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
    let ahead = if ahead == 0 { 7 } else { ahead };
    today + Duration::days(i64::from(ahead))
}

fn parse_time(hour: &str, minute: Option<&str>, meridiem: Option<&str>) -> Option<NaiveTime> {
    let mut hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.map_or(Some(0), |m| m.parse().ok())?;
    match meridiem {
        Some("am") if hour == 12 => hour = 0,
        Some("pm") if hour < 12 => hour += 12,
        Some(_) if hour > 12 => return None,
        _ => {}
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

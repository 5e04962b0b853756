//! Google Calendar events API client.

use std::fmt;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use gtd_core::{CalendarEntry, EventTime};
use serde::{Deserialize, Serialize};

use crate::{ApiError, build_http, read_body, require};

const GOOGLE_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";
const MAX_RESULTS: &str = "250";

/// Google Calendar client for one calendar.
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
    calendar_id: String,
    access_token: String,
}

impl fmt::Debug for CalendarClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarClient")
            .field("calendar_id", &self.calendar_id)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl CalendarClient {
    /// Creates a client for `calendar_id` (`primary` for the account's main
    /// calendar) using an OAuth access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the calendar id or token is blank, or if the HTTP
    /// client fails to build.
    pub fn new(calendar_id: &str, access_token: &str) -> Result<Self, ApiError> {
        require(calendar_id, "calendar id cannot be empty")?;
        require(access_token, "access token cannot be empty")?;
        Ok(Self {
            http: build_http()?,
            base_url: GOOGLE_CALENDAR_API_URL.to_string(),
            calendar_id: calendar_id.trim().to_string(),
            access_token: access_token.trim().to_string(),
        })
    }

    /// Points the client at another API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, self.calendar_id)
    }

    /// Single events starting between now and `days` from now, ordered by
    /// start.
    pub async fn upcoming(&self, days: u32) -> Result<Vec<CalendarEntry>, ApiError> {
        let now = Utc::now();
        let time_min = rfc3339(now);
        let time_max = rfc3339(now + Duration::days(i64::from(days)));
        let response = self
            .http
            .get(self.events_url())
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", MAX_RESULTS),
            ])
            .send()
            .await?;
        let body = read_body(response).await?;
        let list: EventList =
            serde_json::from_str(&body).map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
        tracing::debug!(events = list.items.len(), days, "fetched calendar events");
        Ok(list.items.into_iter().map(CalendarEntry::from).collect())
    }

    /// Inserts an event and returns it as the calendar recorded it.
    pub async fn create(
        &self,
        start: EventTime,
        end: EventTime,
        summary: &str,
    ) -> Result<CalendarEntry, ApiError> {
        let request = NewEvent {
            summary,
            start,
            end,
        };
        let response = self
            .http
            .post(self.events_url())
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;
        let body = read_body(response).await?;
        let event: Event =
            serde_json::from_str(&body).map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
        Ok(event.into())
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Serialize)]
struct NewEvent<'a> {
    summary: &'a str,
    start: EventTime,
    end: EventTime,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct Event {
    #[serde(default)]
    summary: String,
    start: EventTime,
    end: EventTime,
    created: DateTime<Utc>,
}

impl From<Event> for CalendarEntry {
    fn from(event: Event) -> Self {
        Self {
            start: event.start,
            end: event.end,
            summary: event.summary,
            created: event.created,
        }
    }
}

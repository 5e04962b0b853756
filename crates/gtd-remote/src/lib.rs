//! HTTP clients for the hosted backends.
//!
//! - [`FirebaseClient`]: a Firebase Realtime Database used as the remote list
//!   store, one top-level node per collection.
//! - [`CalendarClient`]: the Google Calendar events API used as the event
//!   source.
//!
//! Both clients are async. Callers that need the synchronous
//! [`RemoteStore`](gtd_core::RemoteStore) and
//! [`EventSource`](gtd_core::EventSource) seams drive them from a runtime.

mod calendar;
mod firebase;

use std::time::Duration;

use gtd_core::RemoteError;
use serde::Deserialize;
use thiserror::Error;

pub use calendar::CalendarClient;
pub use firebase::FirebaseClient;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// API client errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required setting was missing or blank.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<ApiError> for RemoteError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Request(source) if source.is_connect() || source.is_timeout() => {
                Self::Unavailable(source.to_string())
            }
            ApiError::Api { status, message } => {
                Self::Rejected(format!("status {status}: {message}"))
            }
            other => Self::Backend(Box::new(other)),
        }
    }
}

fn build_http() -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err(ApiError::ClientBuild)
}

fn require(value: &str, reason: &'static str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidConfig { reason });
    }
    Ok(())
}

/// Reads the body, turning non-success statuses into [`ApiError::Api`].
async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Api {
            status: status.as_u16(),
            message: parse_api_error(&body).unwrap_or(body),
        });
    }
    Ok(body)
}

/// Extracts the message from `{"error": "..."}` (Firebase) or
/// `{"error": {"message": "..."}}` (Google).
fn parse_api_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorDetails {
        Plain(String),
        Structured { message: String },
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| match payload.error {
            ErrorDetails::Plain(message) | ErrorDetails::Structured { message } => message,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_from_firebase() {
        assert_eq!(
            parse_api_error(r#"{"error": "Permission denied"}"#).as_deref(),
            Some("Permission denied")
        );
    }

    #[test]
    fn api_error_message_from_google() {
        let body = r#"{"error": {"code": 401, "message": "Invalid Credentials"}}"#;
        assert_eq!(parse_api_error(body).as_deref(), Some("Invalid Credentials"));
        assert_eq!(parse_api_error("<html>"), None);
    }

    #[test]
    fn rejected_requests_map_to_rejected() {
        let err = RemoteError::from(ApiError::Api {
            status: 401,
            message: "Permission denied".to_string(),
        });
        assert!(matches!(err, RemoteError::Rejected(ref m) if m.contains("401")));
    }

    #[test]
    fn bad_responses_map_to_backend() {
        let err = RemoteError::from(ApiError::InvalidResponse("truncated".to_string()));
        assert!(matches!(err, RemoteError::Backend(_)));
    }
}

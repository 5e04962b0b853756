//! Firebase Realtime Database REST client.

use std::fmt;

use gtd_core::{Collection, ItemId, Snapshot};
use serde_json::Value;

use crate::{ApiError, build_http, read_body, require};

/// Firebase Realtime Database client.
///
/// Collections are the top-level nodes of the database; each record is a
/// child node keyed by entry id.
pub struct FirebaseClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl fmt::Debug for FirebaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseClient")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl FirebaseClient {
    /// Creates a client for the database at `base_url`
    /// (e.g. `https://my-project.firebaseio.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is blank or the HTTP client fails to build.
    pub fn new(base_url: &str, auth_token: Option<String>) -> Result<Self, ApiError> {
        require(base_url, "database URL cannot be empty")?;
        Ok(Self {
            http: build_http()?,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            auth_token: auth_token.filter(|token| !token.trim().is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}.json", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.query(&[("auth", token)]),
            None => request,
        }
    }

    /// Reads the whole database.
    pub async fn fetch(&self) -> Result<Snapshot, ApiError> {
        let response = self.authorize(self.http.get(self.url(""))).send().await?;
        let body = read_body(response).await?;
        parse_snapshot(&body)
    }

    /// Overwrites one collection. An empty map deletes it.
    pub async fn replace(&self, collection: &str, records: &Collection) -> Result<(), ApiError> {
        let url = self.url(collection);
        let request = if records.is_empty() {
            self.http.delete(url)
        } else {
            self.http.put(url).json(records)
        };
        let response = self.authorize(request).send().await?;
        read_body(response).await?;
        tracing::debug!(collection, records = records.len(), "replaced firebase node");
        Ok(())
    }

    /// Writes one record.
    pub async fn upsert(
        &self,
        collection: &str,
        id: &ItemId,
        record: &Value,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("{collection}/{id}"));
        let response = self.authorize(self.http.put(url).json(record)).send().await?;
        read_body(response).await?;
        Ok(())
    }
}

/// Parses the root node. An empty database reads as `null`.
fn parse_snapshot(body: &str) -> Result<Snapshot, ApiError> {
    let root: Value =
        serde_json::from_str(body).map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
    let mut snapshot = Snapshot::new();
    let nodes = match root {
        Value::Null => return Ok(snapshot),
        Value::Object(nodes) => nodes,
        other => {
            return Err(ApiError::InvalidResponse(format!(
                "expected an object at the root, got {other}"
            )));
        }
    };
    for (name, node) in nodes {
        match node {
            Value::Object(records) => snapshot.insert(name, records.into_iter().collect()),
            Value::Null => {}
            _ => {
                return Err(ApiError::InvalidResponse(format!(
                    "collection {name} is not an object"
                )));
            }
        }
    }
    Ok(snapshot)
}

//! Construction of the remote store and event source from configuration.
//!
//! The hosted clients are async; they are driven here from one shared
//! runtime so the core sees plain synchronous calls.

use std::rc::Rc;

use anyhow::{Context, Result};
use gtd_core::{
    CalendarEntry, Collection, EventSource, EventTime, ItemId, RemoteError, RemoteStore, Snapshot,
    SyncCoordinator,
};
use gtd_db::Database;
use gtd_remote::{CalendarClient, FirebaseClient};
use serde_json::Value;
use tokio::runtime::Runtime;

use crate::config::{CalendarBackend, Config, RemoteBackend};

/// An async client driven to completion on a shared runtime.
pub struct Blocking<C> {
    runtime: Rc<Runtime>,
    client: C,
}

impl RemoteStore for Blocking<FirebaseClient> {
    fn fetch(&self) -> Result<Snapshot, RemoteError> {
        Ok(self.runtime.block_on(self.client.fetch())?)
    }

    fn replace(&self, collection: &str, records: &Collection) -> Result<(), RemoteError> {
        Ok(self
            .runtime
            .block_on(self.client.replace(collection, records))?)
    }

    fn upsert(&self, collection: &str, id: &ItemId, record: &Value) -> Result<(), RemoteError> {
        Ok(self
            .runtime
            .block_on(self.client.upsert(collection, id, record))?)
    }
}

impl EventSource for Blocking<CalendarClient> {
    fn upcoming(&self, days: u32) -> Result<Vec<CalendarEntry>, RemoteError> {
        Ok(self.runtime.block_on(self.client.upcoming(days))?)
    }

    fn create(
        &self,
        start: EventTime,
        end: EventTime,
        summary: &str,
    ) -> Result<CalendarEntry, RemoteError> {
        Ok(self
            .runtime
            .block_on(self.client.create(start, end, summary))?)
    }
}

/// The configured collaborators, opened once per command.
pub struct Backends {
    store: Box<dyn RemoteStore>,
    events: Box<dyn EventSource>,
    lookahead_days: u32,
}

impl Backends {
    pub fn open(config: &Config) -> Result<Self> {
        let mut runtime: Option<Rc<Runtime>> = None;
        let mut shared_runtime = || -> Result<Rc<Runtime>> {
            if let Some(runtime) = &runtime {
                return Ok(Rc::clone(runtime));
            }
            let created =
                Rc::new(Runtime::new().context("failed to initialize tokio runtime")?);
            runtime = Some(Rc::clone(&created));
            Ok(created)
        };

        let store: Box<dyn RemoteStore> = match config.remote.backend {
            RemoteBackend::Sqlite => Box::new(open_database(config)?),
            RemoteBackend::Firebase => {
                let url = config
                    .remote
                    .url
                    .as_deref()
                    .context("missing Firebase URL (set remote.url or GTD_REMOTE__URL)")?;
                let client = FirebaseClient::new(url, config.remote.auth_token.clone())
                    .context("failed to create Firebase client")?;
                Box::new(Blocking {
                    runtime: shared_runtime()?,
                    client,
                })
            }
        };

        let events: Box<dyn EventSource> = match config.calendar.backend {
            CalendarBackend::Sqlite => Box::new(open_database(config)?),
            CalendarBackend::Google => {
                let token = config.calendar.access_token.as_deref().context(
                    "missing Google access token (set calendar.access_token or \
                     GTD_CALENDAR__ACCESS_TOKEN)",
                )?;
                let client = CalendarClient::new(&config.calendar.calendar_id, token)
                    .context("failed to create calendar client")?;
                Box::new(Blocking {
                    runtime: shared_runtime()?,
                    client,
                })
            }
        };

        tracing::debug!(
            remote = ?config.remote.backend,
            calendar = ?config.calendar.backend,
            "opened backends"
        );
        Ok(Self {
            store,
            events,
            lookahead_days: config.calendar.lookahead_days,
        })
    }

    /// A coordinator over the configured collaborators.
    pub fn sync(&self) -> SyncCoordinator<'_> {
        SyncCoordinator::new(self.store.as_ref(), self.events.as_ref())
            .with_lookahead(self.lookahead_days)
    }
}

/// Opens the SQLite file, ensuring the parent directory exists.
fn open_database(config: &Config) -> Result<Database> {
    let path = &config.remote.database_path;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    Database::open(path).with_context(|| format!("failed to open {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use gtd_core::Workspace;

    fn sqlite_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.remote.database_path = dir.join("nested").join("gtd.db");
        config
    }

    #[test]
    fn sqlite_backends_share_one_file() {
        let temp = tempfile::tempdir().unwrap();
        let config = sqlite_config(temp.path());
        let backends = Backends::open(&config).unwrap();

        let mut workspace = Workspace::new();
        workspace.inbox.add("Buy milk");
        backends.sync().export(&workspace).unwrap();

        let mut restored = Workspace::new();
        backends.sync().import(&mut restored).unwrap();
        assert_eq!(restored.inbox, workspace.inbox);
        assert!(config.remote.database_path.exists());
    }

    #[test]
    fn firebase_requires_url() {
        let temp = tempfile::tempdir().unwrap();
        let mut config = sqlite_config(temp.path());
        config.remote.backend = RemoteBackend::Firebase;
        let err = Backends::open(&config).err().unwrap();
        assert!(err.to_string().contains("missing Firebase URL"));
    }

    #[test]
    fn google_requires_token() {
        let temp = tempfile::tempdir().unwrap();
        let mut config = sqlite_config(temp.path());
        config.calendar.backend = CalendarBackend::Google;
        let err = Backends::open(&config).err().unwrap();
        assert!(err.to_string().contains("missing Google access token"));
    }
}

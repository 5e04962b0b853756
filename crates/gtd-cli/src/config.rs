//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the lists live.
    pub remote: RemoteConfig,
    /// Where calendar events come from.
    pub calendar: CalendarConfig,
    /// Program and arguments whose stdout is the clipboard text.
    pub clipboard_command: Vec<String>,
    /// Length of the do-now countdown in seconds.
    pub countdown_secs: u64,
}

/// Remote store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteBackend {
    /// Local SQLite file.
    #[default]
    Sqlite,
    /// Firebase Realtime Database.
    Firebase,
}

/// Event source backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarBackend {
    /// Events table in the local SQLite file.
    #[default]
    Sqlite,
    /// Google Calendar.
    Google,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub backend: RemoteBackend,
    /// SQLite file, used by every `sqlite` backend.
    pub database_path: PathBuf,
    /// Firebase database URL.
    pub url: Option<String>,
    /// Firebase ID token, sent as `?auth=`.
    pub auth_token: Option<String>,
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("backend", &self.backend)
            .field("database_path", &self.database_path)
            .field("url", &self.url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub backend: CalendarBackend,
    pub calendar_id: String,
    /// OAuth access token for Google Calendar.
    pub access_token: Option<String>,
    /// Days of upcoming events loaded with the lists.
    pub lookahead_days: u32,
}

impl fmt::Debug for CalendarConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarConfig")
            .field("backend", &self.backend)
            .field("calendar_id", &self.calendar_id)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("lookahead_days", &self.lookahead_days)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            remote: RemoteConfig {
                backend: RemoteBackend::default(),
                database_path: data_dir.join("gtd.db"),
                url: None,
                auth_token: None,
            },
            calendar: CalendarConfig {
                backend: CalendarBackend::default(),
                calendar_id: "primary".to_string(),
                access_token: None,
                lookahead_days: gtd_core::SyncCoordinator::DEFAULT_LOOKAHEAD_DAYS,
            },
            clipboard_command: vec!["wl-paste".to_string(), "--no-newline".to_string()],
            countdown_secs: gtd_core::triage::TriageEngine::DEFAULT_COUNTDOWN_SECS,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, `~/.config/gtd/config.toml`, the given
    /// file, then `GTD_*` variables (`GTD_REMOTE__URL` sets `remote.url`).
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("GTD_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for gtd.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("gtd"))
}

/// Returns the platform-specific data directory for gtd.
///
/// On Linux: `~/.local/share/gtd`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("gtd"))
}

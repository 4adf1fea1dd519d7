//! # Session Store
//!
//! The logged-in facility and its bearer token, persisted between runs.
//!
//! ## Storage Location
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Session File Location                             │
//! │                                                                         │
//! │  1. --session-file flag / VITAL_SESSION_PATH (highest priority)        │
//! │                                                                         │
//! │  2. Platform data directory                                            │
//! │     Linux:   ~/.local/share/vital/session.json                         │
//! │     macOS:   ~/Library/Application Support/com.vitalconnect.vital/     │
//! │     Windows: %APPDATA%\vitalconnect\vital\data\                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing file is an empty (logged-out) session. A file that no longer
//! parses is treated the same way and logged.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use vital_core::Facility;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// File name inside the data directory.
pub const SESSION_FILE_NAME: &str = "session.json";

// =============================================================================
// Session
// =============================================================================

/// Auth token plus the facility it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub facility: Option<Facility>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Session {
    /// A fresh session after login or registration.
    pub fn new(token: impl Into<String>, facility: Facility) -> Self {
        Session {
            token: Some(token.into()),
            facility: Some(facility),
            saved_at: None,
        }
    }

    /// Logged in means a token is present.
    pub fn is_logged_in(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Id of the logged-in facility.
    pub fn facility_id(&self) -> Option<&str> {
        self.facility.as_ref().map(|f| f.id.as_str())
    }
}

// =============================================================================
// Session Store
// =============================================================================

/// JSON file holding the [`Session`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store backed by an explicit file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    /// Store at the configured path, or the platform default.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        match &config.session_path {
            Some(path) => Ok(SessionStore::new(path)),
            None => Ok(SessionStore::new(Self::default_location()?)),
        }
    }

    /// `session.json` in the platform data directory.
    pub fn default_location() -> ClientResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "vitalconnect", "vital").ok_or(ClientError::NoDataDir)?;
        Ok(dirs.data_dir().join(SESSION_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the session; missing or unreadable content is a logged-out
    /// session.
    pub fn load(&self) -> ClientResult<Session> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No session file");
                return Ok(Session::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Ok(session),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt session file");
                Ok(Session::default())
            }
        }
    }

    /// Writes the session, stamping `saved_at`.
    pub fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut session = session.clone();
        session.saved_at = Some(Utc::now());

        fs::write(&self.path, serde_json::to_vec_pretty(&session)?)?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Deletes the session file. Already gone is fine.
    pub fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

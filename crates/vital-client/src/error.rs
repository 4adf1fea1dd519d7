//! # Client Error Types
//!
//! Error types for backend and session operations.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Transport     │  │    Backend      │  │     Session             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Http           │  │  Unauthorized   │  │  Io                     │ │
//! │  │  Decode         │  │  NotFound       │  │  NoDataDir              │ │
//! │  │                 │  │  Status         │  │  NotLoggedIn            │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is retried. Callers log the error and show a static message.

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Everything that can go wrong talking to the backend or the session file.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never produced a response (connection refused, DNS, TLS).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the JSON we expected.
    #[error("Unexpected response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// 401 from the backend: missing, invalid or expired token.
    #[error("Not authorized")]
    Unauthorized,

    /// 404 from the backend.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// Reading or writing the session file failed.
    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the session failed.
    #[error("Session encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// No platform data directory could be determined.
    #[error("Could not determine app data directory")]
    NoDataDir,

    /// An operation needs a logged-in facility.
    #[error("Not logged in")]
    NotLoggedIn,

    /// Invalid client configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// True for failures that mean the stored token is no longer good.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }
}

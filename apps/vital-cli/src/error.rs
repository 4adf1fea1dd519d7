//! # User Error Type
//!
//! What the operator sees when a command fails.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Checkout Desk                      │
//! │                                                                         │
//! │  Command Function                                                       │
//! │  Result<T, UserError>                                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Backend Error? ─── ClientError::Status(...) ──┐                        │
//! │         │                                      │ logged in full         │
//! │         ▼                                      ▼                        │
//! │  Validation Error? ─ ValidationError ──────── UserError ──► "error: …" │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Success ─────────────────────────────────────────────────────────────► │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backend failures carry a static message; the detail goes to the log.
//! None of these end the dispatch loop.

use serde::Serialize;
use vital_client::ClientError;
use vital_core::{CoreError, ValidationError};

/// Error returned from shell and one-shot commands.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct UserError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes, printed in `--json` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Item, facility or transaction not found
    NotFound,

    /// Input failed a presence check
    ValidationError,

    /// Not logged in or the token was rejected
    Unauthorized,

    /// The backend answered with an error
    BackendError,

    /// The backend could not be reached
    NetworkError,

    /// Malformed shell input
    InvalidCommand,

    /// Anything else
    Internal,
}

impl UserError {
    /// Creates a new user error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        UserError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        UserError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        UserError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an invalid command error.
    pub fn invalid_command(message: impl Into<String>) -> Self {
        UserError::new(ErrorCode::InvalidCommand, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        UserError::new(ErrorCode::Internal, message)
    }
}

/// Converts backend errors to user errors.
impl From<ClientError> for UserError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized => UserError::new(
                ErrorCode::Unauthorized,
                "Session expired or invalid. Please log in again.",
            ),
            ClientError::NotLoggedIn => {
                UserError::new(ErrorCode::Unauthorized, "Not logged in. Run `vital login` first.")
            }
            ClientError::NotFound(path) => {
                tracing::debug!(%path, "Backend 404");
                UserError::new(ErrorCode::NotFound, "The requested record no longer exists")
            }
            ClientError::Http(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Backend unreachable: {}", e);
                UserError::new(
                    ErrorCode::NetworkError,
                    "Could not reach the inventory service. Please try again.",
                )
            }
            ClientError::Status { status, body } => {
                tracing::error!(status, %body, "Backend rejected request");
                UserError::new(
                    ErrorCode::BackendError,
                    format!("The inventory service rejected the request ({})", status),
                )
            }
            ClientError::Decode { path, source } => {
                tracing::error!(%path, error = %source, "Undecodable backend response");
                UserError::new(
                    ErrorCode::BackendError,
                    "The inventory service sent an unexpected response",
                )
            }
            ClientError::Io(e) => {
                tracing::error!("Session file error: {}", e);
                UserError::internal("Could not read or write the session file")
            }
            ClientError::Encode(e) => {
                tracing::error!("Session encoding failed: {}", e);
                UserError::internal("Could not write the session file")
            }
            ClientError::NoDataDir => UserError::internal(
                "Could not determine a data directory; pass --session-file",
            ),
            ClientError::Config(e) => UserError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for UserError {
    fn from(err: ValidationError) -> Self {
        UserError::validation(capitalize(&err.to_string()))
    }
}

/// Converts core errors to user errors.
impl From<CoreError> for UserError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidCoordinates {
                latitude,
                longitude,
            } => UserError::validation(format!(
                "Invalid location {}, {}",
                latitude, longitude
            )),
            CoreError::Validation(e) => e.into(),
        }
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! # Error Types
//!
//! Domain-specific error types for vital-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vital-core errors (this file)                                         │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vital-client errors (separate crate)                                  │
//! │  └── ClientError      - HTTP, backend status, session file             │
//! │                                                                         │
//! │  Terminal app errors                                                   │
//! │  └── UserError        - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → UserError → terminal              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart operations have no error cases: price problems are normalized to
//! zero and overflowing amounts saturate, so nothing here is raised by the
//! ledger or the calculator.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Coordinates outside the valid latitude/longitude range.
    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by presence checks before a form is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Number above the accepted maximum.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: u64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Two entries that must agree do not (e.g. password confirmation).
    #[error("{field} does not match")]
    Mismatch { field: String },

    /// Checkout attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

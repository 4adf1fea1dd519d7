//! # Validation Module
//!
//! Presence checks run before a form is submitted.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (web / terminal)                                        │
//! │  └── THIS MODULE: required fields, obvious nonsense                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Backend REST API                                             │
//! │  ├── Serializer validation                                             │
//! │  └── Unique email, foreign keys                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here inspects formats (emails, phone numbers); the free-form
//! fields are only checked for presence.
//!
//! ## Usage
//! ```rust
//! use vital_core::cart::CartLedger;
//! use vital_core::types::{CustomerInfo, PaymentInfo};
//! use vital_core::validation::validate_checkout;
//!
//! let err = validate_checkout(&CartLedger::new(), &CustomerInfo::default(), &PaymentInfo::cash());
//! assert!(err.is_err());
//! ```

use crate::cart::CartLedger;
use crate::error::ValidationError;
use crate::types::{CustomerInfo, NewInventoryItem, PaymentInfo, PaymentMethod, RegisterFacility};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted search query.
pub const MAX_QUERY_LEN: usize = 100;

/// Largest quantity a cart line can hold.
pub const MAX_CART_QUANTITY: i64 = u32::MAX as i64;

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Checkout
// =============================================================================

/// Checks a checkout before the bill is built.
///
/// ## Rules
/// - The cart has at least one line
/// - The customer has a name
/// - Online payments carry a transaction id
pub fn validate_checkout(
    ledger: &CartLedger,
    customer: &CustomerInfo,
    payment: &PaymentInfo,
) -> ValidationResult<()> {
    if ledger.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    required("customer name", &customer.name)?;
    validate_payment(payment)
}

/// Online payments need a transaction id; cash needs nothing.
pub fn validate_payment(payment: &PaymentInfo) -> ValidationResult<()> {
    match payment.method {
        PaymentMethod::Cash => Ok(()),
        PaymentMethod::Online => {
            required("transaction id", payment.transaction_id.as_deref().unwrap_or(""))
        }
    }
}

/// A cart quantity the ledger can hold. Zero and below are accepted: they
/// remove the line.
pub fn validate_cart_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity > MAX_CART_QUANTITY {
        return Err(ValidationError::TooLarge {
            field: "quantity".to_string(),
            max: MAX_CART_QUANTITY as u64,
        });
    }
    Ok(())
}

// =============================================================================
// Inventory
// =============================================================================

/// Checks a new inventory item before it is sent to the backend.
///
/// ## Rules
/// - Name present
/// - Quantity greater than zero
/// - Price not negative
/// - Owning facility known
pub fn validate_new_item(item: &NewInventoryItem) -> ValidationResult<()> {
    required("name", &item.name)?;

    if item.quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if item.price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    required("hospital", &item.hospital)
}

/// Validates a search query and returns it trimmed.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Registration
// =============================================================================

/// Checks a clinic registration form.
///
/// ## Rules
/// - Every text field present
/// - Password confirmation matches
/// - A location has been picked
pub fn validate_registration(
    form: &RegisterFacility,
    confirm_password: &str,
) -> ValidationResult<()> {
    for (field, value) in [
        ("name", &form.name),
        ("address", &form.address),
        ("city", &form.city),
        ("state", &form.state),
        ("zip code", &form.zip_code),
        ("phone number", &form.phone_number),
        ("email", &form.email),
        ("password", &form.password),
        ("contact person", &form.contact_person),
        ("license number", &form.license_number),
    ] {
        required(field, value)?;
    }

    if form.password != confirm_password {
        return Err(ValidationError::Mismatch {
            field: "password".to_string(),
        });
    }

    if form.latitude.is_none() || form.longitude.is_none() {
        return Err(ValidationError::Required {
            field: "location".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

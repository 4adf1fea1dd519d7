//! # vital-core: Pure Checkout Logic for VitalConnect
//!
//! This crate contains the business logic of the clinic checkout desk as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      VitalConnect Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/vital-cli (dispatch loop)                  │   │
//! │  │    items ──► add / qty / rm ──► checkout ──► bill              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vital-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ │   │
//! │  │   │  money  │ │  cart   │ │ totals  │ │  bill   │ │   geo   │ │   │
//! │  │   │ Money   │ │ Ledger  │ │subtotal │ │ Builder │ │haversine│ │   │
//! │  │   │normalize│ │ Line    │ │ tax     │ │ Invoice │ │ nearest │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO FILES                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             vital-client (REST backend, session file)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Facility, InventoryItem, PaymentInfo, etc.)
//! - [`money`] - Decimal money and the price normalizer
//! - [`cart`] - The cart ledger
//! - [`totals`] - Subtotal/tax/total calculator
//! - [`bill`] - Bill document builder
//! - [`geo`] - Distance sort for the facility finder
//! - [`search`] - Inventory text filter
//! - [`validation`] - Presence checks for forms
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use serde_json::json;
//! use vital_core::cart::CartLedger;
//! use vital_core::totals::compute_subtotal;
//! use vital_core::types::InventoryItem;
//!
//! let gloves: InventoryItem =
//!     serde_json::from_value(json!({"id": 1, "name": "Gloves", "price": 10.5})).unwrap();
//! let gauze: InventoryItem =
//!     serde_json::from_value(json!({"id": 2, "name": "Gauze", "price": "3.25"})).unwrap();
//!
//! let mut cart = CartLedger::new();
//! cart.add(&gloves);
//! cart.add(&gloves);
//! cart.add(&gauze);
//!
//! assert_eq!(compute_subtotal(&cart).to_display_string(), "24.25");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bill;
pub mod cart;
pub mod error;
pub mod geo;
pub mod money;
pub mod search;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use bill::{build_bill, Bill, BillBuilder, BillLine, InvoiceNumberSource, Issuer};
pub use cart::{CartLedger, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{normalize_price, Money};
pub use totals::{compute_subtotal, compute_totals, CartTotals};
pub use types::*;

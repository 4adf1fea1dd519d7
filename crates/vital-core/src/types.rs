//! # Domain Types
//!
//! Core domain types used throughout VitalConnect.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Facility     │   │  InventoryItem  │   │   PaymentInfo   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  hospital (FK)  │   │  method         │       │
//! │  │  name, address  │   │  name, category │   │  transaction_id │       │
//! │  │  lat / lng      │   │  price (Money)  │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  CustomerInfo   │   │ TransactionReq  │       │
//! │  │  bps (u32)      │   │  name, email    │   │  backend POST   │       │
//! │  │  0 = default    │   │  phone, address │   │  /transactions/ │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Conventions
//! Backend records (`Facility`, `InventoryItem`, stats, transactions) keep the
//! backend's snake_case field names. Checkout types shared with the web
//! front-end (`CustomerInfo`, `PaymentInfo`) use camelCase.
//!
//! Backend ids are integers; they are accepted as numbers or strings and held
//! as strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use ts_rs::TS;

use crate::money::{deserialize_price, Money};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 825 bps = 8.25%
///
/// Checkout currently charges no tax; the rate stays a parameter so it can be
/// configured without touching the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Identifiers
// =============================================================================

/// Accepts a backend id given either as a JSON string or a JSON number.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Like [`deserialize_id`], for optional references.
pub fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => Ok(Some(id)),
        Some(Value::Number(id)) => Ok(Some(id.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

// =============================================================================
// Facility
// =============================================================================

/// A registered clinic or hospital.
///
/// Owned and persisted by the backend; the checkout only displays it and
/// uses its id and coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Facility {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Facility {
    /// One-line postal address for display.
    pub fn full_address(&self) -> String {
        [&self.address, &self.city, &self.state, &self.zip_code]
            .iter()
            .filter(|part| !part.trim().is_empty())
            .map(|part| part.trim())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Per-category inventory figures in [`FacilityStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryStats {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub total_quantity: u64,
}

/// Dashboard figures returned by `/hospitals/{id}/stats/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FacilityStats {
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub total_quantity: u64,
    #[serde(default)]
    pub total_transactions: u64,
    /// Backend sends a decimal string (or 0 when there are no sales).
    #[serde(default, deserialize_with = "deserialize_price")]
    #[ts(type = "string")]
    pub total_sales: Money,
    #[serde(default)]
    pub items_by_category: Vec<CategoryStats>,
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A stocked item as returned by the inventory endpoints.
///
/// `price` goes through the price normalizer while deserializing, so a record
/// with a missing or garbled price still loads with a zero price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryItem {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_price")]
    #[ts(type = "string")]
    pub price: Money,
    /// Owning facility.
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub hospital: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create/update payload for `/inventory/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewInventoryItem {
    pub name: String,
    pub quantity: u32,
    pub category: String,
    pub description: String,
    #[ts(type = "string")]
    pub price: Money,
    /// Owning facility id.
    pub hospital: String,
}

// =============================================================================
// Checkout Inputs
// =============================================================================

/// Who the bill is made out to. Free-form; only presence is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    #[default]
    Cash,
    /// Paid through an online gateway; carries a transaction id.
    Online,
}

impl PaymentMethod {
    /// Wire name, as the backend expects it.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Online => "online",
        }
    }
}

/// Upper-case label used on printed bills ("CASH", "ONLINE").
impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "online" => Ok(PaymentMethod::Online),
            other => Err(format!("unknown payment method '{other}'")),
        }
    }
}

/// Payment details collected at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    /// Required only for online payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl PaymentInfo {
    /// Cash payment, no reference.
    pub fn cash() -> Self {
        PaymentInfo {
            method: PaymentMethod::Cash,
            transaction_id: None,
        }
    }

    /// Online payment with a gateway reference.
    pub fn online(transaction_id: impl Into<String>) -> Self {
        PaymentInfo {
            method: PaymentMethod::Online,
            transaction_id: Some(transaction_id.into()),
        }
    }
}

// =============================================================================
// Transactions
// =============================================================================

/// One sold line in a [`TransactionRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionItemRequest {
    /// Inventory item id; the backend decrements its stock.
    pub inventory_item: String,
    pub item_name: String,
    pub quantity: u32,
    #[ts(type = "string")]
    pub unit_price: Money,
}

/// Body of `POST /transactions/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionRequest {
    pub hospital: String,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[ts(type = "string")]
    pub total_amount: Money,
    pub items: Vec<TransactionItemRequest>,
}

/// A recorded sale line as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionItem {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub inventory_item: Option<String>,
    pub item_name: String,
    pub quantity: u32,
    #[serde(default, deserialize_with = "deserialize_price")]
    #[ts(type = "string")]
    pub unit_price: Money,
    #[serde(default, deserialize_with = "deserialize_price")]
    #[ts(type = "string")]
    pub total_price: Money,
}

/// A recorded sale as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub hospital: Option<String>,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_price")]
    #[ts(type = "string")]
    pub total_amount: Money,
    #[serde(default)]
    pub items: Vec<TransactionItem>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Authentication Payloads
// =============================================================================

/// Body of `POST /auth/login/`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegisterFacility {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone_number: String,
    pub email: String,
    pub password: String,
    pub contact_person: String,
    pub license_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Response of login and registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuthResponse {
    pub token: String,
    pub hospital: Facility,
}

// =============================================================================
// Unit Tests
// =============================================================================

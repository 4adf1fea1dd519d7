//! # Checkout Commands
//!
//! Turning the cart into a bill, and the bill into a recorded sale.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout (single shot)                            │
//! │                                                                         │
//! │  CheckoutForm ──► validate_checkout ──► BillBuilder::build ──► Bill    │
//! │  (customer,            │                                         │      │
//! │   payment)             ▼                                         ▼      │
//! │                  "Customer name is required"        record_sale (POST   │
//! │                                                     /transactions/)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no intermediate state: a failed validation leaves the cart
//! untouched and nothing is built.

use std::fmt;

use chrono::{DateTime, TimeZone};
use tracing::info;

use vital_client::ApiClient;
use vital_core::validation::validate_checkout;
use vital_core::{Bill, CartLedger, CustomerInfo, InvoiceNumberSource, PaymentInfo, Transaction};

use crate::error::UserError;
use crate::state::BillingConfig;

/// What the operator entered at checkout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutForm {
    pub customer: CustomerInfo,
    pub payment: PaymentInfo,
}

/// Validates the form against the cart and builds the bill.
pub fn prepare_bill<Tz>(
    ledger: &CartLedger,
    form: &CheckoutForm,
    billing: &BillingConfig,
    now: &DateTime<Tz>,
    numbers: &mut dyn InvoiceNumberSource,
) -> Result<Bill, UserError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    validate_checkout(ledger, &form.customer, &form.payment)?;

    let bill = billing
        .bill_builder()
        .build(ledger, &form.customer, &form.payment, now, numbers);

    info!(
        bill_id = %bill.id,
        invoice = %bill.invoice_number,
        lines = bill.lines.len(),
        total = %bill.total,
        "Bill generated"
    );
    Ok(bill)
}

/// Records the sale on the backend for `facility_id`.
pub async fn record_sale(
    api: &ApiClient,
    bill: &Bill,
    facility_id: &str,
) -> Result<Transaction, UserError> {
    let request = bill.to_transaction_request(facility_id);
    let transaction = api.create_transaction(&request).await?;

    info!(
        transaction_id = %transaction.id,
        invoice = %bill.invoice_number,
        "Sale recorded"
    );
    Ok(transaction)
}

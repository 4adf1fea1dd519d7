//! # Bill Document Builder
//!
//! Turns a cart, customer and payment into a fully computed invoice record.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout (single shot)                           │
//! │                                                                         │
//! │  CartLedger ─┐                                                          │
//! │  Customer ───┼──► validate_checkout() ──► build_bill() ──► Bill        │
//! │  Payment ────┘     (caller, presence)                        │          │
//! │                                                              ▼          │
//! │                                  renderer (terminal, PDF) / backend     │
//! │                                  transaction via to_transaction_request │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The builder does no validation and keeps no state between bills, apart
//! from whatever the [`InvoiceNumberSource`] remembers.

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::ThreadRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::{CartLedger, CartLine};
use crate::money::Money;
use crate::totals::compute_subtotal;
use crate::types::{
    CustomerInfo, PaymentInfo, TaxRate, TransactionItemRequest, TransactionRequest,
};

/// Heading printed on every bill.
pub const BILL_TITLE: &str = "Medical Supply Bill";

/// en-US long form, e.g. "January 5, 2025 at 09:07 AM".
const TIMESTAMP_FORMAT: &str = "%B %-d, %Y at %I:%M %p";

// =============================================================================
// Invoice Numbers
// =============================================================================

/// Supplies the human-facing invoice number of each bill.
pub trait InvoiceNumberSource {
    /// Returns the number for the next bill.
    fn next_invoice_number(&mut self) -> String;
}

/// Random zero-padded 4-digit numbers ("0000" to "9999").
///
/// Cosmetic only: two bills can share a number. [`Bill::id`] is the unique
/// identifier.
#[derive(Debug, Clone)]
pub struct RandomInvoiceNumbers<R = ThreadRng> {
    rng: R,
}

impl RandomInvoiceNumbers<ThreadRng> {
    pub fn new() -> Self {
        RandomInvoiceNumbers {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RandomInvoiceNumbers<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomInvoiceNumbers<R> {
    /// Uses the given generator (seeded generators make tests repeatable).
    pub fn with_rng(rng: R) -> Self {
        RandomInvoiceNumbers { rng }
    }
}

impl<R: Rng> InvoiceNumberSource for RandomInvoiceNumbers<R> {
    fn next_invoice_number(&mut self) -> String {
        format!("{:04}", self.rng.gen_range(0..10_000u32))
    }
}

/// Monotonic 4-digit numbers that wrap after 9999.
#[derive(Debug, Clone, Default)]
pub struct SequentialInvoiceNumbers {
    next: u32,
}

impl SequentialInvoiceNumbers {
    pub fn starting_at(first: u32) -> Self {
        SequentialInvoiceNumbers {
            next: first % 10_000,
        }
    }
}

impl InvoiceNumberSource for SequentialInvoiceNumbers {
    fn next_invoice_number(&mut self) -> String {
        let current = self.next;
        self.next = (self.next + 1) % 10_000;
        format!("{current:04}")
    }
}

// =============================================================================
// Bill Record
// =============================================================================

/// Seller block printed in the bill header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    pub name: String,
    pub address_lines: Vec<String>,
    pub phone: String,
    pub email: String,
}

impl Default for Issuer {
    fn default() -> Self {
        Issuer {
            name: "VitalConnect Medical Supplies".to_string(),
            address_lines: vec![
                "123 Medical Center Drive".to_string(),
                "Healthcare City, HC 12345".to_string(),
            ],
            phone: "(555) 123-4567".to_string(),
            email: "contact@vitalconnect.com".to_string(),
        }
    }
}

/// Terms printed at the foot of every bill unless configured otherwise.
pub fn default_terms() -> Vec<String> {
    [
        "All items are subject to availability",
        "Returns accepted within 7 days of purchase with original receipt",
        "Warranty information available upon request",
        "For any queries, please contact our customer service",
    ]
    .iter()
    .map(|line| line.to_string())
    .collect()
}

/// A row of the bill's item table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillLine {
    pub item_id: String,
    pub name: String,
    pub quantity: u32,
    #[ts(type = "string")]
    pub unit_price: Money,
    /// Unit price × quantity, unrounded.
    #[ts(type = "string")]
    pub amount: Money,
}

impl BillLine {
    fn from_cart_line(line: &CartLine) -> Self {
        BillLine {
            item_id: line.item.id.clone(),
            name: line.item.name.clone(),
            quantity: line.selected_quantity,
            unit_price: line.unit_price(),
            amount: line.line_amount(),
        }
    }

    /// Unit price rounded on its own.
    pub fn unit_price_display(&self) -> String {
        self.unit_price.to_display_string()
    }

    /// Line amount rounded on its own.
    pub fn amount_display(&self) -> String {
        self.amount.to_display_string()
    }
}

/// The computed, display-ready summary of a checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    /// Collision-resistant identity of this bill.
    #[ts(as = "String")]
    pub id: Uuid,
    /// Cosmetic number printed as "Invoice #NNNN".
    pub invoice_number: String,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
    /// `issued_at` in the caller's time zone, human readable.
    pub issued_at_display: String,
    pub issuer: Issuer,
    pub customer: CustomerInfo,
    pub payment: PaymentInfo,
    pub lines: Vec<BillLine>,
    #[ts(type = "string")]
    pub subtotal: Money,
    pub tax_rate: TaxRate,
    #[ts(type = "string")]
    pub tax: Money,
    #[ts(type = "string")]
    pub total: Money,
    pub terms: Vec<String>,
}

impl Bill {
    /// Builds the backend payload recording this sale for `facility_id`.
    ///
    /// Amounts are rounded to cents, which is what the backend stores.
    pub fn to_transaction_request(&self, facility_id: &str) -> TransactionRequest {
        fn non_empty(value: &str) -> Option<String> {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        }

        TransactionRequest {
            hospital: facility_id.to_string(),
            customer_name: self.customer.name.trim().to_string(),
            customer_email: non_empty(&self.customer.email),
            customer_phone: non_empty(&self.customer.phone),
            customer_address: non_empty(&self.customer.address),
            payment_method: self.payment.method,
            transaction_id: self
                .payment
                .transaction_id
                .as_deref()
                .and_then(non_empty),
            total_amount: self.total.rounded(),
            items: self
                .lines
                .iter()
                .map(|line| TransactionItemRequest {
                    inventory_item: line.item_id.clone(),
                    item_name: line.name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price.rounded(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for Bill {
    /// Plain-text rendition, one block after another.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{BILL_TITLE}")?;
        writeln!(f, "Invoice #{}", self.invoice_number)?;
        writeln!(f)?;
        writeln!(f, "{}", self.issuer.name)?;
        for line in &self.issuer.address_lines {
            writeln!(f, "{line}")?;
        }
        writeln!(f, "Phone: {}", self.issuer.phone)?;
        writeln!(f, "Email: {}", self.issuer.email)?;
        writeln!(f)?;
        writeln!(f, "Bill To:")?;
        for field in [
            &self.customer.name,
            &self.customer.address,
            &self.customer.phone,
            &self.customer.email,
        ] {
            writeln!(f, "  {field}")?;
        }
        writeln!(f, "Date: {}", self.issued_at_display)?;
        writeln!(f, "Payment Method: {}", self.payment.method)?;
        if let Some(reference) = &self.payment.transaction_id {
            writeln!(f, "Transaction ID: {reference}")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:<32} {:>8} {:>12} {:>12}",
            "Item Description", "Quantity", "Unit Price", "Amount"
        )?;
        for line in &self.lines {
            writeln!(
                f,
                "{:<32} {:>8} {:>12} {:>12}",
                line.name,
                line.quantity,
                format!("${}", line.unit_price_display()),
                format!("${}", line.amount_display()),
            )?;
        }
        writeln!(f, "{:>53} {:>12}", "Subtotal:", self.subtotal.to_string())?;
        writeln!(
            f,
            "{:>53} {:>12}",
            format!("Tax ({}%):", self.tax_rate.percentage()),
            self.tax.to_string()
        )?;
        writeln!(f, "{:>53} {:>12}", "Total:", self.total.to_string())?;
        if !self.terms.is_empty() {
            writeln!(f)?;
            writeln!(f, "Terms & Conditions")?;
            for term in &self.terms {
                writeln!(f, "  - {term}")?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Thank you for your business!")?;
        write!(
            f,
            "This is a computer-generated invoice and does not require a signature"
        )
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Fixed parts of every bill: who issues it, the tax rate and the terms.
#[derive(Debug, Clone, PartialEq)]
pub struct BillBuilder {
    pub issuer: Issuer,
    pub tax_rate: TaxRate,
    pub terms: Vec<String>,
}

impl Default for BillBuilder {
    fn default() -> Self {
        BillBuilder {
            issuer: Issuer::default(),
            tax_rate: TaxRate::zero(),
            terms: default_terms(),
        }
    }
}

impl BillBuilder {
    /// Assembles the bill for the current ledger contents.
    pub fn build<Tz>(
        &self,
        ledger: &CartLedger,
        customer: &CustomerInfo,
        payment: &PaymentInfo,
        now: &DateTime<Tz>,
        numbers: &mut dyn InvoiceNumberSource,
    ) -> Bill
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let subtotal = compute_subtotal(ledger);
        let tax = subtotal.calculate_tax(self.tax_rate);

        Bill {
            id: Uuid::new_v4(),
            invoice_number: numbers.next_invoice_number(),
            issued_at: now.with_timezone(&Utc),
            issued_at_display: now.format(TIMESTAMP_FORMAT).to_string(),
            issuer: self.issuer.clone(),
            customer: customer.clone(),
            payment: payment.clone(),
            lines: ledger.lines().iter().map(BillLine::from_cart_line).collect(),
            subtotal,
            tax_rate: self.tax_rate,
            tax,
            total: subtotal + tax,
            terms: self.terms.clone(),
        }
    }
}

/// Builds a bill with the default issuer, zero tax and a random invoice
/// number.
pub fn build_bill<Tz>(
    ledger: &CartLedger,
    customer: &CustomerInfo,
    payment: &PaymentInfo,
    now: &DateTime<Tz>,
) -> Bill
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    BillBuilder::default().build(
        ledger,
        customer,
        payment,
        now,
        &mut RandomInvoiceNumbers::new(),
    )
}

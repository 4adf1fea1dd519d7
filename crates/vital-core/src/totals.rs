//! # Total Calculator
//!
//! Reduces a [`CartLedger`] to money figures.
//!
//! ```text
//! subtotal = Σ normalized_price × selected_quantity      (no rounding)
//! tax      = subtotal × tax_rate                        (rate is 0 today)
//! total    = subtotal + tax
//! ```
//! Only the presented strings are rounded, never the accumulator.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartLedger;
use crate::money::Money;
use crate::types::TaxRate;

/// Sum of every line amount. Zero for an empty ledger.
///
/// ```rust
/// use vital_core::cart::CartLedger;
/// use vital_core::totals::compute_subtotal;
///
/// assert!(compute_subtotal(&CartLedger::new()).is_zero());
/// ```
pub fn compute_subtotal(ledger: &CartLedger) -> Money {
    ledger.lines().iter().map(|line| line.line_amount()).sum()
}

/// Cart totals summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_units: u64,
    #[ts(type = "string")]
    pub subtotal: Money,
    pub tax_rate: TaxRate,
    #[ts(type = "string")]
    pub tax: Money,
    #[ts(type = "string")]
    pub total: Money,
}

/// Computes every figure shown under the cart.
pub fn compute_totals(ledger: &CartLedger, tax_rate: TaxRate) -> CartTotals {
    let subtotal = compute_subtotal(ledger);
    let tax = subtotal.calculate_tax(tax_rate);

    CartTotals {
        item_count: ledger.size(),
        total_units: ledger.total_units(),
        subtotal,
        tax_rate,
        tax,
        total: subtotal + tax,
    }
}

impl From<&CartLedger> for CartTotals {
    /// Totals at the default (zero) tax rate.
    fn from(ledger: &CartLedger) -> Self {
        compute_totals(ledger, TaxRate::default())
    }
}

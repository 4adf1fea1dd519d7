//! # Money Module
//!
//! Provides the `Money` type and the price normalizer that turns untyped
//! backend prices into it.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Pre-rounding to cents loses precision the backend did send:           │
//! │    3 × $0.335 = $1.005 (but 3 × $0.34 = $1.02)                          │
//! │                                                                         │
//! │  OUR SOLUTION: Exact Decimal                                            │
//! │    Accumulate with full precision, round ONLY for display              │
//! │    (two places, half-up)                                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Normalization Boundary
//! ```text
//!   backend JSON price ──► normalize_price() ──► Money ──► cart / bill
//!   (number | "3.25" | null | absent | garbage)
//! ```
//! `normalize_price` is the only place untyped external data becomes money.
//!
//! ## Usage
//! ```rust
//! use serde_json::json;
//! use vital_core::money::{normalize_price, Money};
//!
//! let price = normalize_price(Some(&json!("3.25")));
//! assert_eq!(price, Money::from_cents(325));
//!
//! let missing = normalize_price(None);
//! assert!(missing.is_zero());
//! ```

use rust_decimal::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use tracing::{debug, warn};

use crate::types::TaxRate;

/// Number of decimal places shown to users.
pub const DISPLAY_DECIMALS: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the store currency.
///
/// ## Design Decisions
/// - **Decimal (signed)**: negative values are representable; the normalizer
///   does not clamp them
/// - **No implicit rounding**: arithmetic keeps every digit, `Display` and
///   [`Money::to_display_string`] round half-up to two places
/// - **Serialized as a string** so no precision is lost across JSON
/// - **Saturating**: arithmetic past the decimal range clamps to
///   `Decimal::MAX`/`Decimal::MIN` (logged at warn) instead of panicking
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from cents (the smallest display unit).
    ///
    /// ## Example
    /// ```rust
    /// use vital_core::money::Money;
    ///
    /// let price = Money::from_cents(1050);
    /// assert_eq!(price.to_display_string(), "10.50");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the exact, unrounded amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounds to two decimal places using half-up rounding.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use vital_core::money::Money;
    ///
    /// let odd = Money::from_decimal(Decimal::new(1005, 3)); // 1.005
    /// assert_eq!(odd.rounded(), Money::from_cents(101));
    /// ```
    pub fn rounded(&self) -> Money {
        let mut value = self
            .0
            .round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(DISPLAY_DECIMALS);
        Money(value)
    }

    /// Formats the amount with exactly two decimals and no currency symbol.
    ///
    /// ```rust
    /// use vital_core::money::Money;
    ///
    /// assert_eq!(Money::zero().to_display_string(), "0.00");
    /// assert_eq!(Money::from_cents(-550).to_display_string(), "-5.50");
    /// ```
    pub fn to_display_string(&self) -> String {
        self.rounded().0.to_string()
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use vital_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3), Money::from_cents(897));
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: u32) -> Self {
        let qty = Decimal::from(qty);
        Money(saturate(self.0.checked_mul(qty), || self.0.saturating_mul(qty), "multiply"))
    }

    /// Calculates tax at the given rate without rounding.
    ///
    /// Rounding is left to the display layer, like every other amount.
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        if rate.is_zero() {
            return Money::zero();
        }
        let fraction = Decimal::new(i64::from(rate.bps()), 4);
        Money(saturate(
            self.0.checked_mul(fraction),
            || self.0.saturating_mul(fraction),
            "tax",
        ))
    }
}

/// The exact result when there is one, else the clamped one.
fn saturate(exact: Option<Decimal>, clamped: impl FnOnce() -> Decimal, op: &'static str) -> Decimal {
    exact.unwrap_or_else(|| {
        let clamped = clamped();
        warn!(op, result = %clamped, "money overflow saturated");
        clamped
    })
}

// =============================================================================
// Price Normalizer
// =============================================================================

/// Coerces a price of unknown shape into [`Money`].
///
/// ## Rules (in order)
/// ```text
/// absent / null                       → 0.00
/// number                              → the number
/// string  "3.25" / " 7 " / "1e2"      → the parsed number
/// string  "" / "   "                  → 0.00
/// string  "abc" / "Infinity" / "1_0"  → 0.00  (not a finite number)
/// bool                                → 1.00 / 0.00
/// array / object                      → 0.00
/// ```
/// Negative values pass through unchanged.
pub fn normalize_price(value: Option<&Value>) -> Money {
    let normalized = match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(number)) => parse_number(&number.to_string()),
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Some(Decimal::ZERO)
            } else {
                parse_number(text)
            }
        }
        Some(Value::Bool(flag)) => Some(if *flag { Decimal::ONE } else { Decimal::ZERO }),
        Some(Value::Array(_)) | Some(Value::Object(_)) => None,
    };

    match normalized {
        Some(amount) => Money(amount),
        None => {
            match value {
                Some(Value::Number(_)) | Some(Value::String(_)) => {
                    warn!(raw = ?value, "price out of range or not a number, normalized to zero");
                }
                Some(Value::Array(_)) | Some(Value::Object(_)) => {
                    debug!(raw = ?value, "non-numeric price normalized to zero");
                }
                _ => {}
            }
            Money::zero()
        }
    }
}

/// Parses a decimal literal, accepting exponent notation.
fn parse_number(text: &str) -> Option<Decimal> {
    if text.contains('_') {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Serde adapter running [`normalize_price`] at deserialization time.
///
/// Use together with `#[serde(default)]` so an absent field also becomes zero.
pub fn deserialize_price<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(normalize_price(raw.as_ref()))
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the rounded amount with a dollar sign: `$24.25`, `-$5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded();
        if rounded.is_negative() {
            write!(f, "-${}", Money(-rounded.0).to_display_string())
        } else {
            write!(f, "${}", rounded.to_display_string())
        }
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(saturate(self.0.checked_add(other.0), || self.0.saturating_add(other.0), "add"))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(saturate(self.0.checked_sub(other.0), || self.0.saturating_sub(other.0), "subtract"))
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_and_null_are_zero() {
        assert!(normalize_price(None).is_zero());
        assert!(normalize_price(Some(&Value::Null)).is_zero());
    }

    #[test]
    fn test_non_numeric_strings_are_zero() {
        for raw in ["abc", "12abc", "Infinity", "NaN", "1_000", "--1"] {
            assert!(normalize_price(Some(&json!(raw))).is_zero(), "{raw}");
        }
        assert!(normalize_price(Some(&json!(""))).is_zero());
        assert!(normalize_price(Some(&json!("   "))).is_zero());
    }

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(normalize_price(Some(&json!(10.5))), Money::from_cents(1050));
        assert_eq!(normalize_price(Some(&json!(7))), Money::from_cents(700));
        assert_eq!(normalize_price(Some(&json!(" 3.25 "))), Money::from_cents(325));
        assert_eq!(normalize_price(Some(&json!("1e2"))), Money::from_cents(10_000));
    }

    #[test]
    fn test_negative_prices_are_not_clamped() {
        assert_eq!(normalize_price(Some(&json!(-4.5))), Money::from_cents(-450));
        assert_eq!(normalize_price(Some(&json!("-2"))), Money::from_cents(-200));
    }

    #[test]
    fn test_structured_values() {
        assert_eq!(normalize_price(Some(&json!(true))), Money::from_cents(100));
        assert!(normalize_price(Some(&json!(false))).is_zero());
        assert!(normalize_price(Some(&json!([1]))).is_zero());
        assert!(normalize_price(Some(&json!({"amount": 1}))).is_zero());
    }

    #[test]
    fn test_full_precision_is_kept() {
        let price = normalize_price(Some(&json!("0.335")));
        assert_eq!(price.amount(), Decimal::new(335, 3));
        assert_eq!((price * 3).to_display_string(), "1.01");
    }

    #[test]
    fn test_display_rounds_half_up() {
        assert_eq!(Money::from_decimal(Decimal::new(1005, 3)).to_display_string(), "1.01");
        assert_eq!(Money::from_decimal(Decimal::new(1004, 3)).to_display_string(), "1.00");
        assert_eq!(Money::from_decimal(Decimal::new(-1005, 3)).to_display_string(), "-1.01");
        assert_eq!(Money::from_cents(1050).to_display_string(), "10.50");
    }

    #[test]
    fn test_display_with_symbol() {
        assert_eq!(format!("{}", Money::from_cents(2425)), "$24.25");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
    }

    #[test]
    fn test_tax_is_exact() {
        let amount = Money::from_cents(1000);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(825)).amount(), Decimal::new(825, 3));
        assert!(amount.calculate_tax(TaxRate::zero()).is_zero());
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_cents(100), Money::from_cents(250)].into_iter().sum();
        assert_eq!(total, Money::from_cents(350));
    }

    #[test]
    fn test_overflow_saturates() {
        let huge = normalize_price(Some(&json!("79228162514264337593543950335")));
        assert_eq!(huge.amount(), Decimal::MAX);

        assert_eq!((huge + huge).amount(), Decimal::MAX);
        assert_eq!(huge.multiply_quantity(2).amount(), Decimal::MAX);
        assert_eq!((Money::zero() - huge - huge).amount(), Decimal::MIN);
        assert_eq!(
            Money::from_decimal(Decimal::MIN).multiply_quantity(3).amount(),
            Decimal::MIN
        );

        let big = normalize_price(Some(&json!("100000000000000000000")));
        assert_eq!(big.multiply_quantity(u32::MAX).amount(), Decimal::MAX);
        assert_eq!(
            huge.calculate_tax(TaxRate::from_bps(20_000)).amount(),
            Decimal::MAX
        );
    }

    #[test]
    fn test_out_of_range_numbers_are_zero() {
        assert!(normalize_price(Some(&json!(1e30))).is_zero());
        assert!(normalize_price(Some(&json!("0x10"))).is_zero());
    }

    #[test]
    fn test_deserialize_price_adapter() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "deserialize_price")]
            price: Money,
        }

        let row: Row = serde_json::from_value(json!({"price": "9.99"})).unwrap();
        assert_eq!(row.price, Money::from_cents(999));
        let row: Row = serde_json::from_value(json!({"price": null})).unwrap();
        assert!(row.price.is_zero());
        let row: Row = serde_json::from_value(json!({})).unwrap();
        assert!(row.price.is_zero());
    }
}

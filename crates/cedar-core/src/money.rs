//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE ALLOCATION PROBLEM                                                 │
//! │                                                                         │
//! │  Refund tax is a share of the transaction tax:                          │
//! │    $5.20 × (30 / 40) × (1 / 2) = $1.95                                  │
//! │                                                                         │
//! │  Floats leak:   0.1 + 0.2 = 0.30000000000000004                         │
//! │  Cents lose:    a third of $10.00 is 333 cents, ×3 = 999 cents          │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal, rounded only for display                │
//! │    Allocations keep full precision while operators change refund       │
//! │    quantities; the receipt and CSV show 2 decimals.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lenient Input
//! Backend rows may carry `null`, a missing field, a number or a numeric
//! string. All of them deserialize into `Money`; anything unusable becomes
//! zero. A POS never crashes mid-transaction over a bad number.
//!
//! ## Usage
//! ```rust
//! use cedar_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let doubled = price * 2;             // $21.98
//! assert_eq!(doubled.to_string(), "$21.98");
//! assert_eq!(doubled.format_plain(), "21.98");
//! ```

use rust_decimal::prelude::*;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

/// Decimal places shown for currency (CAD).
pub const CURRENCY_DECIMALS: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in dollars, backed by `rust_decimal::Decimal`.
///
/// ## Design Decisions
/// - **Decimal (not cents)**: proportional tax shares keep sub-cent digits
///   until the final figure is displayed
/// - **Signed**: refunds and rebates may be negative
/// - **Serialized as a JSON number**: matches the backend's numeric columns
///
/// ## Where Money is Used
/// ```text
/// SaleLineItem.total_price ──► TaxAllocator ──► RefundBreakdown.tax
///                                   │
///                                   └──► ReceiptView ──► "$16.95" on paper
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] Decimal);

impl Money {
    /// Zero dollars.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money::ZERO
    }

    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use cedar_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// assert_eq!(price.to_string(), "$10.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, CURRENCY_DECIMALS))
    }

    /// Converts a float coming from a JSON row.
    ///
    /// NaN and infinities become zero instead of poisoning every sum
    /// they touch.
    pub fn from_f64(value: f64) -> Self {
        Decimal::from_f64(value).map(Money).unwrap_or_default()
    }

    /// Returns the exact decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns the amount as a float (for charts and serialization only).
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Rounds to whole cents, midpoints away from zero.
    ///
    /// ```rust
    /// use cedar_core::money::Money;
    ///
    /// let m: Money = "1.005".parse().unwrap();
    /// assert_eq!(m.round_to_cents(), Money::from_cents(101));
    /// ```
    pub fn round_to_cents(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(CURRENCY_DECIMALS, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Returns the value in whole cents (rounded).
    pub fn cents(&self) -> i64 {
        self.round_to_cents()
            .0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|c| c.to_i64())
            .unwrap_or_default()
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is less than zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Negative amounts become zero.
    pub fn clamp_non_negative(self) -> Self {
        self.max(Money::ZERO)
    }

    /// Multiplies by an exact ratio without rounding.
    ///
    /// ## Example
    /// ```rust
    /// use cedar_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let tax = Money::from_cents(390);
    /// let half = tax.scale(Decimal::new(5, 1));
    /// assert_eq!(half, Money::from_cents(195));
    /// ```
    #[inline]
    pub fn scale(&self, ratio: Decimal) -> Money {
        let negative = self.0.is_sign_negative() != ratio.is_sign_negative();
        Money(saturate(self.0.checked_mul(ratio), negative))
    }

    /// `self / whole` as an exact ratio; zero when `whole` is zero.
    pub fn ratio_of(&self, whole: Money) -> Decimal {
        if whole.is_zero() {
            return Decimal::ZERO;
        }
        saturate(
            self.0.checked_div(whole.0),
            self.0.is_sign_negative() != whole.0.is_sign_negative(),
        )
    }

    /// Two-decimal string without a currency symbol, as used in CSV cells.
    pub fn format_plain(&self) -> String {
        let mut rounded = self.round_to_cents().0;
        if rounded.is_zero() {
            // avoids "-0.00"
            rounded = Decimal::ZERO;
        }
        rounded.rescale(CURRENCY_DECIMALS);
        rounded.to_string()
    }

    /// Formats with a leading currency symbol: `-$5.50`.
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.round_to_cents().is_negative() {
            "-"
        } else {
            ""
        };
        format!("{}{}{}", sign, symbol, self.abs().format_plain())
    }
}

/// Overflowed results clamp to the largest representable value of their sign.
#[inline]
fn saturate(result: Option<Decimal>, negative: bool) -> Decimal {
    result.unwrap_or(if negative { Decimal::MIN } else { Decimal::MAX })
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the Canadian dollar sign; receipts use
/// [`Money::format_with_symbol`] with the configured symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with_symbol("$"))
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(saturate(self.0.checked_add(other.0), self.0.is_sign_negative()))
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
        Money(saturate(self.0.checked_sub(other.0), self.0.is_sign_negative()))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.scale(Decimal::from(qty))
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, ratio: Decimal) -> Self {
        self.scale(ratio)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string or null")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Ok(Money::from_f64(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Ok(Money(Decimal::from(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        let trimmed = v.trim();
        Ok(Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Money)
            .unwrap_or_default())
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Money, E> {
        Ok(Money::ZERO)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::ZERO)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Money, D::Error> {
        Money::deserialize(deserializer)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

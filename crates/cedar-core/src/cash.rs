//! # Cash Rounding
//!
//! Canada withdrew the penny in 2013: cash totals are rounded to the nearest
//! $0.05, everything else is paid to the cent.
//!
//! ```text
//! ┌──────────────┬──────────────┐
//! │  ends in     │  rounds to   │
//! ├──────────────┼──────────────┤
//! │  .01 / .02   │  .00         │
//! │  .03 / .04   │  .05         │
//! │  .06 / .07   │  .05         │
//! │  .08 / .09   │  .10         │
//! │  exact .x25  │  up (to +∞)  │
//! └──────────────┴──────────────┘
//! ```
//!
//! Applied to the cash tender, change given and (when asked for) the receipt
//! Total. Card payments, tax lines and subtotals are never nickel-rounded.

use rust_decimal::Decimal;

use crate::money::Money;
use crate::types::PaymentMethod;

const NICKELS_PER_DOLLAR: i64 = 20;

/// Rounds to the nearest $0.05, midpoints up: `floor(amount × 20 + ½) / 20`.
///
/// A negative midpoint moves toward zero (-10.025 becomes -10.00), the same
/// as a positive one moves away from it.
///
/// ## Example
/// ```rust
/// use cedar_core::cash::round_to_cash_nickel;
/// use cedar_core::money::Money;
///
/// assert_eq!(round_to_cash_nickel(Money::from_cents(1002)), Money::from_cents(1000));
/// assert_eq!(round_to_cash_nickel(Money::from_cents(1003)), Money::from_cents(1005));
/// ```
pub fn round_to_cash_nickel(amount: Money) -> Money {
    let nickels = Decimal::from(NICKELS_PER_DOLLAR);
    amount
        .amount()
        .checked_mul(nickels)
        .and_then(|scaled| scaled.checked_add(Decimal::new(5, 1)))
        .map(|scaled| Money::new(scaled.floor() / nickels).round_to_cents())
        .unwrap_or_else(|| amount.round_to_cents())
}

/// `rounded - amount`, the figure printed on the "Cash Rounding" line.
pub fn cash_rounding_adjustment(amount: Money) -> Money {
    round_to_cash_nickel(amount) - amount.round_to_cents()
}

/// Rounds only when the tender is cash.
///
/// ```rust
/// use cedar_core::cash::round_for_tender;
/// use cedar_core::money::Money;
/// use cedar_core::types::PaymentMethod;
///
/// let due = Money::from_cents(1299);
/// assert_eq!(round_for_tender(PaymentMethod::Cash, due), Money::from_cents(1300));
/// assert_eq!(round_for_tender(PaymentMethod::Card, due), due);
/// ```
pub fn round_for_tender(method: PaymentMethod, amount: Money) -> Money {
    if method.is_cash() {
        round_to_cash_nickel(amount)
    } else {
        amount
    }
}

/// Whether the adjustment is worth a receipt line (at least one cent).
pub fn has_visible_adjustment(amount: Money) -> bool {
    cash_rounding_adjustment(amount).abs() >= Money::from_cents(1)
}

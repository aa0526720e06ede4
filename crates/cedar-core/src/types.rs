//! # Domain Types
//!
//! Row shapes read from the hosted backend plus the small value types the
//! calculators share.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    SaleRow      │   │  SaleLineItem   │   │   PaymentRow    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  subtotal, tax  │   │  quantity       │   │  sale_id        │       │
//! │  │  total          │   │  total_price ★  │   │  payment_method │       │
//! │  │  created_at     │   │  modifiers      │   │  amount         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   RefundRow     │   │   DrawerRow     │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  total_refund_  │   │  starting_cash  │   │  Cash, Card,    │       │
//! │  │    amount       │   │  actual_cash    │   │  GiftCard, ...  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ★ total_price is authoritative; it is never re-derived from          │
//! │    unit_price × quantity.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names are snake_case to match the backend columns. Every field has a
//! serde default so a sparse row still deserializes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::de::{lenient_quantity, lenient_timestamp, null_as_default};
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%. 1300 bps = 13% (Ontario HST), 500 bps = 5% (GST).
/// Integer bps make a stable grouping key for the tax report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (13.0 => 13%).
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return TaxRate(0);
        }
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Interprets a `tax_rate` column value.
    ///
    /// Rows store either a fraction (`0.13`) or a percentage (`13`);
    /// values at or below 1.0 are read as fractions.
    pub fn from_row_value(value: f64) -> Self {
        if value > 0.0 && value <= 1.0 {
            TaxRate::from_percentage(value * 100.0)
        } else {
            TaxRate::from_percentage(value)
        }
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

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `13.00%`
    pub fn label(&self) -> String {
        format!("{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was tendered or a refund paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash. The only method subject to nickel rounding.
    Cash,
    /// Credit or debit card on the terminal.
    Card,
    /// Store gift card.
    GiftCard,
    /// Store credit / account balance.
    StoreCredit,
    /// Anything the backend labels differently.
    Other,
}

impl PaymentMethod {
    /// Parses the free-form `payment_method` / `refund_method` column.
    ///
    /// ```rust
    /// use cedar_core::PaymentMethod;
    ///
    /// assert_eq!(PaymentMethod::from_label("CASH"), PaymentMethod::Cash);
    /// assert_eq!(PaymentMethod::from_label("debit"), PaymentMethod::Card);
    /// assert_eq!(PaymentMethod::from_label("bitcoin"), PaymentMethod::Other);
    /// ```
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "cash" => PaymentMethod::Cash,
            "card" | "credit" | "debit" | "credit_card" | "debit_card" | "interac" => {
                PaymentMethod::Card
            }
            "gift_card" | "giftcard" => PaymentMethod::GiftCard,
            "store_credit" | "credit_note" | "account" => PaymentMethod::StoreCredit,
            _ => PaymentMethod::Other,
        }
    }

    /// Human label for receipts and reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::GiftCard => "Gift Card",
            PaymentMethod::StoreCredit => "Store Credit",
            PaymentMethod::Other => "Other",
        }
    }

    #[inline]
    pub fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

// =============================================================================
// Sale Line Item
// =============================================================================

/// A priced modifier on a line (e.g. "Oat milk +$0.75").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Modifier {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub price: Money,
}

/// One purchased line of a finalized sale (a `pos_sale_items` row).
///
/// Immutable once the sale is finalized; refunds only read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    /// Owning sale, present on rows fetched for reports.
    #[serde(default)]
    pub sale_id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: i64,

    #[serde(default)]
    pub unit_price: Money,

    /// Line total as stored. Authoritative, even when it disagrees with
    /// `unit_price × quantity` (line discounts, price overrides).
    #[serde(default)]
    pub total_price: Money,

    #[serde(default, deserialize_with = "null_as_default")]
    pub modifiers: Vec<Modifier>,

    #[serde(default)]
    pub tax_rate: Option<f64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tax_exempt: bool,

    #[serde(default)]
    pub category_name: Option<String>,

    #[serde(default)]
    pub sku: Option<String>,

    /// Kitchen / preparation notes.
    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub inventory_id: Option<String>,

    /// Named taxes for the whole line (e.g. GST + PST), when the checkout
    /// recorded them.
    #[serde(default)]
    pub tax_breakdown: Option<BTreeMap<String, Money>>,

    /// Named rebates for the whole line (e.g. an Ontario point-of-sale
    /// rebate on the provincial part of HST).
    #[serde(default)]
    pub rebate_breakdown: Option<BTreeMap<String, Money>>,
}

impl SaleLineItem {
    /// The row's tax rate, if it has a positive one.
    pub fn rate(&self) -> Option<TaxRate> {
        self.tax_rate
            .filter(|r| r.is_finite() && *r > 0.0)
            .map(TaxRate::from_row_value)
    }
}

// =============================================================================
// Transaction Tax Context
// =============================================================================

/// Sale-level subtotal and total tax collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionTaxContext {
    #[serde(default)]
    pub subtotal: Money,
    #[serde(default)]
    pub tax: Money,
}

impl TransactionTaxContext {
    pub fn new(subtotal: Money, tax: Money) -> Self {
        TransactionTaxContext { subtotal, tax }
    }
}

// =============================================================================
// Sale Row
// =============================================================================

/// A `pos_sales` row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRow {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default)]
    pub sale_number: Option<String>,
    #[serde(default)]
    pub subtotal: Money,
    #[serde(default)]
    pub tax: Money,
    #[serde(default)]
    pub total: Money,
    #[serde(default)]
    pub discount_amount: Money,
    #[serde(default)]
    pub tip_amount: Money,
    #[serde(default)]
    pub change_given: Money,
    #[serde(default)]
    pub loyalty_redemption: Money,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SaleRow {
    /// The sale's subtotal and tax, as the allocator needs them.
    pub fn tax_context(&self) -> TransactionTaxContext {
        TransactionTaxContext::new(self.subtotal, self.tax)
    }
}

// =============================================================================
// Refund Row
// =============================================================================

/// A `pos_refunds` row, as read back for reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundRow {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// `None` for manual refunds.
    #[serde(default)]
    pub original_sale_id: Option<String>,
    #[serde(default)]
    pub total_refund_amount: Money,
    #[serde(default)]
    pub refund_method: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub refunded_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl RefundRow {
    pub fn method(&self) -> PaymentMethod {
        self.refund_method
            .as_deref()
            .map(PaymentMethod::from_label)
            .unwrap_or(PaymentMethod::Other)
    }
}

// =============================================================================
// Payment Row
// =============================================================================

/// A `pos_payments` row. A sale can have several (split tender).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentRow {
    #[serde(default)]
    pub sale_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_method: String,
    #[serde(default)]
    pub amount: Money,
    /// Cash handed over by the customer, when recorded.
    #[serde(default)]
    pub tendered: Option<Money>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PaymentRow {
    pub fn method(&self) -> PaymentMethod {
        PaymentMethod::from_label(&self.payment_method)
    }
}

// =============================================================================
// Drawer Row
// =============================================================================

/// A `pos_cash_drawers` session row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DrawerRow {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default)]
    pub drawer_name: Option<String>,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub starting_cash: Money,
    /// Expected cash as recorded by the closing screen.
    #[serde(default)]
    pub expected_cash: Option<Money>,
    /// Counted cash; `None` while the drawer is still open.
    #[serde(default)]
    pub actual_cash: Option<Money>,
    #[serde(default)]
    pub variance: Option<Money>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[ts(as = "Option<String>")]
    pub opened_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Actor Context
// =============================================================================

/// Who is acting, for which business.
///
/// Passed explicitly into every operation that stamps records, instead of
/// being read from browser storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ActorContext {
    pub business_id: String,
    pub actor_id: String,
}

impl ActorContext {
    pub fn new(business_id: impl Into<String>, actor_id: impl Into<String>) -> Self {
        ActorContext {
            business_id: business_id.into(),
            actor_id: actor_id.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_row_value() {
        assert_eq!(TaxRate::from_row_value(13.0).bps(), 1300);
        assert_eq!(TaxRate::from_row_value(0.13).bps(), 1300);
        assert_eq!(TaxRate::from_row_value(0.05).bps(), 500);
        assert_eq!(TaxRate::from_row_value(-2.0).bps(), 0);
        assert_eq!(TaxRate::from_bps(1475).label(), "14.75%");
    }

    #[test]
    fn test_payment_method_labels() {
        assert_eq!(PaymentMethod::from_label(" Cash "), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::from_label("credit-card"), PaymentMethod::Card);
        assert_eq!(PaymentMethod::from_label("Gift Card"), PaymentMethod::GiftCard);
        assert_eq!(PaymentMethod::from_label(""), PaymentMethod::Other);
        assert!(PaymentMethod::Cash.is_cash());
    }

    #[test]
    fn test_sparse_sale_item_row() {
        let item: SaleLineItem = serde_json::from_value(serde_json::json!({
            "id": "li-1",
            "name": "Latte",
            "quantity": 2,
            "unit_price": 4.5,
            "total_price": "9.00",
            "tax_rate": null,
            "tax_exempt": null,
            "modifiers": [{"name": "Oat milk", "price": 0.75}]
        }))
        .unwrap();

        assert_eq!(item.quantity, 2);
        assert_eq!(item.total_price, Money::from_cents(900));
        assert!(!item.tax_exempt);
        assert!(item.rate().is_none());
        assert_eq!(item.modifiers[0].price.cents(), 75);
    }

    #[test]
    fn test_drawer_row_open_drawer() {
        let drawer: DrawerRow = serde_json::from_value(serde_json::json!({
            "id": "d-1",
            "starting_cash": 200,
            "actual_cash": null,
            "opened_at": "2024-05-01T08:00:00Z"
        }))
        .unwrap();

        assert!(drawer.actual_cash.is_none());
        assert!(drawer.closed_at.is_none());
        assert_eq!(drawer.starting_cash, Money::from_cents(20000));
    }
}

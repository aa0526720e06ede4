//! # Tax Allocation
//!
//! Splits a transaction's collected tax across its line items.
//!
//! ## Allocation Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ONE line item        → the item carries 100% of the transaction tax    │
//! │                                                                         │
//! │  MANY line items      → tax × (item.total_price / Σ total_price)        │
//! │                                                                         │
//! │  Σ total_price = 0    → every share is 0                                │
//! │                                                                         │
//! │  No rounding here. Shares are rounded only when displayed, so an        │
//! │  operator can change refund quantities repeatedly without drift.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use cedar_core::money::Money;
//! use cedar_core::tax::allocate_item_tax;
//! use cedar_core::types::{SaleLineItem, TransactionTaxContext};
//!
//! let a = SaleLineItem { id: "a".into(), total_price: Money::from_cents(3000), ..Default::default() };
//! let b = SaleLineItem { id: "b".into(), total_price: Money::from_cents(1000), ..Default::default() };
//! let items = vec![a.clone(), b];
//! let ctx = TransactionTaxContext::new(Money::from_cents(4000), Money::from_cents(520));
//!
//! assert_eq!(allocate_item_tax(&a, &items, &ctx), Money::from_cents(390));
//! ```

use crate::money::Money;
use crate::types::{SaleLineItem, TransactionTaxContext};

/// Allocates transaction tax to the items of one transaction.
///
/// Build it once per transaction; the denominator is computed up front.
#[derive(Debug, Clone, Copy)]
pub struct TaxAllocator {
    transaction_tax: Money,
    items_subtotal: Money,
    item_count: usize,
}

impl TaxAllocator {
    pub fn new(all_items: &[SaleLineItem], ctx: &TransactionTaxContext) -> Self {
        TaxAllocator {
            transaction_tax: ctx.tax,
            items_subtotal: all_items.iter().map(|i| i.total_price).sum(),
            item_count: all_items.len(),
        }
    }

    /// The item's unrounded share of the transaction tax.
    pub fn allocate(&self, item: &SaleLineItem) -> Money {
        if self.item_count == 1 {
            return self.transaction_tax;
        }
        let share = item.total_price.ratio_of(self.items_subtotal);
        self.transaction_tax.scale(share)
    }

    /// Whether the single-item shortcut applies.
    pub fn is_single_item(&self) -> bool {
        self.item_count == 1
    }

    pub fn transaction_tax(&self) -> Money {
        self.transaction_tax
    }
}

/// One-off form of [`TaxAllocator::allocate`].
pub fn allocate_item_tax(
    item: &SaleLineItem,
    all_items: &[SaleLineItem],
    ctx: &TransactionTaxContext,
) -> Money {
    TaxAllocator::new(all_items, ctx).allocate(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, total_cents: i64) -> SaleLineItem {
        SaleLineItem {
            id: id.to_string(),
            name: id.to_string(),
            quantity: 1,
            total_price: Money::from_cents(total_cents),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_item_gets_full_tax() {
        let only = item("a", 1);
        let items = vec![only.clone()];
        // Subtotal disagrees with the item on purpose: it does not matter.
        let ctx = TransactionTaxContext::new(Money::from_cents(99999), Money::from_cents(137));
        assert_eq!(allocate_item_tax(&only, &items, &ctx), Money::from_cents(137));
    }

    #[test]
    fn test_single_zero_priced_item_still_gets_full_tax() {
        let only = item("a", 0);
        let items = vec![only.clone()];
        let ctx = TransactionTaxContext::new(Money::zero(), Money::from_cents(50));
        assert_eq!(allocate_item_tax(&only, &items, &ctx), Money::from_cents(50));
    }

    #[test]
    fn test_proportional_split() {
        let items = vec![item("a", 3000), item("b", 1000)];
        let ctx = TransactionTaxContext::new(Money::from_cents(4000), Money::from_cents(520));
        let allocator = TaxAllocator::new(&items, &ctx);

        assert_eq!(allocator.allocate(&items[0]), Money::from_cents(390));
        assert_eq!(allocator.allocate(&items[1]), Money::from_cents(130));
    }

    #[test]
    fn test_shares_sum_to_transaction_tax() {
        let items = vec![item("a", 1000), item("b", 1000), item("c", 1000)];
        let ctx = TransactionTaxContext::new(Money::from_cents(3000), Money::from_cents(100));
        let allocator = TaxAllocator::new(&items, &ctx);

        let total: Money = items.iter().map(|i| allocator.allocate(i)).sum();
        // Each share is 0.333...; the sum displays as the original tax.
        assert_eq!(total.round_to_cents(), Money::from_cents(100));
        assert_eq!(allocator.allocate(&items[0]).format_plain(), "0.33");
    }

    #[test]
    fn test_zero_subtotal_guard() {
        let items = vec![item("a", 0), item("b", 0)];
        let ctx = TransactionTaxContext::new(Money::zero(), Money::from_cents(100));
        assert!(allocate_item_tax(&items[0], &items, &ctx).is_zero());
    }

    #[test]
    fn test_item_subtotal_used_as_denominator() {
        // The sale subtotal includes a discount; shares still follow line totals.
        let items = vec![item("a", 3000), item("b", 1000)];
        let ctx = TransactionTaxContext::new(Money::from_cents(3600), Money::from_cents(520));
        assert_eq!(
            allocate_item_tax(&items[1], &items, &ctx),
            Money::from_cents(130)
        );
    }
}

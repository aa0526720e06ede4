//! Property tests for allocation, refund and report invariants.

use cedar_core::config::ReportSettings;
use cedar_core::money::Money;
use cedar_core::refund::{compute_refund_breakdown, RefundLineRequest, RefundType};
use cedar_core::report::{hourly_breakdown, percentage_of, period_summary};
use cedar_core::tax::{allocate_item_tax, TaxAllocator};
use cedar_core::types::{SaleLineItem, SaleRow, TransactionTaxContext};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn items_from(lines: &[(i64, i64)]) -> Vec<SaleLineItem> {
    lines
        .iter()
        .enumerate()
        .map(|(i, (quantity, cents))| SaleLineItem {
            id: format!("item-{}", i),
            name: format!("Item {}", i),
            quantity: *quantity,
            total_price: Money::from_cents(*cents),
            ..SaleLineItem::default()
        })
        .collect()
}

fn ctx_for(items: &[SaleLineItem], tax_cents: i64) -> TransactionTaxContext {
    let subtotal: Money = items.iter().map(|i| i.total_price).sum();
    TransactionTaxContext::new(subtotal, Money::from_cents(tax_cents))
}

fn sales_from(rows: &[(u32, i64, usize)]) -> Vec<SaleRow> {
    const EMPLOYEES: [&str; 3] = ["Riley", "Sam", "Jordan"];
    rows.iter()
        .enumerate()
        .map(|(i, (hour, cents, employee))| SaleRow {
            id: format!("sale-{}", i),
            total: Money::from_cents(*cents),
            employee_name: Some(EMPLOYEES[*employee].to_string()),
            payment_method: Some(if i % 2 == 0 { "cash" } else { "card" }.to_string()),
            created_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, *hour, 0, 0).unwrap()),
            ..SaleRow::default()
        })
        .collect()
}

proptest! {
    #[test]
    fn single_item_carries_full_tax(cents in 0i64..1_000_000, tax in 0i64..100_000) {
        let items = items_from(&[(1, cents)]);
        let ctx = ctx_for(&items, tax);
        prop_assert_eq!(allocate_item_tax(&items[0], &items, &ctx), Money::from_cents(tax));
    }

    #[test]
    fn shares_sum_to_transaction_tax(
        lines in prop::collection::vec((1i64..5, 1i64..100_000), 2..8),
        tax in 0i64..100_000,
    ) {
        let items = items_from(&lines);
        let ctx = ctx_for(&items, tax);
        let allocator = TaxAllocator::new(&items, &ctx);
        let total: Money = items.iter().map(|i| allocator.allocate(i)).sum();
        prop_assert_eq!(total.round_to_cents(), Money::from_cents(tax));
    }

    #[test]
    fn refund_breakdown_is_idempotent(
        lines in prop::collection::vec((1i64..5, 1i64..100_000), 1..6),
        quantities in prop::collection::vec(0i64..6, 1..6),
        tax in 0i64..50_000,
    ) {
        let items = items_from(&lines);
        let ctx = ctx_for(&items, tax);
        let requests: Vec<RefundLineRequest> = quantities
            .iter()
            .enumerate()
            .map(|(i, q)| RefundLineRequest::new(format!("item-{}", i), *q))
            .collect();

        let first = compute_refund_breakdown(&requests, &items, &ctx);
        let second = compute_refund_breakdown(&requests, &items, &ctx);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn full_refund_returns_everything(
        lines in prop::collection::vec((1i64..5, 1i64..100_000), 1..6),
        tax in 0i64..50_000,
    ) {
        let items = items_from(&lines);
        let ctx = ctx_for(&items, tax);
        let requests: Vec<RefundLineRequest> = items
            .iter()
            .map(|i| RefundLineRequest::new(i.id.clone(), i.quantity))
            .collect();

        let breakdown = compute_refund_breakdown(&requests, &items, &ctx);
        let expected = ctx.subtotal + ctx.tax;
        prop_assert!((breakdown.total - expected).abs() < Money::from_cents(1));
        prop_assert_eq!(breakdown.refund_type, RefundType::Full);
    }

    #[test]
    fn zero_quantities_refund_nothing(
        lines in prop::collection::vec((1i64..5, 1i64..100_000), 1..6),
        tax in 0i64..50_000,
    ) {
        let items = items_from(&lines);
        let ctx = ctx_for(&items, tax);
        let requests: Vec<RefundLineRequest> = items
            .iter()
            .map(|i| RefundLineRequest::new(i.id.clone(), 0))
            .collect();

        let breakdown = compute_refund_breakdown(&requests, &items, &ctx);
        prop_assert!(breakdown.is_empty());
        prop_assert!(breakdown.total.is_zero());
    }

    #[test]
    fn hourly_report_ignores_row_order(
        rows in prop::collection::vec((0u32..24, 1i64..50_000, 0usize..3), 0..30),
    ) {
        let sales = sales_from(&rows);
        let mut reversed = sales.clone();
        reversed.reverse();

        let forward = hourly_breakdown(&sales, &[], &Utc, &ReportSettings::default());
        let backward = hourly_breakdown(&reversed, &[], &Utc, &ReportSettings::default());
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn period_report_ignores_row_order(
        rows in prop::collection::vec((0u32..24, 1i64..50_000, 0usize..3), 0..30),
    ) {
        let sales = sales_from(&rows);
        let mut reversed = sales.clone();
        reversed.reverse();

        let forward = period_summary(&sales, &[], &[], &[]);
        let backward = period_summary(&reversed, &[], &[], &[]);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn percentages_are_always_finite(part in -1_000_000i64..1_000_000, total in -1_000_000i64..1_000_000) {
        let pct = percentage_of(Money::from_cents(part), Money::from_cents(total));
        prop_assert!(pct.is_finite());
    }
}

//! Tax compliance: collected tax grouped by rate, plus an estimate of the
//! tax given back through refunds.
//!
//! Refund rows carry no tax breakdown, so refunded tax is estimated from the
//! period's effective rate:
//!
//! ```text
//! effective_rate   = Σ sale.tax / Σ taxable item sales
//! refunded_tax     ≈ Σ refund.total_refund_amount × effective_rate
//! ```
//!
//! Every output of that figure carries the word "estimated".

use std::collections::{BTreeMap, HashMap};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use super::csv::{CsvDocument, CsvSection};
use super::{format_percentage, percentage_of, ReportMeta};
use crate::money::Money;
use crate::tax::TaxAllocator;
use crate::types::{RefundRow, SaleLineItem, SaleRow, TaxRate};

pub const EXEMPT_LABEL: &str = "Exempt";
pub const REFUNDED_TAX_LABEL: &str = "Refunded Tax (estimated)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRateGroup {
    /// `13.00%` or `Exempt`
    pub label: String,
    /// `None` for the exempt group.
    pub rate: Option<TaxRate>,
    pub taxable_sales: Money,
    pub tax_collected: Money,
    /// Units sold.
    pub item_count: i64,
    /// Share of all collected tax, 0-100.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxReport {
    /// Rates ascending, exempt group last.
    pub groups: Vec<TaxRateGroup>,
    pub total_taxable_sales: Money,
    pub total_exempt_sales: Money,
    pub total_tax_collected: Money,
    /// Percentage, 0-100.
    pub effective_rate: f64,
    pub total_refunds: Money,
    pub estimated_refunded_tax: Money,
    pub refunded_tax_label: String,
    /// `total_tax_collected - estimated_refunded_tax`
    pub net_tax: Money,
}

#[derive(Debug, Default)]
struct RateSums {
    taxable_sales: Money,
    tax_collected: Money,
    item_count: i64,
}

impl RateSums {
    fn add(&mut self, item: &SaleLineItem, tax: Money) {
        self.taxable_sales += item.total_price;
        self.tax_collected += tax;
        self.item_count += item.quantity;
    }

    fn into_group(self, label: String, rate: Option<TaxRate>) -> TaxRateGroup {
        TaxRateGroup {
            label,
            rate,
            taxable_sales: self.taxable_sales,
            tax_collected: self.tax_collected.round_to_cents(),
            item_count: self.item_count,
            percentage: 0.0,
        }
    }
}

/// Builds the tax report for one period.
///
/// Each sale's tax is allocated across its non-exempt items (matched by
/// `sale_id`). Items of sales outside `sales` are ignored.
pub fn tax_summary(sales: &[SaleRow], items: &[SaleLineItem], refunds: &[RefundRow]) -> TaxReport {
    let mut items_by_sale: HashMap<&str, Vec<&SaleLineItem>> = HashMap::new();
    for item in items {
        if let Some(sale_id) = item.sale_id.as_deref() {
            items_by_sale.entry(sale_id).or_default().push(item);
        }
    }

    let mut rated: BTreeMap<TaxRate, RateSums> = BTreeMap::new();
    let mut exempt = RateSums::default();
    let mut matched = 0usize;

    for sale in sales {
        let Some(sale_items) = items_by_sale.get(sale.id.as_str()) else {
            continue;
        };
        matched += sale_items.len();

        let taxable: Vec<SaleLineItem> = sale_items
            .iter()
            .filter(|i| !i.tax_exempt)
            .map(|i| (*i).clone())
            .collect();
        let allocator = TaxAllocator::new(&taxable, &sale.tax_context());

        for item in sale_items {
            if item.tax_exempt {
                exempt.add(item, Money::zero());
            } else {
                let rate = item.rate().unwrap_or_default();
                rated.entry(rate).or_default().add(item, allocator.allocate(item));
            }
        }
    }

    let total_taxable_sales: Money = rated.values().map(|s| s.taxable_sales).sum();
    let total_exempt_sales = exempt.taxable_sales;
    let total_tax_collected: Money = sales.iter().map(|s| s.tax).sum();
    let total_refunds: Money = refunds.iter().map(|r| r.total_refund_amount).sum();

    let ratio = total_tax_collected.ratio_of(total_taxable_sales);
    let estimated_refunded_tax = total_refunds.scale(ratio).round_to_cents();
    let effective_rate = ratio
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|r| r.to_f64())
        .filter(|r| r.is_finite())
        .unwrap_or(0.0);

    let mut groups: Vec<TaxRateGroup> = rated
        .into_iter()
        .map(|(rate, sums)| sums.into_group(rate.label(), Some(rate)))
        .collect();
    if exempt.item_count != 0 || !exempt.taxable_sales.is_zero() {
        groups.push(exempt.into_group(EXEMPT_LABEL.to_string(), None));
    }
    let grouped_tax: Money = groups.iter().map(|g| g.tax_collected).sum();
    for group in &mut groups {
        group.percentage = percentage_of(group.tax_collected, grouped_tax);
    }

    debug!(
        sales = sales.len(),
        items = items.len(),
        matched_items = matched,
        effective_rate,
        "Computed tax summary"
    );

    TaxReport {
        groups,
        total_taxable_sales,
        total_exempt_sales,
        total_tax_collected,
        effective_rate,
        total_refunds,
        estimated_refunded_tax,
        refunded_tax_label: REFUNDED_TAX_LABEL.to_string(),
        net_tax: total_tax_collected - estimated_refunded_tax,
    }
}

impl TaxReport {
    pub fn to_csv(&self, meta: &ReportMeta) -> CsvDocument {
        let mut doc = CsvDocument::new("Tax Compliance Report", meta);

        let mut rates = CsvSection::new([
            "Tax Rate",
            "Taxable Sales",
            "Tax Collected",
            "Items",
            "Percentage",
        ]);
        for group in &self.groups {
            rates.push_row([
                group.label.clone(),
                group.taxable_sales.format_plain(),
                group.tax_collected.format_plain(),
                group.item_count.to_string(),
                format_percentage(group.percentage),
            ]);
        }
        doc.push_section(rates);

        let mut summary = CsvSection::new(["Metric", "Value"]);
        summary.push_row(["Taxable Sales".to_string(), self.total_taxable_sales.format_plain()]);
        summary.push_row(["Exempt Sales".to_string(), self.total_exempt_sales.format_plain()]);
        summary.push_row(["Tax Collected".to_string(), self.total_tax_collected.format_plain()]);
        summary.push_row([
            "Effective Rate".to_string(),
            format_percentage(self.effective_rate),
        ]);
        summary.push_row(["Total Refunds".to_string(), self.total_refunds.format_plain()]);
        summary.push_row([
            self.refunded_tax_label.clone(),
            self.estimated_refunded_tax.format_plain(),
        ]);
        summary.push_row(["Net Tax (estimated)".to_string(), self.net_tax.format_plain()]);
        doc.push_section(summary);

        doc
    }
}

//! # Report Aggregators
//!
//! Read-only aggregation over rows the report screens fetched for a period.
//! The caller has already applied the date-range filter.
//!
//! ## Reports
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Report Aggregators                               │
//! │                                                                         │
//! │  hourly  ── sales / refunds bucketed by local hour (0-23), peak hours  │
//! │  period  ── totals + groups by category, employee, payment method      │
//! │  tax     ── groups by tax rate (+ Exempt), estimated refunded tax      │
//! │  drawer  ── expected cash vs counted cash, variance flag               │
//! │                                                                         │
//! │  every report ──► CsvDocument ──► data:text/csv URI                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//! Sums are exact decimals and groups live in ordered maps, so the same rows
//! in any order give the same report. Sorting happens once, after
//! aggregation, for display.

pub mod csv;
pub mod drawer;
pub mod hourly;
pub mod period;
pub mod tax;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

pub use csv::{CsvDocument, CsvSection};
pub use drawer::{drawer_report, reconcile_drawer, DrawerReconciliation, DrawerReport};
pub use hourly::{hourly_breakdown, HourlyBucket, HourlyReport};
pub use period::{period_summary, PeriodReport};
pub use tax::{tax_summary, TaxRateGroup, TaxReport};

/// `part / total` as a percentage; 0 when `total` is 0.
///
/// ```rust
/// use cedar_core::money::Money;
/// use cedar_core::report::percentage_of;
///
/// assert_eq!(percentage_of(Money::from_cents(250), Money::from_cents(1000)), 25.0);
/// assert_eq!(percentage_of(Money::from_cents(250), Money::zero()), 0.0);
/// ```
pub fn percentage_of(part: Money, total: Money) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    part.ratio_of(total)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|pct| pct.to_f64())
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
}

/// Describes the rows a report was built from; printed in CSV exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportMeta {
    /// e.g. `2024-05-01 to 2024-05-31`
    pub period: String,
    /// `None` means every employee.
    pub employee_filter: Option<String>,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
}

impl ReportMeta {
    pub fn new(period: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        ReportMeta {
            period: period.into(),
            employee_filter: None,
            generated_at,
        }
    }

    pub fn with_employee_filter(mut self, employee: impl Into<String>) -> Self {
        self.employee_filter = Some(employee.into());
        self
    }
}

/// One row of a group-by table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GroupTotal {
    pub key: String,
    pub total: Money,
    /// Transactions or units, depending on the table.
    pub count: i64,
    /// Share of the table's grand total, 0-100.
    pub percentage: f64,
}

/// Running sums keyed by group name.
#[derive(Debug, Default)]
pub(crate) struct GroupAccumulator {
    groups: BTreeMap<String, (Money, i64)>,
}

impl GroupAccumulator {
    pub(crate) fn add(&mut self, key: &str, amount: Money, count: i64) {
        let entry = self.groups.entry(key.to_string()).or_default();
        entry.0 += amount;
        entry.1 += count;
    }

    /// Totals with percentages, sorted by total (desc) then key.
    pub(crate) fn finish(self) -> Vec<GroupTotal> {
        let grand: Money = self.groups.values().map(|(total, _)| *total).sum();
        let mut rows: Vec<GroupTotal> = self
            .groups
            .into_iter()
            .map(|(key, (total, count))| GroupTotal {
                percentage: percentage_of(total, grand),
                key,
                total,
                count,
            })
            .collect();
        rows.sort_by(|a, b| by_total_desc(a.total, b.total).then_with(|| a.key.cmp(&b.key)));
        rows
    }
}

pub(crate) fn by_total_desc(a: Money, b: Money) -> Ordering {
    b.cmp(&a)
}

/// `amount / count`, 0 when there are no transactions.
pub(crate) fn average(amount: Money, count: i64) -> Money {
    if count <= 0 {
        return Money::zero();
    }
    amount
        .amount()
        .checked_div(Decimal::from(count))
        .map(Money::new)
        .unwrap_or_default()
}

pub(crate) fn format_percentage(pct: f64) -> String {
    format!("{:.2}%", pct)
}

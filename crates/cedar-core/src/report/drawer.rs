//! Cash drawer reconciliation.
//!
//! ```text
//! calculated_expected = starting_cash + (cash_sales - cash_refunds)
//! variance            = actual_cash - calculated_expected
//! flagged             = |variance| > threshold
//! ```
//!
//! Cash activity belongs to a drawer when its timestamp falls inside the
//! drawer's `[opened_at, closed_at]` window. An open drawer's window has no
//! end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use super::csv::{CsvDocument, CsvSection};
use super::ReportMeta;
use crate::config::ReportSettings;
use crate::money::Money;
use crate::types::{DrawerRow, PaymentRow, RefundRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DrawerReconciliation {
    pub drawer_id: String,
    pub drawer_name: Option<String>,
    pub employee_name: Option<String>,
    pub starting_cash: Money,
    pub cash_sales: Money,
    pub cash_refunds: Money,
    pub calculated_expected: Money,
    /// Expected cash the closing screen stored, shown for comparison.
    pub recorded_expected: Option<Money>,
    pub actual_cash: Option<Money>,
    /// `None` until the drawer has been counted.
    pub variance: Option<Money>,
    pub flagged: bool,
}

impl DrawerReconciliation {
    pub fn is_open(&self) -> bool {
        self.actual_cash.is_none()
    }

    /// `Over`, `Short`, `Balanced` or `Open`.
    pub fn status(&self) -> &'static str {
        match self.variance {
            None => "Open",
            Some(v) if v.is_positive() => "Over",
            Some(v) if v.is_negative() => "Short",
            Some(_) => "Balanced",
        }
    }
}

/// Reconciles one drawer against the cash taken and refunded while it was
/// open.
///
/// ## Example
/// ```rust
/// use cedar_core::money::Money;
/// use cedar_core::report::reconcile_drawer;
/// use cedar_core::types::DrawerRow;
///
/// let drawer = DrawerRow {
///     starting_cash: Money::from_cents(20000),
///     actual_cash: Some(Money::from_cents(62500)),
///     ..DrawerRow::default()
/// };
/// let rec = reconcile_drawer(
///     &drawer,
///     Money::from_cents(45000),
///     Money::from_cents(2000),
///     Money::from_cents(500),
/// );
/// assert_eq!(rec.calculated_expected, Money::from_cents(63000));
/// assert_eq!(rec.variance, Some(Money::from_cents(-500)));
/// assert!(!rec.flagged);
/// ```
pub fn reconcile_drawer(
    drawer: &DrawerRow,
    cash_sales: Money,
    cash_refunds: Money,
    threshold: Money,
) -> DrawerReconciliation {
    let calculated_expected = drawer.starting_cash + (cash_sales - cash_refunds);
    let variance = drawer.actual_cash.map(|actual| actual - calculated_expected);
    let flagged = variance.is_some_and(|v| v.abs() > threshold);

    if let (Some(recorded), Some(computed)) = (drawer.variance, variance) {
        if recorded != computed {
            debug!(
                drawer_id = %drawer.id,
                recorded = %recorded,
                computed = %computed,
                "Recorded drawer variance differs from recomputed value"
            );
        }
    }

    DrawerReconciliation {
        drawer_id: drawer.id.clone(),
        drawer_name: drawer.drawer_name.clone(),
        employee_name: drawer.employee_name.clone(),
        starting_cash: drawer.starting_cash,
        cash_sales,
        cash_refunds,
        calculated_expected,
        recorded_expected: drawer.expected_cash,
        actual_cash: drawer.actual_cash,
        variance,
        flagged,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DrawerReport {
    /// Ordered by `opened_at`, then id.
    pub drawers: Vec<DrawerReconciliation>,
    pub flagged_count: usize,
    /// Sum of the counted drawers' variances.
    pub total_variance: Money,
    pub threshold: Money,
}

/// Reconciles every drawer, attributing cash payments and cash refunds by
/// timestamp. Drawers whose variance exceeds `settings.variance_threshold`
/// are flagged.
pub fn drawer_report(
    drawers: &[DrawerRow],
    payments: &[PaymentRow],
    refunds: &[RefundRow],
    settings: &ReportSettings,
) -> DrawerReport {
    let threshold = settings.variance_threshold;
    let mut ordered: Vec<&DrawerRow> = drawers.iter().collect();
    ordered.sort_by(|a, b| a.opened_at.cmp(&b.opened_at).then_with(|| a.id.cmp(&b.id)));

    let reconciled: Vec<DrawerReconciliation> = ordered
        .into_iter()
        .map(|drawer| {
            let window = DrawerWindow::of(drawer);
            let cash_sales: Money = payments
                .iter()
                .filter(|p| p.method().is_cash() && window.contains(p.created_at))
                .map(|p| p.amount)
                .sum();
            let cash_refunds: Money = refunds
                .iter()
                .filter(|r| r.method().is_cash() && window.contains(r.created_at))
                .map(|r| r.total_refund_amount)
                .sum();
            reconcile_drawer(drawer, cash_sales, cash_refunds, threshold)
        })
        .collect();

    let flagged_count = reconciled.iter().filter(|d| d.flagged).count();
    let total_variance: Money = reconciled.iter().filter_map(|d| d.variance).sum();

    if flagged_count > 0 {
        warn!(
            flagged = flagged_count,
            threshold = %threshold,
            "Drawer variance above threshold"
        );
    }

    DrawerReport {
        drawers: reconciled,
        flagged_count,
        total_variance,
        threshold,
    }
}

/// A drawer's open/close interval. Missing bounds are unbounded.
#[derive(Debug, Clone, Copy)]
struct DrawerWindow {
    opened_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
}

impl DrawerWindow {
    fn of(drawer: &DrawerRow) -> Self {
        DrawerWindow {
            opened_at: drawer.opened_at,
            closed_at: drawer.closed_at,
        }
    }

    fn is_unbounded(&self) -> bool {
        self.opened_at.is_none() && self.closed_at.is_none()
    }

    /// Undated rows only count toward a drawer with no window at all.
    fn contains(&self, at: Option<DateTime<Utc>>) -> bool {
        let Some(at) = at else {
            return self.is_unbounded();
        };
        self.opened_at.map_or(true, |open| at >= open)
            && self.closed_at.map_or(true, |close| at <= close)
    }
}

impl DrawerReport {
    pub fn to_csv(&self, meta: &ReportMeta) -> CsvDocument {
        let mut doc = CsvDocument::new("Cash Drawer Report", meta);

        let mut section = CsvSection::new([
            "Drawer",
            "Employee",
            "Starting Cash",
            "Cash Sales",
            "Cash Refunds",
            "Expected",
            "Actual",
            "Variance",
            "Status",
            "Flagged",
        ]);
        for drawer in &self.drawers {
            section.push_row([
                drawer.drawer_name.clone().unwrap_or_else(|| drawer.drawer_id.clone()),
                drawer.employee_name.clone().unwrap_or_default(),
                drawer.starting_cash.format_plain(),
                drawer.cash_sales.format_plain(),
                drawer.cash_refunds.format_plain(),
                drawer.calculated_expected.format_plain(),
                drawer.actual_cash.map(|m| m.format_plain()).unwrap_or_default(),
                drawer.variance.map(|m| m.format_plain()).unwrap_or_default(),
                drawer.status().to_string(),
                if drawer.flagged { "Yes" } else { "No" }.to_string(),
            ]);
        }
        doc.push_section(section);

        let mut totals = CsvSection::new(["Metric", "Value"]);
        totals.push_row(["Drawers".to_string(), self.drawers.len().to_string()]);
        totals.push_row(["Flagged".to_string(), self.flagged_count.to_string()]);
        totals.push_row(["Total Variance".to_string(), self.total_variance.format_plain()]);
        totals.push_row(["Variance Threshold".to_string(), self.threshold.format_plain()]);
        doc.push_section(totals);

        doc
    }
}

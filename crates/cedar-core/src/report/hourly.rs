//! Sales and refunds by hour of day.

use chrono::{TimeZone, Timelike};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use super::csv::{CsvDocument, CsvSection};
use super::{average, ReportMeta};
use crate::config::ReportSettings;
use crate::money::Money;
use crate::types::{RefundRow, SaleRow};

pub const HOURS_PER_DAY: usize = 24;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HourlyBucket {
    /// Local hour, 0-23.
    pub hour: u32,
    pub sales_total: Money,
    pub refunds_total: Money,
    /// `sales_total - refunds_total`
    pub net_sales: Money,
    pub transaction_count: i64,
    pub average_transaction: Money,
    pub is_peak: bool,
}

impl HourlyBucket {
    /// `09:00`
    pub fn label(&self) -> String {
        format!("{:02}:00", self.hour)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HourlyReport {
    /// Always 24 buckets, hour 0 first.
    pub buckets: Vec<HourlyBucket>,
    pub peak_hours: Vec<u32>,
    pub total_sales: Money,
    pub total_refunds: Money,
    pub transaction_count: i64,
}

/// Buckets sales and refunds by their local hour in `tz`.
///
/// Rows without a timestamp are skipped. An hour is a peak hour when its net
/// sales are positive and at least `settings.peak_ratio` of the best hour's.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use cedar_core::config::ReportSettings;
/// use cedar_core::money::Money;
/// use cedar_core::report::hourly_breakdown;
/// use cedar_core::types::SaleRow;
///
/// let sale = SaleRow {
///     total: Money::from_cents(1200),
///     created_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 15, 0).unwrap()),
///     ..SaleRow::default()
/// };
/// let report = hourly_breakdown(&[sale], &[], &Utc, &ReportSettings::default());
/// assert_eq!(report.buckets[9].transaction_count, 1);
/// assert_eq!(report.peak_hours, vec![9]);
/// ```
pub fn hourly_breakdown<Tz: TimeZone>(
    sales: &[SaleRow],
    refunds: &[RefundRow],
    tz: &Tz,
    settings: &ReportSettings,
) -> HourlyReport {
    let mut buckets: Vec<HourlyBucket> = (0..HOURS_PER_DAY as u32)
        .map(|hour| HourlyBucket {
            hour,
            ..HourlyBucket::default()
        })
        .collect();

    for sale in sales {
        let Some(created_at) = sale.created_at else {
            continue;
        };
        let bucket = &mut buckets[created_at.with_timezone(tz).hour() as usize];
        bucket.sales_total += sale.total;
        bucket.transaction_count += 1;
    }

    for refund in refunds {
        let Some(created_at) = refund.created_at else {
            continue;
        };
        let bucket = &mut buckets[created_at.with_timezone(tz).hour() as usize];
        bucket.refunds_total += refund.total_refund_amount;
    }

    for bucket in &mut buckets {
        bucket.net_sales = bucket.sales_total - bucket.refunds_total;
        bucket.average_transaction = average(bucket.sales_total, bucket.transaction_count);
    }

    let best = buckets
        .iter()
        .map(|b| b.net_sales)
        .max()
        .unwrap_or_default();
    let ratio = Decimal::from_f64(settings.peak_ratio).unwrap_or_default();
    let threshold = best.scale(ratio);

    let mut peak_hours = Vec::new();
    for bucket in &mut buckets {
        bucket.is_peak = bucket.net_sales.is_positive() && bucket.net_sales >= threshold;
        if bucket.is_peak {
            peak_hours.push(bucket.hour);
        }
    }

    let report = HourlyReport {
        total_sales: buckets.iter().map(|b| b.sales_total).sum(),
        total_refunds: buckets.iter().map(|b| b.refunds_total).sum(),
        transaction_count: buckets.iter().map(|b| b.transaction_count).sum(),
        buckets,
        peak_hours,
    };

    debug!(
        sales = sales.len(),
        refunds = refunds.len(),
        peak_hours = ?report.peak_hours,
        "Computed hourly breakdown"
    );

    report
}

impl HourlyReport {
    pub fn net_sales(&self) -> Money {
        self.total_sales - self.total_refunds
    }

    pub fn to_csv(&self, meta: &ReportMeta) -> CsvDocument {
        let mut doc = CsvDocument::new("Hourly Sales Report", meta);

        let mut hours = CsvSection::new([
            "Hour",
            "Sales",
            "Refunds",
            "Net Sales",
            "Transactions",
            "Average Transaction",
            "Peak",
        ]);
        for bucket in &self.buckets {
            hours.push_row([
                bucket.label(),
                bucket.sales_total.format_plain(),
                bucket.refunds_total.format_plain(),
                bucket.net_sales.format_plain(),
                bucket.transaction_count.to_string(),
                bucket.average_transaction.format_plain(),
                if bucket.is_peak { "Yes" } else { "No" }.to_string(),
            ]);
        }
        doc.push_section(hours);

        let mut totals = CsvSection::new(["Metric", "Value"]);
        totals.push_row(["Total Sales".to_string(), self.total_sales.format_plain()]);
        totals.push_row(["Total Refunds".to_string(), self.total_refunds.format_plain()]);
        totals.push_row(["Net Sales".to_string(), self.net_sales().format_plain()]);
        totals.push_row(["Transactions".to_string(), self.transaction_count.to_string()]);
        doc.push_section(totals);

        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn sale_at(hour: u32, minute: u32, cents: i64) -> SaleRow {
        SaleRow {
            total: Money::from_cents(cents),
            created_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()),
            ..SaleRow::default()
        }
    }

    fn settings() -> ReportSettings {
        ReportSettings::default()
    }

    fn refund_at(hour: u32, cents: i64) -> RefundRow {
        RefundRow {
            total_refund_amount: Money::from_cents(cents),
            created_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, hour, 30, 0).unwrap()),
            ..RefundRow::default()
        }
    }

    #[test]
    fn test_bucketing_and_peaks() {
        let sales = vec![
            sale_at(9, 5, 10000),
            sale_at(9, 55, 5000),
            sale_at(12, 0, 13000),
            sale_at(15, 0, 4000),
        ];
        let refunds = vec![refund_at(12, 1000)];
        let report = hourly_breakdown(&sales, &refunds, &Utc, &settings());

        assert_eq!(report.buckets.len(), 24);
        let nine = &report.buckets[9];
        assert_eq!(nine.sales_total, Money::from_cents(15000));
        assert_eq!(nine.transaction_count, 2);
        assert_eq!(nine.average_transaction, Money::from_cents(7500));

        let noon = &report.buckets[12];
        assert_eq!(noon.net_sales, Money::from_cents(12000));

        // Best net is 150.00; 120.00 is exactly 80% of it.
        assert_eq!(report.peak_hours, vec![9, 12]);
        assert!(!report.buckets[15].is_peak);
        assert_eq!(report.transaction_count, 4);
        assert_eq!(report.net_sales(), Money::from_cents(31000));
    }

    #[test]
    fn test_peak_ratio_from_settings() {
        let sales = vec![sale_at(9, 0, 15000), sale_at(12, 0, 12000)];
        let strict = ReportSettings {
            peak_ratio: 0.9,
            ..ReportSettings::default()
        };
        let report = hourly_breakdown(&sales, &[], &Utc, &strict);
        assert_eq!(report.peak_hours, vec![9]);
    }

    #[test]
    fn test_local_timezone() {
        let toronto_summer = FixedOffset::west_opt(4 * 3600).unwrap();
        let report = hourly_breakdown(&[sale_at(13, 0, 500)], &[], &toronto_summer, &settings());
        assert_eq!(report.buckets[9].transaction_count, 1);
        assert_eq!(report.buckets[13].transaction_count, 0);
    }

    #[test]
    fn test_no_peaks_when_nothing_positive() {
        let report = hourly_breakdown(&[], &[refund_at(10, 500)], &Utc, &settings());
        assert!(report.peak_hours.is_empty());
        assert_eq!(report.buckets[10].net_sales, Money::from_cents(-500));
        assert!(report.buckets[10].average_transaction.is_zero());
    }

    #[test]
    fn test_rows_without_timestamp_skipped() {
        let undated = SaleRow {
            total: Money::from_cents(999),
            ..SaleRow::default()
        };
        let report = hourly_breakdown(&[undated], &[], &Utc, &settings());
        assert_eq!(report.transaction_count, 0);
    }

    #[test]
    fn test_csv_rows() {
        let report = hourly_breakdown(&[sale_at(9, 0, 1234)], &[], &Utc, &settings());
        let meta = ReportMeta::new("2024-05-01", Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap());
        let csv = report.to_csv(&meta).to_csv_string().unwrap();

        assert!(csv.starts_with("Hourly Sales Report\n"));
        assert!(csv.contains("09:00,12.34,0.00,12.34,1,12.34,Yes\n"));
        assert!(csv.contains("00:00,0.00,0.00,0.00,0,0.00,No\n"));
        assert!(csv.contains("Net Sales,12.34\n"));
    }
}

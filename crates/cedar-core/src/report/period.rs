//! Period summary: totals plus category, employee and payment-method tables.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use super::csv::{CsvDocument, CsvSection};
use super::{average, format_percentage, GroupAccumulator, GroupTotal, ReportMeta};
use crate::money::Money;
use crate::types::{PaymentMethod, PaymentRow, RefundRow, SaleLineItem, SaleRow};

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const UNKNOWN_EMPLOYEE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PeriodReport {
    pub total_sales: Money,
    pub total_refunds: Money,
    pub net_sales: Money,
    pub transaction_count: i64,
    pub refund_count: i64,
    pub average_transaction: Money,
    pub total_tax: Money,
    pub total_discounts: Money,
    pub total_tips: Money,
    /// Units sold and line totals per category.
    pub by_category: Vec<GroupTotal>,
    /// Sales per employee.
    pub by_employee: Vec<GroupTotal>,
    /// Collected amounts per payment method.
    pub by_payment_method: Vec<GroupTotal>,
}

/// Aggregates one period's rows.
///
/// `items` are the sale items of `sales`. When `payments` is empty the
/// method recorded on each sale row is used instead.
pub fn period_summary(
    sales: &[SaleRow],
    items: &[SaleLineItem],
    refunds: &[RefundRow],
    payments: &[PaymentRow],
) -> PeriodReport {
    let total_sales: Money = sales.iter().map(|s| s.total).sum();
    let total_refunds: Money = refunds.iter().map(|r| r.total_refund_amount).sum();
    let transaction_count = sales.len() as i64;

    let mut categories = GroupAccumulator::default();
    for item in items {
        let category = item
            .category_name
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED);
        categories.add(category, item.total_price, item.quantity);
    }

    let mut employees = GroupAccumulator::default();
    for sale in sales {
        let employee = sale
            .employee_name
            .as_deref()
            .or(sale.employee_id.as_deref())
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(UNKNOWN_EMPLOYEE);
        employees.add(employee, sale.total, 1);
    }

    let mut methods = GroupAccumulator::default();
    if payments.is_empty() {
        for sale in sales {
            let method = sale
                .payment_method
                .as_deref()
                .map(PaymentMethod::from_label)
                .unwrap_or(PaymentMethod::Other);
            methods.add(method.display_name(), sale.total, 1);
        }
    } else {
        for payment in payments {
            methods.add(payment.method().display_name(), payment.amount, 1);
        }
    }

    debug!(
        sales = sales.len(),
        items = items.len(),
        refunds = refunds.len(),
        total = %total_sales,
        "Computed period summary"
    );

    PeriodReport {
        total_sales,
        total_refunds,
        net_sales: total_sales - total_refunds,
        transaction_count,
        refund_count: refunds.len() as i64,
        average_transaction: average(total_sales, transaction_count),
        total_tax: sales.iter().map(|s| s.tax).sum(),
        total_discounts: sales.iter().map(|s| s.discount_amount).sum(),
        total_tips: sales.iter().map(|s| s.tip_amount).sum(),
        by_category: categories.finish(),
        by_employee: employees.finish(),
        by_payment_method: methods.finish(),
    }
}

impl PeriodReport {
    pub fn to_csv(&self, meta: &ReportMeta) -> CsvDocument {
        let mut doc = CsvDocument::new("Sales Summary Report", meta);

        let mut summary = CsvSection::new(["Metric", "Value"]);
        for (label, amount) in [
            ("Total Sales", self.total_sales),
            ("Total Refunds", self.total_refunds),
            ("Net Sales", self.net_sales),
            ("Average Transaction", self.average_transaction),
            ("Total Tax", self.total_tax),
            ("Total Discounts", self.total_discounts),
            ("Total Tips", self.total_tips),
        ] {
            summary.push_row([label.to_string(), amount.format_plain()]);
        }
        summary.push_row(["Transactions".to_string(), self.transaction_count.to_string()]);
        summary.push_row(["Refunds".to_string(), self.refund_count.to_string()]);
        doc.push_section(summary);

        doc.push_section(group_section(
            ["Category", "Sales", "Units", "Percentage"],
            &self.by_category,
        ));
        doc.push_section(group_section(
            ["Employee", "Sales", "Transactions", "Percentage"],
            &self.by_employee,
        ));
        doc.push_section(group_section(
            ["Payment Method", "Amount", "Transactions", "Percentage"],
            &self.by_payment_method,
        ));
        doc
    }
}

fn group_section(header: [&str; 4], groups: &[GroupTotal]) -> CsvSection {
    let mut section = CsvSection::new(header);
    for group in groups {
        section.push_row([
            group.key.clone(),
            group.total.format_plain(),
            group.count.to_string(),
            format_percentage(group.percentage),
        ]);
    }
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sale(id: &str, employee: Option<&str>, cents: i64, method: &str) -> SaleRow {
        SaleRow {
            id: id.to_string(),
            total: Money::from_cents(cents),
            subtotal: Money::from_cents(cents),
            employee_name: employee.map(str::to_string),
            payment_method: Some(method.to_string()),
            ..SaleRow::default()
        }
    }

    fn item(category: Option<&str>, quantity: i64, cents: i64) -> SaleLineItem {
        SaleLineItem {
            category_name: category.map(str::to_string),
            quantity,
            total_price: Money::from_cents(cents),
            ..SaleLineItem::default()
        }
    }

    #[test]
    fn test_groups_and_totals() {
        let sales = vec![
            sale("1", Some("Riley"), 3000, "cash"),
            sale("2", Some("Sam"), 1000, "card"),
            sale("3", None, 2000, "card"),
        ];
        let items = vec![
            item(Some("Coffee"), 3, 3000),
            item(Some("Bakery"), 1, 1000),
            item(None, 2, 2000),
        ];
        let refunds = vec![RefundRow {
            total_refund_amount: Money::from_cents(500),
            ..RefundRow::default()
        }];

        let report = period_summary(&sales, &items, &refunds, &[]);

        assert_eq!(report.total_sales, Money::from_cents(6000));
        assert_eq!(report.net_sales, Money::from_cents(5500));
        assert_eq!(report.average_transaction, Money::from_cents(2000));
        assert_eq!(report.by_category[0].key, "Coffee");
        assert_eq!(report.by_category[0].count, 3);
        assert_eq!(report.by_category[1].key, UNCATEGORIZED);
        assert_eq!(report.by_employee[1].key, UNKNOWN_EMPLOYEE);
        assert_eq!(report.by_payment_method[0].key, "Card");
        assert_eq!(report.by_payment_method[0].count, 2);
        assert_eq!(report.by_payment_method[0].percentage, 50.0);
    }

    #[test]
    fn test_payment_rows_take_precedence() {
        let sales = vec![sale("1", Some("Riley"), 3000, "cash")];
        let payments = vec![
            PaymentRow {
                payment_method: "cash".to_string(),
                amount: Money::from_cents(1000),
                ..PaymentRow::default()
            },
            PaymentRow {
                payment_method: "gift_card".to_string(),
                amount: Money::from_cents(2000),
                ..PaymentRow::default()
            },
        ];
        let report = period_summary(&sales, &[], &[], &payments);
        let keys: Vec<&str> = report.by_payment_method.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Gift Card", "Cash"]);
    }

    #[test]
    fn test_empty_period() {
        let report = period_summary(&[], &[], &[], &[]);
        assert!(report.average_transaction.is_zero());
        assert!(report.by_category.is_empty());
    }

    #[test]
    fn test_huge_totals_saturate() {
        let huge: Money = "50000000000000000000000000000".parse().unwrap();
        let sales: Vec<SaleRow> = ["1", "2"]
            .into_iter()
            .map(|id| SaleRow {
                id: id.to_string(),
                total: huge,
                ..SaleRow::default()
            })
            .collect();

        let report = period_summary(&sales, &[], &[], &[]);
        assert_eq!(report.total_sales, Money::new(rust_decimal::Decimal::MAX));
        assert_eq!(report.net_sales, report.total_sales);
        assert_eq!(report.by_employee[0].percentage, 100.0);
    }

    #[test]
    fn test_csv_sections() {
        let sales = vec![sale("1", Some("Riley"), 3000, "cash")];
        let items = vec![item(Some("Coffee, hot"), 1, 3000)];
        let report = period_summary(&sales, &items, &[], &[]);
        let meta = ReportMeta::new("May 2024", Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let csv = report.to_csv(&meta).to_csv_string().unwrap();

        assert!(csv.contains("Total Sales,30.00\n"));
        assert!(csv.contains("\n\nCategory,Sales,Units,Percentage\n\"Coffee, hot\",30.00,1,100.00%\n"));
        assert!(csv.contains("Riley,30.00,1,100.00%\n"));
        assert!(csv.contains("Cash,30.00,1,100.00%\n"));
    }
}

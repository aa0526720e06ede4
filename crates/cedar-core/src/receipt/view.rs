//! Normalized input for every receipt kind.
//!
//! A [`ReceiptView`] is built once, from either a sale or a refund, and the
//! renderers never look at backend rows directly. The tax breakdown is
//! resolved here: renderers see one canonical map.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::refund::{merge_into, RefundBreakdown, RefundRecord, RefundType};
use crate::types::{Modifier, PaymentMethod, PaymentRow, SaleLineItem, SaleRow};

// =============================================================================
// Tax Breakdown Source
// =============================================================================

/// Where a receipt's named tax (or rebate) amounts come from.
///
/// ```text
/// item rows carry tax_breakdown?  ── yes ──► Explicit(Σ item maps)
///           │ no
///           ▼
/// sale-level aggregate map       ──────────► Aggregated(map, possibly empty)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "source", content = "amounts", rename_all = "snake_case")]
pub enum TaxBreakdownSource {
    Explicit(BTreeMap<String, Money>),
    Aggregated(BTreeMap<String, Money>),
}

impl TaxBreakdownSource {
    /// Picks the explicit map when it has entries, the aggregated one otherwise.
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use cedar_core::money::Money;
    /// use cedar_core::receipt::TaxBreakdownSource;
    ///
    /// let explicit = BTreeMap::from([("GST".to_string(), Money::from_cents(50))]);
    /// let aggregated = BTreeMap::from([("Tax".to_string(), Money::from_cents(130))]);
    ///
    /// let source = TaxBreakdownSource::resolve(Some(explicit), Some(aggregated));
    /// assert!(source.is_explicit());
    /// ```
    pub fn resolve(
        explicit: Option<BTreeMap<String, Money>>,
        aggregated: Option<BTreeMap<String, Money>>,
    ) -> Self {
        match explicit.filter(|m| !m.is_empty()) {
            Some(map) => TaxBreakdownSource::Explicit(map),
            None => TaxBreakdownSource::Aggregated(aggregated.unwrap_or_default()),
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, TaxBreakdownSource::Explicit(_))
    }

    pub fn into_map(self) -> BTreeMap<String, Money> {
        match self {
            TaxBreakdownSource::Explicit(map) | TaxBreakdownSource::Aggregated(map) => map,
        }
    }
}

/// Sale-level named totals stored alongside a sale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct SaleAggregates {
    pub taxes: BTreeMap<String, Money>,
    pub rebates: BTreeMap<String, Money>,
}

// =============================================================================
// View Parts
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
    pub modifiers: Vec<Modifier>,
    pub sku: Option<String>,
    pub notes: Option<String>,
}

impl From<&SaleLineItem> for ReceiptLine {
    fn from(item: &SaleLineItem) -> Self {
        ReceiptLine {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.total_price,
            modifiers: item.modifiers.clone(),
            sku: item.sku.clone(),
            notes: item.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptPayment {
    pub method: PaymentMethod,
    /// Printed label; the backend's own wording for unknown methods.
    pub label: String,
    #[serde(default)]
    pub amount: Money,
    #[serde(default)]
    pub tendered: Option<Money>,
}

impl ReceiptPayment {
    pub fn new(method: PaymentMethod, amount: Money) -> Self {
        ReceiptPayment {
            method,
            label: method.display_name().to_string(),
            amount,
            tendered: None,
        }
    }
}

impl From<&PaymentRow> for ReceiptPayment {
    fn from(row: &PaymentRow) -> Self {
        let method = row.method();
        let raw = row.payment_method.trim();
        let label = if method == PaymentMethod::Other && !raw.is_empty() {
            raw.to_string()
        } else {
            method.display_name().to_string()
        };
        ReceiptPayment {
            method,
            label,
            amount: row.amount,
            tendered: row.tendered,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CustomerInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Loyalty earned on this sale, as computed by the loyalty service.
    pub loyalty_earned: Option<Money>,
    pub loyalty_balance: Option<Money>,
}

impl CustomerInfo {
    pub fn has_loyalty(&self) -> bool {
        self.loyalty_earned.is_some() || self.loyalty_balance.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct RefundMeta {
    pub original_sale_number: Option<String>,
    pub reason: Option<String>,
    pub method: Option<PaymentMethod>,
    /// `None` for manual refunds.
    pub refund_type: Option<RefundType>,
}

// =============================================================================
// Receipt View
// =============================================================================

/// Everything a receipt can show. Absent amounts are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ReceiptView {
    pub sale_number: Option<String>,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    pub cashier_name: Option<String>,
    pub items: Vec<ReceiptLine>,
    pub subtotal: Money,
    pub discount_amount: Money,
    pub loyalty_redemption: Money,
    pub tax_amount: Money,
    /// Canonical named taxes.
    pub tax_breakdown: BTreeMap<String, Money>,
    pub rebate_breakdown: BTreeMap<String, Money>,
    pub tip_amount: Money,
    pub final_total: Money,
    pub payments: Vec<ReceiptPayment>,
    pub change_given: Money,
    pub customer: Option<CustomerInfo>,
    pub refund: Option<RefundMeta>,
    pub notes: Option<String>,
}

impl ReceiptView {
    /// Builds the view for a completed sale.
    ///
    /// Named taxes come from the item rows when any item recorded them,
    /// otherwise from the sale-level `aggregates`.
    pub fn from_sale(
        sale: &SaleRow,
        items: &[SaleLineItem],
        payments: &[PaymentRow],
        aggregates: Option<&SaleAggregates>,
    ) -> Self {
        let taxes = TaxBreakdownSource::resolve(
            sum_item_maps(items.iter().filter_map(|i| i.tax_breakdown.as_ref())),
            aggregates.map(|a| a.taxes.clone()),
        );
        let rebates = TaxBreakdownSource::resolve(
            sum_item_maps(items.iter().filter_map(|i| i.rebate_breakdown.as_ref())),
            aggregates.map(|a| a.rebates.clone()),
        );

        let mut receipt_payments: Vec<ReceiptPayment> =
            payments.iter().map(ReceiptPayment::from).collect();
        if receipt_payments.is_empty() {
            // Older sales only carry a single method on the sale row.
            if let Some(label) = sale.payment_method.as_deref().filter(|l| !l.trim().is_empty()) {
                receipt_payments.push(ReceiptPayment::new(
                    PaymentMethod::from_label(label),
                    sale.total,
                ));
            }
        }

        let has_customer = sale.customer_name.is_some()
            || sale.customer_email.is_some()
            || sale.customer_phone.is_some();
        let customer = has_customer.then(|| CustomerInfo {
            name: sale.customer_name.clone(),
            email: sale.customer_email.clone(),
            phone: sale.customer_phone.clone(),
            ..CustomerInfo::default()
        });

        ReceiptView {
            sale_number: sale.sale_number.clone(),
            created_at: sale.created_at,
            cashier_name: sale.employee_name.clone(),
            items: items.iter().map(ReceiptLine::from).collect(),
            subtotal: sale.subtotal,
            discount_amount: sale.discount_amount,
            loyalty_redemption: sale.loyalty_redemption,
            tax_amount: sale.tax,
            tax_breakdown: taxes.into_map(),
            rebate_breakdown: rebates.into_map(),
            tip_amount: sale.tip_amount,
            final_total: sale.total,
            payments: receipt_payments,
            change_given: sale.change_given,
            customer,
            refund: None,
            notes: sale.notes.clone(),
        }
    }

    /// Builds the view for a refund. `breakdown` is `None` for manual refunds.
    pub fn from_refund(
        record: &RefundRecord,
        breakdown: Option<&RefundBreakdown>,
        original_sale_number: Option<String>,
    ) -> Self {
        let items = breakdown
            .map(|b| {
                b.lines
                    .iter()
                    .map(|line| ReceiptLine {
                        name: line.name.clone(),
                        quantity: line.refund_quantity,
                        unit_price: line.unit_price,
                        line_total: line.subtotal,
                        ..ReceiptLine::default()
                    })
                    .collect()
            })
            .unwrap_or_default();

        let (subtotal, tax_amount) = match breakdown {
            Some(b) => (b.subtotal, b.tax),
            None => (record.total_refund_amount, Money::zero()),
        };

        ReceiptView {
            sale_number: original_sale_number.clone(),
            created_at: Some(record.created_at),
            cashier_name: Some(record.refunded_by.clone()),
            items,
            subtotal,
            tax_amount,
            tax_breakdown: TaxBreakdownSource::Aggregated(
                breakdown.map(|b| b.aggregated_taxes.clone()).unwrap_or_default(),
            )
            .into_map(),
            rebate_breakdown: breakdown
                .map(|b| b.aggregated_rebates.clone())
                .unwrap_or_default(),
            final_total: record.total_refund_amount,
            payments: vec![ReceiptPayment::new(
                record.refund_method,
                record.total_refund_amount,
            )],
            refund: Some(RefundMeta {
                original_sale_number,
                reason: Some(record.reason.clone()),
                method: Some(record.refund_method),
                refund_type: breakdown.map(|b| b.refund_type),
            }),
            ..ReceiptView::default()
        }
    }

    pub fn with_customer(mut self, customer: CustomerInfo) -> Self {
        self.customer = Some(customer);
        self
    }

    pub fn with_cashier(mut self, name: impl Into<String>) -> Self {
        self.cashier_name = Some(name.into());
        self
    }

    pub fn is_refund(&self) -> bool {
        self.refund.is_some()
    }

    /// Named taxes to print; a single "Tax" line when none were recorded.
    pub fn tax_lines(&self) -> Vec<(String, Money)> {
        if self.tax_breakdown.is_empty() {
            return vec![("Tax".to_string(), self.tax_amount)];
        }
        self.tax_breakdown
            .iter()
            .map(|(name, amount)| (name.clone(), *amount))
            .collect()
    }

    /// Taxes minus rebates.
    pub fn net_tax(&self) -> Money {
        let gross: Money = self.tax_lines().into_iter().map(|(_, amount)| amount).sum();
        let rebates: Money = self.rebate_breakdown.values().sum();
        gross - rebates
    }

    pub fn has_cash_payment(&self) -> bool {
        self.payments.iter().any(|p| p.method.is_cash())
    }
}

fn sum_item_maps<'a>(
    maps: impl Iterator<Item = &'a BTreeMap<String, Money>>,
) -> Option<BTreeMap<String, Money>> {
    let mut total = BTreeMap::new();
    for map in maps {
        merge_into(&mut total, map);
    }
    (!total.is_empty()).then_some(total)
}

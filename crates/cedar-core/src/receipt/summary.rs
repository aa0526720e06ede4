//! The financial part of a receipt: totals, payments and loyalty.
//!
//! Shared by the standard, reprint and email renderers. Gift and kitchen
//! tickets never call into this module.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::html::{line, note, open_section, strong_line};
use super::view::{CustomerInfo, ReceiptView};
use super::ReceiptOptions;
use crate::cash::{cash_rounding_adjustment, has_visible_adjustment, round_to_cash_nickel};
use crate::config::{BusinessDisplaySettings, LoyaltyMode};
use crate::money::Money;

const POINTS_PER_DOLLAR: i64 = 1000;

/// Totals, payments and (when a customer is attached) the loyalty block.
pub(crate) fn financial_summary(
    view: &ReceiptView,
    settings: &BusinessDisplaySettings,
    options: &ReceiptOptions,
) -> String {
    let mut body = String::new();
    totals_section(&mut body, view, settings, options);
    payments_section(&mut body, view, settings);
    if let Some(customer) = view.customer.as_ref().filter(|c| c.has_loyalty()) {
        loyalty_section(&mut body, customer, settings);
    }
    body
}

fn totals_section(
    body: &mut String,
    view: &ReceiptView,
    settings: &BusinessDisplaySettings,
    options: &ReceiptOptions,
) {
    let fmt = |amount: Money| settings.format_money(amount);

    open_section(body, None);
    body.push_str(&line("Subtotal", &fmt(view.subtotal)));

    if !view.discount_amount.round_to_cents().is_zero() {
        body.push_str(&line("Discount", &fmt(-view.discount_amount.abs())));
    }
    if !view.loyalty_redemption.round_to_cents().is_zero() {
        let label = format!("{} Redemption", settings.loyalty_program_name);
        body.push_str(&line(&label, &fmt(-view.loyalty_redemption.abs())));
    }

    for (name, amount) in view.tax_lines() {
        body.push_str(&line(&name, &fmt(amount)));
    }
    for (name, amount) in &view.rebate_breakdown {
        body.push_str(&line(name, &fmt(-amount.abs())));
    }
    if !view.rebate_breakdown.is_empty() {
        body.push_str(&line("Net Tax", &fmt(view.net_tax())));
    }

    if !view.tip_amount.round_to_cents().is_zero() {
        body.push_str(&line("Tip", &fmt(view.tip_amount)));
    }

    let total = if options.round_total_for_cash {
        round_to_cash_nickel(view.final_total)
    } else {
        view.final_total
    };
    let total_label = if view.is_refund() { "Refund Total" } else { "Total" };
    body.push_str(&strong_line(total_label, &fmt(total)));
    body.push_str("</div>");
}

fn payments_section(body: &mut String, view: &ReceiptView, settings: &BusinessDisplaySettings) {
    let fmt = |amount: Money| settings.format_money(amount);
    let heading = if view.is_refund() { "Refunded To" } else { "Payment" };

    open_section(body, Some(heading));
    if view.payments.is_empty() {
        body.push_str(&note("No payment recorded"));
    }

    for payment in &view.payments {
        body.push_str(&line(&payment.label, &fmt(payment.amount)));
        if !payment.method.is_cash() {
            continue;
        }
        if let Some(tendered) = payment.tendered {
            body.push_str(&line("Tendered", &fmt(round_to_cash_nickel(tendered))));
        }
        if has_visible_adjustment(payment.amount) {
            body.push_str(&line(
                "Cash Rounding",
                &fmt(cash_rounding_adjustment(payment.amount)),
            ));
        }
    }

    if !view.change_given.round_to_cents().is_zero() {
        let change = if view.has_cash_payment() {
            round_to_cash_nickel(view.change_given)
        } else {
            view.change_given
        };
        body.push_str(&line("Change", &fmt(change)));
    }
    body.push_str("</div>");
}

fn loyalty_section(body: &mut String, customer: &CustomerInfo, settings: &BusinessDisplaySettings) {
    open_section(body, Some(settings.loyalty_program_name.as_str()));
    if let Some(earned) = customer.loyalty_earned {
        body.push_str(&line("Earned", &format_loyalty(earned, settings)));
    }
    if let Some(balance) = customer.loyalty_balance {
        body.push_str(&line("Balance", &format_loyalty(balance, settings)));
    }
    body.push_str("</div>");
}

/// Points mode shows whole points (amount × 1000); credit mode shows money.
pub(crate) fn format_loyalty(amount: Money, settings: &BusinessDisplaySettings) -> String {
    match settings.loyalty_mode {
        LoyaltyMode::Points => format!("{} pts", loyalty_points(amount)),
        LoyaltyMode::Credit => settings.format_money(amount),
    }
}

pub(crate) fn loyalty_points(amount: Money) -> i64 {
    (amount.amount() * Decimal::from(POINTS_PER_DOLLAR))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::view::ReceiptPayment;
    use crate::types::PaymentMethod;

    #[test]
    fn test_loyalty_points_scaling() {
        assert_eq!(loyalty_points("0.0125".parse().unwrap()), 13);
        assert_eq!(loyalty_points(Money::from_cents(150)), 1500);
        assert_eq!(loyalty_points(Money::zero()), 0);
    }

    #[test]
    fn test_cash_total_rounding_option() {
        let view = ReceiptView {
            subtotal: Money::from_cents(1500),
            final_total: Money::from_cents(1697),
            payments: vec![ReceiptPayment::new(PaymentMethod::Cash, Money::from_cents(1697))],
            ..ReceiptView::default()
        };
        let settings = BusinessDisplaySettings::default();

        let plain = financial_summary(&view, &settings, &ReceiptOptions::default());
        assert!(plain.contains("<strong>$16.97</strong>"));
        assert!(plain.contains("Cash Rounding"));
        assert!(plain.contains("-$0.02"));

        let rounded = financial_summary(
            &view,
            &settings,
            &ReceiptOptions {
                round_total_for_cash: true,
            },
        );
        assert!(rounded.contains("<strong>$16.95</strong>"));
    }

    #[test]
    fn test_card_payment_has_no_rounding_line() {
        let view = ReceiptView {
            final_total: Money::from_cents(1697),
            payments: vec![ReceiptPayment::new(PaymentMethod::Card, Money::from_cents(1697))],
            ..ReceiptView::default()
        };
        let html = financial_summary(&view, &BusinessDisplaySettings::default(), &ReceiptOptions::default());
        assert!(!html.contains("Cash Rounding"));
    }
}

//! One render function per [`ReceiptKind`](super::ReceiptKind).

use super::html::{email_shell, esc, html_shell, line, note, open_section};
use super::summary::financial_summary;
use super::view::{ReceiptLine, ReceiptView};
use super::ReceiptOptions;
use crate::config::BusinessDisplaySettings;

// =============================================================================
// Shared Blocks
// =============================================================================

fn business_header(body: &mut String, settings: &BusinessDisplaySettings) {
    body.push_str(&format!(
        "<div class=\"center business\">{}</div>",
        esc(&settings.business_name)
    ));
    if let Some(header) = non_empty(settings.receipt_header.as_deref()) {
        body.push_str(&format!("<div class=\"center\">{}</div>", esc(header)));
    }
    for address in settings.address_lines.iter().filter(|l| !l.trim().is_empty()) {
        body.push_str(&format!("<div class=\"center note\">{}</div>", esc(address)));
    }
    for contact in [&settings.phone, &settings.email, &settings.website] {
        if let Some(value) = non_empty(contact.as_deref()) {
            body.push_str(&format!("<div class=\"center note\">{}</div>", esc(value)));
        }
    }
    if let Some(number) = non_empty(settings.tax_number.as_deref()) {
        body.push_str(&format!(
            "<div class=\"center note\">{} {}</div>",
            esc(&settings.tax_number_label),
            esc(number)
        ));
    }
}

fn footer(body: &mut String, settings: &BusinessDisplaySettings) {
    if let Some(text) = non_empty(settings.receipt_footer.as_deref()) {
        body.push_str(&format!("<div class=\"section center note\">{}</div>", esc(text)));
    }
}

fn title(body: &mut String, text: &str) {
    body.push_str(&format!("<div class=\"title\">{}</div>", esc(text)));
}

/// Sale number, date, cashier and customer.
fn meta_section(body: &mut String, view: &ReceiptView, settings: &BusinessDisplaySettings) {
    open_section(body, None);
    if let Some(number) = non_empty(view.sale_number.as_deref()) {
        let label = if view.is_refund() { "Original Sale" } else { "Sale" };
        body.push_str(&line(label, &format!("#{}", number)));
    }
    if let Some(created_at) = view.created_at {
        let local = created_at.with_timezone(&settings.offset());
        body.push_str(&line("Date", &local.format("%Y-%m-%d %H:%M").to_string()));
    }
    if let Some(cashier) = non_empty(view.cashier_name.as_deref()) {
        body.push_str(&line("Cashier", cashier));
    }
    if let Some(name) = view
        .customer
        .as_ref()
        .and_then(|c| non_empty(c.name.as_deref()))
    {
        body.push_str(&line("Customer", name));
    }
    body.push_str("</div>");
}

fn refund_details(body: &mut String, view: &ReceiptView) {
    let Some(meta) = view.refund.as_ref() else {
        return;
    };
    open_section(body, Some("Refund Details"));
    if let Some(refund_type) = meta.refund_type {
        body.push_str(&line("Type", refund_type.label()));
    } else {
        body.push_str(&line("Type", "Manual Refund"));
    }
    if let Some(method) = meta.method {
        body.push_str(&line("Method", method.display_name()));
    }
    if let Some(reason) = non_empty(meta.reason.as_deref()) {
        body.push_str(&line("Reason", reason));
    }
    body.push_str("</div>");
}

fn modifier_names(body: &mut String, item: &ReceiptLine) {
    for modifier in item.modifiers.iter().filter(|m| !m.name.trim().is_empty()) {
        body.push_str(&note(&format!("+ {}", modifier.name.trim())));
    }
}

fn priced_items(body: &mut String, view: &ReceiptView, settings: &BusinessDisplaySettings) {
    let heading = if view.is_refund() { "Refunded Items" } else { "Items" };
    open_section(body, Some(heading));
    if view.items.is_empty() {
        body.push_str(&note("No items"));
    }
    for item in &view.items {
        body.push_str(&line(
            &format!("{}x {}", item.quantity, item.name),
            &settings.format_money(item.line_total),
        ));
        for modifier in item.modifiers.iter().filter(|m| !m.name.trim().is_empty()) {
            let text = if modifier.price.round_to_cents().is_zero() {
                format!("+ {}", modifier.name.trim())
            } else {
                format!(
                    "+ {} ({})",
                    modifier.name.trim(),
                    settings.format_money(modifier.price)
                )
            };
            body.push_str(&note(&text));
        }
        if let Some(sku) = non_empty(item.sku.as_deref()) {
            body.push_str(&note(&format!("SKU {}", sku)));
        }
    }
    body.push_str("</div>");
}

/// Everything below the business header on a full receipt.
fn standard_body(
    view: &ReceiptView,
    settings: &BusinessDisplaySettings,
    options: &ReceiptOptions,
) -> String {
    let mut body = String::new();
    business_header(&mut body, settings);
    if view.is_refund() {
        title(&mut body, "REFUND");
    }
    meta_section(&mut body, view, settings);
    refund_details(&mut body, view);
    priced_items(&mut body, view, settings);
    body.push_str(&financial_summary(view, settings, options));
    if let Some(notes) = non_empty(view.notes.as_deref()) {
        open_section(&mut body, Some("Notes"));
        body.push_str(&note(notes));
        body.push_str("</div>");
    }
    footer(&mut body, settings);
    body
}

fn document_title(view: &ReceiptView, prefix: &str) -> String {
    match non_empty(view.sale_number.as_deref()) {
        Some(number) => format!("{} #{}", prefix, number),
        None => prefix.to_string(),
    }
}

// =============================================================================
// Renderers
// =============================================================================

pub(crate) fn render_standard(
    view: &ReceiptView,
    settings: &BusinessDisplaySettings,
    options: &ReceiptOptions,
) -> String {
    let prefix = if view.is_refund() { "Refund" } else { "Receipt" };
    html_shell(
        &document_title(view, prefix),
        &standard_body(view, settings, options),
    )
}

pub(crate) fn render_reprint(
    view: &ReceiptView,
    settings: &BusinessDisplaySettings,
    options: &ReceiptOptions,
    reason: Option<&str>,
) -> String {
    let mut body = String::from("<div class=\"banner\">REPRINT");
    if let Some(reason) = non_empty(reason) {
        body.push_str(&format!("<div class=\"note\">{}</div>", esc(reason)));
    }
    body.push_str("</div>");
    body.push_str(&standard_body(view, settings, options));
    html_shell(&document_title(view, "Reprint"), &body)
}

pub(crate) fn render_email(
    view: &ReceiptView,
    settings: &BusinessDisplaySettings,
    options: &ReceiptOptions,
) -> String {
    let banner = if view.is_refund() {
        format!("Your refund from {}", settings.business_name)
    } else {
        format!("Your receipt from {}", settings.business_name)
    };
    email_shell(
        &document_title(view, "Receipt"),
        &banner,
        &standard_body(view, settings, options),
    )
}

/// Names, quantities and modifier names only. No prices anywhere.
pub(crate) fn render_gift(view: &ReceiptView, settings: &BusinessDisplaySettings) -> String {
    let mut body = String::new();
    business_header(&mut body, settings);
    title(&mut body, "GIFT RECEIPT");

    open_section(&mut body, None);
    if let Some(number) = non_empty(view.sale_number.as_deref()) {
        body.push_str(&line("Sale", &format!("#{}", number)));
    }
    if let Some(created_at) = view.created_at {
        let local = created_at.with_timezone(&settings.offset());
        body.push_str(&line("Date", &local.format("%Y-%m-%d").to_string()));
    }
    body.push_str("</div>");

    open_section(&mut body, Some("Items"));
    for item in &view.items {
        body.push_str(&format!(
            "<div class=\"line\"><span>{}x {}</span></div>",
            item.quantity,
            esc(&item.name)
        ));
        modifier_names(&mut body, item);
        if let Some(sku) = non_empty(item.sku.as_deref()) {
            body.push_str(&note(&format!("SKU {}", sku)));
        }
    }
    body.push_str("</div>");

    footer(&mut body, settings);
    html_shell(&document_title(view, "Gift Receipt"), &body)
}

/// Preparation ticket: items, modifiers and notes for kitchen staff.
pub(crate) fn render_kitchen(view: &ReceiptView, settings: &BusinessDisplaySettings) -> String {
    let mut body = String::new();
    title(&mut body, "KITCHEN TICKET");

    open_section(&mut body, None);
    if let Some(number) = non_empty(view.sale_number.as_deref()) {
        body.push_str(&line("Order", &format!("#{}", number)));
    }
    if let Some(created_at) = view.created_at {
        let local = created_at.with_timezone(&settings.offset());
        body.push_str(&line("Time", &local.format("%H:%M").to_string()));
    }
    if let Some(name) = view
        .customer
        .as_ref()
        .and_then(|c| non_empty(c.name.as_deref()))
    {
        body.push_str(&line("Customer", name));
    }
    body.push_str("</div>");

    open_section(&mut body, Some("Items"));
    if view.items.is_empty() {
        body.push_str(&note("No items"));
    }
    for item in &view.items {
        body.push_str(&format!(
            "<div><strong>{}x {}</strong></div>",
            item.quantity,
            esc(&item.name)
        ));
        modifier_names(&mut body, item);
        if let Some(notes) = non_empty(item.notes.as_deref()) {
            body.push_str(&note(&format!("Note: {}", notes)));
        }
    }
    body.push_str("</div>");

    if let Some(notes) = non_empty(view.notes.as_deref()) {
        open_section(&mut body, Some("Order Notes"));
        body.push_str(&note(notes));
        body.push_str("</div>");
    }

    html_shell(&document_title(view, "Kitchen Ticket"), &body)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

//! # Receipt Documents
//!
//! Builds printable, standalone HTML receipts from a [`ReceiptView`].
//!
//! ## Receipt Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    generate_receipt_html(view, kind, ...)               │
//! │                                                                         │
//! │  Standard ──► header · items · financial summary · footer              │
//! │  Reprint  ──► "REPRINT" banner (+ reason) · Standard body              │
//! │  Email    ──► email shell (banner, 600px container) · Standard body    │
//! │  Gift     ──► header · names / quantities / modifiers   (no money)     │
//! │  Kitchen  ──► order · items / modifiers / notes         (no money)     │
//! │                                                                         │
//! │  financial summary = subtotal, discount, loyalty redemption, tax lines, │
//! │  rebates (negative), net tax, tip, total, payments, cash rounding,     │
//! │  loyalty earned / balance                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The builder only returns a string. Opening a print window or sending the
//! email is the caller's job.
//!
//! ## Example
//! ```rust
//! use cedar_core::config::BusinessDisplaySettings;
//! use cedar_core::money::Money;
//! use cedar_core::receipt::{generate_receipt_html, ReceiptKind, ReceiptOptions, ReceiptView};
//!
//! let view = ReceiptView {
//!     subtotal: Money::from_cents(1000),
//!     tax_amount: Money::from_cents(130),
//!     final_total: Money::from_cents(1130),
//!     ..ReceiptView::default()
//! };
//! let html = generate_receipt_html(
//!     &view,
//!     &ReceiptKind::Standard,
//!     &BusinessDisplaySettings::default(),
//!     &ReceiptOptions::default(),
//! );
//! assert!(html.starts_with("<!DOCTYPE html>"));
//! assert!(html.contains("$11.30"));
//! ```

mod html;
mod render;
mod summary;
mod view;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::config::BusinessDisplaySettings;

pub use view::{
    CustomerInfo, ReceiptLine, ReceiptPayment, ReceiptView, RefundMeta, SaleAggregates,
    TaxBreakdownSource,
};

/// Which document to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReceiptKind {
    Standard,
    Gift,
    Kitchen,
    Reprint { reason: Option<String> },
    Email,
}

/// Rendering switches that are not part of the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ReceiptOptions {
    /// Print the Total line rounded to the nearest $0.05.
    pub round_total_for_cash: bool,
}

/// Renders `view` as a complete HTML document.
pub fn generate_receipt_html(
    view: &ReceiptView,
    kind: &ReceiptKind,
    settings: &BusinessDisplaySettings,
    options: &ReceiptOptions,
) -> String {
    debug!(
        kind = ?kind,
        items = view.items.len(),
        refund = view.is_refund(),
        "Rendering receipt"
    );

    match kind {
        ReceiptKind::Standard => render::render_standard(view, settings, options),
        ReceiptKind::Gift => render::render_gift(view, settings),
        ReceiptKind::Kitchen => render::render_kitchen(view, settings),
        ReceiptKind::Reprint { reason } => {
            render::render_reprint(view, settings, options, reason.as_deref())
        }
        ReceiptKind::Email => render::render_email(view, settings, options),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

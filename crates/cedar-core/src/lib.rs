//! # cedar-core: Refund, Tax, Receipt and Report Logic for Cedar POS
//!
//! This crate is the computational core behind the refund screen, the
//! receipt printer and the report screens. Everything here is a pure
//! function over rows the application shell has already fetched.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cedar POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Screens (React)                              │   │
//! │  │   Refund dialog ──► Receipt preview ──► Reports / CSV export    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ rows in, values out                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cedar-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐   │   │
//! │  │   │   tax    │  │  refund  │  │ receipt  │  │    report    │   │   │
//! │  │   │ allocate │─►│ breakdown│─►│   HTML   │  │ hourly/period│   │   │
//! │  │   │          │  │ records  │  │ 5 kinds  │  │ tax / drawer │   │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────┘   │   │
//! │  │        money · cash rounding · validation · config              │   │
//! │  │                                                                 │   │
//! │  │   NO BACKEND CALLS • NO CLOCK READS • NO PRINTING               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    Application shell                            │   │
//! │  │      persists refunds, restocks inventory, prints, emails       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Exact decimal money, rounded only for display
//! - [`types`] - Backend row shapes (sales, items, refunds, payments, drawers)
//! - [`tax`] - Proportional tax allocation
//! - [`refund`] - Refund breakdowns and the records a refund persists
//! - [`cash`] - Cash rounding to the nickel
//! - [`receipt`] - Receipt view model and HTML renderers
//! - [`report`] - Report aggregators and CSV export
//! - [`validation`] - Refund input checks
//! - [`config`] - Business display settings and policies
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: the same rows always produce the same output
//! 2. **Exact Money**: proportional math stays in decimals; cents appear at display time
//! 3. **Explicit Context**: business, actor and timestamps are passed in, never looked up
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use cedar_core::{allocate_item_tax, round_to_cash_nickel, Money, SaleLineItem, TransactionTaxContext};
//!
//! let items = vec![
//!     SaleLineItem { id: "latte".into(), total_price: Money::from_cents(1000), ..Default::default() },
//!     SaleLineItem { id: "scone".into(), total_price: Money::from_cents(1000), ..Default::default() },
//! ];
//! let ctx = TransactionTaxContext::new(Money::from_cents(2000), Money::from_cents(260));
//!
//! // Each item carries half of the $2.60 tax.
//! assert_eq!(allocate_item_tax(&items[0], &items, &ctx), Money::from_cents(130));
//!
//! // Cash totals round to the nearest nickel.
//! assert_eq!(round_to_cash_nickel(Money::from_cents(1002)), Money::from_cents(1000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cash;
pub mod config;
mod de;
pub mod error;
pub mod money;
pub mod receipt;
pub mod refund;
pub mod report;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use cedar_core::Money` instead of
// `use cedar_core::money::Money`

pub use cash::round_to_cash_nickel;
pub use config::{BusinessDisplaySettings, CoreConfig, LoyaltyMode, RefundPolicy, ReportSettings};
pub use error::{ConfigError, CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use receipt::{generate_receipt_html, ReceiptKind, ReceiptOptions, ReceiptView};
pub use refund::{
    compute_refund_breakdown, ClampPolicy, RefundBreakdown, RefundCalculator, RefundLineRequest,
    RefundSubmission,
};
pub use report::ReportMeta;
pub use tax::{allocate_item_tax, TaxAllocator};
pub use types::*;

//! # Refund Calculation
//!
//! Turns the operator's per-line refund quantities into a [`RefundBreakdown`],
//! and a confirmed breakdown into the records the backend persists.
//!
//! ## Refund Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Refund Flow                                     │
//! │                                                                         │
//! │  Operator edits quantities ──► RefundCalculator::compute  (repeatable) │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │                               RefundBreakdown                           │
//! │                     subtotal / tax / total / taxes / rebates            │
//! │                                      │                                  │
//! │          Operator confirms ──────────┤                                  │
//! │                                      ▼                                  │
//! │                      RefundSubmission::from_sale / manual               │
//! │                      (reason, total > 0, manager approval)             │
//! │                                      │                                  │
//! │                     RefundRecord + RefundItemRecord rows                │
//! │                                      │                                  │
//! │                        restock_adjustments() ──► inventory increments  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Per-Line Math
//! ```text
//! ratio     = refund_quantity / original_quantity
//! subtotal  = item.total_price × ratio
//! tax       = allocated item tax × ratio
//! amount    = subtotal + tax
//! ```
//! Nothing is rounded until display or persistence.
//!
//! ## Example
//! ```rust
//! use cedar_core::money::Money;
//! use cedar_core::refund::{compute_refund_breakdown, RefundLineRequest, RefundType};
//! use cedar_core::types::{SaleLineItem, TransactionTaxContext};
//!
//! let items = vec![
//!     SaleLineItem { id: "a".into(), quantity: 2, total_price: Money::from_cents(3000), ..Default::default() },
//!     SaleLineItem { id: "b".into(), quantity: 1, total_price: Money::from_cents(1000), ..Default::default() },
//! ];
//! let ctx = TransactionTaxContext::new(Money::from_cents(4000), Money::from_cents(520));
//!
//! let breakdown = compute_refund_breakdown(&[RefundLineRequest::new("a", 1)], &items, &ctx);
//! assert_eq!(breakdown.subtotal, Money::from_cents(1500));
//! assert_eq!(breakdown.tax, Money::from_cents(195));
//! assert_eq!(breakdown.total, Money::from_cents(1695));
//! assert_eq!(breakdown.refund_type, RefundType::Partial);
//! ```

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::config::RefundPolicy;
use crate::de::lenient_quantity;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::tax::TaxAllocator;
use crate::types::{ActorContext, PaymentMethod, SaleLineItem, TransactionTaxContext};
use crate::validation::{
    validate_manager_approval, validate_refund_reason, validate_refund_total, validate_uuid,
};

/// Bucket name used when a line has no named tax breakdown.
pub const DEFAULT_TAX_NAME: &str = "Tax";

// =============================================================================
// Clamp Policy
// =============================================================================

/// What happens to refund quantities outside `0..=original quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ClampPolicy {
    /// Correct the quantity into range and log a warning.
    #[default]
    Clamp,
    /// Fail with [`CoreError::RefundQuantityOutOfRange`].
    Reject,
}

// =============================================================================
// Requests and Breakdown
// =============================================================================

/// The operator's choice for one sale line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundLineRequest {
    pub sale_item_id: String,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub refund_quantity: i64,
    /// Put the units back into inventory.
    #[serde(default)]
    pub restock: bool,
}

impl RefundLineRequest {
    pub fn new(sale_item_id: impl Into<String>, refund_quantity: i64) -> Self {
        RefundLineRequest {
            sale_item_id: sale_item_id.into(),
            refund_quantity,
            restock: false,
        }
    }

    pub fn with_restock(mut self, restock: bool) -> Self {
        self.restock = restock;
        self
    }
}

/// Display label: everything sold is coming back, or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RefundType {
    Full,
    Partial,
}

impl RefundType {
    pub fn label(&self) -> &'static str {
        match self {
            RefundType::Full => "Full Refund",
            RefundType::Partial => "Partial Refund",
        }
    }
}

/// One refunded line. Only lines with a quantity above zero appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundLine {
    pub sale_item_id: String,
    pub name: String,
    pub inventory_id: Option<String>,
    pub original_quantity: i64,
    pub refund_quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
    pub tax: Money,
    /// `subtotal + tax`
    pub amount: Money,
    pub taxes: BTreeMap<String, Money>,
    pub rebates: BTreeMap<String, Money>,
    pub restock: bool,
}

/// Everything the refund screen shows while the operator adjusts quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundBreakdown {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub aggregated_taxes: BTreeMap<String, Money>,
    pub aggregated_rebates: BTreeMap<String, Money>,
    pub lines: Vec<RefundLine>,
    pub refund_type: RefundType,
}

impl RefundBreakdown {
    /// Whether nothing is being refunded.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units coming back.
    pub fn refunded_units(&self) -> i64 {
        self.lines.iter().map(|l| l.refund_quantity).sum()
    }
}

// =============================================================================
// Refund Calculator
// =============================================================================

/// A sale line paired with its validated refund quantity.
struct ResolvedLine<'a> {
    item: &'a SaleLineItem,
    quantity: i64,
    restock: bool,
}

/// Computes refund breakdowns under a [`ClampPolicy`].
///
/// ## Example
/// ```rust
/// use cedar_core::error::CoreError;
/// use cedar_core::money::Money;
/// use cedar_core::refund::{ClampPolicy, RefundCalculator, RefundLineRequest};
/// use cedar_core::types::{SaleLineItem, TransactionTaxContext};
///
/// let items = vec![SaleLineItem { id: "a".into(), quantity: 1, total_price: Money::from_cents(500), ..Default::default() }];
/// let ctx = TransactionTaxContext::new(Money::from_cents(500), Money::from_cents(65));
///
/// let strict = RefundCalculator::new(ClampPolicy::Reject);
/// let err = strict.compute(&[RefundLineRequest::new("a", 3)], &items, &ctx).unwrap_err();
/// assert!(matches!(err, CoreError::RefundQuantityOutOfRange { .. }));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RefundCalculator {
    policy: ClampPolicy,
}

impl RefundCalculator {
    pub fn new(policy: ClampPolicy) -> Self {
        RefundCalculator { policy }
    }

    /// Uses the clamp policy the business configured.
    pub fn from_policy(policy: &RefundPolicy) -> Self {
        RefundCalculator::new(policy.clamp_policy)
    }

    pub fn policy(&self) -> ClampPolicy {
        self.policy
    }

    /// Computes the breakdown for the current set of line requests.
    ///
    /// When several requests name the same sale item, the last one wins.
    /// Lines come back in the order of `items`, whatever the request order.
    pub fn compute(
        &self,
        requests: &[RefundLineRequest],
        items: &[SaleLineItem],
        ctx: &TransactionTaxContext,
    ) -> CoreResult<RefundBreakdown> {
        let resolved = match self.policy {
            ClampPolicy::Clamp => clamp_lines(requests, items),
            ClampPolicy::Reject => reject_lines(requests, items)?,
        };
        Ok(build_breakdown(&resolved, items, ctx))
    }
}

/// Computes a refund breakdown, clamping out-of-range quantities.
///
/// Never fails: unknown sale items are skipped and quantities are corrected
/// into range.
pub fn compute_refund_breakdown(
    requests: &[RefundLineRequest],
    items: &[SaleLineItem],
    ctx: &TransactionTaxContext,
) -> RefundBreakdown {
    build_breakdown(&clamp_lines(requests, items), items, ctx)
}

fn latest_requests(requests: &[RefundLineRequest]) -> BTreeMap<&str, &RefundLineRequest> {
    requests
        .iter()
        .map(|r| (r.sale_item_id.as_str(), r))
        .collect()
}

fn clamp_lines<'a>(
    requests: &[RefundLineRequest],
    items: &'a [SaleLineItem],
) -> Vec<ResolvedLine<'a>> {
    let by_item = latest_requests(requests);
    let known: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();

    for id in by_item.keys().filter(|id| !known.contains(*id)) {
        warn!(sale_item_id = %id, "Skipping refund request for unknown sale item");
    }

    items
        .iter()
        .filter_map(|item| {
            let request = by_item.get(item.id.as_str())?;
            let max = item.quantity.max(0);
            let quantity = request.refund_quantity.clamp(0, max);
            if quantity != request.refund_quantity {
                warn!(
                    sale_item_id = %item.id,
                    requested = request.refund_quantity,
                    clamped = quantity,
                    "Refund quantity out of range, clamped"
                );
            }
            Some(ResolvedLine {
                item,
                quantity,
                restock: request.restock,
            })
        })
        .collect()
}

fn reject_lines<'a>(
    requests: &[RefundLineRequest],
    items: &'a [SaleLineItem],
) -> CoreResult<Vec<ResolvedLine<'a>>> {
    let by_item = latest_requests(requests);

    if let Some(unknown) = by_item
        .keys()
        .find(|id| !items.iter().any(|item| item.id == **id))
    {
        return Err(CoreError::SaleItemNotFound(unknown.to_string()));
    }

    items
        .iter()
        .filter_map(|item| by_item.get(item.id.as_str()).map(|r| (item, r)))
        .map(|(item, request)| {
            let max = item.quantity.max(0);
            if !(0..=max).contains(&request.refund_quantity) {
                return Err(CoreError::RefundQuantityOutOfRange {
                    item: item.name.clone(),
                    requested: request.refund_quantity,
                    max,
                });
            }
            Ok(ResolvedLine {
                item,
                quantity: request.refund_quantity,
                restock: request.restock,
            })
        })
        .collect()
}

fn build_breakdown(
    resolved: &[ResolvedLine<'_>],
    items: &[SaleLineItem],
    ctx: &TransactionTaxContext,
) -> RefundBreakdown {
    let allocator = TaxAllocator::new(items, ctx);

    let lines: Vec<RefundLine> = resolved
        .iter()
        .filter(|r| r.quantity > 0)
        .map(|r| refund_line(r, &allocator))
        .collect();

    let subtotal: Money = lines.iter().map(|l| l.subtotal).sum();
    let tax: Money = lines.iter().map(|l| l.tax).sum();

    let mut aggregated_taxes = BTreeMap::new();
    let mut aggregated_rebates = BTreeMap::new();
    for line in &lines {
        merge_into(&mut aggregated_taxes, &line.taxes);
        merge_into(&mut aggregated_rebates, &line.rebates);
    }

    let refunded_units: i64 = lines.iter().map(|l| l.refund_quantity).sum();
    let sold_units: i64 = items.iter().map(|i| i.quantity.max(0)).sum();
    let refund_type = if refunded_units > 0 && refunded_units == sold_units {
        RefundType::Full
    } else {
        RefundType::Partial
    };

    debug!(
        lines = lines.len(),
        subtotal = %subtotal,
        tax = %tax,
        refund_type = ?refund_type,
        "Computed refund breakdown"
    );

    RefundBreakdown {
        subtotal,
        tax,
        total: subtotal + tax,
        aggregated_taxes,
        aggregated_rebates,
        lines,
        refund_type,
    }
}

fn refund_line(resolved: &ResolvedLine<'_>, allocator: &TaxAllocator) -> RefundLine {
    let item = resolved.item;
    let ratio = quantity_ratio(resolved.quantity, item.quantity);

    let subtotal = item.total_price.scale(ratio);
    let tax = allocator.allocate(item).scale(ratio);

    let taxes = match item.tax_breakdown.as_ref().filter(|m| !m.is_empty()) {
        Some(explicit) => scale_map(explicit, ratio),
        None => BTreeMap::from([(DEFAULT_TAX_NAME.to_string(), tax)]),
    };
    let rebates = item
        .rebate_breakdown
        .as_ref()
        .map(|m| scale_map(m, ratio))
        .unwrap_or_default();

    RefundLine {
        sale_item_id: item.id.clone(),
        name: item.name.clone(),
        inventory_id: item.inventory_id.clone(),
        original_quantity: item.quantity,
        refund_quantity: resolved.quantity,
        unit_price: item.unit_price,
        subtotal,
        tax,
        amount: subtotal + tax,
        taxes,
        rebates,
        restock: resolved.restock,
    }
}

fn quantity_ratio(refund_quantity: i64, original_quantity: i64) -> Decimal {
    if original_quantity <= 0 {
        return Decimal::ZERO;
    }
    Decimal::from(refund_quantity) / Decimal::from(original_quantity)
}

fn scale_map(map: &BTreeMap<String, Money>, ratio: Decimal) -> BTreeMap<String, Money> {
    map.iter()
        .map(|(name, amount)| (name.clone(), amount.scale(ratio)))
        .collect()
}

/// Adds every entry of `source` into `target`, keyed by name.
pub(crate) fn merge_into(target: &mut BTreeMap<String, Money>, source: &BTreeMap<String, Money>) {
    for (name, amount) in source {
        *target.entry(name.clone()).or_default() += *amount;
    }
}

// =============================================================================
// Refund Records
// =============================================================================

/// Where a refund comes from.
///
/// Stored as a nullable `original_sale_id` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum RefundOrigin {
    Sale { original_sale_id: String },
    /// No originating sale (goodwill, lost receipt).
    Manual,
}

impl RefundOrigin {
    pub fn sale_id(&self) -> Option<&str> {
        match self {
            RefundOrigin::Sale { original_sale_id } => Some(original_sale_id),
            RefundOrigin::Manual => None,
        }
    }
}

impl From<Option<String>> for RefundOrigin {
    fn from(id: Option<String>) -> Self {
        match id {
            Some(original_sale_id) => RefundOrigin::Sale { original_sale_id },
            None => RefundOrigin::Manual,
        }
    }
}

impl From<RefundOrigin> for Option<String> {
    fn from(origin: RefundOrigin) -> Self {
        match origin {
            RefundOrigin::Sale { original_sale_id } => Some(original_sale_id),
            RefundOrigin::Manual => None,
        }
    }
}

/// Manager sign-off collected on the refund screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ManagerApproval {
    pub manager_id: String,
    /// Checked for shape only; the backend verifies it.
    #[serde(skip_serializing)]
    pub pin: String,
}

/// Operator input that accompanies a confirmed refund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundDetails {
    pub method: PaymentMethod,
    pub reason: String,
    pub manager: Option<ManagerApproval>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A `pos_refunds` row ready for insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundRecord {
    pub business_id: String,
    #[serde(rename = "original_sale_id")]
    #[ts(as = "Option<String>")]
    pub origin: RefundOrigin,
    pub refunded_by: String,
    pub refund_method: PaymentMethod,
    pub total_refund_amount: Money,
    pub reason: String,
    pub manager_override: bool,
    pub manager_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A `pos_refund_items` row ready for insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundItemRecord {
    /// Filled in by [`RefundSubmission::assign_refund_id`] once the
    /// backend returns the refund's id.
    pub refund_id: Option<String>,
    pub original_sale_item_id: String,
    pub inventory_id: Option<String>,
    pub quantity_refunded: i64,
    pub unit_price: Money,
    pub refund_amount: Money,
    pub restock: bool,
}

/// One inventory increment caused by a restocked refund line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryAdjustment {
    pub inventory_id: String,
    pub sale_item_id: String,
    pub quantity: i64,
}

/// The refund row plus its item rows, written together by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundSubmission {
    pub record: RefundRecord,
    pub items: Vec<RefundItemRecord>,
}

impl RefundSubmission {
    /// Assembles the records for a refund against an existing sale.
    ///
    /// Runs the operator checks first: a non-empty reason, a positive total
    /// and manager approval when the policy asks for it.
    pub fn from_sale(
        ctx: &ActorContext,
        policy: &RefundPolicy,
        original_sale_id: impl Into<String>,
        breakdown: &RefundBreakdown,
        details: RefundDetails,
    ) -> CoreResult<Self> {
        let original_sale_id = original_sale_id.into();
        validate_uuid("original_sale_id", &original_sale_id)?;

        let items: Vec<RefundItemRecord> = breakdown
            .lines
            .iter()
            .filter(|line| line.refund_quantity > 0)
            .map(|line| RefundItemRecord {
                refund_id: None,
                original_sale_item_id: line.sale_item_id.clone(),
                inventory_id: line.inventory_id.clone(),
                quantity_refunded: line.refund_quantity,
                unit_price: line.unit_price,
                refund_amount: line.amount.round_to_cents(),
                restock: line.restock,
            })
            .collect();

        let record = build_record(
            ctx,
            policy,
            RefundOrigin::Sale { original_sale_id },
            breakdown.total,
            details,
        )?;

        debug!(
            business_id = %record.business_id,
            total = %record.total_refund_amount,
            items = items.len(),
            "Assembled sale refund"
        );

        Ok(RefundSubmission { record, items })
    }

    /// Assembles a refund that has no originating sale and no item rows.
    pub fn manual(
        ctx: &ActorContext,
        policy: &RefundPolicy,
        amount: Money,
        details: RefundDetails,
    ) -> CoreResult<Self> {
        let record = build_record(ctx, policy, RefundOrigin::Manual, amount, details)?;

        debug!(
            business_id = %record.business_id,
            total = %record.total_refund_amount,
            "Assembled manual refund"
        );

        Ok(RefundSubmission {
            record,
            items: Vec::new(),
        })
    }

    /// Stamps the backend-assigned refund id onto every item row.
    pub fn assign_refund_id(&mut self, refund_id: impl Into<String>) {
        let refund_id = refund_id.into();
        for item in &mut self.items {
            item.refund_id = Some(refund_id.clone());
        }
    }

    /// Inventory increments for restocked lines that track inventory.
    pub fn restock_adjustments(&self) -> Vec<InventoryAdjustment> {
        self.items
            .iter()
            .filter(|item| item.restock && item.quantity_refunded > 0)
            .filter_map(|item| {
                Some(InventoryAdjustment {
                    inventory_id: item.inventory_id.clone()?,
                    sale_item_id: item.original_sale_item_id.clone(),
                    quantity: item.quantity_refunded,
                })
            })
            .collect()
    }
}

fn build_record(
    ctx: &ActorContext,
    policy: &RefundPolicy,
    origin: RefundOrigin,
    total: Money,
    details: RefundDetails,
) -> CoreResult<RefundRecord> {
    let reason = validate_refund_reason(&details.reason, policy.max_reason_length)?;
    validate_refund_total(total)?;
    validate_manager_approval(
        policy.require_manager_approval,
        details.manager.as_ref().map(|m| m.manager_id.as_str()),
        details.manager.as_ref().map(|m| m.pin.as_str()),
    )?;

    let manager_id = details
        .manager
        .map(|m| m.manager_id.trim().to_string())
        .filter(|id| !id.is_empty());

    Ok(RefundRecord {
        business_id: ctx.business_id.clone(),
        origin,
        refunded_by: ctx.actor_id.clone(),
        refund_method: details.method,
        total_refund_amount: total.round_to_cents(),
        reason,
        manager_override: manager_id.is_some(),
        manager_id,
        created_at: details.created_at,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use chrono::TimeZone;

    const SALE_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn item(id: &str, quantity: i64, total_cents: i64) -> SaleLineItem {
        SaleLineItem {
            id: id.to_string(),
            name: format!("Item {}", id),
            quantity,
            unit_price: Money::from_cents(total_cents / quantity.max(1)),
            total_price: Money::from_cents(total_cents),
            inventory_id: Some(format!("inv-{}", id)),
            ..Default::default()
        }
    }

    fn two_item_sale() -> (Vec<SaleLineItem>, TransactionTaxContext) {
        (
            vec![item("a", 2, 3000), item("b", 1, 1000)],
            TransactionTaxContext::new(Money::from_cents(4000), Money::from_cents(520)),
        )
    }

    fn details() -> RefundDetails {
        RefundDetails {
            method: PaymentMethod::Cash,
            reason: "Customer changed mind".to_string(),
            manager: Some(ManagerApproval {
                manager_id: "mgr-7".to_string(),
                pin: "4321".to_string(),
            }),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 15, 30, 0).unwrap(),
        }
    }

    fn actor() -> ActorContext {
        ActorContext::new("biz-1", "cashier-3")
    }

    #[test]
    fn test_partial_refund_multi_item_tax_split() {
        let (items, ctx) = two_item_sale();
        let breakdown = compute_refund_breakdown(&[RefundLineRequest::new("a", 1)], &items, &ctx);

        assert_eq!(breakdown.subtotal, Money::from_cents(1500));
        assert_eq!(breakdown.tax, Money::from_cents(195));
        assert_eq!(breakdown.total, Money::from_cents(1695));
        assert_eq!(breakdown.refund_type, RefundType::Partial);
        assert_eq!(breakdown.lines.len(), 1);
        assert_eq!(
            breakdown.aggregated_taxes.get(DEFAULT_TAX_NAME),
            Some(&Money::from_cents(195))
        );
        assert!(breakdown.aggregated_rebates.is_empty());
    }

    #[test]
    fn test_single_item_uses_full_tax() {
        let items = vec![item("a", 4, 2000)];
        let ctx = TransactionTaxContext::new(Money::from_cents(2000), Money::from_cents(260));
        let breakdown = compute_refund_breakdown(&[RefundLineRequest::new("a", 1)], &items, &ctx);

        assert_eq!(breakdown.subtotal, Money::from_cents(500));
        assert_eq!(breakdown.tax, Money::from_cents(65));
    }

    #[test]
    fn test_full_refund_matches_sale_total() {
        let (items, ctx) = two_item_sale();
        let requests = [RefundLineRequest::new("a", 2), RefundLineRequest::new("b", 1)];
        let breakdown = compute_refund_breakdown(&requests, &items, &ctx);

        assert_eq!(breakdown.total, Money::from_cents(4520));
        assert_eq!(breakdown.refund_type, RefundType::Full);
    }

    #[test]
    fn test_zero_quantity_excluded() {
        let (items, ctx) = two_item_sale();
        let requests = [RefundLineRequest::new("a", 0), RefundLineRequest::new("b", 1)];
        let breakdown = compute_refund_breakdown(&requests, &items, &ctx);

        assert_eq!(breakdown.lines.len(), 1);
        assert_eq!(breakdown.lines[0].sale_item_id, "b");
        assert_eq!(breakdown.subtotal, Money::from_cents(1000));
        assert_eq!(breakdown.tax, Money::from_cents(130));
    }

    #[test]
    fn test_nothing_refunded_is_partial_and_empty() {
        let (items, ctx) = two_item_sale();
        let breakdown = compute_refund_breakdown(&[], &items, &ctx);

        assert!(breakdown.is_empty());
        assert!(breakdown.total.is_zero());
        assert!(breakdown.aggregated_taxes.is_empty());
        assert_eq!(breakdown.refund_type, RefundType::Partial);
    }

    #[test]
    fn test_clamp_policy_corrects_quantities() {
        let (items, ctx) = two_item_sale();
        let requests = [
            RefundLineRequest::new("a", 9),
            RefundLineRequest::new("b", -3),
            RefundLineRequest::new("ghost", 1),
        ];
        let breakdown = RefundCalculator::default()
            .compute(&requests, &items, &ctx)
            .unwrap();

        assert_eq!(breakdown.lines.len(), 1);
        assert_eq!(breakdown.lines[0].refund_quantity, 2);
        assert_eq!(breakdown.subtotal, Money::from_cents(3000));
    }

    #[test]
    fn test_reject_policy() {
        let (items, ctx) = two_item_sale();
        let calculator = RefundCalculator::new(ClampPolicy::Reject);

        let err = calculator
            .compute(&[RefundLineRequest::new("a", 3)], &items, &ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::RefundQuantityOutOfRange { requested: 3, max: 2, .. }
        ));

        let err = calculator
            .compute(&[RefundLineRequest::new("ghost", 1)], &items, &ctx)
            .unwrap_err();
        assert!(matches!(err, CoreError::SaleItemNotFound(id) if id == "ghost"));

        assert!(calculator
            .compute(&[RefundLineRequest::new("a", 2)], &items, &ctx)
            .is_ok());
    }

    #[test]
    fn test_configured_reject_policy() {
        let (items, ctx) = two_item_sale();
        let config = crate::config::CoreConfig::from_toml_str(
            r#"
            [refunds]
            clamp_policy = "reject"
            "#,
        )
        .unwrap();

        let calculator = RefundCalculator::from_policy(&config.refunds);
        assert_eq!(calculator.policy(), ClampPolicy::Reject);
        let err = calculator
            .compute(&[RefundLineRequest::new("a", 5)], &items, &ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::RefundQuantityOutOfRange { requested: 5, max: 2, .. }
        ));

        let lenient = RefundCalculator::from_policy(&RefundPolicy::default());
        assert_eq!(lenient.policy(), ClampPolicy::Clamp);
        assert!(lenient
            .compute(&[RefundLineRequest::new("a", 5)], &items, &ctx)
            .is_ok());
    }

    #[test]
    fn test_last_request_wins_and_order_is_stable() {
        let (items, ctx) = two_item_sale();
        let requests = [
            RefundLineRequest::new("b", 1),
            RefundLineRequest::new("a", 2),
            RefundLineRequest::new("a", 1),
        ];
        let breakdown = compute_refund_breakdown(&requests, &items, &ctx);

        let ids: Vec<&str> = breakdown.lines.iter().map(|l| l.sale_item_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(breakdown.lines[0].refund_quantity, 1);
    }

    #[test]
    fn test_explicit_breakdowns_are_scaled() {
        let mut a = item("a", 2, 3000);
        a.tax_breakdown = Some(BTreeMap::from([
            ("GST".to_string(), Money::from_cents(150)),
            ("PST".to_string(), Money::from_cents(240)),
        ]));
        a.rebate_breakdown = Some(BTreeMap::from([(
            "Ontario Rebate".to_string(),
            Money::from_cents(40),
        )]));
        let items = vec![a, item("b", 1, 1000)];
        let ctx = TransactionTaxContext::new(Money::from_cents(4000), Money::from_cents(520));

        let requests = [RefundLineRequest::new("a", 1), RefundLineRequest::new("b", 1)];
        let breakdown = compute_refund_breakdown(&requests, &items, &ctx);

        assert_eq!(breakdown.aggregated_taxes["GST"], Money::from_cents(75));
        assert_eq!(breakdown.aggregated_taxes["PST"], Money::from_cents(120));
        assert_eq!(breakdown.aggregated_taxes[DEFAULT_TAX_NAME], Money::from_cents(130));
        assert_eq!(breakdown.aggregated_rebates["Ontario Rebate"], Money::from_cents(20));
    }

    #[test]
    fn test_recompute_is_identical() {
        let (items, ctx) = two_item_sale();
        let requests = [RefundLineRequest::new("a", 1), RefundLineRequest::new("b", 1)];
        let first = compute_refund_breakdown(&requests, &items, &ctx);
        let second = compute_refund_breakdown(&requests, &items, &ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn test_submission_from_sale() {
        let (items, ctx) = two_item_sale();
        let requests = [
            RefundLineRequest::new("a", 1).with_restock(true),
            RefundLineRequest::new("b", 0),
        ];
        let breakdown = compute_refund_breakdown(&requests, &items, &ctx);

        let mut submission =
            RefundSubmission::from_sale(&actor(), &RefundPolicy::default(), SALE_ID, &breakdown, details())
                .unwrap();

        assert_eq!(submission.record.origin.sale_id(), Some(SALE_ID));
        assert_eq!(submission.record.total_refund_amount, Money::from_cents(1695));
        assert_eq!(submission.record.refunded_by, "cashier-3");
        assert!(submission.record.manager_override);
        assert_eq!(submission.record.manager_id.as_deref(), Some("mgr-7"));
        assert_eq!(submission.items.len(), 1);
        assert_eq!(submission.items[0].refund_amount, Money::from_cents(1695));

        submission.assign_refund_id("refund-42");
        assert_eq!(submission.items[0].refund_id.as_deref(), Some("refund-42"));

        let adjustments = submission.restock_adjustments();
        assert_eq!(
            adjustments,
            vec![InventoryAdjustment {
                inventory_id: "inv-a".to_string(),
                sale_item_id: "a".to_string(),
                quantity: 1,
            }]
        );
    }

    #[test]
    fn test_submission_validation() {
        let (items, ctx) = two_item_sale();
        let breakdown = compute_refund_breakdown(&[RefundLineRequest::new("a", 1)], &items, &ctx);
        let policy = RefundPolicy::default();

        let mut no_reason = details();
        no_reason.reason = "  ".to_string();
        let err = RefundSubmission::from_sale(&actor(), &policy, SALE_ID, &breakdown, no_reason)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Required { .. })));

        let mut no_manager = details();
        no_manager.manager = None;
        let err = RefundSubmission::from_sale(&actor(), &policy, SALE_ID, &breakdown, no_manager)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::ManagerApprovalRequired { .. })
        ));

        let empty = compute_refund_breakdown(&[], &items, &ctx);
        let err = RefundSubmission::from_sale(&actor(), &policy, SALE_ID, &empty, details())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::MustBePositive { .. })));

        let err = RefundSubmission::from_sale(&actor(), &policy, "sale-1", &breakdown, details())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::InvalidFormat { .. })));
    }

    #[test]
    fn test_manual_refund_has_no_sale() {
        let relaxed = RefundPolicy {
            require_manager_approval: false,
            ..RefundPolicy::default()
        };
        let mut d = details();
        d.manager = None;

        let submission =
            RefundSubmission::manual(&actor(), &relaxed, Money::from_cents(1250), d).unwrap();

        assert_eq!(submission.record.origin, RefundOrigin::Manual);
        assert!(!submission.record.manager_override);
        assert!(submission.items.is_empty());
        assert!(submission.restock_adjustments().is_empty());

        let json = serde_json::to_value(&submission.record).unwrap();
        assert!(json["original_sale_id"].is_null());
        assert_eq!(json["refund_method"], "cash");
    }

    #[test]
    fn test_origin_serializes_as_sale_id() {
        let origin = RefundOrigin::Sale {
            original_sale_id: SALE_ID.to_string(),
        };
        assert_eq!(serde_json::to_value(&origin).unwrap(), SALE_ID);
        let back: RefundOrigin = serde_json::from_str("null").unwrap();
        assert_eq!(back, RefundOrigin::Manual);
    }
}

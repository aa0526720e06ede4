//! # Validation Module
//!
//! Checks the refund screen runs before a refund is submitted.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Refund screen (TypeScript)                                   │
//! │  ├── Quantity steppers, empty reason hint                              │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: RefundSubmission (Rust)                                      │
//! │  └── THIS MODULE: reason, total > 0, manager approval                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Hosted backend                                               │
//! │  ├── NOT NULL constraints                                              │
//! │  └── PIN verification against the manager's account                    │
//! │                                                                         │
//! │  The calculators never call these; only submission assembly does.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cedar_core::money::Money;
//! use cedar_core::validation::{validate_refund_reason, validate_refund_total};
//!
//! let reason = validate_refund_reason("  Cold coffee ", 500).unwrap();
//! assert_eq!(reason, "Cold coffee");
//!
//! assert!(validate_refund_total(Money::from_cents(1695)).is_ok());
//! assert!(validate_refund_total(Money::zero()).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Manager PINs are 4 to 8 digits.
pub const MIN_PIN_LENGTH: usize = 4;
pub const MAX_PIN_LENGTH: usize = 8;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a refund reason.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `max_len` characters
///
/// ## Returns
/// The trimmed reason.
pub fn validate_refund_reason(reason: &str, max_len: usize) -> ValidationResult<String> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    if reason.chars().count() > max_len {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: max_len,
        });
    }

    Ok(reason.to_string())
}

/// Validates the format of a manager PIN.
///
/// Only the shape is checked here; whether the PIN belongs to a manager is
/// decided by the backend.
///
/// ## Example
/// ```rust
/// use cedar_core::validation::validate_manager_pin;
///
/// assert!(validate_manager_pin("1234").is_ok());
/// assert!(validate_manager_pin("12a4").is_err());
/// assert!(validate_manager_pin("123").is_err());
/// ```
pub fn validate_manager_pin(pin: &str) -> ValidationResult<()> {
    if pin.is_empty() {
        return Err(ValidationError::Required {
            field: "manager PIN".to_string(),
        });
    }

    if !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "manager PIN".to_string(),
            reason: "must contain digits only".to_string(),
        });
    }

    if !(MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&pin.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "manager PIN".to_string(),
            reason: format!("must be {}-{} digits", MIN_PIN_LENGTH, MAX_PIN_LENGTH),
        });
    }

    Ok(())
}

/// Checks that a manager approved the action, when approval is required.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Refund: Submit                                                         │
/// │                                                                         │
/// │  Cashier presses "Process Refund"                                       │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_manager_approval(...) ← THIS FUNCTION                        │
/// │       │                                                                 │
/// │       ├── required, no manager? → "Manager approval is required..."    │
/// │       │                                                                 │
/// │       ├── PIN not 4-8 digits?   → "manager PIN has invalid format"     │
/// │       │                                                                 │
/// │       └── OK → RefundRecord with manager_override = true               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_manager_approval(
    required: bool,
    manager_id: Option<&str>,
    pin: Option<&str>,
) -> ValidationResult<()> {
    let manager_id = manager_id.map(str::trim).filter(|id| !id.is_empty());

    match manager_id {
        None if required => Err(ValidationError::ManagerApprovalRequired {
            action: "issue a refund".to_string(),
        }),
        None => Ok(()),
        Some(_) => validate_manager_pin(pin.unwrap_or_default()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the amount about to be refunded.
///
/// ## Rules
/// - Must be positive once rounded to cents
pub fn validate_refund_total(total: Money) -> ValidationResult<()> {
    if !total.round_to_cents().is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "refund total".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use cedar_core::validation::validate_uuid;
///
/// assert!(validate_uuid("original_sale_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("original_sale_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

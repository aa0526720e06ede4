//! # Error Types
//!
//! Domain-specific error types for cedar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cedar-core errors (this file)                                         │
//! │  ├── CoreError        - Refund policy violations, CSV export failures  │
//! │  ├── ValidationError  - Operator input checks before a refund insert   │
//! │  └── ConfigError      - Reading / parsing the TOML config              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → app shell → operator message      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What is NOT an error
//! Missing or malformed numbers, zero denominators and out-of-range refund
//! quantities (under the default clamp policy) are corrected silently.
//! A POS must keep ringing sales even when a row is half-filled.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A refund line asks for more units than were sold (or fewer than zero).
    ///
    /// ## When This Occurs
    /// Only under `ClampPolicy::Reject`. The default `Clamp` policy corrects
    /// the quantity instead.
    #[error("Refund quantity {requested} for '{item}' is outside 0..={max}")]
    RefundQuantityOutOfRange {
        item: String,
        requested: i64,
        max: i64,
    },

    /// A refund line references a sale item that is not part of the sale.
    #[error("Sale item not found: {0}")]
    SaleItemNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A report could not be written as CSV.
    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input doesn't meet requirements.
/// The refund screen runs these checks before anything is persisted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, non-numeric PIN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A manager must approve this action.
    #[error("Manager approval is required to {action}")]
    ManagerApprovalRequired { action: String },
}

// =============================================================================
// Config Error
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for `CoreConfig`.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but makes no sense (e.g. a negative threshold).
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

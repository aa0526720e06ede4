//! # Core Configuration
//!
//! Settings the calculators and renderers consume.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where Settings Come From                             │
//! │                                                                         │
//! │  1. Business settings row (backend)  ──► BusinessDisplaySettings       │
//! │     deserialized from JSON by the app shell                             │
//! │                                                                         │
//! │  2. TOML Config File                 ──► CoreConfig::load(path)        │
//! │     refund policy, report thresholds, display defaults                  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     clamp policy, manager approval on, $5.00 variance threshold         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [business]
//! business_name = "Maple Street Cafe"
//! address_lines = ["12 Maple St", "Toronto, ON M5V 2T6"]
//! tax_number = "123456789 RT0001"
//! loyalty_mode = "points"
//!
//! [refunds]
//! clamp_policy = "clamp"          # clamp | reject
//! require_manager_approval = true
//!
//! [reports]
//! variance_threshold = 5.00
//! peak_ratio = 0.8
//! ```

use std::path::Path;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::ConfigError;
use crate::money::Money;
use crate::refund::ClampPolicy;

// =============================================================================
// Loyalty Mode
// =============================================================================

/// How loyalty amounts are shown on receipts.
///
/// Purely a formatting choice: the balance itself is computed elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyMode {
    /// Integer points: the stored amount × 1000, rounded.
    Points,
    /// Dollar credit.
    #[default]
    Credit,
}

// =============================================================================
// Business Display Settings
// =============================================================================

/// Business identity printed on every receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct BusinessDisplaySettings {
    pub business_name: String,
    pub address_lines: Vec<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    /// GST/HST registration number.
    pub tax_number: Option<String>,
    pub tax_number_label: String,
    /// Extra line under the business name.
    pub receipt_header: Option<String>,
    pub receipt_footer: Option<String>,
    pub loyalty_mode: LoyaltyMode,
    pub loyalty_program_name: String,
    pub currency_symbol: String,
    /// Store offset from UTC, used for dates printed on receipts.
    pub utc_offset_minutes: i32,
}

impl Default for BusinessDisplaySettings {
    fn default() -> Self {
        BusinessDisplaySettings {
            business_name: "Cedar POS".to_string(),
            address_lines: Vec::new(),
            phone: None,
            email: None,
            website: None,
            tax_number: None,
            tax_number_label: "GST/HST #".to_string(),
            receipt_header: None,
            receipt_footer: Some("Thank you for your business!".to_string()),
            loyalty_mode: LoyaltyMode::Credit,
            loyalty_program_name: "Rewards".to_string(),
            currency_symbol: "$".to_string(),
            utc_offset_minutes: 0,
        }
    }
}

impl BusinessDisplaySettings {
    /// The store's fixed offset; out-of-range values fall back to UTC.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }

    /// Formats an amount with the configured symbol.
    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }
}

// =============================================================================
// Refund Policy
// =============================================================================

/// Rules applied when an operator builds and submits a refund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct RefundPolicy {
    /// What to do with quantities outside `0..=sold`.
    pub clamp_policy: ClampPolicy,
    /// Refund submissions need a manager id.
    pub require_manager_approval: bool,
    /// Maximum characters in a refund reason.
    pub max_reason_length: usize,
}

impl Default for RefundPolicy {
    fn default() -> Self {
        RefundPolicy {
            clamp_policy: ClampPolicy::Clamp,
            require_manager_approval: true,
            max_reason_length: 500,
        }
    }
}

// =============================================================================
// Report Settings
// =============================================================================

/// Thresholds used by the report aggregators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ReportSettings {
    /// A drawer is flagged when |variance| exceeds this.
    pub variance_threshold: Money,
    /// An hour is "peak" when its net sales reach this share of the best hour.
    pub peak_ratio: f64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            variance_threshold: Money::from_cents(500),
            peak_ratio: 0.8,
        }
    }
}

// =============================================================================
// Core Config
// =============================================================================

/// Everything cedar-core can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub business: BusinessDisplaySettings,
    pub refunds: RefundPolicy,
    pub reports: ReportSettings,
}

impl CoreConfig {
    /// Parses and validates a TOML document. Missing sections use defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = toml::from_str(raw)?;
        config.validate()?;
        debug!(
            business = %config.business.business_name,
            clamp_policy = ?config.refunds.clamp_policy,
            "Parsed core config"
        );
        Ok(config)
    }

    /// Reads a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        info!(path = %path.display(), "Loaded core config");
        Ok(config)
    }

    /// Rejects values the calculators cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reports.variance_threshold.is_negative() {
            return Err(ConfigError::InvalidValue {
                field: "reports.variance_threshold".to_string(),
                reason: "must not be negative".to_string(),
            });
        }

        if !(self.reports.peak_ratio > 0.0 && self.reports.peak_ratio <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "reports.peak_ratio".to_string(),
                reason: "must be in (0, 1]".to_string(),
            });
        }

        if self.refunds.max_reason_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refunds.max_reason_length".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.reports.variance_threshold, Money::from_cents(500));
        assert_eq!(config.refunds.clamp_policy, ClampPolicy::Clamp);
        assert_eq!(config.business.loyalty_mode, LoyaltyMode::Credit);
    }

    #[test]
    fn test_partial_config() {
        let config = CoreConfig::from_toml_str(
            r#"
            [business]
            business_name = "Maple Street Cafe"
            loyalty_mode = "points"
            utc_offset_minutes = -300

            [refunds]
            clamp_policy = "reject"

            [reports]
            variance_threshold = 4.99
            "#,
        )
        .unwrap();

        assert_eq!(config.business.business_name, "Maple Street Cafe");
        assert_eq!(config.business.loyalty_mode, LoyaltyMode::Points);
        assert_eq!(config.business.currency_symbol, "$");
        assert_eq!(config.business.offset().local_minus_utc(), -300 * 60);
        assert_eq!(config.refunds.clamp_policy, ClampPolicy::Reject);
        assert!(config.refunds.require_manager_approval);
        assert_eq!(config.reports.variance_threshold.cents(), 499);
        assert!((config.reports.peak_ratio - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = CoreConfig::from_toml_str("[reports]\npeak_ratio = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = CoreConfig::from_toml_str("[reports]\nvariance_threshold = -1\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = CoreConfig::from_toml_str("[refunds]\nclamp_policy = \"maybe\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = CoreConfig::load("/definitely/not/here/cedar.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

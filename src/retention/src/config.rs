//! Retention tier configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const SECONDS_PER_DAY: u64 = 24 * 3600;

/// A named retention override with its own period.
///
/// The label is opaque to the retention core. It identifies the tier in the
/// block's retention record and is handed to a `TierMatcher` by whatever
/// rewrites the block content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    /// How long data selected by this tier is retained.
    #[serde(with = "humantime_serde")]
    pub period: Duration,

    /// Identifying label, typically a series selector such as `service=h1`.
    pub label: String,
}

impl Tier {
    pub fn new(period: Duration, label: impl Into<String>) -> Self {
        Self {
            period,
            label: label.into(),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.label,
            humantime::format_duration(self.period)
        )
    }
}

/// Snapshot of the retention configuration for one evaluation pass.
///
/// A new snapshot may be supplied on every pass; nothing is cached between
/// passes apart from what is recorded on the blocks themselves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Default retention applied when no tier overrides it.
    ///
    /// Env: RETAINER__RETENTION__BASE_PERIOD
    #[serde(with = "humantime_serde")]
    pub base_period: Duration,

    /// Override tiers, in configuration order.
    #[serde(default)]
    pub tiers: Vec<Tier>,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            base_period: Duration::from_secs(13 * 30 * SECONDS_PER_DAY), // ~13 months
            tiers: Vec::new(),
        }
    }
}

impl RetentionConfig {
    pub fn new(base_period: Duration, tiers: Vec<Tier>) -> Self {
        Self { base_period, tiers }
    }

    /// Validate the retention configuration.
    ///
    /// Checks:
    /// - The base period is positive (non-zero)
    /// - Every tier period is positive
    /// - Every tier has a non-empty label
    ///
    /// Duplicate labels are accepted and only reported with a warning.
    pub fn validate(&self) -> Result<(), RetentionConfigError> {
        let zero = Duration::from_secs(0);

        if self.base_period <= zero {
            return Err(RetentionConfigError::InvalidBasePeriod(self.base_period));
        }

        let mut seen = HashSet::new();
        for (index, tier) in self.tiers.iter().enumerate() {
            if tier.label.trim().is_empty() {
                return Err(RetentionConfigError::EmptyTierLabel { index });
            }
            if tier.period <= zero {
                return Err(RetentionConfigError::InvalidTierPeriod {
                    label: tier.label.clone(),
                    duration: tier.period,
                });
            }
            if !seen.insert(tier.label.as_str()) {
                warn!(
                    label = %tier.label,
                    index,
                    "Duplicate retention tier label; tiers sharing a label share one fingerprint"
                );
            }
        }

        Ok(())
    }
}

/// Errors that can occur during retention configuration validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RetentionConfigError {
    /// Invalid base period (must be positive).
    #[error("Invalid base retention period: {0:?} must be positive")]
    InvalidBasePeriod(Duration),

    /// Invalid tier period (must be positive).
    #[error("Invalid retention period for tier '{label}': {duration:?} must be positive")]
    InvalidTierPeriod { label: String, duration: Duration },

    /// Tier without a label.
    #[error("Retention tier at index {index} has an empty label")]
    EmptyTierLabel { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = SECONDS_PER_DAY;

    #[test]
    fn test_default_config_is_valid() {
        let config = RetentionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_period, Duration::from_secs(390 * DAY));
        assert!(config.tiers.is_empty());
    }

    #[test]
    fn test_zero_base_period_is_invalid() {
        let config = RetentionConfig {
            base_period: Duration::from_secs(0),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(RetentionConfigError::InvalidBasePeriod(Duration::from_secs(0)))
        );
    }

    #[test]
    fn test_zero_tier_period_is_invalid() {
        let config = RetentionConfig::new(
            Duration::from_secs(10 * DAY),
            vec![Tier::new(Duration::from_secs(0), "service=h1")],
        );
        assert!(matches!(
            config.validate(),
            Err(RetentionConfigError::InvalidTierPeriod { .. })
        ));
    }

    #[test]
    fn test_empty_label_is_invalid() {
        let config = RetentionConfig::new(
            Duration::from_secs(10 * DAY),
            vec![
                Tier::new(Duration::from_secs(DAY), "service=h1"),
                Tier::new(Duration::from_secs(DAY), "  "),
            ],
        );
        assert_eq!(
            config.validate(),
            Err(RetentionConfigError::EmptyTierLabel { index: 1 })
        );
    }

    #[test]
    fn test_duplicate_labels_are_accepted() {
        let config = RetentionConfig::new(
            Duration::from_secs(10 * DAY),
            vec![
                Tier::new(Duration::from_secs(DAY), "service=h1"),
                Tier::new(Duration::from_secs(20 * DAY), "service=h1"),
            ],
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_humantime_deserialization() {
        let json = r#"{
            "base_period": "390days",
            "tiers": [
                { "period": "180days", "label": "service=h1" },
                { "period": "720days", "label": "namespace=b1" }
            ]
        }"#;

        let config: RetentionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.base_period, Duration::from_secs(390 * DAY));
        assert_eq!(config.tiers.len(), 2);
        assert_eq!(config.tiers[0].period, Duration::from_secs(180 * DAY));
        assert_eq!(config.tiers[1].label, "namespace=b1");
    }

    #[test]
    fn test_tier_display() {
        let tier = Tier::new(Duration::from_secs(2 * DAY), "name=ying");
        assert_eq!(tier.to_string(), "name=ying (2days)");
    }
}

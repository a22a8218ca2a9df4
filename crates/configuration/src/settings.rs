use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account: Account,
    #[serde(default)]
    pub normalization: NormalizationSettings,
    #[serde(default)]
    pub exposure: ExposureSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Account-level figures the analytics are measured against.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    /// Total account equity in account currency.
    pub equity: Decimal,
}

/// Parameters for rescaling trades to a common risk unit.
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizationSettings {
    /// The percent of equity a "standard" trade risks (e.g. 1.0 for 1%).
    pub target_risk_pct: Decimal,
    /// Trades whose initial risk amount is below this are left out of normalized
    /// statistics instead of being scaled by an enormous factor.
    #[serde(default = "default_min_risk_amount")]
    pub min_risk_amount: Decimal,
}

/// Parameters for the exposure bucket allocation.
#[derive(Debug, Clone, Deserialize)]
pub struct ExposureSettings {
    /// Number of capacity buckets positions are spread across.
    pub bucket_count: usize,
    /// Gross exposure target as a percent of equity, shared evenly by the buckets.
    pub target_exposure_pct: Decimal,
}

/// Where and how verbosely to log.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG` when set.
    pub level: String,
    /// When present, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_min_risk_amount() -> Decimal {
    dec!(0.01)
}

fn default_file_prefix() -> String {
    "journal.log".to_string()
}

// --- Default Implementations ---
// This allows a user to omit any section from their toml
// and still have it work with sensible defaults.

impl Default for Account {
    fn default() -> Self {
        Self {
            equity: dec!(100000),
        }
    }
}

impl Default for NormalizationSettings {
    fn default() -> Self {
        Self {
            target_risk_pct: dec!(1),
            min_risk_amount: default_min_risk_amount(),
        }
    }
}

impl Default for ExposureSettings {
    fn default() -> Self {
        Self {
            bucket_count: 4,
            target_exposure_pct: dec!(400),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

impl Config {
    /// Rejects settings the analytics cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.account.equity <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "account.equity must be greater than 0 (got {})",
                self.account.equity
            )));
        }
        if self.normalization.target_risk_pct <= Decimal::ZERO
            || self.normalization.target_risk_pct > dec!(100)
        {
            return Err(ConfigError::ValidationError(format!(
                "normalization.target_risk_pct must be in (0, 100] (got {})",
                self.normalization.target_risk_pct
            )));
        }
        if self.normalization.min_risk_amount.is_sign_negative() {
            return Err(ConfigError::ValidationError(
                "normalization.min_risk_amount cannot be negative".to_string(),
            ));
        }
        if self.exposure.bucket_count == 0 {
            return Err(ConfigError::ValidationError(
                "exposure.bucket_count must be at least 1".to_string(),
            ));
        }
        if self.exposure.target_exposure_pct <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "exposure.target_exposure_pct must be greater than 0 (got {})",
                self.exposure.target_exposure_pct
            )));
        }
        Ok(())
    }
}

impl ExposureSettings {
    /// Capacity of one bucket as a percent of equity.
    pub fn bucket_capacity_pct(&self) -> Option<Decimal> {
        if self.bucket_count == 0 {
            return None;
        }
        Some(self.target_exposure_pct / Decimal::from(self.bucket_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.exposure.bucket_capacity_pct(), Some(dec!(100)));
    }

    #[test]
    fn rejects_zero_equity_and_buckets() {
        let mut config = Config::default();
        config.account.equity = Decimal::ZERO;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = Config::default();
        config.exposure.bucket_count = 0;
        assert!(config.validate().is_err());
        assert_eq!(config.exposure.bucket_capacity_pct(), None);
    }
}

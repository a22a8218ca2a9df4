use crate::settings::Config;
use rust_decimal::Decimal;

/// Command-line overrides layered on top of the file and environment settings.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SettingsOverrides {
    /// Account equity used for normalization and exposure.
    #[arg(long, global = true)]
    pub equity: Option<Decimal>,

    /// Percent of equity a standard trade risks (e.g. 1.0).
    #[arg(long, global = true)]
    pub target_risk_pct: Option<Decimal>,

    /// Number of exposure buckets.
    #[arg(long, global = true)]
    pub bucket_count: Option<usize>,

    /// Gross exposure target as a percent of equity (e.g. 400).
    #[arg(long, global = true)]
    pub target_exposure_pct: Option<Decimal>,

    /// Log filter directive (e.g. "debug" or "analytics=trace").
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

impl SettingsOverrides {
    /// Applies every override that was given, leaving the rest untouched.
    pub fn apply(&self, config: &mut Config) {
        if let Some(equity) = self.equity {
            config.account.equity = equity;
        }
        if let Some(target_risk_pct) = self.target_risk_pct {
            config.normalization.target_risk_pct = target_risk_pct;
        }
        if let Some(bucket_count) = self.bucket_count {
            config.exposure.bucket_count = bucket_count;
        }
        if let Some(target_exposure_pct) = self.target_exposure_pct {
            config.exposure.target_exposure_pct = target_exposure_pct;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

use crate::error::AnalyticsError;
use crate::metrics::TradeMetrics;
use configuration::NormalizationSettings;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A trade's outcome rescaled as if it had risked the standard amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMetrics {
    /// `target_risk_amount / initial_risk_amount`, or 1 when the trade is excluded.
    pub factor: Decimal,
    pub target_risk_amount: Decimal,
    pub realized_pnl: Option<Decimal>,
    pub realized_pnl_percent: Option<Decimal>,
    pub total_pnl: Option<Decimal>,
    pub total_pnl_percent: Option<Decimal>,
    /// Identical to the raw R-ratio: it already divides out risk.
    pub r_ratio: Option<Decimal>,
    /// Set when the trade's risk was too small to scale meaningfully. Such
    /// trades are left out of normalized statistics.
    pub excluded: bool,
}

/// Rescales trades to a common risk unit derived from account equity.
#[derive(Debug, Clone)]
pub struct Normalizer {
    target_risk_amount: Decimal,
    min_risk_amount: Decimal,
}

impl Normalizer {
    /// Builds a normalizer targeting `equity * target_risk_pct / 100` per trade.
    pub fn new(settings: &NormalizationSettings, equity: Decimal) -> Result<Self, AnalyticsError> {
        if equity <= Decimal::ZERO {
            return Err(AnalyticsError::Configuration(format!(
                "equity must be greater than zero to normalize trades (got {equity})"
            )));
        }
        if settings.target_risk_pct <= Decimal::ZERO {
            return Err(AnalyticsError::Configuration(format!(
                "target risk per trade must be greater than zero (got {})",
                settings.target_risk_pct
            )));
        }

        Ok(Self {
            target_risk_amount: equity * settings.target_risk_pct / Decimal::ONE_HUNDRED,
            min_risk_amount: settings.min_risk_amount,
        })
    }

    pub fn target_risk_amount(&self) -> Decimal {
        self.target_risk_amount
    }

    pub fn normalize(&self, metrics: &TradeMetrics) -> NormalizedMetrics {
        let actual_risk = metrics.initial_risk_amount;

        let factor = if actual_risk.is_zero() || actual_risk < self.min_risk_amount {
            None
        } else {
            self.target_risk_amount.checked_div(actual_risk)
        };

        if factor.is_none() {
            tracing::warn!(
                trade_id = %metrics.trade_id,
                risk = %actual_risk,
                min_risk = %self.min_risk_amount,
                "Initial risk too small to normalize; excluding trade from normalized stats."
            );
        }

        let excluded = factor.is_none();
        let factor = factor.unwrap_or(Decimal::ONE);
        let scale = |value: Option<Decimal>| value.and_then(|v| v.checked_mul(factor));

        NormalizedMetrics {
            factor,
            target_risk_amount: self.target_risk_amount,
            realized_pnl: scale(metrics.realized_pnl),
            realized_pnl_percent: scale(metrics.realized_pnl_percent),
            total_pnl: scale(metrics.total_pnl),
            total_pnl_percent: scale(metrics.total_pnl_percent),
            r_ratio: metrics.r_ratio,
            excluded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::calculate_metrics;
    use chrono::NaiveDate;
    use core_types::{Direction, Entry, TickerRef, Trade};
    use rust_decimal_macros::dec;

    fn settings(target_risk_pct: Decimal) -> NormalizationSettings {
        NormalizationSettings {
            target_risk_pct,
            min_risk_amount: dec!(0.01),
        }
    }

    fn closed_long(shares: Decimal, stop: Decimal) -> TradeMetrics {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let trade = Trade::new(
            "n1",
            TickerRef::Id("tkr".into()),
            Direction::Long,
            Entry {
                date: day,
                price: dec!(10),
                shares,
            },
            stop,
        )
        .with_exit(dec!(12), shares, day);
        calculate_metrics(&trade, day)
    }

    #[test]
    fn matching_risk_is_identity() {
        // 1% of 10,000 equals the trade's $100 risk.
        let normalizer = Normalizer::new(&settings(dec!(1)), dec!(10000)).unwrap();
        let metrics = closed_long(dec!(100), dec!(9));
        let normalized = normalizer.normalize(&metrics);

        assert_eq!(normalizer.target_risk_amount(), dec!(100));
        assert_eq!(normalized.factor, Decimal::ONE);
        assert!(!normalized.excluded);
        assert_eq!(normalized.realized_pnl, metrics.realized_pnl);
        assert_eq!(normalized.realized_pnl_percent, metrics.realized_pnl_percent);
        assert_eq!(normalized.r_ratio, metrics.r_ratio);
    }

    #[test]
    fn oversized_trade_is_scaled_down() {
        let normalizer = Normalizer::new(&settings(dec!(1)), dec!(10000)).unwrap();
        // $400 risked against a $100 target.
        let metrics = closed_long(dec!(400), dec!(9));
        let normalized = normalizer.normalize(&metrics);

        assert_eq!(normalized.factor, dec!(0.25));
        assert_eq!(metrics.realized_pnl, Some(dec!(800)));
        assert_eq!(normalized.realized_pnl, Some(dec!(200)));
        assert_eq!(normalized.realized_pnl_percent, Some(dec!(5)));
        assert_eq!(normalized.r_ratio, Some(dec!(2)));
    }

    #[test]
    fn negligible_risk_is_flagged_not_scaled() {
        let normalizer = Normalizer::new(&settings(dec!(1)), dec!(10000)).unwrap();
        let metrics = closed_long(dec!(100), dec!(10));
        let normalized = normalizer.normalize(&metrics);

        assert!(normalized.excluded);
        assert_eq!(normalized.factor, Decimal::ONE);
        assert_eq!(normalized.realized_pnl, metrics.realized_pnl);
    }

    #[test]
    fn missing_equity_or_target_is_a_configuration_error() {
        assert!(matches!(
            Normalizer::new(&settings(dec!(1)), Decimal::ZERO),
            Err(AnalyticsError::Configuration(_))
        ));
        assert!(matches!(
            Normalizer::new(&settings(Decimal::ZERO), dec!(10000)),
            Err(AnalyticsError::Configuration(_))
        ));
    }
}

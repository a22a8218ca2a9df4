use crate::error::AnalyticsError;
use crate::metrics::{TradeMetrics, calculate_metrics};
use crate::normalization::Normalizer;
use crate::report::{PortfolioAnalysis, RejectedTrade, TradeAnalysis, TradeStats};
use crate::stats::{PnlView, aggregate};
use chrono::NaiveDate;
use configuration::NormalizationSettings;
use core_types::{Trade, TradeStatus};
use rust_decimal::Decimal;

/// A stateless calculator for deriving performance metrics from journal trades.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    normalization: NormalizationSettings,
}

impl AnalyticsEngine {
    pub fn new(normalization: NormalizationSettings) -> Self {
        Self { normalization }
    }

    /// Validates one trade and derives its metrics.
    pub fn analyze_trade(&self, trade: &Trade, as_of: NaiveDate) -> Result<TradeMetrics, AnalyticsError> {
        trade.validate()?;
        Ok(calculate_metrics(trade, as_of))
    }

    /// The main entry point: analyses a snapshot of trades.
    ///
    /// # Arguments
    ///
    /// * `trades` - The snapshot, in any order.
    /// * `equity` - Account equity, used to size the normalization target.
    /// * `as_of` - The date unfinished trades are measured up to.
    ///
    /// Malformed trades are skipped and listed in `rejected`. A missing or zero
    /// equity/target withholds the normalized view but leaves raw figures intact.
    pub fn evaluate(&self, trades: &[Trade], equity: Decimal, as_of: NaiveDate) -> PortfolioAnalysis {
        let normalizer = Normalizer::new(&self.normalization, equity);
        if let Err(e) = &normalizer {
            tracing::warn!(error = %e, "Normalized statistics unavailable.");
        }

        let mut analyses = Vec::with_capacity(trades.len());
        let mut rejected = Vec::new();

        for trade in trades {
            match self.analyze_trade(trade, as_of) {
                Ok(metrics) => {
                    tracing::debug!(
                        trade_id = %metrics.trade_id,
                        status = ?metrics.status,
                        pnl = ?metrics.total_pnl,
                        r = ?metrics.r_ratio,
                        "Trade analysed."
                    );
                    let normalized = normalizer.as_ref().ok().map(|n| n.normalize(&metrics));
                    analyses.push(TradeAnalysis { metrics, normalized });
                }
                Err(e) => {
                    tracing::warn!(trade_id = %trade.id, error = %e, "Skipping malformed trade.");
                    rejected.push(RejectedTrade {
                        trade_id: trade.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let stats = Self::summarize(&analyses, normalizer.err().map(|e| e.to_string()));

        tracing::info!(
            analysed = analyses.len(),
            rejected = rejected.len(),
            classified = stats.raw.total_trades,
            open = stats.open_trades,
            "Analysis pass complete."
        );

        PortfolioAnalysis {
            trades: analyses,
            stats,
            rejected,
        }
    }

    /// Aggregates already-analysed trades into raw and normalized statistics.
    pub fn summarize(analyses: &[TradeAnalysis], normalization_unavailable: Option<String>) -> TradeStats {
        let normalized = normalization_unavailable
            .is_none()
            .then(|| aggregate(analyses, PnlView::Normalized));

        let excluded_from_normalized = analyses
            .iter()
            .filter(|a| a.normalized.as_ref().is_some_and(|n| n.excluded))
            .map(|a| a.metrics.trade_id.clone())
            .collect();

        TradeStats {
            raw: aggregate(analyses, PnlView::Raw),
            normalized,
            open_trades: analyses
                .iter()
                .filter(|a| a.metrics.status == TradeStatus::Open)
                .count(),
            excluded_from_normalized,
            normalization_unavailable,
        }
    }
}

use crate::metrics::TradeMetrics;
use crate::normalization::NormalizedMetrics;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Portfolio-level performance figures for one view (raw or normalized) of a trade set.
///
/// Ratios that have no meaningful value (no losses, no trades, ...) are `None`
/// rather than infinite, so the struct always serializes cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    // I. Trade counts
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub break_even_trades: usize,
    pub batting_average: Decimal,

    // II. Win / loss profile
    pub average_win_percent: Option<Decimal>,
    pub average_loss_percent: Option<Decimal>,
    pub win_loss_ratio: Option<Decimal>,
    pub adjusted_win_loss_ratio: Option<Decimal>,
    pub average_r_ratio: Option<Decimal>,
    pub profit_factor: Option<Decimal>,
    pub expectancy: Option<Decimal>,

    // III. Holding periods
    pub average_days_held_winners: Option<Decimal>,
    pub average_days_held_losers: Option<Decimal>,

    // IV. Extremes
    pub max_gain_percent: Option<Decimal>,
    pub max_loss_percent: Option<Decimal>,
    pub max_gain_loss_ratio: Option<Decimal>,

    // V. Totals
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub total_profit_loss: Decimal,
    pub total_profit_loss_percent: Decimal,
}

impl PerformanceStats {
    /// Creates zeroed-out stats, the result for an empty trade set.
    pub fn new() -> Self {
        Self {
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            break_even_trades: 0,
            batting_average: Decimal::ZERO,
            average_win_percent: None,
            average_loss_percent: None,
            win_loss_ratio: None,
            adjusted_win_loss_ratio: None,
            average_r_ratio: None,
            profit_factor: None,
            expectancy: None,
            average_days_held_winners: None,
            average_days_held_losers: None,
            max_gain_percent: None,
            max_loss_percent: None,
            max_gain_loss_ratio: None,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            total_profit_loss: Decimal::ZERO,
            total_profit_loss_percent: Decimal::ZERO,
        }
    }
}

impl Default for PerformanceStats {
    fn default() -> Self {
        Self::new()
    }
}

/// The journal's statistics: raw figures plus the risk-normalized view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStats {
    #[serde(flatten)]
    pub raw: PerformanceStats,
    /// `None` when normalization could not be configured (see `normalization_unavailable`).
    pub normalized: Option<PerformanceStats>,
    /// Open trades are analysed but not classified as winners or losers.
    pub open_trades: usize,
    /// Trades left out of the normalized view because their risk was negligible.
    pub excluded_from_normalized: Vec<String>,
    pub normalization_unavailable: Option<String>,
}

/// A single trade's metrics together with its normalized view, when available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeAnalysis {
    pub metrics: TradeMetrics,
    pub normalized: Option<NormalizedMetrics>,
}

/// A trade that failed validation and was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedTrade {
    pub trade_id: String,
    pub reason: String,
}

/// The full result of one analysis pass over a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalysis {
    pub trades: Vec<TradeAnalysis>,
    pub stats: TradeStats,
    pub rejected: Vec<RejectedTrade>,
}

use crate::math::{mean, ratio};
use crate::report::{PerformanceStats, TradeAnalysis};
use core_types::TradeStatus;
use rust_decimal::Decimal;

/// Which P&L figures an aggregation pass reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnlView {
    Raw,
    Normalized,
}

/// One classified trade as the aggregator sees it.
#[derive(Debug, Clone, Copy)]
struct Outcome {
    pnl: Decimal,
    pnl_percent: Decimal,
    days_held: i64,
}

impl PnlView {
    /// The trade's realized outcome in this view, if it takes part in win/loss classification.
    ///
    /// Open trades have nothing realized and never qualify. In the normalized
    /// view, trades without a usable normalization are skipped as well.
    fn outcome(&self, analysis: &TradeAnalysis) -> Option<Outcome> {
        let metrics = &analysis.metrics;
        if metrics.status == TradeStatus::Open {
            return None;
        }

        let (pnl, pnl_percent) = match self {
            PnlView::Raw => (metrics.realized_pnl?, metrics.realized_pnl_percent?),
            PnlView::Normalized => {
                let normalized = analysis.normalized.as_ref().filter(|n| !n.excluded)?;
                (normalized.realized_pnl?, normalized.realized_pnl_percent?)
            }
        };

        Some(Outcome {
            pnl,
            pnl_percent,
            days_held: metrics.days_held,
        })
    }

    fn r_ratio(&self, analysis: &TradeAnalysis) -> Option<Decimal> {
        match self {
            PnlView::Raw => analysis.metrics.r_ratio,
            PnlView::Normalized => analysis
                .normalized
                .as_ref()
                .filter(|n| !n.excluded)
                .and_then(|n| n.r_ratio),
        }
    }
}

/// Folds per-trade analyses into portfolio statistics for the given view.
///
/// Input order does not matter. An empty slice yields zeroed stats.
///
/// `adjusted_win_loss_ratio` is `win_loss_ratio * BA / (1 - BA)`, where BA is
/// the batting average: at an equal win/loss ratio a higher hit rate scores
/// higher, and at BA = 0.5 it equals the plain ratio.
///
/// `max_gain_percent` is the largest winner and `max_loss_percent` the deepest
/// loser. Each stays `None` when its side has no trades, so a book of only
/// losers never reports a "max gain" that is itself a loss.
pub fn aggregate(analyses: &[TradeAnalysis], view: PnlView) -> PerformanceStats {
    let mut stats = PerformanceStats::new();

    let average_r_ratio = mean(analyses.iter().filter_map(|a| view.r_ratio(a)));
    stats.average_r_ratio = average_r_ratio;

    let outcomes: Vec<Outcome> = analyses.iter().filter_map(|a| view.outcome(a)).collect();
    if outcomes.is_empty() {
        return stats;
    }

    let winners: Vec<&Outcome> = outcomes.iter().filter(|o| o.pnl > Decimal::ZERO).collect();
    let losers: Vec<&Outcome> = outcomes.iter().filter(|o| o.pnl < Decimal::ZERO).collect();

    stats.total_trades = outcomes.len();
    stats.winning_trades = winners.len();
    stats.losing_trades = losers.len();
    stats.break_even_trades = outcomes.len() - winners.len() - losers.len();

    let batting_average =
        ratio(Decimal::from(winners.len()), Decimal::from(outcomes.len())).unwrap_or_default();
    stats.batting_average = batting_average;

    // --- Win / loss profile ---
    let average_win = mean(winners.iter().map(|o| o.pnl_percent));
    let average_loss = mean(losers.iter().map(|o| o.pnl_percent));
    stats.average_win_percent = average_win;
    stats.average_loss_percent = average_loss;

    stats.win_loss_ratio =
        average_loss.and_then(|loss| ratio(average_win.unwrap_or_default(), loss.abs()));
    stats.adjusted_win_loss_ratio = stats
        .win_loss_ratio
        .and_then(|r| ratio(r * batting_average, Decimal::ONE - batting_average));

    stats.expectancy = Some(
        batting_average * average_win.unwrap_or_default()
            - (Decimal::ONE - batting_average) * average_loss.unwrap_or_default().abs(),
    );

    // --- Totals ---
    stats.gross_profit = winners.iter().map(|o| o.pnl).sum();
    stats.gross_loss = losers.iter().map(|o| o.pnl).sum::<Decimal>().abs();
    stats.profit_factor = ratio(stats.gross_profit, stats.gross_loss);
    stats.total_profit_loss = outcomes.iter().map(|o| o.pnl).sum();
    stats.total_profit_loss_percent = outcomes.iter().map(|o| o.pnl_percent).sum();

    // --- Holding periods ---
    stats.average_days_held_winners = mean(winners.iter().map(|o| Decimal::from(o.days_held)));
    stats.average_days_held_losers = mean(losers.iter().map(|o| Decimal::from(o.days_held)));

    // --- Extremes ---
    stats.max_gain_percent = winners.iter().map(|o| o.pnl_percent).max();
    stats.max_loss_percent = losers.iter().map(|o| o.pnl_percent).min();
    stats.max_gain_loss_ratio = match (stats.max_gain_percent, stats.max_loss_percent) {
        (Some(gain), Some(loss)) => ratio(gain, loss.abs()),
        _ => None,
    };

    stats
}

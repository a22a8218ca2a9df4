use crate::math::{percent_of, ratio};
use chrono::NaiveDate;
use core_types::{Direction, Trade, TradeStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Everything the journal shows for a single trade, derived from its raw record.
///
/// P&L fields are `None` when there is nothing to measure yet (no exits and no
/// current price), which keeps "no data" apart from a genuine break-even.
/// Percent fields are in percent units: a 20% gain is `20`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeMetrics {
    pub trade_id: String,
    pub ticker: String,
    pub tags: Vec<String>,
    pub direction: Direction,
    pub status: TradeStatus,

    pub entry_date: NaiveDate,
    pub entry_price: Decimal,
    pub entry_shares: Decimal,
    pub exited_shares: Decimal,
    pub remaining_shares: Decimal,

    // Risk
    pub initial_stop: Decimal,
    pub effective_stop: Decimal,
    pub initial_risk_amount: Decimal,
    pub initial_risk_percent: Decimal,
    pub risk_amount: Decimal,
    pub risk_percent: Decimal,

    // Profit and loss
    pub realized_pnl: Option<Decimal>,
    pub realized_pnl_percent: Option<Decimal>,
    pub unrealized_pnl: Option<Decimal>,
    pub unrealized_pnl_percent: Option<Decimal>,
    pub total_pnl: Option<Decimal>,
    pub total_pnl_percent: Option<Decimal>,
    pub average_exit_price: Option<Decimal>,

    /// Total P&L as a multiple of the risk taken at entry.
    pub r_ratio: Option<Decimal>,
    pub days_held: i64,
}

/// Derives the metrics of one trade as of the given date.
///
/// The trade is expected to have passed [`Trade::validate`]; the calculator
/// does not repeat those checks, but it never divides by zero either.
/// `as_of` stands in for "today" when measuring how long an unfinished trade
/// has been held.
pub fn calculate_metrics(trade: &Trade, as_of: NaiveDate) -> TradeMetrics {
    let sign = trade.direction.sign();
    let entry_price = trade.entry.price;
    let entry_shares = trade.entry.shares;
    let status = trade.status();
    let exited_shares = trade.exited_shares();
    let remaining_shares = trade.remaining_shares();
    let effective_stop = trade.effective_stop();

    // --- Realized portion ---
    let (realized_pnl, average_exit_price) = if trade.exits.is_empty() {
        (None, None)
    } else {
        let pnl: Decimal = trade
            .exits
            .iter()
            .map(|exit| (exit.price - entry_price) * exit.shares * sign)
            .sum();
        let proceeds: Decimal = trade.exits.iter().map(|exit| exit.price * exit.shares).sum();
        (Some(pnl), ratio(proceeds, exited_shares))
    };
    let realized_pnl_percent =
        realized_pnl.and_then(|pnl| percent_of(pnl, entry_price * exited_shares));

    // --- Unrealized remainder ---
    let unrealized_pnl = match trade.current_price {
        Some(price) if status.is_active() => Some((price - entry_price) * remaining_shares * sign),
        _ => None,
    };
    let unrealized_pnl_percent =
        unrealized_pnl.and_then(|pnl| percent_of(pnl, entry_price * remaining_shares));

    // --- Combined ---
    let total_pnl = match (realized_pnl, unrealized_pnl) {
        (None, None) => None,
        (realized, unrealized) => Some(realized.unwrap_or_default() + unrealized.unwrap_or_default()),
    };
    let covered_shares = if unrealized_pnl.is_some() {
        exited_shares + remaining_shares
    } else {
        exited_shares
    };
    let total_pnl_percent =
        total_pnl.and_then(|pnl| percent_of(pnl, entry_price * covered_shares));

    // --- Risk ---
    let initial_distance = (entry_price - trade.initial_stop).abs();
    let initial_risk_amount = initial_distance * entry_shares;
    let current_distance = (entry_price - effective_stop).abs();
    let risk_amount = current_distance * entry_shares;

    let r_ratio = total_pnl.and_then(|pnl| ratio(pnl, initial_risk_amount));

    // --- Time ---
    let held_until = match status {
        TradeStatus::Closed => trade.last_exit_date().unwrap_or(as_of),
        TradeStatus::Open | TradeStatus::Partial => as_of,
    };
    let days_held = (held_until - trade.entry.date).num_days().max(0);

    TradeMetrics {
        trade_id: trade.id.clone(),
        ticker: trade.ticker.label().to_string(),
        tags: trade.tags.clone(),
        direction: trade.direction,
        status,
        entry_date: trade.entry.date,
        entry_price,
        entry_shares,
        exited_shares,
        remaining_shares,
        initial_stop: trade.initial_stop,
        effective_stop,
        initial_risk_amount,
        initial_risk_percent: percent_of(initial_distance, entry_price).unwrap_or_default(),
        risk_amount,
        risk_percent: percent_of(current_distance, entry_price).unwrap_or_default(),
        realized_pnl,
        realized_pnl_percent,
        unrealized_pnl,
        unrealized_pnl_percent,
        total_pnl,
        total_pnl_percent,
        average_exit_price,
        r_ratio,
        days_held,
    }
}

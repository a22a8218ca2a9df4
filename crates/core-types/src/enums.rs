use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The side of the market a trade was opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Returns `+1` for long trades and `-1` for short trades.
    ///
    /// Multiplying a raw price difference `(exit - entry)` by this sign yields a
    /// P&L that is positive whenever the trade made money.
    pub fn sign(&self) -> Decimal {
        match self {
            Direction::Long => Decimal::ONE,
            Direction::Short => Decimal::NEGATIVE_ONE,
        }
    }
}

/// Lifecycle state of a trade, always derived from entry vs. exited shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Partial,
    Closed,
}

impl TradeStatus {
    /// Derives the status from the entry share count and the cumulative exited shares.
    pub fn derive(entry_shares: Decimal, exited_shares: Decimal) -> Self {
        if exited_shares.is_zero() {
            TradeStatus::Open
        } else if exited_shares >= entry_shares {
            TradeStatus::Closed
        } else {
            TradeStatus::Partial
        }
    }

    /// True while some shares are still held.
    pub fn is_active(&self) -> bool {
        !matches!(self, TradeStatus::Closed)
    }
}

use crate::catalog::TickerRef;
use crate::enums::{Direction, TradeStatus};
use crate::error::DataIntegrityError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest price a record may carry. Together with [`MAX_SHARES`] this keeps
/// every notional and P&L product well inside `Decimal`'s range.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);
/// Largest share count a single fill may carry.
pub const MAX_SHARES: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// The opening fill of a trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub date: NaiveDate,
    pub price: Decimal,
    pub shares: Decimal,
}

/// A change to the protective stop after entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopModification {
    pub price: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A (possibly partial) closing fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exit {
    pub price: Decimal,
    pub shares: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One position's full lifecycle as recorded in the journal.
///
/// Only raw inputs live here. Everything else (status, effective stop, P&L,
/// R-ratio, ...) is recomputed from these fields whenever it is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub ticker: TickerRef,
    pub direction: Direction,
    pub entry: Entry,
    pub initial_stop: Decimal,
    #[serde(default)]
    pub stops: Vec<StopModification>,
    #[serde(default)]
    pub exits: Vec<Exit>,
    #[serde(default)]
    pub current_price: Option<Decimal>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Trade {
    /// Creates a freshly opened trade with no stop changes and no exits.
    pub fn new(
        id: impl Into<String>,
        ticker: impl Into<TickerRef>,
        direction: Direction,
        entry: Entry,
        initial_stop: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            ticker: ticker.into(),
            direction,
            entry,
            initial_stop,
            stops: Vec::new(),
            exits: Vec::new(),
            current_price: None,
            tags: Vec::new(),
            notes: None,
        }
    }

    pub fn with_exit(mut self, price: Decimal, shares: Decimal, date: NaiveDate) -> Self {
        self.exits.push(Exit {
            price,
            shares,
            date,
            reason: None,
            notes: None,
        });
        self
    }

    pub fn with_stop(mut self, price: Decimal, date: NaiveDate) -> Self {
        self.stops.push(StopModification {
            price,
            date,
            notes: None,
        });
        self
    }

    pub fn with_current_price(mut self, price: Decimal) -> Self {
        self.current_price = Some(price);
        self
    }

    pub fn with_tag(mut self, tag_id: impl Into<String>) -> Self {
        self.tags.push(tag_id.into());
        self
    }

    /// Cumulative shares closed across all exits.
    pub fn exited_shares(&self) -> Decimal {
        self.exits.iter().map(|exit| exit.shares).sum()
    }

    /// Shares still held. Never negative for a validated trade.
    pub fn remaining_shares(&self) -> Decimal {
        (self.entry.shares - self.exited_shares()).max(Decimal::ZERO)
    }

    pub fn status(&self) -> TradeStatus {
        TradeStatus::derive(self.entry.shares, self.exited_shares())
    }

    /// The stop in force now: the latest-dated modification, or the initial stop.
    ///
    /// Modifications sharing a date resolve to the one recorded last.
    pub fn effective_stop(&self) -> Decimal {
        self.stops
            .iter()
            .fold(None::<&StopModification>, |latest, stop| match latest {
                Some(prev) if prev.date > stop.date => Some(prev),
                _ => Some(stop),
            })
            .map_or(self.initial_stop, |stop| stop.price)
    }

    /// Date of the most recent exit, if any.
    pub fn last_exit_date(&self) -> Option<NaiveDate> {
        self.exits.iter().map(|exit| exit.date).max()
    }

    /// Checks the structural invariants of the record.
    pub fn validate(&self) -> Result<(), DataIntegrityError> {
        let trade_id = || self.id.clone();

        if self.entry.shares <= Decimal::ZERO {
            return Err(DataIntegrityError::NonPositiveShares {
                trade_id: trade_id(),
                shares: self.entry.shares,
            });
        }
        if self.entry.price <= Decimal::ZERO {
            return Err(DataIntegrityError::NonPositiveEntryPrice {
                trade_id: trade_id(),
                price: self.entry.price,
            });
        }

        self.check_ranges()?;

        let stop_prices = std::iter::once(self.initial_stop).chain(self.stops.iter().map(|s| s.price));
        for price in stop_prices {
            if price.is_sign_negative() {
                return Err(DataIntegrityError::NegativeStopPrice {
                    trade_id: trade_id(),
                    price,
                });
            }
        }

        for stop in &self.stops {
            if stop.date < self.entry.date {
                return Err(DataIntegrityError::StopBeforeEntry {
                    trade_id: trade_id(),
                    stop_date: stop.date,
                    entry_date: self.entry.date,
                });
            }
        }

        for (index, exit) in self.exits.iter().enumerate() {
            if exit.shares <= Decimal::ZERO || exit.price.is_sign_negative() {
                return Err(DataIntegrityError::InvalidExit {
                    trade_id: trade_id(),
                    index,
                    shares: exit.shares,
                    price: exit.price,
                });
            }
            if exit.date < self.entry.date {
                return Err(DataIntegrityError::ExitBeforeEntry {
                    trade_id: trade_id(),
                    exit_date: exit.date,
                    entry_date: self.entry.date,
                });
            }
        }

        let exited = self.exited_shares();
        if exited > self.entry.shares {
            return Err(DataIntegrityError::ExitedSharesExceedEntry {
                trade_id: trade_id(),
                exited,
                entry: self.entry.shares,
            });
        }

        Ok(())
    }

    fn check_ranges(&self) -> Result<(), DataIntegrityError> {
        let prices = [("entry price", self.entry.price), ("initial stop", self.initial_stop)]
            .into_iter()
            .chain(self.stops.iter().map(|s| ("stop price", s.price)))
            .chain(self.exits.iter().map(|e| ("exit price", e.price)))
            .chain(self.current_price.map(|p| ("current price", p)));
        let shares = std::iter::once(("entry shares", self.entry.shares))
            .chain(self.exits.iter().map(|e| ("exit shares", e.shares)));

        let bounded = prices
            .map(|(field, value)| (field, value, MAX_PRICE))
            .chain(shares.map(|(field, value)| (field, value, MAX_SHARES)));
        for (field, value, max) in bounded {
            if value > max || (field == "current price" && value.is_sign_negative()) {
                return Err(DataIntegrityError::ValueOutOfRange {
                    trade_id: self.id.clone(),
                    field,
                    value,
                    max,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn long_trade() -> Trade {
        Trade::new(
            "t1",
            TickerRef::Id("tkr-1".into()),
            Direction::Long,
            Entry {
                date: day(2),
                price: dec!(10),
                shares: dec!(100),
            },
            dec!(9),
        )
    }

    #[test]
    fn status_follows_exited_shares() {
        let trade = long_trade();
        assert_eq!(trade.status(), TradeStatus::Open);

        let trade = trade.with_exit(dec!(11), dec!(40), day(5));
        assert_eq!(trade.status(), TradeStatus::Partial);
        assert_eq!(trade.remaining_shares(), dec!(60));

        let trade = trade.with_exit(dec!(12), dec!(60), day(9));
        assert_eq!(trade.status(), TradeStatus::Closed);
        assert_eq!(trade.last_exit_date(), Some(day(9)));
    }

    #[test]
    fn effective_stop_is_latest_modification() {
        let trade = long_trade();
        assert_eq!(trade.effective_stop(), dec!(9));

        let trade = trade
            .with_stop(dec!(9.5), day(4))
            .with_stop(dec!(10.5), day(8))
            .with_stop(dec!(9.8), day(6));
        assert_eq!(trade.effective_stop(), dec!(10.5));

        let trade = trade.with_stop(dec!(11), day(8));
        assert_eq!(trade.effective_stop(), dec!(11));
    }

    #[test]
    fn validate_rejects_exit_before_entry() {
        let trade = long_trade().with_exit(dec!(12), dec!(100), day(1));
        assert!(matches!(
            trade.validate(),
            Err(DataIntegrityError::ExitBeforeEntry { .. })
        ));
    }

    #[test]
    fn validate_rejects_over_exit_and_zero_shares() {
        let trade = long_trade()
            .with_exit(dec!(12), dec!(60), day(3))
            .with_exit(dec!(12), dec!(60), day(4));
        let err = trade.validate().unwrap_err();
        assert_eq!(err.trade_id(), "t1");
        assert!(matches!(err, DataIntegrityError::ExitedSharesExceedEntry { .. }));

        let mut zero = long_trade();
        zero.entry.shares = Decimal::ZERO;
        assert!(matches!(
            zero.validate(),
            Err(DataIntegrityError::NonPositiveShares { .. })
        ));
    }

    #[test]
    fn validate_rejects_stop_before_entry() {
        let trade = long_trade().with_stop(dec!(9.5), day(1));
        assert!(matches!(
            trade.validate(),
            Err(DataIntegrityError::StopBeforeEntry { .. })
        ));
        assert!(long_trade().with_stop(dec!(9.5), day(2)).validate().is_ok());
    }

    #[test]
    fn validate_rejects_values_beyond_decimal_headroom() {
        let mut huge = long_trade();
        huge.entry.shares = dec!(1_000_000_000_000_000);
        huge.entry.price = dec!(1_000_000_000_000_000);
        let err = huge.validate().unwrap_err();
        assert!(matches!(
            err,
            DataIntegrityError::ValueOutOfRange { field: "entry price", .. }
        ));

        let exit = long_trade().with_exit(dec!(2_000_000_000_000_000), dec!(100), day(3));
        assert!(matches!(
            exit.validate(),
            Err(DataIntegrityError::ValueOutOfRange { field: "exit price", .. })
        ));

        let marked = long_trade().with_current_price(dec!(-1));
        assert!(matches!(
            marked.validate(),
            Err(DataIntegrityError::ValueOutOfRange { field: "current price", .. })
        ));

        let mut at_limit = long_trade().with_exit(MAX_PRICE, MAX_SHARES, day(3));
        at_limit.entry.shares = MAX_SHARES;
        at_limit.entry.price = MAX_PRICE;
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn deserializes_content_api_shape() {
        let json = r#"{
            "id": "trade-42",
            "ticker": {"id": "tkr-nvda", "symbol": "NVDA"},
            "direction": "short",
            "entry": {"date": "2024-02-01", "price": "20", "shares": "50"},
            "initialStop": "22",
            "stops": [{"price": "21", "date": "2024-02-03", "notes": "tighten"}],
            "exits": [{"price": "18", "shares": "20", "date": "2024-02-05", "reason": "target 1"}],
            "currentPrice": "19",
            "tags": ["tag-pullback"]
        }"#;
        let trade: Trade = serde_json::from_str(json).unwrap();
        assert_eq!(trade.direction, Direction::Short);
        assert_eq!(trade.status(), TradeStatus::Partial);
        assert_eq!(trade.effective_stop(), dec!(21));
        assert_eq!(trade.ticker.label(), "NVDA");
        assert!(trade.validate().is_ok());
    }

    proptest! {
        #[test]
        fn status_partition_is_total_and_exclusive(
            entry_shares in 1u32..1_000,
            exits in proptest::collection::vec(1u32..200, 0..6),
        ) {
            let mut trade = long_trade();
            trade.entry.shares = Decimal::from(entry_shares);
            for shares in exits {
                trade = trade.with_exit(dec!(11), Decimal::from(shares), day(3));
            }
            let exited = trade.exited_shares();
            let expected = if trade.exits.is_empty() {
                TradeStatus::Open
            } else if exited == trade.entry.shares {
                TradeStatus::Closed
            } else {
                TradeStatus::Partial
            };
            match trade.validate() {
                Ok(()) => prop_assert_eq!(trade.status(), expected),
                Err(err) => {
                    let over_exited = matches!(err, DataIntegrityError::ExitedSharesExceedEntry { .. });
                    prop_assert!(over_exited);
                    prop_assert!(exited > trade.entry.shares);
                }
            }
        }
    }
}

use crate::error::RiskError;
use configuration::ExposureSettings;
use core_types::Trade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One capacity slot and the positions placed in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub index: usize,
    /// Capacity as a percent of equity (100 with the default four buckets at 400%).
    pub capacity_pct: Decimal,
    /// Sum of the constituents' position values as a percent of equity.
    pub exposure_pct: Decimal,
    /// `exposure_pct` as a percent of this bucket's capacity.
    pub occupied_pct: Decimal,
    pub trade_ids: Vec<String>,
    /// Set when the bucket's current exposure exceeds its capacity.
    pub overflow: bool,
}

/// Where a single open position was placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionAllocation {
    pub trade_id: String,
    pub bucket: usize,
    pub position_value: Decimal,
    pub exposure_pct: Decimal,
}

/// An open trade that could not be placed because its record is malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedTrade {
    pub trade_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureReport {
    pub buckets: Vec<Bucket>,
    pub positions: Vec<PositionAllocation>,
    /// Gross exposure of all open positions as a percent of equity.
    pub total_exposure_pct: Decimal,
    pub target_exposure_pct: Decimal,
    /// `total_exposure_pct` as a percent of the target.
    pub utilization_pct: Decimal,
    pub overflowed: bool,
    pub skipped: Vec<SkippedTrade>,
}

/// Places open and partially closed positions into equal-capacity buckets.
///
/// Placement policy: positions are taken in `(entry date, trade id)` order and
/// each one goes to the bucket holding the least entry notional so far, the
/// lowest index winning ties. A placement depends only on the entry fills of
/// the positions before it, so recording a newer trade, a price move or a
/// partial exit never moves existing ones. Reported exposure uses the current
/// value; positions that do not fit are still placed and the bucket is
/// flagged as overflowing.
#[derive(Debug, Clone)]
pub struct ExposureAllocator {
    bucket_count: usize,
    target_exposure_pct: Decimal,
    capacity_pct: Decimal,
}

impl ExposureAllocator {
    pub fn new(settings: &ExposureSettings) -> Result<Self, RiskError> {
        if settings.target_exposure_pct <= Decimal::ZERO {
            return Err(RiskError::InvalidParameters(format!(
                "target_exposure_pct must be greater than 0 (got {})",
                settings.target_exposure_pct
            )));
        }
        let capacity_pct = settings.bucket_capacity_pct().ok_or_else(|| {
            RiskError::InvalidParameters("bucket_count must be at least 1".to_string())
        })?;

        Ok(Self {
            bucket_count: settings.bucket_count,
            target_exposure_pct: settings.target_exposure_pct,
            capacity_pct,
        })
    }

    pub fn allocate(&self, trades: &[Trade], equity: Decimal) -> Result<ExposureReport, RiskError> {
        if equity <= Decimal::ZERO {
            return Err(RiskError::InsufficientEquity(equity));
        }

        let mut skipped = Vec::new();
        let mut open: Vec<&Trade> = Vec::new();
        for trade in trades {
            if let Err(e) = trade.validate() {
                tracing::warn!(trade_id = %trade.id, error = %e, "Skipping malformed trade in exposure.");
                skipped.push(SkippedTrade {
                    trade_id: trade.id.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
            if trade.status().is_active() {
                open.push(trade);
            }
        }
        open.sort_by(|a, b| a.entry.date.cmp(&b.entry.date).then_with(|| a.id.cmp(&b.id)));

        let mut buckets: Vec<Bucket> = (0..self.bucket_count)
            .map(|index| Bucket {
                index,
                capacity_pct: self.capacity_pct,
                exposure_pct: Decimal::ZERO,
                occupied_pct: Decimal::ZERO,
                trade_ids: Vec::new(),
                overflow: false,
            })
            .collect();
        // Placement weight is the entry notional, which never changes after
        // the fill. Price moves and partial exits only change what is reported.
        let mut placement_load = vec![Decimal::ZERO; self.bucket_count];
        let mut positions = Vec::with_capacity(open.len());

        for trade in open {
            let price = trade.current_price.unwrap_or(trade.entry.price);
            let sized = trade
                .entry
                .shares
                .checked_mul(trade.entry.price)
                .zip(trade.remaining_shares().checked_mul(price))
                .and_then(|(cost, value)| {
                    let pct = value.checked_div(equity)?.checked_mul(Decimal::ONE_HUNDRED)?;
                    Some((cost, value, pct))
                });
            let Some((entry_cost, position_value, exposure_pct)) = sized else {
                tracing::warn!(trade_id = %trade.id, "Position too large to measure against equity.");
                skipped.push(SkippedTrade {
                    trade_id: trade.id.clone(),
                    reason: "position value out of range for the account equity".to_string(),
                });
                continue;
            };

            // min_by_key keeps the first of equal minima, i.e. the lowest index.
            let Some((index, load)) = placement_load.iter_mut().enumerate().min_by_key(|(_, load)| **load) else {
                break;
            };
            *load = load.checked_add(entry_cost).unwrap_or(Decimal::MAX);

            let bucket = &mut buckets[index];
            bucket.exposure_pct = bucket.exposure_pct.checked_add(exposure_pct).unwrap_or(Decimal::MAX);
            bucket.trade_ids.push(trade.id.clone());
            if bucket.exposure_pct > bucket.capacity_pct && !bucket.overflow {
                bucket.overflow = true;
                tracing::warn!(
                    bucket = bucket.index,
                    trade_id = %trade.id,
                    exposure_pct = %bucket.exposure_pct,
                    capacity_pct = %bucket.capacity_pct,
                    "Exposure bucket over capacity."
                );
            }

            positions.push(PositionAllocation {
                trade_id: trade.id.clone(),
                bucket: index,
                position_value,
                exposure_pct,
            });
        }

        for bucket in &mut buckets {
            bucket.occupied_pct = percent_of(bucket.exposure_pct, bucket.capacity_pct);
        }

        let total_exposure_pct = buckets
            .iter()
            .try_fold(Decimal::ZERO, |sum, b| sum.checked_add(b.exposure_pct))
            .unwrap_or(Decimal::MAX);
        let utilization_pct = percent_of(total_exposure_pct, self.target_exposure_pct);
        let overflowed = buckets.iter().any(|b| b.overflow);

        tracing::info!(
            positions = positions.len(),
            total_exposure_pct = %total_exposure_pct,
            utilization_pct = %utilization_pct,
            "Exposure allocated."
        );

        Ok(ExposureReport {
            buckets,
            positions,
            total_exposure_pct,
            target_exposure_pct: self.target_exposure_pct,
            utilization_pct,
            overflowed,
            skipped,
        })
    }
}

/// `value / base * 100`, saturating at `Decimal::MAX`. `base` is always positive here.
fn percent_of(value: Decimal, base: Decimal) -> Decimal {
    value
        .checked_div(base)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{Direction, Entry, TickerRef};
    use rust_decimal_macros::dec;

    fn settings(bucket_count: usize, target_exposure_pct: Decimal) -> ExposureSettings {
        ExposureSettings {
            bucket_count,
            target_exposure_pct,
        }
    }

    fn open_trade(id: &str, day: u32, price: Decimal, shares: Decimal) -> Trade {
        Trade::new(
            id,
            TickerRef::Id(format!("tkr-{id}")),
            Direction::Long,
            Entry {
                date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
                price,
                shares,
            },
            price - Decimal::ONE,
        )
    }

    #[test]
    fn four_equal_positions_fill_four_buckets() {
        let allocator = ExposureAllocator::new(&settings(4, dec!(400))).unwrap();
        // 100 shares at $25 = $2,500 = 25% of $10,000 equity each.
        let trades: Vec<Trade> = (1..=4)
            .map(|i| open_trade(&format!("t{i}"), i, dec!(25), dec!(100)))
            .collect();

        let report = allocator.allocate(&trades, dec!(10000)).unwrap();

        assert_eq!(report.buckets.len(), 4);
        for (i, bucket) in report.buckets.iter().enumerate() {
            assert_eq!(bucket.capacity_pct, dec!(100));
            assert_eq!(bucket.occupied_pct, dec!(25));
            assert_eq!(bucket.trade_ids, vec![format!("t{}", i + 1)]);
            assert!(!bucket.overflow);
        }
        assert_eq!(report.total_exposure_pct, dec!(100));
        assert_eq!(report.target_exposure_pct, dec!(400));
        assert_eq!(report.utilization_pct, dec!(25));
        assert!(!report.overflowed);
    }

    #[test]
    fn appending_a_newer_trade_keeps_existing_placements() {
        let allocator = ExposureAllocator::new(&settings(4, dec!(400))).unwrap();
        let mut trades = vec![
            open_trade("c", 3, dec!(10), dec!(300)),
            open_trade("a", 1, dec!(10), dec!(500)),
            open_trade("b", 2, dec!(10), dec!(100)),
        ];
        let before = allocator.allocate(&trades, dec!(10000)).unwrap();

        trades.push(open_trade("d", 9, dec!(10), dec!(50)));
        let after = allocator.allocate(&trades, dec!(10000)).unwrap();

        assert_eq!(&after.positions[..3], &before.positions[..]);
        assert_eq!(after.positions[3].trade_id, "d");
        assert_eq!(after.positions[3].bucket, 3);
    }

    #[test]
    fn price_moves_and_partial_exits_keep_placements() {
        let allocator = ExposureAllocator::new(&settings(4, dec!(400))).unwrap();
        let mut trades = vec![
            open_trade("a", 1, dec!(10), dec!(100)),
            open_trade("b", 2, dec!(10), dec!(200)),
            open_trade("c", 3, dec!(10), dec!(300)),
            open_trade("d", 4, dec!(10), dec!(400)),
            open_trade("e", 5, dec!(10), dec!(50)),
        ];
        let buckets_of = |report: &ExposureReport| -> Vec<(String, usize)> {
            report
                .positions
                .iter()
                .map(|p| (p.trade_id.clone(), p.bucket))
                .collect()
        };
        let before = allocator.allocate(&trades, dec!(10000)).unwrap();
        assert_eq!(before.positions[4].bucket, 0);

        trades[0].current_price = Some(dec!(50));
        let repriced = allocator.allocate(&trades, dec!(10000)).unwrap();
        assert_eq!(buckets_of(&repriced), buckets_of(&before));
        assert_eq!(repriced.positions[0].position_value, dec!(5000));
        assert_eq!(repriced.buckets[0].exposure_pct, dec!(55));

        trades[2] = trades[2]
            .clone()
            .with_exit(dec!(11), dec!(250), NaiveDate::from_ymd_opt(2024, 4, 6).unwrap());
        let trimmed = allocator.allocate(&trades, dec!(10000)).unwrap();
        assert_eq!(buckets_of(&trimmed), buckets_of(&before));
        assert_eq!(trimmed.positions[2].position_value, dec!(500));
    }

    #[test]
    fn oversized_position_against_tiny_equity_is_skipped() {
        let allocator = ExposureAllocator::new(&settings(4, dec!(400))).unwrap();
        let trades = vec![open_trade("big", 1, dec!(1000000000), dec!(1000000000000))];

        let report = allocator.allocate(&trades, dec!(0.0000000000000000000000000001)).unwrap();

        assert!(report.positions.is_empty());
        assert_eq!(report.skipped[0].trade_id, "big");
        assert_eq!(report.total_exposure_pct, Decimal::ZERO);
    }

    #[test]
    fn overflow_is_flagged_not_clipped() {
        let allocator = ExposureAllocator::new(&settings(2, dec!(200))).unwrap();
        let trades = vec![
            open_trade("a", 1, dec!(10), dec!(800)),
            open_trade("b", 2, dec!(10), dec!(800)),
            open_trade("c", 3, dec!(10), dec!(800)),
        ];

        let report = allocator.allocate(&trades, dec!(10000)).unwrap();

        assert!(report.overflowed);
        assert_eq!(report.buckets[0].trade_ids, vec!["a", "c"]);
        assert_eq!(report.buckets[0].occupied_pct, dec!(160));
        assert!(report.buckets[0].overflow);
        assert!(!report.buckets[1].overflow);
        assert_eq!(report.total_exposure_pct, dec!(240));
        assert_eq!(report.utilization_pct, dec!(120));
    }

    #[test]
    fn uses_remaining_shares_and_current_price() {
        let allocator = ExposureAllocator::new(&settings(4, dec!(400))).unwrap();
        let partial = open_trade("p", 1, dec!(10), dec!(100))
            .with_exit(dec!(12), dec!(60), NaiveDate::from_ymd_opt(2024, 4, 5).unwrap())
            .with_current_price(dec!(15));
        let closed = open_trade("x", 1, dec!(10), dec!(100))
            .with_exit(dec!(12), dec!(100), NaiveDate::from_ymd_opt(2024, 4, 5).unwrap());

        let report = allocator.allocate(&[partial, closed], dec!(1000)).unwrap();

        assert_eq!(report.positions.len(), 1);
        assert_eq!(report.positions[0].position_value, dec!(600));
        assert_eq!(report.positions[0].exposure_pct, dec!(60));
    }

    #[test]
    fn malformed_open_trades_are_skipped() {
        let allocator = ExposureAllocator::new(&settings(4, dec!(400))).unwrap();
        let bad = open_trade("bad", 5, dec!(10), dec!(100))
            .with_exit(dec!(11), dec!(10), NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());

        let report = allocator.allocate(&[bad], dec!(1000)).unwrap();

        assert!(report.positions.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].trade_id, "bad");
    }

    #[test]
    fn rejects_bad_configuration_and_equity() {
        assert!(matches!(
            ExposureAllocator::new(&settings(0, dec!(400))),
            Err(RiskError::InvalidParameters(_))
        ));
        assert!(matches!(
            ExposureAllocator::new(&settings(4, Decimal::ZERO)),
            Err(RiskError::InvalidParameters(_))
        ));

        let allocator = ExposureAllocator::new(&settings(4, dec!(400))).unwrap();
        assert_eq!(
            allocator.allocate(&[], Decimal::ZERO),
            Err(RiskError::InsufficientEquity(Decimal::ZERO))
        );
    }

    #[test]
    fn empty_book_reports_zero_utilization() {
        let allocator = ExposureAllocator::new(&settings(4, dec!(400))).unwrap();
        let report = allocator.allocate(&[], dec!(5000)).unwrap();
        assert_eq!(report.total_exposure_pct, Decimal::ZERO);
        assert_eq!(report.utilization_pct, Decimal::ZERO);
        assert!(report.buckets.iter().all(|b| b.trade_ids.is_empty()));
    }
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// A trade record that violates the journal's structural invariants.
///
/// These are reported back to the caller per trade; they never abort work on
/// the rest of a snapshot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataIntegrityError {
    #[error("Trade '{trade_id}' has a non-positive entry share count ({shares})")]
    NonPositiveShares { trade_id: String, shares: Decimal },

    #[error("Trade '{trade_id}' has a non-positive entry price ({price})")]
    NonPositiveEntryPrice { trade_id: String, price: Decimal },

    #[error("Trade '{trade_id}' has a negative stop price ({price})")]
    NegativeStopPrice { trade_id: String, price: Decimal },

    #[error("Trade '{trade_id}' exit #{index} has invalid shares ({shares}) or price ({price})")]
    InvalidExit {
        trade_id: String,
        index: usize,
        shares: Decimal,
        price: Decimal,
    },

    #[error("Trade '{trade_id}' exited {exited} shares but only {entry} were entered")]
    ExitedSharesExceedEntry {
        trade_id: String,
        exited: Decimal,
        entry: Decimal,
    },

    #[error("Trade '{trade_id}' has an exit dated {exit_date}, before its entry on {entry_date}")]
    ExitBeforeEntry {
        trade_id: String,
        exit_date: NaiveDate,
        entry_date: NaiveDate,
    },

    #[error("Trade '{trade_id}' has {field} {value} outside the supported range (0 to {max})")]
    ValueOutOfRange {
        trade_id: String,
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },

    #[error("Trade '{trade_id}' has a stop modification dated {stop_date}, before its entry on {entry_date}")]
    StopBeforeEntry {
        trade_id: String,
        stop_date: NaiveDate,
        entry_date: NaiveDate,
    },
}

impl DataIntegrityError {
    /// The id of the offending trade.
    pub fn trade_id(&self) -> &str {
        match self {
            DataIntegrityError::NonPositiveShares { trade_id, .. }
            | DataIntegrityError::NonPositiveEntryPrice { trade_id, .. }
            | DataIntegrityError::NegativeStopPrice { trade_id, .. }
            | DataIntegrityError::InvalidExit { trade_id, .. }
            | DataIntegrityError::ExitedSharesExceedEntry { trade_id, .. }
            | DataIntegrityError::ExitBeforeEntry { trade_id, .. }
            | DataIntegrityError::StopBeforeEntry { trade_id, .. }
            | DataIntegrityError::ValueOutOfRange { trade_id, .. } => trade_id,
        }
    }
}

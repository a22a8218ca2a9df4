//! # Journal Exposure
//!
//! Spreads the journal's open positions across a fixed set of capacity buckets
//! and reports how much of the gross exposure target is in use.

pub mod error;
pub mod exposure;

pub use error::RiskError;
pub use exposure::{Bucket, ExposureAllocator, ExposureReport, PositionAllocation, SkippedTrade};

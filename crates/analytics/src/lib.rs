//! # Journal Analytics Engine
//!
//! Turns a snapshot of journal trades into per-trade metrics and
//! portfolio-level statistics.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** No I/O, no clock. The caller supplies the snapshot, the
//!   equity figure and the as-of date, so re-running a pass on the same input
//!   yields identical output.
//! - **Derived, never stored:** Status, stops, P&L and R-ratios are recomputed
//!   from the raw trade record on every pass.
//! - **Undefined is not zero:** Ratios without a meaningful value are `None`.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: validates trades and runs a full analysis pass.
//! - `calculate_metrics`: the per-trade Metrics Calculator.
//! - `Normalizer`: rescales outcomes to a common risk unit.
//! - `aggregate` / `PnlView`: folds analyses into `PerformanceStats`.
//! - `breakdown_by_ticker` / `breakdown_by_tag`: grouped statistics.

// Declare the modules that constitute this crate.
pub mod breakdown;
pub mod engine;
pub mod error;
mod math;
pub mod metrics;
pub mod normalization;
pub mod report;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use breakdown::{breakdown_by_tag, breakdown_by_ticker};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use metrics::{TradeMetrics, calculate_metrics};
pub use normalization::{NormalizedMetrics, Normalizer};
pub use report::{PerformanceStats, PortfolioAnalysis, RejectedTrade, TradeAnalysis, TradeStats};
pub use stats::{PnlView, aggregate};

//! # Journal Core Types
//!
//! The trade record model shared by every crate in the workspace, together with
//! the read-only catalog entities (tickers, tags, media, charts) published by the
//! content API.
//!
//! Records here hold raw inputs only. Derived values such as status or the stop
//! currently in force are computed on read.

pub mod catalog;
pub mod enums;
pub mod error;
pub mod trade;

// Re-export the core types to provide a clean public API.
pub use catalog::{Chart, Media, Tag, Ticker, TickerRef};
pub use enums::{Direction, TradeStatus};
pub use error::DataIntegrityError;
pub use trade::{Entry, Exit, MAX_PRICE, MAX_SHARES, StopModification, Trade};

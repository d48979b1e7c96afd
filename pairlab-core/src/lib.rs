//! PairLab Core: price ingestion, date alignment, spread statistics and the
//! pairs-trading simulation.
//!
//! This crate contains the whole backtest engine:
//! - Domain types (price series, aligned records, round-trip trades)
//! - NASDAQ-style CSV normalization and inner-join alignment on date
//! - Static spread thresholds (mean ± k standard deviations)
//! - A bar-by-bar position state machine (`Flat`, `ShortHigh`, `LongHigh`)
//! - Return and risk metrics over the portfolio-value curve
//!
//! Everything here is synchronous and free of shared state: one call to
//! [`engine::run_backtest`] reads its inputs and returns a fresh report.

pub mod data;
pub mod domain;
pub mod engine;
pub mod metrics;
pub mod stats;

pub use data::{load_price_series, InputOrder, MalformedInputError};
pub use domain::{AlignedRecord, PairTrade, PositionMode, PricePoint, PriceSeries};
pub use engine::{
    run_backtest, BacktestError, EngineParams, PerformanceReport, StatisticsWarning, Valuation,
};
pub use stats::{Dispersion, SpreadStats};

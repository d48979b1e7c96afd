//! PairLab Runner: config, file loading, chart overlays and artifact export.
//!
//! This crate builds on `pairlab-core` to provide:
//! - TOML backtest configuration with defaults and validation
//! - Loading both price files of a pair, with a dataset hash for reproducibility
//! - A single-run entry point returning the report plus run identity
//! - Chart overlay data driven by display flags
//! - JSON, CSV and Markdown artifacts

pub mod config;
pub mod data_loader;
pub mod export;
pub mod overlay;
pub mod runner;

pub use config::{BacktestConfig, ConfigError, DisplayFlags, PairConfig, StrategyConfig};
pub use data_loader::{compute_dataset_hash, load_pair, LoadedPair};
pub use export::{generate_report, save_artifacts};
pub use overlay::{Axis, ChartOverlay, LineKind, MarkerKind, OverlayLine, SignalMarker};
pub use runner::{
    run_and_save, run_from_config, run_from_series, BacktestResult, RunError, RunSummary,
};

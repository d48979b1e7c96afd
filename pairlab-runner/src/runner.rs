//! Backtest runner: wires config, data loading, the engine and artifacts.
//!
//! Two entry points:
//! - `run_from_config()`: reads both price files named by the config, then runs.
//! - `run_from_series()`: takes pre-loaded series. No I/O.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use pairlab_core::{
    run_backtest, BacktestError, MalformedInputError, PerformanceReport, PositionMode,
    PriceSeries,
};

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{compute_dataset_hash, load_pair};
use crate::export::save_artifacts;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("input error: {0}")]
    Input(#[from] MalformedInputError),
    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),
    #[error("export failed: {0:#}")]
    Export(anyhow::Error),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single pairs run.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub schema_version: u32,
    /// BLAKE3 of the config JSON plus the dataset hash.
    pub run_id: String,
    pub dataset_hash: String,
    pub config: BacktestConfig,
    /// Advisory notes from config validation.
    pub notes: Vec<String>,
    pub report: PerformanceReport,
}

/// Headline numbers of a run, as printed by the CLI and stored in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub pair: String,
    pub start_date: String,
    pub end_date: String,
    pub bars: usize,
    pub dropped_dates: usize,
    pub correlation: f64,
    pub mean_spread: f64,
    pub spread_stdev: f64,
    pub upper_threshold: f64,
    pub lower_threshold: f64,
    pub num_trades: usize,
    pub winning_trades: usize,
    pub final_portfolio_value: f64,
    pub total_return_pct: f64,
    pub capital_return_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    pub open_position: PositionMode,
    pub warnings: Vec<String>,
}

impl BacktestResult {
    pub fn summary(&self) -> RunSummary {
        let r = &self.report;
        RunSummary {
            pair: format!("{}/{}", r.left_symbol, r.right_symbol),
            start_date: r.first_date().unwrap_or_default().to_string(),
            end_date: r.last_date().unwrap_or_default().to_string(),
            bars: r.records.len(),
            dropped_dates: r.alignment.dropped_dates(),
            correlation: r.correlation,
            mean_spread: r.spread_stats.mean_spread,
            spread_stdev: r.spread_stats.spread_stdev,
            upper_threshold: r.spread_stats.upper_threshold,
            lower_threshold: r.spread_stats.lower_threshold,
            num_trades: r.num_trades,
            winning_trades: r.trades.iter().filter(|t| t.is_winner()).count(),
            final_portfolio_value: r.final_portfolio_value,
            total_return_pct: r.total_return_pct,
            capital_return_pct: r.capital_return_pct,
            sharpe_ratio: r.sharpe_ratio,
            max_drawdown_pct: r.max_drawdown_pct,
            open_position: r.open_position,
            warnings: r.warnings.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// Run a backtest from a config, loading both price files.
pub fn run_from_config(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    let notes = config.validate()?;
    let (left_file, right_file) = config.files()?;
    let pair = load_pair(
        left_file,
        &config.pair.left_symbol,
        right_file,
        &config.pair.right_symbol,
        config.pair.input_order,
    )?;
    run_with_notes(config, &pair.left, &pair.right, notes)
}

/// Run a backtest on pre-loaded series. File paths in the config are ignored.
pub fn run_from_series(
    config: &BacktestConfig,
    left: &PriceSeries,
    right: &PriceSeries,
) -> Result<BacktestResult, RunError> {
    config
        .engine_params()
        .validate()
        .map_err(RunError::Backtest)?;
    run_with_notes(config, left, right, Vec::new())
}

/// Run from a config and write the artifact bundle under `output_dir`.
///
/// Returns the result and the created run directory.
pub fn run_and_save(
    config: &BacktestConfig,
    output_dir: &Path,
) -> Result<(BacktestResult, PathBuf), RunError> {
    let result = run_from_config(config)?;
    let dir = save_artifacts(&result, output_dir).map_err(RunError::Export)?;
    tracing::info!(dir = %dir.display(), "artifacts saved");
    Ok((result, dir))
}

fn run_with_notes(
    config: &BacktestConfig,
    left: &PriceSeries,
    right: &PriceSeries,
    notes: Vec<String>,
) -> Result<BacktestResult, RunError> {
    for note in &notes {
        tracing::warn!("{note}");
    }

    let params = config.engine_params();
    let report = run_backtest(left, right, &params)?;
    log_report(&report);

    let dataset_hash = compute_dataset_hash(&report.records);
    let run_id = run_id(config, &dataset_hash);

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        dataset_hash,
        config: config.clone(),
        notes,
        report,
    })
}

fn run_id(config: &BacktestConfig, dataset_hash: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(config.config_hash().as_bytes());
    hasher.update(dataset_hash.as_bytes());
    let hex = hasher.finalize().to_hex();
    hex.as_str()[..16].to_string()
}

fn log_report(report: &PerformanceReport) {
    let a = &report.alignment;
    tracing::info!(
        left = %report.left_symbol,
        right = %report.right_symbol,
        bars = a.aligned_len,
        trades = report.num_trades,
        "backtest complete"
    );
    if a.dropped_dates() > 0 || a.duplicate_dates > 0 {
        tracing::warn!(
            unmatched_left = a.unmatched_left,
            unmatched_right = a.unmatched_right,
            missing_price = a.missing_price,
            duplicates = a.duplicate_dates,
            "dates dropped during alignment"
        );
    }
    for w in &report.warnings {
        tracing::warn!("{w}");
    }
    if report.ended_with_open_position {
        tracing::warn!(
            position = report.open_position.label(),
            "run ended with an open position; it is valued but never closed"
        );
    }
}

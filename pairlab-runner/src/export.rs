//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! A saved run is a directory holding:
//! - `manifest.json`: config, headline summary, dataset hash and run id
//! - `result.json`: the full result, every bar included
//! - `series.csv`: the annotated bar-by-bar series
//! - `trades.csv`: completed round trips
//! - `overlay.json`: chart overlay for the configured display flags
//! - `report.md`: human-readable report

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use pairlab_core::{AlignedRecord, PairTrade};

use crate::config::BacktestConfig;
use crate::overlay::ChartOverlay;
use crate::runner::{BacktestResult, RunSummary};

/// What `manifest.json` holds. The full series lives in `series.csv`.
#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub schema_version: u32,
    pub run_id: &'a str,
    pub dataset_hash: &'a str,
    pub config: &'a BacktestConfig,
    pub summary: RunSummary,
    pub notes: &'a [String],
}

impl<'a> Manifest<'a> {
    pub fn new(result: &'a BacktestResult) -> Self {
        Self {
            schema_version: result.schema_version,
            run_id: &result.run_id,
            dataset_hash: &result.dataset_hash,
            config: &result.config,
            summary: result.summary(),
            notes: &result.notes,
        }
    }
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize the full result (every bar included) to pretty JSON.
///
/// NaN statistics are written as `null`.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

pub fn export_manifest(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(&Manifest::new(result)).context("failed to serialize manifest")
}

pub fn export_overlay(overlay: &ChartOverlay) -> Result<String> {
    serde_json::to_string_pretty(overlay).context("failed to serialize chart overlay")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the annotated series.
///
/// Columns: date, price1, price2, spread, portfolio_value, position,
/// entry_spread, exit_spread. Marker columns are empty on bars without one.
pub fn export_series_csv(records: &[AlignedRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "price1",
        "price2",
        "spread",
        "portfolio_value",
        "position",
        "entry_spread",
        "exit_spread",
    ])?;

    for r in records {
        wtr.write_record([
            r.date.as_str(),
            &format!("{:.4}", r.price1),
            &format!("{:.4}", r.price2),
            &format!("{:.4}", r.spread),
            &format!("{:.2}", r.portfolio_value),
            r.position.label(),
            &optional(r.entry_spread),
            &optional(r.exit_spread),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export completed round trips.
pub fn export_trades_csv(trades: &[PairTrade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "mode",
        "entry_date",
        "entry_spread",
        "entry_price1",
        "entry_price2",
        "exit_date",
        "exit_spread",
        "exit_price1",
        "exit_price2",
        "order_size",
        "bars_held",
        "pnl",
    ])?;

    for t in trades {
        wtr.write_record([
            t.mode.label(),
            t.entry_date.as_str(),
            &format!("{:.4}", t.entry_spread),
            &format!("{:.4}", t.entry_price1),
            &format!("{:.4}", t.entry_price2),
            t.exit_date.as_str(),
            &format!("{:.4}", t.exit_spread),
            &format!("{:.4}", t.exit_price1),
            &format!("{:.4}", t.exit_price2),
            &t.order_size.to_string(),
            &t.bars_held().to_string(),
            &format!("{:.2}", t.pnl),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn optional(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4}")).unwrap_or_default()
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one run.
///
/// Creates `{left}_{right}_{timestamp}_{run_id}/` under `output_dir` and
/// returns its path. Symbols are reduced to `[A-Za-z0-9_-]` so the directory
/// always stays directly under `output_dir`.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(run_dir_name(
        result,
        &chrono::Local::now().format("%Y%m%d_%H%M%S").to_string(),
    ));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write(&run_dir, "manifest.json", &export_manifest(result)?)?;
    write(&run_dir, "result.json", &export_json(result)?)?;
    write(&run_dir, "series.csv", &export_series_csv(&result.report.records)?)?;
    write(&run_dir, "trades.csv", &export_trades_csv(&result.report.trades)?)?;

    let overlay = ChartOverlay::build(&result.report, result.config.display);
    write(&run_dir, "overlay.json", &export_overlay(&overlay)?)?;
    write(&run_dir, "report.md", &generate_report(result))?;

    Ok(run_dir)
}

/// Directory name for one run: sanitized symbols, timestamp and short run id.
pub fn run_dir_name(result: &BacktestResult, timestamp: &str) -> String {
    format!(
        "{}_{}_{}_{}",
        sanitize_component(&result.report.left_symbol),
        sanitize_component(&result.report.right_symbol),
        timestamp,
        sanitize_component(&result.run_id),
    )
}

/// Keep `[A-Za-z0-9_-]`, replace everything else with `_`.
fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

fn write(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for one run.
pub fn generate_report(result: &BacktestResult) -> String {
    let s = result.summary();
    let report = &result.report;
    let strategy = &result.config.strategy;
    let mut md = String::with_capacity(2048);

    md.push_str(&format!("# Pairs Backtest Report: {}\n\n", s.pair));

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Period | {} to {} |\n", s.start_date, s.end_date));
    md.push_str(&format!(
        "| Bars | {} ({} dates dropped) |\n",
        s.bars, s.dropped_dates
    ));
    md.push_str(&format!(
        "| Starting Capital | ${:.0} |\n",
        report.starting_capital
    ));
    md.push_str(&format!("| Order Size | {} |\n", report.order_size));
    md.push_str(&format!("| Std Devs (k) | {} |\n", strategy.num_stdevs));
    md.push_str(&format!("| Valuation | {:?} |\n", strategy.valuation));
    md.push_str(&format!("| Dispersion | {:?} |\n", strategy.dispersion));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    md.push_str(&format!("| Run Id | {} |\n", result.run_id));
    md.push('\n');

    md.push_str("## Spread\n\n");
    md.push_str("| Statistic | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Correlation | {:.4} |\n", s.correlation));
    md.push_str(&format!("| Mean Spread | {:.4} |\n", s.mean_spread));
    md.push_str(&format!("| Spread Std Dev | {:.4} |\n", s.spread_stdev));
    md.push_str(&format!("| Upper Threshold | {:.4} |\n", s.upper_threshold));
    md.push_str(&format!("| Lower Threshold | {:.4} |\n", s.lower_threshold));
    md.push('\n');

    md.push_str("## Performance\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Final Portfolio Value | ${:.2} |\n",
        s.final_portfolio_value
    ));
    md.push_str(&format!(
        "| Total Return (vs $10,000) | {:.2}% |\n",
        s.total_return_pct
    ));
    md.push_str(&format!(
        "| Return on Capital | {:.2}% |\n",
        s.capital_return_pct
    ));
    md.push_str(&format!("| Sharpe Ratio | {:.4} |\n", s.sharpe_ratio));
    md.push_str(&format!("| Max Drawdown | {:.2}% |\n", s.max_drawdown_pct));
    md.push_str(&format!(
        "| Trades | {} ({} winners) |\n",
        s.num_trades, s.winning_trades
    ));
    if report.ended_with_open_position {
        md.push_str(&format!("| Open At End | {} |\n", s.open_position));
    }
    md.push('\n');

    if !report.trades.is_empty() {
        md.push_str("## Trades\n\n");
        md.push_str("| # | Mode | Entry | Exit | Bars | PnL |\n");
        md.push_str("| --- | --- | --- | --- | --- | --- |\n");
        for (i, t) in report.trades.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {:.2} |\n",
                i + 1,
                t.mode,
                t.entry_date,
                t.exit_date,
                t.bars_held(),
                t.pnl
            ));
        }
        md.push('\n');
    }

    if !s.warnings.is_empty() || !result.notes.is_empty() {
        md.push_str("## Warnings\n\n");
        for w in s.warnings.iter().chain(&result.notes) {
            md.push_str(&format!("- {w}\n"));
        }
        md.push('\n');
    }

    md
}

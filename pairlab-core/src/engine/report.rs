//! PerformanceReport: the immutable result of one run.

use serde::{Deserialize, Serialize};

use crate::data::align::AlignmentSummary;
use crate::domain::{AlignedRecord, PairTrade, PositionMode};
use crate::stats::SpreadStats;

/// A statistic that could not be computed. The run still completes and the
/// affected field is NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsWarning {
    /// One of the price columns has zero variance, or fewer than two bars.
    UndefinedCorrelation,
    /// Portfolio returns have zero deviation, or fewer than two returns.
    UndefinedSharpe,
    /// Too few bars for the chosen spread dispersion.
    UndefinedSpreadDeviation,
}

impl std::fmt::Display for StatisticsWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            StatisticsWarning::UndefinedCorrelation => {
                "correlation undefined (zero price variance)"
            }
            StatisticsWarning::UndefinedSharpe => "Sharpe ratio undefined (zero return variance)",
            StatisticsWarning::UndefinedSpreadDeviation => {
                "spread deviation undefined (too few bars)"
            }
        };
        f.write_str(msg)
    }
}

/// Statistics and annotated series produced by [`crate::engine::run_backtest`].
///
/// Serialize-only: undefined statistics are NaN, which JSON writes as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub left_symbol: String,
    pub right_symbol: String,

    // ── Metrics ──
    /// Pearson correlation of the two price columns (NaN if undefined).
    pub correlation: f64,
    /// Mean over stdev of bar-over-bar portfolio returns (NaN if undefined).
    pub sharpe_ratio: f64,
    /// Return against [`crate::metrics::RETURN_BASELINE`], in percent.
    pub total_return_pct: f64,
    /// Return against `starting_capital`, in percent.
    pub capital_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub return_baseline: f64,
    pub starting_capital: f64,
    pub order_size: u32,
    pub final_portfolio_value: f64,

    // ── Trades ──
    pub num_trades: usize,
    pub ended_with_open_position: bool,
    /// Position held after the last bar.
    pub open_position: PositionMode,
    pub trades: Vec<PairTrade>,

    // ── Inputs as seen by the simulation ──
    pub spread_stats: SpreadStats,
    pub alignment: AlignmentSummary,
    pub warnings: Vec<StatisticsWarning>,
    pub records: Vec<AlignedRecord>,
}

impl PerformanceReport {
    pub fn portfolio_values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.portfolio_value).collect()
    }

    /// Bars on which a position opened.
    pub fn entries(&self) -> impl Iterator<Item = &AlignedRecord> {
        self.records.iter().filter(|r| r.is_entry())
    }

    /// Bars on which a position closed.
    pub fn exits(&self) -> impl Iterator<Item = &AlignedRecord> {
        self.records.iter().filter(|r| r.is_exit())
    }

    pub fn first_date(&self) -> Option<&str> {
        self.records.first().map(|r| r.date.as_str())
    }

    pub fn last_date(&self) -> Option<&str> {
        self.records.last().map(|r| r.date.as_str())
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

//! Pairs backtesting engine.
//!
//! One run is a pure, single-threaded pass:
//!
//! 1. Validate parameters
//! 2. Inner-join the two series on date
//! 3. Compute static spread statistics and thresholds over the whole window
//! 4. Walk the aligned bars once, driving the position state machine
//! 5. Derive return and risk metrics from the portfolio-value curve

pub mod params;
pub mod report;
pub mod simulate;
pub(crate) mod state;

pub use params::{BacktestError, EngineParams, Valuation};
pub use report::{PerformanceReport, StatisticsWarning};
pub use simulate::{simulate, Simulation};

use crate::data::align::align_series;
use crate::domain::PriceSeries;
use crate::metrics;
use crate::stats::{price_correlation, SpreadStats};

/// Run a pairs backtest on two price series.
///
/// Fails on invalid parameters or when the series share no usable date.
/// Degenerate statistics do not fail the run; they surface as NaN fields
/// plus an entry in [`PerformanceReport::warnings`].
pub fn run_backtest(
    series1: &PriceSeries,
    series2: &PriceSeries,
    params: &EngineParams,
) -> Result<PerformanceReport, BacktestError> {
    params.validate()?;

    let aligned = align_series(series1, series2);
    if aligned.is_empty() {
        return Err(BacktestError::EmptyAlignment {
            left: series1.symbol.clone(),
            right: series2.symbol.clone(),
        });
    }

    let spread_stats = SpreadStats::compute(&aligned.records, params.num_stdevs, params.dispersion);
    let correlation = price_correlation(&aligned.records);

    let sim = simulate(&aligned.records, &spread_stats, params);

    let curve: Vec<f64> = sim.records.iter().map(|r| r.portfolio_value).collect();
    let final_portfolio_value = curve.last().copied().unwrap_or(params.starting_capital);
    let sharpe_ratio = metrics::sharpe_ratio(&curve);

    let mut warnings = Vec::new();
    if correlation.is_nan() {
        warnings.push(StatisticsWarning::UndefinedCorrelation);
    }
    if sharpe_ratio.is_nan() {
        warnings.push(StatisticsWarning::UndefinedSharpe);
    }
    if spread_stats.spread_stdev.is_nan() {
        warnings.push(StatisticsWarning::UndefinedSpreadDeviation);
    }

    Ok(PerformanceReport {
        left_symbol: aligned.left_symbol,
        right_symbol: aligned.right_symbol,
        correlation,
        sharpe_ratio,
        total_return_pct: metrics::total_return_pct(final_portfolio_value),
        capital_return_pct: metrics::capital_return_pct(
            final_portfolio_value,
            params.starting_capital,
        ),
        max_drawdown_pct: metrics::max_drawdown_pct(&curve),
        return_baseline: metrics::RETURN_BASELINE,
        starting_capital: params.starting_capital,
        order_size: params.order_size,
        final_portfolio_value,
        num_trades: sim.num_trades,
        ended_with_open_position: !sim.final_mode.is_flat(),
        open_position: sim.final_mode,
        spread_stats,
        alignment: aligned.summary,
        trades: sim.trades,
        warnings,
        records: sim.records,
    })
}

//! Spread statistics: pure functions over the aligned window.
//!
//! Thresholds are computed once over the entire joined window, so the
//! simulation sees them with full look-ahead.

use serde::{Deserialize, Serialize};

use crate::domain::AlignedRecord;

/// Divisor used for the spread standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispersion {
    /// Divide by n.
    #[default]
    Population,
    /// Divide by n - 1.
    Sample,
}

/// Summary of the spread distribution and the derived trigger levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadStats {
    pub mean_spread: f64,
    pub spread_stdev: f64,
    pub num_stdevs: f64,
    pub upper_threshold: f64,
    pub lower_threshold: f64,
    pub mean_price1: f64,
    pub mean_price2: f64,
}

impl SpreadStats {
    /// Compute spread statistics and thresholds `mean ± k·stdev`.
    pub fn compute(records: &[AlignedRecord], num_stdevs: f64, dispersion: Dispersion) -> Self {
        let spreads: Vec<f64> = records.iter().map(|r| r.spread).collect();
        let p1: Vec<f64> = records.iter().map(|r| r.price1).collect();
        let p2: Vec<f64> = records.iter().map(|r| r.price2).collect();

        let mean_spread = mean(&spreads);
        let spread_stdev = match dispersion {
            Dispersion::Population => population_std(&spreads),
            Dispersion::Sample => sample_std(&spreads),
        };

        Self {
            mean_spread,
            spread_stdev,
            num_stdevs,
            upper_threshold: mean_spread + num_stdevs * spread_stdev,
            lower_threshold: mean_spread - num_stdevs * spread_stdev,
            mean_price1: mean(&p1),
            mean_price2: mean(&p2),
        }
    }
}

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with divisor n. NaN for an empty slice.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Standard deviation with divisor n - 1. NaN with fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Pearson correlation coefficient.
///
/// NaN when the slices differ in length, hold fewer than two values, or
/// either side has zero variance.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return f64::NAN;
    }
    let mx = mean(xs);
    let my = mean(ys);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Correlation of the two raw price columns.
pub fn price_correlation(records: &[AlignedRecord]) -> f64 {
    let p1: Vec<f64> = records.iter().map(|r| r.price1).collect();
    let p2: Vec<f64> = records.iter().map(|r| r.price2).collect();
    pearson_correlation(&p1, &p2)
}

//! Performance metrics: pure functions over the portfolio-value curve.

/// Fixed capital baseline for `total_return_pct`.
///
/// Applied regardless of the configured starting capital; see
/// [`capital_return_pct`] for the capital-relative figure.
pub const RETURN_BASELINE: f64 = 10_000.0;

/// Percent return of `final_value` over [`RETURN_BASELINE`].
pub fn total_return_pct(final_value: f64) -> f64 {
    (final_value - RETURN_BASELINE) / RETURN_BASELINE * 100.0
}

/// Percent return of `final_value` over the configured starting capital.
///
/// NaN when `starting_capital` is zero.
pub fn capital_return_pct(final_value: f64, starting_capital: f64) -> f64 {
    if starting_capital == 0.0 {
        return f64::NAN;
    }
    (final_value - starting_capital) / starting_capital * 100.0
}

/// Bar-over-bar fractional changes of the curve.
///
/// Changes from a zero value are not finite and are skipped.
pub fn period_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| w[1] / w[0] - 1.0)
        .filter(|r| r.is_finite())
        .collect()
}

/// Mean period return over its sample standard deviation.
///
/// No risk-free rate, no annualisation. NaN with fewer than two returns or
/// zero deviation.
pub fn sharpe_ratio(values: &[f64]) -> f64 {
    let returns = period_returns(values);
    if returns.len() < 2 {
        return f64::NAN;
    }
    let std = crate::stats::sample_std(&returns);
    if std == 0.0 || !std.is_finite() {
        return f64::NAN;
    }
    crate::stats::mean(&returns) / std
}

/// Largest peak-to-trough decline, as a non-positive percentage.
pub fn max_drawdown_pct(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &v in values {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            max_dd = max_dd.min((v - peak) / peak * 100.0);
        }
    }
    max_dd
}

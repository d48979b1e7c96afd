//! Engine parameters and run errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stats::Dispersion;

/// How open positions contribute to portfolio value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Valuation {
    /// Only the long leg is valued at market; the short leg's exposure stays
    /// as the cash adjusted at entry and exit.
    #[default]
    LongLegOnly,
    /// Both legs valued at market with their signed quantities.
    MarkToMarket,
}

/// Scalar inputs of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Threshold width in spread standard deviations.
    pub num_stdevs: f64,
    pub starting_capital: f64,
    /// Units bought or sold per leg per trade.
    pub order_size: u32,
    pub valuation: Valuation,
    pub dispersion: Dispersion,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            num_stdevs: 1.5,
            starting_capital: 10_000.0,
            order_size: 10,
            valuation: Valuation::default(),
            dispersion: Dispersion::default(),
        }
    }
}

impl EngineParams {
    pub fn new(num_stdevs: f64, starting_capital: f64, order_size: u32) -> Self {
        Self {
            num_stdevs,
            starting_capital,
            order_size,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), BacktestError> {
        if !(self.num_stdevs.is_finite() && self.num_stdevs > 0.0) {
            return Err(BacktestError::InvalidParameter {
                name: "num_stdevs",
                reason: format!("must be a positive number, got {}", self.num_stdevs),
            });
        }
        if !self.starting_capital.is_finite() {
            return Err(BacktestError::InvalidParameter {
                name: "starting_capital",
                reason: format!("must be finite, got {}", self.starting_capital),
            });
        }
        if self.order_size == 0 {
            return Err(BacktestError::InvalidParameter {
                name: "order_size",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Fatal engine errors.
#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("no overlapping dates between '{left}' and '{right}'")]
    EmptyAlignment { left: String, right: String },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

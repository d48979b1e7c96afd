//! AlignedRecord: one bar of the joined pair, annotated by the engine.

use serde::{Deserialize, Serialize};

/// Which pairs position is open.
///
/// Leg 1 is the first series handed to the engine, leg 2 the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionMode {
    /// No position.
    #[default]
    Flat,
    /// Short leg 1, long leg 2. Opened when the spread is above the upper threshold.
    ShortHigh,
    /// Long leg 1, short leg 2. Opened when the spread is below the lower threshold.
    LongHigh,
}

impl PositionMode {
    pub fn is_flat(self) -> bool {
        self == PositionMode::Flat
    }

    /// Signed unit direction of each leg: (leg 1, leg 2).
    pub fn leg_signs(self) -> (f64, f64) {
        match self {
            PositionMode::Flat => (0.0, 0.0),
            PositionMode::ShortHigh => (-1.0, 1.0),
            PositionMode::LongHigh => (1.0, -1.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PositionMode::Flat => "flat",
            PositionMode::ShortHigh => "short_high",
            PositionMode::LongHigh => "long_high",
        }
    }
}

impl std::fmt::Display for PositionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One date present in both series.
///
/// Produced by alignment with `portfolio_value = 0.0`, `position = Flat` and no
/// markers; the simulation emits a fresh, fully annotated copy per bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    /// Position in the aligned sequence (0 = oldest).
    pub index: usize,
    pub date: String,
    pub price1: f64,
    pub price2: f64,
    /// `|price1 - price2|`, never negative.
    pub spread: f64,
    pub portfolio_value: f64,
    /// Position held after this bar's decision.
    pub position: PositionMode,
    /// Spread at which a position opened on this bar.
    pub entry_spread: Option<f64>,
    /// Spread at which a position closed on this bar.
    pub exit_spread: Option<f64>,
}

impl AlignedRecord {
    pub fn new(index: usize, date: impl Into<String>, price1: f64, price2: f64) -> Self {
        Self {
            index,
            date: date.into(),
            price1,
            price2,
            spread: (price1 - price2).abs(),
            portfolio_value: 0.0,
            position: PositionMode::Flat,
            entry_spread: None,
            exit_spread: None,
        }
    }

    pub fn is_entry(&self) -> bool {
        self.entry_spread.is_some()
    }

    pub fn is_exit(&self) -> bool {
        self.exit_spread.is_some()
    }
}

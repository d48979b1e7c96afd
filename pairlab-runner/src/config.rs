//! Serializable backtest configuration (TOML).

use std::path::{Path, PathBuf};

use pairlab_core::{Dispersion, EngineParams, InputOrder, Valuation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Advisory range for `num_stdevs`; values outside it run with a warning.
pub const ADVISORY_STDEV_RANGE: (f64, f64) = (1.0, 3.0);

/// Errors from loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration for one pairs backtest.
///
/// Every section and field has a default, so an empty file is valid once the
/// two input files are supplied (here or on the command line).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub pair: PairConfig,
    pub strategy: StrategyConfig,
    pub display: DisplayFlags,
}

/// The two instruments and where to read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairConfig {
    pub left_symbol: String,
    pub right_symbol: String,
    pub left_file: Option<PathBuf>,
    pub right_file: Option<PathBuf>,
    pub input_order: InputOrder,
}

impl Default for PairConfig {
    fn default() -> Self {
        Self {
            left_symbol: "STOCK1".into(),
            right_symbol: "STOCK2".into(),
            left_file: None,
            right_file: None,
            input_order: InputOrder::default(),
        }
    }
}

/// Simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub num_stdevs: f64,
    pub starting_capital: f64,
    pub order_size: u32,
    pub valuation: Valuation,
    pub dispersion: Dispersion,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        let p = EngineParams::default();
        Self {
            num_stdevs: p.num_stdevs,
            starting_capital: p.starting_capital,
            order_size: p.order_size,
            valuation: p.valuation,
            dispersion: p.dispersion,
        }
    }
}

/// Chart overlay switches. They never affect the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayFlags {
    /// Mean spread and the upper/lower thresholds.
    pub show_thresholds: bool,
    /// Each instrument's mean price.
    pub show_means: bool,
    /// Entry and exit markers.
    pub show_signals: bool,
}

impl BacktestConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Engine parameters for this config.
    pub fn engine_params(&self) -> EngineParams {
        EngineParams {
            num_stdevs: self.strategy.num_stdevs,
            starting_capital: self.strategy.starting_capital,
            order_size: self.strategy.order_size,
            valuation: self.strategy.valuation,
            dispersion: self.strategy.dispersion,
        }
    }

    /// Check ranges and required fields.
    ///
    /// Returns advisory notes that do not block the run.
    pub fn validate(&self) -> Result<Vec<String>, ConfigError> {
        self.engine_params()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.pair.left_file.is_none() {
            return Err(ConfigError::Invalid("pair.left_file is required".into()));
        }
        if self.pair.right_file.is_none() {
            return Err(ConfigError::Invalid("pair.right_file is required".into()));
        }
        if self.pair.left_symbol.trim().is_empty() || self.pair.right_symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbols must not be empty".into()));
        }

        let mut notes = Vec::new();
        let (lo, hi) = ADVISORY_STDEV_RANGE;
        let k = self.strategy.num_stdevs;
        if !(lo..=hi).contains(&k) {
            notes.push(format!(
                "num_stdevs = {k} is outside the usual [{lo}, {hi}] range"
            ));
        }
        if self.strategy.valuation == Valuation::MarkToMarket {
            notes.push("mark_to_market valuation differs from the default long-leg-only model".into());
        }
        Ok(notes)
    }

    /// Left and right file paths, or an error naming the missing one.
    pub fn files(&self) -> Result<(&Path, &Path), ConfigError> {
        let left = self
            .pair
            .left_file
            .as_deref()
            .ok_or_else(|| ConfigError::Invalid("pair.left_file is required".into()))?;
        let right = self
            .pair
            .right_file
            .as_deref()
            .ok_or_else(|| ConfigError::Invalid("pair.right_file is required".into()))?;
        Ok((left, right))
    }

    /// Stable hash of the config, for run identifiers.
    pub fn config_hash(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => blake3::hash(json.as_bytes()).to_hex().to_string(),
            Err(_) => String::new(),
        }
    }
}

//! PairTrade: a completed open-then-close round trip.

use super::record::PositionMode;
use serde::{Deserialize, Serialize};

/// A completed pairs round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairTrade {
    pub mode: PositionMode,

    // ── Entry ──
    pub entry_index: usize,
    pub entry_date: String,
    pub entry_spread: f64,
    pub entry_price1: f64,
    pub entry_price2: f64,

    // ── Exit ──
    pub exit_index: usize,
    pub exit_date: String,
    pub exit_spread: f64,
    pub exit_price1: f64,
    pub exit_price2: f64,

    /// Units traded per leg.
    pub order_size: u32,
    /// Net cash change across the entry and exit fills.
    pub pnl: f64,
}

impl PairTrade {
    pub fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}

//! Position state machine and cash accounting for one run.

use crate::domain::{AlignedRecord, PairTrade, PositionMode};
use crate::engine::params::Valuation;

/// Decision taken on a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    Hold,
    Open(PositionMode),
    Close,
}

/// Evaluate the one permitted decision for this bar.
///
/// Priority: open above upper, open below lower, close a `LongHigh` once the
/// spread is back above lower, close a `ShortHigh` once it is back below
/// upper. A position never flips without passing through `Flat`.
pub(crate) fn next_transition(mode: PositionMode, spread: f64, upper: f64, lower: f64) -> Transition {
    match mode {
        PositionMode::Flat if spread > upper => Transition::Open(PositionMode::ShortHigh),
        PositionMode::Flat if spread < lower => Transition::Open(PositionMode::LongHigh),
        PositionMode::Flat => Transition::Hold,
        PositionMode::LongHigh if spread > lower => Transition::Close,
        PositionMode::LongHigh => Transition::Hold,
        PositionMode::ShortHigh if spread < upper => Transition::Close,
        PositionMode::ShortHigh => Transition::Hold,
    }
}

/// Entry details kept until the position closes.
#[derive(Debug, Clone)]
struct OpenTrade {
    mode: PositionMode,
    index: usize,
    date: String,
    spread: f64,
    price1: f64,
    price2: f64,
    cash_before: f64,
}

/// Mutable per-run state. Created from starting capital, discarded after the run.
#[derive(Debug)]
pub(crate) struct TradeState {
    pub mode: PositionMode,
    pub cash: f64,
    units: f64,
    order_size: u32,
    open: Option<OpenTrade>,
}

impl TradeState {
    pub fn new(starting_capital: f64, order_size: u32) -> Self {
        Self {
            mode: PositionMode::Flat,
            cash: starting_capital,
            units: f64::from(order_size),
            order_size,
            open: None,
        }
    }

    /// Fill both legs of an entry at this bar's prices.
    pub fn open(&mut self, mode: PositionMode, bar: &AlignedRecord) {
        debug_assert!(self.mode.is_flat(), "open while {:?}", self.mode);
        let cash_before = self.cash;
        let (s1, s2) = mode.leg_signs();
        // Buying spends cash, selling raises it.
        self.cash -= s1 * bar.price1 * self.units;
        self.cash -= s2 * bar.price2 * self.units;
        self.mode = mode;
        self.open = Some(OpenTrade {
            mode,
            index: bar.index,
            date: bar.date.clone(),
            spread: bar.spread,
            price1: bar.price1,
            price2: bar.price2,
            cash_before,
        });
    }

    /// Reverse the entry fills and return the completed round trip.
    pub fn close(&mut self, bar: &AlignedRecord) -> Option<PairTrade> {
        let (s1, s2) = self.mode.leg_signs();
        self.cash += s1 * bar.price1 * self.units;
        self.cash += s2 * bar.price2 * self.units;
        self.mode = PositionMode::Flat;

        let entry = self.open.take()?;
        Some(PairTrade {
            mode: entry.mode,
            entry_index: entry.index,
            entry_date: entry.date,
            entry_spread: entry.spread,
            entry_price1: entry.price1,
            entry_price2: entry.price2,
            exit_index: bar.index,
            exit_date: bar.date.clone(),
            exit_spread: bar.spread,
            exit_price1: bar.price1,
            exit_price2: bar.price2,
            order_size: self.order_size,
            pnl: self.cash - entry.cash_before,
        })
    }

    /// Market value of the open legs under the chosen valuation.
    pub fn holdings_value(&self, price1: f64, price2: f64, valuation: Valuation) -> f64 {
        let (s1, s2) = self.mode.leg_signs();
        match valuation {
            Valuation::LongLegOnly => {
                if s1 > 0.0 {
                    price1 * self.units
                } else if s2 > 0.0 {
                    price2 * self.units
                } else {
                    0.0
                }
            }
            Valuation::MarkToMarket => s1 * price1 * self.units + s2 * price2 * self.units,
        }
    }

    pub fn portfolio_value(&self, price1: f64, price2: f64, valuation: Valuation) -> f64 {
        self.cash + self.holdings_value(price1, price2, valuation)
    }
}

//! Domain types for PairLab

pub mod price;
pub mod record;
pub mod trade;

pub use price::{PricePoint, PriceSeries};
pub use record::{AlignedRecord, PositionMode};
pub use trade::PairTrade;

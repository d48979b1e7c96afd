//! Data ingestion and alignment

pub mod align;
pub mod ingest;

pub use align::{align_series, AlignedSeries, AlignmentSummary};
pub use ingest::{
    load_price_series, parse_price, parse_price_series, InputOrder, MalformedInputError,
    CLOSE_COLUMN, DATE_COLUMN,
};

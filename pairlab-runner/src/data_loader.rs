//! Data loading for the runner: both price files plus a content hash.

use std::path::Path;

use pairlab_core::{load_price_series, AlignedRecord, InputOrder, MalformedInputError, PriceSeries};

/// The two series of a pair, loaded and normalized.
#[derive(Debug, Clone)]
pub struct LoadedPair {
    pub left: PriceSeries,
    pub right: PriceSeries,
}

/// Load both sides of a pair.
///
/// Fails on the first malformed file; the error names which one.
pub fn load_pair(
    left_file: &Path,
    left_symbol: &str,
    right_file: &Path,
    right_symbol: &str,
    order: InputOrder,
) -> Result<LoadedPair, MalformedInputError> {
    let left = load_price_series(left_file, left_symbol, order)?;
    let right = load_price_series(right_file, right_symbol, order)?;

    for series in [&left, &right] {
        tracing::info!(
            symbol = %series.symbol,
            rows = series.len(),
            missing = series.missing_count(),
            first = series.first_date().unwrap_or("-"),
            last = series.last_date().unwrap_or("-"),
            "loaded price series"
        );
    }

    Ok(LoadedPair { left, right })
}

/// Deterministic BLAKE3 hash over the aligned dataset.
///
/// Covers each bar's date and both prices in window order, so the same
/// aligned window hashes identically regardless of which raw rows were
/// dropped on the way in.
pub fn compute_dataset_hash(records: &[AlignedRecord]) -> String {
    let mut hasher = blake3::Hasher::new();
    for r in records {
        hasher.update(r.date.as_bytes());
        hasher.update(&r.price1.to_le_bytes());
        hasher.update(&r.price2.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

//! Price file ingestion.
//!
//! Reads NASDAQ-style historical quote exports (`Date,Close/Last,Volume,...`,
//! newest row first, prices written as `$123.45`) into an oldest-first
//! [`PriceSeries`]. Unparseable prices become `None` rather than aborting the
//! whole file; a missing required column or an unreadable file is fatal.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PricePoint, PriceSeries};

/// Header of the date column.
pub const DATE_COLUMN: &str = "Date";
/// Header of the closing price column.
pub const CLOSE_COLUMN: &str = "Close/Last";

/// Date layouts tried when detecting file order.
const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%d/%m/%Y"];

/// Structured errors for unusable input files.
///
/// Every variant names the offending file so callers can render a message
/// without parsing free text.
#[derive(Debug, Error)]
pub enum MalformedInputError {
    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("{file}: cannot read file: {reason}")]
    Unreadable { file: String, reason: String },

    #[error("{file}: invalid CSV: {reason}")]
    InvalidCsv { file: String, reason: String },
}

impl MalformedInputError {
    /// The file the error refers to.
    pub fn file(&self) -> &str {
        match self {
            MalformedInputError::MissingColumn { file, .. }
            | MalformedInputError::Unreadable { file, .. }
            | MalformedInputError::InvalidCsv { file, .. } => file,
        }
    }
}

/// Row order of the raw file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputOrder {
    /// Newest row first (NASDAQ export). Rows are reversed.
    #[default]
    NewestFirst,
    /// Already chronological. Rows are kept as-is.
    OldestFirst,
    /// Compare the first and last parseable dates; falls back to `NewestFirst`.
    Auto,
}

/// Parse a raw price field.
///
/// Trims whitespace and drops one leading currency symbol. Letters are never
/// stripped, so `x12` is rejected. Anything that is still not a finite number
/// yields `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    let body = match chars.next() {
        Some(c) if is_currency_symbol(c) => chars.as_str().trim_start(),
        _ => trimmed,
    };
    body.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_currency_symbol(c: char) -> bool {
    matches!(c, '$' | '€' | '£' | '¥') || !(c.is_alphanumeric() || matches!(c, '-' | '+' | '.'))
}

/// Parse a price table from any reader.
///
/// `file` is only used to label errors.
pub fn parse_price_series<R: Read>(
    reader: R,
    symbol: &str,
    file: &str,
    order: InputOrder,
) -> Result<PriceSeries, MalformedInputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| csv_error(file, e))?
        .clone();
    let date_idx = column_index(&headers, DATE_COLUMN, file)?;
    let close_idx = column_index(&headers, CLOSE_COLUMN, file)?;

    let mut points = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(|e| csv_error(file, e))?;
        let date = row.get(date_idx).unwrap_or_default();
        let price = row.get(close_idx).and_then(parse_price);
        points.push(PricePoint::new(date, price));
    }

    let unparsed = points.iter().filter(|p| p.price.is_none()).count();
    if unparsed > 0 {
        tracing::debug!(file, unparsed, "rows with unparseable prices kept as missing");
    }

    if should_reverse(&points, order) {
        points.reverse();
    }

    Ok(PriceSeries::new(symbol, points))
}

/// Load a price table from disk.
///
/// The file handle is opened and dropped inside this call.
pub fn load_price_series(
    path: &Path,
    symbol: &str,
    order: InputOrder,
) -> Result<PriceSeries, MalformedInputError> {
    let file = path.display().to_string();
    let handle = File::open(path).map_err(|e| MalformedInputError::Unreadable {
        file: file.clone(),
        reason: e.to_string(),
    })?;
    let series = parse_price_series(handle, symbol, &file, order)?;
    tracing::debug!(
        file = %file,
        rows = series.len(),
        missing = series.missing_count(),
        "loaded price series"
    );
    Ok(series)
}

fn column_index(
    headers: &csv::StringRecord,
    column: &str,
    file: &str,
) -> Result<usize, MalformedInputError> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == column)
        .ok_or_else(|| MalformedInputError::MissingColumn {
            file: file.to_string(),
            column: column.to_string(),
        })
}

fn csv_error(file: &str, e: csv::Error) -> MalformedInputError {
    if e.is_io_error() {
        MalformedInputError::Unreadable {
            file: file.to_string(),
            reason: e.to_string(),
        }
    } else {
        MalformedInputError::InvalidCsv {
            file: file.to_string(),
            reason: e.to_string(),
        }
    }
}

fn should_reverse(points: &[PricePoint], order: InputOrder) -> bool {
    match order {
        InputOrder::NewestFirst => true,
        InputOrder::OldestFirst => false,
        InputOrder::Auto => {
            let first = points.iter().find_map(|p| parse_date(&p.date));
            let last = points.iter().rev().find_map(|p| parse_date(&p.date));
            match (first, last) {
                (Some(first), Some(last)) => first > last,
                _ => true,
            }
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NASDAQ: &str = "\
Date,Close/Last,Volume,Open,High,Low
01/04/2024,$181.91,71983570,$182.15,$183.0872,$180.88
01/03/2024,$184.25,58414460,$184.22,$185.88,$183.43
01/02/2024,$185.64,82488670,$187.15,$188.44,$183.885
";

    #[test]
    fn parses_nasdaq_export_oldest_first() {
        let s = parse_price_series(NASDAQ.as_bytes(), "AAPL", "aapl.csv", InputOrder::NewestFirst)
            .unwrap();
        assert_eq!(s.symbol, "AAPL");
        assert_eq!(s.len(), 3);
        assert_eq!(s.first_date(), Some("01/02/2024"));
        assert_eq!(s.last_date(), Some("01/04/2024"));
        assert_eq!(s.points[0].price, Some(185.64));
        assert_eq!(s.points[2].price, Some(181.91));
    }

    #[test]
    fn oldest_first_keeps_file_order() {
        let s = parse_price_series(NASDAQ.as_bytes(), "AAPL", "aapl.csv", InputOrder::OldestFirst)
            .unwrap();
        assert_eq!(s.first_date(), Some("01/04/2024"));
    }

    #[test]
    fn auto_detects_descending_file() {
        let s = parse_price_series(NASDAQ.as_bytes(), "AAPL", "aapl.csv", InputOrder::Auto).unwrap();
        assert_eq!(s.first_date(), Some("01/02/2024"));
    }

    #[test]
    fn auto_keeps_ascending_iso_file() {
        let csv = "Date,Close/Last\n2024-01-02,10\n2024-01-03,11\n";
        let s = parse_price_series(csv.as_bytes(), "X", "x.csv", InputOrder::Auto).unwrap();
        assert_eq!(s.first_date(), Some("2024-01-02"));
    }

    #[test]
    fn auto_falls_back_to_reversal_on_unknown_dates() {
        let csv = "Date,Close/Last\nb,10\na,11\n";
        let s = parse_price_series(csv.as_bytes(), "X", "x.csv", InputOrder::Auto).unwrap();
        assert_eq!(s.first_date(), Some("a"));
    }

    #[test]
    fn bad_price_becomes_missing() {
        let csv = "Date,Close/Last\nd3,x12\nd2,N/A\nd1,$10.5\n";
        let s = parse_price_series(csv.as_bytes(), "X", "x.csv", InputOrder::NewestFirst).unwrap();
        assert_eq!(s.points[0].price, Some(10.5));
        assert_eq!(s.points[1].price, None);
        assert_eq!(s.points[2].price, None);
        assert_eq!(s.missing_count(), 2);
    }

    #[test]
    fn missing_close_column_names_file_and_column() {
        let csv = "Date,Open\nd1,1\n";
        let err =
            parse_price_series(csv.as_bytes(), "X", "x.csv", InputOrder::NewestFirst).unwrap_err();
        match &err {
            MalformedInputError::MissingColumn { file, column } => {
                assert_eq!(file, "x.csv");
                assert_eq!(column, CLOSE_COLUMN);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.file(), "x.csv");
    }

    #[test]
    fn missing_date_column() {
        let csv = "Day,Close/Last\nd1,1\n";
        let err =
            parse_price_series(csv.as_bytes(), "X", "x.csv", InputOrder::NewestFirst).unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::MissingColumn { ref column, .. } if column == DATE_COLUMN
        ));
    }

    #[test]
    fn ragged_row_is_invalid_csv() {
        let csv = "Date,Close/Last\nd1,1,extra\n";
        let err =
            parse_price_series(csv.as_bytes(), "X", "x.csv", InputOrder::NewestFirst).unwrap_err();
        assert!(matches!(err, MalformedInputError::InvalidCsv { .. }));
    }

    #[test]
    fn headers_are_trimmed() {
        let csv = "Date , Close/Last \nd1, $3.25 \n";
        let s = parse_price_series(csv.as_bytes(), "X", "x.csv", InputOrder::NewestFirst).unwrap();
        assert_eq!(s.points[0].price, Some(3.25));
    }

    #[test]
    fn unreadable_file() {
        let err = load_price_series(
            Path::new("/definitely/not/here.csv"),
            "X",
            InputOrder::NewestFirst,
        )
        .unwrap_err();
        assert!(matches!(err, MalformedInputError::Unreadable { .. }));
        assert!(err.file().ends_with("here.csv"));
    }

    #[test]
    fn parse_price_variants() {
        assert_eq!(parse_price("$12.50"), Some(12.5));
        assert_eq!(parse_price(" 12.50 "), Some(12.5));
        assert_eq!(parse_price("€ 7"), Some(7.0));
        assert_eq!(parse_price("-3.5"), Some(-3.5));
        assert_eq!(parse_price(".5"), Some(0.5));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("$"), None);
        assert_eq!(parse_price("abc"), None);
        assert_eq!(parse_price("NaN"), None);
        assert_eq!(parse_price("1,234.00"), None);
    }

    #[test]
    fn letter_prefixed_fields_are_not_prices() {
        assert_eq!(parse_price("x12"), None);
        assert_eq!(parse_price("e5"), None);
        assert_eq!(parse_price("USD12"), None);
        assert_eq!(parse_price("£12.5"), Some(12.5));
        assert_eq!(parse_price("¥ 300"), Some(300.0));
    }
}

//! PriceSeries: one instrument's cleaned closing prices.

use serde::{Deserialize, Serialize};

/// A single dated close.
///
/// `date` is kept exactly as the data source wrote it: it is the join key
/// between the two legs, and nothing beyond string equality is assumed.
/// `price` is `None` when the raw field failed to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub price: Option<f64>,
}

impl PricePoint {
    pub fn new(date: impl Into<String>, price: Option<f64>) -> Self {
        Self {
            date: date.into(),
            price,
        }
    }
}

/// Ordered closes for one instrument, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Ticker or file label used in messages and artifact headers.
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    /// Build a fully-populated series from `(date, price)` pairs.
    pub fn from_pairs<D: Into<String>>(
        symbol: impl Into<String>,
        pairs: impl IntoIterator<Item = (D, f64)>,
    ) -> Self {
        let points = pairs
            .into_iter()
            .map(|(date, price)| PricePoint::new(date, Some(price)))
            .collect();
        Self::new(symbol, points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points whose price could not be parsed.
    pub fn missing_count(&self) -> usize {
        self.points.iter().filter(|p| p.price.is_none()).count()
    }

    pub fn first_date(&self) -> Option<&str> {
        self.points.first().map(|p| p.date.as_str())
    }

    pub fn last_date(&self) -> Option<&str> {
        self.points.last().map(|p| p.date.as_str())
    }
}

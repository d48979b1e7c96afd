//! Two-series date alignment.
//!
//! Inner join on the exact date string. The output follows the chronology of
//! the first series; dates present in only one series, dates with a missing
//! price on either side, and repeated dates are dropped and counted so the
//! caller can see how much the backtest window shrank.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::{AlignedRecord, PriceSeries};

/// How the join reshaped the inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentSummary {
    pub left_len: usize,
    pub right_len: usize,
    pub aligned_len: usize,
    /// Left dates with no counterpart on the right.
    pub unmatched_left: usize,
    /// Right dates with no counterpart on the left.
    pub unmatched_right: usize,
    /// Shared dates dropped because either price was missing.
    pub missing_price: usize,
    /// Repeated dates ignored after their first occurrence (both sides).
    pub duplicate_dates: usize,
}

impl AlignmentSummary {
    /// Total input dates that did not make it into the aligned window.
    pub fn dropped_dates(&self) -> usize {
        self.unmatched_left + self.unmatched_right + self.missing_price
    }
}

/// Joined records plus the join summary.
#[derive(Debug, Clone)]
pub struct AlignedSeries {
    pub left_symbol: String,
    pub right_symbol: String,
    pub records: Vec<AlignedRecord>,
    pub summary: AlignmentSummary,
}

impl AlignedSeries {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Inner-join two series on date.
pub fn align_series(left: &PriceSeries, right: &PriceSeries) -> AlignedSeries {
    let mut duplicate_dates = 0;

    // Right side lookup: first occurrence wins.
    let mut right_by_date: HashMap<&str, Option<f64>> = HashMap::with_capacity(right.len());
    for point in &right.points {
        if right_by_date.contains_key(point.date.as_str()) {
            duplicate_dates += 1;
        } else {
            right_by_date.insert(point.date.as_str(), point.price);
        }
    }

    let mut seen_left: HashSet<&str> = HashSet::with_capacity(left.len());
    let mut matched_right: HashSet<&str> = HashSet::with_capacity(right.len());
    let mut records = Vec::with_capacity(left.len().min(right.len()));
    let mut unmatched_left = 0;
    let mut missing_price = 0;

    for point in &left.points {
        let date = point.date.as_str();
        if !seen_left.insert(date) {
            duplicate_dates += 1;
            continue;
        }
        let Some(right_price) = right_by_date.get(date) else {
            unmatched_left += 1;
            continue;
        };
        matched_right.insert(date);

        match (point.price, *right_price) {
            (Some(p1), Some(p2)) => {
                records.push(AlignedRecord::new(records.len(), date, p1, p2));
            }
            _ => missing_price += 1,
        }
    }

    let summary = AlignmentSummary {
        left_len: left.len(),
        right_len: right.len(),
        aligned_len: records.len(),
        unmatched_left,
        unmatched_right: right_by_date.len() - matched_right.len(),
        missing_price,
        duplicate_dates,
    };

    AlignedSeries {
        left_symbol: left.symbol.clone(),
        right_symbol: right.symbol.clone(),
        records,
        summary,
    }
}

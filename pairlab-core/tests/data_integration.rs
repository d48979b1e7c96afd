//! Integration tests for file ingestion using the frozen KO/PEP fixtures.
//!
//! `ko.csv` has an unparseable price on 01/12/2024; `pep.csv` has no row for
//! 01/10/2024. Both are NASDAQ exports, newest row first.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use pairlab_core::data::{align_series, parse_price_series};
use pairlab_core::{load_price_series, run_backtest, EngineParams, InputOrder, MalformedInputError};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn fixtures_load_oldest_first() {
    let ko = load_price_series(&fixture("ko.csv"), "KO", InputOrder::NewestFirst).unwrap();
    let pep = load_price_series(&fixture("pep.csv"), "PEP", InputOrder::NewestFirst).unwrap();

    assert_eq!(ko.len(), 12);
    assert_eq!(pep.len(), 11);
    assert_eq!(ko.first_date(), Some("01/02/2024"));
    assert_eq!(ko.last_date(), Some("01/18/2024"));
    assert_eq!(ko.missing_count(), 1);
    assert_eq!(pep.missing_count(), 0);
    assert_eq!(ko.points[0].price, Some(59.81));
}

#[test]
fn auto_order_matches_explicit_order_on_nasdaq_files() {
    let explicit = load_price_series(&fixture("ko.csv"), "KO", InputOrder::NewestFirst).unwrap();
    let auto = load_price_series(&fixture("ko.csv"), "KO", InputOrder::Auto).unwrap();
    assert_eq!(explicit, auto);
}

#[test]
fn fixture_alignment_drops_unmatched_and_missing() {
    let ko = load_price_series(&fixture("ko.csv"), "KO", InputOrder::NewestFirst).unwrap();
    let pep = load_price_series(&fixture("pep.csv"), "PEP", InputOrder::NewestFirst).unwrap();

    let aligned = align_series(&ko, &pep);

    assert_eq!(aligned.len(), 10);
    assert_eq!(aligned.summary.unmatched_left, 1);
    assert_eq!(aligned.summary.unmatched_right, 0);
    assert_eq!(aligned.summary.missing_price, 1);
    assert!(aligned.records.iter().all(|r| r.date != "01/10/2024"));
    assert!(aligned.records.iter().all(|r| r.date != "01/12/2024"));
}

#[test]
fn fixture_backtest_runs_end_to_end() {
    let ko = load_price_series(&fixture("ko.csv"), "KO", InputOrder::NewestFirst).unwrap();
    let pep = load_price_series(&fixture("pep.csv"), "PEP", InputOrder::NewestFirst).unwrap();

    let report = run_backtest(&ko, &pep, &EngineParams::default()).unwrap();

    assert_eq!(report.left_symbol, "KO");
    assert_eq!(report.right_symbol, "PEP");
    assert_eq!(report.records.len(), 10);
    assert_eq!(report.first_date(), Some("01/02/2024"));
    assert_eq!(report.last_date(), Some("01/18/2024"));
    assert!(report.correlation.is_finite());
    assert!(report.correlation.abs() <= 1.0);
    // PEP trades far above KO, so the spread is large and positive throughout.
    assert!(report.spread_stats.mean_spread > 100.0);
    assert!(report.spread_stats.upper_threshold > report.spread_stats.lower_threshold);
    assert_eq!(report.num_trades, report.trades.len());
}

#[test]
fn missing_column_in_file_names_the_file() {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "pairlab_missing_col_{}_{id}.csv",
        std::process::id()
    ));
    std::fs::write(&path, "Date,Open\n01/02/2024,$1.00\n").unwrap();

    let err = load_price_series(&path, "X", InputOrder::NewestFirst).unwrap_err();
    match &err {
        MalformedInputError::MissingColumn { file, column } => {
            assert!(file.ends_with(".csv"));
            assert_eq!(column, "Close/Last");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let _ = std::fs::remove_file(&path);
}

#[test]
fn reader_and_file_paths_agree() {
    let raw = std::fs::read_to_string(fixture("pep.csv")).unwrap();
    let from_reader =
        parse_price_series(raw.as_bytes(), "PEP", "pep.csv", InputOrder::NewestFirst).unwrap();
    let from_file = load_price_series(&fixture("pep.csv"), "PEP", InputOrder::NewestFirst).unwrap();
    assert_eq!(from_reader, from_file);
}

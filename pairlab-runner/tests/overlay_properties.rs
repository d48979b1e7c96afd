//! Property tests for the runner's derived outputs.
//!
//! 1. Overlay markers pair up: every exit closes the mode of the entry before it
//! 2. Display flags never change the simulation
//! 3. The series CSV always has one row per aligned bar

use proptest::prelude::*;

use pairlab_core::{PositionMode, PriceSeries};
use pairlab_runner::export::export_series_csv;
use pairlab_runner::{run_from_series, BacktestConfig, ChartOverlay, DisplayFlags, MarkerKind};

fn arb_prices(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((10.0..200.0_f64).prop_map(|p| (p * 100.0).round() / 100.0), len)
}

fn arb_pair() -> impl Strategy<Value = (PriceSeries, PriceSeries)> {
    (2usize..50).prop_flat_map(|len| {
        (arb_prices(len), arb_prices(len)).prop_map(|(a, b)| {
            let dates: Vec<String> = (0..a.len()).map(|i| format!("d{i:03}")).collect();
            (
                PriceSeries::from_pairs("A", dates.iter().cloned().zip(a)),
                PriceSeries::from_pairs("B", dates.into_iter().zip(b)),
            )
        })
    })
}

fn all_flags() -> DisplayFlags {
    DisplayFlags {
        show_thresholds: true,
        show_means: true,
        show_signals: true,
    }
}

proptest! {
    #[test]
    fn markers_pair_entries_with_exits((a, b) in arb_pair(), k in 0.5..2.5_f64) {
        let mut cfg = BacktestConfig::default();
        cfg.strategy.num_stdevs = k;
        let result = run_from_series(&cfg, &a, &b).unwrap();
        let overlay = ChartOverlay::build(&result.report, all_flags());

        let mut open: Option<PositionMode> = None;
        for m in &overlay.markers {
            prop_assert_ne!(m.mode, PositionMode::Flat);
            match m.kind {
                MarkerKind::Entry => {
                    prop_assert!(open.is_none());
                    open = Some(m.mode);
                }
                MarkerKind::Exit => prop_assert_eq!(open.take(), Some(m.mode)),
            }
        }
        prop_assert_eq!(open.is_some(), result.report.ended_with_open_position);
    }

    #[test]
    fn display_flags_do_not_affect_results((a, b) in arb_pair()) {
        let plain = run_from_series(&BacktestConfig::default(), &a, &b).unwrap();
        let mut cfg = BacktestConfig::default();
        cfg.display = all_flags();
        let flagged = run_from_series(&cfg, &a, &b).unwrap();

        prop_assert_eq!(&plain.dataset_hash, &flagged.dataset_hash);
        prop_assert_eq!(&plain.report.trades, &flagged.report.trades);
        prop_assert_eq!(plain.report.portfolio_values(), flagged.report.portfolio_values());
    }

    #[test]
    fn series_csv_row_per_bar((a, b) in arb_pair()) {
        let result = run_from_series(&BacktestConfig::default(), &a, &b).unwrap();
        let csv = export_series_csv(&result.report.records).unwrap();
        prop_assert_eq!(csv.lines().count(), 1 + result.report.records.len());
    }
}

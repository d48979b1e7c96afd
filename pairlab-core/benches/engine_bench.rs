//! Criterion benchmarks for PairLab hot paths.
//!
//! Benchmarks:
//! 1. Full `run_backtest` (alignment + stats + simulation + metrics)
//! 2. Alignment alone
//! 3. Simulation alone on pre-aligned records

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pairlab_core::data::align_series;
use pairlab_core::engine::simulate;
use pairlab_core::{run_backtest, Dispersion, EngineParams, PriceSeries, SpreadStats};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(symbol: &str, n: usize, base: f64, phase: f64) -> PriceSeries {
    let start = chrono::NaiveDate::from_ymd_opt(2010, 1, 4).unwrap();
    PriceSeries::from_pairs(
        symbol,
        (0..n).map(|i| {
            let date = start + chrono::Duration::days(i as i64);
            let price = base + (i as f64 * 0.05 + phase).sin() * 5.0 + i as f64 * 0.01;
            (date.format("%m/%d/%Y").to_string(), price)
        }),
    )
}

fn bench_run_backtest(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_backtest");
    for n in [1_000usize, 5_000, 20_000] {
        let a = make_series("A", n, 100.0, 0.0);
        let b = make_series("B", n, 95.0, 0.7);
        let params = EngineParams::default();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| run_backtest(black_box(&a), black_box(&b), black_box(&params)))
        });
    }
    group.finish();
}

fn bench_align(c: &mut Criterion) {
    let a = make_series("A", 5_000, 100.0, 0.0);
    let b = make_series("B", 5_000, 95.0, 0.7);
    c.bench_function("align_series_5000", |bench| {
        bench.iter(|| align_series(black_box(&a), black_box(&b)))
    });
}

fn bench_simulate(c: &mut Criterion) {
    let a = make_series("A", 5_000, 100.0, 0.0);
    let b = make_series("B", 5_000, 95.0, 0.7);
    let aligned = align_series(&a, &b);
    let params = EngineParams::default();
    let stats = SpreadStats::compute(&aligned.records, params.num_stdevs, Dispersion::Population);
    c.bench_function("simulate_5000", |bench| {
        bench.iter(|| simulate(black_box(&aligned.records), black_box(&stats), &params))
    });
}

criterion_group!(benches, bench_run_backtest, bench_align, bench_simulate);
criterion_main!(benches);

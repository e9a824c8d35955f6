use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use vitalrs::models::{CycleInterval, MetricSelection, StepSample, WaterSample, WeightSample};
use vitalrs::{align, cycle, estimate_trend, merge_by_date};

/// Benchmarks for the analytics core over growing histories

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
}

fn day(offset: usize) -> NaiveDate {
    start().checked_add_days(Days::new(offset as u64)).unwrap()
}

fn create_weights(days: usize) -> Vec<WeightSample> {
    (0..days)
        .map(|i| WeightSample {
            date: day(i),
            weight: 180.0 - i as f64 * 0.05 + (i % 7) as f64 * 0.3,
        })
        .collect()
}

fn create_steps(days: usize) -> Vec<StepSample> {
    (0..days)
        .map(|i| StepSample {
            date: day(i),
            count: 6000 + ((i * 977) % 8000) as u32,
        })
        .collect()
}

fn create_water(days: usize) -> Vec<WaterSample> {
    (0..days)
        .step_by(2)
        .map(|i| WaterSample {
            date: day(i),
            amount: 40.0 + (i % 5) as f64 * 8.0,
        })
        .collect()
}

fn create_cycles(days: usize) -> Vec<CycleInterval> {
    (0..days)
        .step_by(28)
        .map(|i| CycleInterval::from_dates(day(i), day(i + 4)).unwrap())
        .collect()
}

fn bench_trend_estimation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Trend Estimation");

    for &days in &[7, 30, 90, 365, 1825] {
        let weights = create_weights(days);

        group.throughput(Throughput::Elements(days as u64));
        group.bench_with_input(
            BenchmarkId::new("estimate_trend", days),
            &weights,
            |b, weights| {
                b.iter(|| estimate_trend(black_box(weights)));
            },
        );
    }

    group.finish();
}

fn bench_cycle_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Cycle Prediction");
    let now = day(400).and_hms_opt(8, 0, 0).unwrap().and_utc();

    for &days in &[90, 365, 1825] {
        let cycles = create_cycles(days);

        group.throughput(Throughput::Elements(cycles.len() as u64));
        group.bench_with_input(BenchmarkId::new("predict", days), &cycles, |b, cycles| {
            b.iter(|| cycle::predict(black_box(cycles), now));
        });
    }

    group.finish();
}

fn bench_alignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("Series Alignment");
    let selection = MetricSelection::all();

    for &days in &[30, 365, 1825] {
        let weights = create_weights(days);
        let steps = create_steps(days);
        let water = create_water(days);
        let cycles = create_cycles(days);

        group.throughput(Throughput::Elements(days as u64));
        group.bench_function(BenchmarkId::new("align_all_metrics", days), |b| {
            b.iter(|| {
                align(
                    black_box(&weights),
                    black_box(&steps),
                    black_box(&water),
                    black_box(&cycles),
                    &selection,
                )
            });
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("Keyed Merge");

    for &days in &[30, 365, 1825] {
        let existing = create_weights(days);
        let incoming: Vec<WeightSample> = create_weights(days)
            .into_iter()
            .skip(days / 2)
            .map(|mut s| {
                s.weight += 1.0;
                s
            })
            .collect();

        group.throughput(Throughput::Elements(days as u64));
        group.bench_function(BenchmarkId::new("merge_by_date", days), |b| {
            b.iter(|| merge_by_date(black_box(&existing), black_box(&incoming)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_trend_estimation,
    bench_cycle_prediction,
    bench_alignment,
    bench_merge
);
criterion_main!(benches);

//! Comparison timeline
//!
//! Merges the weight, step, water and cycle records onto one ascending list
//! of calendar dates and rescales each metric to 0-100 so that series with
//! very different units can share an axis. Every metric is scaled against
//! its own minimum and maximum.

use crate::cycle::ovulation_markers;
use crate::models::{
    AlignedPoint, CycleInterval, Metric, MetricReading, MetricSelection, SeriesRange, StepSample,
    WaterSample, WeightSample,
};
use crate::series::DailySeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Normalized value of every ovulation marker
pub const OVULATION_MARKER_VALUE: f64 = 100.0;

/// Raw value carried by an ovulation marker
pub const OVULATION_MARKER_RAW: f64 = 1.0;

/// Normalized value when a series has no spread
pub const FLAT_SERIES_VALUE: f64 = 50.0;

/// Rescale `value` into 0-100 against `range`; flat ranges map to 50
pub fn normalize(value: f64, range: SeriesRange) -> f64 {
    if range.is_flat() {
        return FLAT_SERIES_VALUE;
    }
    (value - range.min) / (range.max - range.min) * 100.0
}

/// Per-metric ranges shown under the comparison chart; `None` means no data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRanges {
    pub weight: Option<SeriesRange>,
    pub steps: Option<SeriesRange>,
    pub water: Option<SeriesRange>,
    pub period_length: Option<SeriesRange>,

    /// Number of ovulation markers derived from the cycles
    pub ovulation_count: usize,
}

impl SeriesRanges {
    pub fn get(&self, metric: Metric) -> Option<SeriesRange> {
        match metric {
            Metric::Weight => self.weight,
            Metric::Steps => self.steps,
            Metric::Water => self.water,
            Metric::PeriodLength => self.period_length,
            Metric::Ovulation => None,
        }
    }
}

/// Dated lookups for every metric, built once per alignment
struct MetricSeries {
    weight: DailySeries<f64>,
    steps: DailySeries<f64>,
    water: DailySeries<f64>,
    period_length: DailySeries<f64>,
    ovulation: BTreeSet<NaiveDate>,
    ranges: SeriesRanges,
}

impl MetricSeries {
    fn build(
        weights: &[WeightSample],
        steps: &[StepSample],
        water: &[WaterSample],
        cycles: &[CycleInterval],
    ) -> Self {
        let weight = DailySeries::from_samples(weights);
        let steps = DailySeries::from_samples(steps);
        let water = DailySeries::from_samples(water);
        let period_length: DailySeries<f64> = cycles
            .iter()
            .map(|c| (c.start_date, c.period_length as f64))
            .collect();
        let ovulation: BTreeSet<NaiveDate> = ovulation_markers(cycles)
            .into_iter()
            .map(|m| m.ovulation)
            .collect();

        let ranges = SeriesRanges {
            weight: SeriesRange::of(weight.values().copied()),
            steps: SeriesRange::of(steps.values().copied()),
            water: SeriesRange::of(water.values().copied()),
            period_length: SeriesRange::of(cycles.iter().map(|c| c.period_length as f64)),
            ovulation_count: cycles.len(),
        };

        MetricSeries {
            weight,
            steps,
            water,
            period_length,
            ovulation,
            ranges,
        }
    }

    fn dates(&self) -> BTreeSet<NaiveDate> {
        self.weight
            .dates()
            .chain(self.steps.dates())
            .chain(self.water.dates())
            .chain(self.period_length.dates())
            .chain(self.ovulation.iter().copied())
            .collect()
    }

    fn reading(&self, metric: Metric, date: NaiveDate) -> Option<MetricReading> {
        let series = match metric {
            Metric::Weight => &self.weight,
            Metric::Steps => &self.steps,
            Metric::Water => &self.water,
            Metric::PeriodLength => &self.period_length,
            Metric::Ovulation => {
                return self.ovulation.contains(&date).then_some(MetricReading {
                    raw: OVULATION_MARKER_RAW,
                    normalized: OVULATION_MARKER_VALUE,
                });
            }
        };
        let raw = *series.get(date)?;
        let range = self.ranges.get(metric)?;

        Some(MetricReading {
            raw,
            normalized: normalize(raw, range),
        })
    }

    fn point(&self, date: NaiveDate) -> AlignedPoint {
        let readings: BTreeMap<Metric, MetricReading> = Metric::ALL
            .iter()
            .filter_map(|metric| self.reading(*metric, date).map(|r| (*metric, r)))
            .collect();

        AlignedPoint { date, readings }
    }
}

/// Every date carrying data in any series, ascending and without repeats
pub fn aligned_dates(
    weights: &[WeightSample],
    steps: &[StepSample],
    water: &[WaterSample],
    cycles: &[CycleInterval],
) -> Vec<NaiveDate> {
    MetricSeries::build(weights, steps, water, cycles)
        .dates()
        .into_iter()
        .collect()
}

/// Min/max of each metric series
pub fn series_ranges(
    weights: &[WeightSample],
    steps: &[StepSample],
    water: &[WaterSample],
    cycles: &[CycleInterval],
) -> SeriesRanges {
    MetricSeries::build(weights, steps, water, cycles).ranges
}

/// One row per aligned date with readings for every metric present on it
pub fn timeline(
    weights: &[WeightSample],
    steps: &[StepSample],
    water: &[WaterSample],
    cycles: &[CycleInterval],
) -> Vec<AlignedPoint> {
    let series = MetricSeries::build(weights, steps, water, cycles);
    series.dates().into_iter().map(|date| series.point(date)).collect()
}

/// Comparison rows restricted to dates where a selected metric has data
pub fn align(
    weights: &[WeightSample],
    steps: &[StepSample],
    water: &[WaterSample],
    cycles: &[CycleInterval],
    selection: &MetricSelection,
) -> Vec<AlignedPoint> {
    let selected = selection.selected();
    let all = timeline(weights, steps, water, cycles);
    let total = all.len();

    let rows: Vec<AlignedPoint> = all
        .into_iter()
        .filter(|point| selected.iter().any(|metric| point.has(*metric)))
        .collect();

    debug!(
        dates = total,
        rows = rows.len(),
        selected = ?selected,
        "Aligned comparison series"
    );

    rows
}

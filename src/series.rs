use crate::cycle::is_period_day;
use crate::error::{DataError, Result};
use crate::models::{CycleInterval, StepSample, WaterSample, WeightSample};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Daily step goal shown by the steps tracker
pub const DEFAULT_STEP_GOAL: u32 = 10_000;

/// Daily water goal in ounces (8 cups)
pub const DEFAULT_WATER_GOAL_OZ: f64 = 64.0;

/// Number of most recent entries charted per metric
pub const CHART_WINDOW_ENTRIES: usize = 14;

/// A record keyed by its calendar day
pub trait DatedSample {
    fn date(&self) -> NaiveDate;

    /// Numeric value used for charts and summaries
    fn value(&self) -> f64;
}

impl DatedSample for WeightSample {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self) -> f64 {
        self.weight
    }
}

impl DatedSample for StepSample {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self) -> f64 {
        self.count as f64
    }
}

impl DatedSample for WaterSample {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self) -> f64 {
        self.amount
    }
}

/// One value per calendar day; writing an existing day replaces its value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailySeries<V> {
    entries: BTreeMap<NaiveDate, V>,
}

impl<V> DailySeries<V> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert or replace the value for `date`, returning true when replaced
    pub fn upsert(&mut self, date: NaiveDate, value: V) -> bool {
        self.entries.insert(date, value).is_some()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&V> {
        self.entries.get(&date)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending date order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, &V)> + '_ {
        self.entries.iter().map(|(date, value)| (*date, value))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entries.keys().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.values()
    }
}

impl DailySeries<f64> {
    /// Numeric series from dated samples; later duplicates win
    pub fn from_samples<S: DatedSample>(samples: &[S]) -> Self {
        samples.iter().map(|s| (s.date(), s.value())).collect()
    }
}

impl<V> FromIterator<(NaiveDate, V)> for DailySeries<V> {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, V)>>(iter: I) -> Self {
        let mut series = DailySeries::new();
        for (date, value) in iter {
            series.upsert(date, value);
        }
        series
    }
}

/// Merge `incoming` over `existing`, keeping one sample per date.
///
/// Incoming samples replace existing ones for the same day. The result is
/// ordered by date and neither input is modified.
pub fn merge_by_date<S: DatedSample + Clone>(existing: &[S], incoming: &[S]) -> Vec<S> {
    let merged: BTreeMap<NaiveDate, &S> = existing
        .iter()
        .chain(incoming.iter())
        .map(|s| (s.date(), s))
        .collect();

    merged.into_values().cloned().collect()
}

/// Store `sample` as the only entry for its day
fn upsert_sample<S: DatedSample>(samples: &mut Vec<S>, sample: S) -> bool {
    let before = samples.len();
    samples.retain(|s| s.date() != sample.date());
    let replaced = samples.len() != before;
    samples.push(sample);
    replaced
}

/// Latest entry for `date`, matching the last-write-wins reading of [`DailySeries`]
fn latest_on<S: DatedSample>(samples: &[S], date: NaiveDate) -> Option<&S> {
    samples.iter().rev().find(|s| s.date() == date)
}

/// Point-in-time copy of every logged record, as handed over by the storage layer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthLog {
    pub weights: Vec<WeightSample>,
    pub cycles: Vec<CycleInterval>,
    pub steps: Vec<StepSample>,
    pub water: Vec<WaterSample>,
}

/// Everything logged for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySnapshot {
    pub date: NaiveDate,
    pub weight: Option<f64>,
    pub steps: Option<u32>,
    pub water: Option<f64>,
    pub is_period: bool,
}

impl HealthLog {
    /// Parse a JSON snapshot, keeping the last entry for any repeated day
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut log: HealthLog = serde_json::from_str(json)?;
        let loaded = log.weights.len() + log.steps.len() + log.water.len();

        log.weights = merge_by_date(&[], &log.weights);
        log.steps = merge_by_date(&[], &log.steps);
        log.water = merge_by_date(&[], &log.water);

        let kept = log.weights.len() + log.steps.len() + log.water.len();
        if kept < loaded {
            debug!(dropped = loaded - kept, "Collapsed repeated days in snapshot");
        }

        Ok(log)
    }

    /// Load a JSON snapshot from disk
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = fs::read_to_string(path)?;
        let log = Self::from_json_str(&content)?;

        info!(
            path = %path.display(),
            weights = log.weights.len(),
            cycles = log.cycles.len(),
            steps = log.steps.len(),
            water = log.water.len(),
            "Loaded health log"
        );

        Ok(log)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Record a weight in pounds, replacing any entry for that day
    pub fn log_weight(&mut self, date: NaiveDate, weight: f64) -> bool {
        upsert_sample(&mut self.weights, WeightSample { date, weight })
    }

    pub fn log_steps(&mut self, date: NaiveDate, count: u32) -> bool {
        upsert_sample(&mut self.steps, StepSample { date, count })
    }

    pub fn log_water(&mut self, date: NaiveDate, amount: f64) -> bool {
        upsert_sample(&mut self.water, WaterSample { date, amount })
    }

    /// Add to the day's water total and return the new total
    pub fn add_water(&mut self, date: NaiveDate, amount: f64) -> f64 {
        let current = latest_on(&self.water, date)
            .map(|w| w.amount)
            .unwrap_or(0.0);
        let total = current + amount;
        self.log_water(date, total);
        total
    }

    /// Append a period; intervals are not keyed by date
    pub fn log_cycle(&mut self, start_date: NaiveDate, end_date: NaiveDate) -> Result<()> {
        let interval = CycleInterval::from_dates(start_date, end_date)?;
        self.cycles.push(interval);
        Ok(())
    }

    pub fn day(&self, date: NaiveDate) -> DaySnapshot {
        DaySnapshot {
            date,
            weight: latest_on(&self.weights, date).map(|w| w.weight),
            steps: latest_on(&self.steps, date).map(|s| s.count),
            water: latest_on(&self.water, date).map(|w| w.amount),
            is_period: is_period_day(&self.cycles, date),
        }
    }

    pub fn step_summary(&self, today: NaiveDate, goal: u32) -> DailySummary {
        DailySummary::compute(&DailySeries::from_samples(&self.steps), today, goal as f64)
    }

    pub fn water_summary(&self, today: NaiveDate, goal_oz: f64) -> DailySummary {
        DailySummary::compute(&DailySeries::from_samples(&self.water), today, goal_oz)
    }
}

/// Tracker figures for a daily-total metric such as steps or water
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Mean of all logged days, rounded to a whole number
    pub average: f64,

    pub total: f64,

    /// Value logged for `today`, 0 when nothing was logged
    pub today: f64,

    pub goal: f64,

    /// `today` as a percentage of `goal`
    pub goal_progress_pct: f64,

    /// Most recent entries, oldest first
    pub recent: Vec<(NaiveDate, f64)>,
}

impl DailySummary {
    pub fn compute(series: &DailySeries<f64>, today: NaiveDate, goal: f64) -> Self {
        let total: f64 = series.values().sum();
        let average = if series.is_empty() {
            0.0
        } else {
            (total / series.len() as f64).round()
        };
        let today_value = series.get(today).copied().unwrap_or(0.0);
        let goal_progress_pct = if goal > 0.0 {
            today_value / goal * 100.0
        } else {
            0.0
        };

        let mut recent: Vec<(NaiveDate, f64)> = series
            .iter()
            .rev()
            .take(CHART_WINDOW_ENTRIES)
            .map(|(date, value)| (date, *value))
            .collect();
        recent.reverse();

        DailySummary {
            average,
            total,
            today: today_value,
            goal,
            goal_progress_pct,
            recent,
        }
    }
}

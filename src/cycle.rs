//! Menstrual cycle prediction
//!
//! Averages are taken over every logged interval and rounded to whole days.
//! Ovulation is placed a fixed luteal phase of 14 days before the following
//! period, and the fertile window spans five days before ovulation through
//! the day after it.

use crate::error::{Result, VitalRsError};
use crate::models::{CycleInterval, CyclePrediction, FertileWindow};
use crate::trend::MS_PER_DAY;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cycle length assumed until two periods have been logged
pub const DEFAULT_CYCLE_LENGTH: u32 = 28;

/// Period length assumed until one period has been logged
pub const DEFAULT_PERIOD_LENGTH: u32 = 5;

/// Days between ovulation and the next period start
pub const LUTEAL_PHASE_DAYS: i64 = 14;

pub const FERTILE_DAYS_BEFORE: i64 = 5;
pub const FERTILE_DAYS_AFTER: i64 = 1;

/// How far ahead of a predicted period the alert fires
pub const ALERT_WINDOW_HOURS: i64 = 24;

impl CycleInterval {
    /// Build an interval from its first and last day, deriving the inclusive length
    pub fn from_dates(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        if end_date < start_date {
            return Err(VitalRsError::Validation(format!(
                "Period end {} is before its start {}",
                end_date, start_date
            )));
        }

        Ok(CycleInterval {
            start_date,
            end_date,
            period_length: ((end_date - start_date).num_days() + 1) as u32,
        })
    }

    /// Whether `date` falls on a bleeding day of this interval
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// Ovulation estimate attached to one logged interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvulationMarker {
    pub cycle_start: NaiveDate,
    pub ovulation: NaiveDate,
}

/// Average number of days between consecutive period starts.
///
/// Intervals logged twice with the same start date contribute no gap.
pub fn average_cycle_length(intervals: &[CycleInterval]) -> u32 {
    let mut starts: Vec<NaiveDate> = intervals.iter().map(|i| i.start_date).collect();
    starts.sort_by(|a, b| b.cmp(a));

    let gaps: Vec<i64> = starts
        .windows(2)
        .map(|w| (w[0] - w[1]).num_days())
        .filter(|gap| *gap != 0)
        .collect();

    if gaps.is_empty() {
        debug!(
            intervals = intervals.len(),
            "Not enough cycles for an average, using default"
        );
        return DEFAULT_CYCLE_LENGTH;
    }

    (gaps.iter().sum::<i64>() as f64 / gaps.len() as f64).round() as u32
}

/// Average inclusive bleeding days per logged period
pub fn average_period_length(intervals: &[CycleInterval]) -> u32 {
    if intervals.is_empty() {
        return DEFAULT_PERIOD_LENGTH;
    }

    let total: u64 = intervals.iter().map(|i| i.period_length as u64).sum();
    (total as f64 / intervals.len() as f64).round() as u32
}

/// Most recent start date plus the average cycle length
pub fn predict_next_period_start(intervals: &[CycleInterval]) -> Option<NaiveDate> {
    let last_start = intervals.iter().map(|i| i.start_date).max()?;
    let avg_cycle = average_cycle_length(intervals);
    last_start.checked_add_signed(Duration::days(avg_cycle as i64))
}

/// Ovulation for the cycle that begins on `period_start`.
///
/// Pass `DEFAULT_CYCLE_LENGTH` when no average is known.
pub fn predict_ovulation_date(period_start: NaiveDate, avg_cycle_length: u32) -> NaiveDate {
    let offset = avg_cycle_length as i64 - LUTEAL_PHASE_DAYS;
    period_start
        .checked_add_signed(Duration::days(offset))
        .unwrap_or(period_start)
}

/// Fertile days around an ovulation date
pub fn fertile_window(ovulation: NaiveDate) -> FertileWindow {
    FertileWindow {
        start: ovulation
            .checked_sub_signed(Duration::days(FERTILE_DAYS_BEFORE))
            .unwrap_or(ovulation),
        ovulation,
        end: ovulation
            .checked_add_signed(Duration::days(FERTILE_DAYS_AFTER))
            .unwrap_or(ovulation),
    }
}

/// Instant at which a calendar date begins (midnight UTC)
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Alert when the predicted period begins within the next 24 hours of `now`
pub fn should_alert_at(predicted_next_period: Option<NaiveDate>, now: DateTime<Utc>) -> bool {
    let Some(date) = predicted_next_period else {
        return false;
    };

    let until = start_of_day(date) - now;
    until > Duration::zero() && until <= Duration::hours(ALERT_WINDOW_HOURS)
}

/// Wall-clock variant of [`should_alert_at`]; re-evaluate on every check
pub fn should_alert(predicted_next_period: Option<NaiveDate>) -> bool {
    should_alert_at(predicted_next_period, Utc::now())
}

/// Whole days from `now` until `date` begins, rounded up; zero or negative once reached
pub fn days_until(date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let millis = (start_of_day(date) - now).num_milliseconds() as f64;
    (millis / MS_PER_DAY).ceil() as i64
}

/// True if any logged interval covers `date`
pub fn is_period_day(intervals: &[CycleInterval], date: NaiveDate) -> bool {
    intervals.iter().any(|i| i.covers(date))
}

/// One ovulation estimate per interval, all using a single shared average cycle length
pub fn ovulation_markers(intervals: &[CycleInterval]) -> Vec<OvulationMarker> {
    let mut sorted: Vec<&CycleInterval> = intervals.iter().collect();
    sorted.sort_by_key(|i| i.start_date);

    let avg_cycle = average_cycle_length(intervals);

    sorted
        .into_iter()
        .map(|interval| OvulationMarker {
            cycle_start: interval.start_date,
            ovulation: predict_ovulation_date(interval.start_date, avg_cycle),
        })
        .collect()
}

/// Every derived cycle value, evaluated against `now`
pub fn predict(intervals: &[CycleInterval], now: DateTime<Utc>) -> CyclePrediction {
    let avg_cycle_length = average_cycle_length(intervals);
    let avg_period_length = average_period_length(intervals);
    let next_period_start = predict_next_period_start(intervals);

    let next_period_end = next_period_start.and_then(|start| {
        start.checked_add_signed(Duration::days(avg_period_length.saturating_sub(1) as i64))
    });
    let predicted_ovulation_date =
        next_period_start.map(|start| predict_ovulation_date(start, avg_cycle_length));

    CyclePrediction {
        avg_cycle_length,
        avg_period_length,
        next_period_start,
        next_period_end,
        predicted_ovulation_date,
        fertile_window: predicted_ovulation_date.map(fertile_window),
        alert_active: should_alert_at(next_period_start, now),
    }
}

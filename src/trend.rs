use crate::models::WeightSample;
use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Milliseconds in one calendar day
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Daily slopes smaller than this are reported as stable
pub const STABLE_SLOPE_THRESHOLD: f64 = 0.01;

/// Milliseconds since the Unix epoch at midnight UTC of `date`
pub fn date_to_millis(date: NaiveDate) -> f64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis() as f64
}

/// Least-squares slope of weight over time, in pounds per day.
///
/// Returns 0 for fewer than two samples, and for samples that all share
/// one date (the regression has no horizontal spread to fit against).
pub fn estimate_trend(samples: &[WeightSample]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }

    let mut sorted: Vec<&WeightSample> = samples.iter().collect();
    sorted.sort_by_key(|s| s.date);

    let n = sorted.len() as f64;
    let xs: Vec<f64> = sorted.iter().map(|s| date_to_millis(s.date)).collect();
    let ys: Vec<f64> = sorted.iter().map(|s| s.weight).collect();

    // Centre x on its mean; raw epoch millis squared lose precision in f64
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (sum_xy, sum_xx) = xs
        .iter()
        .zip(ys.iter())
        .fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
            let dx = x - mean_x;
            (sxy + dx * (y - mean_y), sxx + dx * dx)
        });

    if sum_xx.abs() < f64::EPSILON {
        debug!(samples = samples.len(), "All weight samples share one date, trend is 0");
        return 0.0;
    }

    (sum_xy / sum_xx) * MS_PER_DAY
}

/// Days until `goal` is reached at `daily_slope`, rounded up.
///
/// `None` when the slope is flat or moves away from the goal.
pub fn estimate_days_to_goal(current: f64, goal: f64, daily_slope: f64) -> Option<u32> {
    if daily_slope == 0.0 {
        return None;
    }

    let difference = goal - current;
    if (difference > 0.0 && daily_slope < 0.0) || (difference < 0.0 && daily_slope > 0.0) {
        return None;
    }

    let days = (difference / daily_slope).abs().ceil();
    if days > u32::MAX as f64 {
        debug!(days, "Goal projection beyond representable horizon");
        return None;
    }

    Some(days as u32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Losing,
    Stable,
    Gaining,
}

impl TrendDirection {
    pub fn from_slope(daily_slope: f64) -> Self {
        if daily_slope <= -STABLE_SLOPE_THRESHOLD {
            TrendDirection::Losing
        } else if daily_slope >= STABLE_SLOPE_THRESHOLD {
            TrendDirection::Gaining
        } else {
            TrendDirection::Stable
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TrendDirection::Losing => "Trending down",
            TrendDirection::Stable => "Holding steady",
            TrendDirection::Gaining => "Trending up",
        }
    }
}

/// Snapshot of weight progress toward a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightProgress {
    /// Most recently logged weight
    pub current: Option<f64>,

    /// Goal weight
    pub goal: f64,

    /// Regression slope in pounds per day
    pub daily_trend: f64,

    /// Projected days until the goal is reached
    pub days_to_goal: Option<u32>,

    pub direction: TrendDirection,
}

impl WeightProgress {
    pub fn compute(samples: &[WeightSample], goal: f64) -> Self {
        let current = samples
            .iter()
            .max_by_key(|s| s.date)
            .map(|s| s.weight);
        let daily_trend = estimate_trend(samples);
        let days_to_goal =
            current.and_then(|weight| estimate_days_to_goal(weight, goal, daily_trend));

        WeightProgress {
            current,
            goal,
            daily_trend,
            days_to_goal,
            direction: TrendDirection::from_slope(daily_trend),
        }
    }

    /// Calendar date the goal is projected to be reached, counted from `from`
    pub fn projected_goal_date(&self, from: NaiveDate) -> Option<NaiveDate> {
        self.days_to_goal
            .and_then(|days| from.checked_add_days(Days::new(days as u64)))
    }

    /// Trend expressed per week, as shown next to the chart
    pub fn weekly_trend(&self) -> f64 {
        self.daily_trend * 7.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    }

    fn sample(offset: u64, weight: f64) -> WeightSample {
        WeightSample {
            date: day(offset),
            weight,
        }
    }

    #[test]
    fn test_trend_needs_two_samples() {
        assert_eq!(estimate_trend(&[]), 0.0);
        assert_eq!(estimate_trend(&[sample(0, 180.0)]), 0.0);
    }

    #[test]
    fn test_trend_identical_dates() {
        let samples = vec![sample(3, 180.0), sample(3, 176.0), sample(3, 171.0)];
        let trend = estimate_trend(&samples);
        assert_eq!(trend, 0.0);
        assert!(trend.is_finite());
    }

    #[test]
    fn test_trend_unsorted_input() {
        // Half a pound lost per day, supplied out of order
        let samples = vec![sample(10, 175.0), sample(0, 180.0), sample(4, 178.0)];
        let trend = estimate_trend(&samples);
        assert!((trend + 0.5).abs() < 1e-9, "trend was {}", trend);
    }

    #[test]
    fn test_trend_noisy_gain() {
        let samples = vec![
            sample(0, 150.0),
            sample(1, 151.0),
            sample(2, 150.5),
            sample(3, 152.0),
        ];
        let trend = estimate_trend(&samples);
        // sxy = 2.75 over sxx = 5
        assert!((trend - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_days_to_goal() {
        assert_eq!(estimate_days_to_goal(100.0, 90.0, -0.5), Some(20));
        assert_eq!(estimate_days_to_goal(100.0, 110.0, -0.5), None);
        assert_eq!(estimate_days_to_goal(100.0, 90.0, 0.0), None);
        assert_eq!(estimate_days_to_goal(100.0, 110.0, 0.3), Some(34));
        assert_eq!(estimate_days_to_goal(100.0, 100.0, 0.3), Some(0));
    }

    #[test]
    fn test_days_to_goal_out_of_range() {
        assert_eq!(estimate_days_to_goal(200.0, 150.0, -1e-12), None);
        assert_eq!(estimate_days_to_goal(200.0, 150.0, -f64::MIN_POSITIVE), None);

        let samples = vec![sample(0, 200.0), sample(1, 200.0 - 1e-9)];
        let progress = WeightProgress::compute(&samples, 150.0);
        assert_eq!(progress.days_to_goal, None);
    }

    #[test]
    fn test_weight_progress() {
        let samples = vec![sample(0, 180.0), sample(10, 175.0), sample(4, 178.0)];
        let progress = WeightProgress::compute(&samples, 170.0);

        assert_eq!(progress.current, Some(175.0));
        assert_eq!(progress.days_to_goal, Some(10));
        assert_eq!(progress.direction, TrendDirection::Losing);
        assert!((progress.weekly_trend() + 3.5).abs() < 1e-9);
        assert_eq!(progress.projected_goal_date(day(10)), Some(day(20)));
    }

    #[test]
    fn test_weight_progress_without_samples() {
        let progress = WeightProgress::compute(&[], 150.0);
        assert_eq!(progress.current, None);
        assert_eq!(progress.days_to_goal, None);
        assert_eq!(progress.direction, TrendDirection::Stable);
        assert_eq!(progress.projected_goal_date(day(0)), None);
    }

    proptest! {
        #[test]
        fn test_exact_linear_series_recovers_slope(
            start in 100.0f64..300.0,
            slope in -2.0f64..2.0,
            count in 2usize..60
        ) {
            let samples: Vec<WeightSample> = (0..count)
                .map(|i| sample(i as u64 * 2, start + slope * (i as f64 * 2.0)))
                .collect();

            let trend = estimate_trend(&samples);
            prop_assert!((trend - slope).abs() < 1e-6);
        }

        #[test]
        fn test_days_to_goal_never_points_backwards(
            current in 100.0f64..300.0,
            goal in 100.0f64..300.0,
            slope in -3.0f64..3.0
        ) {
            prop_assume!(slope.abs() > 1e-3);
            if let Some(days) = estimate_days_to_goal(current, goal, slope) {
                // Following the trend for that many days reaches or passes the goal
                let reached = current + slope * days as f64;
                if goal < current {
                    prop_assert!(reached <= goal + 1e-9);
                } else {
                    prop_assert!(reached >= goal - 1e-9);
                }
            }
        }
    }
}

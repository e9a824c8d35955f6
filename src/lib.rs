// Library interface for VitalRS modules
// The CLI and integration tests both go through this crate root

pub mod alignment;
pub mod config;
pub mod cycle;
pub mod error;
pub mod logging;
pub mod models;
pub mod series;
pub mod trend;

// Re-export commonly used types for convenience
pub use models::*;
pub use alignment::{align, aligned_dates, normalize, series_ranges, timeline, SeriesRanges};
pub use cycle::{
    average_cycle_length, average_period_length, fertile_window, predict, predict_next_period_start,
    predict_ovulation_date, should_alert, should_alert_at,
};
pub use series::{merge_by_date, DailySeries, DailySummary, DaySnapshot, HealthLog};
pub use trend::{estimate_days_to_goal, estimate_trend, TrendDirection, WeightProgress};
pub use config::AppConfig;
pub use error::{Result, VitalRsError};
pub use logging::{LogConfig, LogFormat, LogLevel};

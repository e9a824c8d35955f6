use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Pounds per kilogram
pub const KG_TO_LBS: f64 = 2.20462;

/// Kilograms per pound
pub const LBS_TO_KG: f64 = 0.453592;

/// Body weight measurement for a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSample {
    /// Day the weight was logged (unique within a series)
    pub date: NaiveDate,

    /// Weight in pounds
    pub weight: f64,
}

/// Daily step count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSample {
    pub date: NaiveDate,

    #[serde(alias = "steps")]
    pub count: u32,
}

/// Daily hydration volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterSample {
    pub date: NaiveDate,

    /// Volume in fluid ounces
    pub amount: f64,
}

/// One logged menstrual period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleInterval {
    /// First day of bleeding
    #[serde(alias = "startDate")]
    pub start_date: NaiveDate,

    /// Last day of bleeding (never before `start_date`)
    #[serde(alias = "endDate")]
    pub end_date: NaiveDate,

    /// Inclusive day count from start to end
    #[serde(alias = "periodLength")]
    pub period_length: u32,
}

/// Weight display units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WeightUnit {
    #[default]
    #[serde(rename = "lbs")]
    Pounds,
    #[serde(rename = "kg")]
    Kilograms,
}

impl WeightUnit {
    /// Convert a stored weight (pounds) into this unit for display
    pub fn from_pounds(&self, pounds: f64) -> f64 {
        match self {
            WeightUnit::Pounds => pounds,
            WeightUnit::Kilograms => pounds * LBS_TO_KG,
        }
    }

    /// Convert a weight entered in this unit to pounds for storage
    pub fn to_pounds(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Pounds => value,
            WeightUnit::Kilograms => value * KG_TO_LBS,
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            WeightUnit::Pounds => "lbs",
            WeightUnit::Kilograms => "kg",
        }
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lbs" | "lb" | "pounds" => Ok(WeightUnit::Pounds),
            "kg" | "kgs" | "kilograms" => Ok(WeightUnit::Kilograms),
            _ => Err(format!("Invalid weight unit: {}", s)),
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Metrics that can be placed on the comparison timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    Weight,
    Steps,
    Water,
    Ovulation,
    PeriodLength,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Weight,
        Metric::Steps,
        Metric::Water,
        Metric::Ovulation,
        Metric::PeriodLength,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Weight => "Weight",
            Metric::Steps => "Steps",
            Metric::Water => "Water",
            Metric::Ovulation => "Ovulation",
            Metric::PeriodLength => "Period Length",
        }
    }

    /// Unit suffix used when showing raw values
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Weight => "lbs",
            Metric::Steps => "steps",
            Metric::Water => "oz",
            Metric::Ovulation => "",
            Metric::PeriodLength => "days",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "weight" => Ok(Metric::Weight),
            "steps" => Ok(Metric::Steps),
            "water" => Ok(Metric::Water),
            "ovulation" => Ok(Metric::Ovulation),
            "period-length" | "periodlength" => Ok(Metric::PeriodLength),
            other => Err(format!("Unknown metric: {}", other)),
        }
    }
}

/// Set of metrics currently selected for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSelection {
    pub weight: bool,
    pub steps: bool,
    pub water: bool,
    pub ovulation: bool,
    pub period_length: bool,
}

impl Default for MetricSelection {
    fn default() -> Self {
        Self {
            weight: true,
            steps: false,
            water: false,
            ovulation: false,
            period_length: false,
        }
    }
}

impl MetricSelection {
    pub fn none() -> Self {
        Self {
            weight: false,
            steps: false,
            water: false,
            ovulation: false,
            period_length: false,
        }
    }

    pub fn all() -> Self {
        Self::of(&Metric::ALL)
    }

    pub fn of(metrics: &[Metric]) -> Self {
        let mut selection = Self::none();
        for metric in metrics {
            selection.set(*metric, true);
        }
        selection
    }

    pub fn contains(&self, metric: Metric) -> bool {
        match metric {
            Metric::Weight => self.weight,
            Metric::Steps => self.steps,
            Metric::Water => self.water,
            Metric::Ovulation => self.ovulation,
            Metric::PeriodLength => self.period_length,
        }
    }

    pub fn set(&mut self, metric: Metric, selected: bool) {
        match metric {
            Metric::Weight => self.weight = selected,
            Metric::Steps => self.steps = selected,
            Metric::Water => self.water = selected,
            Metric::Ovulation => self.ovulation = selected,
            Metric::PeriodLength => self.period_length = selected,
        }
    }

    pub fn toggle(&mut self, metric: Metric) {
        let current = self.contains(metric);
        self.set(metric, !current);
    }

    pub fn is_empty(&self) -> bool {
        Metric::ALL.iter().all(|m| !self.contains(*m))
    }

    pub fn selected(&self) -> Vec<Metric> {
        Metric::ALL.iter().copied().filter(|m| self.contains(*m)).collect()
    }
}

/// Raw and normalized value of one metric on one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    /// Value as logged (ovulation markers carry 1.0)
    pub raw: f64,

    /// Value rescaled to the 0-100 comparison scale
    pub normalized: f64,
}

/// One row of the merged comparison timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPoint {
    pub date: NaiveDate,

    /// Readings for metrics with data on this date; absent metrics are omitted
    pub readings: BTreeMap<Metric, MetricReading>,
}

impl AlignedPoint {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            readings: BTreeMap::new(),
        }
    }

    pub fn get(&self, metric: Metric) -> Option<&MetricReading> {
        self.readings.get(&metric)
    }

    pub fn has(&self, metric: Metric) -> bool {
        self.readings.contains_key(&metric)
    }
}

/// Observed minimum and maximum of a metric series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesRange {
    pub min: f64,
    pub max: f64,
}

impl SeriesRange {
    /// Range over the given values, `None` when there are none
    pub fn of<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values.into_iter().fold(None, |range, value| match range {
            None => Some(SeriesRange {
                min: value,
                max: value,
            }),
            Some(r) => Some(SeriesRange {
                min: r.min.min(value),
                max: r.max.max(value),
            }),
        })
    }

    pub fn is_flat(&self) -> bool {
        self.min == self.max
    }
}

/// Predicted fertile days around an ovulation date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FertileWindow {
    pub start: NaiveDate,
    pub ovulation: NaiveDate,
    pub end: NaiveDate,
}

impl FertileWindow {
    /// Inclusive on both ends
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Cycle predictions derived from the logged intervals; recomputed on every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyclePrediction {
    /// Average days between period starts
    pub avg_cycle_length: u32,

    /// Average bleeding days per period
    pub avg_period_length: u32,

    /// Predicted start of the next period
    pub next_period_start: Option<NaiveDate>,

    /// Predicted last day of the next period
    pub next_period_end: Option<NaiveDate>,

    /// Predicted ovulation in the cycle beginning at `next_period_start`
    pub predicted_ovulation_date: Option<NaiveDate>,

    /// Fertile window around `predicted_ovulation_date`
    pub fertile_window: Option<FertileWindow>,

    /// Next period expected within the coming 24 hours
    pub alert_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_unit_conversion() {
        assert_eq!(WeightUnit::Pounds.from_pounds(150.0), 150.0);
        assert!((WeightUnit::Kilograms.from_pounds(100.0) - 45.3592).abs() < 1e-9);
        assert!((WeightUnit::Kilograms.to_pounds(50.0) - 110.231).abs() < 1e-9);
        assert_eq!("kg".parse::<WeightUnit>().unwrap(), WeightUnit::Kilograms);
        assert!("stone".parse::<WeightUnit>().is_err());
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("period-length".parse::<Metric>().unwrap(), Metric::PeriodLength);
        assert_eq!("Period_Length".parse::<Metric>().unwrap(), Metric::PeriodLength);
        assert_eq!(" steps ".parse::<Metric>().unwrap(), Metric::Steps);
        assert!("heart-rate".parse::<Metric>().is_err());
    }

    #[test]
    fn test_metric_selection() {
        let mut selection = MetricSelection::default();
        assert_eq!(selection.selected(), vec![Metric::Weight]);

        selection.toggle(Metric::Weight);
        assert!(selection.is_empty());

        let selection = MetricSelection::of(&[Metric::Steps, Metric::Ovulation]);
        assert!(selection.contains(Metric::Steps));
        assert!(selection.contains(Metric::Ovulation));
        assert!(!selection.contains(Metric::Water));
        assert_eq!(MetricSelection::all().selected().len(), 5);
    }

    #[test]
    fn test_series_range() {
        assert_eq!(SeriesRange::of(Vec::<f64>::new()), None);

        let range = SeriesRange::of(vec![3.0, 1.0, 2.0]).unwrap();
        assert_eq!(range.min, 1.0);
        assert_eq!(range.max, 3.0);
        assert!(!range.is_flat());
        assert!(SeriesRange::of(vec![7.0]).unwrap().is_flat());
    }

    #[test]
    fn test_interval_deserializes_camel_case() {
        let json = r#"{"startDate":"2024-01-01","endDate":"2024-01-05","periodLength":5}"#;
        let interval: CycleInterval = serde_json::from_str(json).unwrap();
        assert_eq!(interval.period_length, 5);
        assert_eq!(interval.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}

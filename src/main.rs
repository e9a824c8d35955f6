use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use vitalrs::alignment::{align, series_ranges};
use vitalrs::config::{AppConfig, CONFIG_KEYS};
use vitalrs::cycle::{self, days_until};
use vitalrs::error::{parse_date, ErrorSeverity};
use vitalrs::logging::init_logging;
use vitalrs::models::{Metric, MetricSelection, SeriesRange, WeightUnit};
use vitalrs::series::HealthLog;
use vitalrs::trend::WeightProgress;

/// VitalRS - Personal Health Trend CLI
///
/// Weight trends and goal projections, menstrual cycle predictions and a
/// normalized comparison of weight, steps, water and cycle data.
#[derive(Parser)]
#[command(name = "vitalrs")]
#[command(version)]
#[command(about = "Personal health trend analysis", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show weight trend and projected days to goal
    Trend {
        /// JSON snapshot of logged records
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Goal weight in the display unit (defaults to the configured goal)
        #[arg(short, long)]
        goal: Option<f64>,

        /// Display unit (lbs or kg)
        #[arg(short, long)]
        unit: Option<WeightUnit>,
    },

    /// Predict the next period, ovulation and fertile window
    Cycle {
        /// JSON snapshot of logged records
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Compare metrics on a shared, normalized timeline
    Compare {
        /// JSON snapshot of logged records
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Metrics to include (weight, steps, water, ovulation, period-length)
        #[arg(short, long, value_delimiter = ',', default_value = "weight")]
        metrics: Vec<Metric>,
    },

    /// Daily step and water summaries
    Summary {
        /// JSON snapshot of logged records
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Day to summarize (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (KEY=VALUE)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,
    },
}

#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    raw: String,
    #[tabled(rename = "Normalized")]
    normalized: String,
}

#[derive(Tabled)]
struct RangeRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Range")]
    range: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.raised_by(cli.verbose);
    init_logging(&log_config)?;

    match cli.command {
        Commands::Trend { data, goal, unit } => {
            let log = load_log(data, &config)?;
            let unit = unit.unwrap_or(config.display.weight_unit);
            let goal_lbs = goal
                .map(|g| unit.to_pounds(g))
                .unwrap_or(config.goals.goal_weight_lbs);
            show_trend(&log, goal_lbs, unit);
        }

        Commands::Cycle { data } => {
            let log = load_log(data, &config)?;
            show_cycle(&log);
        }

        Commands::Compare { data, metrics } => {
            let log = load_log(data, &config)?;
            show_comparison(&log, &MetricSelection::of(&metrics));
        }

        Commands::Summary { data, date } => {
            let log = load_log(data, &config)?;
            let day = match date {
                Some(d) => parse_date(&d)?,
                None => Utc::now().date_naive(),
            };
            show_summary(&log, day, &config);
        }

        Commands::Config { list, set, get } => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(AppConfig::default_config_path);

            if let Some(key_value) = set {
                let (key, value) = key_value
                    .split_once('=')
                    .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{}'", key_value))?;
                config.set(key.trim(), value.trim())?;
                config.save_to_file(&path)?;
                println!("{} {} = {}", "✓".green(), key.trim(), value.trim());
            } else if let Some(key) = get {
                let value = config
                    .get(&key)
                    .ok_or_else(|| anyhow!("Unknown configuration key: {}", key))?;
                println!("{}", value);
            } else if list {
                println!("{} {}", "Configuration:".bold(), path.display().to_string().dimmed());
                for key in CONFIG_KEYS {
                    println!("  {} = {}", key, config.get(key).unwrap_or_default());
                }
            }
        }
    }

    Ok(())
}

fn load_log(cli_path: Option<PathBuf>, config: &AppConfig) -> Result<HealthLog> {
    let path = cli_path
        .or_else(|| config.data.snapshot_path.clone())
        .ok_or_else(|| anyhow!("No data file given; pass --data or set data.snapshot_path"))?;

    HealthLog::load_json(&path).map_err(|err| {
        match err.severity() {
            ErrorSeverity::Warning => tracing::warn!(error = %err, "Could not load health log"),
            ErrorSeverity::Error => tracing::error!(error = %err, "Could not load health log"),
        }
        anyhow!(err.user_message()).context(format!("Loading {}", path.display()))
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

fn show_trend(log: &HealthLog, goal_lbs: f64, unit: WeightUnit) {
    let progress = WeightProgress::compute(&log.weights, goal_lbs);
    let today = Utc::now().date_naive();

    println!("{}", "Weight progress".cyan().bold());

    match progress.current {
        Some(current) => println!("  Current:  {:.1} {}", unit.from_pounds(current), unit),
        None => println!("  Current:  {}", "No data".dimmed()),
    }
    println!("  Goal:     {:.1} {}", unit.from_pounds(progress.goal), unit);
    println!(
        "  Trend:    {:+.2} {unit}/day ({:+.2} {unit}/week) - {}",
        unit.from_pounds(progress.daily_trend),
        unit.from_pounds(progress.weekly_trend()),
        progress.direction.description(),
        unit = unit,
    );

    match (progress.days_to_goal, progress.projected_goal_date(today)) {
        (Some(days), Some(on)) => println!(
            "  {} {} days (around {})",
            "Goal in:".green(),
            days,
            format_date(on)
        ),
        (Some(days), None) => println!("  {} {} days", "Goal in:".green(), days),
        _ => println!(
            "  {}",
            "Goal not reachable at the current trend".yellow()
        ),
    }
}

fn show_cycle(log: &HealthLog) {
    let now = Utc::now();
    let prediction = cycle::predict(&log.cycles, now);

    println!("{}", "Cycle predictions".magenta().bold());
    println!("  Average cycle:  {} days", prediction.avg_cycle_length);
    println!("  Average period: {} days", prediction.avg_period_length);

    let Some(next) = prediction.next_period_start else {
        println!("  {}", "Log a period to see predictions".dimmed());
        return;
    };

    let until = days_until(next, now);
    let relative = if until > 0 {
        format!("in {} days", until)
    } else {
        "today or passed".to_string()
    };
    println!("  Next period:    {} ({})", format_date(next), relative);

    if let Some(ovulation) = prediction.predicted_ovulation_date {
        let until = days_until(ovulation, now);
        let relative = if until > 0 {
            format!("in {} days", until)
        } else {
            "passed".to_string()
        };
        println!("  Ovulation:      {} ({})", format_date(ovulation), relative);
    }

    if let Some(window) = prediction.fertile_window {
        println!(
            "  Fertile window: {} - {}",
            format_date(window.start),
            format_date(window.end)
        );
    }

    if prediction.alert_active {
        println!(
            "{}",
            "Your period is expected within the next 24 hours".red().bold()
        );
    }
}

fn show_comparison(log: &HealthLog, selection: &MetricSelection) {
    println!("{}", "Comparison".blue().bold());

    if selection.is_empty() {
        println!("  {}", "Select at least one metric to display".dimmed());
        return;
    }

    let rows = align(&log.weights, &log.steps, &log.water, &log.cycles, selection);
    if rows.is_empty() {
        println!("  {}", "No data available for selected metrics".dimmed());
    } else {
        let table_rows: Vec<ComparisonRow> = rows
            .iter()
            .flat_map(|point| {
                selection.selected().into_iter().filter_map(move |metric| {
                    point.get(metric).map(|reading| ComparisonRow {
                        date: point.date.to_string(),
                        metric: metric.label().to_string(),
                        raw: format_raw(metric, reading.raw),
                        normalized: format!("{:.0}", reading.normalized),
                    })
                })
            })
            .collect();
        println!("{}", Table::new(table_rows).with(Style::rounded()));
    }

    let ranges = series_ranges(&log.weights, &log.steps, &log.water, &log.cycles);
    let ovulation = if ranges.ovulation_count > 0 {
        format!("{} recorded", ranges.ovulation_count)
    } else {
        "No data".to_string()
    };
    let range_rows = vec![
        range_row(Metric::Weight, ranges.weight),
        range_row(Metric::Steps, ranges.steps),
        range_row(Metric::Water, ranges.water),
        RangeRow {
            metric: Metric::Ovulation.label().to_string(),
            range: ovulation,
        },
        range_row(Metric::PeriodLength, ranges.period_length),
    ];
    println!("{}", Table::new(range_rows).with(Style::rounded()));
    println!(
        "{}",
        "Values are normalized to a 0-100 scale per metric.".dimmed()
    );
}

fn format_raw(metric: Metric, raw: f64) -> String {
    match metric {
        Metric::Weight | Metric::Water => format!("{:.1} {}", raw, metric.unit()),
        Metric::Ovulation => "Ovulation".to_string(),
        _ => format!("{:.0} {}", raw, metric.unit()),
    }
}

fn range_row(metric: Metric, range: Option<SeriesRange>) -> RangeRow {
    let range = match range {
        Some(r) => format!(
            "{} - {}",
            format_raw(metric, r.min),
            format_raw(metric, r.max)
        ),
        None => "No data".to_string(),
    };

    RangeRow {
        metric: metric.label().to_string(),
        range,
    }
}

fn show_summary(log: &HealthLog, day: NaiveDate, config: &AppConfig) {
    let steps = log.step_summary(day, config.goals.step_goal);
    let water = log.water_summary(day, config.goals.water_goal_oz);
    let snapshot = log.day(day);
    let unit = config.display.weight_unit;

    println!("{} {}", "Summary for".green().bold(), format_date(day));

    println!(
        "  Steps: {:.0} ({:.0}% of {:.0} goal), average {:.0}, total {:.0}",
        steps.today, steps.goal_progress_pct, steps.goal, steps.average, steps.total
    );
    println!(
        "  Water: {:.1} oz ({:.0}% of {:.0} oz goal), average {:.0} oz",
        water.today, water.goal_progress_pct, water.goal, water.average
    );

    match snapshot.weight {
        Some(w) => println!("  Weight: {:.1} {}", unit.from_pounds(w), unit),
        None => println!("  Weight: {}", "not logged".dimmed()),
    }
    if snapshot.is_period {
        println!("  {}", "Period day".red());
    }
}

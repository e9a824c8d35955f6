use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::VitalRsError;
use crate::logging::LogConfig;
use crate::models::WeightUnit;
use crate::series::{DEFAULT_STEP_GOAL, DEFAULT_WATER_GOAL_OZ};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// Daily and long-term targets
    #[serde(default)]
    pub goals: GoalSettings,

    /// Presentation preferences
    #[serde(default)]
    pub display: DisplaySettings,

    /// Where the record snapshot lives
    #[serde(default)]
    pub data: DataSettings,

    /// Logging setup
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalSettings {
    /// Goal weight, always stored in pounds
    pub goal_weight_lbs: f64,

    pub step_goal: u32,

    pub water_goal_oz: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DisplaySettings {
    /// Unit weights are shown and entered in
    pub weight_unit: WeightUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DataSettings {
    /// JSON snapshot used when `--data` is not given
    pub snapshot_path: Option<PathBuf>,
}

impl Default for GoalSettings {
    fn default() -> Self {
        GoalSettings {
            goal_weight_lbs: 150.0,
            step_goal: DEFAULT_STEP_GOAL,
            water_goal_oz: DEFAULT_WATER_GOAL_OZ,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            goals: GoalSettings::default(),
            display: DisplaySettings::default(),
            data: DataSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Keys accepted by `get` and `set`
pub const CONFIG_KEYS: [&str; 8] = [
    "goals.goal_weight_lbs",
    "goals.step_goal",
    "goals.water_goal_oz",
    "display.weight_unit",
    "data.snapshot_path",
    "logging.level",
    "logging.format",
    "logging.file_path",
];

fn invalid(key: &str, value: &str, reason: impl std::fmt::Display) -> VitalRsError {
    VitalRsError::Configuration(format!("{} = '{}': {}", key, value, reason))
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".vitalrs")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults when the file is missing
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from_file(&config_path)
    }

    /// Read a setting by dotted key
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "goals.goal_weight_lbs" => self.goals.goal_weight_lbs.to_string(),
            "goals.step_goal" => self.goals.step_goal.to_string(),
            "goals.water_goal_oz" => self.goals.water_goal_oz.to_string(),
            "display.weight_unit" => self.display.weight_unit.to_string(),
            "data.snapshot_path" => self
                .data
                .snapshot_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "logging.level" => self.logging.level.to_filter().to_string(),
            "logging.format" => format!("{:?}", self.logging.format).to_lowercase(),
            "logging.file_path" => self
                .logging
                .file_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            _ => return None,
        };
        Some(value)
    }

    /// Update a setting by dotted key, validating the value
    pub fn set(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        match key {
            "goals.goal_weight_lbs" => {
                let weight: f64 = value.parse().map_err(|e| invalid(key, value, e))?;
                if weight <= 0.0 {
                    return Err(invalid(key, value, "goal weight must be positive"));
                }
                self.goals.goal_weight_lbs = weight;
            }
            "goals.step_goal" => {
                self.goals.step_goal = value.parse().map_err(|e| invalid(key, value, e))?;
            }
            "goals.water_goal_oz" => {
                let amount: f64 = value.parse().map_err(|e| invalid(key, value, e))?;
                if amount < 0.0 {
                    return Err(invalid(key, value, "water goal cannot be negative"));
                }
                self.goals.water_goal_oz = amount;
            }
            "display.weight_unit" => {
                self.display.weight_unit = value.parse().map_err(|e| invalid(key, value, e))?;
            }
            "data.snapshot_path" => {
                self.data.snapshot_path = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            "logging.level" => {
                self.logging.level = value.parse().map_err(|e| invalid(key, value, e))?;
            }
            "logging.format" => {
                self.logging.format = value.parse().map_err(|e| invalid(key, value, e))?;
            }
            "logging.file_path" => {
                self.logging.file_path = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            _ => {
                return Err(VitalRsError::Configuration(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }

        self.metadata.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.goals, deserialized.goals);
        assert_eq!(config.display.weight_unit, deserialized.display.weight_unit);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
            [metadata]
            version = "1.0"
            created_at = "2024-01-01T00:00:00Z"
            updated_at = "2024-01-01T00:00:00Z"

            [display]
            weight_unit = "kg"
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.display.weight_unit, WeightUnit::Kilograms);
        assert_eq!(config.goals.step_goal, DEFAULT_STEP_GOAL);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_get_and_set() {
        let mut config = AppConfig::default();
        assert_eq!(config.get("goals.goal_weight_lbs").as_deref(), Some("150"));

        config.set("goals.goal_weight_lbs", "142.5").unwrap();
        config.set("display.weight_unit", "kg").unwrap();
        config.set("logging.level", "debug").unwrap();

        assert_eq!(config.goals.goal_weight_lbs, 142.5);
        assert_eq!(config.get("display.weight_unit").as_deref(), Some("kg"));
        assert_eq!(config.get("logging.level").as_deref(), Some("debug"));

        assert!(config.set("goals.goal_weight_lbs", "-3").is_err());
        assert!(config.set("goals.step_goal", "lots").is_err());
        assert!(config.set("no.such.key", "1").is_err());
        assert_eq!(config.get("no.such.key"), None);
    }

    #[test]
    fn test_every_listed_key_is_readable() {
        let config = AppConfig::default();
        for key in CONFIG_KEYS {
            assert!(config.get(key).is_some(), "{} not readable", key);
        }
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original = AppConfig::default();
        original.set("goals.water_goal_oz", "80").unwrap();
        original.save_to_file(&config_path).unwrap();

        let loaded = AppConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.goals.water_goal_oz, 80.0);

        let fallback = AppConfig::load_or_default(Some(&temp_dir.path().join("absent.toml")))
            .unwrap();
        assert_eq!(fallback.goals, GoalSettings::default());
    }
}

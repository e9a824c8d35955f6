//! Unified error hierarchy for VitalRS
//!
//! The analytics functions themselves never fail: empty or degenerate input
//! resolves to documented fallback values. Errors only come from the edges of
//! the crate, when loading record snapshots, reading configuration or
//! building records from user input.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all VitalRS operations
#[derive(Debug, Error)]
pub enum VitalRsError {
    /// Record snapshot loading errors
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors reading a snapshot of logged records
#[derive(Debug, Error)]
pub enum DataError {
    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Snapshot is not valid JSON for the expected record shapes
    #[error("Malformed snapshot: {reason}")]
    Malformed { reason: String },

    /// Date string could not be parsed as YYYY-MM-DD
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },
}

/// Result type alias for VitalRS operations
pub type Result<T> = std::result::Result<T, VitalRsError>;

impl From<serde_json::Error> for VitalRsError {
    fn from(err: serde_json::Error) -> Self {
        VitalRsError::Data(DataError::Malformed {
            reason: err.to_string(),
        })
    }
}

impl VitalRsError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            VitalRsError::Data(DataError::FileNotFound { .. }) => ErrorSeverity::Warning,
            VitalRsError::Data(DataError::InvalidDate { .. }) => ErrorSeverity::Warning,
            VitalRsError::Validation(_) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            VitalRsError::Data(DataError::FileNotFound { path }) => {
                format!("Could not find data file: {}", path.display())
            }
            VitalRsError::Data(DataError::Malformed { reason }) => {
                format!("Data file could not be read: {}", reason)
            }
            VitalRsError::Configuration(reason) => {
                format!("Configuration problem: {}. Check your config file.", reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Parse a calendar date in ISO `YYYY-MM-DD` form
pub fn parse_date(value: &str) -> Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        VitalRsError::Data(DataError::InvalidDate {
            value: value.to_string(),
        })
    })
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = VitalRsError::Data(DataError::FileNotFound {
            path: PathBuf::from("/tmp/health.json"),
        });
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = VitalRsError::Data(DataError::Malformed {
            reason: "expected value".to_string(),
        });
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_user_messages() {
        let err = VitalRsError::Data(DataError::FileNotFound {
            path: PathBuf::from("health.json"),
        });
        assert!(err.user_message().contains("Could not find"));
    }

    #[test]
    fn test_json_errors_become_malformed() {
        let err: VitalRsError = serde_json::from_str::<Vec<u32>>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, VitalRsError::Data(DataError::Malformed { .. })));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("02/01/2024").is_err());
    }
}

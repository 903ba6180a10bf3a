use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Structural errors raised while building calendar value types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalendarError {
    #[error("invalid time of day '{0}' (expected HH:MM)")]
    InvalidTime(String),
    #[error("work slot must start before it ends ({start} >= {end})")]
    EmptySlot { start: NaiveTime, end: NaiveTime },
    #[error("work slot {start}-{end} overlaps an existing slot on {weekday}")]
    OverlappingSlot {
        weekday: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    },
    #[error("no work slot #{index} on {weekday}")]
    SlotNotFound { weekday: Weekday, index: usize },
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("invalid calendar configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Aggregated outcome of a validation pass.
///
/// Errors block the operation being validated, warnings are informational.
/// Reports can be merged so a caller can collect every violation of a whole
/// form before deciding to fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_error(message: impl Into<String>) -> Self {
        let mut report = Self::new();
        report.error(message);
        report
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.is_valid &= other.is_valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// `Ok(self)` when no error was recorded, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<ValidationReport, ValidationReport> {
        if self.is_valid { Ok(self) } else { Err(self) }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() && self.warnings.is_empty() {
            return write!(f, "valid");
        }
        let mut parts = Vec::with_capacity(self.errors.len() + self.warnings.len());
        parts.extend(self.errors.iter().map(|e| format!("error: {e}")));
        parts.extend(self.warnings.iter().map(|w| format!("warning: {w}")));
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationReport {}

/// Renders an hour amount without a trailing `.0` for whole numbers.
pub(crate) fn format_hours(hours: f64) -> String {
    if (hours - hours.round()).abs() < 1e-9 {
        format!("{}", hours.round() as i64)
    } else {
        let text = format!("{hours:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

//! Value of the month lookup backing `POST /api/get-month-value`.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// School values, January first
const DEFAULT_VALUES: [&str; 12] = [
    "Respect",
    "Tolerance",
    "Kindness",
    "Honesty",
    "Responsibility",
    "Perseverance",
    "Gratitude",
    "Cooperation",
    "Belonging",
    "Empathy",
    "Loyalty",
    "Unity",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Date is required")]
    MissingDate,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Maps each month of the year to the value taught that month
#[derive(Debug, Clone)]
pub struct MonthCalendar {
    values: [String; 12],
}

impl Default for MonthCalendar {
    fn default() -> Self {
        Self {
            values: DEFAULT_VALUES.map(String::from),
        }
    }
}

impl MonthCalendar {
    /// Load overrides from a JSON object keyed by month number ("1".."12").
    ///
    /// Months missing from the file keep their default value.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read values file {}", path.display()))?;
        let overrides: HashMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse values file {}", path.display()))?;

        let mut calendar = Self::default();
        for (key, value) in overrides {
            let month: usize = key
                .trim()
                .parse()
                .ok()
                .filter(|m| (1..=12).contains(m))
                .with_context(|| format!("Invalid month key '{}' in values file", key))?;
            calendar.values[month - 1] = value;
        }

        debug!(path = %path.display(), "Loaded month values");
        Ok(calendar)
    }

    /// Value for the month of a `YYYY-MM-DD` date
    pub fn value_for(&self, date: &str) -> Result<&str, CalendarError> {
        let date = date.trim();
        if date.is_empty() {
            return Err(CalendarError::MissingDate);
        }

        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| CalendarError::InvalidDate(date.to_string()))?;

        Ok(&self.values[parsed.month0() as usize])
    }
}

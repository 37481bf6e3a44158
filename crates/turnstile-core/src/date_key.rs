//! Calendar-date lookup keys (`YYYY-MM-DD`).

use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;

use crate::error::SelectionError;

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid")
});

/// A validated `YYYY-MM-DD` key.
///
/// The original string is kept as-is and is what gets hashed, so two
/// callers passing the same date always land on the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateKey(String);

impl DateKey {
    /// Validate shape first, then that the date exists on the calendar.
    pub fn parse(raw: &str) -> Result<Self, SelectionError> {
        if !DATE_PATTERN.is_match(raw) {
            return Err(SelectionError::InvalidKeyFormat(format!(
                "date must be YYYY-MM-DD, got {raw:?}"
            )));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            SelectionError::InvalidKeyFormat(format!("{raw} is not a calendar date"))
        })?;
        Ok(Self(raw.to_string()))
    }

    /// Today's date in UTC.
    pub fn today() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

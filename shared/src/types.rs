//! Common types used across the platform

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a wire string does not name a known variant
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown item status: {0}")]
    ItemStatus(String),

    #[error("unknown user role: {0}")]
    UserRole(String),

    #[error("unknown time bucket: {0}")]
    TimeBucket(String),

    #[error("unknown sort order: {0}")]
    SortOrder(String),
}

/// Sort direction for inspection listings (by timestamp)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ParseError::SortOrder(other.to_string())),
        }
    }
}

/// Granularity of dashboard trend charts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    #[default]
    Day,
    Week,
    Month,
}

impl std::str::FromStr for TimeBucket {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(TimeBucket::Day),
            "week" => Ok(TimeBucket::Week),
            "month" => Ok(TimeBucket::Month),
            other => Err(ParseError::TimeBucket(other.to_string())),
        }
    }
}

/// Inclusive time window for queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeRange {
    pub since: Option<chrono::DateTime<chrono::Utc>>,
    pub until: Option<chrono::DateTime<chrono::Utc>>,
}

impl TimeRange {
    /// Whether `at` falls inside the window; open ends always match
    pub fn contains(&self, at: chrono::DateTime<chrono::Utc>) -> bool {
        self.since.map_or(true, |since| at >= since) && self.until.map_or(true, |until| at <= until)
    }
}

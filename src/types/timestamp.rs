//! Revision identifiers
//!
//! A revision is named after the second it was recorded, formatted as
//! `yyyy-MM-dd_HH-mm-ss`. The format is fixed width, so lexicographic order of
//! the names equals chronological order.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// `strftime` pattern of a revision directory name
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Length of a well-formed identifier (`2012-11-21_11-28-12`)
const TIMESTAMP_LEN: usize = 19;

/// Name of one revision directory
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimestampId(String);

impl TimestampId {
    /// Format a point in time as an identifier (sub-second part dropped)
    pub fn from_datetime(time: NaiveDateTime) -> Self {
        Self(time.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Strictly parse an identifier; lenient forms such as `2012-1-1_1-1-1`
    /// are rejected.
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() != TIMESTAMP_LEN {
            return None;
        }
        NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
            .ok()
            .map(|_| Self(value.to_string()))
    }

    /// The point in time this identifier names
    pub fn datetime(&self) -> NaiveDateTime {
        // Only constructed from a successful parse or from a formatted datetime.
        NaiveDateTime::parse_from_str(&self.0, TIMESTAMP_FORMAT).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimestampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TimestampId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TimestampId::parse(&value).ok_or_else(|| format!("invalid timestamp id '{}'", value))
    }
}

impl From<TimestampId> for String {
    fn from(id: TimestampId) -> Self {
        id.0
    }
}

impl AsRef<str> for TimestampId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn test_format_and_parse() {
        let time = NaiveDate::from_ymd_opt(2012, 11, 21)
            .unwrap()
            .and_hms_milli_opt(11, 28, 12, 750)
            .unwrap();
        let id = TimestampId::from_datetime(time);
        assert_eq!(id.as_str(), "2012-11-21_11-28-12");
        assert_eq!(TimestampId::parse("2012-11-21_11-28-12"), Some(id.clone()));
        assert_eq!(id.datetime(), time.with_nanosecond(0).unwrap());
    }

    #[test]
    fn test_rejects_malformed_values() {
        assert!(TimestampId::parse("").is_none());
        assert!(TimestampId::parse("null").is_none());
        assert!(TimestampId::parse("2012-11-21 11:28:12").is_none());
        assert!(TimestampId::parse("2012-13-21_11-28-12").is_none());
        assert!(TimestampId::parse("2012-1-1_1-1-1").is_none());
        assert!(TimestampId::parse("../2012-11-21_11").is_none());
    }

    #[test]
    fn test_order_is_chronological() {
        let a = TimestampId::parse("2012-11-21_11-28-12").unwrap();
        let b = TimestampId::parse("2012-11-21_11-29-12").unwrap();
        let c = TimestampId::parse("2013-01-01_00-00-00").unwrap();
        assert!(a < b && b < c);
    }
}

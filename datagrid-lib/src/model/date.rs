//! Lenient date parsing shared by type inference and the comparator.

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::Utc;

use super::Value;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// A parsed date string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParsedDate {
    /// The instant, with naive inputs read as UTC.
    pub instant: DateTime<Utc>,
    /// Whether the text carried a time component.
    pub has_time: bool,
}

/// Parses a date or date-time string.
pub(crate) fn parse_date(text: &str) -> Option<ParsedDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(ParsedDate {
            instant: dt.with_timezone(&Utc),
            has_time: true,
        });
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(ParsedDate {
                instant: naive.and_utc(),
                has_time: true,
            });
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(ParsedDate {
                instant: date.and_hms_opt(0, 0, 0)?.and_utc(),
                has_time: false,
            });
        }
    }

    None
}

/// Converts a value to epoch milliseconds. Numbers are taken as epoch
/// milliseconds already.
pub(crate) fn epoch_millis(value: &Value) -> Option<i64> {
    match value {
        Value::DateTime(dt) => Some(dt.timestamp_millis()),
        Value::Int(n) => Some(*n),
        Value::Float(f) if f.is_finite() => Some(*f as i64),
        Value::String(s) => parse_date(s).map(|p| p.instant.timestamp_millis()),
        _ => None,
    }
}

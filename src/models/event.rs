//! Trace events as served by the backend API.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Fixed timestamp format of every `*_datetime` field (UTC, up to µs).
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Microseconds since the Unix epoch (UTC).
pub type Micros = i64;

#[derive(Debug, Error, PartialEq)]
#[error("timestamp '{input}' does not match 'YYYY-MM-DD HH:MM:SS.ffffff'")]
pub struct TimeParseError {
    pub input: String,
}

/// Parse a backend timestamp string into epoch microseconds.
pub fn parse_time(input: &str) -> Result<Micros, TimeParseError> {
    NaiveDateTime::parse_from_str(input.trim(), TIME_FORMAT)
        .map(|dt| dt.and_utc().timestamp_micros())
        .map_err(|_| TimeParseError {
            input: input.to_string(),
        })
}

/// Format epoch microseconds with the given chrono pattern (UTC).
pub fn format_micros(t: Micros, pattern: &str) -> String {
    match DateTime::<Utc>::from_timestamp_micros(t) {
        Some(dt) => dt.format(pattern).to_string(),
        None => String::new(),
    }
}

/// One traced I/O operation: an interval grouped by `event_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_name: String,
    pub en_datetime: String,
    pub ex_datetime: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fname: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub countbytes: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latency: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ret: i64,
}

impl Event {
    /// Parsed `(start, end)` of the interval.
    pub fn span(&self) -> Result<(Micros, Micros), TimeParseError> {
        Ok((parse_time(&self.en_datetime)?, parse_time(&self.ex_datetime)?))
    }
}

/// An instantaneous reference line across the whole chart height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub datetime: String,
}

impl Marker {
    pub fn new(datetime: impl Into<String>) -> Self {
        Self {
            datetime: datetime.into(),
        }
    }

    pub fn time(&self) -> Result<Micros, TimeParseError> {
        parse_time(&self.datetime)
    }
}

/// The backend emits `null` for columns it never filled (e.g. `countbytes`
/// on `open`), which `#[serde(default)]` alone does not cover.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_with_micros() {
        let t = parse_time("1970-01-01 00:00:01.000250").unwrap();
        assert_eq!(t, 1_000_250);
    }

    #[test]
    fn test_parse_time_without_fraction() {
        assert_eq!(parse_time("1970-01-01 00:01:00").unwrap(), 60_000_000);
    }

    #[test]
    fn test_parse_time_rejects_other_formats() {
        assert!(parse_time("2024-01-01T00:00:00Z").is_err());
        assert!(parse_time("").is_err());
        let err = parse_time("yesterday").unwrap_err();
        assert_eq!(err.input, "yesterday");
    }

    #[test]
    fn test_format_micros_keeps_precision() {
        let t = parse_time("2024-03-05 10:20:30.123456").unwrap();
        assert_eq!(format_micros(t, "%H:%M:%S%.6f"), "10:20:30.123456");
    }

    #[test]
    fn test_event_ignores_unknown_fields_and_nulls() {
        let raw = r#"{
            "id": 7, "pid": 42, "proc": "cat", "fd": 3,
            "event_name": "read", "en_datetime": "2024-01-01 00:00:00.000001",
            "ex_datetime": "2024-01-01 00:00:00.000101", "fname": "/etc/hosts",
            "countbytes": null, "latency": 100, "ret": 0
        }"#;
        let ev: Event = serde_json::from_str(raw).unwrap();
        assert_eq!(ev.event_name, "read");
        assert_eq!(ev.countbytes, 0);
        assert_eq!(ev.latency, 100);
        let (start, end) = ev.span().unwrap();
        assert_eq!(end - start, 100);
    }
}

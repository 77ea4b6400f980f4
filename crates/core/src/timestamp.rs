//! Timestamp decoding shared by blob, profile and event records.
//!
//! The service emits ISO-8601 timestamps, sometimes without a UTC offset.
//! Offset-less values are read as UTC. Serialization always emits RFC 3339.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Parse an RFC 3339 or naive ISO-8601 timestamp.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

pub(crate) fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse("2025-03-01T10:00:00+02:00").unwrap();
        assert_eq!(ts.hour(), 8);
    }

    #[test]
    fn parses_naive_as_utc() {
        let ts = parse("2025-03-01T10:00:00.123456").unwrap();
        assert_eq!(ts.day(), 1);
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn parses_space_separated() {
        assert!(parse("2025-03-01 10:00:00").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("yesterday").is_none());
    }
}

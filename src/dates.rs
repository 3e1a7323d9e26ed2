//! Date helpers shared by the status engine, the report projection and the store client

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Placeholder rendered for absent values, on screen and in exports
pub const ABSENT_MARKER: &str = "—";

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Whole days from `earlier` to `later`, rounded to the nearest day.
///
/// The result is negative when `later` precedes `earlier`.
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    let millis = (later - earlier).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY).round() as i64
}

/// Parse a timestamp as the loan store emits it.
///
/// Accepts RFC 3339, naive ISO date-times (taken as UTC) and bare dates
/// (midnight UTC). Anything else yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format a timestamp as a calendar date for display and export
pub fn format_date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ABSENT_MARKER.to_string())
}

/// Render an optional metric, using the absent marker when missing
pub fn format_days(value: Option<i64>) -> String {
    value
        .map(|days| days.to_string())
        .unwrap_or_else(|| ABSENT_MARKER.to_string())
}

/// Serde helper: decode an optional timestamp, mapping unparsable values to `None`
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => parse_timestamp(&s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_days_between_rounds_to_nearest() {
        assert_eq!(days_between(at(2024, 9, 22, 0), at(2024, 9, 29, 0)), 7);
        assert_eq!(days_between(at(2024, 9, 22, 0), at(2024, 9, 22, 13)), 1);
        assert_eq!(days_between(at(2024, 9, 22, 0), at(2024, 9, 22, 11)), 0);
        assert_eq!(days_between(at(2024, 9, 29, 0), at(2024, 9, 22, 0)), -7);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("2024-09-22T10:00:00Z"), Some(at(2024, 9, 22, 10)));
        assert_eq!(
            parse_timestamp("2024-09-22T13:30:00+03:30"),
            Some(at(2024, 9, 22, 10))
        );
        assert_eq!(
            parse_timestamp("2024-09-22T10:00:00.123456").map(|d| d.date_naive()),
            Some(at(2024, 9, 22, 0).date_naive())
        );
        assert_eq!(parse_timestamp("2024-09-22"), Some(at(2024, 9, 22, 0)));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2024-13-45"), None);
    }

    #[test]
    fn test_format_helpers_use_absent_marker() {
        assert_eq!(format_date(None), ABSENT_MARKER);
        assert_eq!(format_date(Some(at(2024, 10, 2, 15))), "2024-10-02");
        assert_eq!(format_days(None), ABSENT_MARKER);
        assert_eq!(format_days(Some(3)), "3");
    }
}

//! Timestamp parsing shared by providers and configuration.

use chrono::{NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a timestamp in any of the accepted formats.
///
/// Accepts `2020-12-20 16:23:00`, `2020-12-20T16:23:00`, an optional
/// trailing `Z`, plain dates, and Unix timestamps in seconds or
/// milliseconds. Returns `None` when nothing matches.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    let value = value.strip_suffix('Z').unwrap_or(value);
    if value.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, format) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    if let Ok(ts) = value.parse::<i64>() {
        // Assume milliseconds if > 10 digits
        let millis = if ts > 10_000_000_000 {
            ts
        } else {
            ts.checked_mul(1000)?
        };
        return chrono::DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc());
    }

    None
}

/// Format a timestamp in the space-separated form used throughout the simulator.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 12, 20)
            .unwrap()
            .and_hms_opt(16, 23, 0)
            .unwrap();

        assert_eq!(parse_datetime("2020-12-20 16:23:00"), Some(expected));
        assert_eq!(parse_datetime("2020-12-20T16:23:00"), Some(expected));
        assert_eq!(parse_datetime("2020-12-20T16:23:00Z"), Some(expected));
        assert_eq!(parse_datetime(" 2020-12-20 16:23 "), Some(expected));
        assert!(parse_datetime("2024-01-15").is_some());
        assert!(parse_datetime("1705312800000").is_some()); // Unix ms
        assert!(parse_datetime("1705312800").is_some()); // Unix sec
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("yesterday"), None);
        assert_eq!(parse_datetime("2020-13-45 99:00:00"), None);
        assert_eq!(parse_datetime("-99999999999999999"), None);
        assert_eq!(parse_datetime("9223372036854775807"), None);
    }

    #[test]
    fn test_format_datetime() {
        let dt = parse_datetime("2020-12-20T18:00:00Z").unwrap();
        assert_eq!(format_datetime(&dt), "2020-12-20 18:00:00");
    }
}

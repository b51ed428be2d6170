//! Calendar date parsing for model output.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parse a `YYYY-MM-DD` date, or the date part of an RFC 3339 or
/// `YYYY-MM-DDTHH:MM:SS` timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    parse_iso_date(value)
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_iso_date("2024-03-15"), ymd(2024, 3, 15));
        assert_eq!(parse_iso_date("2024-02-30"), None);
        assert_eq!(parse_iso_date("15/03/2024"), None);
        assert_eq!(parse_iso_date("2024-03-15T10:00:00Z"), None);
    }

    #[test]
    fn test_parse_date_timestamps() {
        assert_eq!(parse_date("2024-03-15"), ymd(2024, 3, 15));
        assert_eq!(parse_date("2024-03-15T10:30:00Z"), ymd(2024, 3, 15));
        assert_eq!(parse_date("2024-03-15T23:30:00-05:00"), ymd(2024, 3, 15));
        assert_eq!(parse_date("2024-03-15T10:30:00"), ymd(2024, 3, 15));
        assert_eq!(parse_date("2024-03-15 10:30:00"), ymd(2024, 3, 15));
        assert_eq!(parse_date("March 15"), None);
        assert_eq!(parse_date(""), None);
    }
}

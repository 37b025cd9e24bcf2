//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt::Write;

/// Format a date using Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY. MM. DD") // -> Some("2024. 01. 15")
/// ```
///
/// Returns `None` when the format has a specifier chrono rejects.
pub fn format_date(date: &NaiveDateTime, format: &str) -> Option<String> {
    let chrono_format = moment_to_chrono_format(format);
    let mut out = String::new();
    write!(out, "{}", date.format(&chrono_format)).ok()?;
    Some(out)
}

/// Format a post date string for display.
///
/// Dates that cannot be parsed or formatted are shown verbatim.
pub fn display_date(raw: &str, format: &str) -> String {
    match parse_date_string(raw).and_then(|date| format_date(&date, format)) {
        Some(formatted) => formatted,
        None => {
            tracing::debug!("Showing date {:?} as written", raw);
            raw.trim().to_string()
        }
    }
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 / ISO 8601 with offset; keep the wall-clock time as written
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local())
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest patterns first within each category
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2024-01-15", "YYYY. MM. DD"), "2024. 01. 15");
        assert_eq!(
            display_date("2024-01-15T23:30:00+09:00", "YYYY. MM. DD"),
            "2024. 01. 15"
        );
        assert_eq!(display_date("2024-01-15 10:30", "YYYY-MM-DD HH:mm"), "2024-01-15 10:30");
    }

    #[test]
    fn test_unparseable_date_is_verbatim() {
        assert_eq!(display_date(" someday ", "YYYY. MM. DD"), "someday");
    }

    #[test]
    fn test_bad_format_falls_back_to_raw_date() {
        assert_eq!(display_date("2024-01-15", "YYYY %"), "2024-01-15");
        assert_eq!(display_date("2024-01-15", "%Q"), "2024-01-15");
        let date = parse_date_string("2024-01-15").unwrap();
        assert!(format_date(&date, "DD %").is_none());
    }

    #[test]
    fn test_parse_date_ordering() {
        let a = parse_date_string("2024-01-15").unwrap();
        let b = parse_date_string("2024/01/16 08:00").unwrap();
        assert!(a < b);
        assert!(parse_date_string("not a date").is_none());
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY. MM. DD"), "%Y. %m. %d");
        assert_eq!(moment_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
    }
}

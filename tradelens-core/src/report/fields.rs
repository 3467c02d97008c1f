//! Field-level parsing for report rows: timestamps and tolerant numbers.

use chrono::NaiveDateTime;

/// Report timestamp layout, e.g. `2024.01.05 09:30`.
pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M";

/// Same layout with seconds, as some terminals export.
const TIMESTAMP_FORMAT_SECONDS: &str = "%Y.%m.%d %H:%M:%S";

/// Parse a report timestamp as naive local time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT_SECONDS))
        .ok()
}

/// Parse a numeric column, defaulting to 0.0.
///
/// Whitespace inside the value is treated as a thousands separator
/// (`"1 234.50"` → `1234.5`). Non-finite results also become 0.0.
pub fn parse_number(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Like [`parse_number`] for an optional trailing column.
pub fn parse_optional_number(raw: Option<&&str>) -> f64 {
    raw.map(|s| parse_number(s)).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn timestamp_minutes() {
        let t = parse_timestamp("2024.01.05 09:30").unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2024, 1, 5));
        assert_eq!((t.hour(), t.minute()), (9, 30));
    }

    #[test]
    fn timestamp_seconds() {
        let t = parse_timestamp(" 2024.01.05 09:30:15 ").unwrap();
        assert_eq!(t.second(), 15);
    }

    #[test]
    fn timestamp_rejects_other_layouts() {
        assert!(parse_timestamp("2024-01-05 09:30").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn number_plain_and_negative() {
        assert_eq!(parse_number("1.0950"), 1.095);
        assert_eq!(parse_number("-12.50"), -12.5);
    }

    #[test]
    fn number_with_space_thousands() {
        assert_eq!(parse_number("1 234.50"), 1234.5);
        assert_eq!(parse_number("-2\u{a0}000.00"), -2000.0);
    }

    #[test]
    fn number_defaults_to_zero() {
        assert_eq!(parse_number("n/a"), 0.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("inf"), 0.0);
    }

    #[test]
    fn optional_number_missing() {
        assert_eq!(parse_optional_number(None), 0.0);
        assert_eq!(parse_optional_number(Some(&"3.5")), 3.5);
    }
}

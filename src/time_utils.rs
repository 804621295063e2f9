// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time and month-key handling.
//!
//! Competition periods are keyed by calendar month in `YYYY-MM` form; month
//! keys sort lexicographically in chronological order.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Month key (`YYYY-MM`) for an arbitrary timestamp.
pub fn month_key(date: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Month key for the current UTC date.
pub fn current_month_key() -> String {
    month_key(Utc::now())
}

/// Parse a month key into `(year, month)`, rejecting malformed input.
pub fn parse_month_key(key: &str) -> Option<(i32, u32)> {
    let (year, month) = key.split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month))
}

/// Month key for the month following the given one.
pub fn next_month_key(key: &str) -> Option<String> {
    let (year, month) = parse_month_key(key)?;
    Some(if month == 12 {
        format!("{:04}-01", year + 1)
    } else {
        format!("{:04}-{:02}", year, month + 1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_uses_z_suffix() {
        let date = Utc.with_ymd_and_hms(2025, 8, 25, 12, 30, 45).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2025-08-25T12:30:45Z");
    }

    #[test]
    fn test_month_key_zero_pads() {
        let date = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(month_key(date), "2025-03");
    }

    #[test]
    fn test_parse_month_key() {
        assert_eq!(parse_month_key("2025-08"), Some((2025, 8)));
        assert_eq!(parse_month_key("2025-12"), Some((2025, 12)));
        assert_eq!(parse_month_key("2025-13"), None);
        assert_eq!(parse_month_key("2025-00"), None);
        assert_eq!(parse_month_key("25-08"), None);
        assert_eq!(parse_month_key("2025-8"), None);
        assert_eq!(parse_month_key("2025/08"), None);
        assert_eq!(parse_month_key("garbage"), None);
    }

    #[test]
    fn test_next_month_key_rolls_over_year() {
        assert_eq!(next_month_key("2025-08").as_deref(), Some("2025-09"));
        assert_eq!(next_month_key("2025-12").as_deref(), Some("2026-01"));
        assert_eq!(next_month_key("bogus"), None);
    }
}

//! Lenient date parsing for vessel record fields.
//!
//! Record dates arrive as free text from the API: plain dates, RFC 3339
//! timestamps, or naive timestamps. Anything else is treated as absent.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, NaiveTime};

/// Average length of a calendar month in days.
pub const DAYS_PER_MONTH: f64 = 30.4375;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a record date, keeping only the calendar date.
///
/// Returns `None` for empty or unrecognised input.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

/// Parse an optional record date.
#[must_use]
pub fn parse_opt(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(parse_date)
}

/// Parse a record date keeping the time of day.
///
/// Offset timestamps are normalised to UTC and plain dates read as midnight.
/// Returns `None` for empty or unrecognised input.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Parse an optional record timestamp.
#[must_use]
pub fn parse_timestamp_opt(raw: Option<&str>) -> Option<NaiveDateTime> {
    raw.and_then(parse_timestamp)
}

/// Whole calendar years from `since` to `today`.
///
/// Returns `None` when `since` lies after `today`.
#[must_use]
pub fn whole_years_between(since: NaiveDate, today: NaiveDate) -> Option<u32> {
    today.years_since(since)
}

/// Elapsed months from `since` to `today`, as days over the average month.
///
/// Negative when `since` lies in the future.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn months_between(since: NaiveDate, today: NaiveDate) -> f64 {
    (today - since).num_days() as f64 / DAYS_PER_MONTH
}

/// Whether `today` falls no more than `months` calendar months after `since`.
#[must_use]
pub fn within_months(since: NaiveDate, today: NaiveDate, months: u32) -> bool {
    since
        .checked_add_months(Months::new(months))
        .map_or(true, |limit| today <= limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(parse_date("2024-01-31"), Some(ymd(2024, 1, 31)));
        assert_eq!(parse_date("  2024-01-31 "), Some(ymd(2024, 1, 31)));
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(parse_date("2024-02-01T10:30:00Z"), Some(ymd(2024, 2, 1)));
        assert_eq!(
            parse_date("2024-02-01T23:30:00+02:00"),
            Some(ymd(2024, 2, 1))
        );
    }

    #[test]
    fn test_parse_naive_datetime() {
        assert_eq!(parse_date("2024-02-01T10:30:00"), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_date("2024-02-01T10:30:00.123"), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_date("2024-02-01 10:30"), Some(ymd(2024, 2, 1)));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("TBA"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn test_parse_opt() {
        assert_eq!(parse_opt(None), None);
        assert_eq!(parse_opt(Some("2020-05-05")), Some(ymd(2020, 5, 5)));
    }

    #[test]
    fn test_parse_timestamp_keeps_time() {
        let at = |h, m| ymd(2024, 6, 10).and_hms_opt(h, m, 0).unwrap();
        assert_eq!(parse_timestamp("2024-06-10T06:00:00Z"), Some(at(6, 0)));
        assert_eq!(parse_timestamp("2024-06-10T10:00:00+02:00"), Some(at(8, 0)));
        assert_eq!(parse_timestamp("2024-06-10 22:15"), Some(at(22, 15)));
        assert_eq!(parse_timestamp("2024-06-10"), Some(at(0, 0)));
        assert!(parse_timestamp("2024-06-10T06:00:00Z") < parse_timestamp("2024-06-10T08:00:00Z"));
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("soon"), None);
        assert_eq!(parse_timestamp_opt(None), None);
    }

    #[test]
    fn test_whole_years() {
        let today = ymd(2024, 6, 1);
        assert_eq!(whole_years_between(ymd(2019, 6, 1), today), Some(5));
        assert_eq!(whole_years_between(ymd(2019, 6, 2), today), Some(4));
        assert_eq!(whole_years_between(ymd(2025, 1, 1), today), None);
    }

    #[test]
    fn test_months_between() {
        let today = ymd(2024, 6, 1);
        let months = months_between(ymd(2024, 3, 1), today);
        assert!(months > 2.9 && months < 3.1);
        assert!(months_between(ymd(2024, 7, 1), today) < 0.0);
    }

    #[test]
    fn test_within_months() {
        let today = ymd(2024, 6, 1);
        assert!(within_months(ymd(2024, 3, 1), today, 3));
        assert!(!within_months(ymd(2024, 2, 29), today, 3));
        assert!(within_months(ymd(2024, 7, 1), today, 3));
        assert!(within_months(ymd(2023, 12, 1), today, 6));
        assert!(!within_months(ymd(2023, 11, 30), today, 6));
    }
}

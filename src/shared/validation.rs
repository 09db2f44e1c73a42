use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Strict calendar date shape `YYYY-MM-DD` with zero-padded month and day
    /// - Valid: "2025-06-21", "2024-02-29"
    /// - Invalid: "2025-6-21", "21/06/2025", "2025-13-01", "2025-06-21T00:00"
    pub static ref CALENDAR_DATE_REGEX: Regex =
        Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").unwrap();

    /// Contact numbers: optional leading `+`, then digits, spaces or dashes (7-20 chars)
    /// - Valid: "09171234567", "+63 917 123 4567", "8123-4567"
    /// - Invalid: "(02) 8123-4567", "12345", "0917-"
    pub static ref CONTACT_NUMBER_REGEX: Regex =
        Regex::new(r"^\+?[0-9][0-9 \-]{5,18}[0-9]$").unwrap();
}

/// An enum whose wire values form a closed set.
///
/// `as_str` is the canonical wire value; parsing is case-insensitive so
/// `"in_progress"` and `"IN_PROGRESS"` both resolve.
pub trait ClosedSet: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(value))
    }

    /// Comma-separated wire values, for error messages
    fn allowed_values() -> String {
        Self::ALL
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Parse a strict `YYYY-MM-DD` date.
///
/// The regex rejects loose shapes, the calendar parse rejects impossible days
/// such as `2025-02-30`.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    if !CALENDAR_DATE_REGEX.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// `Some(trimmed)` when the value is present and not blank
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

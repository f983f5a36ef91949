use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

static CANONICAL_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]?[0-9]|2[0-3]):([0-5][0-9])$").expect("valid time regex"));
static LOOSE_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+):([0-9]+)").expect("valid loose time regex"));

// %B also accepts the abbreviated month name when parsing.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%a, %B %d, %Y",
    "%A, %B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Canonicalizes a date to `YYYY-MM-DD`. Inputs carrying an offset are
/// converted to UTC first.
pub fn normalize_date(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    parse_date(trimmed)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| ValidationError::InvalidDate(input.to_string()))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

/// Canonicalizes a time to zero-padded 24-hour `HH:MM`.
///
/// Anything that is not already `H:MM`/`HH:MM` is salvaged from its first
/// `digits:digits` group, so `"09:30 AM"` becomes `"09:30"` and the meridiem
/// is discarded.
pub fn normalize_time(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    let invalid = || ValidationError::InvalidTime(input.to_string());

    let caps = CANONICAL_TIME_RE
        .captures(trimmed)
        .or_else(|| LOOSE_TIME_RE.captures(trimmed))
        .ok_or_else(invalid)?;
    let hours: u32 = caps[1].parse().map_err(|_| invalid())?;
    let minutes: u32 = caps[2].parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok(format!("{hours:02}:{minutes:02}"))
}

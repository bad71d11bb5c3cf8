//! Date text -> epoch seconds

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").unwrap());
static US_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());
static SLASH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})/(\d{1,2})/(\d{1,2})\b").unwrap());

/// Offset-carrying layouts not covered by RFC 3339/2822
const ZONED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f %z"];

/// Layouts without an offset, read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse loosely formatted date text into UTC epoch seconds.
///
/// Tried in order: a full timestamp (only when the text has a `:`),
/// `YYYY-MM-DD`, `MM/DD/YYYY`, `YYYY/MM/DD`. Returns 0 when nothing matches
/// or the first matching date does not exist on the calendar.
pub fn parse_date(text: &str) -> i64 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }

    if text.contains(':') {
        if let Some(ts) = parse_timestamp(text) {
            return ts;
        }
    }

    if let Some(caps) = ISO_DATE_RE.captures(text) {
        return ymd_to_epoch(&caps, 1, 2, 3);
    }
    if let Some(caps) = US_DATE_RE.captures(text) {
        return ymd_to_epoch(&caps, 3, 1, 2);
    }
    if let Some(caps) = SLASH_DATE_RE.captures(text) {
        return ymd_to_epoch(&caps, 1, 2, 3);
    }

    0
}

fn parse_timestamp(text: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.timestamp());
    }

    ZONED_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.timestamp())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.and_utc().timestamp())
        })
}

fn ymd_to_epoch(caps: &Captures<'_>, year: usize, month: usize, day: usize) -> i64 {
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let date = match (field(year), field(month), field(day)) {
        (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y as i32, m, d),
        _ => None,
    };

    date.and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0)
}

use chrono::{DateTime, FixedOffset, Local, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;

/// ISO-8601 with seconds and a `+hh:mm` offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

static PLAN_DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{4})")
        .expect("Invalid plan date regex")
});

static STAND_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Stand:\s*(\d{1,2})\.(\d{1,2})\.(\d{4})\s+(\d{1,2}):(\d{2})")
        .expect("Invalid Stand regex")
});

fn pad(digits: &str) -> String {
    format!("{:0>2}", digits)
}

/// `YYYY-MM-DD` from day, month and year capture groups, zero-padded as
/// written; no calendar check is applied.
fn captured_date(caps: &regex::Captures<'_>, day: usize, month: usize, year: usize) -> String {
    format!("{}-{}-{}", &caps[year], pad(&caps[month]), pad(&caps[day]))
}

/// Extracts `D.M.YYYY` from a plan title as `YYYY-MM-DD`.
pub fn parse_plan_date(title: &str) -> Option<String> {
    let caps = PLAN_DATE_REGEX.captures(title)?;
    Some(captured_date(&caps, 1, 2, 3))
}

/// Extracts the first `Stand: D.M.YYYY H:MM` stamp from free text.
///
/// The source carries no zone, so the caller supplies the offset to stamp it
/// with (the scanning machine's current offset in production).
pub fn parse_last_update(text: &str, offset: FixedOffset) -> Option<String> {
    let caps = STAND_REGEX.captures(text)?;
    Some(format!(
        "{}T{}:{}:00{}",
        captured_date(&caps, 1, 2, 3),
        pad(&caps[4]),
        &caps[5],
        offset
    ))
}

pub fn format_timestamp<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Current UTC offset of the local system.
pub fn local_offset() -> FixedOffset {
    *Local::now().offset()
}

/// Current local time as an offset timestamp.
pub fn now_timestamp() -> String {
    format_timestamp(&Local::now())
}

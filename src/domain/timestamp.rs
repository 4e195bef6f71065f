//! Conversion of outlet date strings into the canonical `yyyy-MM-dd HH:mm:ss` form.
//!
//! Article pages print times like `2024.01.05. 오후 3:07` (Korean locale, 12-hour
//! clock with a meridiem marker). Everything stored or compared downstream uses the
//! canonical form instead.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;

pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Article pages are stamped in KST (UTC+9, no daylight saving)
const PORTAL_UTC_OFFSET_HOURS: i64 = 9;

/// Normalize `yyyy.MM.dd. a hh:mm` into `yyyy-MM-dd HH:mm:ss`.
///
/// Returns `None` for anything that does not parse; callers treat that as an
/// unknown timestamp.
pub fn normalize(input: &str) -> Option<String> {
    parse_korean(input).map(|dt| format_canonical(&dt))
}

pub fn parse_korean(input: &str) -> Option<NaiveDateTime> {
    let pattern = Regex::new(
        r"^(\d{4})\.\s*(\d{1,2})\.\s*(\d{1,2})\.\s*(오전|오후|AM|PM|am|pm)\s*(\d{1,2}):(\d{2})$",
    )
    .ok()?;
    let caps = pattern.captures(input.trim())?;

    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    let afternoon = matches!(&caps[4], "오후" | "PM" | "pm");
    let hour: u32 = caps[5].parse().ok()?;
    let minute: u32 = caps[6].parse().ok()?;

    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour = match (hour, afternoon) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some(NaiveDateTime::new(date, time))
}

pub fn parse_canonical(input: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), CANONICAL_FORMAT).ok()
}

/// Wall-clock time in the portal's zone, comparable with article timestamps
pub fn portal_time(instant: DateTime<Utc>) -> NaiveDateTime {
    instant.naive_utc() + Duration::hours(PORTAL_UTC_OFFSET_HOURS)
}

/// Current portal time in canonical form, the default crawl cutoff
pub fn portal_now() -> String {
    format_canonical(&portal_time(Utc::now()))
}

pub fn format_canonical(dt: &NaiveDateTime) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

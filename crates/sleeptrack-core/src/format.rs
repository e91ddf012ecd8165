//! Human-readable history formatting.
//!
//! Pure functions over sessions; the caller picks the timezone so tests can
//! pin it.

use chrono::{DateTime, TimeZone};

use crate::session::SleepSession;

pub const DEFAULT_TIME_FORMAT: &str = "%a %b %d %Y %H:%M";

const ONE_MINUTE_MILLIS: i64 = 60 * 1000;
const ONE_HOUR_MILLIS: i64 = 60 * ONE_MINUTE_MILLIS;

/// Formats one timestamp, falling back to the raw millis if out of range.
pub fn format_timestamp<Tz: TimeZone>(millis: i64, time_format: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    DateTime::from_timestamp_millis(millis).map_or_else(
        || millis.to_string(),
        |utc| utc.with_timezone(tz).format(time_format).to_string(),
    )
}

/// `H:MM:SS` for a duration in milliseconds (negative clamps to zero).
pub fn format_hms(duration_millis: i64) -> String {
    let total_secs = duration_millis.max(0) / 1000;
    format!(
        "{}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}

/// Short description such as "7 hours on Tuesday".
///
/// Picks seconds, minutes or hours depending on the length and names the
/// weekday the session started on.
pub fn describe_duration<Tz: TimeZone>(start_millis: i64, end_millis: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let duration = (end_millis - start_millis).max(0);
    let weekday = format_timestamp(start_millis, "%A", tz);

    if duration < ONE_MINUTE_MILLIS {
        format!("{} seconds on {weekday}", duration / 1000)
    } else if duration < ONE_HOUR_MILLIS {
        format!("{} minutes on {weekday}", duration / ONE_MINUTE_MILLIS)
    } else {
        format!("{} hours on {weekday}", duration / ONE_HOUR_MILLIS)
    }
}

/// One block of lines per night, in the order given.
pub fn format_night<Tz: TimeZone>(night: &SleepSession, time_format: &str, tz: &Tz) -> Vec<String>
where
    Tz::Offset: std::fmt::Display,
{
    let start = format_timestamp(night.start_time_millis, time_format, tz);
    let end = if night.is_open() {
        "in progress".to_string()
    } else {
        format_timestamp(night.end_time_millis, time_format, tz)
    };
    let quality = night.quality.map_or("not rated", |q| q.label());

    vec![
        format!("Start: {start}"),
        format!("End: {end}"),
        format!("Quality: {quality}"),
        format!("Hours:Minutes:Seconds: {}", format_hms(night.duration_millis())),
    ]
}

/// Formats a whole history, blank line between nights.
pub fn format_nights<Tz: TimeZone>(nights: &[SleepSession], time_format: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    nights
        .iter()
        .map(|night| format_night(night, time_format, tz).join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

//! Human-readable durations and Discord timestamp markup
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use chrono::{DateTime, Utc};

/// Canonical display form for absolute times in replies and notifications
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Format a duration in seconds into a human-readable string
pub fn format_duration(seconds: i64) -> String {
    if seconds < 60 {
        format!("{} second{}", seconds, plural(seconds))
    } else if seconds < 3600 {
        let mins = seconds / 60;
        format!("{} minute{}", mins, plural(mins))
    } else if seconds < 86400 {
        let hours = seconds / 3600;
        let mins = (seconds % 3600) / 60;
        if mins > 0 {
            format!("{} hour{} {} minute{}", hours, plural(hours), mins, plural(mins))
        } else {
            format!("{} hour{}", hours, plural(hours))
        }
    } else {
        let days = seconds / 86400;
        let hours = (seconds % 86400) / 3600;
        if hours > 0 {
            format!("{} day{} {} hour{}", days, plural(days), hours, plural(hours))
        } else {
            format!("{} day{}", days, plural(days))
        }
    }
}

/// Time remaining until `due` as `Hh Mm Ss`, clamped at zero
pub fn format_time_left(due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let left = due.signed_duration_since(now).num_seconds().max(0);
    let hours = left / 3600;
    let minutes = (left % 3600) / 60;
    let seconds = left % 60;
    format!("{hours}h {minutes}m {seconds}s")
}

pub fn format_display_time(at: DateTime<Utc>) -> String {
    at.format(DISPLAY_TIME_FORMAT).to_string()
}

/// Discord `<t:unix:style>` markup rendered in each reader's local time
pub fn discord_timestamp(at: DateTime<Utc>, style: char) -> String {
    format!("<t:{}:{}>", at.timestamp(), style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30), "30 seconds");
        assert_eq!(format_duration(1), "1 second");
        assert_eq!(format_duration(60), "1 minute");
        assert_eq!(format_duration(120), "2 minutes");
        assert_eq!(format_duration(3600), "1 hour");
        assert_eq!(format_duration(3660), "1 hour 1 minute");
        assert_eq!(format_duration(86400), "1 day");
        assert_eq!(format_duration(90000), "1 day 1 hour");
    }

    #[test]
    fn test_format_time_left() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let due = now + Duration::seconds(26 * 3600 + 61);
        assert_eq!(format_time_left(due, now), "26h 1m 1s");
        assert_eq!(format_time_left(now - Duration::seconds(5), now), "0h 0m 0s");
    }

    #[test]
    fn test_display_and_markup() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap();
        assert_eq!(format_display_time(at), "2024-05-01 12:30:05 UTC");
        assert_eq!(discord_timestamp(at, 'R'), format!("<t:{}:R>", at.timestamp()));
    }
}

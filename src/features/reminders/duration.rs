//! Compact duration tokens (`90s`, `1h30m`, `2mo`, `3weeks`)
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::core::ParseError;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
/// Months are a flat 30 days; no calendar arithmetic.
const MONTH: u64 = 30 * DAY;
const WEEK: u64 = 7 * DAY;

/// One `<integer><unit>` group at the start of the input; longer spellings first
fn group_regex() -> &'static Regex {
    static GROUP: OnceLock<Regex> = OnceLock::new();
    GROUP.get_or_init(|| {
        Regex::new(
            r"^(\d+)(seconds|second|secs|sec|s|minutes|minute|mins|min|months|month|mo|m|hours|hour|hrs|hr|h|days|day|d|weeks|week|w)",
        )
        .expect("static regex")
    })
}

/// Seconds per unit, `None` for anything that is not a known unit spelling
fn unit_seconds(unit: &str) -> Option<u64> {
    match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(MINUTE),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(HOUR),
        "d" | "day" | "days" => Some(DAY),
        "mo" | "month" | "months" => Some(MONTH),
        "w" | "week" | "weeks" => Some(WEEK),
        _ => None,
    }
}

/// Parse a duration token into a total elapsed duration.
///
/// Reads the leading run of `<integer><unit>` groups and sums them; whatever
/// follows the last group is ignored (`2h30` is two hours). A token whose
/// groups add up to zero (`0m`) is returned as [`Duration::ZERO`]; rejecting
/// it is up to the caller.
///
/// # Errors
///
/// [`ParseError::Empty`] for a blank token, [`ParseError::Unrecognized`] when
/// it does not start with a group, [`ParseError::OutOfRange`] when the total
/// does not fit in seconds.
pub fn parse(token: &str) -> Result<Duration, ParseError> {
    let token = token.trim().to_lowercase();
    if token.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut rest = token.as_str();
    let mut matched = false;
    let mut total: u64 = 0;
    while let Some(caps) = group_regex().captures(rest) {
        let value: u64 = caps[1]
            .parse()
            .map_err(|_| ParseError::OutOfRange(token.clone()))?;
        let unit = unit_seconds(&caps[2]).ok_or_else(|| ParseError::Unrecognized(token.clone()))?;

        total = value
            .checked_mul(unit)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(|| ParseError::OutOfRange(token.clone()))?;
        matched = true;
        rest = &rest[caps[0].len()..];
    }

    if !matched {
        return Err(ParseError::Unrecognized(token));
    }
    Ok(Duration::from_secs(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(token: &str) -> u64 {
        parse(token).unwrap().as_secs()
    }

    #[test]
    fn test_single_units() {
        assert_eq!(secs("90s"), 90);
        assert_eq!(secs("30m"), 1800);
        assert_eq!(secs("2h"), 7200);
        assert_eq!(secs("1d"), 86400);
        assert_eq!(secs("2w"), 14 * 86400);
        assert_eq!(secs("1mo"), 30 * 86400);
    }

    #[test]
    fn test_spelled_out_units() {
        assert_eq!(secs("2hours"), 7200);
        assert_eq!(secs("1hour"), 3600);
        assert_eq!(secs("45seconds"), 45);
        assert_eq!(secs("3months"), 90 * 86400);
        assert_eq!(secs("1week"), 7 * 86400);
        assert_eq!(secs("10MIN"), 600);
    }

    #[test]
    fn test_groups_are_summed() {
        assert_eq!(secs("1d2h"), 26 * 3600);
        assert_eq!(secs("1h30m"), 5400);
        assert_eq!(secs("30s10m"), 630);
        assert_eq!(secs("1mo1w"), 37 * 86400);
        assert_eq!(secs("2h30m"), 9000);
    }

    #[test]
    fn test_zero_is_not_rejected_here() {
        assert_eq!(parse("0m").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert!(matches!(parse("abc"), Err(ParseError::Unrecognized(_))));
        assert!(matches!(parse("10"), Err(ParseError::Unrecognized(_))));
        assert!(matches!(parse("10x"), Err(ParseError::Unrecognized(_))));
        assert!(matches!(parse("h1"), Err(ParseError::Unrecognized(_))));
        assert!(matches!(parse("x1h"), Err(ParseError::Unrecognized(_))));
    }

    #[test]
    fn test_trailing_text_after_groups_is_ignored() {
        assert_eq!(secs("1hxyz"), 3600);
        assert_eq!(secs("2h30"), 7200);
        assert_eq!(secs("1h!"), 3600);
        assert_eq!(secs("1h30mfoo"), 5400);
        assert_eq!(secs("1h 30m"), 3600);
    }

    #[test]
    fn test_longest_unit_spelling_wins() {
        assert_eq!(secs("2mo"), 60 * 86400);
        assert_eq!(secs("2min"), 120);
        assert_eq!(secs("2mins5s"), 125);
        assert_eq!(secs("1hrs"), 3600);
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(
            parse("99999999999999999999s"),
            Err(ParseError::OutOfRange(_))
        ));
        assert!(matches!(
            parse("9999999999999999w"),
            Err(ParseError::OutOfRange(_))
        ));
    }
}

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_MINUTE: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("duration is empty (use \"Xh Xm\", \"Xh\" or \"Xm\")")]
    Empty,
    #[error("invalid duration {0:?} (use \"Xh Xm\", \"Xh\" or \"Xm\")")]
    Malformed(String),
    #[error("duration {0:?} is too large")]
    Overflow(String),
}

/// Parses `(<int>h)? (<int>m)?` into seconds.
///
/// Whitespace is allowed around and between the two tokens, the hour token
/// must come first and each unit may appear once.
pub fn parse_duration(text: &str) -> Result<u64, DurationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DurationError::Empty);
    }

    let malformed = || DurationError::Malformed(text.to_string());
    let mut rest = trimmed;
    let mut hours = None;
    let mut minutes = None;

    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err(malformed());
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| DurationError::Overflow(text.to_string()))?;
        let unit = rest[digits..].chars().next().ok_or_else(malformed)?;
        match unit {
            'h' if hours.is_none() && minutes.is_none() => hours = Some(value),
            'm' if minutes.is_none() => minutes = Some(value),
            _ => return Err(malformed()),
        }
        rest = rest[digits + 1..].trim_start();
    }

    let hour_seconds = hours
        .unwrap_or(0)
        .checked_mul(SECONDS_PER_HOUR)
        .ok_or_else(|| DurationError::Overflow(text.to_string()))?;
    let minute_seconds = minutes
        .unwrap_or(0)
        .checked_mul(SECONDS_PER_MINUTE)
        .ok_or_else(|| DurationError::Overflow(text.to_string()))?;
    hour_seconds
        .checked_add(minute_seconds)
        .ok_or_else(|| DurationError::Overflow(text.to_string()))
}

/// Stopwatch rendering: `MM:SS`, minutes keep counting past 59.
pub fn format_timer(seconds: u64) -> String {
    format!(
        "{:02}:{:02}",
        seconds / SECONDS_PER_MINUTE,
        seconds % SECONDS_PER_MINUTE
    )
}

/// Label for a stored duration: `HH:MM:SS`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / SECONDS_PER_HOUR;
    let minutes = (seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = seconds % SECONDS_PER_MINUTE;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn seconds_to_hours(seconds: u64) -> f64 {
    seconds as f64 / SECONDS_PER_HOUR as f64
}

/// A duration that came out of the parser or a finished timer session.
///
/// Worklogs only accept this type, so raw user text can never reach the
/// store without going through [`parse_duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSpent(u64);

impl TimeSpent {
    pub fn parse(text: &str) -> Result<Self, DurationError> {
        parse_duration(text).map(Self)
    }

    pub fn from_elapsed(seconds: u64) -> Self {
        Self(seconds)
    }

    pub fn seconds(self) -> u64 {
        self.0
    }
}

impl Display for TimeSpent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{DurationError, TimeSpent, format_duration, format_timer, parse_duration};

    #[rstest]
    #[case::hours_and_minutes("1h 30m", 5400)]
    #[case::minutes_only("45m", 2700)]
    #[case::hours_only("2h", 7200)]
    #[case::zero_minutes("0m", 0)]
    #[case::no_space("2h30m", 9000)]
    #[case::padded("  1h   5m ", 3900)]
    #[case::large_minutes("90m", 5400)]
    fn parses_valid_durations(#[case] input: &str, #[case] expected: u64) {
        assert_eq!(parse_duration(input), Ok(expected));
    }

    #[rstest]
    #[case::letters("abc")]
    #[case::wrong_unit("2x")]
    #[case::missing_hour_digits("h30m")]
    #[case::negative("-1h")]
    #[case::reversed("30m 1h")]
    #[case::repeated("1h 2h")]
    #[case::bare_number("15")]
    #[case::trailing_garbage("1h 30m!")]
    #[case::decimal("1.5h")]
    fn rejects_malformed_durations(#[case] input: &str) {
        assert_eq!(
            parse_duration(input),
            Err(DurationError::Malformed(input.to_string()))
        );
    }

    #[test]
    fn rejects_empty_text_without_zero_fallback() {
        assert_eq!(parse_duration(""), Err(DurationError::Empty));
        assert_eq!(parse_duration("   "), Err(DurationError::Empty));
    }

    #[test]
    fn rejects_overflowing_values() {
        let input = "99999999999999999999h";
        assert_eq!(
            parse_duration(input),
            Err(DurationError::Overflow(input.to_string()))
        );
    }

    #[test]
    fn formats_timer_and_stored_labels() {
        assert_eq!(format_timer(0), "00:00");
        assert_eq!(format_timer(75), "01:15");
        assert_eq!(format_timer(3725), "62:05");
        assert_eq!(format_duration(5400), "01:30:00");
        assert_eq!(format_duration(3661), "01:01:01");
    }

    #[test]
    fn time_spent_only_wraps_parsed_text() {
        assert_eq!(TimeSpent::parse("1h 30m").map(TimeSpent::seconds), Ok(5400));
        assert!(TimeSpent::parse("soon").is_err());
        assert_eq!(TimeSpent::from_elapsed(42).seconds(), 42);
    }
}

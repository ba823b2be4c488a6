//! # Duration Parser
//!
//! Converts compact duration strings of the form `<int><unit>` into a
//! [`Duration`]. The same grammar serves the packet `ttl` field and the
//! validator's tolerance flags (`clock-skew`, `allow-future-created-at`).
//!
//! ## Grammar
//!
//! Input is trimmed and lower-cased, then must match `^[0-9]+[smhd]$`
//! exactly. Multi-unit strings (`1h30m`), decimals (`1.5h`), signs and
//! embedded whitespace are rejected.
//!
//! | Unit | Seconds |
//! |------|---------|
//! | `s`  | 1       |
//! | `m`  | 60      |
//! | `h`  | 3600    |
//! | `d`  | 86400   |
//!
//! A day is always 24 hours; there is no calendar or DST adjustment.

use std::fmt;
use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;

use crate::error::DurationError;

/// Compiled once at first use and shared read-only afterwards.
///
/// `[0-9]` rather than `\d`: the latter matches any Unicode decimal digit.
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)([smhd])$").expect("duration regex is valid"));

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_DAY: i64 = 86_400;

/// Default clock skew tolerance (`60s`).
pub const DEFAULT_CLOCK_SKEW: Duration = Duration { secs: 60 };

/// Default allowance for `created_at` ahead of the validator clock (`5m`).
pub const DEFAULT_ALLOW_FUTURE_CREATED_AT: Duration = Duration { secs: 5 * SECS_PER_MINUTE };

/// A strictly positive time interval with whole-second granularity.
///
/// Only obtainable through [`Duration::parse`] or the named defaults, so a
/// zero or negative value never exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    secs: i64,
}

impl Duration {
    /// Parse a `<int><unit>` duration string.
    ///
    /// `label` names the input being parsed (e.g. `"ttl"` or
    /// `"clock-skew"`) and prefixes every error message so callers can
    /// tell which field failed.
    ///
    /// # Errors
    ///
    /// - [`DurationError::FormatInvalid`] if the trimmed, lower-cased input
    ///   is not exactly one integer followed by one of `s`, `m`, `h`, `d`.
    /// - [`DurationError::NotPositive`] if the integer is zero.
    /// - [`DurationError::OutOfRange`] if the interval does not fit the
    ///   representable range.
    pub fn parse(input: &str, label: &str) -> Result<Self, DurationError> {
        let normalized = input.trim().to_lowercase();
        let caps = DURATION_RE
            .captures(&normalized)
            .ok_or_else(|| DurationError::FormatInvalid {
                label: label.to_string(),
                input: input.to_string(),
            })?;

        let out_of_range = || DurationError::OutOfRange {
            label: label.to_string(),
            input: input.to_string(),
        };

        let n: i64 = caps[1].parse().map_err(|_| out_of_range())?;
        if n == 0 {
            return Err(DurationError::NotPositive {
                label: label.to_string(),
            });
        }

        let multiplier = match &caps[2] {
            "s" => 1,
            "m" => SECS_PER_MINUTE,
            "h" => SECS_PER_HOUR,
            "d" => SECS_PER_DAY,
            // The regex admits only the four units above.
            _ => {
                return Err(DurationError::FormatInvalid {
                    label: label.to_string(),
                    input: input.to_string(),
                })
            }
        };

        let secs = n.checked_mul(multiplier).ok_or_else(out_of_range)?;
        // Must also fit chrono's millisecond-based range for instant arithmetic.
        TimeDelta::try_seconds(secs).ok_or_else(out_of_range)?;

        Ok(Self { secs })
    }

    /// Length of the interval in whole seconds. Always positive.
    pub fn as_secs(&self) -> i64 {
        self.secs
    }

    /// The interval as a `chrono::TimeDelta` for instant arithmetic.
    pub fn to_time_delta(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.secs).unwrap_or(TimeDelta::MAX)
    }
}

impl Default for Duration {
    fn default() -> Self {
        DEFAULT_CLOCK_SKEW
    }
}

/// Renders in the largest unit that divides the interval evenly, so
/// `Duration::parse("120m")` displays as `2h`.
impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.secs;
        if secs % SECS_PER_DAY == 0 {
            write!(f, "{}d", secs / SECS_PER_DAY)
        } else if secs % SECS_PER_HOUR == 0 {
            write!(f, "{}h", secs / SECS_PER_HOUR)
        } else if secs % SECS_PER_MINUTE == 0 {
            write!(f, "{}m", secs / SECS_PER_MINUTE)
        } else {
            write!(f, "{secs}s")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DurationErrorKind;

    #[test]
    fn test_parse_each_unit() {
        assert_eq!(Duration::parse("15s", "ttl").unwrap().as_secs(), 15);
        assert_eq!(Duration::parse("30m", "ttl").unwrap().as_secs(), 1_800);
        assert_eq!(Duration::parse("2h", "ttl").unwrap().as_secs(), 7_200);
        assert_eq!(Duration::parse("7d", "ttl").unwrap().as_secs(), 604_800);
    }

    #[test]
    fn test_parse_trims_and_lowercases() {
        assert_eq!(Duration::parse("  2H \n", "ttl").unwrap().as_secs(), 7_200);
        assert_eq!(Duration::parse("\t60S", "ttl").unwrap().as_secs(), 60);
    }

    #[test]
    fn test_parse_leading_zeros() {
        assert_eq!(Duration::parse("007m", "ttl").unwrap().as_secs(), 420);
    }

    #[test]
    fn test_zero_is_not_positive() {
        let err = Duration::parse("0h", "ttl").unwrap_err();
        assert_eq!(err.kind(), DurationErrorKind::NotPositive);
        assert_eq!(err.to_string(), "ttl must be positive");
    }

    #[test]
    fn test_rejected_shapes() {
        for input in ["", "   ", "h", "10", "1.5h", "-5m", "+5m", "1h30m", "5w", "5 m", "5mm", "abc"] {
            let err = Duration::parse(input, "ttl").unwrap_err();
            assert_eq!(
                err.kind(),
                DurationErrorKind::FormatInvalid,
                "input {input:?} should be a format error"
            );
        }
    }

    #[test]
    fn test_unicode_digits_rejected() {
        // Arabic-Indic five.
        let err = Duration::parse("\u{0665}m", "ttl").unwrap_err();
        assert_eq!(err.kind(), DurationErrorKind::FormatInvalid);
    }

    #[test]
    fn test_error_message_carries_label() {
        let err = Duration::parse("soon", "clock-skew").unwrap_err();
        assert!(err.to_string().starts_with("clock-skew "), "got: {err}");
        let err = Duration::parse("0s", "allow-future-created-at").unwrap_err();
        assert!(err.to_string().starts_with("allow-future-created-at "), "got: {err}");
    }

    #[test]
    fn test_overflow_is_out_of_range() {
        let err = Duration::parse("99999999999999999999s", "ttl").unwrap_err();
        assert_eq!(err.kind(), DurationErrorKind::OutOfRange);
        let err = Duration::parse("9223372036854775807d", "ttl").unwrap_err();
        assert_eq!(err.kind(), DurationErrorKind::OutOfRange);
    }

    #[test]
    fn test_display_uses_largest_even_unit() {
        assert_eq!(Duration::parse("120m", "x").unwrap().to_string(), "2h");
        assert_eq!(Duration::parse("90s", "x").unwrap().to_string(), "90s");
        assert_eq!(Duration::parse("48h", "x").unwrap().to_string(), "2d");
        assert_eq!(DEFAULT_CLOCK_SKEW.to_string(), "1m");
        assert_eq!(DEFAULT_ALLOW_FUTURE_CREATED_AT.to_string(), "5m");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(DEFAULT_CLOCK_SKEW.as_secs(), 60);
        assert_eq!(DEFAULT_ALLOW_FUTURE_CREATED_AT.as_secs(), 300);
        assert_eq!(Duration::default(), DEFAULT_CLOCK_SKEW);
    }

    #[test]
    fn test_time_delta_conversion() {
        let d = Duration::parse("2h", "ttl").unwrap();
        assert_eq!(d.to_time_delta(), TimeDelta::hours(2));
    }
}

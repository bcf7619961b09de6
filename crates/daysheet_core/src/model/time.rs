//! Time-of-day value type.
//!
//! # Responsibility
//! - Represent a point in the day as whole minutes since midnight.
//! - Parse and render the `HH:MM` form used by the summary wire format.
//!
//! # Invariants
//! - Values above 24:00 are representable; clamping is the snapper's job.
//! - Rendering is 24-hour and zero padded; 24:00 renders as `24:00`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Duration since midnight with minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    /// Midnight at the start of the day.
    pub const MIDNIGHT: Self = Self(0);
    /// Midnight at the end of the day (24:00).
    pub const END_OF_DAY: Self = Self(MINUTES_PER_DAY);

    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    /// Builds a time from hour and minute parts.
    ///
    /// Minutes above 59 carry into the hour, so `from_hm(8, 75)` is 09:15.
    pub const fn from_hm(hours: u32, minutes: u32) -> Self {
        Self(hours * 60 + minutes)
    }

    pub const fn minutes(self) -> u32 {
        self.0
    }

    pub const fn hours_part(self) -> u32 {
        self.0 / 60
    }

    pub const fn minutes_part(self) -> u32 {
        self.0 % 60
    }

    /// Adds minutes, saturating at `u32::MAX`.
    pub const fn plus_minutes(self, minutes: u32) -> Self {
        Self(self.0.saturating_add(minutes))
    }

    /// Subtracts minutes, saturating at midnight.
    pub const fn minus_minutes(self, minutes: u32) -> Self {
        Self(self.0.saturating_sub(minutes))
    }
}

impl Add<u32> for TimeOfDay {
    type Output = Self;

    fn add(self, rhs: u32) -> Self::Output {
        self.plus_minutes(rhs)
    }
}

impl Sub<u32> for TimeOfDay {
    type Output = Self;

    fn sub(self, rhs: u32) -> Self::Output {
        self.minus_minutes(rhs)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hours_part(), self.minutes_part())
    }
}

/// Error returned when a string is not a valid `HH:MM` time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    /// Input does not have the `H:MM` / `HH:MM` shape.
    Malformed(String),
    /// Minute part is 60 or above.
    MinuteOutOfRange(String),
    /// Time lies after 24:00.
    PastEndOfDay(String),
}

impl Display for TimeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => write!(f, "expected HH:MM, got `{value}`"),
            Self::MinuteOutOfRange(value) => write!(f, "minute out of range in `{value}`"),
            Self::PastEndOfDay(value) => write!(f, "time after 24:00: `{value}`"),
        }
    }
}

impl Error for TimeParseError {}

/// Strict parse used by configuration and CLI input.
///
/// The summary decoder is intentionally more lenient and does not go
/// through this path.
impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let malformed = || TimeParseError::Malformed(trimmed.to_string());
        let (hour_str, minute_str) = trimmed.split_once(':').ok_or_else(malformed)?;
        if hour_str.is_empty()
            || hour_str.len() > 2
            || minute_str.len() != 2
            || !hour_str.bytes().all(|b| b.is_ascii_digit())
            || !minute_str.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let hours: u32 = hour_str.parse().map_err(|_| malformed())?;
        let minutes: u32 = minute_str.parse().map_err(|_| malformed())?;
        if minutes > 59 {
            return Err(TimeParseError::MinuteOutOfRange(trimmed.to_string()));
        }

        let time = Self::from_hm(hours, minutes);
        if time > Self::END_OF_DAY {
            return Err(TimeParseError::PastEndOfDay(trimmed.to_string()));
        }
        Ok(time)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{TimeOfDay, TimeParseError};

    #[test]
    fn display_is_zero_padded_and_keeps_end_of_day() {
        assert_eq!(TimeOfDay::from_hm(7, 5).to_string(), "07:05");
        assert_eq!(TimeOfDay::END_OF_DAY.to_string(), "24:00");
    }

    #[test]
    fn from_hm_carries_minutes_into_hours() {
        assert_eq!(TimeOfDay::from_hm(8, 75), TimeOfDay::from_hm(9, 15));
    }

    #[test]
    fn parse_accepts_single_digit_hour() {
        let time: TimeOfDay = "8:30".parse().expect("8:30 should parse");
        assert_eq!(time.minutes(), 510);
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        assert!(matches!(
            "830".parse::<TimeOfDay>(),
            Err(TimeParseError::Malformed(_))
        ));
        assert!(matches!(
            "08:75".parse::<TimeOfDay>(),
            Err(TimeParseError::MinuteOutOfRange(_))
        ));
        assert!(matches!(
            "24:30".parse::<TimeOfDay>(),
            Err(TimeParseError::PastEndOfDay(_))
        ));
    }

    #[test]
    fn minus_saturates_at_midnight() {
        assert_eq!(TimeOfDay::from_minutes(10) - 30, TimeOfDay::MIDNIGHT);
    }
}

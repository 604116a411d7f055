//! Core type definitions with validation.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The minute-of-day was outside `0..1440`.
    #[error("minute of day must be below 1440, got {value}")]
    MinuteOutOfRange { value: u32 },

    /// A clock-time string could not be parsed.
    #[error("invalid clock time: {value}")]
    InvalidClockTime { value: String },

    /// Invalid punch direction value.
    #[error("invalid punch direction: {value}")]
    InvalidDirection { value: String },

    /// Invalid day status value.
    #[error("invalid day status: {value}")]
    InvalidDayStatus { value: String },

    /// Invalid severity value.
    #[error("invalid severity: {value}")]
    InvalidSeverity { value: String },
}

/// Direction of a raw punch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// String representation for storage and reporting.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            _ => Err(ValidationError::InvalidDirection {
                value: s.to_string(),
            }),
        }
    }
}

/// Attendance outcome for one person-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayStatus {
    /// At least one valid session was paired.
    Present,
    /// Punches exist but none could be paired into a session.
    Partial,
    /// No punches at all.
    #[default]
    Absent,
}

impl DayStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "PRESENT",
            Self::Partial => "PARTIAL",
            Self::Absent => "ABSENT",
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DayStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRESENT" => Ok(Self::Present),
            "PARTIAL" => Ok(Self::Partial),
            "ABSENT" => Ok(Self::Absent),
            _ => Err(ValidationError::InvalidDayStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Severity of a detected discrepancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ValidationError::InvalidSeverity {
                value: s.to_string(),
            }),
        }
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated employee code.
    ///
    /// Employee codes must be non-empty strings. They identify a person across
    /// the punch feed and the time-log feed; grouping punches by
    /// `(employee_code, calendar_date)` is the feed collaborator's job.
    EmployeeCode, "employee code"
);

/// A wall-clock time of day at whole-minute resolution.
///
/// All reconciliation logic operates on same-day local wall-clock minutes;
/// this type cannot represent a time outside `00:00..=23:59`. Serialized as a
/// zero-padded `"HH:MM"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime(u16);

const MINUTES_PER_DAY: u32 = 24 * 60;

impl ClockTime {
    /// Creates a clock time from a minute-of-day in `0..1440`.
    pub const fn from_minutes(minutes: u32) -> Result<Self, ValidationError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(ValidationError::MinuteOutOfRange { value: minutes });
        }
        // In range, so the narrowing is lossless.
        #[allow(clippy::cast_possible_truncation)]
        let minutes = minutes as u16;
        Ok(Self(minutes))
    }

    /// Creates a clock time from an hour and minute.
    pub const fn from_hm(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        if hour >= 24 || minute >= 60 {
            return Err(ValidationError::MinuteOutOfRange {
                value: hour * 60 + minute,
            });
        }
        Self::from_minutes(hour * 60 + minute)
    }

    /// Converts from a `chrono` time, truncating seconds to whole minutes.
    #[must_use]
    pub fn from_naive_time(time: NaiveTime) -> Self {
        // NaiveTime hours/minutes are always in range.
        #[allow(clippy::cast_possible_truncation)]
        let minutes = (time.hour() * 60 + time.minute()) as u16;
        Self(minutes)
    }

    /// Minute-of-day in `0..1440`.
    #[must_use]
    pub const fn minute_of_day(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn hour(self) -> u16 {
        self.0 / 60
    }

    #[must_use]
    pub const fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Signed minutes from `self` to `later`. Negative if `later` is earlier.
    #[must_use]
    pub const fn minutes_until(self, later: Self) -> i32 {
        later.0 as i32 - self.0 as i32
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl std::str::FromStr for ClockTime {
    type Err = ValidationError;

    /// Parses `"HH:MM"`; a trailing `":SS"` component is accepted and truncated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidClockTime {
            value: s.to_string(),
        };

        let mut parts = s.split(':');
        let hour: u32 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minute: u32 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        match parts.next() {
            None => {}
            Some(seconds) if seconds.parse::<u32>().is_ok_and(|s| s < 60) => {}
            Some(_) => return Err(invalid()),
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        Self::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl Serialize for ClockTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

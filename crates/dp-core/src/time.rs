//! Day-local time primitives.
//!
//! Everything the planner does happens on a single calendar day, so instants
//! are stored as minutes since midnight and durations as whole minutes.

use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minutes in a full day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Errors from time arithmetic and parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// An interval whose end lies before its start.
    #[error("interval ends at {end} before it starts at {start}")]
    NegativeInterval { start: TimeOfDay, end: TimeOfDay },

    /// An interval whose end equals its start.
    #[error("interval {start}-{end} is empty")]
    EmptyInterval { start: TimeOfDay, end: TimeOfDay },

    /// Hour or minute outside the clock face.
    #[error("{hour:02}:{minute:02} is not a valid time of day")]
    OutOfRange { hour: u32, minute: u32 },

    /// A string that is not `HH:MM`.
    #[error("invalid time of day: {value:?} (expected HH:MM)")]
    InvalidFormat { value: String },
}

/// A non-negative whole number of minutes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Minutes(u32);

impl Minutes {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(minutes: u32) -> Self {
        Self(minutes)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Subtracts, stopping at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Subtracts, returning `None` on underflow.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl From<u32> for Minutes {
    fn from(minutes: u32) -> Self {
        Self(minutes)
    }
}

impl Add for Minutes {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Minutes {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Minutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

/// A point in time on the planned day, counted in minutes from midnight.
///
/// Adding minutes never wraps: an instant past midnight is kept as-is and
/// displays with an hour of 24 or more (`25:30`). Rolling over to the next
/// day is left to whoever renders the timeline.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const MIDNIGHT: Self = Self(0);

    /// Midnight at the end of the day (`24:00`).
    pub const END_OF_DAY: Self = Self(MINUTES_PER_DAY);

    /// Creates a time from a clock-face hour and minute.
    pub const fn from_hm(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour >= 24 || minute >= 60 {
            return Err(TimeError::OutOfRange { hour, minute });
        }
        Ok(Self(hour * 60 + minute))
    }

    /// Creates a time from a raw minute offset; may lie past midnight.
    #[must_use]
    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    #[must_use]
    pub const fn minutes_from_midnight(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn hour(self) -> u32 {
        self.0 / 60
    }

    #[must_use]
    pub const fn minute(self) -> u32 {
        self.0 % 60
    }

    /// Length of the interval from `earlier` to `self`.
    ///
    /// Fails with [`TimeError::NegativeInterval`] when `self` lies before
    /// `earlier`; the result is never clamped.
    pub const fn minutes_since(self, earlier: Self) -> Result<Minutes, TimeError> {
        if self.0 < earlier.0 {
            return Err(TimeError::NegativeInterval {
                start: earlier,
                end: self,
            });
        }
        Ok(Minutes(self.0 - earlier.0))
    }

    /// Truncates seconds away.
    #[must_use]
    pub fn from_naive_time(time: NaiveTime) -> Self {
        Self(time.hour() * 60 + time.minute())
    }

    /// The clock time, or `None` from `24:00` onwards.
    #[must_use]
    pub fn to_naive_time(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0)
    }
}

impl Add<Minutes> for TimeOfDay {
    type Output = Self;

    fn add(self, rhs: Minutes) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign<Minutes> for TimeOfDay {
    fn add_assign(&mut self, rhs: Minutes) {
        *self = *self + rhs;
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parses `H:MM` or `HH:MM`.
///
/// Hours of 24 and above are read as instants past midnight, so every value
/// this type displays parses back (`24:00` included). Use
/// [`TimeOfDay::from_hm`] for a strict clock-face time.
impl FromStr for TimeOfDay {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimeError::InvalidFormat {
            value: s.to_string(),
        };
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if minute.len() != 2 || hour.is_empty() || hour.len() > 2 {
            return Err(invalid());
        }
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        if hour >= 24 && minute < 60 {
            return Ok(Self(hour * 60 + minute));
        }
        Self::from_hm(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

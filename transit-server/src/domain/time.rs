//! Service-day time handling.
//!
//! Timetables express times as seconds since midnight of the service day.
//! Trips running past midnight keep counting, so "25:10:00" is a valid
//! time meaning 01:10 on the following calendar day.

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Largest accepted hour. Feeds use values above 24 for overnight trips;
/// anything beyond two days is treated as corrupt input.
const MAX_HOURS: u32 = 47;

/// A time on a service day, in seconds since the day's midnight.
///
/// # Examples
///
/// ```
/// use transit_server::domain::ScheduleTime;
///
/// let t = ScheduleTime::parse("08:15").unwrap();
/// assert_eq!(t.as_secs(), 8 * 3600 + 15 * 60);
/// assert_eq!(t.to_string(), "08:15:00");
///
/// // Overnight trips keep counting past midnight
/// let late = ScheduleTime::parse("25:10:30").unwrap();
/// assert_eq!(late.to_string(), "25:10:30");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleTime(u32);

impl ScheduleTime {
    /// Midnight at the start of the service day.
    pub const MIDNIGHT: ScheduleTime = ScheduleTime(0);

    /// Create a time from seconds since midnight.
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    /// Create a time from hours, minutes and seconds.
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Result<Self, TimeError> {
        if hours > MAX_HOURS {
            return Err(TimeError::new("hour out of range"));
        }
        if minutes > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if seconds > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        Ok(Self(hours * 3600 + minutes * 60 + seconds))
    }

    /// Parse "HH:MM" or "HH:MM:SS". Hours may exceed 23.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.split(':');

        let hours = parts
            .next()
            .and_then(parse_digits)
            .ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minutes = parts
            .next()
            .and_then(parse_digits)
            .ok_or_else(|| TimeError::new("expected HH:MM or HH:MM:SS"))?;
        let seconds = match parts.next() {
            Some(p) => parse_digits(p).ok_or_else(|| TimeError::new("invalid second digits"))?,
            None => 0,
        };

        if parts.next().is_some() {
            return Err(TimeError::new("too many components"));
        }

        Self::from_hms(hours, minutes, seconds)
    }

    /// Returns seconds since midnight.
    pub fn as_secs(self) -> u32 {
        self.0
    }

    /// Returns the hour component (may exceed 23).
    pub fn hours(self) -> u32 {
        self.0 / 3600
    }

    /// Returns the minute component.
    pub fn minutes(self) -> u32 {
        (self.0 / 60) % 60
    }

    /// Returns the second component.
    pub fn seconds(self) -> u32 {
        self.0 % 60
    }

    /// Add seconds, saturating at `u32::MAX`.
    pub fn saturating_add(self, secs: u32) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Seconds elapsed since `earlier`, or zero if `earlier` is later.
    pub fn secs_since(self, earlier: ScheduleTime) -> u32 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<u32> for ScheduleTime {
    type Output = Self;

    fn add(self, rhs: u32) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl fmt::Debug for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScheduleTime({self})")
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

/// Parse a run of one or two ASCII digits.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

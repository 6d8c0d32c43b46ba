//! Validated `HH:MM` schedule times.
//!
//! Schedule times carry no date and no timezone; the scheduler compares them
//! against the process-local clock at minute granularity.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SentinelError;

/// A time-of-day at minute granularity, serialised as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleTime {
    hour: u8,
    minute: u8,
}

impl ScheduleTime {
    /// Construct from hour/minute, rejecting out-of-range values.
    pub fn new(hour: u8, minute: u8) -> Result<Self, SentinelError> {
        if hour > 23 || minute > 59 {
            return Err(SentinelError::InvalidScheduleTime(format!(
                "{hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Hour component (0-23).
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute component (0-59).
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Whether this schedule time equals a clock reading formatted `"HH:MM"`.
    pub fn matches(&self, clock_hhmm: &str) -> bool {
        self.to_string() == clock_hhmm
    }
}

impl Default for ScheduleTime {
    /// The default send time for a fresh owner record, 09:00.
    fn default() -> Self {
        Self { hour: 9, minute: 0 }
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ScheduleTime {
    type Err = SentinelError;

    /// Parse `"HH:MM"`. Single-digit components (`"9:5"`) are accepted and
    /// normalised on display.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SentinelError::InvalidScheduleTime(s.to_string());

        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.is_empty() || m.len() > 2 {
            return Err(invalid());
        }

        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl Serialize for ScheduleTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ScheduleTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

//! Race configuration types
//!
//! This module defines the race parameters needed by the processor and the
//! report calculator. Loading them from a file is left to the application
//! layer; the type only knows its serialized shape.

use crate::types::{RaceError, Result, Timestamp};
use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Configuration of a single race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceConfig {
    /// Number of main laps
    pub laps: u32,

    /// Length of one main lap in meters
    pub lap_len: u32,

    /// Length of one penalty loop in meters
    pub penalty_len: u32,

    /// Number of firing lines per lap
    #[serde(default = "default_firing_lines")]
    pub firing_lines: u32,

    /// Planned start of the first competitor (`HH:MM:SS.mmm`)
    #[serde(with = "time_of_day")]
    pub start: Timestamp,

    /// Interval between competitor starts (`HH:MM:SS`)
    #[serde(with = "start_delta")]
    pub start_delta: TimeDelta,
}

fn default_firing_lines() -> u32 {
    1
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            laps: 1,
            lap_len: 0,
            penalty_len: 0,
            firing_lines: default_firing_lines(),
            start: NaiveTime::MIN,
            start_delta: TimeDelta::zero(),
        }
    }
}

impl RaceConfig {
    /// Create a new race configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the number of main laps
    pub fn with_laps(mut self, laps: u32) -> Self {
        self.laps = laps;
        self
    }

    /// Builder method: set the main lap length
    pub fn with_lap_len(mut self, meters: u32) -> Self {
        self.lap_len = meters;
        self
    }

    /// Builder method: set the penalty loop length
    pub fn with_penalty_len(mut self, meters: u32) -> Self {
        self.penalty_len = meters;
        self
    }

    /// Builder method: set the number of firing lines
    pub fn with_firing_lines(mut self, firing_lines: u32) -> Self {
        self.firing_lines = firing_lines;
        self
    }

    /// Builder method: set the planned start and start interval
    pub fn with_start(mut self, start: Timestamp, start_delta: TimeDelta) -> Self {
        self.start = start;
        self.start_delta = start_delta;
        self
    }

    /// Check that the configuration describes a runnable race
    pub fn validate(&self) -> Result<()> {
        if self.laps == 0 {
            return Err(RaceError::InvalidConfig("laps must be at least 1".to_string()));
        }
        if self.start_delta < TimeDelta::zero() {
            return Err(RaceError::InvalidConfig("startDelta must not be negative".to_string()));
        }
        Ok(())
    }
}

/// `HH:MM:SS.mmm` times of day
mod time_of_day {
    use crate::types::{format_timestamp, parse_timestamp, Timestamp};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(*ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_timestamp(&text).ok_or_else(|| {
            de::Error::custom(format!("invalid time '{}', expected HH:MM:SS.mmm", text))
        })
    }
}

/// `HH:MM:SS` intervals
mod start_delta {
    use chrono::{NaiveTime, TimeDelta, Timelike};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        let secs = delta.num_seconds().max(0);
        serializer.serialize_str(&format!(
            "{:02}:{:02}:{:02}",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60
        ))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let text = String::deserialize(deserializer)?;
        let t = NaiveTime::parse_from_str(text.trim(), "%H:%M:%S").map_err(|e| {
            de::Error::custom(format!("invalid interval '{}', expected HH:MM:SS: {}", text, e))
        })?;
        Ok(TimeDelta::seconds(t.num_seconds_from_midnight() as i64))
    }
}

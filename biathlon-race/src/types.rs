//! Core types for the biathlon race library
//!
//! This module defines the immutable inputs of the race pipeline: timestamps,
//! event kinds and the events themselves, plus the error type shared by every
//! stage (decoding, processing, configuration).

use chrono::{NaiveTime, TimeDelta};
use std::fmt;

/// Timestamp type used throughout the library (time of day, millisecond precision)
pub type Timestamp = NaiveTime;

/// Result type for race operations
pub type Result<T> = std::result::Result<T, RaceError>;

/// Fixed textual format of every timestamp in event logs and payloads
pub const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Parse a `HH:MM:SS.mmm` time string
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    NaiveTime::parse_from_str(text.trim(), TIME_FORMAT).ok()
}

/// Format a timestamp as `HH:MM:SS.mmm`
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.format(TIME_FORMAT).to_string()
}

/// Format a duration as zero-padded `HH:MM:SS.mmm`
///
/// Negative durations are clamped to zero.
pub fn format_duration(d: TimeDelta) -> String {
    let total_ms = d.num_milliseconds().max(0);
    let h = total_ms / 3_600_000;
    let m = (total_ms / 60_000) % 60;
    let s = (total_ms / 1_000) % 60;
    let ms = total_ms % 1_000;
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
}

/// Errors that can occur while reading events or running the race
#[derive(Debug, thiserror::Error)]
pub enum RaceError {
    #[error("Competitor {0} not found")]
    CompetitorNotFound(u32),

    #[error("Unknown event {0}")]
    UnknownEvent(u32),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid event line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The closed set of race event kinds
///
/// Discriminants match the integer tags used in event logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Registered = 1,
    StartTimeSet = 2,
    OnStartLine = 3,
    Started = 4,
    OnFiringRange = 5,
    TargetHit = 6,
    LeftFiringRange = 7,
    EnteredPenalty = 8,
    LeftPenalty = 9,
    EndedMainLap = 10,
    CannotContinue = 11,
}

impl EventKind {
    /// Integer tag of this kind as written in event logs
    pub fn id(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for EventKind {
    type Error = RaceError;

    fn try_from(id: u32) -> Result<Self> {
        Ok(match id {
            1 => EventKind::Registered,
            2 => EventKind::StartTimeSet,
            3 => EventKind::OnStartLine,
            4 => EventKind::Started,
            5 => EventKind::OnFiringRange,
            6 => EventKind::TargetHit,
            7 => EventKind::LeftFiringRange,
            8 => EventKind::EnteredPenalty,
            9 => EventKind::LeftPenalty,
            10 => EventKind::EndedMainLap,
            11 => EventKind::CannotContinue,
            other => return Err(RaceError::UnknownEvent(other)),
        })
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single timestamped race event
///
/// The kind is kept as the raw integer tag so that events with unknown kinds
/// can still be decoded and logged; [`Event::kind`] resolves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// When the event occurred
    pub time: Timestamp,
    /// Raw event kind tag
    pub kind_id: u32,
    /// Competitor the event refers to
    pub competitor_id: u32,
    /// Free-text payload (drawn start time, firing range or target identifier...)
    pub comments: Option<String>,
}

impl Event {
    /// Create an event of a known kind without payload
    pub fn new(time: Timestamp, kind: EventKind, competitor_id: u32) -> Self {
        Self {
            time,
            kind_id: kind.id(),
            competitor_id,
            comments: None,
        }
    }

    /// Builder method: attach a payload
    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    /// Resolve the kind tag, failing with `UnknownEvent` for unrecognized tags
    pub fn kind(&self) -> Result<EventKind> {
        EventKind::try_from(self.kind_id)
    }

    fn comments_str(&self) -> &str {
        self.comments.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = format_timestamp(self.time);
        let id = self.competitor_id;
        let comments = self.comments_str();

        let kind = match self.kind() {
            Ok(kind) => kind,
            Err(_) => {
                return write!(
                    f,
                    "[{}] Unknown event({}) for competitor({})",
                    ts, self.kind_id, id
                )
            }
        };

        match kind {
            EventKind::Registered => write!(f, "[{}] The competitor({}) registered", ts, id),
            EventKind::StartTimeSet => write!(
                f,
                "[{}] The start time for the competitor({}) was set by a draw to {}",
                ts, id, comments
            ),
            EventKind::OnStartLine => {
                write!(f, "[{}] The competitor({}) is on the start line", ts, id)
            }
            EventKind::Started => write!(f, "[{}] The competitor({}) has started", ts, id),
            EventKind::OnFiringRange => write!(
                f,
                "[{}] The competitor({}) is on the firing range({})",
                ts, id, comments
            ),
            EventKind::TargetHit => write!(
                f,
                "[{}] The target({}) has been hit by competitor({})",
                ts, comments, id
            ),
            EventKind::LeftFiringRange => {
                write!(f, "[{}] The competitor({}) left the firing range", ts, id)
            }
            EventKind::EnteredPenalty => {
                write!(f, "[{}] The competitor({}) entered the penalty laps", ts, id)
            }
            EventKind::LeftPenalty => {
                write!(f, "[{}] The competitor({}) left the penalty laps", ts, id)
            }
            EventKind::EndedMainLap => {
                write!(f, "[{}] The competitor({}) ended the main lap", ts, id)
            }
            EventKind::CannotContinue => write!(
                f,
                "[{}] The competitor({}) can`t continue: {}",
                ts, id, comments
            ),
        }
    }
}

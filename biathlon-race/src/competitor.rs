//! Competitor race state
//!
//! A [`Competitor`] is the mutable state accumulated for one participant while
//! the event log is replayed. Only the event processor writes to it; the report
//! calculator reads it.

use crate::types::Timestamp;
use std::collections::BTreeMap;
use std::fmt;

/// Competitor accumulator keyed by competitor identifier
pub type Competitors = BTreeMap<u32, Competitor>;

/// Final or current status of a competitor
///
/// A competitor who has started and is still running keeps `NotStarted`;
/// progress is visible through its laps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    NotStarted,
    Finished,
    NotFinished,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NotStarted => write!(f, "NotStarted"),
            Status::Finished => write!(f, "Finished"),
            Status::NotFinished => write!(f, "NotFinished"),
        }
    }
}

/// A single main lap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lap {
    /// Lap start (scheduled start for the first lap)
    pub start: Option<Timestamp>,
    /// Lap end, `None` while the lap is in progress
    pub end: Option<Timestamp>,
    /// Targets hit during this lap
    pub target_hits: u32,
}

impl Lap {
    /// Create a lap starting at the given time
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }

    /// True once the lap has an end time
    pub fn is_completed(&self) -> bool {
        self.end.is_some()
    }
}

/// A single pass through the penalty loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenaltyLap {
    pub start: Timestamp,
    /// `None` while the competitor is still in the penalty loop
    pub end: Option<Timestamp>,
}

impl PenaltyLap {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

/// Per-competitor race state
#[derive(Debug, Clone, PartialEq)]
pub struct Competitor {
    /// Competitor identifier (immutable once created)
    pub id: u32,
    pub status: Status,
    /// Start time drawn for this competitor
    pub scheduled_start: Option<Timestamp>,
    /// Time the competitor actually started
    pub actual_start: Option<Timestamp>,
    /// Main laps; the last one is the current lap
    pub laps: Vec<Lap>,
    pub penalty_laps: Vec<PenaltyLap>,
    /// Total targets hit
    pub shots: u32,
    /// Number of firing range visits
    pub firing_visits: u32,
    /// Index of the lap in progress
    pub current_lap: usize,
}

impl Competitor {
    /// Create a freshly registered competitor with one pre-allocated lap
    pub fn new(id: u32) -> Self {
        Self {
            id,
            status: Status::NotStarted,
            scheduled_start: None,
            actual_start: None,
            laps: vec![Lap::default()],
            penalty_laps: Vec::new(),
            shots: 0,
            firing_visits: 0,
            current_lap: 0,
        }
    }

    /// The lap in progress
    pub fn current_lap_mut(&mut self) -> &mut Lap {
        &mut self.laps[self.current_lap]
    }

    /// Number of laps with an end time
    pub fn completed_laps(&self) -> usize {
        self.laps.iter().filter(|lap| lap.is_completed()).count()
    }

    /// True while the competitor is inside the penalty loop
    pub fn in_penalty_loop(&self) -> bool {
        self.penalty_laps.last().is_some_and(PenaltyLap::is_open)
    }
}

//! Per-competitor performance reports
//!
//! [`compute`] derives a read-only [`Report`] from a competitor's final state.
//! It never fails: unset or inconsistent timestamps yield zero durations and
//! zero speeds.

use crate::competitor::{Competitor, Status};
use crate::config::RaceConfig;
use crate::types::{format_duration, Timestamp};
use chrono::{NaiveTime, TimeDelta};
use std::fmt;

/// Shots available on each firing range visit
pub const SHOTS_PER_FIRING: u32 = 5;

/// Duration and average speed of a lap (or of all penalty loops together)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapStat {
    pub duration: TimeDelta,
    /// Meters per second, 0 when no meaningful speed exists
    pub average_speed: f64,
}

impl LapStat {
    fn new(duration: TimeDelta, length_m: u32) -> Self {
        Self {
            duration,
            average_speed: average_speed(length_m, duration),
        }
    }
}

impl Default for LapStat {
    fn default() -> Self {
        Self {
            duration: TimeDelta::zero(),
            average_speed: 0.0,
        }
    }
}

/// Performance summary of one competitor
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub competitor_id: u32,
    pub status: Status,
    /// Last lap end minus scheduled start, zero before the first lap is done
    pub total_time: TimeDelta,
    pub laps: Vec<LapStat>,
    /// Aggregate over all completed penalty loops
    pub penalty: LapStat,
    /// Targets hit
    pub shots: u32,
    pub possible_shots: u32,
}

fn average_speed(length_m: u32, duration: TimeDelta) -> f64 {
    if duration <= TimeDelta::zero() {
        return 0.0;
    }
    length_m as f64 / (duration.num_milliseconds() as f64 / 1000.0)
}

/// Compute the report of a single competitor
pub fn compute(competitor: &Competitor, config: &RaceConfig) -> Report {
    // An undrawn start counts from midnight, matching an unset time of day
    let scheduled_start: Timestamp = competitor.scheduled_start.unwrap_or(NaiveTime::MIN);

    let first_lap_done = competitor
        .laps
        .first()
        .is_some_and(|lap| lap.is_completed());
    let total_time = if first_lap_done {
        competitor
            .laps
            .iter()
            .rev()
            .find_map(|lap| lap.end)
            .map(|end| end - scheduled_start)
            .unwrap_or_else(TimeDelta::zero)
    } else {
        TimeDelta::zero()
    };

    let mut boundary = scheduled_start;
    let mut laps = Vec::with_capacity(competitor.laps.len());
    for lap in &competitor.laps {
        let duration = match lap.end {
            Some(end) => {
                let duration = end - boundary;
                boundary = end;
                duration
            }
            None => TimeDelta::zero(),
        };
        laps.push(LapStat::new(duration, config.lap_len));
    }

    let penalty_time = competitor
        .penalty_laps
        .iter()
        .filter_map(|penalty| penalty.end.map(|end| end - penalty.start))
        .filter(|duration| *duration >= TimeDelta::zero())
        .fold(TimeDelta::zero(), |total, duration| total + duration);

    Report {
        competitor_id: competitor.id,
        status: competitor.status,
        total_time,
        laps,
        penalty: LapStat::new(penalty_time, config.penalty_len),
        shots: competitor.shots,
        possible_shots: competitor.firing_visits * SHOTS_PER_FIRING,
    }
}

/// `total id [{lap avg}, ...] {penalty, avg} shots/possible`
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Status::NotStarted => write!(f, "[NotStarted]")?,
            Status::NotFinished => write!(f, "[NotFinished]")?,
            Status::Finished => write!(f, "{}", format_duration(self.total_time))?,
        }
        write!(f, " {} [", self.competitor_id)?;
        for (i, lap) in self.laps.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(
                f,
                "{{{} {:.3}}}",
                format_duration(lap.duration),
                lap.average_speed
            )?;
        }
        write!(
            f,
            "] {{{}, {:.2}}} {}/{}",
            format_duration(self.penalty.duration),
            self.penalty.average_speed,
            self.shots,
            self.possible_shots
        )
    }
}

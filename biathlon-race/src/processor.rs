//! Event processing state machine
//!
//! [`apply`] folds one event into the competitor accumulator. It is the only
//! writer of competitor state. [`EventProcessor`] owns an accumulator and
//! drives `apply` over a whole event source.

use crate::competitor::{Competitor, Competitors, Lap, PenaltyLap, Status};
use crate::types::{parse_timestamp, Event, EventKind, RaceError, Result};

/// Apply a single event to the competitor accumulator
///
/// Every event except `Registered` must refer to a known competitor. Events
/// must arrive in time order; out-of-order input is not detected.
///
/// # Errors
/// * `CompetitorNotFound` - the event refers to an unregistered competitor
/// * `UnknownEvent` - the kind tag is outside the known set
/// * `MalformedPayload` - a drawn start time could not be parsed
pub fn apply(event: &Event, competitors: &mut Competitors, total_laps: u32) -> Result<()> {
    let id = event.competitor_id;

    if event.kind_id == EventKind::Registered.id() {
        if competitors.contains_key(&id) {
            log::warn!("Competitor {} registered twice, keeping existing state", id);
        } else {
            log::debug!("Competitor {} registered", id);
            competitors.insert(id, Competitor::new(id));
        }
        return Ok(());
    }

    let competitor = competitors
        .get_mut(&id)
        .ok_or(RaceError::CompetitorNotFound(id))?;
    let kind = event.kind()?;
    log::trace!("Competitor {}: {} at {}", id, kind, event.time);

    match kind {
        EventKind::StartTimeSet => {
            let text = event.comments.as_deref().unwrap_or_default();
            let scheduled = parse_timestamp(text).ok_or_else(|| {
                RaceError::MalformedPayload(format!(
                    "invalid start time '{}' for competitor {}",
                    text, id
                ))
            })?;
            competitor.scheduled_start = Some(scheduled);
            competitor.current_lap_mut().start = Some(scheduled);
            log::debug!("Competitor {} scheduled to start at {}", id, scheduled);
        }

        EventKind::Registered | EventKind::OnStartLine | EventKind::LeftFiringRange => {}

        EventKind::Started => {
            competitor.actual_start = Some(event.time);
        }

        EventKind::OnFiringRange => {
            competitor.firing_visits += 1;
        }

        EventKind::TargetHit => {
            competitor.shots += 1;
            competitor.current_lap_mut().target_hits += 1;
        }

        EventKind::EnteredPenalty => {
            competitor.penalty_laps.push(PenaltyLap {
                start: event.time,
                end: None,
            });
        }

        EventKind::LeftPenalty => match competitor.penalty_laps.last_mut() {
            Some(penalty) if penalty.is_open() => penalty.end = Some(event.time),
            _ => log::warn!(
                "Competitor {} left the penalty loop at {} without entering it, ignoring",
                id,
                event.time
            ),
        },

        EventKind::EndedMainLap => end_main_lap(competitor, event, total_laps),

        EventKind::CannotContinue => {
            competitor.status = Status::NotFinished;
            log::debug!("Competitor {} cannot continue", id);
        }
    }

    Ok(())
}

/// Close the current lap and either open the next one or finish the race
fn end_main_lap(competitor: &mut Competitor, event: &Event, total_laps: u32) {
    if competitor.status == Status::Finished {
        log::warn!(
            "Competitor {} ended a main lap at {} after finishing, ignoring",
            competitor.id,
            event.time
        );
        return;
    }

    competitor.current_lap_mut().end = Some(event.time);

    log::debug!(
        "Competitor {} completed {}/{} laps at {}",
        competitor.id,
        competitor.completed_laps(),
        total_laps,
        event.time
    );

    if competitor.current_lap + 1 < total_laps as usize {
        competitor.current_lap += 1;
        competitor.laps.push(Lap::starting_at(event.time));
    } else {
        competitor.status = Status::Finished;
        log::debug!("Competitor {} finished at {}", competitor.id, event.time);
    }
}

/// Owns the competitor accumulator for one race
pub struct EventProcessor {
    competitors: Competitors,
    total_laps: u32,
}

impl EventProcessor {
    /// Create a processor for a race with the given number of main laps
    pub fn new(total_laps: u32) -> Self {
        Self {
            competitors: Competitors::new(),
            total_laps,
        }
    }

    /// Apply a single event
    pub fn apply(&mut self, event: &Event) -> Result<()> {
        apply(event, &mut self.competitors, self.total_laps)
    }

    /// Consume an event source until it is exhausted or the first error
    ///
    /// Returns the number of events applied.
    pub fn process<I>(&mut self, events: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<Event>>,
    {
        let mut count = 0;
        for event in events {
            self.apply(&event?)?;
            count += 1;
        }
        log::info!(
            "Processed {} events for {} competitors",
            count,
            self.competitors.len()
        );
        Ok(count)
    }

    /// Current competitor states, in identifier order
    pub fn competitors(&self) -> &Competitors {
        &self.competitors
    }

    /// Take the final competitor states
    pub fn into_competitors(self) -> Competitors {
        self.competitors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timestamp;
    use chrono::NaiveTime;

    const LAPS: u32 = 2;

    fn at(h: u32, m: u32, s: u32) -> Timestamp {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn feed(competitors: &mut Competitors, time: Timestamp, kind: EventKind, id: u32) {
        apply(&Event::new(time, kind, id), competitors, LAPS).unwrap();
    }

    fn registered(id: u32) -> Competitors {
        let mut competitors = Competitors::new();
        feed(&mut competitors, at(9, 0, 0), EventKind::Registered, id);
        competitors
    }

    #[test]
    fn test_registration() {
        let competitors = registered(1);
        let competitor = &competitors[&1];
        assert_eq!(competitor.status, Status::NotStarted);
        assert_eq!(competitor.laps, vec![Lap::default()]);
    }

    #[test]
    fn test_duplicate_registration_keeps_state() {
        let mut competitors = registered(1);
        feed(&mut competitors, at(9, 1, 0), EventKind::TargetHit, 1);
        feed(&mut competitors, at(9, 2, 0), EventKind::Registered, 1);
        assert_eq!(competitors[&1].shots, 1);
    }

    #[test]
    fn test_start_time_set() {
        let mut competitors = registered(1);
        let event =
            Event::new(at(9, 5, 0), EventKind::StartTimeSet, 1).with_comments("10:05:00.000");
        apply(&event, &mut competitors, LAPS).unwrap();

        let competitor = &competitors[&1];
        assert_eq!(competitor.scheduled_start, Some(at(10, 5, 0)));
        assert_eq!(competitor.laps[0].start, Some(at(10, 5, 0)));
    }

    #[test]
    fn test_malformed_start_time() {
        let mut competitors = registered(1);
        let event = Event::new(at(9, 5, 0), EventKind::StartTimeSet, 1).with_comments("soon");
        let result = apply(&event, &mut competitors, LAPS);
        assert!(matches!(result, Err(RaceError::MalformedPayload(_))));

        let missing = Event::new(at(9, 5, 0), EventKind::StartTimeSet, 1);
        let result = apply(&missing, &mut competitors, LAPS);
        assert!(matches!(result, Err(RaceError::MalformedPayload(_))));
    }

    #[test]
    fn test_unregistered_competitor() {
        let mut competitors = Competitors::new();
        let event = Event::new(at(10, 0, 0), EventKind::Started, 99);
        let result = apply(&event, &mut competitors, LAPS);
        assert!(matches!(result, Err(RaceError::CompetitorNotFound(99))));
        assert!(competitors.is_empty());
    }

    #[test]
    fn test_unknown_event() {
        let mut competitors = registered(1);
        let event = Event {
            time: at(10, 0, 0),
            kind_id: 42,
            competitor_id: 1,
            comments: None,
        };
        let result = apply(&event, &mut competitors, LAPS);
        assert!(matches!(result, Err(RaceError::UnknownEvent(42))));
    }

    #[test]
    fn test_unknown_event_for_unregistered_competitor() {
        let mut competitors = registered(1);
        let event = Event {
            time: at(10, 0, 0),
            kind_id: 42,
            competitor_id: 99,
            comments: None,
        };
        let result = apply(&event, &mut competitors, LAPS);
        assert!(matches!(result, Err(RaceError::CompetitorNotFound(99))));
        assert!(!competitors.contains_key(&99));
    }

    #[test]
    fn test_shooting_counters() {
        let mut competitors = registered(1);
        let events = [
            Event::new(at(10, 5, 0), EventKind::OnFiringRange, 1).with_comments("1"),
            Event::new(at(10, 5, 10), EventKind::TargetHit, 1).with_comments("1"),
            Event::new(at(10, 5, 12), EventKind::TargetHit, 1).with_comments("2"),
            Event::new(at(10, 5, 20), EventKind::LeftFiringRange, 1),
        ];
        for event in &events {
            apply(event, &mut competitors, LAPS).unwrap();
        }

        let competitor = &competitors[&1];
        assert_eq!(competitor.firing_visits, 1);
        assert_eq!(competitor.shots, 2);
        assert_eq!(competitor.laps[0].target_hits, 2);
    }

    #[test]
    fn test_started_records_actual_start() {
        let mut competitors = registered(1);
        feed(&mut competitors, at(10, 0, 3), EventKind::Started, 1);
        assert_eq!(competitors[&1].actual_start, Some(at(10, 0, 3)));
        assert_eq!(competitors[&1].status, Status::NotStarted);
    }

    #[test]
    fn test_penalty_intervals() {
        let mut competitors = registered(1);
        feed(&mut competitors, at(10, 6, 0), EventKind::EnteredPenalty, 1);
        assert!(competitors[&1].in_penalty_loop());

        feed(&mut competitors, at(10, 7, 0), EventKind::LeftPenalty, 1);
        let competitor = &competitors[&1];
        assert_eq!(
            competitor.penalty_laps,
            vec![PenaltyLap {
                start: at(10, 6, 0),
                end: Some(at(10, 7, 0)),
            }]
        );
    }

    #[test]
    fn test_stray_left_penalty_is_ignored() {
        let mut competitors = registered(1);

        // No penalty interval at all
        feed(&mut competitors, at(10, 6, 0), EventKind::LeftPenalty, 1);
        assert!(competitors[&1].penalty_laps.is_empty());

        // Second exit does not overwrite the closed interval
        feed(&mut competitors, at(10, 7, 0), EventKind::EnteredPenalty, 1);
        feed(&mut competitors, at(10, 8, 0), EventKind::LeftPenalty, 1);
        feed(&mut competitors, at(10, 9, 0), EventKind::LeftPenalty, 1);
        assert_eq!(competitors[&1].penalty_laps[0].end, Some(at(10, 8, 0)));
    }

    #[test]
    fn test_lap_progression_and_finish() {
        let mut competitors = registered(1);

        feed(&mut competitors, at(10, 10, 0), EventKind::EndedMainLap, 1);
        {
            let competitor = &competitors[&1];
            assert_eq!(competitor.current_lap, 1);
            assert_eq!(competitor.laps.len(), 2);
            assert_eq!(competitor.laps[0].end, Some(at(10, 10, 0)));
            assert_eq!(competitor.laps[1].start, Some(at(10, 10, 0)));
            assert_eq!(competitor.status, Status::NotStarted);
        }

        // Last lap: finishes without appending a new lap
        feed(&mut competitors, at(10, 21, 0), EventKind::EndedMainLap, 1);
        let competitor = &competitors[&1];
        assert_eq!(competitor.status, Status::Finished);
        assert_eq!(competitor.laps.len(), 2);
        assert_eq!(competitor.current_lap, 1);
        assert_eq!(competitor.laps[1].end, Some(at(10, 21, 0)));
    }

    #[test]
    fn test_lap_after_finish_is_ignored() {
        let mut competitors = registered(1);
        for minute in [10, 21, 30] {
            let event = Event::new(at(10, minute, 0), EventKind::EndedMainLap, 1);
            apply(&event, &mut competitors, LAPS).unwrap();
        }
        let competitor = &competitors[&1];
        assert_eq!(competitor.laps.len(), 2);
        assert_eq!(competitor.laps[1].end, Some(at(10, 21, 0)));
    }

    #[test]
    fn test_cannot_continue() {
        let mut competitors = registered(1);
        let event = Event::new(at(10, 15, 0), EventKind::CannotContinue, 1)
            .with_comments("Lost in the forest");
        apply(&event, &mut competitors, LAPS).unwrap();
        assert_eq!(competitors[&1].status, Status::NotFinished);

        // Later events are still accepted
        feed(&mut competitors, at(10, 16, 0), EventKind::TargetHit, 1);
        assert_eq!(competitors[&1].shots, 1);
    }

    #[test]
    fn test_event_processor_stops_at_first_error() {
        let events = vec![
            Ok(Event::new(at(9, 0, 0), EventKind::Registered, 1)),
            Ok(Event::new(at(9, 1, 0), EventKind::Started, 2)),
            Ok(Event::new(at(9, 2, 0), EventKind::Registered, 3)),
        ];

        let mut processor = EventProcessor::new(LAPS);
        let result = processor.process(events);
        assert!(matches!(result, Err(RaceError::CompetitorNotFound(2))));
        assert_eq!(processor.competitors().len(), 1);
    }

    #[test]
    fn test_event_processor_propagates_source_errors() {
        let events = vec![
            Ok(Event::new(at(9, 0, 0), EventKind::Registered, 1)),
            Err(RaceError::InvalidLine {
                line: 2,
                reason: "bad".to_string(),
            }),
        ];

        let mut processor = EventProcessor::new(LAPS);
        let result = processor.process(events);
        assert!(matches!(result, Err(RaceError::InvalidLine { line: 2, .. })));
    }
}

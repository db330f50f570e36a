//! Biathlon Race Library
//!
//! Replays a chronologically ordered log of biathlon race events and produces
//! a performance report for every competitor.
//!
//! # Architecture
//!
//! The library is a small pipeline with no I/O beyond reading the event log:
//! - Decodes a text event log into a lazy stream of [`Event`]s
//! - Applies each event to per-competitor state ([`processor`])
//! - Derives lap times, speeds, penalty time and shooting accuracy ([`report`])
//!
//! The library does NOT:
//! - Load configuration files
//! - Print event logs or reports
//! - Reorder or validate event timestamps
//!
//! Those concerns live in the application layer (biathlon-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use biathlon_race::{compute, EventLogParser, EventProcessor, RaceConfig};
//! use std::path::Path;
//!
//! let config = RaceConfig::new().with_laps(2).with_lap_len(3500).with_penalty_len(50);
//!
//! let mut processor = EventProcessor::new(config.laps);
//! let events = EventLogParser::parse(Path::new("events")).unwrap();
//! processor.process(events).unwrap();
//!
//! for competitor in processor.competitors().values() {
//!     println!("{}", compute(competitor, &config));
//! }
//! ```

// Public modules
pub mod competitor;
pub mod config;
pub mod formats;
pub mod processor;
pub mod report;
pub mod types;

// Re-export main types for convenience
pub use competitor::{Competitor, Competitors, Lap, PenaltyLap, Status};
pub use config::RaceConfig;
pub use formats::{decode_line, EventLogIterator, EventLogParser};
pub use processor::{apply, EventProcessor};
pub use report::{compute, LapStat, Report, SHOTS_PER_FIRING};
pub use types::{
    format_duration, format_timestamp, parse_timestamp, Event, EventKind, RaceError, Result,
    Timestamp, TIME_FORMAT,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

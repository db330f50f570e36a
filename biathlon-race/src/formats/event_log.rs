//! Text event log parser
//!
//! Parses race event logs, one event per line:
//!
//! ```text
//! [09:05:59.867] 1 1
//! [09:15:00.841] 2 1 09:30:00.000
//! [09:49:33.123] 6 1 1
//! ```
//!
//! The fields are a bracketed `HH:MM:SS.mmm` time, the integer event kind, the
//! integer competitor id and optional free-text comments. Blank lines are
//! skipped. Kinds are not validated here; unknown kinds are rejected by the
//! event processor.

use crate::types::{parse_timestamp, Event, RaceError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Event log file parser
pub struct EventLogParser;

impl EventLogParser {
    /// Open an event log file and return an iterator over its events
    pub fn parse(path: &Path) -> Result<EventLogIterator<BufReader<File>>> {
        log::info!("Parsing event log: {:?}", path);

        let file = File::open(path)?;
        Ok(EventLogIterator::new(BufReader::new(file)))
    }
}

/// Decode one log line into an event
///
/// `line_no` is only used for error messages.
pub fn decode_line(line: &str, line_no: usize) -> Result<Event> {
    let invalid = |reason: String| RaceError::InvalidLine {
        line: line_no,
        reason,
    };

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(invalid(format!("expected at least 3 fields in '{}'", line)));
    }

    let time_str = parts[0].trim_matches(|c| c == '[' || c == ']');
    let time = parse_timestamp(time_str)
        .ok_or_else(|| invalid(format!("invalid time '{}'", parts[0])))?;

    let kind_id = parts[1]
        .parse::<u32>()
        .map_err(|e| invalid(format!("invalid event kind '{}': {}", parts[1], e)))?;

    let competitor_id = parts[2]
        .parse::<u32>()
        .map_err(|e| invalid(format!("invalid competitor id '{}': {}", parts[2], e)))?;

    let comments = if parts.len() > 3 {
        Some(parts[3..].join(" "))
    } else {
        None
    };

    Ok(Event {
        time,
        kind_id,
        competitor_id,
        comments,
    })
}

/// Iterator over events of a text event log
///
/// Yields `None` once the input is exhausted; read failures and malformed
/// lines are yielded as errors.
pub struct EventLogIterator<R: BufRead> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> EventLogIterator<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }

    /// Number of lines read so far
    pub fn lines_read(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for EventLogIterator<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(RaceError::Io(e))),
            }
            self.line_no += 1;

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }

            log::trace!("Line {}: {}", self.line_no, line);
            return Some(decode_line(line, self.line_no));
        }
    }
}

//! Event log parsers
//!
//! Each parser turns a line-oriented race log into an iterator over
//! [`Event`](crate::types::Event) records.

pub mod event_log;

// Re-export parser types
pub use event_log::{decode_line, EventLogIterator, EventLogParser};

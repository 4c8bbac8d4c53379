//! Formatted log lines as stored in the queue
//!
//! One entry is exactly one line:
//!
//! ```text
//! 2025-03-01 14:05:09 | INFO | order {{id}} accepted\n
//! ```
//!
//! The timestamp is rendered in a fixed UTC offset with second precision.
//! Braces and backslashes are doubled and embedded line breaks become `\n`
//! and `\r`, so downstream consumers splitting on newlines or treating
//! braces as placeholders see the message verbatim.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::fmt;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Immutable, already formatted log line (trailing newline included)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogEntry(String);

impl LogEntry {
    /// Format one record
    pub fn format<Tz: TimeZone>(time: &DateTime<Tz>, offset: FixedOffset, level: &str, message: &str) -> Self {
        let local = time.with_timezone(&offset);
        Self(format!(
            "{} | {} | {}\n",
            local.format(TIMESTAMP_FORMAT),
            level,
            escape_message(message)
        ))
    }

    /// Format a record stamped with the current time
    pub fn now(offset: FixedOffset, level: &str, message: &str) -> Self {
        Self::format(&Utc::now(), offset, level, message)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LogEntry {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Escape characters that would be misread downstream
pub fn escape_message(message: &str) -> String {
    let mut escaped = String::with_capacity(message.len());

    for c in message.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '{' => escaped.push_str("{{"),
            '}' => escaped.push_str("}}"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }

    escaped
}

/// Fixed offset for whole hours east of UTC; `None` when out of range
pub fn offset_from_hours(hours: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(hours.checked_mul(3600)?)
}

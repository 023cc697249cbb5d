//! Clock and host log sink
//!
//! The core never reads wall-clock time or writes to a console directly.
//! Hosts hand in a [`Clock`] (so upload cache busters are deterministic in
//! tests) and optionally a [`LoggerSink`] that mirrors `tracing` events into
//! their own log pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

/// Source of the current instant.
///
/// ```
/// use bridge_traits::time::{Clock, SystemClock};
///
/// assert!(SystemClock.unix_timestamp_millis() > 0);
/// ```
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds since the Unix epoch.
    fn unix_timestamp_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Severity of a forwarded log entry, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// One `tracing` event as seen by the host.
///
/// Field values arrive already redacted when the logging layer is configured
/// to do so; sinks must not assume they see raw credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    pub target: String,
    pub message: String,
    pub fields: HashMap<String, String>,
    /// Name of the innermost span the event was recorded in.
    pub span_id: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: HashMap::new(),
            span_id: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_span_id(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }
}

/// Host-side receiver for structured logs.
///
/// Sink failures are swallowed by the forwarding layer; logging never fails
/// a navigation or an upload.
#[async_trait::async_trait]
pub trait LoggerSink: Send + Sync {
    async fn log(&self, entry: LogEntry) -> Result<()>;

    /// Entries below this level are dropped before they are built.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn test_millis_derived_from_now() {
        let instant = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(FixedClock(instant).unix_timestamp_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let first = SystemClock.unix_timestamp_millis();
        let second = SystemClock.unix_timestamp_millis();
        assert!(second >= first);
    }

    #[test]
    fn test_log_levels_are_ordered() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_entry_builder() {
        let entry = LogEntry::new(LogLevel::Warn, "core_media", "Media host rejected upload")
            .with_field("status", "400")
            .with_span_id("avatar_upload");

        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.target, "core_media");
        assert_eq!(entry.fields.get("status").map(String::as_str), Some("400"));
        assert_eq!(entry.span_id.as_deref(), Some("avatar_upload"));
    }
}

//! Preallocated log records.

use chrono::{DateTime, Utc};

use crate::logging::level::{LogLevel, Subsystem};

/// One staged log record.
///
/// Records live in the bounded pool and are recycled: `reset` clears the
/// fields but keeps the text buffer's capacity, so a warmed-up pool does no
/// per-record allocation on the hot path.
#[derive(Debug)]
pub struct LogItem {
    /// Application tag stamped on the line.
    pub app_name: String,
    /// Severity of the record.
    pub level: LogLevel,
    /// Origin subsystem.
    pub subsystem: Subsystem,
    /// Source file of the call site.
    pub file: &'static str,
    /// Source line of the call site.
    pub line: u32,
    /// Dense id of the emitting thread.
    pub thread_id: u32,
    /// Per-thread sequence number.
    pub seq: u64,
    /// Call-depth indent of the emitting thread, clamped.
    pub indent: usize,
    /// Cross-task correlation id, if the emitting context carries one.
    pub correlation_id: Option<u64>,
    /// Wall-clock capture time.
    pub at: DateTime<Utc>,
    /// The formatted message text.
    pub text: String,
}

impl LogItem {
    /// A blank record for initial pool population.
    pub(crate) fn blank() -> Self {
        Self {
            app_name: String::new(),
            level: LogLevel::Info,
            subsystem: Subsystem::Util,
            file: "",
            line: 0,
            thread_id: 0,
            seq: 0,
            indent: 0,
            correlation_id: None,
            at: DateTime::<Utc>::MIN_UTC,
            text: String::new(),
        }
    }

    /// Clears the record for reuse, keeping both string capacities.
    pub(crate) fn reset(&mut self) {
        self.app_name.clear();
        self.level = LogLevel::Info;
        self.subsystem = Subsystem::Util;
        self.file = "";
        self.line = 0;
        self.thread_id = 0;
        self.seq = 0;
        self.indent = 0;
        self.correlation_id = None;
        self.at = DateTime::<Utc>::MIN_UTC;
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_keeps_capacity() {
        let mut item = LogItem::blank();
        item.text.push_str("a fairly long formatted log message body");
        let cap = item.text.capacity();
        item.reset();
        assert!(item.text.is_empty());
        assert_eq!(item.text.capacity(), cap);
    }
}

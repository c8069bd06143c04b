//! # Gateway logging: sync and staged-async strategies over one sink.
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!                 │                   Logger                     │
//!   emit threads ─┤  level gate ─► thread ctx ─► strategy        │
//!                 └──────────────┬───────────────┬───────────────┘
//!                         sync   │               │  async
//!                      format +  │               │  acquire/commit
//!                      write now │               │  into bounded pool
//!                                ▼               ▼
//!                            ┌──────┐      ┌──────────┐   flush timer
//!                            │ sink │ ◄─── │ pipeline │ ◄─ (log task)
//!                            └──────┘      └──────────┘
//! ```
//!
//! The synchronous strategy formats and writes inline on the calling thread;
//! ordering is total but emitters pay the I/O. The asynchronous strategy
//! stages records in the bounded [`pipeline`] and the dedicated log task
//! drains them on a periodic timer, so emitters only touch two short locks.
//! On pool exhaustion the emitter drains synchronously once and retries;
//! a still-exhausted pool sends the record to stderr and counts it.
//!
//! Severity is gated per [`Subsystem`] with atomically adjustable
//! thresholds, so a single protocol layer can be turned up to `TRACE` on a
//! live system without touching the rest.

mod config;
mod item;
mod level;
mod pipeline;
mod task;
mod thread_ctx;
mod writer;

pub use config::{LogConfig, LogConfigError, LogOutput};
pub use level::{LogLevel, Subsystem};
pub use task::LogTask;

use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use crate::logging::item::LogItem;
use crate::logging::pipeline::AsyncPipeline;
use crate::logging::thread_ctx::ThreadRegistry;
use crate::logging::writer::{format_line, Sink};

/// Cheap cloneable handle to the process logger.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerShared>,
}

struct LoggerShared {
    app_name: String,
    color: bool,
    levels: [AtomicU8; Subsystem::COUNT],
    threads: ThreadRegistry,
    /// `None` runs the synchronous strategy.
    pipeline: Option<AsyncPipeline>,
    sink: Mutex<Sink>,
    flush_period: Duration,
    connect_period: Duration,
}

impl Logger {
    /// Builds the logger from a frozen configuration.
    pub fn init(cfg: LogConfig) -> Self {
        let sink = Sink::from_config(&cfg);
        // Colors only make sense on a console.
        let color = cfg.color && matches!(sink, Sink::Console);

        let levels = std::array::from_fn(|_| AtomicU8::new(cfg.default_level as u8));
        let inner = LoggerShared {
            app_name: cfg.app_name.clone(),
            color,
            levels,
            threads: ThreadRegistry::default(),
            pipeline: cfg
                .asynchronous
                .then(|| AsyncPipeline::new(cfg.pool_size_clamped())),
            sink: Mutex::new(sink),
            flush_period: cfg.flush_period,
            connect_period: cfg.connect_period,
        };
        let logger = Self {
            inner: Arc::new(inner),
        };
        for (sub, level) in &cfg.levels {
            logger.set_level(*sub, *level);
        }
        logger
    }

    /// Adjusts one subsystem's threshold at runtime.
    pub fn set_level(&self, subsystem: Subsystem, level: LogLevel) {
        self.inner.levels[subsystem.index()].store(level as u8, Ordering::Relaxed);
    }

    /// Current threshold for a subsystem.
    pub fn level(&self, subsystem: Subsystem) -> LogLevel {
        LogLevel::from_u8(self.inner.levels[subsystem.index()].load(Ordering::Relaxed))
    }

    /// True when a record at `level` would be emitted for `subsystem`.
    #[inline]
    pub fn is_enabled(&self, subsystem: Subsystem, level: LogLevel) -> bool {
        level as u8 <= self.inner.levels[subsystem.index()].load(Ordering::Relaxed)
    }

    /// Emits one record. The call site's file and line are captured.
    #[track_caller]
    pub fn log(&self, subsystem: Subsystem, level: LogLevel, args: fmt::Arguments<'_>) {
        if !self.is_enabled(subsystem, level) {
            return;
        }
        let loc = Location::caller();
        self.emit(subsystem, level, loc.file(), loc.line(), args);
    }

    #[track_caller]
    pub fn error(&self, subsystem: Subsystem, args: fmt::Arguments<'_>) {
        self.log(subsystem, LogLevel::Error, args);
    }

    #[track_caller]
    pub fn warning(&self, subsystem: Subsystem, args: fmt::Arguments<'_>) {
        self.log(subsystem, LogLevel::Warning, args);
    }

    #[track_caller]
    pub fn info(&self, subsystem: Subsystem, args: fmt::Arguments<'_>) {
        self.log(subsystem, LogLevel::Info, args);
    }

    #[track_caller]
    pub fn debug(&self, subsystem: Subsystem, args: fmt::Arguments<'_>) {
        self.log(subsystem, LogLevel::Debug, args);
    }

    /// Marks function entry at trace level and deepens this thread's indent.
    #[track_caller]
    pub fn trace_enter(&self, subsystem: Subsystem, what: &str) {
        self.log(subsystem, LogLevel::Trace, format_args!("Entering {what}"));
        self.inner.threads.current().enter();
    }

    /// Shallows this thread's indent and marks function exit at trace level.
    #[track_caller]
    pub fn trace_exit(&self, subsystem: Subsystem, what: &str) {
        self.inner.threads.current().exit();
        self.log(subsystem, LogLevel::Trace, format_args!("Leaving {what}"));
    }

    /// Sets (or clears) the correlation id stamped on this thread's records.
    pub fn set_correlation(&self, id: Option<u64>) {
        self.inner.threads.current().set_correlation(id);
    }

    fn emit(
        &self,
        subsystem: Subsystem,
        level: LogLevel,
        file: &'static str,
        line: u32,
        args: fmt::Arguments<'_>,
    ) {
        let ctx = self.inner.threads.current();
        let Some(pipeline) = &self.inner.pipeline else {
            // Synchronous strategy: format and write inline.
            let mut item = LogItem::blank();
            self.fill(&mut item, &ctx, subsystem, level, file, line, args);
            let rendered = format_line(&item, self.inner.color);
            let mut sink = self.inner.sink.lock().unwrap_or_else(|e| e.into_inner());
            sink.write_line(&rendered, &item);
            sink.flush();
            return;
        };

        let item = pipeline.acquire().or_else(|| {
            // Pool exhausted: drain on the emitter's back and retry once.
            self.flush();
            pipeline.acquire()
        });
        match item {
            Some(mut item) => {
                self.fill(&mut item, &ctx, subsystem, level, file, line, args);
                pipeline.commit(item);
            }
            None => {
                pipeline.count_dropped();
                eprintln!("log: pool exhausted, dropping: {args}");
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn fill(
        &self,
        item: &mut LogItem,
        ctx: &thread_ctx::ThreadCtxt,
        subsystem: Subsystem,
        level: LogLevel,
        file: &'static str,
        line: u32,
        args: fmt::Arguments<'_>,
    ) {
        use std::fmt::Write as _;
        item.app_name.push_str(&self.inner.app_name);
        item.level = level;
        item.subsystem = subsystem;
        item.file = file;
        item.line = line;
        item.thread_id = ctx.tid;
        item.seq = ctx.next_seq();
        item.indent = ctx.indent();
        item.correlation_id = ctx.correlation();
        item.at = Utc::now();
        let _ = write!(item.text, "{args}");
    }

    /// Drains every staged record through the sink. Returns lines written.
    ///
    /// No-op under the synchronous strategy.
    pub fn flush(&self) -> usize {
        let Some(pipeline) = &self.inner.pipeline else {
            return 0;
        };
        let color = self.inner.color;
        let mut sink = self.inner.sink.lock().unwrap_or_else(|e| e.into_inner());
        let written = pipeline.drain(|item| {
            let rendered = format_line(item, color);
            sink.write_line(&rendered, item);
        });
        if written > 0 {
            sink.flush();
        }
        written
    }

    /// One reconnect-timer tick for sinks that hold a connection.
    pub fn tick_connect(&self) {
        self.inner
            .sink
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .tick_connect();
    }

    /// Configured period of the log task's flush timer.
    pub fn flush_period(&self) -> Duration {
        self.inner.flush_period
    }

    /// Configured period of the TCP reconnect timer.
    pub fn connect_period(&self) -> Duration {
        self.inner.connect_period
    }

    /// True when the sink needs the periodic reconnect timer.
    pub fn needs_connect_timer(&self) -> bool {
        self.inner
            .sink
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .wants_connect_timer()
    }

    /// Staged records not yet written. Zero after a quiescent flush.
    pub fn outstanding(&self) -> usize {
        self.inner.pipeline.as_ref().map_or(0, |p| p.outstanding())
    }

    /// Records refused because the pool stayed exhausted.
    pub fn dropped(&self) -> u64 {
        self.inner.pipeline.as_ref().map_or(0, |p| p.dropped())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("app_name", &self.inner.app_name)
            .field("async", &self.inner.pipeline.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn async_logger() -> Logger {
        Logger::init(LogConfig {
            asynchronous: true,
            pool_size: 16,
            ..LogConfig::default()
        })
    }

    #[test]
    fn level_gate_is_per_subsystem() {
        let logger = async_logger();
        logger.set_level(Subsystem::Sctp, LogLevel::Trace);
        logger.set_level(Subsystem::Nas, LogLevel::Error);

        assert!(logger.is_enabled(Subsystem::Sctp, LogLevel::Trace));
        assert!(!logger.is_enabled(Subsystem::Nas, LogLevel::Warning));
        assert!(logger.is_enabled(Subsystem::Nas, LogLevel::Critical));

        logger.log(Subsystem::Nas, LogLevel::Debug, format_args!("filtered"));
        assert_eq!(logger.outstanding(), 0);
    }

    #[test]
    fn staged_records_drain_to_zero() {
        let logger = async_logger();
        for i in 0..10 {
            logger.info(Subsystem::Itti, format_args!("record {i}"));
        }
        assert_eq!(logger.outstanding(), 10);
        assert_eq!(logger.flush(), 10);
        assert_eq!(logger.outstanding(), 0);
        assert_eq!(logger.dropped(), 0);
    }

    #[test]
    fn exhaustion_forces_inline_drain() {
        let logger = Logger::init(LogConfig {
            asynchronous: true,
            pool_size: 4,
            ..LogConfig::default()
        });
        // Well past the pool size; every record must still land.
        for i in 0..40 {
            logger.info(Subsystem::Itti, format_args!("burst {i}"));
        }
        logger.flush();
        assert_eq!(logger.outstanding(), 0);
        assert_eq!(logger.dropped(), 0);
    }

    #[test]
    fn concurrent_emitters_settle_clean() {
        let logger = Logger::init(LogConfig {
            asynchronous: true,
            pool_size: 8,
            ..LogConfig::default()
        });
        let mut handles = Vec::new();
        for t in 0..4 {
            let logger = logger.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..200 {
                    logger.info(Subsystem::Util, format_args!("worker {t} line {i}"));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        logger.flush();
        assert_eq!(logger.outstanding(), 0);
        assert_eq!(logger.dropped(), 0);
    }

    #[test]
    fn trace_pairs_nest_the_indent() {
        let logger = async_logger();
        logger.set_level(Subsystem::Util, LogLevel::Trace);
        logger.trace_enter(Subsystem::Util, "outer");
        logger.trace_enter(Subsystem::Util, "inner");
        logger.info(Subsystem::Util, format_args!("body"));
        logger.trace_exit(Subsystem::Util, "inner");
        logger.trace_exit(Subsystem::Util, "outer");

        let mut indents = Vec::new();
        if let Some(pipeline) = &logger.inner.pipeline {
            pipeline.drain(|item| indents.push((item.indent, item.text.clone())));
        }
        assert_eq!(indents.len(), 5);
        assert_eq!(indents[0].0, 0); // Entering outer
        assert_eq!(indents[1].0, 1); // Entering inner
        assert_eq!(indents[2].0, 2); // body
        assert_eq!(indents[3].0, 1); // Leaving inner
        assert_eq!(indents[4].0, 0); // Leaving outer
    }

    #[test]
    fn synchronous_strategy_has_no_pool() {
        let logger = Logger::init(LogConfig {
            asynchronous: false,
            ..LogConfig::default()
        });
        logger.info(Subsystem::Itti, format_args!("inline"));
        assert_eq!(logger.outstanding(), 0);
        assert_eq!(logger.flush(), 0);
    }
}

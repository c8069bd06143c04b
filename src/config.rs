//! # Global runtime configuration.
//!
//! [`RuntimeConfig`] centralizes the per-process messaging settings: queue
//! depth for every task endpoint, the shutdown grace window, the timer budget
//! per task, and the queue-latency threshold used for congestion diagnostics.
//!
//! ## Sentinel values
//! - `queue_capacity` and `timer_capacity` are clamped to a minimum of 1.
//! - `latency_warn = 0` disables the congestion warning.

use std::time::Duration;

/// Global configuration for a [`MessagingRuntime`](crate::MessagingRuntime).
///
/// ## Field semantics
/// - `queue_capacity`: bounded depth of each task's message queue; a full
///   queue rejects sends with `QueueFull` (the sender keeps the envelope).
/// - `grace`: maximum wait for tasks to drain their terminate message during
///   shutdown before they are reported as stuck.
/// - `timer_capacity`: armed-timer budget per task registry; `start` on an
///   exhausted registry returns no handle.
/// - `latency_warn`: a dequeued envelope that waited longer than this in its
///   queue is reported once at warn level. Instrumentation only; the router
///   never applies backpressure itself.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Bounded depth of each per-task message queue.
    pub queue_capacity: usize,

    /// Maximum time to wait for tasks to exit after a terminate broadcast.
    pub grace: Duration,

    /// Maximum number of concurrently armed timers per task.
    pub timer_capacity: usize,

    /// Queue-wait threshold above which a congestion warning is logged.
    /// `Duration::ZERO` disables the warning.
    pub latency_warn: Duration,
}

impl RuntimeConfig {
    /// Queue capacity clamped to at least one slot.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Timer budget clamped to at least one entry.
    #[inline]
    pub fn timer_capacity_clamped(&self) -> usize {
        self.timer_capacity.max(1)
    }

    /// Congestion threshold as an `Option` (`None` when disabled).
    #[inline]
    pub fn latency_warn_threshold(&self) -> Option<Duration> {
        if self.latency_warn == Duration::ZERO {
            None
        } else {
            Some(self.latency_warn)
        }
    }
}

impl Default for RuntimeConfig {
    /// Default configuration:
    ///
    /// - `queue_capacity = 1024`
    /// - `grace = 5s`
    /// - `timer_capacity = 64`
    /// - `latency_warn = 100ms`
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            grace: Duration::from_secs(5),
            timer_capacity: 64,
            latency_warn: Duration::from_millis(100),
        }
    }
}

//! Error types used by the messaging runtime, task handlers, and the router.
//!
//! Three families:
//!
//! - [`RuntimeError`] — failures of the runtime itself (startup, shutdown).
//! - [`TaskError`] — failures surfaced by an individual task handler.
//! - [`SendError`] — routing failures; the undelivered [`Envelope`] is handed
//!   back to the caller, which decides whether to retry, drop, or convert the
//!   failure into a higher-level protocol message.
//!
//! All types provide `as_label()` returning a short stable snake_case string
//! for logs and metrics.

use std::time::Duration;

use thiserror::Error;

use crate::envelope::{Envelope, MessageKind};
use crate::tasks::TaskId;

/// Errors produced by the messaging runtime itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some tasks never drained their
    /// terminate message and had to be abandoned.
    #[error("shutdown grace {grace:?} exceeded; stuck tasks: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of tasks that did not exit in time.
        stuck: Vec<&'static str>,
    },

    /// A task id was spawned twice on the same runtime.
    #[error("task {task} is already registered")]
    AlreadyRegistered { task: TaskId },

    /// The task's event loop exited before signalling readiness
    /// (its `started` hook failed).
    #[error("task {task} failed to start")]
    StartFailed { task: TaskId },

    /// OS signal listener registration failed.
    #[error("signal handler registration failed: {source}")]
    Signal {
        #[from]
        source: std::io::Error,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::AlreadyRegistered { .. } => "task_already_registered",
            RuntimeError::StartFailed { .. } => "task_start_failed",
            RuntimeError::Signal { .. } => "signal_init_failed",
        }
    }
}

/// Errors surfaced by a task handler while processing one envelope.
///
/// `Fatal` takes down the whole process (there is no per-task fault isolation:
/// a task that cannot process its own messages leaves the gateway in an
/// undefined state). `Fail` is logged and the event loop moves on.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Non-recoverable error; the process aborts.
    #[error("fatal task error: {error}")]
    Fatal { error: String },

    /// Recoverable error scoped to one message; logged, processing continues.
    #[error("task failed: {error}")]
    Fail { error: String },
}

impl TaskError {
    /// Shorthand constructor for [`TaskError::Fatal`].
    pub fn fatal(error: impl Into<String>) -> Self {
        TaskError::Fatal {
            error: error.into(),
        }
    }

    /// Shorthand constructor for [`TaskError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Fail { .. } => "task_failed",
        }
    }

    /// True for errors that abort the process when they reach the event loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TaskError::Fatal { .. })
    }
}

/// Why an envelope could not be handed to its destination queue.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendErrorKind {
    /// No task with this id has been spawned on the runtime.
    #[error("unknown or unregistered task")]
    UnknownTask,
    /// The task is registered but has not yet signalled readiness.
    #[error("task has not signalled readiness")]
    NotReady,
    /// The destination queue is at capacity.
    #[error("task queue is full")]
    QueueFull,
    /// The task already processed its terminate message.
    #[error("task has terminated")]
    Terminated,
}

/// A routing failure carrying the undelivered envelope.
///
/// Delivery is fire-and-forget: on success the router gives no acknowledgment,
/// and on failure ownership of the envelope returns to the sender. There is no
/// automatic retry at this layer.
#[derive(Error, Debug)]
#[error("cannot deliver {} to {destination}: {kind}", .envelope.kind().name())]
pub struct SendError {
    /// Destination that was looked up.
    pub destination: TaskId,
    /// What went wrong.
    pub kind: SendErrorKind,
    /// The envelope, returned to the caller.
    pub envelope: Envelope,
}

impl SendError {
    pub(crate) fn new(destination: TaskId, kind: SendErrorKind, envelope: Envelope) -> Self {
        Self {
            destination,
            kind,
            envelope,
        }
    }

    /// Message kind of the undelivered envelope.
    pub fn message(&self) -> MessageKind {
        self.envelope.kind()
    }

    /// Recovers the envelope for retry or manual release.
    pub fn into_envelope(self) -> Envelope {
        self.envelope
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self.kind {
            SendErrorKind::UnknownTask => "send_unknown_task",
            SendErrorKind::NotReady => "send_not_ready",
            SendErrorKind::QueueFull => "send_queue_full",
            SendErrorKind::Terminated => "send_terminated",
        }
    }
}

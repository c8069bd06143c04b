//! # Lifecycle manager: task creation, readiness, terminate, shutdown.
//!
//! One [`MessagingRuntime`] owns the dispatch table and the set of spawned
//! event loops for a whole process (tests spin up as many isolated runtimes
//! as they need — there is no global state).
//!
//! ## Startup ordering
//! `spawn` installs the dispatch entry in `Starting` state, launches the
//! event loop, and then **awaits the loop's readiness handshake** before
//! flipping the entry to `Ready`. A producer therefore cannot race a
//! consumer's startup: until `spawn` returns, sends to that task are
//! rejected with `NotReady`, never delivered into an undefined state.
//!
//! ## Shutdown ordering
//! Terminate is an ordinary message routed through the normal path, so FIFO
//! guarantees every message enqueued before it is handled first — each task
//! drains, tears down, and exits. `shutdown` then joins every loop within the
//! configured grace and reports the stragglers.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::RuntimeConfig;
use crate::envelope::Envelope;
use crate::error::{RuntimeError, SendError};
use crate::runtime::{shutdown, EventLoop, Router, TaskContext};
use crate::tasks::{TaskHandler, TaskId};

struct TaskJoin {
    task: TaskId,
    join: JoinHandle<()>,
}

/// The process-wide messaging runtime.
///
/// Owns the [`Router`], creates tasks, sequences startup and shutdown.
pub struct MessagingRuntime {
    cfg: RuntimeConfig,
    router: Arc<Router>,
    hard_stop: CancellationToken,
    joins: Mutex<Vec<TaskJoin>>,
}

impl MessagingRuntime {
    /// Creates an empty runtime with the given configuration.
    pub fn new(cfg: RuntimeConfig) -> Self {
        Self {
            cfg,
            router: Arc::new(Router::new()),
            hard_stop: CancellationToken::new(),
            joins: Mutex::new(Vec::new()),
        }
    }

    /// The shared dispatch table.
    pub fn router(&self) -> Arc<Router> {
        Arc::clone(&self.router)
    }

    /// Routes an envelope; shorthand for `router().send(..)`.
    pub fn send(&self, destination: TaskId, envelope: Envelope) -> Result<(), SendError> {
        self.router.send(destination, envelope)
    }

    /// Creates a task: queue endpoint, timer registry, dedicated event loop.
    ///
    /// Returns once the task has signalled readiness; from that point the
    /// dispatch entry is visible and sends are accepted. Declared
    /// dependencies that are not registered yet are logged as a topology
    /// note, nothing more.
    pub async fn spawn(&self, handler: Box<dyn TaskHandler>) -> Result<(), RuntimeError> {
        let task = handler.task_id();

        for dep in handler.dependencies() {
            if !self.router.is_registered(*dep) {
                log::debug!("task {task}: declared peer {dep} is not registered yet");
            }
        }

        let (tx, rx) = mpsc::channel(self.cfg.queue_capacity_clamped());
        if self.router.register_starting(task, tx).is_err() {
            return Err(RuntimeError::AlreadyRegistered { task });
        }

        let (ready_tx, ready_rx) = oneshot::channel();
        let ctx = TaskContext::new(
            task,
            Arc::clone(&self.router),
            self.cfg.timer_capacity_clamped(),
            self.hard_stop.child_token(),
        );
        let event_loop = EventLoop::new(
            ctx,
            rx,
            handler,
            ready_tx,
            self.cfg.latency_warn_threshold(),
        );
        let join = tokio::spawn(event_loop.run());
        self.joins
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(TaskJoin { task, join });

        // Readiness handshake: the entry becomes routable only after the
        // event loop is live. A dropped channel means the started hook
        // failed and the loop already unregistered itself.
        if ready_rx.await.is_err() {
            return Err(RuntimeError::StartFailed { task });
        }
        self.router.mark_ready(task);
        log::debug!("task {task}: ready");
        Ok(())
    }

    /// Sends the reserved terminate message to every live task.
    ///
    /// Point-to-point, one envelope per destination; the broadcasting task
    /// itself is skipped (it exits by returning from its own handler).
    /// Thanks to per-queue FIFO each task drains everything enqueued before
    /// the terminate, then tears down.
    pub fn broadcast_terminate(&self, origin: TaskId) {
        for task in self.router.live_tasks() {
            if task == origin {
                continue;
            }
            if let Err(e) = self.router.send(task, Envelope::terminate(origin)) {
                log::warn!("terminate for {task} not deliverable: {}", e.as_label());
            }
        }
    }

    /// Joins every spawned task within the configured grace period.
    ///
    /// Tasks still running when the grace expires are hard-stopped via the
    /// cancellation token and reported in
    /// [`RuntimeError::GraceExceeded`].
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let joins: Vec<TaskJoin> = self
            .joins
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();

        let grace = self.cfg.grace;
        let deadline = Instant::now() + grace;
        let mut stuck: Vec<&'static str> = Vec::new();

        for tj in joins {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, tj.join).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    log::error!("task {}: event loop panicked: {join_err}", tj.task);
                }
                Err(_elapsed) => {
                    stuck.push(tj.task.name());
                }
            }
        }

        if !stuck.is_empty() {
            self.hard_stop.cancel();
            return Err(RuntimeError::GraceExceeded { grace, stuck });
        }
        Ok(())
    }

    /// Blocks until a termination signal arrives, then broadcasts terminate
    /// and joins everything within grace.
    ///
    /// `origin` is stamped on the terminate envelopes (the caller is usually
    /// the main thread, not a registered task).
    pub async fn run_until_signal(&self, origin: TaskId) -> Result<(), RuntimeError> {
        shutdown::wait_for_termination_signal().await?;
        log::info!("termination signal received; closing all tasks");
        self.broadcast_terminate(origin);
        self.shutdown().await
    }
}

impl Drop for MessagingRuntime {
    fn drop(&mut self) {
        self.hard_stop.cancel();
    }
}

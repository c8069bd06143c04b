//! # Per-task context and its exclusive event loop.
//!
//! Each spawned task owns one [`TaskContext`] and one [`EventLoop`]. The loop
//! is the only code path that dequeues from the task's queue, arms or disarms
//! its timers, and invokes its handler — so all task-local state is data-race
//! free without a single lock.
//!
//! ```text
//! loop {
//!   select! {
//!     envelope = queue.recv()        => dispatch(envelope)   // Terminate breaks
//!     _ = sleep_until(next deadline) => for each expired timer:
//!                                          dispatch(TimerExpired envelope)
//!     _ = hard_stop.cancelled()      => break                // grace exceeded
//!   }
//! }
//! terminated() hook → timers cleared → queue closed → entry marked Terminated
//! ```
//!
//! Timer expiries are synthesized into envelopes and pushed through the same
//! `dispatch` as real messages; the handler cannot tell them apart at the
//! call-site.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::envelope::{Envelope, MessageKind};
use crate::error::{SendError, TaskError};
use crate::runtime::Router;
use crate::tasks::{TaskHandler, TaskId};
use crate::timers::{Repeat, TimerId, TimerRegistry};

/// Handle to task-local facilities, passed to every handler invocation.
///
/// Owned by the event loop; handlers receive it as `&mut`, which is what
/// enforces the "only the owning task touches its timers" invariant.
pub struct TaskContext {
    task_id: TaskId,
    router: Arc<Router>,
    timers: TimerRegistry,
    hard_stop: CancellationToken,
}

impl TaskContext {
    pub(crate) fn new(
        task_id: TaskId,
        router: Arc<Router>,
        timer_capacity: usize,
        hard_stop: CancellationToken,
    ) -> Self {
        Self {
            task_id,
            router,
            timers: TimerRegistry::new(timer_capacity),
            hard_stop,
        }
    }

    /// Identity of the owning task.
    #[inline]
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Routes an envelope to another task. Fire-and-forget; see
    /// [`Router::send`].
    pub fn send(&self, destination: TaskId, envelope: Envelope) -> Result<(), SendError> {
        self.router.send(destination, envelope)
    }

    /// Shared router handle, for code that forwards sends elsewhere.
    pub fn router(&self) -> Arc<Router> {
        Arc::clone(&self.router)
    }

    /// Arms a timer on this task's registry.
    ///
    /// Expiry arrives as a `TimerExpired` envelope carrying `token` through
    /// the normal handler path. Returns `None` when the registry is full.
    pub fn start_timer(&mut self, delay: Duration, repeat: Repeat, token: u64) -> Option<TimerId> {
        self.timers.start(delay, repeat, token)
    }

    /// Disarms a timer. Idempotent.
    pub fn stop_timer(&mut self, id: TimerId) {
        self.timers.stop(id);
    }

    /// Whether the handle still refers to an armed timer.
    pub fn timer_is_armed(&self, id: TimerId) -> bool {
        self.timers.is_armed(id)
    }
}

enum Flow {
    Continue,
    Stop,
}

/// One task's event loop: queue endpoint, timer multiplexing, dispatch.
pub(crate) struct EventLoop {
    ctx: TaskContext,
    rx: mpsc::Receiver<Envelope>,
    handler: Box<dyn TaskHandler>,
    ready_tx: Option<oneshot::Sender<()>>,
    latency_warn: Option<Duration>,
}

impl EventLoop {
    pub(crate) fn new(
        ctx: TaskContext,
        rx: mpsc::Receiver<Envelope>,
        handler: Box<dyn TaskHandler>,
        ready_tx: oneshot::Sender<()>,
        latency_warn: Option<Duration>,
    ) -> Self {
        Self {
            ctx,
            rx,
            handler,
            ready_tx: Some(ready_tx),
            latency_warn,
        }
    }

    /// Runs until the terminate message is processed, the queue closes, or
    /// the runtime pulls the hard-stop token.
    pub(crate) async fn run(mut self) {
        let task = self.ctx.task_id;

        if let Err(e) = self.handler.started(&mut self.ctx).await {
            log::error!("task {task}: started hook failed: {e}");
            // ready_tx drops unused; the lifecycle manager observes the
            // closed channel and reports StartFailed.
            self.ctx.router.remove(task);
            return;
        }
        if let Some(tx) = self.ready_tx.take() {
            let _ = tx.send(());
        }

        let hard_stop = self.ctx.hard_stop.clone();
        loop {
            let deadline = self.ctx.timers.next_deadline();
            tokio::select! {
                maybe = self.rx.recv() => match maybe {
                    Some(envelope) => {
                        if matches!(self.dispatch(envelope).await, Flow::Stop) {
                            break;
                        }
                    }
                    None => break,
                },
                _ = sleep_until(deadline), if deadline.is_some() => {
                    self.fire_expired().await;
                }
                _ = hard_stop.cancelled() => {
                    log::warn!("task {task}: hard stop before terminate drained");
                    break;
                }
            }
        }

        // Self-destruct: task teardown, then timers, then the queue endpoint.
        self.handler.terminated(&mut self.ctx).await;
        self.ctx.timers.clear();
        self.rx.close();
        self.ctx.router.mark_terminated(task);
        log::debug!("task {task}: exited");
    }

    async fn dispatch(&mut self, mut envelope: Envelope) -> Flow {
        envelope.stamp_dequeued();
        self.observe_latency(&envelope);

        let stop = envelope.kind() == MessageKind::Terminate;
        if let Err(e) = self.handler.handle(&mut self.ctx, envelope).await {
            self.handler_failed(e);
        }
        if stop {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }

    async fn fire_expired(&mut self) {
        let task = self.ctx.task_id;
        for expiry in self.ctx.timers.collect_expired(Instant::now()) {
            let envelope = Envelope::timer_expired(task, expiry.id, expiry.token);
            if let Err(e) = self.handler.handle(&mut self.ctx, envelope).await {
                self.handler_failed(e);
            }
        }
    }

    /// Queue-wait instrumentation. Diagnostics only; shedding load on a
    /// congested link is the sending side's decision.
    fn observe_latency(&self, envelope: &Envelope) {
        let (Some(threshold), Some(latency)) = (self.latency_warn, envelope.queue_latency())
        else {
            return;
        };
        if latency >= threshold {
            log::warn!(
                "task {}: {} from {} waited {latency:?} in queue (threshold {threshold:?})",
                self.ctx.task_id,
                envelope.kind().name(),
                envelope.origin(),
            );
        }
    }

    fn handler_failed(&self, error: TaskError) {
        let task = self.ctx.task_id;
        if error.is_fatal() {
            // A task that cannot process its own messages leaves the
            // gateway in an undefined state.
            log::error!("task {task}: {error}; aborting process");
            std::process::abort();
        }
        log::error!("task {task}: {error}");
    }
}

/// Pends forever when no timer is armed.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(tokio::time::Instant::from_std(d)).await,
        None => futures::future::pending().await,
    }
}

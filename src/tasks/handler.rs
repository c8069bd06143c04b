//! # The handler seam between a task and its event loop.
//!
//! A task implements [`TaskHandler`]; the runtime gives it a dedicated
//! [`TaskContext`] and drives every delivery — real messages and synthesized
//! timer expiries alike — through the single [`handle`](TaskHandler::handle)
//! method. The handler never learns whether a given envelope came from
//! another task's `send` or from its own timer registry.
//!
//! Handlers are expected to return quickly: long-running protocol work is
//! modelled as several messages, never as one blocking call. A handler must
//! not wait on another task from inside `handle`.

use async_trait::async_trait;

use crate::envelope::Envelope;
use crate::error::TaskError;
use crate::runtime::TaskContext;
use crate::tasks::TaskId;

/// One task's message-processing logic.
///
/// The event loop owns the handler exclusively, so `&mut self` access to all
/// handler state is data-race free without locks.
#[async_trait]
pub trait TaskHandler: Send + 'static {
    /// The identity this handler answers for.
    fn task_id(&self) -> TaskId;

    /// Tasks this handler expects to exchange messages with.
    ///
    /// Used for topology validation and logging at spawn time only; nothing
    /// is enforced at the type level.
    fn dependencies(&self) -> &'static [TaskId] {
        &[]
    }

    /// Runs once on the event-loop task before readiness is signalled.
    ///
    /// The usual place to arm initial timers. An error here prevents the task
    /// from ever becoming visible to senders.
    async fn started(&mut self, _ctx: &mut TaskContext) -> Result<(), TaskError> {
        Ok(())
    }

    /// Processes one envelope, consuming it.
    ///
    /// Exactly one call path releases any buffer the envelope carries: moving
    /// the payload out (or dropping the envelope) is that release. Returning
    /// [`TaskError::Fatal`] aborts the process; [`TaskError::Fail`] is logged
    /// and the loop continues with the next message.
    async fn handle(&mut self, ctx: &mut TaskContext, envelope: Envelope) -> Result<(), TaskError>;

    /// Teardown hook, invoked after the terminate message was processed and
    /// before the queue endpoint closes.
    async fn terminated(&mut self, _ctx: &mut TaskContext) {}
}

//! # Process-wide dispatch table.
//!
//! The [`Router`] maps a destination [`TaskId`] to that task's live queue
//! endpoint. Entries are written once per task during startup and read by
//! every sender afterwards, so the table sits behind a plain read-write lock.
//!
//! ## Readiness
//! An entry moves through three states:
//! ```text
//! (absent) ──register──► Starting ──mark_ready──► Ready ──mark_terminated──► Terminated
//! ```
//! Sends are accepted only in `Ready`; everything else is an explicit error
//! with the envelope handed back — a message is never silently dropped and
//! never delivered to a task in an undefined state.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::mpsc;

use crate::envelope::Envelope;
use crate::error::{SendError, SendErrorKind};
use crate::tasks::TaskId;

/// Lifecycle state of one dispatch-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    /// Queue exists, event loop not yet ready; sends are rejected.
    Starting,
    /// Event loop is live; sends are accepted.
    Ready,
    /// Terminate was processed; sends are rejected forever.
    Terminated,
}

#[derive(Debug)]
struct Slot {
    sender: mpsc::Sender<Envelope>,
    state: SlotState,
}

/// The dispatch table shared by every task and the lifecycle manager.
///
/// `send` is synchronous and fire-and-forget: it enqueues and returns without
/// waiting for delivery or processing. FIFO holds per destination queue, so
/// for a fixed (origin, destination) pair messages arrive in send order.
#[derive(Debug, Default)]
pub struct Router {
    table: RwLock<HashMap<TaskId, Slot>>,
}

impl Router {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Routes one envelope to its destination queue.
    ///
    /// On failure the envelope comes back inside the error; retry policy
    /// belongs to the caller (e.g. SCTP converts a failed request into an
    /// explicit negative lower-layer confirmation).
    pub fn send(&self, destination: TaskId, mut envelope: Envelope) -> Result<(), SendError> {
        let table = self.table.read().unwrap_or_else(|e| e.into_inner());
        let slot = match table.get(&destination) {
            Some(slot) => slot,
            None => {
                log::debug!(
                    "route {} -> {destination}: unknown task",
                    envelope.kind().name()
                );
                return Err(SendError::new(
                    destination,
                    SendErrorKind::UnknownTask,
                    envelope,
                ));
            }
        };
        match slot.state {
            SlotState::Starting => {
                return Err(SendError::new(
                    destination,
                    SendErrorKind::NotReady,
                    envelope,
                ));
            }
            SlotState::Terminated => {
                log::debug!(
                    "route {} -> {destination}: destination terminated",
                    envelope.kind().name()
                );
                return Err(SendError::new(
                    destination,
                    SendErrorKind::Terminated,
                    envelope,
                ));
            }
            SlotState::Ready => {}
        }

        envelope.stamp_sent(destination);
        match slot.sender.try_send(envelope) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(env)) => {
                log::warn!("route {} -> {destination}: queue full", env.kind().name());
                Err(SendError::new(destination, SendErrorKind::QueueFull, env))
            }
            Err(mpsc::error::TrySendError::Closed(env)) => Err(SendError::new(
                destination,
                SendErrorKind::Terminated,
                env,
            )),
        }
    }

    /// Tasks currently accepting messages, in id order.
    pub fn live_tasks(&self) -> Vec<TaskId> {
        let table = self.table.read().unwrap_or_else(|e| e.into_inner());
        let mut live: Vec<TaskId> = table
            .iter()
            .filter(|(_, slot)| slot.state == SlotState::Ready)
            .map(|(id, _)| *id)
            .collect();
        live.sort_unstable();
        live
    }

    /// Whether the task has an entry in any state.
    pub fn is_registered(&self, task: TaskId) -> bool {
        self.table
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&task)
    }

    /// Installs a `Starting` entry. Fails if the id is already present.
    pub(crate) fn register_starting(
        &self,
        task: TaskId,
        sender: mpsc::Sender<Envelope>,
    ) -> Result<(), ()> {
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        if table.contains_key(&task) {
            return Err(());
        }
        table.insert(
            task,
            Slot {
                sender,
                state: SlotState::Starting,
            },
        );
        Ok(())
    }

    /// Flips a `Starting` entry to `Ready`, making it visible to senders.
    pub(crate) fn mark_ready(&self, task: TaskId) {
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = table.get_mut(&task) {
            slot.state = SlotState::Ready;
        }
    }

    /// Marks a task terminated. The entry stays so later senders get a
    /// `Terminated` rejection instead of `UnknownTask`.
    pub(crate) fn mark_terminated(&self, task: TaskId) {
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = table.get_mut(&task) {
            slot.state = SlotState::Terminated;
        }
    }

    /// Drops a `Starting` entry whose event loop never became ready.
    pub(crate) fn remove(&self, task: TaskId) {
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        table.remove(&task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_to_unknown_task_is_rejected_with_envelope() {
        let router = Router::new();
        let err = router
            .send(TaskId::Sctp, Envelope::terminate(TaskId::Test1))
            .unwrap_err();
        assert_eq!(err.kind, SendErrorKind::UnknownTask);
        let env = err.into_envelope();
        assert_eq!(env.origin(), TaskId::Test1);
    }

    #[test]
    fn send_before_ready_is_rejected_not_dropped() {
        let router = Router::new();
        let (tx, mut rx) = mpsc::channel(4);
        router.register_starting(TaskId::Test2, tx).unwrap();

        let err = router
            .send(TaskId::Test2, Envelope::terminate(TaskId::Test1))
            .unwrap_err();
        assert_eq!(err.kind, SendErrorKind::NotReady);
        assert!(rx.try_recv().is_err(), "nothing may reach the queue early");

        router.mark_ready(TaskId::Test2);
        router
            .send(TaskId::Test2, Envelope::terminate(TaskId::Test1))
            .unwrap();
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn full_queue_returns_ownership() {
        let router = Router::new();
        let (tx, _rx) = mpsc::channel(1);
        router.register_starting(TaskId::Test2, tx).unwrap();
        router.mark_ready(TaskId::Test2);

        router
            .send(TaskId::Test2, Envelope::terminate(TaskId::Test1))
            .unwrap();
        let err = router
            .send(TaskId::Test2, Envelope::terminate(TaskId::Test1))
            .unwrap_err();
        assert_eq!(err.kind, SendErrorKind::QueueFull);
    }

    #[test]
    fn terminated_entry_outlives_the_task() {
        let router = Router::new();
        let (tx, rx) = mpsc::channel(1);
        router.register_starting(TaskId::Test2, tx).unwrap();
        router.mark_ready(TaskId::Test2);
        drop(rx);
        router.mark_terminated(TaskId::Test2);

        let err = router
            .send(TaskId::Test2, Envelope::terminate(TaskId::Test1))
            .unwrap_err();
        assert_eq!(err.kind, SendErrorKind::Terminated);
        assert!(router.live_tasks().is_empty());
    }
}

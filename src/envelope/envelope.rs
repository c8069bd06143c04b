//! Routing header plus payload. See the module docs for the ownership rules.

use std::time::{Duration, Instant};

use crate::envelope::payload::{MessageKind, Payload, Terminate, TimerExpired};
use crate::tasks::TaskId;
use crate::timers::TimerId;

/// The routed, typed unit of communication between tasks.
///
/// Construction moves the payload (and any buffers it carries) into the
/// envelope; consumption moves it back out. The header records origin,
/// destination, an optional correlation id for cross-task log correlation,
/// and queue timing for congestion diagnostics.
#[derive(Debug)]
pub struct Envelope {
    origin: TaskId,
    destination: Option<TaskId>,
    correlation_id: Option<u64>,
    sent_at: Option<Instant>,
    queue_latency: Option<Duration>,
    payload: Payload,
}

impl Envelope {
    /// Creates an envelope owned by the constructing task.
    pub fn new(origin: TaskId, payload: Payload) -> Self {
        Self {
            origin,
            destination: None,
            correlation_id: None,
            sent_at: None,
            queue_latency: None,
            payload,
        }
    }

    /// Shorthand for the reserved terminate message.
    pub fn terminate(origin: TaskId) -> Self {
        Self::new(origin, Payload::Terminate(Terminate))
    }

    /// Builds the synthetic expiry delivered by a task's own timer registry.
    ///
    /// Origin and destination are both the owning task; there is no cross-task
    /// timer delivery.
    pub(crate) fn timer_expired(owner: TaskId, timer_id: TimerId, token: u64) -> Self {
        let mut env = Self::new(owner, Payload::TimerExpired(TimerExpired { timer_id, token }));
        env.destination = Some(owner);
        env
    }

    /// Attaches a subscriber/session correlation id carried through logs.
    pub fn with_correlation(mut self, id: u64) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Message kind tag of the payload.
    #[inline]
    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    /// Task that constructed the envelope.
    #[inline]
    pub fn origin(&self) -> TaskId {
        self.origin
    }

    /// Destination, set by the router at send time.
    #[inline]
    pub fn destination(&self) -> Option<TaskId> {
        self.destination
    }

    /// Cross-task correlation id, if any.
    #[inline]
    pub fn correlation_id(&self) -> Option<u64> {
        self.correlation_id
    }

    /// Time spent in the destination queue, recorded at dequeue.
    ///
    /// `None` for synthesized timer expiries and before delivery.
    #[inline]
    pub fn queue_latency(&self) -> Option<Duration> {
        self.queue_latency
    }

    /// Borrows the payload.
    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Consumes the envelope, moving the payload (and any owned buffers) out.
    #[inline]
    pub fn into_payload(self) -> Payload {
        self.payload
    }

    /// Stamps the routing header at enqueue time.
    pub(crate) fn stamp_sent(&mut self, destination: TaskId) {
        self.destination = Some(destination);
        self.sent_at = Some(Instant::now());
    }

    /// Records queue latency at dequeue time.
    pub(crate) fn stamp_dequeued(&mut self) {
        if let Some(sent_at) = self.sent_at {
            self.queue_latency = Some(sent_at.elapsed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_defaults_and_builder() {
        let env = Envelope::terminate(TaskId::MmeApp).with_correlation(0x00010203);
        assert_eq!(env.kind(), MessageKind::Terminate);
        assert_eq!(env.origin(), TaskId::MmeApp);
        assert_eq!(env.destination(), None);
        assert_eq!(env.correlation_id(), Some(0x00010203));
        assert_eq!(env.queue_latency(), None);
    }

    #[test]
    fn timer_expiry_targets_owner() {
        let env = Envelope::timer_expired(TaskId::Sctp, TimerId::from_raw(7), 42);
        assert_eq!(env.origin(), TaskId::Sctp);
        assert_eq!(env.destination(), Some(TaskId::Sctp));
        match env.into_payload() {
            Payload::TimerExpired(t) => {
                assert_eq!(t.token, 42);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}

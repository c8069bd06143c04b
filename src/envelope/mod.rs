//! # The routed, typed unit of communication between tasks.
//!
//! An [`Envelope`] is a routing header plus exactly one [`Payload`] variant
//! from a closed set generated by `define_messages!`. Dispatch on the payload
//! is a plain `match`, so adding a message kind without handling (or without a
//! release path for its buffers) is a compile error, never a silent leak.
//!
//! ## Lifecycle
//! ```text
//! Envelope::new(origin, payload)      construction; buffers move in
//!        │
//!   router.send(dest, env)            header stamped, enqueued, FIFO per queue
//!        │
//!   event loop dequeues               queue latency recorded
//!        │
//!   handler.handle(ctx, env)          payload moved out by exactly one owner
//!        │
//!      drop                           remaining buffers released
//! ```
//!
//! At every instant the envelope has exactly one owner: the constructing task,
//! the destination queue, or the consuming task.

mod payload;

#[allow(clippy::module_inception)]
mod envelope;

pub use envelope::Envelope;
pub use payload::{
    HealthPing, LatencyProbe, MessageKind, Payload, SctpData, SctpLowerLayerConf, Terminate,
    TimerExpired,
};

//! # Per-task timer registry.
//!
//! Each task owns exactly one [`TimerRegistry`]; timers are armed, disarmed,
//! and fired only from that task's own event loop, which eliminates cross-task
//! timer races by construction. An expired timer is delivered as a
//! `TimerExpired` envelope through the normal dispatch path, so handler code
//! never distinguishes a timer from a real message.
//!
//! ## Timer state machine
//! ```text
//! Inactive ──start──► Armed ──fire──► Armed      (Repeat::Forever / Times>1)
//!                       │    └─fire─► Inactive   (Repeat::Once / last shot)
//!                       └──stop─────► Inactive   (idempotent)
//! ```

mod registry;

pub use registry::{Repeat, TimerId, TimerRegistry};

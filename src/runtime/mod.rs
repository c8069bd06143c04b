//! # Runtime core: routing, per-task event loops, and lifecycle.
//!
//! The only public entry points from this module are [`MessagingRuntime`],
//! [`Router`], and [`TaskContext`].
//!
//! Internal modules:
//! - [`router`]: the process-wide dispatch table from task id to queue endpoint;
//! - [`context`]: the per-task context and its exclusive event loop;
//! - [`runtime`]: task creation, readiness handshake, terminate broadcast,
//!   shutdown with grace;
//! - [`shutdown`]: OS termination-signal handling.

mod context;
mod router;
mod shutdown;

#[allow(clippy::module_inception)]
mod runtime;

pub use context::TaskContext;
pub use router::Router;
pub use runtime::MessagingRuntime;

pub(crate) use context::EventLoop;

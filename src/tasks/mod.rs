//! # Task identity and handler seam.
//!
//! This module provides the task-facing types:
//! - [`TaskId`] — the dense, build-time enumeration of every protocol/service
//!   task in the process (one queue, one timer registry, one event loop each);
//! - [`TaskHandler`] — the async trait a task implements to receive envelopes.
//!
//! Task ids are generated from a single `define_tasks!` list so the id space
//! stays dense and stable for the process lifetime.

mod handler;
mod id;

pub use handler::TaskHandler;
pub use id::TaskId;

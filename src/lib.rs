//! # ittibus
//!
//! **ittibus** is the inter-task messaging core of an LTE/5G gateway:
//! typed message passing between long-lived protocol tasks, per-task timers,
//! lifecycle management, and the gateway's logging pipeline.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ TaskHandler  │   │ TaskHandler  │   │ TaskHandler  │
//!     │   (S1AP)     │   │   (SCTP)     │   │  (MME app)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  MessagingRuntime (lifecycle manager)                             │
//! │  - Router (dispatch table: TaskId ─► queue endpoint + state)      │
//! │  - readiness handshake (Starting ─► Ready before first delivery)  │
//! │  - terminate broadcast + bounded-grace join                       │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  EventLoop   │   │  EventLoop   │   │  EventLoop   │
//!     │ queue+timers │   │ queue+timers │   │ queue+timers │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │                  │                  │
//!      │ Envelope         │ Envelope         │ Envelope
//!      │ - Terminate      │ - SctpDataInd    │ - TimerExpired
//!      │ - LatencyProbe   │ - SctpDataReq    │ - ...
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │            Router::send (bounded MPSC queue per task)             │
//! │      rejects: UnknownTask / NotReady / QueueFull / Terminated     │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! TaskHandler ──► MessagingRuntime::spawn ──► Router entry (Starting)
//!                                              │
//!                          started() hook ◄────┘
//!                              │ ok                  │ err
//!                              ▼                     ▼
//!                       readiness signal      entry removed,
//!                       entry ─► Ready        spawn ─► StartFailed
//!                              │
//!                              ▼
//! loop {
//!   select! {
//!     envelope from queue ──► handle(ctx, envelope)
//!     │     Terminate ──► break (queue already drained ahead of it)
//!     earliest timer deadline ──► synthesize TimerExpired ──► handle
//!     hard-stop token ──► break (grace exceeded)
//!   }
//! }
//!
//! On exit: terminated() hook, timers cleared, queue closed,
//!          entry ─► Terminated (later sends rejected, never dropped)
//! ```
//!
//! ## Features
//! | Area           | Description                                                  | Key types / traits                       |
//! |----------------|--------------------------------------------------------------|------------------------------------------|
//! | **Messaging**  | Typed envelopes over bounded per-task queues, FIFO per link. | [`Envelope`], [`Payload`], [`Router`]    |
//! | **Tasks**      | Closed task-id space; async handler trait per task.          | [`TaskId`], [`TaskHandler`]              |
//! | **Lifecycle**  | Spawn with readiness handshake, terminate broadcast, grace.  | [`MessagingRuntime`]                     |
//! | **Timers**     | Per-task registries; expiries arrive as ordinary messages.   | [`TimerId`], [`Repeat`], [`TaskContext`] |
//! | **Errors**     | Typed errors; rejected sends return the envelope.            | [`SendError`], [`TaskError`]             |
//! | **Logging**    | Sync or staged-async pipeline over console/file/syslog/TCP.  | [`Logger`], [`LogConfig`], [`LogTask`]   |
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use ittibus::{
//!     Envelope, LatencyProbe, MessagingRuntime, Payload, RuntimeConfig, TaskContext,
//!     TaskError, TaskHandler, TaskId,
//! };
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl TaskHandler for Echo {
//!     fn task_id(&self) -> TaskId {
//!         TaskId::Test2
//!     }
//!
//!     async fn handle(
//!         &mut self,
//!         _ctx: &mut TaskContext,
//!         envelope: Envelope,
//!     ) -> Result<(), TaskError> {
//!         println!("{} from {}", envelope.kind().name(), envelope.origin());
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rt = MessagingRuntime::new(RuntimeConfig::default());
//!     rt.spawn(Box::new(Echo)).await?;
//!
//!     rt.send(
//!         TaskId::Test2,
//!         Envelope::new(TaskId::Test1, Payload::LatencyProbe(LatencyProbe::default())),
//!     )?;
//!
//!     rt.broadcast_terminate(TaskId::Test1);
//!     rt.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod envelope;
mod error;
mod logging;
mod runtime;
mod tasks;
mod timers;

// ---- Public re-exports ----

pub use config::RuntimeConfig;
pub use envelope::{
    Envelope, HealthPing, LatencyProbe, MessageKind, Payload, SctpData, SctpLowerLayerConf,
    Terminate, TimerExpired,
};
pub use error::{RuntimeError, SendError, SendErrorKind, TaskError};
pub use logging::{LogConfig, LogConfigError, LogLevel, LogOutput, LogTask, Logger, Subsystem};
pub use runtime::{MessagingRuntime, Router, TaskContext};
pub use tasks::{TaskHandler, TaskId};
pub use timers::{Repeat, TimerId};

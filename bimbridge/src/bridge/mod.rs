//! Action Dispatch Bridge
//!
//! This module is the core of the crate: it carries requests from many
//! concurrent gateway tasks onto the single task that owns the host
//! document, and carries each result back to exactly one waiting caller.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Gateway tasks (many)                     │
//! │   enqueue(executable) -> DispatchHandle, then signal()       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────┐                         │
//! │  │  JobQueue    │   │ WakeupSignal │  (coalesced notify)     │
//! │  │  FIFO, FIFO  │   └──────┬───────┘                         │
//! │  └──────┬───────┘          │                                 │
//! ├─────────┼──────────────────┼────────────────────────────────┤
//! │         ▼                  ▼                                 │
//! │                   ExecutionLoop (one task)                   │
//! │   owns the Document; drains the queue; one transaction per   │
//! │   job; resolves each handle exactly once                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Core Concepts
//!
//! - **Job**: one parsed request - an [`Executable`] plus the channels
//!   that carry its status and result back to the caller.
//!
//! - **DispatchHandle**: the caller's side of a job. Awaitable once,
//!   with a bounded timeout; also exposes a status probe for observers.
//!
//! - **WakeupSignal**: idempotent, coalescible "work is pending" signal.
//!   Many signals before the loop wakes cause one drain, never zero.
//!
//! - **ExecutionLoop**: the single consumer. Strictly sequential - no
//!   two executables ever interleave - so a slow action delays everyone
//!   behind it. That is the accepted cost of a host with one thread.
//!
//! [`Executable`]: crate::registry::Executable

mod handle;
mod job;
mod queue;
mod runner;
mod wakeup;

pub use handle::{DispatchHandle, JobProbe};
pub use job::{Job, JobId, JobStatus};
pub use queue::JobQueue;
pub use runner::ExecutionLoop;
pub use wakeup::WakeupSignal;

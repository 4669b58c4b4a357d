//! BIMBridge - JSON action dispatch for a single-threaded BIM host
//!
//! This library automates a stateful design-application document from
//! concurrent external callers. The host document can only be mutated
//! safely from one logical thread, so every inbound request is turned
//! into a job, queued, and executed by a single consumer that owns the
//! live document.
//!
//! # High-Level API
//!
//! ```ignore
//! use bimbridge::actions::build_registry;
//! use bimbridge::bridge::{ExecutionLoop, JobQueue, WakeupSignal};
//! use bimbridge::host::Document;
//! use bimbridge::server::{build_router, AppState};
//!
//! let registry = Arc::new(build_registry()?);
//! let queue = Arc::new(JobQueue::new());
//! let signal = Arc::new(WakeupSignal::new());
//!
//! let runner = ExecutionLoop::new(Document::new(), queue.clone(), signal.clone());
//! tokio::spawn(runner.run(shutdown_token));
//!
//! let app = build_router(AppState::new(registry, queue, signal, settings));
//! axum::serve(listener, app).await?;
//! ```

pub mod actions;
pub mod bridge;
pub mod config;
pub mod envelope;
pub mod error;
pub mod host;
pub mod logging;
pub mod registry;
pub mod server;

/// Version of the BIMBridge library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

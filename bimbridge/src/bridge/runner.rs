//! Single-consumer execution loop.
//!
//! The loop plays the role of the host application's own thread: it is
//! the only place the live [`Document`] is ever touched. It blocks on
//! the coalesced wakeup signal, drains the job queue FIFO, and runs each
//! executable inside one transaction so a failing action leaves no
//! partial mutation.

use super::job::Job;
use super::queue::JobQueue;
use super::wakeup::WakeupSignal;
use crate::error::ExecutionError;
use crate::host::Document;
use crate::registry::ActionResult;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// The single consumer that owns the host document.
///
/// Strictly sequential: no two executables ever interleave, and a slow
/// action delays every job queued behind it. That is the documented
/// fairness trade-off of driving a single-threaded host - not something
/// to patch around with parallel execution.
pub struct ExecutionLoop {
    document: Document,
    queue: Arc<JobQueue>,
    signal: Arc<WakeupSignal>,
}

impl ExecutionLoop {
    /// Creates a loop owning `document`, fed by `queue` and `signal`.
    pub fn new(document: Document, queue: Arc<JobQueue>, signal: Arc<WakeupSignal>) -> Self {
        Self {
            document,
            queue,
            signal,
        }
    }

    /// Runs until shutdown is signalled.
    ///
    /// On shutdown every still-queued job is explicitly failed so no
    /// caller awaits forever.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Execution loop started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    self.fail_pending();
                    break;
                }

                _ = self.signal.notified() => {
                    self.drain_and_run_all();
                }
            }
        }

        info!("Execution loop stopped");
    }

    /// Drains the queue, running every pending job in FIFO order.
    ///
    /// Each job is isolated: one failure never aborts the jobs queued
    /// behind it.
    pub fn drain_and_run_all(&mut self) {
        while let Some(job) = self.queue.pop() {
            self.run_job(job);
        }
    }

    /// Runs one job inside a transaction and resolves its handle.
    fn run_job(&mut self, mut job: Job) {
        job.mark_running();

        let Some(executable) = job.take_executable() else {
            // Cannot happen for jobs built by the queue; guard anyway so
            // the resolver is still fulfilled exactly once.
            error!(job_id = %job.id(), "Job had no executable");
            job.resolve(Err(ExecutionError::new("internal: job had no executable")));
            return;
        };

        let action = job.action().to_string();
        debug!(job_id = %job.id(), action = %action, "Job running");
        let start = Instant::now();

        let result = self.execute_guarded(&action, executable);

        match &result {
            Ok(_) => debug!(
                job_id = %job.id(),
                action = %action,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Job succeeded"
            ),
            Err(e) => warn!(
                job_id = %job.id(),
                action = %action,
                error = %e,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Job failed"
            ),
        }

        job.resolve(result);
    }

    /// Runs the executable inside a transaction, with a panic guard.
    ///
    /// Handlers report failures through their `Result`; the catch-all
    /// exists for handlers that fail unexpectedly, so one bad action
    /// cannot take the loop (and every queued caller) down with it.
    fn execute_guarded(
        &mut self,
        action: &str,
        executable: crate::registry::Executable,
    ) -> ActionResult {
        let document = &mut self.document;
        match catch_unwind(AssertUnwindSafe(|| {
            document.transaction(action, executable)
        })) {
            Ok(result) => result,
            Err(panic) => Err(ExecutionError::new(format!(
                "Action '{}' panicked: {}",
                action,
                panic_message(&panic)
            ))),
        }
    }

    /// Fails every still-queued job during shutdown.
    fn fail_pending(&mut self) {
        let mut failed = 0usize;
        while let Some(mut job) = self.queue.pop() {
            job.resolve(Err(ExecutionError::new("bridge is shutting down")));
            failed += 1;
        }
        if failed > 0 {
            warn!(jobs = failed, "Failed pending jobs on shutdown");
        }
    }

    /// Returns a read-only reference to the document (test support).
    #[cfg(test)]
    pub(crate) fn document(&self) -> &Document {
        &self.document
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

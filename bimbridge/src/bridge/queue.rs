//! Thread-safe FIFO queue of pending jobs.

use super::handle::DispatchHandle;
use super::job::{Job, JobId, JobStatus};
use crate::registry::Executable;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::{oneshot, watch};
use tracing::trace;

/// FIFO queue shared between gateway tasks and the execution loop.
///
/// Ordering is strict FIFO with no priorities: requests arriving in
/// sequence from one caller run in that sequence, which matters for
/// order-dependent action chains (create, then modify the created
/// element). Enqueue never blocks beyond the queue mutex, which is only
/// ever held for a push or a pop.
#[derive(Debug, Default)]
pub struct JobQueue {
    pending: Mutex<VecDeque<Job>>,
}

impl JobQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues an executable under its action name and returns the
    /// handle that will resolve when the execution loop runs it.
    ///
    /// Safe to call from any task or thread.
    pub fn enqueue(&self, action: &str, executable: Executable) -> DispatchHandle {
        let id = JobId::next();
        let (status_tx, status_rx) = watch::channel(JobStatus::Queued);
        let (result_tx, result_rx) = oneshot::channel();

        let job = Job::new(id, action.to_string(), executable, status_tx, result_tx);
        let handle = DispatchHandle::new(id, action.to_string(), status_rx, result_rx);

        let mut pending = self.pending.lock().expect("job queue mutex poisoned");
        pending.push_back(job);
        trace!(job_id = %id, action = %action, depth = pending.len(), "Job enqueued");

        handle
    }

    /// Pops the oldest pending job. Called only by the execution loop.
    pub(crate) fn pop(&self) -> Option<Job> {
        self.pending
            .lock()
            .expect("job queue mutex poisoned")
            .pop_front()
    }

    /// Returns the number of pending jobs.
    pub fn len(&self) -> usize {
        self.pending.lock().expect("job queue mutex poisoned").len()
    }

    /// Returns true if no jobs are pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

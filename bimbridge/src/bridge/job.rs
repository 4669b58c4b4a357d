//! Job type and lifecycle states.

use crate::registry::{ActionResult, Executable};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{oneshot, watch};
use tracing::warn;

/// Global counter for generating unique job IDs.
static JOB_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Opaque token identifying one dispatched job.
#[derive(Clone, Copy, Hash, Eq, PartialEq)]
pub struct JobId(u64);

impl JobId {
    /// Creates the next unique job ID.
    pub fn next() -> Self {
        Self(JOB_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobId({})", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Job execution status as seen from the execution loop.
///
/// `Running` is entered only on the execution-loop task, and exactly one
/// terminal state follows it. `TimedOut` is special: the loop never sets
/// it. It is the *caller's* view after an expired wait - the job itself
/// keeps running and still reaches `Succeeded` or `Failed` host-side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JobStatus {
    /// Enqueued, not yet picked up by the execution loop.
    #[default]
    Queued,

    /// Currently executing on the execution-loop task.
    Running,

    /// The executable returned a result; the transaction committed.
    Succeeded,

    /// The executable failed or the bridge shut down; any transaction
    /// was rolled back.
    Failed,

    /// The caller stopped waiting. Outcome unknown from the caller's
    /// perspective; the job may still succeed or fail later.
    TimedOut,
}

impl JobStatus {
    /// Returns true for Succeeded, Failed, and TimedOut.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::TimedOut)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "Queued"),
            Self::Running => write!(f, "Running"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
            Self::TimedOut => write!(f, "TimedOut"),
        }
    }
}

/// One pending unit of host work: an executable plus the channels that
/// report its status and deliver its result.
pub struct Job {
    pub(crate) id: JobId,
    pub(crate) action: String,
    executable: Option<Executable>,
    status_tx: watch::Sender<JobStatus>,
    resolver: Option<oneshot::Sender<ActionResult>>,
}

impl Job {
    pub(crate) fn new(
        id: JobId,
        action: String,
        executable: Executable,
        status_tx: watch::Sender<JobStatus>,
        resolver: oneshot::Sender<ActionResult>,
    ) -> Self {
        Self {
            id,
            action,
            executable: Some(executable),
            status_tx,
            resolver: Some(resolver),
        }
    }

    /// Returns the job's identifier.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Returns the action name this job dispatches to.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Marks the job Running. Called only from the execution loop.
    pub(crate) fn mark_running(&self) {
        let _ = self.status_tx.send(JobStatus::Running);
    }

    /// Takes the executable. Returns `None` on a second call, which
    /// enforces the run-at-most-once invariant.
    pub(crate) fn take_executable(&mut self) -> Option<Executable> {
        self.executable.take()
    }

    /// Fulfills the job exactly once with its terminal result.
    ///
    /// A second call is a no-op (the resolver is gone), and a caller
    /// that already abandoned its handle is tolerated: the send error
    /// is ignored because the status watch still records the outcome.
    pub(crate) fn resolve(&mut self, result: ActionResult) {
        let status = if result.is_ok() {
            JobStatus::Succeeded
        } else {
            JobStatus::Failed
        };
        match self.resolver.take() {
            Some(tx) => {
                let _ = self.status_tx.send(status);
                let _ = tx.send(result);
            }
            None => {
                warn!(job_id = %self.id, action = %self.action, "Job resolved twice; ignoring");
            }
        }
    }

    /// Returns true if the job has already been resolved.
    pub(crate) fn is_resolved(&self) -> bool {
        self.resolver.is_none()
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("action", &self.action)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

//! Caller-side handle for an enqueued job.
//!
//! A [`DispatchHandle`] is returned at enqueue time and is the only way
//! the enqueuing caller learns the job's outcome. It is awaitable by at
//! most one caller (awaiting consumes it); independent observers use a
//! [`JobProbe`] taken before the await.

use super::job::{JobId, JobStatus};
use crate::error::DispatchError;
use crate::registry::ActionResult;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::{oneshot, watch};

/// The future/promise correlation object for one dispatched job.
pub struct DispatchHandle {
    job_id: JobId,
    action: String,
    status_rx: watch::Receiver<JobStatus>,
    result_rx: oneshot::Receiver<ActionResult>,
}

impl DispatchHandle {
    pub(crate) fn new(
        job_id: JobId,
        action: String,
        status_rx: watch::Receiver<JobStatus>,
        result_rx: oneshot::Receiver<ActionResult>,
    ) -> Self {
        Self {
            job_id,
            action,
            status_rx,
            result_rx,
        }
    }

    /// Returns the job's identifier.
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Returns the action name this job dispatches to.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns an independent status observer for this job.
    ///
    /// The probe reports the execution loop's view of the job, which
    /// outlives a gateway-side timeout: a job whose caller gave up still
    /// transitions to `Succeeded` or `Failed` here.
    pub fn probe(&self) -> JobProbe {
        JobProbe {
            job_id: self.job_id,
            status_rx: self.status_rx.clone(),
        }
    }

    /// Waits for the job's result, bounded by `timeout`.
    ///
    /// On timeout the job is NOT cancelled - the host has no preemption
    /// primitive - so it may still run and mutate the document after
    /// this returns `Err(Timeout)`. The error is the caller's view only;
    /// use [`DispatchHandle::probe`] beforehand to observe the true
    /// outcome later.
    pub async fn await_result(self, timeout: Duration) -> Result<Value, DispatchError> {
        match tokio::time::timeout(timeout, self.result_rx).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(exec_err))) => Err(DispatchError::Execution(exec_err)),
            // Resolver dropped without sending: the loop shut down
            // before this job was resolved.
            Ok(Err(_closed)) => Err(DispatchError::Shutdown),
            Err(_elapsed) => Err(DispatchError::Timeout),
        }
    }
}

impl std::fmt::Debug for DispatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchHandle")
            .field("job_id", &self.job_id)
            .field("action", &self.action)
            .field("status", &*self.status_rx.borrow())
            .finish()
    }
}

/// Read-only observer of one job's loop-side status.
///
/// Cloneable; any number of probes may watch the same job.
#[derive(Clone)]
pub struct JobProbe {
    job_id: JobId,
    status_rx: watch::Receiver<JobStatus>,
}

impl JobProbe {
    /// Returns the job's identifier.
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Returns the most recent status without waiting.
    pub fn status(&self) -> JobStatus {
        *self.status_rx.borrow()
    }

    /// Waits until the job reaches a terminal state and returns it.
    ///
    /// Returns the last observed status if the loop drops the status
    /// channel first (which only happens with a terminal state set).
    pub async fn wait_terminal(&mut self) -> JobStatus {
        loop {
            let current = *self.status_rx.borrow();
            if current.is_terminal() {
                return current;
            }
            if self.status_rx.changed().await.is_err() {
                return *self.status_rx.borrow();
            }
        }
    }
}

impl std::fmt::Debug for JobProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobProbe")
            .field("job_id", &self.job_id)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutionError;
    use serde_json::json;

    fn handle_pair() -> (
        DispatchHandle,
        watch::Sender<JobStatus>,
        oneshot::Sender<ActionResult>,
    ) {
        let (status_tx, status_rx) = watch::channel(JobStatus::Queued);
        let (result_tx, result_rx) = oneshot::channel();
        let handle = DispatchHandle::new(JobId::next(), "echo".to_string(), status_rx, result_rx);
        (handle, status_tx, result_tx)
    }

    #[tokio::test]
    async fn test_await_result_success() {
        let (handle, _status_tx, result_tx) = handle_pair();
        result_tx.send(Ok(json!({"x": 1}))).unwrap();

        let value = handle.await_result(Duration::from_secs(1)).await.unwrap();
        assert_eq!(value, json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_await_result_execution_error() {
        let (handle, _status_tx, result_tx) = handle_pair();
        result_tx.send(Err(ExecutionError::new("boom"))).unwrap();

        let err = handle.await_result(Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_await_result_timeout() {
        let (handle, _status_tx, _result_tx) = handle_pair();

        let err = handle
            .await_result(Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::Timeout);
    }

    #[tokio::test]
    async fn test_await_result_shutdown_when_resolver_dropped() {
        let (handle, _status_tx, result_tx) = handle_pair();
        drop(result_tx);

        let err = handle.await_result(Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(err, DispatchError::Shutdown);
    }

    #[tokio::test]
    async fn test_probe_survives_timeout() {
        let (handle, status_tx, _result_tx) = handle_pair();
        let mut probe = handle.probe();

        let err = handle
            .await_result(Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::Timeout);

        // The loop finishes the job after the caller gave up.
        status_tx.send(JobStatus::Running).unwrap();
        status_tx.send(JobStatus::Succeeded).unwrap();
        assert_eq!(probe.wait_terminal().await, JobStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_probe_wait_terminal_on_channel_close() {
        let (handle, status_tx, _result_tx) = handle_pair();
        let mut probe = handle.probe();

        status_tx.send(JobStatus::Failed).unwrap();
        drop(status_tx);
        assert_eq!(probe.wait_terminal().await, JobStatus::Failed);
    }
}

//! Error taxonomy for the dispatch bridge.
//!
//! Three caller-visible failure classes exist:
//! - [`ValidationError`]: the request was bad (unknown action, malformed
//!   envelope, arguments rejected by the factory). No job was created and
//!   the host was never touched, so the caller can fix the input and retry.
//! - [`ExecutionError`]: the host rejected or failed the operation. The
//!   enclosing transaction was rolled back, so no partial mutation remains.
//! - Timeout: the gateway stopped waiting. The job may still complete
//!   later host-side; the outcome is unknown to the caller.
//!
//! All of them are caught at the gateway boundary and converted to the
//! uniform response envelope; nothing escapes as an unhandled fault.

use thiserror::Error;

/// Errors raised before a job is ever enqueued.
///
/// These are the caller's fault: the envelope, action name, or arguments
/// were rejected without touching the host document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The request body was not a valid dispatch envelope.
    #[error("Invalid dispatch envelope: {0}. Expecting {{ action, args }}.")]
    InvalidEnvelope(String),

    /// No action with this name is registered.
    ///
    /// `suggestions` holds near-miss action names when any were found.
    #[error("{}", unknown_action_message(.name, .suggestions))]
    UnknownAction {
        name: String,
        suggestions: Vec<String>,
    },

    /// The action's factory rejected the arguments.
    #[error("Invalid args for {action}: {reason}")]
    BadArguments { action: String, reason: String },
}

impl ValidationError {
    /// Builds an unknown-action error without suggestions.
    pub fn unknown_action(name: impl Into<String>) -> Self {
        Self::UnknownAction {
            name: name.into(),
            suggestions: Vec::new(),
        }
    }

    /// Builds a bad-arguments error for the named action.
    pub fn bad_arguments(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BadArguments {
            action: action.into(),
            reason: reason.into(),
        }
    }
}

fn unknown_action_message(name: &str, suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        format!("Unknown action '{}'.", name)
    } else {
        format!(
            "Unknown action '{}'. Did you mean: {}?",
            name,
            suggestions.join(", ")
        )
    }
}

/// A host-side failure while running an executable.
///
/// The message is reported to the caller verbatim, matching the wire
/// protocol convention of the source system (no structured error codes).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ExecutionError {
    message: String,
}

impl ExecutionError {
    /// Creates an execution error with the given caller-visible message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the caller-visible message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for ExecutionError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ExecutionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<crate::host::HostError> for ExecutionError {
    fn from(e: crate::host::HostError) -> Self {
        Self::new(e.to_string())
    }
}

/// The complete outcome taxonomy observed at the dispatch gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// Request rejected before a job was created.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The host failed the operation; the transaction was rolled back.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// The gateway stopped waiting for the job.
    ///
    /// The job is NOT cancelled: the host has no safe preemption
    /// primitive, so it may still run and mutate the document later.
    /// Callers must treat this as "unknown outcome" - safe to re-query,
    /// not safe to blindly retry a creating action.
    #[error("timeout")]
    Timeout,

    /// The bridge shut down before the job was resolved.
    #[error("bridge is shutting down")]
    Shutdown,
}

impl DispatchError {
    /// Returns true for failures that never created a job.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

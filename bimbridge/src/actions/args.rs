//! Shared argument parsing for action factories.

use crate::error::ValidationError;
use crate::host::ElementId;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserializes `args` into the action's typed argument struct.
///
/// Any serde failure (missing field, wrong type, unknown shape) becomes
/// a [`ValidationError::BadArguments`] naming the action, so the caller
/// sees what to fix before a job is ever created.
pub(crate) fn parse<T: DeserializeOwned>(action: &str, args: &Value) -> Result<T, ValidationError> {
    serde_json::from_value(args.clone())
        .map_err(|e| ValidationError::bad_arguments(action, e.to_string()))
}

/// Rejects an empty or whitespace-only string argument.
pub(crate) fn require_non_empty(
    action: &str,
    field: &str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::bad_arguments(
            action,
            format!("{field} must not be empty"),
        ));
    }
    Ok(())
}

/// Rejects a non-positive numeric argument.
pub(crate) fn require_positive(
    action: &str,
    field: &str,
    value: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::bad_arguments(
            action,
            format!("{field} must be positive"),
        ));
    }
    Ok(())
}

/// Converts a raw wire id into an [`ElementId`].
pub(crate) fn element_id(raw: u64) -> ElementId {
    ElementId::from(raw)
}

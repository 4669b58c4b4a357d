//! Request/response envelope for the dispatch protocol.
//!
//! Every response, success or failure, uses the same JSON shape:
//! `{ok: bool, message: string, data: any|null}`. Callers branch on
//! `ok`, never on HTTP status alone, because host-level failures are
//! reported as `200` with `ok:false` while malformed requests use
//! non-2xx status codes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound dispatch request: `{action, args}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchRequest {
    /// Registered action name, dot-namespaced (e.g. `wall.create`).
    pub action: String,

    /// Arguments passed to the action's factory, as given by the caller.
    /// Missing or `null` args are treated as an empty object.
    #[serde(default)]
    pub args: Value,
}

impl DispatchRequest {
    /// Returns the args with `null` normalized to an empty object,
    /// matching the source protocol (`args ?? {}`).
    pub fn args_or_empty(&self) -> Value {
        if self.args.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            self.args.clone()
        }
    }
}

/// Outbound response envelope: `{ok, message, data}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispatchResponse {
    /// Whether the request succeeded.
    pub ok: bool,

    /// Human-readable outcome. `"ok"` on success, the error message
    /// otherwise (`"timeout"` for an expired gateway wait).
    pub message: String,

    /// Action result on success, `null` otherwise.
    pub data: Value,
}

impl DispatchResponse {
    /// Builds a success envelope carrying the action's result.
    pub fn success(data: Value) -> Self {
        Self {
            ok: true,
            message: "ok".to_string(),
            data,
        }
    }

    /// Builds a failure envelope with the given message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            data: Value::Null,
        }
    }
}

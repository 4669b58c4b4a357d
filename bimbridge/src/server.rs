//! HTTP dispatch gateway.
//!
//! The only component that talks to the network. Routes:
//!
//! - `POST /dispatch` (and `/mcp`, the name the source protocol used) -
//!   decode the envelope, look up the action, build the executable,
//!   enqueue + signal, await the result with a bounded timeout.
//! - `GET /actions` - registered action names, for callers that build
//!   request payloads dynamically.
//! - `GET /health` - liveness only; bypasses the queue entirely.
//!
//! Response status convention: malformed requests (bad envelope,
//! unknown action, rejected arguments) are `400`; host-side failures
//! and timeouts are `200` with `ok:false`. Callers branch on `ok`,
//! never on HTTP status alone.

use crate::bridge::{JobQueue, WakeupSignal};
use crate::config::Settings;
use crate::envelope::{DispatchRequest, DispatchResponse};
use crate::error::{DispatchError, ValidationError};
use crate::registry::ActionRegistry;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<ActionRegistry>,
    queue: Arc<JobQueue>,
    signal: Arc<WakeupSignal>,
    settings: Arc<Settings>,
}

impl AppState {
    /// Bundles the registry, queue, wakeup signal, and settings.
    pub fn new(
        registry: Arc<ActionRegistry>,
        queue: Arc<JobQueue>,
        signal: Arc<WakeupSignal>,
        settings: Settings,
    ) -> Self {
        Self {
            registry,
            queue,
            signal,
            settings: Arc::new(settings),
        }
    }
}

/// Builds the gateway router.
///
/// CORS is permissive (any origin, `GET`/`POST`/`OPTIONS`), matching
/// the loopback-only default bind: browser frontends talk to the
/// bridge directly, and the bearer key still gates actual dispatches.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/dispatch", post(dispatch))
        .route("/mcp", post(dispatch))
        .route("/actions", get(list_actions))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

async fn dispatch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<DispatchResponse>) {
    if !authorized(state.settings.api_key.as_deref(), &headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(DispatchResponse::failure("Unauthorized")),
        );
    }

    let request = match serde_json::from_str::<DispatchRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "Rejected malformed envelope");
            return error_response(ValidationError::InvalidEnvelope(e.to_string()).into());
        }
    };

    let start = Instant::now();
    match run_dispatch(&state, &request).await {
        Ok(data) => {
            info!(
                action = %request.action,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Dispatch succeeded"
            );
            (StatusCode::OK, Json(DispatchResponse::success(data)))
        }
        Err(err) => {
            warn!(
                action = %request.action,
                error = %err,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Dispatch failed"
            );
            error_response(err)
        }
    }
}

/// Runs one dispatch end to end: lookup, parse, enqueue, signal, await.
///
/// Validation failures return before any job exists; the queue is never
/// touched for a request the registry or the factory rejects.
async fn run_dispatch(state: &AppState, request: &DispatchRequest) -> Result<Value, DispatchError> {
    let factory = state.registry.lookup(&request.action)?;
    let executable = factory(&request.args_or_empty())?;

    let handle = state.queue.enqueue(&request.action, executable);
    state.signal.signal();

    handle.await_result(state.settings.dispatch_timeout).await
}

async fn list_actions(State(state): State<AppState>) -> Json<DispatchResponse> {
    Json(DispatchResponse::success(
        json!({"actions": state.registry.names()}),
    ))
}

async fn health() -> Json<DispatchResponse> {
    Json(DispatchResponse::success(json!({
        "bridge": "/dispatch",
        "version": crate::VERSION,
    })))
}

fn authorized(api_key: Option<&str>, headers: &HeaderMap) -> bool {
    let Some(expected) = api_key else {
        return true;
    };
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        == Some(expected)
}

fn error_response(err: DispatchError) -> (StatusCode, Json<DispatchResponse>) {
    let status = match &err {
        DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
        DispatchError::Shutdown => StatusCode::SERVICE_UNAVAILABLE,
        // Host-level failure or timeout: 200 with ok:false, by protocol
        // convention.
        DispatchError::Execution(_) | DispatchError::Timeout => StatusCode::OK,
    };
    (status, Json(DispatchResponse::failure(err.to_string())))
}

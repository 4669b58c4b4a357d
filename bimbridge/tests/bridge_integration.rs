//! Integration tests for the dispatch bridge.
//!
//! These tests exercise the full path a request takes inside the
//! process: registry lookup, factory validation, enqueue + wakeup,
//! execution-loop drain, and handle resolution. The HTTP gateway is
//! covered separately in `server_integration.rs`.
//!
//! Run with: `cargo test --test bridge_integration`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use bimbridge::bridge::{DispatchHandle, ExecutionLoop, JobQueue, JobStatus, WakeupSignal};
use bimbridge::error::{DispatchError, ExecutionError, ValidationError};
use bimbridge::host::Document;
use bimbridge::registry::{ActionRegistry, Executable, RegistryBuilder};

// ============================================================================
// Test Helpers
// ============================================================================

struct TestBridge {
    registry: ActionRegistry,
    queue: Arc<JobQueue>,
    signal: Arc<WakeupSignal>,
    shutdown: CancellationToken,
    loop_task: tokio::task::JoinHandle<()>,
}

impl TestBridge {
    /// Starts an execution loop over an empty document and a registry of
    /// small synthetic actions.
    fn start(registry: ActionRegistry) -> Self {
        let queue = Arc::new(JobQueue::new());
        let signal = Arc::new(WakeupSignal::new());
        let shutdown = CancellationToken::new();
        let runner = ExecutionLoop::new(Document::new(), queue.clone(), signal.clone());
        let loop_task = tokio::spawn(runner.run(shutdown.clone()));
        Self {
            registry,
            queue,
            signal,
            shutdown,
            loop_task,
        }
    }

    /// Validates and enqueues one request, mirroring what the gateway
    /// does per dispatch.
    fn submit(&self, action: &str, args: Value) -> Result<DispatchHandle, ValidationError> {
        let factory = self.registry.lookup(action)?;
        let executable = factory(&args)?;
        let handle = self.queue.enqueue(action, executable);
        self.signal.signal();
        Ok(handle)
    }

    async fn stop(self) {
        self.shutdown.cancel();
        self.loop_task.await.expect("execution loop task panicked");
    }
}

/// Registry with `echo`, `fail`, and `sleep` actions.
fn synthetic_registry() -> ActionRegistry {
    let mut builder = RegistryBuilder::new();
    builder
        .register("echo", |args: &Value| {
            let payload = args.clone();
            Ok(Box::new(move |_doc: &mut Document| Ok(payload)) as Executable)
        })
        .unwrap();
    builder
        .register("fail", |args: &Value| {
            let message = args
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("boom")
                .to_string();
            Ok(Box::new(move |_doc: &mut Document| {
                Err(ExecutionError::new(message))
            }) as Executable)
        })
        .unwrap();
    builder
        .register("sleep", |args: &Value| {
            let millis = args.get("millis").and_then(Value::as_u64).unwrap_or(50);
            Ok(Box::new(move |_doc: &mut Document| {
                std::thread::sleep(Duration::from_millis(millis));
                Ok(json!({"slept_ms": millis}))
            }) as Executable)
        })
        .unwrap();
    builder.build()
}

// ============================================================================
// Round-trip and error isolation
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_echo_round_trip() {
    let bridge = TestBridge::start(synthetic_registry());

    let handle = bridge.submit("echo", json!({"x": 1, "y": "two"})).unwrap();
    let value = handle.await_result(Duration::from_secs(2)).await.unwrap();
    assert_eq!(value, json!({"x": 1, "y": "two"}));

    bridge.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_action_never_enqueues() {
    let bridge = TestBridge::start(synthetic_registry());

    let err = bridge.submit("doesNotExist", json!({})).unwrap_err();
    assert_eq!(err.to_string(), "Unknown action 'doesNotExist'.");
    assert_eq!(bridge.queue.len(), 0);

    bridge.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_job_does_not_poison_later_dispatches() {
    let bridge = TestBridge::start(synthetic_registry());

    let failing = bridge.submit("fail", json!({"message": "boom"})).unwrap();
    let err = failing.await_result(Duration::from_secs(2)).await.unwrap_err();
    assert_eq!(err.to_string(), "boom");

    // The loop must still be alive and serving.
    let echo = bridge.submit("echo", json!({"after": true})).unwrap();
    let value = echo.await_result(Duration::from_secs(2)).await.unwrap();
    assert_eq!(value, json!({"after": true}));

    bridge.stop().await;
}

// ============================================================================
// Timeout independence
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_caller_timeout_does_not_cancel_job() {
    let bridge = TestBridge::start(synthetic_registry());

    let handle = bridge.submit("sleep", json!({"millis": 300})).unwrap();
    let mut probe = handle.probe();

    // The caller gives up long before the job finishes.
    let err = handle
        .await_result(Duration::from_millis(100))
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::Timeout);

    // The job keeps running on the loop and completes normally.
    let terminal = tokio::time::timeout(Duration::from_secs(2), probe.wait_terminal())
        .await
        .expect("job never reached a terminal state");
    assert_eq!(terminal, JobStatus::Succeeded);

    bridge.stop().await;
}

// ============================================================================
// Concurrency: correlation and ordering
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dispatches_resolve_with_their_own_results() {
    let bridge = Arc::new(TestBridge::start(synthetic_registry()));

    let mut tasks = Vec::new();
    for i in 0..100u64 {
        let bridge = bridge.clone();
        tasks.push(tokio::spawn(async move {
            let handle = bridge.submit("echo", json!({"seq": i})).unwrap();
            let value = handle.await_result(Duration::from_secs(5)).await.unwrap();
            assert_eq!(value, json!({"seq": i}), "result crossed between callers");
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    Arc::try_unwrap(bridge).ok().unwrap().stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_jobs_run_in_enqueue_order() {
    let mut builder = RegistryBuilder::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    let order_in_action = order.clone();
    builder
        .register("record", move |args: &Value| {
            let seq = args.get("seq").and_then(Value::as_u64).unwrap_or(0);
            let order = order_in_action.clone();
            Ok(Box::new(move |_doc: &mut Document| {
                order.lock().unwrap().push(seq);
                Ok(json!(seq))
            }) as Executable)
        })
        .unwrap();
    let bridge = TestBridge::start(builder.build());

    // Enqueue a burst from one task, then await all. The loop must run
    // them strictly FIFO even when the wakeup signals coalesced.
    let handles: Vec<_> = (0..20u64)
        .map(|i| bridge.submit("record", json!({"seq": i})).unwrap())
        .collect();
    for handle in handles {
        handle.await_result(Duration::from_secs(2)).await.unwrap();
    }

    let observed = order.lock().unwrap().clone();
    assert_eq!(observed, (0..20u64).collect::<Vec<_>>());

    bridge.stop().await;
}

// ============================================================================
// Validation happens before anything touches the loop
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_factory_rejection_runs_nothing() {
    let executions = Arc::new(AtomicUsize::new(0));
    let executions_in_action = executions.clone();

    let mut builder = RegistryBuilder::new();
    builder
        .register("strict", move |args: &Value| {
            if args.get("required").is_none() {
                return Err(ValidationError::BadArguments {
                    action: "strict".to_string(),
                    reason: "missing field 'required'".to_string(),
                });
            }
            let executions = executions_in_action.clone();
            Ok(Box::new(move |_doc: &mut Document| {
                executions.fetch_add(1, Ordering::SeqCst);
                Ok(json!(null))
            }) as Executable)
        })
        .unwrap();
    let bridge = TestBridge::start(builder.build());

    let err = bridge.submit("strict", json!({})).unwrap_err();
    assert!(matches!(err, ValidationError::BadArguments { .. }));
    assert_eq!(bridge.queue.len(), 0);
    assert_eq!(executions.load(Ordering::SeqCst), 0);

    // A valid request still goes through.
    let handle = bridge.submit("strict", json!({"required": 1})).unwrap();
    handle.await_result(Duration::from_secs(2)).await.unwrap();
    assert_eq!(executions.load(Ordering::SeqCst), 1);

    bridge.stop().await;
}

// ============================================================================
// Document effects through the real action set
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_model_actions_mutate_one_shared_document() {
    let bridge = TestBridge::start(bimbridge::actions::build_registry().unwrap());

    let level = bridge
        .submit("level.create", json!({"name": "Level 1", "elevation": 0.0}))
        .unwrap();
    level.await_result(Duration::from_secs(2)).await.unwrap();

    let wall = bridge
        .submit(
            "wall.create",
            json!({
                "level": "Level 1",
                "start": [0.0, 0.0],
                "end": [4.0, 0.0],
                "height": 3.0,
            }),
        )
        .unwrap();
    let created = wall.await_result(Duration::from_secs(2)).await.unwrap();
    let element_id = created["elementId"].as_u64().expect("elementId in result");

    let info = bridge
        .submit("element.info", json!({"elementId": element_id}))
        .unwrap();
    let details = info.await_result(Duration::from_secs(2)).await.unwrap();
    assert_eq!(details["category"], json!("Walls"));
    assert_eq!(details["level"], json!("Level 1"));

    // The wrapper action pins its category and sees the same document.
    let count = bridge.submit("qto.walls.count", json!({})).unwrap();
    let counted = count.await_result(Duration::from_secs(2)).await.unwrap();
    assert_eq!(counted["count"], json!(1));

    bridge.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_action_leaves_no_partial_state() {
    let bridge = TestBridge::start(bimbridge::actions::build_registry().unwrap());

    // No such level: wall.create validates fine (shape is legal) but
    // fails host-side, so the document must stay empty.
    let wall = bridge
        .submit(
            "wall.create",
            json!({
                "level": "Nowhere",
                "start": [0.0, 0.0],
                "end": [4.0, 0.0],
                "height": 3.0,
            }),
        )
        .unwrap();
    let err = wall.await_result(Duration::from_secs(2)).await.unwrap_err();
    assert!(err.to_string().contains("Nowhere"));

    let info = bridge.submit("doc.info", json!({})).unwrap();
    let details = info.await_result(Duration::from_secs(2)).await.unwrap();
    assert_eq!(details["elements"], json!(0));

    bridge.stop().await;
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_resolves_stranded_handles() {
    let bridge = TestBridge::start(synthetic_registry());

    // Enqueue without waking the loop, then shut down: the handle must
    // resolve with an explicit failure, never hang.
    let factory = bridge.registry.lookup("echo").unwrap();
    let executable = factory(&json!({})).unwrap();
    let stranded = bridge.queue.enqueue("echo", executable);
    let probe = stranded.probe();

    bridge.shutdown.cancel();

    let err = stranded
        .await_result(Duration::from_secs(2))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "bridge is shutting down");
    assert_eq!(probe.status(), JobStatus::Failed);

    bridge.loop_task.await.unwrap();
}

//! BIMBridge CLI - runs the dispatch server.
//!
//! Builds the action registry, starts the execution loop that owns the
//! document, and serves the HTTP gateway until Ctrl-C.

use clap::Parser;
use std::process;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use bimbridge::actions::build_registry;
use bimbridge::bridge::{ExecutionLoop, JobQueue, WakeupSignal};
use bimbridge::config::Settings;
use bimbridge::host::Document;
use bimbridge::logging::{default_log_dir, default_log_file, init_logging};
use bimbridge::server::{build_router, AppState};

#[derive(Parser)]
#[command(name = "bimbridge")]
#[command(about = "JSON action dispatch server for a single-threaded BIM host", long_about = None)]
#[command(version = bimbridge::VERSION)]
struct Args {
    /// Listen address (overrides BIMBRIDGE_ADDR)
    #[arg(long)]
    addr: Option<String>,

    /// Static bearer key required on every request (overrides BIMBRIDGE_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Gateway-side dispatch timeout in seconds (overrides BIMBRIDGE_DISPATCH_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Start with a small demo document instead of an empty one
    #[arg(long)]
    seed_demo: bool,

    /// Directory for log files
    #[arg(long, default_value_t = default_log_dir().to_string())]
    log_dir: String,
}

fn settings_from(args: &Args) -> Settings {
    let mut settings = Settings::from_env();
    if let Some(addr) = &args.addr {
        match addr.parse() {
            Ok(addr) => settings.bind_addr = addr,
            Err(e) => {
                eprintln!("Invalid --addr '{addr}': {e}");
                process::exit(2);
            }
        }
    }
    if let Some(key) = &args.api_key {
        settings.api_key = Some(key.clone());
    }
    if let Some(secs) = args.timeout_secs {
        if secs == 0 {
            eprintln!("--timeout-secs must be positive");
            process::exit(2);
        }
        settings.dispatch_timeout = std::time::Duration::from_secs(secs);
    }
    settings
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _guard = match init_logging(&args.log_dir, default_log_file()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    let settings = settings_from(&args);

    let registry = match build_registry() {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!("Failed to build action registry: {e}");
            process::exit(1);
        }
    };
    info!(actions = registry.len(), "Action registry built");

    let document = if args.seed_demo {
        Document::sample()
    } else {
        Document::new()
    };

    let queue = Arc::new(JobQueue::new());
    let signal = Arc::new(WakeupSignal::new());
    let shutdown = CancellationToken::new();

    let runner = ExecutionLoop::new(document, queue.clone(), signal.clone());
    let loop_task = tokio::spawn(runner.run(shutdown.clone()));

    let state = AppState::new(registry, queue, signal, settings.clone());
    let app = build_router(state);

    let listener = match tokio::net::TcpListener::bind(settings.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %settings.bind_addr, "Failed to bind: {e}");
            process::exit(1);
        }
    };
    info!(addr = %settings.bind_addr, "BIMBridge listening");

    // Ctrl-C stops accepting requests; the execution loop is cancelled
    // once the server has drained, so in-flight dispatches still resolve.
    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutting down");
    });

    if let Err(e) = server.await {
        error!("Server error: {e}");
    }

    shutdown.cancel();
    if let Err(e) = loop_task.await {
        error!("Execution loop task failed: {e}");
    }
}

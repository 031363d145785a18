//! Axum API server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vstory_api::{create_router, metrics, ApiConfig, AppState, DispatchMode};
use vstory_worker::{JobExecutor, ProcessingContext, WorkerConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vstory=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting vstory-api");

    // Load configuration
    let config = ApiConfig::from_env();
    info!(
        "API config: host={}, port={}, dispatch_mode={}",
        config.host, config.port, config.dispatch_mode
    );

    // Create application state
    let state = match AppState::new(config.clone()).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create application state: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize metrics
    let metrics_enabled = std::env::var("METRICS_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(true);

    let metrics_handle = if metrics_enabled {
        info!("Prometheus metrics enabled at /metrics");
        Some(metrics::init_metrics())
    } else {
        None
    };

    // Queued mode runs the worker pool in-process; it shares the job store
    // with the HTTP handlers.
    let executor = if config.dispatch_mode == DispatchMode::Queued {
        let queue = state
            .queue
            .clone()
            .expect("Queue is always configured in queued mode");
        let ctx = ProcessingContext {
            store: Arc::clone(&state.store),
            gemini: Arc::clone(&state.gemini),
        };
        let executor = Arc::new(JobExecutor::new(WorkerConfig::from_env(), queue, ctx));
        let runner = Arc::clone(&executor);
        let handle = tokio::spawn(async move {
            if let Err(e) = runner.run().await {
                error!("Job executor exited with error: {}", e);
            }
        });
        Some((executor, handle))
    } else {
        None
    };

    // Create router
    let app = create_router(state, metrics_handle);

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid bind address");

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Signal the executor and wait for it to drain in-flight generation
    // tasks; the run loop bounds the wait with its shutdown timeout.
    if let Some((executor, handle)) = executor {
        executor.shutdown();
        if let Err(e) = handle.await {
            error!("Job executor task panicked: {}", e);
        }
    }

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Received shutdown signal");
}

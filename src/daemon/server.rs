//! The daemon's HTTP surface and run loop.
//!
//! One listener serves health, metrics exposition, log ingestion, and the
//! per-integration callback routes. Ingestion handlers hand the entry to
//! the synchronous logger on the blocking pool, so local durability never
//! stalls the accept loop.

use crate::config::{ConfigHandle, ConfigManager};
use crate::entry::LogEntry;
use crate::level::Level;
use crate::logger::Logger;
use crate::metrics::{exposition_response, MetricsStore};
use crate::notify::NotifierManager;
use axum::extract::{DefaultBodyLimit, Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tower_http::map_request_body::MapRequestBodyLayer;
use tower_http::timeout::{TimeoutBody, TimeoutLayer};

/// Callback payloads larger than this are rejected before parsing.
const MAX_BODY_BYTES: usize = 1024 * 1024;
/// Config file poll cadence for the hot-reload watcher.
const CONFIG_POLL: Duration = Duration::from_secs(2);
/// Cadence of the background rotation check.
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct AppState {
    logger: Arc<Logger>,
    config: ConfigHandle,
    metrics: Arc<MetricsStore>,
    started: Instant,
}

/// Runs the daemon in the foreground until a termination signal: claims the
/// pid file, builds the logger stack, and serves HTTP with the config
/// watcher and rotation housekeeping alongside.
///
/// # Errors
/// Pid file acquisition, listener bind, and runtime failures; also
/// `ShutdownTimeout` when in-flight requests outlive the grace period.
pub fn run(manager: ConfigManager) -> Result<(), crate::Error> {
    let started = Instant::now();
    let handle = manager.handle();
    let config = handle.current();

    let pid_file = super::PidFile::acquire(crate::config::pid_path(&config), config.port)?;

    let notifiers = Arc::new(NotifierManager::new());
    notifiers.update_from_config(&config);
    let metrics = Arc::new(MetricsStore::open_default());
    metrics.enable_inline();
    let logger = Arc::new(Logger::new(
        handle.clone(),
        Arc::clone(&notifiers),
        Arc::clone(&metrics),
    ));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(serve(manager, handle, notifiers, metrics, logger, started));

    // Dropped after the runtime is done so a still-running starter cannot
    // race the lock.
    drop(pid_file);
    result
}

async fn serve(
    manager: ConfigManager,
    handle: ConfigHandle,
    notifiers: Arc<NotifierManager>,
    metrics: Arc<MetricsStore>,
    logger: Arc<Logger>,
    started: Instant,
) -> Result<(), crate::Error> {
    let config = handle.current();
    let listener = tokio::net::TcpListener::bind(config.address()).await?;
    tracing::info!(address = %config.address(), "daemon listening");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(signal_task(shutdown_tx));
    tokio::spawn(manager.watch(Arc::clone(&notifiers), CONFIG_POLL));
    tokio::spawn(housekeeping(handle.clone(), shutdown_rx.clone()));

    let app = router(logger, handle, metrics, started);

    let mut drain_rx = shutdown_rx.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = drain_rx.changed().await;
            })
            .await
    });

    let mut signal_rx = shutdown_rx;
    let _ = signal_rx.changed().await;
    tracing::info!("shutting down, draining in-flight requests");

    // Graceful shutdown closes idle keep-alive connections right away, so
    // idleTimeout is what bounds the drain of the remaining in-flight work.
    let drain = Duration::from_secs(config.idle_timeout);
    match tokio::time::timeout(drain, server).await {
        Ok(Ok(Ok(()))) => Ok(()),
        Ok(Ok(Err(e))) => Err(e.into()),
        Ok(Err(join)) => Err(crate::Error::Signal(format!("server task failed: {join}"))),
        Err(_) => Err(crate::Error::ShutdownTimeout),
    }
}

/// Builds the daemon's router. Request timeouts come from the config
/// snapshot taken here; like the listener address, they are fixed for the
/// lifetime of the server and a reload does not move them.
#[must_use]
pub fn router(
    logger: Arc<Logger>,
    config: ConfigHandle,
    metrics: Arc<MetricsStore>,
    started: Instant,
) -> Router {
    let snapshot = config.current();
    let read_timeout = Duration::from_secs(snapshot.read_timeout);
    let write_timeout = Duration::from_secs(snapshot.write_timeout);
    let state = AppState {
        logger,
        config,
        metrics,
        started,
    };
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_route))
        .route("/log", post(ingest))
        .route("/:integration/health", get(integration_health))
        .route("/:integration/metrics", get(integration_metrics))
        .route("/:integration/receive", post(integration_receive))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        // Request bodies must arrive within readTimeout; handlers must
        // produce a response within writeTimeout.
        .layer(MapRequestBodyLayer::new(move |body| {
            axum::body::Body::new(TimeoutBody::new(read_timeout, body))
        }))
        .layer(TimeoutLayer::new(write_timeout))
        .layer(middleware::from_fn(trace_requests))
        .with_state(state)
}

#[cfg(unix)]
async fn signal_task(shutdown: watch::Sender<bool>) {
    use tokio::signal::unix::{signal, SignalKind};
    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "cannot install SIGTERM handler");
            return;
        }
    };
    tokio::select! {
        _ = term.recv() => {}
        _ = tokio::signal::ctrl_c() => {}
    }
    let _ = shutdown.send(true);
}

#[cfg(not(unix))]
async fn signal_task(shutdown: watch::Sender<bool>) {
    let _ = tokio::signal::ctrl_c().await;
    let _ = shutdown.send(true);
}

/// Periodic rotation check against the current config snapshot.
async fn housekeeping(config: ConfigHandle, mut shutdown: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => return,
            () = tokio::time::sleep(HOUSEKEEPING_INTERVAL) => {}
        }
        let snapshot = config.current();
        let checked = tokio::task::spawn_blocking(move || {
            crate::rotate::check_log_size(&snapshot)
        })
        .await;
        match checked {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "rotation housekeeping failed"),
            Err(e) => tracing::warn!(error = %e, "rotation housekeeping task failed"),
        }
    }
}

async fn trace_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;
    tracing::debug!(%method, path, status = %response.status(), "request");
    response
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, health_body(state.started.elapsed()))
}

/// Plain-text liveness report with the time since the daemon came up.
fn health_body(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    let rendered = if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    };
    format!("OK\nUptime: {rendered}")
}

async fn metrics_route(State(state): State<AppState>) -> impl IntoResponse {
    exposition_response(&state.metrics)
}

/// Wire form of an ingested entry. Everything beyond the message is
/// optional; provenance fields are filled in server-side.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct IncomingEntry {
    level: String,
    message: String,
    source: String,
    context: String,
    trace_id: String,
    tags: HashMap<String, String>,
    metadata: HashMap<String, serde_json::Value>,
}

impl IncomingEntry {
    fn into_entry(self, default_source: &str) -> Result<LogEntry, crate::Error> {
        let level = if self.level.is_empty() {
            Level::Info
        } else {
            self.level.parse()?
        };
        let mut builder = LogEntry::builder(level)
            .message(self.message)
            .context(self.context)
            .merge_metadata(&self.metadata);
        builder = if self.source.is_empty() {
            builder.source(default_source)
        } else {
            builder.source(self.source)
        };
        if !self.trace_id.is_empty() {
            builder = builder.trace_id(self.trace_id);
        }
        for (k, v) in self.tags {
            builder = builder.tag(k, v);
        }
        let entry = builder.build();
        entry.validate()?;
        Ok(entry)
    }
}

fn bad_request(e: &crate::Error) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "status": "error", "message": e.to_string() })),
    )
}

async fn dispatch_entry(logger: Arc<Logger>, entry: LogEntry) {
    let joined = tokio::task::spawn_blocking(move || logger.log(&entry)).await;
    if let Err(e) = joined {
        tracing::warn!(error = %e, "log dispatch task failed");
    }
}

async fn ingest(
    State(state): State<AppState>,
    Json(incoming): Json<IncomingEntry>,
) -> impl IntoResponse {
    match incoming.into_entry("") {
        Ok(entry) => {
            dispatch_entry(state.logger, entry).await;
            (
                StatusCode::OK,
                Json(json!({ "status": "success", "message": "Log entry accepted" })),
            )
        }
        Err(e) => bad_request(&e),
    }
}

fn integration_enabled(state: &AppState, name: &str) -> bool {
    state
        .config
        .current()
        .integrations
        .get(name)
        .is_some_and(|i| i.enabled)
}

async fn integration_health(
    State(state): State<AppState>,
    Path(integration): Path<String>,
) -> impl IntoResponse {
    if !integration_enabled(&state, &integration) {
        return (StatusCode::NOT_FOUND, Json(json!({ "status": "unknown integration" })));
    }
    (StatusCode::OK, Json(json!({ "status": "ok", "integration": integration })))
}

async fn integration_metrics(
    State(state): State<AppState>,
    Path(integration): Path<String>,
) -> axum::response::Response {
    if !integration_enabled(&state, &integration) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "unknown integration" })),
        )
            .into_response();
    }
    exposition_response(&state.metrics).into_response()
}

async fn integration_receive(
    State(state): State<AppState>,
    Path(integration): Path<String>,
    Json(incoming): Json<IncomingEntry>,
) -> impl IntoResponse {
    if !integration_enabled(&state, &integration) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "unknown integration" })),
        );
    }
    match incoming.into_entry(&integration) {
        Ok(entry) => {
            dispatch_entry(state.logger, entry).await;
            (
                StatusCode::OK,
                Json(json!({ "status": "success", "message": "Callback processed" })),
            )
        }
        Err(e) => bad_request(&e),
    }
}

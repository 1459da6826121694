//! Standalone exposition listener for `metrics serve`. The daemon serves
//! the same snapshot through its own routes, so this listener exists only
//! for processes that are not running the full HTTP surface.

use super::MetricsStore;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Handle to the running listener; dropping it without [`shutdown`]
/// detaches the thread, which exits with the process.
pub struct ExpositionServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl ExpositionServer {
    /// Binds `0.0.0.0:port` on a dedicated thread with its own single-thread
    /// runtime, so the sync metrics API never depends on an ambient runtime.
    ///
    /// # Errors
    /// Bind and runtime-construction failures.
    pub fn start(store: Arc<MetricsStore>, port: u16) -> Result<Self, crate::Error> {
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<(), std::io::Error>>();

        let thread = std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            runtime.block_on(async move {
                let app = Router::new()
                    .route("/metrics", get(metrics_handler))
                    .with_state(store);
                let addr = SocketAddr::from(([0, 0, 0, 0], port));
                let listener = match tokio::net::TcpListener::bind(addr).await {
                    Ok(l) => l,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                let serve = axum::serve(listener, app).with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                });
                if let Err(e) = serve.await {
                    tracing::error!(error = %e, "metrics listener failed");
                }
            });
        });

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                shutdown_tx: Some(shutdown_tx),
                thread: Some(thread),
            }),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(crate::Error::Notify(
                "metrics listener thread exited before binding".to_string(),
            )),
        }
    }

    /// Stops accepting scrapes and joins the listener thread.
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Scrape handler shared in shape with the daemon route: 403 while the
/// store is disabled, 204 for an empty snapshot, text exposition otherwise.
pub async fn metrics_handler(State(store): State<Arc<MetricsStore>>) -> impl IntoResponse {
    exposition_response(&store)
}

/// Builds the exposition response; also called by the daemon's route.
pub fn exposition_response(store: &MetricsStore) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let content_type = [(header::CONTENT_TYPE, "text/plain; version=0.0.4")];
    if !store.is_enabled() {
        return (
            StatusCode::FORBIDDEN,
            content_type,
            "metrics exposition is not enabled\n".to_string(),
        );
    }
    let body = store.exposition();
    if body.is_empty() {
        return (StatusCode::NO_CONTENT, content_type, String::new());
    }
    (StatusCode::OK, content_type, body)
}

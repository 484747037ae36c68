//! Translate Proxy
//!
//! Single-binary Rust service that:
//! 1. Sends users through Google's OAuth2 consent screen
//! 2. Stores each user's credential and keeps the access token fresh
//! 3. Calls the Cloud Translation API on the signed-in user's behalf

mod auth;
mod config;
mod error;
mod metrics;
mod session;
mod translation;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{FromRef, MatchedPath, Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum_extra::extract::cookie::Key;
use credentials::{CredentialManager, CredentialStore, FileStore, MemoryStore};
use google_auth::{GoogleClient, OAuthConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use translate::TranslateClient;

use crate::config::{Config, StorageBackend};
use crate::metrics::ServiceMetrics;
use crate::session::SessionSettings;

/// Time allowed for in-flight requests to finish after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state accessible from all handlers
#[derive(Clone)]
struct AppState {
    google: GoogleClient,
    translator: TranslateClient,
    manager: Arc<CredentialManager>,
    session: Arc<SessionSettings>,
    metrics: ServiceMetrics,
    prometheus: PrometheusHandle,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.session.key.clone()
    }
}

/// Build the axum router with all routes and shared state.
///
/// Every matched route is counted for /health and Prometheus; the
/// concurrency limit caps in-flight requests at `max_connections`.
fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/", get(auth::home))
        .route("/auth", get(auth::authorize))
        .route("/oauth/callback", get(auth::callback))
        .route(
            "/translate",
            get(translation::translate_query).post(translation::translate_form),
        )
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_requests,
        ))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting translate-proxy");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus = metrics::install_recorder().context("failed to install Prometheus recorder")?;

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let (config_path, explicit) = Config::resolve_path(cli_config_path);
    let config = if explicit || config_path.exists() {
        info!(path = %config_path.display(), "loading configuration");
        Config::load(&config_path)
            .with_context(|| format!("failed to load config from {}", config_path.display()))?
    } else {
        info!("no config file, using defaults and environment");
        Config::from_env().context("invalid configuration")?
    };

    info!(
        listen_addr = %config.server.listen_addr,
        storage = ?config.storage.backend,
        redirect_uri = %config.google.redirect_uri,
        secure_cookie = config.session.secure_cookie,
        "configuration loaded"
    );

    let state = build_state(&config, prometheus).await?;
    let app = build_router(state, config.server.max_connections);

    let listen_addr = config.server.listen_addr;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;
    info!(addr = %listen_addr, "accepting requests");

    // The drain timeout starts when the shutdown signal fires, not when the
    // server starts: notify the server to drain, then race it against the timer.
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(DRAIN_TIMEOUT, server_handle).await {
        Ok(Ok(Ok(()))) => {
            info!("all in-flight requests drained");
        }
        Ok(Ok(Err(e))) => {
            error!(error = %e, "server error during shutdown");
        }
        Ok(Err(e)) => {
            error!(error = %e, "server task panicked");
        }
        Err(_) => {
            warn!(
                drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
                "drain timeout exceeded, forcing shutdown"
            );
        }
    }

    info!("shutdown complete");
    Ok(())
}

/// Wire clients, store, and session settings from validated config.
async fn build_state(config: &Config, prometheus: PrometheusHandle) -> Result<AppState> {
    let client_secret = config
        .google
        .client_secret
        .clone()
        .context("google client secret not resolved")?;
    let session_secret = config
        .session
        .secret
        .as_ref()
        .context("session secret not resolved")?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.upstream_timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let google = GoogleClient::new(
        http.clone(),
        OAuthConfig::new(
            config.google.client_id.clone(),
            client_secret,
            config.google.redirect_uri.clone(),
        ),
    );

    let store: Arc<dyn CredentialStore> = match config.storage.backend {
        StorageBackend::File => {
            let store = FileStore::load(config.storage.path.clone())
                .await
                .with_context(|| {
                    format!(
                        "failed to open credential store {}",
                        config.storage.path.display()
                    )
                })?;
            Arc::new(store)
        }
        StorageBackend::Memory => {
            warn!("memory storage backend: credentials are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    let manager = CredentialManager::new(store, Arc::new(google.clone()));

    Ok(AppState {
        google,
        translator: TranslateClient::new(http),
        manager: Arc::new(manager),
        session: Arc::new(SessionSettings::new(&config.session, session_secret)),
        metrics: ServiceMetrics::new(),
        prometheus,
    })
}

/// Count every routed request for /health and record Prometheus metrics.
async fn track_requests(
    State(service_metrics): State<ServiceMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".into());

    let response = next.run(request).await;

    let status = response.status();
    service_metrics.requests_total.fetch_add(1, Ordering::Relaxed);
    if status.is_client_error() || status.is_server_error() {
        service_metrics.errors_total.fetch_add(1, Ordering::Relaxed);
    }
    metrics::record_request(
        &route,
        &method,
        status.as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

/// Health endpoint: JSON with status, storage backend, uptime, requests served.
/// Returns 503 when the credential store cannot be read.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.metrics.started_at.elapsed().as_secs();
    let requests = state.metrics.requests_total.load(Ordering::Relaxed);
    let errors = state.metrics.errors_total.load(Ordering::Relaxed);
    let store = state.manager.store();

    let (status_code, body) = match store.count().await {
        Ok(credentials) => (
            axum::http::StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "storage": store.backend(),
                "credentials_stored": credentials,
                "uptime_seconds": uptime,
                "requests_served": requests,
                "errors_total": errors,
            }),
        ),
        Err(e) => {
            warn!(error = %e, "credential store unavailable");
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({
                    "status": "degraded",
                    "storage": store.backend(),
                    "uptime_seconds": uptime,
                    "requests_served": requests,
                    "errors_total": errors,
                }),
            )
        }
    };

    (
        status_code,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

/// Prometheus metrics endpoint: text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

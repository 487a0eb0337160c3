//! HTTP surface of the exporter
//!
//! `GET /probe` runs one collection cycle; every other path is served from
//! the static directory.

use crate::collector::{MetricCollector, EXPOSITION_CONTENT_TYPE};
use crate::error::{AppError, MeasurementError, Result};
use crate::logging::Logger;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

pub const PROBE_PATH: &str = "/probe";

/// Shared state of the HTTP handlers
#[derive(Clone)]
pub struct ServerState {
    collector: MetricCollector,
    logger: Logger,
    /// Hint sent with a busy response
    retry_after: Duration,
}

impl ServerState {
    pub fn new(collector: MetricCollector, logger: Logger, retry_after: Duration) -> Self {
        Self {
            collector,
            logger,
            retry_after,
        }
    }
}

/// Probe route plus static file fallback
pub fn build_router(state: ServerState, static_dir: impl Into<PathBuf>) -> Router {
    Router::new()
        .route(PROBE_PATH, get(probe))
        .with_state(Arc::new(state))
        .fallback_service(ServeDir::new(static_dir.into()))
}

async fn probe(State(state): State<Arc<ServerState>>) -> Response {
    let started_at = Instant::now();
    let correlation_id = state.logger.start_operation("probe").await;

    match state.collector.scrape().await {
        Ok(body) => {
            state
                .logger
                .info("Probe served")
                .correlation_id(&correlation_id)
                .field("duration_ms", started_at.elapsed().as_millis() as u64)
                .log()
                .await;
            state.logger.end_operation(&correlation_id, "probe", true).await;
            ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], body).into_response()
        }
        Err(error) => {
            let builder = state
                .logger
                .error(&format!("Probe failed: {}", error))
                .correlation_id(&correlation_id)
                .field("duration_ms", started_at.elapsed().as_millis() as u64);
            match &error {
                AppError::Measurement(measurement) => builder.error_info(measurement).log().await,
                _ => builder.field("category", error.category()).log().await,
            }
            state.logger.end_operation(&correlation_id, "probe", false).await;
            error_response(&error, state.retry_after)
        }
    }
}

/// Map a failed scrape onto a status code
///
/// A busy slot is the only failure a scraper can fix by waiting.
pub fn error_response(error: &AppError, retry_after: Duration) -> Response {
    match error {
        AppError::Measurement(MeasurementError::Busy) => {
            let mut response = (StatusCode::SERVICE_UNAVAILABLE, error.to_string()).into_response();
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(retry_after.as_secs().max(1)),
            );
            response
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response(),
    }
}

/// Serve until Ctrl-C
pub async fn serve(listener: TcpListener, router: Router, logger: Logger) -> Result<()> {
    let address = listener
        .local_addr()
        .map_err(|e| AppError::server(format!("Failed to read listener address: {}", e)))?;
    logger
        .info("Listening")
        .field("address", address.to_string())
        .field("probe", PROBE_PATH)
        .log()
        .await;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(logger.clone()))
        .await
        .map_err(|e| AppError::server(format!("HTTP server failed: {}", e)))?;

    logger.info("Server stopped").log().await;
    Ok(())
}

async fn shutdown_signal(logger: Logger) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logger.info("Shutdown signal received").log().await,
        Err(e) => {
            // Without a handler the server runs until killed
            logger
                .warn("Failed to install Ctrl-C handler")
                .field("error", e.to_string())
                .log()
                .await;
            std::future::pending::<()>().await;
        }
    }
}

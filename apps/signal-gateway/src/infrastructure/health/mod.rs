//! Health Check and Metrics Endpoints
//!
//! # Endpoints
//!
//! - `GET /health` - JSON status: backend reachability and open streams
//! - `GET /healthz` - Liveness probe (simple OK)
//! - `GET /readyz` - Readiness probe (last backend call reached the backend)
//! - `GET /metrics` - Prometheus metrics in text format

use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::infrastructure::grpc::{BackendSnapshot, BackendState, BackendStatus};
use crate::infrastructure::http::StreamSessions;
use crate::infrastructure::metrics::get_metrics_handle;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Gateway version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Backend status.
    pub backend: BackendSnapshot,
    /// Stream sessions.
    pub streams: StreamStatus,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Backend answered the last call.
    Healthy,
    /// No backend call has completed yet.
    Degraded,
    /// Backend unreachable on the last call.
    Unhealthy,
}

impl From<BackendState> for HealthStatus {
    fn from(state: BackendState) -> Self {
        match state {
            BackendState::Reachable => Self::Healthy,
            BackendState::Unknown => Self::Degraded,
            BackendState::Unreachable => Self::Unhealthy,
        }
    }
}

/// Stream session counts.
#[derive(Debug, Clone, Serialize)]
pub struct StreamStatus {
    /// Open fuel stream sessions.
    pub active: usize,
}

/// Shared state for the health routes.
#[derive(Clone)]
pub struct HealthState {
    version: String,
    started_at: Instant,
    backend: Arc<BackendStatus>,
    sessions: Arc<StreamSessions>,
}

impl HealthState {
    /// Create health state.
    #[must_use]
    pub fn new(
        version: String,
        backend: Arc<BackendStatus>,
        sessions: Arc<StreamSessions>,
    ) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            backend,
            sessions,
        }
    }
}

/// Routes for health probes and metrics.
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let response = build_health_response(&state);
    let status_code = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(response))
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler(State(state): State<HealthState>) -> impl IntoResponse {
    if state.backend.is_ready() {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}

fn build_health_response(state: &HealthState) -> HealthResponse {
    let backend = state.backend.snapshot();
    HealthResponse {
        status: backend.state.into(),
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        backend,
        streams: StreamStatus {
            active: state.sessions.active(),
        },
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::application::ports::{SignalError, SignalOperation};

    fn state() -> HealthState {
        HealthState::new(
            "0.1.0".to_string(),
            Arc::new(BackendStatus::new()),
            Arc::new(StreamSessions::new(CancellationToken::new())),
        )
    }

    #[test]
    fn health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unhealthy).unwrap(),
            "\"unhealthy\""
        );
    }

    #[test]
    fn fresh_gateway_is_degraded() {
        let response = build_health_response(&state());
        assert_eq!(response.status, HealthStatus::Degraded);
        assert_eq!(response.streams.active, 0);
        assert_eq!(response.version, "0.1.0");
    }

    #[test]
    fn unreachable_backend_is_unhealthy() {
        let state = state();
        state.backend.record_failure(&SignalError::timeout(
            SignalOperation::GetHeadlightState,
            std::time::Duration::from_secs(2),
        ));
        let response = build_health_response(&state);
        assert_eq!(response.status, HealthStatus::Unhealthy);
        assert!(response.backend.last_error.is_some());
    }

    #[test]
    fn open_sessions_are_counted() {
        let state = state();
        let _scope = state.sessions.open("s1".to_string());
        assert_eq!(build_health_response(&state).streams.active, 1);
    }
}

//! Router assembly and shared handler state.

use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::envelope::REQUEST_ID_HEADER;
use super::session::StreamSessions;
use super::{fuel, lighting};
use crate::application::ports::VehicleSignalsPort;
use crate::application::services::{FuelRelay, RelayConfig};
use crate::domain::vehicle::VehicleId;
use crate::infrastructure::health::{HealthState, health_router};

/// State shared by the API handlers.
#[derive(Clone)]
pub struct AppState {
    pub(super) signals: Arc<dyn VehicleSignalsPort>,
    pub(super) relay: FuelRelay,
    pub(super) sessions: Arc<StreamSessions>,
    pub(super) vehicle_id: VehicleId,
}

impl AppState {
    /// Build handler state over one shared backend handle.
    #[must_use]
    pub fn new(
        signals: Arc<dyn VehicleSignalsPort>,
        vehicle_id: VehicleId,
        relay: RelayConfig,
        sessions: Arc<StreamSessions>,
    ) -> Self {
        Self {
            relay: FuelRelay::new(Arc::clone(&signals), relay),
            signals,
            sessions,
            vehicle_id,
        }
    }
}

/// Build the gateway router: API routes, health routes, and middleware.
pub fn build_router(state: AppState, health: HealthState) -> Router {
    let api = Router::new()
        .route("/api/v1/vehicle/data/fuel_level", get(fuel::get_fuel_level))
        .route(
            "/api/v1/vehicle/stream/fuel_level",
            get(fuel::stream_fuel_level),
        )
        .route(
            "/api/v1/vehicle/lighting/headlights",
            get(lighting::get_headlights).put(lighting::set_headlights),
        )
        .with_state(state);

    api.merge(health_router(health)).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CatchPanicLayer::new()),
    )
}

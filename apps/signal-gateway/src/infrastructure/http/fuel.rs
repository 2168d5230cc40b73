//! Fuel level handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONNECTION};
use axum::response::{IntoResponse, Sse};

use super::envelope::{DataEnvelope, request_id};
use super::error::ApiError;
use super::router::AppState;
use super::sse::fuel_events;
use crate::domain::streaming::StreamParams;
use crate::infrastructure::metrics::{self, Endpoint, RequestOutcome};

/// Raw query pairs. Values stay strings so malformed input falls back to
/// defaults instead of rejecting the request. Repeated keys use the first
/// occurrence.
type QueryPairs = Vec<(String, String)>;

fn first<'a>(pairs: &'a QueryPairs, key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// `GET /api/v1/vehicle/data/fuel_level`
pub async fn get_fuel_level(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let reading = state
        .signals
        .get_fuel_level(&state.vehicle_id)
        .await
        .inspect_err(|_| {
            metrics::record_http_request(Endpoint::FuelLevel, RequestOutcome::BackendError);
        })?;

    metrics::record_http_request(Endpoint::FuelLevel, RequestOutcome::Ok);
    Ok(Json(DataEnvelope::success(
        &state.vehicle_id,
        "fuel_level",
        reading,
        request_id(&headers),
    ))
    .into_response())
}

/// `GET /api/v1/vehicle/stream/fuel_level?interval=N&max_updates=M`
///
/// Opens the backend stream before any response bytes are written, so a
/// setup failure is still a plain 500. After that the response is an SSE
/// stream that ends when the relay closes.
pub async fn stream_fuel_level(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<QueryPairs>,
) -> Result<impl IntoResponse, ApiError> {
    let params = StreamParams::from_query(first(&query, "interval"), first(&query, "max_updates"));
    let session = state.sessions.open(request_id(&headers));

    tracing::info!(
        session_id = %session.id(),
        vehicle_id = %state.vehicle_id,
        interval_secs = params.interval_secs.get(),
        limit = ?params.limit,
        "Fuel stream requested"
    );

    let relay = state
        .relay
        .start(session.id(), &state.vehicle_id, params, session.token())
        .await
        .inspect_err(|e| {
            metrics::record_http_request(Endpoint::FuelStream, RequestOutcome::BackendError);
            tracing::warn!(session_id = %session.id(), error = %e, "Fuel stream setup failed");
        })?;

    metrics::record_http_request(Endpoint::FuelStream, RequestOutcome::Ok);
    let events = fuel_events(relay, session, state.vehicle_id.clone());

    Ok((
        [(CONNECTION, "keep-alive"), (ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Sse::new(events),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_wins() {
        let pairs = vec![
            ("interval".to_string(), "3".to_string()),
            ("interval".to_string(), "9".to_string()),
        ];
        assert_eq!(first(&pairs, "interval"), Some("3"));
        assert_eq!(first(&pairs, "max_updates"), None);
    }
}

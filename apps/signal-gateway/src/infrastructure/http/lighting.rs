//! Headlight handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;

use super::envelope::{CommandEnvelope, DataEnvelope, request_id};
use super::error::ApiError;
use super::router::AppState;
use crate::domain::vehicle::HeadlightCommand;
use crate::infrastructure::metrics::{self, Endpoint, RequestOutcome};

/// `GET /api/v1/vehicle/lighting/headlights`
pub async fn get_headlights(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let headlights = state
        .signals
        .get_headlight_state(&state.vehicle_id)
        .await
        .inspect_err(|_| {
            metrics::record_http_request(Endpoint::HeadlightState, RequestOutcome::BackendError);
        })?;

    metrics::record_http_request(Endpoint::HeadlightState, RequestOutcome::Ok);
    Ok(Json(DataEnvelope::success(
        &state.vehicle_id,
        "headlights",
        headlights,
        request_id(&headers),
    ))
    .into_response())
}

/// `PUT /api/v1/vehicle/lighting/headlights` with body `{"turn_on": bool}`.
///
/// The body is decoded as JSON whatever its content type. Only the first
/// JSON value is read, and `null` switches the headlights off.
pub async fn set_headlights(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let command = decode_command(&body).map_err(|e| {
        metrics::record_http_request(Endpoint::SetHeadlight, RequestOutcome::BadRequest);
        tracing::debug!(error = %e, "Rejected headlight command body");
        ApiError::InvalidBody
    })?;

    let applied = state
        .signals
        .set_headlight(&state.vehicle_id, command)
        .await
        .inspect_err(|_| {
            metrics::record_http_request(Endpoint::SetHeadlight, RequestOutcome::BackendError);
        })?;

    metrics::record_http_request(Endpoint::SetHeadlight, RequestOutcome::Ok);
    tracing::info!(command = command.name(), applied, "Headlight command sent");
    Ok(Json(CommandEnvelope::new(
        applied,
        &state.vehicle_id,
        command.name(),
        request_id(&headers),
    ))
    .into_response())
}

/// Decode the first JSON value of `body` as a command.
fn decode_command(body: &[u8]) -> Result<HeadlightCommand, serde_json::Error> {
    let mut values =
        serde_json::Deserializer::from_slice(body).into_iter::<Option<HeadlightCommand>>();
    match values.next() {
        Some(value) => value.map(Option::unwrap_or_default),
        None => Err(serde::de::Error::custom("empty request body")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(br#"{"turn_on": true}"# => true; "on")]
    #[test_case(br#"{"turn_on": false}"# => false; "off")]
    #[test_case(b"{}" => false; "missing field")]
    #[test_case(b"null" => false; "null body")]
    #[test_case(br#"{"turn_on": true} trailing"# => true; "trailing bytes ignored")]
    #[test_case(b"  {\"turn_on\": true}\n" => true; "surrounding whitespace")]
    fn decodes_first_value(body: &[u8]) -> bool {
        decode_command(body).unwrap().turn_on
    }

    #[test_case(b""; "empty")]
    #[test_case(b"   \n"; "whitespace only")]
    #[test_case(b"turn on please"; "not json")]
    #[test_case(br#"{"turn_on": "yes"}"#; "wrong type")]
    fn rejects_non_command(body: &[u8]) {
        assert!(decode_command(body).is_err());
    }
}

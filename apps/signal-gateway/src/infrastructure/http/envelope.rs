//! JSON response envelopes.

use axum::http::HeaderMap;
use serde::Serialize;

use crate::domain::vehicle::{FuelReading, VehicleId};

/// Header carrying the request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Event name of stream frames.
pub const FUEL_LEVEL_UPDATE: &str = "fuel_level_update";

/// Envelope of single-reading responses.
#[derive(Debug, Serialize)]
pub struct DataEnvelope<'a, T: Serialize> {
    status: &'static str,
    vehicle_id: &'a VehicleId,
    data_key: &'static str,
    data: T,
    timestamp: i64,
    request_id: String,
}

impl<'a, T: Serialize> DataEnvelope<'a, T> {
    /// Successful response carrying `data` under `data_key`.
    pub fn success(
        vehicle_id: &'a VehicleId,
        data_key: &'static str,
        data: T,
        request_id: String,
    ) -> Self {
        Self {
            status: "success",
            vehicle_id,
            data_key,
            data,
            timestamp: now_unix_secs(),
            request_id,
        }
    }
}

/// Envelope of headlight switch responses.
#[derive(Debug, Serialize)]
pub struct CommandEnvelope<'a> {
    /// Whether the backend applied the change.
    status: bool,
    vehicle_id: &'a VehicleId,
    command: &'static str,
    timestamp: i64,
    request_id: String,
}

impl<'a> CommandEnvelope<'a> {
    /// Response for `command`.
    pub fn new(
        applied: bool,
        vehicle_id: &'a VehicleId,
        command: &'static str,
        request_id: String,
    ) -> Self {
        Self {
            status: applied,
            vehicle_id,
            command,
            timestamp: now_unix_secs(),
            request_id,
        }
    }
}

/// Payload of one stream frame.
#[derive(Debug, Serialize)]
pub struct StreamFrame<'a> {
    event: &'static str,
    vehicle_id: &'a VehicleId,
    data: FuelReading,
    timestamp: i64,
}

impl<'a> StreamFrame<'a> {
    /// Frame for `reading`, stamped with the current time.
    pub fn fuel_level_update(vehicle_id: &'a VehicleId, reading: FuelReading) -> Self {
        Self {
            event: FUEL_LEVEL_UPDATE,
            vehicle_id,
            data: reading,
            timestamp: now_unix_secs(),
        }
    }
}

/// Request identifier set by the request-id middleware.
///
/// Falls back to a fresh UUID when the router runs without the middleware.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string)
}

fn now_unix_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use serde_json::Value;

    use super::*;
    use crate::domain::vehicle::HeadlightState;

    fn vehicle() -> VehicleId {
        VehicleId::new("VIN123456789").unwrap()
    }

    #[test]
    fn data_envelope_shape() {
        let vehicle = vehicle();
        let envelope = DataEnvelope::success(
            &vehicle,
            "headlights",
            HeadlightState { headlight_on: true },
            "req-1".to_string(),
        );
        let json: Value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["vehicle_id"], "VIN123456789");
        assert_eq!(json["data_key"], "headlights");
        assert_eq!(json["data"]["headlight_state"], true);
        assert_eq!(json["request_id"], "req-1");
        assert!(json["timestamp"].as_i64().unwrap() > 1_600_000_000);
    }

    #[test]
    fn command_envelope_shape() {
        let vehicle = vehicle();
        let json: Value = serde_json::to_value(CommandEnvelope::new(
            false,
            &vehicle,
            "turn_headlights_off",
            "req-2".to_string(),
        ))
        .unwrap();
        assert_eq!(json["status"], false);
        assert_eq!(json["command"], "turn_headlights_off");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn stream_frame_shape() {
        let vehicle = vehicle();
        let frame = StreamFrame::fuel_level_update(&vehicle, FuelReading::new(42.0, 7, 0));
        let json: Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["event"], "fuel_level_update");
        assert_eq!(json["data"]["level_percent"], 42.0);
        assert_eq!(json["data"]["timestamp_ms"], 7);
        assert!(json.get("request_id").is_none());
    }

    #[test]
    fn request_id_reads_header_or_generates() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");

        let generated = request_id(&HeaderMap::new());
        assert!(uuid::Uuid::parse_str(&generated).is_ok());
    }
}

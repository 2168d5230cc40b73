//! Prometheus Metrics Module
//!
//! # Metrics Categories
//!
//! - **Requests**: HTTP requests by endpoint and outcome
//! - **Streams**: Active sessions, frames sent or skipped, session outcomes
//! - **Backend**: RPC latency and failures by operation
//!
//! Metrics are rendered at `/metrics` on the gateway port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::application::ports::SignalOperation;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder.
///
/// Calling this again returns the handle installed by the first call.
///
/// # Errors
///
/// Returns an error if another global recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle, if metrics were initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

fn register_metrics() {
    describe_counter!(
        "signal_gateway_http_requests_total",
        "HTTP requests by endpoint and outcome"
    );

    describe_gauge!(
        "signal_gateway_stream_sessions_active",
        "Fuel stream sessions currently open"
    );
    describe_counter!(
        "signal_gateway_stream_frames_sent_total",
        "SSE frames written to clients"
    );
    describe_counter!(
        "signal_gateway_stream_frames_skipped_total",
        "Readings dropped because they could not be serialized"
    );
    describe_counter!(
        "signal_gateway_stream_sessions_total",
        "Finished fuel relays by outcome"
    );

    describe_counter!(
        "signal_gateway_backend_errors_total",
        "Failed backend calls by operation"
    );
    describe_histogram!(
        "signal_gateway_backend_call_seconds",
        "Backend unary call and stream setup latency"
    );
}

/// HTTP endpoint labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET /api/v1/vehicle/data/fuel_level`
    FuelLevel,
    /// `GET /api/v1/vehicle/stream/fuel_level`
    FuelStream,
    /// `GET /api/v1/vehicle/lighting/headlights`
    HeadlightState,
    /// `PUT /api/v1/vehicle/lighting/headlights`
    SetHeadlight,
}

impl Endpoint {
    const fn as_str(self) -> &'static str {
        match self {
            Self::FuelLevel => "fuel_level",
            Self::FuelStream => "fuel_stream",
            Self::HeadlightState => "headlight_state",
            Self::SetHeadlight => "set_headlight",
        }
    }
}

/// HTTP request outcome labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Backend call succeeded, or the stream was opened.
    Ok,
    /// Request body was rejected.
    BadRequest,
    /// Backend call failed or timed out.
    BackendError,
}

impl RequestOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::BadRequest => "bad_request",
            Self::BackendError => "backend_error",
        }
    }
}

/// Record a handled HTTP request.
pub fn record_http_request(endpoint: Endpoint, outcome: RequestOutcome) {
    counter!(
        "signal_gateway_http_requests_total",
        "endpoint" => endpoint.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Update the active stream session gauge.
#[allow(clippy::cast_precision_loss)]
pub fn set_active_streams(count: usize) {
    gauge!("signal_gateway_stream_sessions_active").set(count as f64);
}

/// Record one SSE frame written.
pub fn record_frame_sent() {
    counter!("signal_gateway_stream_frames_sent_total").increment(1);
}

/// Record one reading skipped by the publisher.
pub fn record_frame_skipped() {
    counter!("signal_gateway_stream_frames_skipped_total").increment(1);
}

/// Record a finished relay.
pub fn record_stream_finished(outcome: &'static str) {
    counter!(
        "signal_gateway_stream_sessions_total",
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a backend call's latency and, if it failed, an error.
pub fn record_backend_call(operation: SignalOperation, elapsed: Duration, failed: bool) {
    histogram!(
        "signal_gateway_backend_call_seconds",
        "operation" => operation.as_str()
    )
    .record(elapsed.as_secs_f64());

    if failed {
        counter!(
            "signal_gateway_backend_errors_total",
            "operation" => operation.as_str()
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_as_str() {
        assert_eq!(Endpoint::FuelLevel.as_str(), "fuel_level");
        assert_eq!(Endpoint::FuelStream.as_str(), "fuel_stream");
        assert_eq!(Endpoint::HeadlightState.as_str(), "headlight_state");
        assert_eq!(Endpoint::SetHeadlight.as_str(), "set_headlight");
    }

    #[test]
    fn outcome_as_str() {
        assert_eq!(RequestOutcome::Ok.as_str(), "ok");
        assert_eq!(RequestOutcome::BadRequest.as_str(), "bad_request");
        assert_eq!(RequestOutcome::BackendError.as_str(), "backend_error");
    }

    #[test]
    fn recording_without_recorder_is_a_no_op() {
        record_http_request(Endpoint::FuelLevel, RequestOutcome::Ok);
        record_frame_sent();
        record_backend_call(SignalOperation::GetFuelLevel, Duration::from_millis(3), true);
    }
}

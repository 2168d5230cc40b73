//! SSE publisher for fuel level streams.
//!
//! Drains a relay into `data: <json>` frames. Publishing stops when the relay
//! closes or the session is cancelled. If the client goes away, axum drops
//! the stream and, with it, the session scope, which cancels the relay task.
//! Every session logs one "Fuel stream closed" line, including disconnects.

use std::convert::Infallible;

use axum::response::sse::Event;
use futures::Stream;

use super::envelope::StreamFrame;
use super::session::SessionScope;
use crate::application::services::RelayHandle;
use crate::domain::vehicle::{FuelReading, VehicleId};
use crate::infrastructure::metrics;

/// Turn a running relay into a stream of SSE events.
pub fn fuel_events(
    mut relay: RelayHandle,
    session: SessionScope,
    vehicle_id: VehicleId,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    async_stream::stream! {
        let cancel = session.token();
        let mut close = StreamClose::new(session);

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                reading = relay.recv() => reading,
            };
            let Some(reading) = next else {
                break;
            };

            match frame_json(&vehicle_id, reading) {
                Ok(json) => {
                    close.frames += 1;
                    metrics::record_frame_sent();
                    yield Ok(Event::default().data(json));
                }
                Err(e) => {
                    metrics::record_frame_skipped();
                    tracing::warn!(
                        session_id = %close.session.id(),
                        error = %e,
                        "Skipping reading that cannot be serialized"
                    );
                }
            }
        }

        cancel.cancel();
        close.outcome = Some(
            relay
                .finish()
                .await
                .map_or("unknown", |summary| summary.outcome.as_str()),
        );
    }
}

/// Outcome logged when the stream is dropped before the relay finished.
const CLIENT_DISCONNECTED: &str = "client_disconnected";

/// Owns the session for the life of the event stream and logs its close.
///
/// axum drops the stream at a `yield` when the client disconnects, so the
/// close line is written on drop rather than at the end of the loop.
struct StreamClose {
    session: SessionScope,
    frames: u64,
    outcome: Option<&'static str>,
}

impl StreamClose {
    const fn new(session: SessionScope) -> Self {
        Self {
            session,
            frames: 0,
            outcome: None,
        }
    }

    fn outcome(&self) -> &'static str {
        self.outcome.unwrap_or(CLIENT_DISCONNECTED)
    }
}

impl Drop for StreamClose {
    fn drop(&mut self) {
        tracing::info!(
            session_id = %self.session.id(),
            frames = self.frames,
            outcome = self.outcome(),
            "Fuel stream closed"
        );
    }
}

/// Compact JSON payload of one frame.
fn frame_json(vehicle_id: &VehicleId, reading: FuelReading) -> Result<String, serde_json::Error> {
    serde_json::to_string(&StreamFrame::fuel_level_update(vehicle_id, reading))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::session::StreamSessions;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn frame_is_single_line_json() {
        let vehicle = VehicleId::new("VIN123456789").unwrap();
        let json = frame_json(&vehicle, FuelReading::new(48.5, 1_700_000_000_000, 0)).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with(
            r#"{"event":"fuel_level_update","vehicle_id":"VIN123456789","data":{"level_percent":48.5"#
        ));
    }

    #[test]
    fn close_without_relay_outcome_is_a_disconnect() {
        let sessions = Arc::new(StreamSessions::new(CancellationToken::new()));
        let mut close = StreamClose::new(sessions.open("s1".to_string()));
        let token = close.session.token();
        close.frames = 2;
        assert_eq!(close.outcome(), "client_disconnected");

        drop(close);
        assert!(token.is_cancelled());
        assert_eq!(sessions.active(), 0);
    }

    #[test]
    fn close_reports_relay_outcome() {
        let sessions = Arc::new(StreamSessions::new(CancellationToken::new()));
        let mut close = StreamClose::new(sessions.open("s1".to_string()));
        close.outcome = Some("limit_reached");
        assert_eq!(close.outcome(), "limit_reached");
    }

    #[test]
    fn non_finite_reading_fails_to_frame() {
        let vehicle = VehicleId::new("VIN123456789").unwrap();
        assert!(frame_json(&vehicle, FuelReading::new(f32::NAN, 1, 0)).is_err());
    }
}

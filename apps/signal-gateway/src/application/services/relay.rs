//! Fuel Stream Relay
//!
//! Bridges one backend fuel level stream to one bounded relay channel.
//!
//! # Lifecycle
//!
//! 1. [`FuelRelay::start`] opens exactly one backend stream. A failure here
//!    is a setup error and nothing is spawned.
//! 2. A relay task pulls readings one at a time and publishes them to the
//!    relay channel until the first terminal condition:
//!    - the update limit is reached
//!    - the backend ends the stream
//!    - the backend fails mid-stream (logged, not propagated)
//!    - the session's cancellation token fires
//!    - the consumer drops its receiver
//! 3. The task drops the backend stream and the relay sender, which closes
//!    the channel exactly once, and logs one summary line.
//!
//! Both the backend receive and the relay publish race against the
//! cancellation token, so a cancelled session never blocks on a full relay.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::application::ports::{FuelReadingStream, SignalError, VehicleSignalsPort};
use crate::domain::streaming::{StreamParams, UpdateLimit};
use crate::domain::vehicle::{FuelReading, VehicleId};
use crate::infrastructure::metrics;

/// Relay channel settings.
#[derive(Debug, Clone, Copy)]
pub struct RelayConfig {
    /// Readings buffered between the relay task and its consumer.
    pub capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { capacity: 1 }
    }
}

/// Why a relay task stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The update limit was reached.
    LimitReached,
    /// The backend ended the stream cleanly.
    EndOfStream,
    /// The backend failed mid-stream. Consumers only observe channel closure.
    UpstreamError(SignalError),
    /// The session was cancelled.
    Cancelled,
    /// The consumer dropped its receiver.
    ConsumerGone,
}

impl RelayOutcome {
    /// Outcome as a stable label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LimitReached => "limit_reached",
            Self::EndOfStream => "end_of_stream",
            Self::UpstreamError(_) => "upstream_error",
            Self::Cancelled => "cancelled",
            Self::ConsumerGone => "consumer_gone",
        }
    }
}

/// Result of a finished relay task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySummary {
    /// Why the task stopped.
    pub outcome: RelayOutcome,
    /// Readings published to the relay channel.
    pub relayed: u64,
}

/// Consumer side of a running relay.
#[derive(Debug)]
pub struct RelayHandle {
    readings: mpsc::Receiver<FuelReading>,
    task: JoinHandle<RelaySummary>,
}

impl RelayHandle {
    /// Receive the next reading, or `None` once the relay is closed.
    pub async fn recv(&mut self) -> Option<FuelReading> {
        self.readings.recv().await
    }

    /// Wait for the relay task to finish and return its summary.
    ///
    /// Returns `None` if the task panicked or was aborted.
    pub async fn finish(self) -> Option<RelaySummary> {
        drop(self.readings);
        match self.task.await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::error!(error = %e, "Fuel relay task failed");
                None
            }
        }
    }
}

/// Starts relay tasks for fuel level stream sessions.
#[derive(Clone)]
pub struct FuelRelay {
    port: Arc<dyn VehicleSignalsPort>,
    config: RelayConfig,
}

impl FuelRelay {
    /// Create a relay starter backed by `port`.
    #[must_use]
    pub fn new(port: Arc<dyn VehicleSignalsPort>, config: RelayConfig) -> Self {
        Self { port, config }
    }

    /// Open the backend stream and spawn the relay task.
    ///
    /// # Errors
    ///
    /// Returns the port's error if the backend stream cannot be opened. No
    /// task is spawned in that case.
    pub async fn start(
        &self,
        session_id: &str,
        vehicle_id: &VehicleId,
        params: StreamParams,
        cancel: CancellationToken,
    ) -> Result<RelayHandle, SignalError> {
        let upstream = self
            .port
            .open_fuel_stream(vehicle_id, params.interval_secs.get())
            .await?;

        let (tx, readings) = mpsc::channel(self.config.capacity.max(1));
        let span = tracing::info_span!(
            "fuel_relay",
            session_id = %session_id,
            vehicle_id = %vehicle_id,
            interval_secs = params.interval_secs.get(),
        );
        let task =
            tokio::spawn(relay_readings(upstream, tx, params.limit, cancel).instrument(span));

        Ok(RelayHandle { readings, task })
    }
}

async fn relay_readings(
    mut upstream: FuelReadingStream,
    tx: mpsc::Sender<FuelReading>,
    limit: UpdateLimit,
    cancel: CancellationToken,
) -> RelaySummary {
    let mut relayed: u64 = 0;

    let outcome = loop {
        if limit.is_reached(relayed) {
            break RelayOutcome::LimitReached;
        }

        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => break RelayOutcome::Cancelled,
            next = upstream.next() => next,
        };

        let reading = match next {
            Some(Ok(reading)) => reading,
            Some(Err(e)) => break RelayOutcome::UpstreamError(e),
            None => break RelayOutcome::EndOfStream,
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => break RelayOutcome::Cancelled,
            sent = tx.send(reading) => {
                if sent.is_err() {
                    break RelayOutcome::ConsumerGone;
                }
            }
        }
        relayed += 1;
    };

    // Release the backend call before closing the relay.
    drop(upstream);
    drop(tx);

    match &outcome {
        RelayOutcome::UpstreamError(e) => {
            tracing::warn!(outcome = outcome.as_str(), relayed, error = %e, "Fuel relay stopped");
        }
        _ => {
            tracing::info!(outcome = outcome.as_str(), relayed, "Fuel relay stopped");
        }
    }
    metrics::record_stream_finished(outcome.as_str());

    RelaySummary { outcome, relayed }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::task::{Context, Poll};
    use std::time::Duration;

    use futures::Stream;
    use futures::stream;
    use tokio::time::timeout;

    use super::*;
    use crate::application::ports::{MockVehicleSignalsPort, SignalOperation};

    /// Wraps a stream and flags when it is dropped.
    struct TrackedStream {
        inner: FuelReadingStream,
        released: Arc<AtomicBool>,
    }

    impl Stream for TrackedStream {
        type Item = Result<FuelReading, SignalError>;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            self.inner.as_mut().poll_next(cx)
        }
    }

    impl Drop for TrackedStream {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    fn reading(level: f32, ts: u64) -> FuelReading {
        FuelReading::new(level, ts, 0)
    }

    fn four_readings() -> Vec<Result<FuelReading, SignalError>> {
        vec![
            Ok(reading(50.0, 1)),
            Ok(reading(49.5, 2)),
            Ok(reading(49.0, 3)),
            Ok(reading(48.5, 4)),
        ]
    }

    fn vehicle() -> VehicleId {
        VehicleId::new("VIN123456789").unwrap()
    }

    fn params(max: i64) -> StreamParams {
        StreamParams {
            interval_secs: NonZeroU32::new(1).unwrap(),
            limit: UpdateLimit::from_count(max),
        }
    }

    fn relay_over(
        items: Vec<Result<FuelReading, SignalError>>,
        pending_tail: bool,
    ) -> (FuelRelay, Arc<AtomicBool>) {
        let released = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&released);
        let mut port = MockVehicleSignalsPort::new();
        port.expect_open_fuel_stream()
            .times(1)
            .returning(move |_, _| {
                let base = stream::iter(items.clone());
                let inner: FuelReadingStream = if pending_tail {
                    Box::pin(base.chain(stream::pending()))
                } else {
                    Box::pin(base)
                };
                Ok(Box::pin(TrackedStream {
                    inner,
                    released: Arc::clone(&flag),
                }))
            });
        (FuelRelay::new(Arc::new(port), RelayConfig::default()), released)
    }

    async fn drain(handle: &mut RelayHandle) -> Vec<FuelReading> {
        let mut out = Vec::new();
        while let Some(r) = timeout(Duration::from_secs(2), handle.recv())
            .await
            .expect("relay stalled")
        {
            out.push(r);
        }
        out
    }

    #[tokio::test]
    async fn stops_at_update_limit_in_backend_order() {
        let (relay, released) = relay_over(four_readings(), false);
        let mut handle = relay
            .start("s1", &vehicle(), params(3), CancellationToken::new())
            .await
            .unwrap();

        let got = drain(&mut handle).await;
        assert_eq!(got, vec![reading(50.0, 1), reading(49.5, 2), reading(49.0, 3)]);

        let summary = handle.finish().await.unwrap();
        assert_eq!(summary.outcome, RelayOutcome::LimitReached);
        assert_eq!(summary.relayed, 3);
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unbounded_relays_until_end_of_stream() {
        let (relay, _) = relay_over(four_readings(), false);
        let mut handle = relay
            .start("s2", &vehicle(), params(0), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(drain(&mut handle).await.len(), 4);
        let summary = handle.finish().await.unwrap();
        assert_eq!(summary.outcome, RelayOutcome::EndOfStream);
        assert_eq!(summary.relayed, 4);
    }

    #[tokio::test]
    async fn upstream_error_closes_relay_without_propagating() {
        let failure = SignalError::Rpc {
            operation: SignalOperation::StreamFuelLevel,
            code: "Internal".to_string(),
            message: "sensor bus fault".to_string(),
        };
        let items = vec![Ok(reading(50.0, 1)), Err(failure.clone()), Ok(reading(49.0, 3))];
        let (relay, released) = relay_over(items, false);
        let mut handle = relay
            .start("s3", &vehicle(), params(10), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(drain(&mut handle).await, vec![reading(50.0, 1)]);
        let summary = handle.finish().await.unwrap();
        assert_eq!(summary.outcome, RelayOutcome::UpstreamError(failure));
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn setup_error_is_reported_synchronously() {
        let mut port = MockVehicleSignalsPort::new();
        port.expect_open_fuel_stream().times(1).returning(|_, _| {
            Err(SignalError::Unavailable {
                operation: SignalOperation::StreamFuelLevel,
                message: "connection refused".to_string(),
            })
        });
        let relay = FuelRelay::new(Arc::new(port), RelayConfig::default());

        let err = relay
            .start("s4", &vehicle(), params(3), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SignalError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn cancellation_unblocks_pending_publish() {
        // Nobody reads, so the second publish blocks on the full relay.
        let (relay, released) = relay_over(four_readings(), true);
        let cancel = CancellationToken::new();
        let handle = relay
            .start("s5", &vehicle(), params(0), cancel.clone())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        cancel.cancel();

        let summary = timeout(Duration::from_secs(2), handle.finish())
            .await
            .expect("relay did not observe cancellation")
            .unwrap();
        assert_eq!(summary.outcome, RelayOutcome::Cancelled);
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancellation_unblocks_pending_receive() {
        let (relay, released) = relay_over(vec![Ok(reading(50.0, 1))], true);
        let cancel = CancellationToken::new();
        let mut handle = relay
            .start("s6", &vehicle(), params(0), cancel.clone())
            .await
            .unwrap();

        assert_eq!(handle.recv().await, Some(reading(50.0, 1)));
        cancel.cancel();

        assert_eq!(timeout(Duration::from_secs(2), handle.recv()).await.unwrap(), None);
        let summary = handle.finish().await.unwrap();
        assert_eq!(summary.outcome, RelayOutcome::Cancelled);
        assert_eq!(summary.relayed, 1);
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn dropped_consumer_stops_relay() {
        let (relay, released) = relay_over(four_readings(), true);
        let cancel = CancellationToken::new();
        let mut handle = relay
            .start("s7", &vehicle(), params(0), cancel)
            .await
            .unwrap();

        assert!(handle.recv().await.is_some());
        let summary = timeout(Duration::from_secs(2), handle.finish())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            summary.outcome,
            RelayOutcome::ConsumerGone | RelayOutcome::Cancelled
        ));
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(RelayOutcome::LimitReached.as_str(), "limit_reached");
        assert_eq!(RelayOutcome::EndOfStream.as_str(), "end_of_stream");
        assert_eq!(RelayOutcome::Cancelled.as_str(), "cancelled");
        assert_eq!(RelayOutcome::ConsumerGone.as_str(), "consumer_gone");
    }
}

//! Port Interfaces
//!
//! Defines the contract the gateway needs from the vehicle backend,
//! following the Hexagonal Architecture pattern. The gRPC adapter in
//! `infrastructure::grpc` implements it for production; tests provide
//! in-memory implementations.
//!
//! ## Driven Ports (Outbound)
//!
//! - `VehicleSignalsPort`: fuel level (unary and streaming) and headlight
//!   control on the vehicle backend

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::domain::vehicle::{FuelReading, HeadlightCommand, HeadlightState, VehicleId};

/// Stream of readings from one backend streaming call.
///
/// The stream ends cleanly with `None`; an `Err` item is a terminal
/// backend failure. Dropping the stream releases the underlying call.
pub type FuelReadingStream = Pin<Box<dyn Stream<Item = Result<FuelReading, SignalError>> + Send>>;

/// Port for the vehicle signal backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VehicleSignalsPort: Send + Sync {
    /// Read the current fuel level once.
    async fn get_fuel_level(&self, vehicle_id: &VehicleId) -> Result<FuelReading, SignalError>;

    /// Open a server-driven stream of fuel readings.
    ///
    /// `interval_secs` is forwarded to the backend, which owns the cadence.
    /// Errors returned here are setup errors; no stream was opened.
    async fn open_fuel_stream(
        &self,
        vehicle_id: &VehicleId,
        interval_secs: u32,
    ) -> Result<FuelReadingStream, SignalError>;

    /// Read the current headlight state.
    async fn get_headlight_state(
        &self,
        vehicle_id: &VehicleId,
    ) -> Result<HeadlightState, SignalError>;

    /// Switch the headlights. Returns whether the backend applied the change.
    async fn set_headlight(
        &self,
        vehicle_id: &VehicleId,
        command: HeadlightCommand,
    ) -> Result<bool, SignalError>;
}

/// Backend operations, used for error text, logs, and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOperation {
    /// Unary fuel level read.
    GetFuelLevel,
    /// Fuel level stream setup.
    StreamFuelLevel,
    /// Headlight state read.
    GetHeadlightState,
    /// Headlight switch.
    SetHeadlight,
}

impl SignalOperation {
    /// Operation name as a stable metric label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetFuelLevel => "get_fuel_level",
            Self::StreamFuelLevel => "stream_fuel_level",
            Self::GetHeadlightState => "get_headlight_state",
            Self::SetHeadlight => "set_headlight",
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::GetFuelLevel => "getting fuel level",
            Self::StreamFuelLevel => "setting up stream",
            Self::GetHeadlightState => "getting headlight state",
            Self::SetHeadlight => "setting headlight state",
        }
    }
}

impl std::fmt::Display for SignalOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// Errors reported by the vehicle backend port.
///
/// The `Display` text is what HTTP clients see in internal-error bodies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// The backend could not be reached.
    #[error("error {operation}: backend unavailable: {message}")]
    Unavailable {
        /// Operation that failed.
        operation: SignalOperation,
        /// Transport or status message.
        message: String,
    },

    /// The backend answered with a non-OK status.
    #[error("error {operation}: {message} (code: {code})")]
    Rpc {
        /// Operation that failed.
        operation: SignalOperation,
        /// Status code name reported by the backend.
        code: String,
        /// Status message reported by the backend.
        message: String,
    },

    /// The call did not complete within its deadline.
    #[error("error {operation}: deadline of {timeout_ms} ms exceeded")]
    Timeout {
        /// Operation that timed out.
        operation: SignalOperation,
        /// Deadline that was exceeded.
        timeout_ms: u64,
    },
}

impl SignalError {
    /// Build a timeout error for `operation`.
    #[must_use]
    pub fn timeout(operation: SignalOperation, timeout: std::time::Duration) -> Self {
        Self::Timeout {
            operation,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Operation the error belongs to.
    #[must_use]
    pub const fn operation(&self) -> SignalOperation {
        match self {
            Self::Unavailable { operation, .. }
            | Self::Rpc { operation, .. }
            | Self::Timeout { operation, .. } => *operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn error_text_names_the_operation() {
        let err = SignalError::Rpc {
            operation: SignalOperation::GetFuelLevel,
            code: "Internal".to_string(),
            message: "sensor offline".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "error getting fuel level: sensor offline (code: Internal)"
        );
    }

    #[test]
    fn timeout_reports_deadline() {
        let err = SignalError::timeout(SignalOperation::SetHeadlight, Duration::from_secs(2));
        assert_eq!(err.operation(), SignalOperation::SetHeadlight);
        assert_eq!(
            err.to_string(),
            "error setting headlight state: deadline of 2000 ms exceeded"
        );
    }
}

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Signal Gateway - Vehicle Signals over HTTP
//!
//! An HTTP gateway in front of the vehicle backend's gRPC services. Single
//! readings and headlight control are proxied request/response; the fuel
//! level RPC stream is bridged to browsers as Server-Sent Events.
//!
//! # Layers (inside -> outside)
//!
//! - **Domain**: Vehicle signal values and stream parameters
//!   - `vehicle`: Fuel readings, headlight state and commands
//!   - `streaming`: Interval and update-limit defaults
//!
//! - **Application**: Port definitions and the stream relay
//!   - `ports`: `VehicleSignalsPort` and `SignalError`
//!   - `services`: `FuelRelay`, one task per stream session
//!
//! - **Infrastructure**: Adapters and process plumbing
//!   - `grpc`: tonic client adapter over one shared channel
//!   - `http`: axum routes, SSE publisher, session scopes, server
//!   - `config`: Environment configuration
//!   - `health`: Probes and `/metrics`
//!   - `metrics`, `telemetry`: Prometheus and tracing setup
//!
//! # Data Flow
//!
//! ```text
//! HTTP client ──GET /stream──► session scope ──► FuelRelay task ──► StreamFuelLevel RPC
//!      ▲                                              │
//!      └──── data: {...} ◄──── SSE publisher ◄──── relay (capacity 1)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Domain layer - Vehicle signal types with no transport dependencies.
pub mod domain;

/// Application layer - Ports and the stream relay.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// Domain types
pub use domain::streaming::{StreamParams, UpdateLimit};
pub use domain::vehicle::{FuelReading, HeadlightCommand, HeadlightState, VehicleId, VehicleIdError};

// Ports and services
pub use application::ports::{FuelReadingStream, SignalError, SignalOperation, VehicleSignalsPort};
pub use application::services::{FuelRelay, RelayConfig, RelayHandle, RelayOutcome, RelaySummary};

// Infrastructure
pub use infrastructure::config::{ConfigError, GatewayConfig};
pub use infrastructure::grpc::{BackendStatus, GrpcVehicleSignals, proto};
pub use infrastructure::health::HealthState;
pub use infrastructure::http::{
    AppState, GatewayServer, GatewayServerError, StreamSessions, build_router,
};
pub use infrastructure::metrics::init_metrics;
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};

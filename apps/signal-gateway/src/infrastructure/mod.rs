//! Infrastructure Layer - Adapters and external integrations.
//!
//! Concrete implementations of the application ports plus the HTTP front
//! end and process plumbing.

/// Environment configuration.
pub mod config;

/// gRPC adapter for the vehicle backend.
pub mod grpc;

/// Health check and metrics routes.
pub mod health;

/// HTTP routes, SSE publishing, and the server.
pub mod http;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Tracing subscriber and OpenTelemetry integration.
pub mod telemetry;

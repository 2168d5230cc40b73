//! Domain Layer - Core vehicle signal types and stream parameters.
//!
//! This layer contains the value types the gateway moves between the
//! backend and HTTP clients. It has no knowledge of gRPC or HTTP; all
//! types here are plain Rust with serialization support.

/// Vehicle signal values (fuel readings, headlight state).
pub mod vehicle;

/// Stream request parameters and their default-substitution rules.
pub mod streaming;

//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the port the gateway uses to reach the vehicle
//! backend and the services that coordinate it, most importantly the
//! relay task behind every fuel level stream.

/// Port interfaces for the vehicle backend.
pub mod ports;

/// Application services (stream relay).
pub mod services;

//! Configuration Module
//!
//! Environment configuration for the gateway process.

mod settings;

pub use settings::{BackendSettings, ConfigError, GatewayConfig, ServerSettings};

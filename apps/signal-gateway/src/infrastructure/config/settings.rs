//! Gateway Configuration Settings
//!
//! Configuration types for the gateway, loaded from environment variables.

use std::time::Duration;

use crate::domain::vehicle::VehicleId;

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    /// Backend endpoint URI, always carrying a scheme.
    pub endpoint: String,
    /// Deadline for unary backend calls.
    pub unary_timeout: Duration,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Listening port.
    pub port: u16,
    /// How long in-flight requests may run after a shutdown signal.
    pub shutdown_timeout: Duration,
    /// Readings buffered between a stream's relay task and its publisher.
    pub relay_capacity: usize,
}

/// Complete gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Vehicle targeted by every request.
    pub default_vehicle: VehicleId,
    /// Backend connection settings.
    pub backend: BackendSettings,
    /// HTTP server settings.
    pub server: ServerSettings,
}

impl GatewayConfig {
    const DEFAULT_UNARY_TIMEOUT: Duration = Duration::from_millis(2000);
    const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);
    const DEFAULT_RELAY_CAPACITY: usize = 1;

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, empty, or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, empty, or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let server_addr = required(&lookup, "OB_SERVER_ADDR")?;
        let vehicle = required(&lookup, "DEFAULT_VEHICLE")?;
        let port = required(&lookup, "GATEWAY_PORT")?;

        let default_vehicle = VehicleId::new(vehicle)
            .map_err(|_| ConfigError::EmptyValue("DEFAULT_VEHICLE".to_string()))?;

        let port = port
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "GATEWAY_PORT".to_string(),
                value: port.clone(),
            })?;

        let backend = BackendSettings {
            endpoint: with_scheme(server_addr.trim()),
            unary_timeout: parse_duration_millis(
                &lookup,
                "GATEWAY_UNARY_TIMEOUT_MS",
                Self::DEFAULT_UNARY_TIMEOUT,
            ),
        };

        let server = ServerSettings {
            port,
            shutdown_timeout: parse_duration_secs(
                &lookup,
                "GATEWAY_SHUTDOWN_TIMEOUT_SECS",
                Self::DEFAULT_SHUTDOWN_TIMEOUT,
            ),
            relay_capacity: lookup("GATEWAY_RELAY_CAPACITY")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(Self::DEFAULT_RELAY_CAPACITY)
                .max(1),
        };

        Ok(Self {
            default_vehicle,
            backend,
            server,
        })
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable could not be parsed.
    #[error("environment variable {key} has invalid value {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Rejected value.
        value: String,
    },
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    let value = lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyValue(key.to_string()));
    }
    Ok(value)
}

fn with_scheme(addr: &str) -> String {
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{addr}")
    }
}

fn parse_duration_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Duration {
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map_or(default, Duration::from_millis)
}

fn parse_duration_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Duration {
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        ("OB_SERVER_ADDR", "localhost:50051"),
        ("DEFAULT_VEHICLE", "VIN123456789"),
        ("GATEWAY_PORT", "8080"),
    ];

    fn with(overrides: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        let mut pairs: Vec<_> = BASE
            .iter()
            .filter(|(k, _)| !overrides.iter().any(|(o, _)| o == k))
            .copied()
            .collect();
        pairs.extend_from_slice(overrides);
        pairs
    }

    #[test]
    fn loads_required_values_and_defaults() {
        let config = GatewayConfig::from_lookup(lookup_from(&BASE)).unwrap();
        assert_eq!(config.default_vehicle.as_str(), "VIN123456789");
        assert_eq!(config.backend.endpoint, "http://localhost:50051");
        assert_eq!(config.backend.unary_timeout, Duration::from_secs(2));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(config.server.relay_capacity, 1);
    }

    #[test]
    fn keeps_explicit_scheme() {
        let pairs = with(&[("OB_SERVER_ADDR", "https://obd.internal:443")]);
        let config = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.backend.endpoint, "https://obd.internal:443");
    }

    #[test]
    fn missing_values_are_reported_by_name() {
        for key in ["OB_SERVER_ADDR", "DEFAULT_VEHICLE", "GATEWAY_PORT"] {
            let pairs: Vec<_> = BASE.iter().filter(|(k, _)| *k != key).copied().collect();
            let err = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert_eq!(err, ConfigError::MissingEnvVar(key.to_string()));
        }
    }

    #[test]
    fn empty_values_are_rejected() {
        let pairs = with(&[("DEFAULT_VEHICLE", "  ")]);
        let err = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::EmptyValue("DEFAULT_VEHICLE".to_string()));
    }

    #[test]
    fn invalid_port_is_rejected() {
        for port in ["0", "70000", "http"] {
            let pairs = with(&[("GATEWAY_PORT", port)]);
            let err = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue { ref key, .. } if key == "GATEWAY_PORT"
            ));
        }
    }

    #[test]
    fn optional_overrides() {
        let pairs = with(&[
            ("GATEWAY_UNARY_TIMEOUT_MS", "750"),
            ("GATEWAY_SHUTDOWN_TIMEOUT_SECS", "12"),
            ("GATEWAY_RELAY_CAPACITY", "0"),
        ]);
        let config = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.backend.unary_timeout, Duration::from_millis(750));
        assert_eq!(config.server.shutdown_timeout, Duration::from_secs(12));
        assert_eq!(config.server.relay_capacity, 1);
    }

    #[test]
    fn unparseable_optionals_fall_back() {
        let pairs = with(&[
            ("GATEWAY_UNARY_TIMEOUT_MS", "soon"),
            ("GATEWAY_RELAY_CAPACITY", "-2"),
        ]);
        let config = GatewayConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.backend.unary_timeout, Duration::from_secs(2));
        assert_eq!(config.server.relay_capacity, 1);
    }
}

//! Vehicle Signal Types
//!
//! Canonical internal representation of the signals the gateway exposes.
//! Readings are passed through exactly as the backend reports them; the
//! gateway never clamps or validates sensor values.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Identity of the vehicle a request targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VehicleId(String);

impl VehicleId {
    /// Create a vehicle identity.
    ///
    /// # Errors
    ///
    /// Returns `VehicleIdError::Empty` if `id` is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, VehicleIdError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(VehicleIdError::Empty);
        }
        Ok(Self(id))
    }

    /// Get the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for VehicleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Invalid vehicle identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VehicleIdError {
    /// Identity was empty.
    #[error("vehicle id cannot be empty")]
    Empty,
}

/// One timestamped fuel level sample.
///
/// A plain value: copying a reading never touches backend resources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelReading {
    #[serde(serialize_with = "serialize_finite_level")]
    level_percent: f32,
    timestamp_ms: u64,
    status: i32,
}

impl FuelReading {
    /// Create a reading from backend-reported values.
    #[must_use]
    pub const fn new(level_percent: f32, timestamp_ms: u64, status: i32) -> Self {
        Self {
            level_percent,
            timestamp_ms,
            status,
        }
    }

    /// Fuel level in percent. Usually 0-100, but not guaranteed.
    #[must_use]
    pub const fn level_percent(&self) -> f32 {
        self.level_percent
    }

    /// Capture time assigned by the producer, in Unix milliseconds.
    #[must_use]
    pub const fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Backend status code. Opaque to the gateway.
    #[must_use]
    pub const fn status(&self) -> i32 {
        self.status
    }
}

/// JSON has no encoding for NaN or infinity, so such levels fail to serialize
/// instead of silently turning into `null`.
fn serialize_finite_level<S: Serializer>(level: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    if level.is_finite() {
        serializer.serialize_f32(*level)
    } else {
        Err(serde::ser::Error::custom(format!(
            "level_percent {level} is not representable in JSON"
        )))
    }
}

/// Current headlight state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlightState {
    /// Whether the headlights are on.
    #[serde(rename = "headlight_state")]
    pub headlight_on: bool,
}

/// Requested headlight change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct HeadlightCommand {
    /// Turn the headlights on (`true`) or off (`false`).
    #[serde(default)]
    pub turn_on: bool,
}

impl HeadlightCommand {
    /// Command name reported back to the caller.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        if self.turn_on {
            "turn_headlights_on"
        } else {
            "turn_headlights_off"
        }
    }
}

//! Application Services
//!
//! Services that orchestrate the vehicle backend port.
//!
//! - `relay`: bridges one backend fuel stream to one bounded relay channel

pub mod relay;

pub use relay::{FuelRelay, RelayConfig, RelayHandle, RelayOutcome, RelaySummary};

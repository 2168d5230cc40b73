//! HTTP Front End
//!
//! Axum router for the vehicle API.
//!
//! # Endpoints
//!
//! - `GET /api/v1/vehicle/data/fuel_level` - One fuel reading
//! - `GET /api/v1/vehicle/stream/fuel_level` - Fuel readings as Server-Sent Events
//! - `GET /api/v1/vehicle/lighting/headlights` - Headlight state
//! - `PUT /api/v1/vehicle/lighting/headlights` - Switch headlights
//!
//! Health and metrics routes from `infrastructure::health` are merged into
//! the same router.

mod envelope;
mod error;
mod fuel;
mod lighting;
mod router;
mod server;
mod session;
mod sse;

pub use error::ApiError;
pub use router::{AppState, build_router};
pub use server::{GatewayServer, GatewayServerError};
pub use session::{SessionScope, StreamSessions};

//! gRPC Backend Adapter
//!
//! Talks to the vehicle backend over one shared `tonic` channel.
//!
//! - `client`: `GrpcVehicleSignals`, the `VehicleSignalsPort` implementation
//! - `status`: last known backend reachability, read by the health routes
//!
//! The generated code lives in `packages/schema-gen/rust/`. `obd.rs` and
//! `lighting.rs` include their `.tonic.rs` companions at the end.

mod client;
mod status;

#[allow(
    dead_code,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
pub mod proto {
    pub mod obd {
        include!("../../../../../packages/schema-gen/rust/obd/obd.rs");
    }
    pub mod lighting {
        include!("../../../../../packages/schema-gen/rust/lighting/lighting.rs");
    }
}

pub use client::GrpcVehicleSignals;
pub use status::{BackendSnapshot, BackendState, BackendStatus};

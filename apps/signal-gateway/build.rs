//! Build Script for Signal Gateway
//!
//! Protobuf stubs are checked in under `packages/schema-gen/rust/` and
//! included directly, so the build needs neither `protoc` nor `buf`. This
//! script only tracks those files and handles coverage detection.

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Rebuild when the checked-in stubs are regenerated
    println!("cargo:rerun-if-changed=../../packages/schema-gen/rust/");

    // Emit cfg for coverage detection
    // Usage: #[cfg(coverage)] or #[cfg(not(coverage))]
    if env::var("CARGO_LLVM_COV").is_ok()
        || env::var("LLVM_PROFILE_FILE").is_ok()
        || env::var("RUSTFLAGS")
            .map(|f| f.contains("instrument-coverage"))
            .unwrap_or(false)
    {
        println!("cargo:rustc-cfg=coverage");
    }
}

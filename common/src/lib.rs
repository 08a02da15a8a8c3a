//! Shared building blocks for the topomap crates.
//!
//! Holds the discovery models, the run configuration, numeric object
//! identifiers and the host-side network helpers (CIDR ranges, local subnet
//! and default gateway lookup).

pub mod config;
pub mod device;
pub mod network;
pub mod oid;

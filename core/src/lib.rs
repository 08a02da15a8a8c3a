//! SNMP discovery engine.
//!
//! [`probe`] identifies single hosts, [`scanner`] sweeps a subnet and
//! [`topology`] follows LLDP/ARP adjacency outward from a seed device. All of
//! them reach agents through the [`snmp::Transport`] seam.

pub mod classify;
pub mod metrics;
pub mod neighbors;
pub mod probe;
pub mod scanner;
pub mod snmp;
pub mod topology;

pub use neighbors::{NeighborResolver, NeighborSource, Neighbors};
pub use probe::{ProbeError, Prober};
pub use scanner::SubnetScanner;
pub use topology::TopologyWalker;

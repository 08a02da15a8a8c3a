//! A small scripted network shared by the integration tests.

use std::net::Ipv4Addr;
use std::sync::Arc;

use topomap_common::config::Config;
use topomap_core::snmp::memory::{Agent, MemoryTransport};
use topomap_core::{NeighborResolver, Prober, SubnetScanner, TopologyWalker};

pub fn ip(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(172, 16, 0, last)
}

pub fn mac(last: u8) -> [u8; 6] {
    [0x02, 0x00, 0x5e, 0x10, 0x00, last]
}

/// An agent whose ARP table lists the given hosts of the lab subnet.
pub fn linux_host(name: &str, arp: &[u8]) -> Agent {
    arp.iter().fold(
        Agent::host(name, "Linux 6.1.0-18-amd64 #1 SMP x86_64"),
        |agent, last| agent.with_arp_entry(2, ip(*last), mac(*last)),
    )
}

pub fn prober(transport: &MemoryTransport, cfg: &Config) -> Arc<Prober> {
    Arc::new(Prober::new(Arc::new(transport.clone()), cfg))
}

pub fn scanner(transport: &MemoryTransport, cfg: &Config) -> SubnetScanner {
    SubnetScanner::new(prober(transport, cfg), cfg.scan_concurrency)
}

pub fn walker(transport: &MemoryTransport, cfg: &Config) -> TopologyWalker {
    let resolver = NeighborResolver::new(Arc::new(transport.clone()), cfg);
    TopologyWalker::new(prober(transport, cfg), Arc::new(resolver), cfg)
}

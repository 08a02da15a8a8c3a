use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::time::Duration;

use topomap_common::config::{Config, RouterPolicy};
use topomap_common::device::DiscoveredDevice;
use topomap_core::NeighborSource;
use topomap_core::snmp::memory::MemoryTransport;

use super::lab::{ip, linux_host, mac, walker};

fn reached(devices: &[DiscoveredDevice]) -> HashSet<Ipv4Addr> {
    devices.iter().map(|d| d.ip_address).collect()
}

/// R (router) → A → B, each only aware of its direct neighbors.
fn chain() -> MemoryTransport {
    MemoryTransport::new([
        (
            ip(1),
            linux_host("core-rtr", &[2]).with_route(Ipv4Addr::new(0, 0, 0, 0)),
        ),
        (ip(2), linux_host("a", &[1, 3])),
        (ip(3), linux_host("b", &[2])),
    ])
}

#[tokio::test]
async fn walk_expands_routers_by_default() {
    let transport = chain();
    let devices = walker(&transport, &Config::default()).walk(ip(1)).await;

    assert_eq!(reached(&devices), HashSet::from([ip(1), ip(2), ip(3)]));
}

#[tokio::test]
async fn walk_stops_at_routers_when_asked() {
    let transport = chain();
    let cfg = Config {
        router_policy: RouterPolicy::Stop,
        ..Config::default()
    };

    let devices = walker(&transport, &cfg).walk(ip(1)).await;

    assert_eq!(reached(&devices), HashSet::from([ip(1)]));
    assert_eq!(transport.connects(ip(2)), 0, "A must never be contacted");
}

#[tokio::test]
async fn cyclic_mesh_terminates_with_one_probe_per_host() {
    let mesh = [1u8, 2, 3, 4];
    let transport = MemoryTransport::new(mesh.map(|last| {
        let others: Vec<u8> = mesh.iter().copied().filter(|o| *o != last).collect();
        (ip(last), linux_host(&format!("n{last}"), &others))
    }))
    .with_latency(Duration::from_millis(2));

    let devices = tokio::time::timeout(
        Duration::from_secs(10),
        walker(&transport, &Config::default()).walk(ip(1)),
    )
    .await
    .expect("walk over a cycle must terminate");

    assert_eq!(devices.len(), 4);
    for last in mesh {
        assert_eq!(
            transport.identity_probes(ip(last)),
            1,
            "{} probed more than once",
            ip(last)
        );
    }
}

#[tokio::test]
async fn lldp_neighbors_replace_the_arp_table() {
    // The switch knows A, B and C via ARP but only B is an LLDP neighbor.
    let switch = linux_host("sw1", &[2, 3, 4]).with_lldp_chassis(7, 1, &mac(3));
    let transport = MemoryTransport::new([
        (ip(1), switch),
        (ip(2), linux_host("a", &[])),
        (ip(3), linux_host("b", &[])),
        (ip(4), linux_host("c", &[])),
    ]);

    let devices = walker(&transport, &Config::default()).walk(ip(1)).await;

    assert_eq!(reached(&devices), HashSet::from([ip(1), ip(3)]));
    assert_eq!(transport.connects(ip(2)), 0);
}

#[tokio::test]
async fn lldp_duplicates_keep_first_seen_order() {
    let switch = linux_host("sw1", &[2, 3, 4])
        .with_lldp_chassis(1, 1, &mac(2))
        .with_lldp_chassis(2, 1, &mac(3))
        .with_lldp_chassis(3, 1, &mac(2))
        .with_lldp_chassis(4, 1, &mac(4));
    let transport = MemoryTransport::new([(ip(1), switch)]);

    let resolver = topomap_core::NeighborResolver::new(
        std::sync::Arc::new(transport.clone()),
        &Config::default(),
    );
    let neighbors = resolver.resolve(ip(1)).await.unwrap();

    assert_eq!(neighbors.source, NeighborSource::Lldp);
    assert_eq!(neighbors.addresses, vec![ip(2), ip(3), ip(4)]);
}

#[tokio::test]
async fn unbounded_walk_reaches_the_same_devices() {
    let transport = chain();
    let cfg = Config {
        walk_concurrency: 0,
        ..Config::default()
    };

    let devices = walker(&transport, &cfg).walk(ip(1)).await;
    assert_eq!(devices.len(), 3);
}

#[tokio::test]
async fn walk_concurrency_bounds_open_sessions() {
    let leaves: Vec<u8> = (10..50).collect();
    let hub = linux_host("hub", &leaves);
    let agents = std::iter::once((ip(1), hub)).chain(
        leaves
            .iter()
            .map(|last| (ip(*last), linux_host(&format!("leaf{last}"), &[1]))),
    );
    let transport = MemoryTransport::new(agents).with_latency(Duration::from_millis(2));
    let cfg = Config {
        walk_concurrency: 4,
        ..Config::default()
    };

    let devices = walker(&transport, &cfg).walk(ip(1)).await;

    assert_eq!(devices.len(), 41, "Hub and every leaf reached");
    assert!(
        transport.peak_open_sessions() <= 4,
        "Peak of {} sessions exceeds the walk bound",
        transport.peak_open_sessions()
    );
}

#[tokio::test]
async fn switch_without_lldp_is_expanded_through_arp() {
    let switch = linux_host("sw1", &[2, 3])
        .with_lldp_chassis(1, 1, &mac(2))
        .with_broken_subtree(topomap_core::snmp::mib::LLDP_REM_CHASSIS_ID);
    let transport = MemoryTransport::new([
        (ip(1), switch),
        (ip(2), linux_host("a", &[])),
        (ip(3), linux_host("b", &[])),
    ]);

    let devices = walker(&transport, &Config::default()).walk(ip(1)).await;

    assert_eq!(reached(&devices), HashSet::from([ip(1), ip(2), ip(3)]));
}

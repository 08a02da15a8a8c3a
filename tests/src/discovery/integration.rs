#![cfg(test)]
use std::net::Ipv4Addr;
use std::time::Duration;

use topomap_common::config::Config;
use topomap_common::device::OsFamily;
use topomap_core::snmp::Value;
use topomap_core::snmp::memory::{Agent, MemoryTransport};
use topomap_core::snmp::mib;

use super::lab::{ip, linux_host, scanner};

#[tokio::test]
async fn sweep_finds_single_responder_without_edge_addresses() {
    let transport = MemoryTransport::new([(ip(20), linux_host("nas", &[]))]);

    let devices = scanner(&transport, &Config::default())
        .scan("172.16.0.0/24")
        .await
        .expect("sweep should accept a valid block");

    assert_eq!(devices.len(), 1, "Expected exactly one device");
    assert_eq!(devices[0].ip_address, ip(20));
    assert_eq!(devices[0].name, "nas");
    assert_eq!(transport.total_connects(), 254, "Every host address probed once");
    assert_eq!(transport.connects(ip(0)), 0, "Network address must not be probed");
    assert_eq!(transport.connects(ip(255)), 0, "Broadcast address must not be probed");
}

#[tokio::test]
async fn sweep_respects_concurrency_bound() {
    let transport = MemoryTransport::new([(ip(7), linux_host("h7", &[]))])
        .with_latency(Duration::from_millis(3));
    let cfg = Config {
        scan_concurrency: 16,
        ..Config::default()
    };

    let devices = scanner(&transport, &cfg).scan("172.16.0.0/25").await.unwrap();

    assert_eq!(devices.len(), 1);
    assert!(
        transport.peak_open_sessions() <= 16,
        "Peak of {} sessions exceeds the bound",
        transport.peak_open_sessions()
    );
}

#[tokio::test]
async fn sweep_rejects_malformed_block() {
    let transport = MemoryTransport::default();

    let result = scanner(&transport, &Config::default())
        .scan("172.16.0.0/40")
        .await;

    assert!(result.is_err(), "A /40 prefix should be rejected");
    assert_eq!(transport.total_connects(), 0, "No probe may start on bad input");
}

#[tokio::test]
async fn sweep_classifies_and_collects_metrics_per_family() {
    let windows = Agent::host(
        "dc01",
        "Hardware: Intel64 Family 6 - Software: Windows Version 6.3 (Build 17763 Multiprocessor Free)",
    )
    .with(mib::WIN_CPU_LOAD, Value::Integer(23))
    .with(mib::WIN_MEM_TOTAL, Value::Integer(16_777_216))
    .with(mib::WIN_PROCESSES, Value::Unsigned32(142));

    let unix = linux_host("web01", &[])
        .with(mib::UNIX_CPU_USER, Value::Integer(4))
        .with(mib::UNIX_CPU_IDLE, Value::Integer(93))
        .with(mib::UNIX_MEM_TOTAL, Value::Integer(4_028_440))
        .with(mib::UNIX_MEM_FREE, Value::Integer(1_204_112));

    let transport = MemoryTransport::new([(ip(10), windows), (ip(11), unix)]);
    let mut devices = scanner(&transport, &Config::default())
        .scan_addresses([ip(10), ip(11), ip(12)])
        .await;
    devices.sort_by_key(|d| d.ip_address);

    assert_eq!(devices.len(), 2);

    let dc = &devices[0];
    assert_eq!(dc.os_family, OsFamily::Windows);
    assert_eq!(dc.metrics.cpu_usage_percent(), Some(23));
    assert_eq!(dc.metrics.mem_total_kb(), Some(16_777_216));
    assert_eq!(dc.metrics.process_count(), Some(142));
    assert!(dc.metrics.cpu_idle.is_empty(), "Windows set has no idle counter");

    let web = &devices[1];
    assert_eq!(web.os_family, OsFamily::Unix);
    assert_eq!(web.metrics.cpu_idle_percent(), Some(93));
    assert_eq!(web.metrics.mem_free_kb(), Some(1_204_112));
    assert_eq!(web.metrics.process_count(), None);
}

#[tokio::test]
async fn probe_of_silent_host_is_absent() {
    let transport = MemoryTransport::default();
    let devices = scanner(&transport, &Config::default())
        .scan_addresses([Ipv4Addr::new(192, 0, 2, 1)])
        .await;
    assert!(devices.is_empty());
}

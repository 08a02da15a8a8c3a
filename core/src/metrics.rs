//! OS-specific performance counters.

use topomap_common::device::{DeviceMetrics, OsFamily};
use tracing::debug;

use crate::snmp::mib::{self, oid};
use crate::snmp::{Session, SnmpError};

#[derive(Debug, Clone, Copy)]
enum Field {
    CpuUsage,
    CpuIdle,
    MemTotal,
    MemFree,
    Processes,
}

const WINDOWS_SET: &[(&[u32], Field)] = &[
    (mib::WIN_CPU_LOAD, Field::CpuUsage),
    (mib::WIN_MEM_TOTAL, Field::MemTotal),
    (mib::WIN_PROCESSES, Field::Processes),
];

const UNIX_SET: &[(&[u32], Field)] = &[
    (mib::UNIX_CPU_USER, Field::CpuUsage),
    (mib::UNIX_CPU_IDLE, Field::CpuIdle),
    (mib::UNIX_MEM_TOTAL, Field::MemTotal),
    (mib::UNIX_PROCESSES, Field::Processes),
    (mib::UNIX_MEM_FREE, Field::MemFree),
];

/// Fetches the metric set of `family` over an open session.
pub async fn collect(
    session: &mut dyn Session,
    family: OsFamily,
) -> Result<DeviceMetrics, SnmpError> {
    let set = match family {
        OsFamily::Windows => WINDOWS_SET,
        OsFamily::Unix => UNIX_SET,
    };
    debug!(%family, "Collecting device metrics");

    let oids: Vec<_> = set.iter().map(|(arcs, _)| oid(arcs)).collect();
    let varbinds = session.get(&oids).await?;

    let mut metrics = DeviceMetrics::default();
    for varbind in varbinds {
        let Some((_, field)) = set.iter().find(|(arcs, _)| varbind.oid.arcs() == *arcs) else {
            continue;
        };
        let reading = varbind.value.to_string();
        match field {
            Field::CpuUsage => metrics.cpu_usage = reading,
            Field::CpuIdle => metrics.cpu_idle = reading,
            Field::MemTotal => metrics.mem_total_kb = reading,
            Field::MemFree => metrics.mem_free_kb = reading,
            Field::Processes => metrics.processes = reading,
        }
    }

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::memory::{Agent, MemoryTransport};
    use crate::snmp::{SessionOptions, Transport, Value};
    use std::net::Ipv4Addr;

    const HOST: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 7);

    fn full_agent() -> Agent {
        Agent::host("box", "any")
            .with(mib::WIN_CPU_LOAD, Value::Integer(17))
            .with(mib::WIN_MEM_TOTAL, Value::Integer(8_388_608))
            .with(mib::WIN_PROCESSES, Value::Unsigned32(143))
            .with(mib::UNIX_CPU_USER, Value::Integer(4))
            .with(mib::UNIX_CPU_IDLE, Value::Integer(93))
            .with(mib::UNIX_MEM_TOTAL, Value::Integer(16_314_512))
            .with(mib::UNIX_PROCESSES, Value::Integer(9_870_112))
            .with(mib::UNIX_MEM_FREE, Value::Integer(10_442_300))
    }

    async fn metrics_for(family: OsFamily) -> DeviceMetrics {
        let transport = MemoryTransport::new([(HOST, full_agent())]);
        let mut session = transport
            .connect(HOST, &SessionOptions::default())
            .await
            .unwrap();
        collect(session.as_mut(), family).await.unwrap()
    }

    #[tokio::test]
    async fn windows_set_fills_host_resources_fields() {
        let metrics = metrics_for(OsFamily::Windows).await;
        assert_eq!(metrics.cpu_usage, "17");
        assert_eq!(metrics.mem_total_kb, "8388608");
        assert_eq!(metrics.processes, "143");
        assert!(metrics.cpu_idle.is_empty());
        assert!(metrics.mem_free_kb.is_empty());
    }

    #[tokio::test]
    async fn unix_set_fills_ucd_fields() {
        let metrics = metrics_for(OsFamily::Unix).await;
        assert_eq!(metrics.cpu_usage_percent(), Some(4));
        assert_eq!(metrics.cpu_idle_percent(), Some(93));
        assert_eq!(metrics.mem_total_kb(), Some(16_314_512));
        assert_eq!(metrics.process_count(), Some(9_870_112));
        assert_eq!(metrics.mem_free_kb(), Some(10_442_300));
    }

    #[tokio::test]
    async fn unreported_counters_stay_empty() {
        let transport = MemoryTransport::new([(HOST, Agent::host("bare", "Linux"))]);
        let mut session = transport
            .connect(HOST, &SessionOptions::default())
            .await
            .unwrap();
        let metrics = collect(session.as_mut(), OsFamily::Unix).await.unwrap();
        assert!(metrics.is_empty());
    }
}

//! # Protocol Probe
//!
//! Identifies a single host: one short-lived session, the three system
//! attributes, then the metric set matching the host's OS family.

use std::net::Ipv4Addr;
use std::sync::Arc;

use thiserror::Error;
use topomap_common::config::Config;
use topomap_common::device::DiscoveredDevice;
use tracing::{debug, trace};

use crate::classify::{CapabilityProbe, DescriptionClassifier, OsClassifier, RoleClassifier};
use crate::metrics;
use crate::snmp::mib::{self, oid};
use crate::snmp::{SessionOptions, SnmpError, Transport};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("SNMP connect to {ip} failed: {source}")]
    Connect {
        ip: Ipv4Addr,
        #[source]
        source: SnmpError,
    },
    #[error("SNMP get on {ip} failed: {source}")]
    Get {
        ip: Ipv4Addr,
        #[source]
        source: SnmpError,
    },
}

/// Probes hosts through a shared [`Transport`].
#[derive(Clone)]
pub struct Prober {
    transport: Arc<dyn Transport>,
    probe_options: SessionOptions,
    walk_options: SessionOptions,
    os_classifier: Arc<dyn OsClassifier>,
    role_classifier: Arc<dyn RoleClassifier>,
}

impl Prober {
    pub fn new(transport: Arc<dyn Transport>, cfg: &Config) -> Self {
        Self {
            transport,
            probe_options: SessionOptions::probe(cfg),
            walk_options: SessionOptions::walk(cfg),
            os_classifier: Arc::new(DescriptionClassifier),
            role_classifier: Arc::new(CapabilityProbe),
        }
    }

    pub fn with_os_classifier(mut self, classifier: impl OsClassifier + 'static) -> Self {
        self.os_classifier = Arc::new(classifier);
        self
    }

    pub fn with_role_classifier(mut self, classifier: impl RoleClassifier + 'static) -> Self {
        self.role_classifier = Arc::new(classifier);
        self
    }

    /// Fetches name, uptime and description, then the OS-specific metrics.
    ///
    /// Missing metrics never fail the probe; they are left empty.
    pub async fn probe(&self, ip: Ipv4Addr) -> Result<DiscoveredDevice, ProbeError> {
        let mut session = self
            .transport
            .connect(ip, &self.probe_options)
            .await
            .map_err(|source| ProbeError::Connect { ip, source })?;

        let varbinds = session
            .get(&[oid(mib::SYS_NAME), oid(mib::SYS_UPTIME), oid(mib::SYS_DESCR)])
            .await
            .map_err(|source| ProbeError::Get { ip, source })?;

        let mut device = DiscoveredDevice::new(ip);
        for varbind in varbinds {
            let value = varbind.value.to_string();
            match varbind.oid.arcs() {
                arcs if arcs == mib::SYS_NAME => device.name = value,
                arcs if arcs == mib::SYS_UPTIME => device.up_time = value,
                arcs if arcs == mib::SYS_DESCR => device.sys_description = value,
                _ => {}
            }
        }

        device.os_family = self.os_classifier.classify(&device.sys_description);
        trace!(ip = %ip, os = %device.os_family, "Classified host");

        match metrics::collect(session.as_mut(), device.os_family).await {
            Ok(metrics) => {
                if metrics.is_empty() {
                    debug!(ip = %ip, os = %device.os_family, "Agent reported no metrics");
                }
                Ok(device.with_metrics(metrics))
            }
            Err(e) => {
                debug!(ip = %ip, error = %e, "Metrics unavailable");
                Ok(device)
            }
        }
    }

    /// Capability check on a fresh session. An unreachable host is neither.
    pub async fn is_router_or_switch(&self, ip: Ipv4Addr) -> bool {
        match self.transport.connect(ip, &self.walk_options).await {
            Ok(mut session) => {
                self.role_classifier
                    .is_router_or_switch(session.as_mut())
                    .await
            }
            Err(e) => {
                debug!(ip = %ip, error = %e, "Role check skipped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::Value;
    use crate::snmp::memory::{Agent, MemoryTransport};
    use topomap_common::device::OsFamily;

    const HOST: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);

    fn prober(transport: MemoryTransport) -> Prober {
        Prober::new(Arc::new(transport), &Config::default())
    }

    #[tokio::test]
    async fn probe_reads_identity_and_unix_metrics() {
        let agent = Agent::host("nas", "Linux nas 5.10.0-21-amd64")
            .with(mib::UNIX_CPU_USER, Value::Integer(3))
            .with(mib::UNIX_CPU_IDLE, Value::Integer(96));
        let device = prober(MemoryTransport::new([(HOST, agent)]))
            .probe(HOST)
            .await
            .unwrap();

        assert_eq!(device.ip_address, HOST);
        assert_eq!(device.name, "nas");
        assert_eq!(device.up_time, "123456");
        assert_eq!(device.os_family, OsFamily::Unix);
        assert_eq!(device.metrics.cpu_usage, "3");
        assert_eq!(device.metrics.cpu_idle, "96");
    }

    #[tokio::test]
    async fn probe_selects_windows_metrics() {
        let agent = Agent::host("dc01", "Hardware: x64 - Software: Windows Server 2019")
            .with(mib::WIN_CPU_LOAD, Value::Integer(41))
            .with(mib::UNIX_CPU_USER, Value::Integer(99));
        let device = prober(MemoryTransport::new([(HOST, agent)]))
            .probe(HOST)
            .await
            .unwrap();

        assert_eq!(device.os_family, OsFamily::Windows);
        assert_eq!(device.metrics.cpu_usage, "41");
    }

    #[tokio::test]
    async fn missing_attributes_stay_empty() {
        let agent = Agent::new().with(mib::SYS_DESCR, Value::OctetString(b"Linux".to_vec()));
        let device = prober(MemoryTransport::new([(HOST, agent)]))
            .probe(HOST)
            .await
            .unwrap();

        assert!(device.name.is_empty());
        assert!(device.up_time.is_empty());
        assert_eq!(device.display_name(), "192.168.1.10");
    }

    #[tokio::test]
    async fn silent_host_is_a_connect_error() {
        let result = prober(MemoryTransport::default()).probe(HOST).await;
        assert!(matches!(result, Err(ProbeError::Connect { ip, .. }) if ip == HOST));
    }

    #[tokio::test]
    async fn role_check_on_silent_host_is_false() {
        assert!(!prober(MemoryTransport::default()).is_router_or_switch(HOST).await);
    }

    struct AlwaysWindows;

    impl OsClassifier for AlwaysWindows {
        fn classify(&self, _description: &str) -> OsFamily {
            OsFamily::Windows
        }
    }

    #[tokio::test]
    async fn classifier_can_be_replaced() {
        let transport = MemoryTransport::new([(HOST, Agent::host("pc", "Linux"))]);
        let device = prober(transport)
            .with_os_classifier(AlwaysWindows)
            .probe(HOST)
            .await
            .unwrap();
        assert_eq!(device.os_family, OsFamily::Windows);
    }
}

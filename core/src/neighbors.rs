//! # Neighbor Resolver
//!
//! Finds the addresses adjacent to a device. LLDP chassis IDs name the
//! neighbors, the ARP table turns those hardware addresses into IPs. When LLDP
//! yields nothing, the ARP table itself is the neighbor list.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;

use pnet::util::MacAddr;
use thiserror::Error;
use topomap_common::config::Config;
use topomap_common::network::mac;
use tracing::{debug, trace};

use crate::snmp::mib::{self, oid};
use crate::snmp::{Session, SessionOptions, SnmpError, Transport};

#[derive(Debug, Error)]
pub enum NeighborError {
    #[error("SNMP connect to {ip} failed: {source}")]
    Connect {
        ip: Ipv4Addr,
        #[source]
        source: SnmpError,
    },
    #[error("ARP table walk on {ip} failed: {source}")]
    ArpWalk {
        ip: Ipv4Addr,
        #[source]
        source: SnmpError,
    },
}

/// Where a neighbor list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborSource {
    Lldp,
    Arp,
}

impl fmt::Display for NeighborSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighborSource::Lldp => write!(f, "LLDP"),
            NeighborSource::Arp => write!(f, "ARP"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbors {
    pub source: NeighborSource,
    pub addresses: Vec<Ipv4Addr>,
}

/// Walks `ipNetToMediaPhysAddress` into a hardware address → IP map.
///
/// Rows whose value is not a 6-byte MAC, or whose index does not end in an
/// address, are skipped.
pub async fn arp_map(session: &mut dyn Session) -> Result<HashMap<MacAddr, Ipv4Addr>, SnmpError> {
    let mut map = HashMap::new();
    session
        .walk(&oid(mib::ARP_PHYS_ADDRESS), &mut |varbind| {
            let hw = varbind.value.as_bytes().and_then(mac::from_octets);
            if let (Some(hw), Some(ip)) = (hw, varbind.oid.trailing_ipv4()) {
                map.insert(hw, ip);
            }
        })
        .await?;
    Ok(map)
}

/// Walks `ipNetToMediaIfIndex` and reads every row index as an address.
pub async fn arp_addresses(session: &mut dyn Session) -> Result<Vec<Ipv4Addr>, SnmpError> {
    let mut seen = HashSet::new();
    let mut addresses = Vec::new();
    session
        .walk(&oid(mib::ARP_IF_INDEX), &mut |varbind| {
            if let Some(ip) = varbind.oid.trailing_ipv4() {
                if seen.insert(ip) {
                    addresses.push(ip);
                }
            }
        })
        .await?;
    Ok(addresses)
}

/// Walks `lldpRemChassisId`, keeping the payloads that are MAC addresses.
pub async fn lldp_chassis_macs(session: &mut dyn Session) -> Result<Vec<MacAddr>, SnmpError> {
    let mut macs = Vec::new();
    session
        .walk(&oid(mib::LLDP_REM_CHASSIS_ID), &mut |varbind| {
            if let Some(hw) = varbind.value.as_bytes().and_then(mac::from_octets) {
                macs.push(hw);
            }
        })
        .await?;
    Ok(macs)
}

/// Maps chassis MACs to IPs. Unknown MACs are dropped, repeats keep their
/// first position.
pub fn correlate(chassis: &[MacAddr], arp: &HashMap<MacAddr, Ipv4Addr>) -> Vec<Ipv4Addr> {
    let mut seen = HashSet::new();
    chassis
        .iter()
        .filter_map(|hw| arp.get(hw).copied())
        .filter(|ip| seen.insert(*ip))
        .collect()
}

#[derive(Clone)]
pub struct NeighborResolver {
    transport: Arc<dyn Transport>,
    options: SessionOptions,
}

impl NeighborResolver {
    pub fn new(transport: Arc<dyn Transport>, cfg: &Config) -> Self {
        Self {
            transport,
            options: SessionOptions::walk(cfg),
        }
    }

    async fn open(&self, ip: Ipv4Addr) -> Result<Box<dyn Session>, NeighborError> {
        self.transport
            .connect(ip, &self.options)
            .await
            .map_err(|source| NeighborError::Connect { ip, source })
    }

    /// LLDP neighbors of `ip` that also appear in its ARP table.
    ///
    /// A failed ARP walk is an error. A failed LLDP walk only means the
    /// device does not speak LLDP and yields an empty list.
    pub async fn lldp_neighbors(&self, ip: Ipv4Addr) -> Result<Vec<Ipv4Addr>, NeighborError> {
        let mut session = self.open(ip).await?;

        let arp = arp_map(session.as_mut())
            .await
            .map_err(|source| NeighborError::ArpWalk { ip, source })?;

        let chassis = match lldp_chassis_macs(session.as_mut()).await {
            Ok(chassis) => chassis,
            Err(e) => {
                trace!(ip = %ip, error = %e, "LLDP walk failed");
                return Ok(Vec::new());
            }
        };

        Ok(correlate(&chassis, &arp))
    }

    /// Every address in the ARP table of `ip`.
    pub async fn arp_neighbors(&self, ip: Ipv4Addr) -> Result<Vec<Ipv4Addr>, NeighborError> {
        let mut session = self.open(ip).await?;
        arp_addresses(session.as_mut())
            .await
            .map_err(|source| NeighborError::ArpWalk { ip, source })
    }

    /// LLDP neighbors when there are any, the ARP table otherwise.
    /// The two lists are never merged.
    pub async fn resolve(&self, ip: Ipv4Addr) -> Result<Neighbors, NeighborError> {
        match self.lldp_neighbors(ip).await {
            Ok(addresses) if !addresses.is_empty() => {
                return Ok(Neighbors {
                    source: NeighborSource::Lldp,
                    addresses,
                });
            }
            Ok(_) => trace!(ip = %ip, "No LLDP neighbors"),
            Err(e) => debug!(ip = %ip, error = %e, "LLDP resolution failed"),
        }

        let addresses = self.arp_neighbors(ip).await?;
        Ok(Neighbors {
            source: NeighborSource::Arp,
            addresses,
        })
    }
}

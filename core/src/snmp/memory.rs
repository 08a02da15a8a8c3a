//! In-memory SNMP agents.
//!
//! Each [`Agent`] is an ordered OID table; [`MemoryTransport`] routes
//! sessions to agents by address and keeps counters that tests assert on
//! (connects, identity probes, peak number of open sessions).

use std::collections::{BTreeMap, HashMap};
use std::net::Ipv4Addr;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use topomap_common::oid::Oid;

use super::mib::{self, oid};
use super::{Session, SessionOptions, SnmpError, Transport, Value, VarBind};

/// A scripted agent.
#[derive(Debug, Clone, Default)]
pub struct Agent {
    entries: BTreeMap<Oid, Value>,
    broken_subtrees: Vec<Oid>,
}

impl Agent {
    pub fn new() -> Self {
        Self::default()
    }

    /// An agent answering the identity probe with the given name and description.
    pub fn host(name: &str, description: &str) -> Self {
        Self::new()
            .with(mib::SYS_NAME, Value::OctetString(name.as_bytes().to_vec()))
            .with(mib::SYS_UPTIME, Value::Timeticks(123_456))
            .with(mib::SYS_DESCR, Value::OctetString(description.as_bytes().to_vec()))
    }

    pub fn with(mut self, arcs: &[u32], value: Value) -> Self {
        self.entries.insert(oid(arcs), value);
        self
    }

    /// Adds one ARP row (`ifIndex.a.b.c.d`) with its hardware address.
    pub fn with_arp_entry(mut self, if_index: u32, ip: Ipv4Addr, mac: [u8; 6]) -> Self {
        let index: Vec<u32> = std::iter::once(if_index)
            .chain(ip.octets().iter().map(|o| u32::from(*o)))
            .collect();

        let mut if_index_oid = oid(mib::ARP_IF_INDEX);
        let mut phys_oid = oid(mib::ARP_PHYS_ADDRESS);
        for arc in &index {
            if_index_oid = if_index_oid.child(*arc);
            phys_oid = phys_oid.child(*arc);
        }

        self.entries
            .insert(if_index_oid, Value::Integer(i64::from(if_index)));
        self.entries.insert(phys_oid, Value::OctetString(mac.to_vec()));
        self
    }

    /// Adds one LLDP remote chassis row (`timeMark.localPort.remIndex`).
    pub fn with_lldp_chassis(mut self, local_port: u32, rem_index: u32, chassis: &[u8]) -> Self {
        let row = oid(mib::LLDP_REM_CHASSIS_ID)
            .child(0)
            .child(local_port)
            .child(rem_index);
        self.entries.insert(row, Value::OctetString(chassis.to_vec()));
        self
    }

    /// Populates the routing table, which marks the agent as a router.
    pub fn with_route(mut self, dest: Ipv4Addr) -> Self {
        let mut row = oid(mib::ROUTE_DEST);
        for octet in dest.octets() {
            row = row.child(u32::from(octet));
        }
        self.entries.insert(row, Value::IpAddress(dest));
        self
    }

    /// Fails every `get_next` request, so all table walks error out.
    pub fn with_broken_tables(self) -> Self {
        self.with_broken_subtree(&[])
    }

    /// Fails `get_next` requests issued from inside `root`, so only walks of
    /// that subtree error out.
    pub fn with_broken_subtree(mut self, root: &[u32]) -> Self {
        self.broken_subtrees.push(oid(root));
        self
    }

    fn is_broken(&self, oid: &Oid) -> bool {
        self.broken_subtrees.iter().any(|root| oid.starts_with(root))
    }

    fn get(&self, oid: &Oid) -> Value {
        self.entries
            .get(oid)
            .cloned()
            .unwrap_or(Value::NoSuchObject)
    }

    fn get_next(&self, oid: &Oid) -> VarBind {
        self.entries
            .range((Bound::Excluded(oid.clone()), Bound::Unbounded))
            .next()
            .map(|(next, value)| VarBind::new(next.clone(), value.clone()))
            .unwrap_or_else(|| VarBind::new(oid.clone(), Value::EndOfMibView))
    }
}

#[derive(Debug, Default)]
struct Counters {
    connects: Mutex<HashMap<Ipv4Addr, usize>>,
    identity_probes: Mutex<HashMap<Ipv4Addr, usize>>,
    open: AtomicUsize,
    peak_open: AtomicUsize,
}

impl Counters {
    fn bump(map: &Mutex<HashMap<Ipv4Addr, usize>>, ip: Ipv4Addr) {
        if let Ok(mut map) = map.lock() {
            *map.entry(ip).or_default() += 1;
        }
    }

    fn read(map: &Mutex<HashMap<Ipv4Addr, usize>>, ip: Ipv4Addr) -> usize {
        map.lock()
            .map(|map| map.get(&ip).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn open(&self) -> OpenGuard<'_> {
        let now = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_open.fetch_max(now, Ordering::SeqCst);
        OpenGuard(&self.open)
    }
}

struct OpenGuard<'a>(&'a AtomicUsize);

impl Drop for OpenGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Routes sessions to scripted agents. Addresses without an agent time out.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    agents: Arc<HashMap<Ipv4Addr, Agent>>,
    latency: Duration,
    counters: Arc<Counters>,
}

impl MemoryTransport {
    pub fn new(agents: impl IntoIterator<Item = (Ipv4Addr, Agent)>) -> Self {
        Self {
            agents: Arc::new(agents.into_iter().collect()),
            latency: Duration::ZERO,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Delay applied to every connect and request.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn connects(&self, ip: Ipv4Addr) -> usize {
        Counters::read(&self.counters.connects, ip)
    }

    /// How many times sysName was requested from `ip`.
    pub fn identity_probes(&self, ip: Ipv4Addr) -> usize {
        Counters::read(&self.counters.identity_probes, ip)
    }

    pub fn total_connects(&self) -> usize {
        self.counters
            .connects
            .lock()
            .map(|map| map.values().sum())
            .unwrap_or(0)
    }

    /// Largest number of sessions (including pending connects) open at once.
    pub fn peak_open_sessions(&self) -> usize {
        self.counters.peak_open.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(
        &self,
        target: Ipv4Addr,
        _options: &SessionOptions,
    ) -> Result<Box<dyn Session>, SnmpError> {
        Counters::bump(&self.counters.connects, target);

        let agent = {
            let _pending = self.counters.open();
            self.pause().await;
            self.agents.get(&target).cloned()
        };

        match agent {
            Some(agent) => {
                let now = self.counters.open.fetch_add(1, Ordering::SeqCst) + 1;
                self.counters.peak_open.fetch_max(now, Ordering::SeqCst);
                Ok(Box::new(MemorySession {
                    target,
                    agent,
                    transport: self.clone(),
                }))
            }
            None => Err(SnmpError::Timeout { target }),
        }
    }
}

struct MemorySession {
    target: Ipv4Addr,
    agent: Agent,
    transport: MemoryTransport,
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.transport.counters.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn get(&mut self, oids: &[Oid]) -> Result<Vec<VarBind>, SnmpError> {
        if oids.iter().any(|o| o.arcs() == mib::SYS_NAME) {
            Counters::bump(&self.transport.counters.identity_probes, self.target);
        }
        self.transport.pause().await;

        Ok(oids
            .iter()
            .map(|o| VarBind::new(o.clone(), self.agent.get(o)))
            .collect())
    }

    async fn get_next(&mut self, oid: &Oid) -> Result<VarBind, SnmpError> {
        self.transport.pause().await;

        if self.agent.is_broken(oid) {
            return Err(SnmpError::Request {
                target: self.target,
                reason: "table unavailable".to_string(),
            });
        }
        Ok(self.agent.get_next(oid))
    }
}

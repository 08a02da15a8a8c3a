//! The SNMP **transport seam**.
//!
//! Discovery code talks to agents exclusively through [`Transport`] and
//! [`Session`]. The production implementation is [`UdpTransport`]; tests plug
//! in the in-memory agents from [`memory`] instead.
//!
//! Only `get` and `get_next` have to be provided by an implementation. Table
//! walks and presence checks are built on top of `get_next`.

use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use topomap_common::config::{Config, DEFAULT_COMMUNITY, DEFAULT_TIMEOUT, SNMP_PORT};
use topomap_common::oid::Oid;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod mib;
mod udp;

pub use udp::UdpTransport;

#[derive(Debug, Error)]
pub enum SnmpError {
    #[error("failed to open session to {target}: {source}")]
    Connect {
        target: Ipv4Addr,
        #[source]
        source: std::io::Error,
    },
    #[error("request to {target} timed out")]
    Timeout { target: Ipv4Addr },
    #[error("request to {target} failed: {reason}")]
    Request { target: Ipv4Addr, reason: String },
    #[error("agent {target} answered with error status {status} (index {index})")]
    Agent {
        target: Ipv4Addr,
        status: u32,
        index: u32,
    },
    #[error("request task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Parameters of one short-lived session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub port: u16,
    pub community: String,
    pub timeout: Duration,
    /// Extra attempts after a timed out request.
    pub retries: u32,
}

impl SessionOptions {
    /// Options for identity probes.
    pub fn probe(cfg: &Config) -> Self {
        Self {
            port: cfg.port,
            community: cfg.community.clone(),
            timeout: cfg.timeout,
            retries: cfg.probe_retries,
        }
    }

    /// Options for role classification and ARP/LLDP table walks.
    pub fn walk(cfg: &Config) -> Self {
        Self {
            retries: cfg.walk_retries,
            ..Self::probe(cfg)
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            port: SNMP_PORT,
            community: DEFAULT_COMMUNITY.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retries: 1,
        }
    }
}

/// A decoded varbind value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    OctetString(Vec<u8>),
    ObjectIdentifier(Oid),
    IpAddress(Ipv4Addr),
    Counter32(u32),
    Unsigned32(u32),
    Timeticks(u32),
    Counter64(u64),
    Opaque(Vec<u8>),
    Null,
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl Value {
    /// True for the v2c exception markers, which carry no data.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(bytes) | Value::Opaque(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Opaque textual form, exceptions and `Null` render as an empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{v}"),
            Value::OctetString(bytes) | Value::Opaque(bytes) => {
                write!(f, "{}", String::from_utf8_lossy(bytes))
            }
            Value::ObjectIdentifier(oid) => write!(f, "{oid}"),
            Value::IpAddress(ip) => write!(f, "{ip}"),
            Value::Counter32(v) | Value::Unsigned32(v) | Value::Timeticks(v) => write!(f, "{v}"),
            Value::Counter64(v) => write!(f, "{v}"),
            Value::Null | Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => {
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    pub oid: Oid,
    pub value: Value,
}

impl VarBind {
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }
}

/// Opens sessions against individual agents.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(
        &self,
        target: Ipv4Addr,
        options: &SessionOptions,
    ) -> Result<Box<dyn Session>, SnmpError>;
}

/// One open session. Dropping it closes the underlying socket.
#[async_trait]
pub trait Session: Send {
    /// Fetches every OID in `oids`. Missing objects come back as exception values.
    async fn get(&mut self, oids: &[Oid]) -> Result<Vec<VarBind>, SnmpError>;

    /// Fetches the lexicographic successor of `oid`.
    async fn get_next(&mut self, oid: &Oid) -> Result<VarBind, SnmpError>;

    /// Visits every entry below `root` in agent order and returns how many
    /// entries were visited.
    async fn walk(
        &mut self,
        root: &Oid,
        visitor: &mut (dyn for<'v> FnMut(&'v VarBind) + Send),
    ) -> Result<usize, SnmpError> {
        let mut cursor = root.clone();
        let mut visited = 0;

        loop {
            let varbind = self.get_next(&cursor).await?;

            // A successor that does not move forward would loop forever.
            if varbind.value == Value::EndOfMibView
                || !varbind.oid.starts_with(root)
                || varbind.oid <= cursor
            {
                break;
            }

            visitor(&varbind);
            visited += 1;
            cursor = varbind.oid;
        }

        Ok(visited)
    }

    /// True when the agent holds at least one entry below `root`.
    async fn has_subtree(&mut self, root: &Oid) -> Result<bool, SnmpError> {
        let varbind = self.get_next(root).await?;
        Ok(!varbind.value.is_exception() && varbind.oid.starts_with(root))
    }
}

//! SNMP v2c over UDP, backed by the blocking `snmp` crate.
//!
//! Every request runs on the blocking pool so a slow or silent agent never
//! stalls a runtime worker.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use ::snmp::{SnmpError as WireError, SnmpPdu, SyncSession};
use async_trait::async_trait;
use topomap_common::oid::Oid;
use tracing::trace;

use super::{Session, SessionOptions, SnmpError, Transport, Value, VarBind};

#[derive(Debug, Clone, Copy, Default)]
pub struct UdpTransport;

impl UdpTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn connect(
        &self,
        target: Ipv4Addr,
        options: &SessionOptions,
    ) -> Result<Box<dyn Session>, SnmpError> {
        let addr = SocketAddr::from((target, options.port));
        let community: Vec<u8> = options.community.clone().into_bytes();
        let timeout = options.timeout;
        let starting_req_id: i32 = rand::random_range(1..i32::MAX);

        let session = tokio::task::spawn_blocking(move || {
            SyncSession::new(addr, &community, Some(timeout), starting_req_id)
        })
        .await?
        .map_err(|source| SnmpError::Connect { target, source })?;

        Ok(Box::new(UdpSession {
            target,
            retries: options.retries,
            inner: Arc::new(Mutex::new(session)),
        }))
    }
}

#[derive(Debug, Clone, Copy)]
enum Request {
    Get,
    GetNext,
}

impl Request {
    /// The v2c exception an agent sends instead of a value for this request.
    fn exception(self) -> Value {
        match self {
            Request::Get => Value::NoSuchObject,
            Request::GetNext => Value::EndOfMibView,
        }
    }
}

struct UdpSession {
    target: Ipv4Addr,
    retries: u32,
    inner: Arc<Mutex<SyncSession>>,
}

impl UdpSession {
    async fn request(&self, request: Request, oid: &Oid) -> Result<VarBind, SnmpError> {
        let mut attempt: u32 = 0;

        loop {
            let inner = Arc::clone(&self.inner);
            let arcs: Vec<u32> = oid.arcs().to_vec();
            let target = self.target;

            let result = tokio::task::spawn_blocking(move || {
                let mut session = inner.lock().map_err(|_| SnmpError::Request {
                    target,
                    reason: "session lock poisoned".to_string(),
                })?;
                let pdu = match request {
                    Request::Get => session.get(&arcs),
                    Request::GetNext => session.getnext(&arcs),
                }
                .map_err(|e| wire_error(target, e))?;
                first_varbind(target, request, &arcs, pdu)
            })
            .await?;

            match result {
                Err(SnmpError::Timeout { .. }) if attempt < self.retries => {
                    attempt += 1;
                    trace!(ip = %self.target, %oid, attempt, "Retrying timed out request");
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl Session for UdpSession {
    async fn get(&mut self, oids: &[Oid]) -> Result<Vec<VarBind>, SnmpError> {
        let mut varbinds = Vec::with_capacity(oids.len());
        for oid in oids {
            // A rejected OID reads as missing, the rest are still fetched.
            let varbind = match self.request(Request::Get, oid).await {
                Err(SnmpError::Agent { status, .. }) => {
                    trace!(ip = %self.target, %oid, status, "Agent rejected object");
                    VarBind::new(oid.clone(), Value::NoSuchObject)
                }
                other => other?,
            };
            varbinds.push(varbind);
        }
        Ok(varbinds)
    }

    async fn get_next(&mut self, oid: &Oid) -> Result<VarBind, SnmpError> {
        self.request(Request::GetNext, oid).await
    }
}

/// Decodes the single varbind of a response.
///
/// The `snmp` crate stops its varbind iterator at the v2c exception tags
/// (0x80..=0x82), so an error-free response without a readable varbind is
/// the agent reporting an exception for `requested`.
fn first_varbind(
    target: Ipv4Addr,
    request: Request,
    requested: &[u32],
    pdu: SnmpPdu<'_>,
) -> Result<VarBind, SnmpError> {
    if pdu.error_status != 0 {
        return Err(SnmpError::Agent {
            target,
            status: pdu.error_status,
            index: pdu.error_index,
        });
    }

    let mut varbinds = pdu.varbinds;
    let Some((name, value)) = varbinds.next() else {
        return Ok(VarBind::new(Oid::from_arcs(requested), request.exception()));
    };

    let mut buf = [0u32; 128];
    let arcs = name.read_name(&mut buf).map_err(|e| wire_error(target, e))?;

    Ok(VarBind::new(Oid::from_arcs(arcs), decode_value(value)))
}

fn decode_value(value: ::snmp::Value<'_>) -> Value {
    use ::snmp::Value as Wire;

    match value {
        Wire::Integer(v) => Value::Integer(v),
        Wire::OctetString(bytes) => Value::OctetString(bytes.to_vec()),
        Wire::ObjectIdentifier(oid) => {
            let mut buf = [0u32; 128];
            match oid.read_name(&mut buf) {
                Ok(arcs) => Value::ObjectIdentifier(Oid::from_arcs(arcs)),
                Err(_) => Value::Null,
            }
        }
        Wire::IpAddress(octets) => Value::IpAddress(Ipv4Addr::from(octets)),
        Wire::Counter32(v) => Value::Counter32(v),
        Wire::Unsigned32(v) => Value::Unsigned32(v),
        Wire::Timeticks(v) => Value::Timeticks(v),
        Wire::Counter64(v) => Value::Counter64(v),
        Wire::Opaque(bytes) => Value::Opaque(bytes.to_vec()),
        _ => Value::Null,
    }
}

fn wire_error(target: Ipv4Addr, error: WireError) -> SnmpError {
    match error {
        WireError::ReceiveError => SnmpError::Timeout { target },
        other => SnmpError::Request {
            target,
            reason: format!("{other:?}"),
        },
    }
}

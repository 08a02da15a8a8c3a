//! Host classification.
//!
//! Both checks are heuristics, so they sit behind traits: a different signal
//! (an explicit capability OID, a vendor table) can replace them without
//! touching the probe or the walker.

use async_trait::async_trait;
use topomap_common::device::OsFamily;
use tracing::trace;

use crate::snmp::mib::{self, oid};
use crate::snmp::{Session, Value};

/// Picks the metric set for a host from what it reports about itself.
pub trait OsClassifier: Send + Sync {
    fn classify(&self, description: &str) -> OsFamily;
}

/// Case-insensitive search for "windows" in sysDescr. Anything else,
/// including an empty description, is treated as Unix-like.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionClassifier;

impl OsClassifier for DescriptionClassifier {
    fn classify(&self, description: &str) -> OsFamily {
        if description.to_ascii_lowercase().contains("windows") {
            OsFamily::Windows
        } else {
            OsFamily::Unix
        }
    }
}

/// Decides whether an agent forwards traffic for others.
#[async_trait]
pub trait RoleClassifier: Send + Sync {
    async fn is_router_or_switch(&self, session: &mut dyn Session) -> bool;
}

/// Router when the routing table has rows, switch when the bridge base
/// address is set. Errors count as "neither".
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityProbe;

#[async_trait]
impl RoleClassifier for CapabilityProbe {
    async fn is_router_or_switch(&self, session: &mut dyn Session) -> bool {
        match session.has_subtree(&oid(mib::ROUTE_DEST)).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => trace!(error = %e, "Routing table check failed"),
        }

        match session.get(&[oid(mib::BRIDGE_ADDRESS)]).await {
            Ok(varbinds) => varbinds
                .iter()
                .any(|vb| !vb.value.is_exception() && vb.value != Value::Null),
            Err(e) => {
                trace!(error = %e, "Bridge address check failed");
                false
            }
        }
    }
}

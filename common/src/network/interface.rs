//! Local interface inspection, used to pick the subnet a sweep covers.

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use tracing::debug;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is operationally down.
    IsDown,
    /// The interface is a loopback device.
    IsLoopback,
    /// The interface carries no non-loopback IPv4 address.
    NoIpv4,
}

/// Returns the IPv4 network of the first active, non-loopback interface.
///
/// The returned network keeps the interface's own address (e.g.
/// `192.168.1.23/24`); callers mask it when they need the block.
pub fn local_subnet() -> anyhow::Result<Ipv4Network> {
    let interfaces: Vec<NetworkInterface> = datalink::interfaces();
    debug!("Identified {} network interface(s)", interfaces.len());

    select_subnet(&interfaces)
        .ok_or_else(|| anyhow::anyhow!("no valid network interface found"))
}

fn select_subnet(interfaces: &[NetworkInterface]) -> Option<Ipv4Network> {
    interfaces
        .iter()
        .filter(|interface| match is_viable_interface(interface) {
            Ok(()) => true,
            Err(reason) => {
                debug!(interface = %interface.name, ?reason, "Skipping interface");
                false
            }
        })
        .find_map(first_ipv4_net)
}

fn is_viable_interface(interface: &NetworkInterface) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() {
        return Err(ViabilityError::IsLoopback);
    }
    if first_ipv4_net(interface).is_none() {
        return Err(ViabilityError::NoIpv4);
    }
    Ok(())
}

fn first_ipv4_net(interface: &NetworkInterface) -> Option<Ipv4Network> {
    interface.ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) if !v4.ip().is_loopback() => Some(*v4),
        _ => None,
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

use pnet::util::MacAddr;

/// Reads a hardware address from an SNMP octet string.
///
/// Only 6-byte payloads are accepted; anything else is not an Ethernet MAC.
pub fn from_octets(bytes: &[u8]) -> Option<MacAddr> {
    match *bytes {
        [a, b, c, d, e, f] => Some(MacAddr::new(a, b, c, d, e, f)),
        _ => None,
    }
}

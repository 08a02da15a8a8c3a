use std::net::Ipv4Addr;

use anyhow::Context;
use pnet::ipnetwork::Ipv4Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn to_iter(self) -> impl Iterator<Item = Ipv4Addr> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(Ipv4Addr::from)
    }

    /// Number of addresses in the range, edges included.
    pub fn size(&self) -> u64 {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        u64::from(end.saturating_sub(start)) + 1
    }

    /// Addresses a subnet sweep probes, produced lazily in ascending order.
    pub fn sweep_targets(self) -> impl Iterator<Item = Ipv4Addr> {
        self.to_iter().filter(|ip| !is_edge_address(ip))
    }
}

pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = Ipv4Network::new(ip, prefix)?;
    let start = network.network();
    let end = network.broadcast();

    Ok(Ipv4Range::new(start, end))
}

/// Parses CIDR notation like "192.168.1.0/24" into the whole block it covers.
///
/// The host part of the address is masked off, so "192.168.1.37/24" yields
/// the same range as "192.168.1.0/24".
pub fn parse_cidr(s: &str) -> anyhow::Result<Ipv4Range> {
    let Some((ip_str, prefix_str)) = s.trim().split_once('/') else {
        anyhow::bail!("'{s}' is not in CIDR notation");
    };

    let ip: Ipv4Addr = ip_str
        .parse()
        .with_context(|| format!("invalid IP in CIDR '{s}'"))?;
    let prefix: u8 = prefix_str
        .parse()
        .with_context(|| format!("invalid prefix in CIDR '{s}'"))?;

    cidr_range(ip, prefix)
}

/// Addresses a subnet sweep probes, in ascending order.
///
/// Addresses whose last octet is 0 or 255 are skipped regardless of the
/// prefix length, standing in for the network and broadcast addresses of
/// /24-sized blocks.
pub fn sweep_targets(cidr: &str) -> anyhow::Result<impl Iterator<Item = Ipv4Addr>> {
    Ok(parse_cidr(cidr)?.sweep_targets())
}

fn is_edge_address(ip: &Ipv4Addr) -> bool {
    matches!(ip.octets()[3], 0 | 255)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidr_range_masks_host_bits() {
        let range = parse_cidr("192.168.1.37/24").unwrap();
        assert_eq!(range.start_addr, Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(range.end_addr, Ipv4Addr::new(192, 168, 1, 255));
        assert_eq!(range.to_iter().count(), 256);
    }

    #[test]
    fn sweep_targets_skip_network_and_broadcast() {
        let targets: Vec<Ipv4Addr> = sweep_targets("192.168.1.0/24").unwrap().collect();
        assert_eq!(targets.len(), 254);
        assert_eq!(targets.first(), Some(&Ipv4Addr::new(192, 168, 1, 1)));
        assert_eq!(targets.last(), Some(&Ipv4Addr::new(192, 168, 1, 254)));
        assert!(targets.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn sweep_targets_skip_every_edge_octet_in_wider_blocks() {
        let targets: Vec<Ipv4Addr> = sweep_targets("10.0.0.0/23").unwrap().collect();
        assert_eq!(targets.len(), 508);
        assert!(!targets.contains(&Ipv4Addr::new(10, 0, 0, 255)));
        assert!(!targets.contains(&Ipv4Addr::new(10, 0, 1, 0)));
        assert!(targets.contains(&Ipv4Addr::new(10, 0, 1, 1)));
    }

    #[test]
    fn sweep_targets_on_tiny_blocks() {
        assert_eq!(
            sweep_targets("10.0.0.8/30").unwrap().collect::<Vec<_>>(),
            (8..=11).map(|d| Ipv4Addr::new(10, 0, 0, d)).collect::<Vec<_>>()
        );
        assert_eq!(
            sweep_targets("10.0.0.255/32").unwrap().collect::<Vec<_>>(),
            Vec::<Ipv4Addr>::new()
        );
    }

    #[test]
    fn whole_address_space_is_swept_lazily() {
        let range = parse_cidr("0.0.0.0/0").unwrap();
        assert_eq!(range.size(), 1 << 32);

        let mut targets = sweep_targets("0.0.0.0/0").unwrap();
        assert_eq!(targets.next(), Some(Ipv4Addr::new(0, 0, 0, 1)));
        assert_eq!(targets.nth(252), Some(Ipv4Addr::new(0, 0, 0, 254)));
        assert_eq!(targets.next(), Some(Ipv4Addr::new(0, 0, 1, 1)));
    }

    #[test]
    fn range_size_counts_edges() {
        assert_eq!(parse_cidr("10.0.0.0/8").unwrap().size(), 16_777_216);
        assert_eq!(parse_cidr("10.0.0.7/32").unwrap().size(), 1);
    }

    #[test]
    fn malformed_cidr_is_an_error() {
        assert!(sweep_targets("192.168.1.0").is_err());
        assert!(sweep_targets("192.168.1.0/33").is_err());
        assert!(sweep_targets("192.168.300.0/24").is_err());
        assert!(sweep_targets("lan/24").is_err());
    }
}

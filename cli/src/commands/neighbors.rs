use std::net::Ipv4Addr;
use std::sync::Arc;

use colored::*;
use topomap_common::config::Config;
use topomap_core::NeighborResolver;
use topomap_core::snmp::UdpTransport;

use crate::mprint;
use crate::terminal::{colors, print, spinner};

pub async fn neighbors(ip: Ipv4Addr, cfg: &Config) -> anyhow::Result<()> {
    let resolver = NeighborResolver::new(Arc::new(UdpTransport::new()), cfg);

    let neighbors = resolver.resolve(ip).await?;
    spinner::finish();

    if neighbors.addresses.is_empty() {
        print::print_status(format!("{ip} reports no neighbors"));
        return Ok(());
    }

    print::print_status(format!(
        "{} neighbors of {} via {}",
        neighbors.addresses.len(),
        ip,
        neighbors.source.to_string().color(colors::ACCENT)
    ));
    mprint!();
    for (idx, neighbor) in neighbors.addresses.iter().enumerate() {
        print::tree_head(idx, &neighbor.to_string());
    }
    Ok(())
}

use std::net::Ipv4Addr;
use std::sync::Arc;

use topomap_common::config::Config;
use topomap_core::Prober;
use topomap_core::snmp::UdpTransport;

use crate::commands::report;
use crate::terminal::spinner;

pub async fn probe(ip: Ipv4Addr, cfg: &Config) -> anyhow::Result<()> {
    let prober = Prober::new(Arc::new(UdpTransport::new()), cfg);

    let device = prober.probe(ip).await?;
    let forwards = prober.is_router_or_switch(ip).await;
    spinner::finish();

    report::print_device_tree(&device, 0);
    if forwards {
        crate::terminal::print::print_status("Forwards traffic (router or switch)");
    }
    Ok(())
}

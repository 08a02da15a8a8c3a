use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use topomap_common::config::Config;
use topomap_common::network::gateway;
use topomap_core::snmp::{Transport, UdpTransport};
use topomap_core::{NeighborResolver, Prober, TopologyWalker};
use tracing::info;

use crate::commands::report;
use crate::terminal::spinner;

pub async fn walk(seed: Option<Ipv4Addr>, cfg: &Config) -> anyhow::Result<()> {
    let start = match seed {
        Some(ip) => ip,
        None => {
            let gateway = gateway::default_gateway()
                .await
                .context("could not determine the default gateway, pass --seed")?;
            info!("Starting at default gateway {}", gateway);
            gateway
        }
    };

    let transport: Arc<dyn Transport> = Arc::new(UdpTransport::new());
    let prober = Arc::new(Prober::new(transport.clone(), cfg));
    let resolver = Arc::new(NeighborResolver::new(transport, cfg));
    let walker =
        TopologyWalker::new(prober, resolver, cfg).on_device_found(Arc::new(spinner::report_progress));

    let start_time = Instant::now();
    let mut devices = walker.walk(start).await;
    spinner::finish();

    report::discovery_ends(&mut devices, start_time.elapsed(), cfg);
    Ok(())
}

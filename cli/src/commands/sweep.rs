use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use topomap_common::config::Config;
use topomap_common::network::interface;
use topomap_core::SubnetScanner;
use topomap_core::snmp::UdpTransport;
use topomap_core::Prober;

use crate::commands::report;
use crate::terminal::spinner;

pub async fn sweep(cidr: Option<&str>, cfg: &Config) -> anyhow::Result<()> {
    let cidr = match cidr {
        Some(cidr) => cidr.to_string(),
        None => interface::local_subnet()
            .context("no usable interface to derive a subnet from")?
            .to_string(),
    };

    let prober = Prober::new(Arc::new(UdpTransport::new()), cfg);
    let scanner = SubnetScanner::new(Arc::new(prober), cfg.scan_concurrency)
        .on_device_found(Arc::new(spinner::report_progress));

    let start_time = Instant::now();
    let mut devices = scanner.scan(&cidr).await?;
    spinner::finish();

    report::discovery_ends(&mut devices, start_time.elapsed(), cfg);
    Ok(())
}

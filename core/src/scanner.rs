//! # Subnet Scanner
//!
//! Probes every host address of a CIDR block and collects the devices that
//! answered. At most `scan_concurrency` probes are in flight at once: a permit
//! is taken *before* a task is spawned and travels with the task until it ends.

use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use topomap_common::device::DiscoveredDevice;
use topomap_common::network::range;
use tracing::{info, trace, warn};

use crate::probe::Prober;

/// Called with the running number of devices found.
pub type DeviceCallback = Arc<dyn Fn(usize) + Send + Sync>;

pub struct SubnetScanner {
    prober: Arc<Prober>,
    concurrency: usize,
    on_device_found: Option<DeviceCallback>,
}

impl SubnetScanner {
    /// A `concurrency` of zero is treated as one.
    pub fn new(prober: Arc<Prober>, concurrency: usize) -> Self {
        Self {
            prober,
            concurrency: concurrency.max(1),
            on_device_found: None,
        }
    }

    pub fn on_device_found(mut self, callback: DeviceCallback) -> Self {
        self.on_device_found = Some(callback);
        self
    }

    /// Sweeps `cidr`, skipping network and broadcast style addresses.
    ///
    /// A malformed block is reported before any probe starts.
    pub async fn scan(&self, cidr: &str) -> anyhow::Result<Vec<DiscoveredDevice>> {
        let block = range::parse_cidr(cidr)?;
        info!("Sweeping {} ({} addresses)", cidr, block.size());
        Ok(self.scan_addresses(block.sweep_targets()).await)
    }

    pub async fn scan_addresses(
        &self,
        targets: impl IntoIterator<Item = Ipv4Addr>,
    ) -> Vec<DiscoveredDevice> {
        let found = Arc::new(Mutex::new(Vec::new()));
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for ip in targets {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let prober = self.prober.clone();
            let found = found.clone();
            let callback = self.on_device_found.clone();

            tasks.spawn(async move {
                let _permit = permit;
                match prober.probe(ip).await {
                    Ok(device) => {
                        trace!(ip = %ip, name = %device.name, "Device answered");
                        let count = {
                            let mut found = found.lock().unwrap_or_else(PoisonError::into_inner);
                            found.push(device);
                            found.len()
                        };
                        if let Some(cb) = callback {
                            cb(count);
                        }
                    }
                    Err(e) => trace!(ip = %ip, error = %e, "No answer"),
                }
            });

            while let Some(joined) = tasks.try_join_next() {
                log_join_failure(joined);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            log_join_failure(joined);
        }

        let mut found = found.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *found)
    }
}

fn log_join_failure(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        warn!(error = %e, "Probe task failed");
    }
}

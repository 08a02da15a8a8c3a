//! # Topology Walker
//!
//! Breadth-first expansion from a seed device. Every address moves through
//! `unvisited → dispatched → resolved | failed` exactly once; the shared
//! [`TraversalState`] enforces that.
//!
//! The walker loop drains the frontier, spawning one expansion per address
//! (bounded by `walk_concurrency` permits), then waits for a single task to
//! finish since it may have queued new addresses. The walk ends when the
//! frontier and the task set are both empty.

use std::net::Ipv4Addr;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use topomap_common::config::{Config, RouterPolicy};
use topomap_common::device::DiscoveredDevice;
use tracing::{debug, info, trace, warn};

use crate::neighbors::NeighborResolver;
use crate::probe::Prober;
use crate::scanner::DeviceCallback;

mod state;

pub use state::TraversalState;

pub struct TopologyWalker {
    prober: Arc<Prober>,
    resolver: Arc<NeighborResolver>,
    policy: RouterPolicy,
    /// `0` means unbounded.
    concurrency: usize,
    on_device_found: Option<DeviceCallback>,
}

impl TopologyWalker {
    pub fn new(prober: Arc<Prober>, resolver: Arc<NeighborResolver>, cfg: &Config) -> Self {
        Self {
            prober,
            resolver,
            policy: cfg.router_policy,
            concurrency: cfg.walk_concurrency,
            on_device_found: None,
        }
    }

    pub fn with_policy(mut self, policy: RouterPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn on_device_found(mut self, callback: DeviceCallback) -> Self {
        self.on_device_found = Some(callback);
        self
    }

    /// Walks outward from `start` and returns every device reached, in the
    /// order their probes completed.
    pub async fn walk(&self, start: Ipv4Addr) -> Vec<DiscoveredDevice> {
        let state = Arc::new(TraversalState::new(start));
        let permits = (self.concurrency > 0).then(|| Arc::new(Semaphore::new(self.concurrency)));
        let mut tasks = JoinSet::new();

        info!("Walking topology from {}", start);

        loop {
            while let Some(ip) = state.next_dispatch() {
                let permit = match &permits {
                    Some(permits) => match permits.clone().acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(_) => break,
                    },
                    None => None,
                };

                let expansion = Expansion {
                    prober: self.prober.clone(),
                    resolver: self.resolver.clone(),
                    policy: self.policy,
                    state: state.clone(),
                    callback: self.on_device_found.clone(),
                };

                tasks.spawn(async move {
                    let _permit = permit;
                    expansion.run(ip).await;
                });
            }

            match tasks.join_next().await {
                Some(Ok(())) => {}
                Some(Err(e)) => warn!(error = %e, "Expansion task failed"),
                None => break,
            }
        }

        debug!(visited = state.visited_count(), "Walk finished");
        state.take_results()
    }
}

/// Everything one expansion task needs.
struct Expansion {
    prober: Arc<Prober>,
    resolver: Arc<NeighborResolver>,
    policy: RouterPolicy,
    state: Arc<TraversalState>,
    callback: Option<DeviceCallback>,
}

impl Expansion {
    async fn run(self, ip: Ipv4Addr) {
        let device = match self.prober.probe(ip).await {
            Ok(device) => device,
            Err(e) => {
                trace!(ip = %ip, error = %e, "Probe failed");
                return;
            }
        };

        let name = device.display_name();
        let count = self.state.record(device);
        if let Some(cb) = &self.callback {
            cb(count);
        }

        let forwards = self.prober.is_router_or_switch(ip).await;
        debug!(ip = %ip, name = %name, router_or_switch = forwards, "Resolved device");

        if forwards && self.policy == RouterPolicy::Stop {
            debug!(ip = %ip, "Not expanding router or switch");
            return;
        }

        match self.resolver.resolve(ip).await {
            Ok(neighbors) => {
                let added = self.state.enqueue(neighbors.addresses.iter().copied());
                debug!(
                    ip = %ip,
                    source = %neighbors.source,
                    found = neighbors.addresses.len(),
                    new = added,
                    "Neighbors resolved"
                );
            }
            Err(e) => debug!(ip = %ip, error = %e, "Neighbor resolution failed"),
        }
    }
}

use std::collections::{HashSet, VecDeque};
use std::net::Ipv4Addr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use topomap_common::device::DiscoveredDevice;

#[derive(Debug, Default)]
struct Inner {
    visited: HashSet<Ipv4Addr>,
    frontier: VecDeque<Ipv4Addr>,
    results: Vec<DiscoveredDevice>,
}

/// Shared bookkeeping of one walk, guarded by a single lock.
///
/// An address is marked visited when it is enqueued, so it can be
/// dispatched at most once no matter how many neighbors report it.
#[derive(Debug)]
pub struct TraversalState {
    inner: Mutex<Inner>,
}

impl TraversalState {
    pub fn new(seed: Ipv4Addr) -> Self {
        let mut inner = Inner::default();
        inner.visited.insert(seed);
        inner.frontier.push_back(seed);
        Self {
            inner: Mutex::new(inner),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Next address waiting to be expanded.
    pub fn next_dispatch(&self) -> Option<Ipv4Addr> {
        self.lock().frontier.pop_front()
    }

    /// Queues the unseen candidates and returns how many were new.
    pub fn enqueue(&self, candidates: impl IntoIterator<Item = Ipv4Addr>) -> usize {
        let mut inner = self.lock();
        let mut added = 0;
        for ip in candidates {
            if inner.visited.insert(ip) {
                inner.frontier.push_back(ip);
                added += 1;
            }
        }
        added
    }

    /// Stores a resolved device and returns the number stored so far.
    pub fn record(&self, device: DiscoveredDevice) -> usize {
        let mut inner = self.lock();
        inner.results.push(device);
        inner.results.len()
    }

    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    pub fn take_results(&self) -> Vec<DiscoveredDevice> {
        std::mem::take(&mut self.lock().results)
    }
}

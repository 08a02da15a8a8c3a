//! # Discovery Models
//!
//! A [`DiscoveredDevice`] is created once per host that answered the identity
//! probe. Its [`DeviceMetrics`] keep the agent's values verbatim; numeric
//! readings go through the typed accessors.

use std::fmt;
use std::net::Ipv4Addr;

/// Operating system family, decides which metric set is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OsFamily {
    Windows,
    #[default]
    Unix,
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::Windows => write!(f, "Windows"),
            OsFamily::Unix => write!(f, "Unix"),
        }
    }
}

/// Point-in-time resource snapshot, one string per counter as reported.
///
/// An empty string means the agent did not report that counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceMetrics {
    pub cpu_usage: String,
    pub cpu_idle: String,
    pub mem_total_kb: String,
    pub mem_free_kb: String,
    pub processes: String,
}

impl DeviceMetrics {
    pub fn cpu_usage_percent(&self) -> Option<u64> {
        parse_reading(&self.cpu_usage)
    }

    pub fn cpu_idle_percent(&self) -> Option<u64> {
        parse_reading(&self.cpu_idle)
    }

    pub fn mem_total_kb(&self) -> Option<u64> {
        parse_reading(&self.mem_total_kb)
    }

    pub fn mem_free_kb(&self) -> Option<u64> {
        parse_reading(&self.mem_free_kb)
    }

    pub fn process_count(&self) -> Option<u64> {
        parse_reading(&self.processes)
    }

    pub fn is_empty(&self) -> bool {
        self.cpu_usage.is_empty()
            && self.cpu_idle.is_empty()
            && self.mem_total_kb.is_empty()
            && self.mem_free_kb.is_empty()
            && self.processes.is_empty()
    }
}

fn parse_reading(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

/// One host that answered the identity probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    pub ip_address: Ipv4Addr,
    /// sysName, empty when the agent did not report it.
    pub name: String,
    /// sysUpTime as reported (hundredths of a second).
    pub up_time: String,
    pub sys_description: String,
    pub os_family: OsFamily,
    pub metrics: DeviceMetrics,
}

impl DiscoveredDevice {
    pub fn new(ip_address: Ipv4Addr) -> Self {
        Self {
            ip_address,
            name: String::new(),
            up_time: String::new(),
            sys_description: String::new(),
            os_family: OsFamily::default(),
            metrics: DeviceMetrics::default(),
        }
    }

    pub fn with_metrics(mut self, metrics: DeviceMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// The sysName, or the address when the agent reported none.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            self.ip_address.to_string()
        } else {
            self.name.clone()
        }
    }
}

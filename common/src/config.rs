use std::time::Duration;

/// Well-known SNMP agent port.
pub const SNMP_PORT: u16 = 161;
pub const DEFAULT_COMMUNITY: &str = "public";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound of simultaneous probes during a subnet sweep.
pub const DEFAULT_SCAN_CONCURRENCY: usize = 250;
/// Upper bound of simultaneous expansions during a topology walk.
pub const DEFAULT_WALK_CONCURRENCY: usize = 64;

/// What the topology walker does once a node answers as a router or switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouterPolicy {
    /// Keep following the node's neighbors.
    #[default]
    Expand,
    /// Record the node but never expand it.
    Stop,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// SNMP v2c community string.
    pub community: String,
    pub port: u16,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries used when probing a host for its identity.
    pub probe_retries: u32,
    /// Retries used for role classification and ARP/LLDP walks.
    pub walk_retries: u32,
    pub scan_concurrency: usize,
    /// `0` disables the bound.
    pub walk_concurrency: usize,
    pub router_policy: RouterPolicy,
    /// Output verbosity, 0 prints everything.
    pub quiet: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            community: DEFAULT_COMMUNITY.to_string(),
            port: SNMP_PORT,
            timeout: DEFAULT_TIMEOUT,
            probe_retries: 1,
            walk_retries: 0,
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
            walk_concurrency: DEFAULT_WALK_CONCURRENCY,
            router_policy: RouterPolicy::default(),
            quiet: 0,
        }
    }
}

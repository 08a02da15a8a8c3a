pub mod neighbors;
pub mod probe;
pub mod report;
pub mod sweep;
pub mod walk;

use std::net::Ipv4Addr;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use topomap_common::config::{
    Config, DEFAULT_COMMUNITY, DEFAULT_SCAN_CONCURRENCY, DEFAULT_TIMEOUT,
    DEFAULT_WALK_CONCURRENCY, RouterPolicy, SNMP_PORT,
};

const DEFAULT_TIMEOUT_MS: u64 = DEFAULT_TIMEOUT.as_millis() as u64;

#[derive(Parser)]
#[command(name = "topomap")]
#[command(version, about = "SNMP network discovery and topology mapping.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// SNMP v2c community string
    #[arg(short, long, global = true, default_value = DEFAULT_COMMUNITY)]
    pub community: String,

    /// Agent UDP port
    #[arg(long, global = true, default_value_t = SNMP_PORT)]
    pub port: u16,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Maximum simultaneous probes during a sweep
    #[arg(long, global = true, default_value_t = DEFAULT_SCAN_CONCURRENCY)]
    pub concurrency: usize,

    /// Maximum simultaneous expansions during a walk (0 = unbounded)
    #[arg(long, global = true, default_value_t = DEFAULT_WALK_CONCURRENCY)]
    pub walk_concurrency: usize,

    /// Record routers and switches without following their neighbors
    #[arg(long, global = true)]
    pub stop_at_routers: bool,

    /// Less output (-q hides headers, -qq hides device trees)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map the network by following neighbors outward from a seed device
    #[command(alias = "w")]
    Walk {
        /// Start here instead of at the default gateway
        #[arg(long)]
        seed: Option<Ipv4Addr>,
    },
    /// Probe every host of a CIDR block (defaults to the local subnet)
    #[command(alias = "s")]
    Sweep { cidr: Option<String> },
    /// Identify a single host
    #[command(alias = "p")]
    Probe { ip: Ipv4Addr },
    /// List the neighbors a device reports
    #[command(alias = "n")]
    Neighbors { ip: Ipv4Addr },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            community: self.community.clone(),
            port: self.port,
            timeout: Duration::from_millis(self.timeout_ms),
            scan_concurrency: self.concurrency,
            walk_concurrency: self.walk_concurrency,
            router_policy: if self.stop_at_routers {
                RouterPolicy::Stop
            } else {
                RouterPolicy::Expand
            },
            quiet: self.quiet,
            ..Config::default()
        }
    }
}

//! Default gateway lookup through the platform's routing utilities.
//!
//! The gateway is the seed of a topology walk. Each platform prints its
//! routing table differently, so the command output is handed to a small
//! parser that is testable on its own.

use std::net::Ipv4Addr;

use anyhow::Context;
use tokio::process::Command;
use tracing::debug;

/// Finds the IPv4 address of the default gateway.
pub async fn default_gateway() -> anyhow::Result<Ipv4Addr> {
    let lookup = RouteLookup::for_platform()?;
    let program = lookup.program();

    let output = Command::new(program)
        .args(lookup.args())
        .output()
        .await
        .with_context(|| format!("failed to run '{program}'"))?;

    anyhow::ensure!(
        output.status.success(),
        "'{program}' exited with {}",
        output.status
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    debug!(program, "Parsing routing table output");

    let gateway = lookup.parse(&stdout).context("gateway not found")?;
    gateway
        .parse::<Ipv4Addr>()
        .with_context(|| format!("invalid gateway IP: {gateway}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteLookup {
    /// Linux `ip route`.
    IpRoute,
    /// macOS `route get`.
    RouteGet,
    /// Windows `route print`.
    RoutePrint,
}

impl RouteLookup {
    fn for_platform() -> anyhow::Result<Self> {
        if cfg!(target_os = "linux") {
            Ok(Self::IpRoute)
        } else if cfg!(target_os = "macos") {
            Ok(Self::RouteGet)
        } else if cfg!(target_os = "windows") {
            Ok(Self::RoutePrint)
        } else {
            anyhow::bail!("unsupported operating system")
        }
    }

    fn program(self) -> &'static str {
        match self {
            Self::IpRoute => "ip",
            Self::RouteGet | Self::RoutePrint => "route",
        }
    }

    fn args(self) -> &'static [&'static str] {
        match self {
            Self::IpRoute => &["route", "show", "default"],
            Self::RouteGet => &["-n", "get", "default"],
            Self::RoutePrint => &["print", "0.0.0.0"],
        }
    }

    fn parse(self, output: &str) -> Option<&str> {
        match self {
            Self::IpRoute => parse_ip_route(output),
            Self::RouteGet => parse_route_get(output),
            Self::RoutePrint => parse_route_print(output),
        }
    }
}

/// `default via 192.168.1.1 dev eth0 proto dhcp metric 100`
fn parse_ip_route(output: &str) -> Option<&str> {
    output
        .lines()
        .filter(|line| line.trim_start().starts_with("default"))
        .find_map(|line| {
            let mut fields = line.split_whitespace();
            fields.find(|field| *field == "via")?;
            fields.next()
        })
}

/// `    gateway: 192.168.1.1`
fn parse_route_get(output: &str) -> Option<&str> {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("gateway:"))
        .map(str::trim)
}

/// `          0.0.0.0          0.0.0.0      192.168.1.1    192.168.1.23     25`
fn parse_route_print(output: &str) -> Option<&str> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("0.0.0.0"))
        .find_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            (fields.len() > 3).then(|| fields[2])
        })
}

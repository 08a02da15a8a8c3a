//! Numeric SNMP object identifiers.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OidParseError {
    #[error("object identifier is empty")]
    Empty,
    #[error("invalid arc '{arc}' in object identifier '{oid}'")]
    InvalidArc { oid: String, arc: String },
}

/// An owned object identifier such as `1.3.6.1.2.1.1.5.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid(Vec<u32>);

impl Oid {
    pub fn from_arcs(arcs: &[u32]) -> Self {
        Self(arcs.to_vec())
    }

    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    /// True when `self` lies inside the subtree rooted at `root`.
    pub fn starts_with(&self, root: &Oid) -> bool {
        self.0.starts_with(&root.0)
    }

    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.0.clone();
        arcs.push(arc);
        Oid(arcs)
    }

    /// Reads the last four arcs as an IPv4 address.
    ///
    /// Tables indexed by address (ARP, routing) encode the address this way.
    pub fn trailing_ipv4(&self) -> Option<Ipv4Addr> {
        let len = self.0.len();
        if len < 4 {
            return None;
        }
        let mut octets = [0u8; 4];
        for (octet, arc) in octets.iter_mut().zip(&self.0[len - 4..]) {
            *octet = u8::try_from(*arc).ok()?;
        }
        Some(Ipv4Addr::from(octets))
    }
}

impl FromStr for Oid {
    type Err = OidParseError;

    /// Accepts both `1.3.6.1` and the leading-dot form `.1.3.6.1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            return Err(OidParseError::Empty);
        }

        trimmed
            .split('.')
            .map(|arc| {
                arc.parse::<u32>().map_err(|_| OidParseError::InvalidArc {
                    oid: s.to_string(),
                    arc: arc.to_string(),
                })
            })
            .collect::<Result<Vec<u32>, _>>()
            .map(Oid)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut arcs = self.0.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{first}")?;
        }
        for arc in arcs {
            write!(f, ".{arc}")?;
        }
        Ok(())
    }
}

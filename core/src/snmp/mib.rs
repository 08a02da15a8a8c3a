//! Object identifiers consumed by discovery.

use topomap_common::oid::Oid;

/// `1.3.6.1.2.1.1.1.0` sysDescr
pub const SYS_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 1, 0];
/// `1.3.6.1.2.1.1.3.0` sysUpTime
pub const SYS_UPTIME: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 3, 0];
/// `1.3.6.1.2.1.1.5.0` sysName
pub const SYS_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 5, 0];

/// `1.3.6.1.2.1.4.22.1.1` ARP table, one row per neighbor, indexed by
/// `ifIndex.a.b.c.d`.
pub const ARP_IF_INDEX: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 22, 1, 1];
/// `1.3.6.1.2.1.4.22.1.2` ARP table hardware address column.
pub const ARP_PHYS_ADDRESS: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 22, 1, 2];

/// `1.3.6.1.2.1.4.21.1.1` routing table destination column.
pub const ROUTE_DEST: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 21, 1, 1];
/// `1.3.6.1.2.1.17.1.1.0` bridge base address, present on switches.
pub const BRIDGE_ADDRESS: &[u32] = &[1, 3, 6, 1, 2, 1, 17, 1, 1, 0];

/// `1.0.8802.1.1.2.1.4.1.1.5` LLDP remote chassis ID.
pub const LLDP_REM_CHASSIS_ID: &[u32] = &[1, 0, 8802, 1, 1, 2, 1, 4, 1, 1, 5];

/// `.1.3.6.1.2.1.25.3.3.1.2.1` load of the first processor.
pub const WIN_CPU_LOAD: &[u32] = &[1, 3, 6, 1, 2, 1, 25, 3, 3, 1, 2, 1];
/// `.1.3.6.1.2.1.25.2.2.0` installed memory.
pub const WIN_MEM_TOTAL: &[u32] = &[1, 3, 6, 1, 2, 1, 25, 2, 2, 0];
/// `.1.3.6.1.2.1.25.1.6.0` running processes.
pub const WIN_PROCESSES: &[u32] = &[1, 3, 6, 1, 2, 1, 25, 1, 6, 0];

/// `.1.3.6.1.4.1.2021.11.9.0` user CPU percentage.
pub const UNIX_CPU_USER: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 11, 9, 0];
/// `.1.3.6.1.4.1.2021.11.11.0` idle CPU percentage.
pub const UNIX_CPU_IDLE: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 11, 11, 0];
/// `.1.3.6.1.4.1.2021.4.5.0` total real memory.
pub const UNIX_MEM_TOTAL: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 4, 5, 0];
/// `.1.3.6.1.4.1.2021.4.6.0`
pub const UNIX_PROCESSES: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 4, 6, 0];
/// `.1.3.6.1.4.1.2021.4.11.0` total free memory.
pub const UNIX_MEM_FREE: &[u32] = &[1, 3, 6, 1, 4, 1, 2021, 4, 11, 0];

pub fn oid(arcs: &[u32]) -> Oid {
    Oid::from_arcs(arcs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_match_their_dotted_form() {
        let cases: &[(&[u32], &str)] = &[
            (SYS_NAME, "1.3.6.1.2.1.1.5.0"),
            (SYS_UPTIME, "1.3.6.1.2.1.1.3.0"),
            (SYS_DESCR, "1.3.6.1.2.1.1.1.0"),
            (ARP_IF_INDEX, "1.3.6.1.2.1.4.22.1.1"),
            (ARP_PHYS_ADDRESS, "1.3.6.1.2.1.4.22.1.2"),
            (ROUTE_DEST, "1.3.6.1.2.1.4.21.1.1"),
            (BRIDGE_ADDRESS, "1.3.6.1.2.1.17.1.1.0"),
            (LLDP_REM_CHASSIS_ID, "1.0.8802.1.1.2.1.4.1.1.5"),
            (WIN_CPU_LOAD, ".1.3.6.1.2.1.25.3.3.1.2.1"),
            (WIN_MEM_TOTAL, ".1.3.6.1.2.1.25.2.2.0"),
            (WIN_PROCESSES, ".1.3.6.1.2.1.25.1.6.0"),
            (UNIX_CPU_USER, ".1.3.6.1.4.1.2021.11.9.0"),
            (UNIX_CPU_IDLE, ".1.3.6.1.4.1.2021.11.11.0"),
            (UNIX_MEM_TOTAL, ".1.3.6.1.4.1.2021.4.5.0"),
            (UNIX_PROCESSES, ".1.3.6.1.4.1.2021.4.6.0"),
            (UNIX_MEM_FREE, ".1.3.6.1.4.1.2021.4.11.0"),
        ];

        for (arcs, dotted) in cases {
            assert_eq!(oid(arcs), dotted.parse::<Oid>().unwrap(), "{dotted}");
        }
    }
}

//! Host interface address collection.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Returns the set of IP addresses assigned to this host's interfaces.
///
/// Loopback addresses are always included so same-machine detection works
/// even when the interface table cannot be read (e.g. inside a restricted
/// sandbox). Enumeration failure degrades to that minimal set.
#[must_use]
pub fn host_addresses() -> HashSet<IpAddr> {
    let mut addrs: HashSet<IpAddr> = HashSet::new();
    let _ = addrs.insert(IpAddr::V4(Ipv4Addr::LOCALHOST));
    let _ = addrs.insert(IpAddr::V6(Ipv6Addr::LOCALHOST));

    match nix::ifaddrs::getifaddrs() {
        Ok(interfaces) => {
            for interface in interfaces {
                let Some(address) = interface.address else {
                    continue;
                };
                if let Some(sin) = address.as_sockaddr_in() {
                    let _ = addrs.insert(IpAddr::V4(sin.ip()));
                } else if let Some(sin6) = address.as_sockaddr_in6() {
                    let _ = addrs.insert(IpAddr::V6(sin6.ip()));
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not enumerate interface addresses");
        }
    }

    addrs
}

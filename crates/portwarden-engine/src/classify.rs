//! Pure classification rules.
//!
//! Every function here is side-effect-free and deterministic: the same
//! snapshot and configuration always produce the same verdicts. Rules are
//! evaluated in a fixed short-circuit order so operator configuration
//! always wins over heuristics.

use std::collections::HashSet;
use std::net::IpAddr;

use portwarden_common::config::MonitorConfig;
use portwarden_common::constants::{
    DYNAMIC_PORT_FLOOR, MAX_REGISTERED_PORT, TRUSTED_SYSTEM_PROCESSES, WELL_KNOWN_PORT_CEILING,
};
use portwarden_common::types::{ConnectionRecord, Endpoint, SocketState, Verdict};

/// Verdict for one listener, with the rule that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The verdict.
    pub verdict: Verdict,
    /// Short description of the rule that produced the verdict.
    pub reason: &'static str,
}

impl Classification {
    const fn benign(reason: &'static str) -> Self {
        Self {
            verdict: Verdict::Benign,
            reason,
        }
    }
}

/// Classifies a listening socket.
///
/// Short-circuit order: trusted system process, port whitelist, process
/// whitelist (case-insensitive), loopback exemption, then suspicious.
#[must_use]
pub fn classify_listener(listener: &ConnectionRecord, config: &MonitorConfig) -> Classification {
    if TRUSTED_SYSTEM_PROCESSES
        .iter()
        .any(|p| *p == listener.process_name)
    {
        return Classification::benign("system-owned process");
    }
    if config.is_port_whitelisted(listener.local.port) {
        return Classification::benign("port whitelisted");
    }
    if config.is_process_whitelisted(&listener.process_name) {
        return Classification::benign("process whitelisted");
    }
    if listener.local.is_loopback() {
        return Classification::benign("loopback-only listener");
    }
    Classification {
        verdict: Verdict::Suspicious,
        reason: "not covered by any whitelist",
    }
}

/// Returns `true` when local and remote both resolve to this host: both
/// loopback, address-equal, or both present in the host's own address set.
#[must_use]
pub fn is_same_machine(local: &Endpoint, remote: &Endpoint, local_addrs: &HashSet<IpAddr>) -> bool {
    if local.is_loopback() && remote.is_loopback() {
        return true;
    }
    if local.addr == remote.addr {
        return true;
    }
    local_addrs.contains(&local.addr) && local_addrs.contains(&remote.addr)
}

/// Decides whether a connection represents traffic arriving from outside.
///
/// A listener is incoming by definition. An established connection counts
/// when it is not same-machine and either a recognized process (whitelisted
/// or known-notable) holds a local port inside the registered range, or a
/// well-known local port is reached from an ephemeral remote port.
#[must_use]
pub fn is_incoming(
    conn: &ConnectionRecord,
    local_addrs: &HashSet<IpAddr>,
    config: &MonitorConfig,
) -> bool {
    match conn.state {
        SocketState::Listening => true,
        SocketState::Established => {
            let Some(remote) = &conn.remote else {
                // Cannot occur from the procfs source; degrade, don't panic.
                return false;
            };
            if is_same_machine(&conn.local, remote, local_addrs) {
                return false;
            }

            let recognized = config.is_process_whitelisted(&conn.process_name)
                || config.is_known_notable(&conn.process_name);
            if recognized && conn.local.port <= MAX_REGISTERED_PORT {
                return true;
            }
            conn.local.port <= WELL_KNOWN_PORT_CEILING && remote.port > DYNAMIC_PORT_FLOOR
        }
        SocketState::Other => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portwarden_common::types::{ProcessId, UNKNOWN_PROCESS};
    use std::net::Ipv4Addr;

    fn endpoint(addr: [u8; 4], port: u16) -> Endpoint {
        Endpoint::new(IpAddr::V4(Ipv4Addr::from(addr)), port)
    }

    fn listener(addr: [u8; 4], port: u16, name: &str) -> ConnectionRecord {
        ConnectionRecord {
            local: endpoint(addr, port),
            remote: None,
            state: SocketState::Listening,
            pid: ProcessId::new(1000),
            process_name: name.to_owned(),
        }
    }

    fn established(
        local: ([u8; 4], u16),
        remote: ([u8; 4], u16),
        name: &str,
    ) -> ConnectionRecord {
        ConnectionRecord {
            local: endpoint(local.0, local.1),
            remote: Some(endpoint(remote.0, remote.1)),
            state: SocketState::Established,
            pid: ProcessId::new(1000),
            process_name: name.to_owned(),
        }
    }

    fn no_local_addrs() -> HashSet<IpAddr> {
        HashSet::new()
    }

    #[test]
    fn unlisted_listener_on_public_address_is_suspicious() {
        let config = MonitorConfig::default();
        let result = classify_listener(&listener([10, 0, 0, 5], 8080, "malware.exe"), &config);
        assert_eq!(result.verdict, Verdict::Suspicious);
    }

    #[test]
    fn port_whitelist_short_circuits_unknown_process() {
        let config = MonitorConfig::default();
        let result = classify_listener(&listener([10, 0, 0, 5], 443, UNKNOWN_PROCESS), &config);
        assert_eq!(result.verdict, Verdict::Benign);
        assert_eq!(result.reason, "port whitelisted");
    }

    #[test]
    fn whitelisted_port_is_benign_regardless_of_process_name() {
        let config = MonitorConfig::default();
        for port in config.whitelisted_ports.iter().copied() {
            let result = classify_listener(&listener([10, 0, 0, 5], port, "malware.exe"), &config);
            assert_eq!(result.verdict, Verdict::Benign, "port {port}");
        }
    }

    #[test]
    fn trusted_system_process_wins_over_everything() {
        let config = MonitorConfig::default();
        let result = classify_listener(&listener([10, 0, 0, 5], 9999, "System"), &config);
        assert_eq!(result.verdict, Verdict::Benign);
        assert_eq!(result.reason, "system-owned process");
    }

    #[test]
    fn process_whitelist_matches_case_insensitively() {
        let config = MonitorConfig::default();
        let record = listener([10, 0, 0, 5], 31337, "CHROME");
        let result = classify_listener(&record, &config);
        assert_eq!(result.verdict, Verdict::Benign);
        assert!(config.is_process_whitelisted(&record.process_name));
    }

    #[test]
    fn loopback_listener_is_benign_even_when_nothing_else_matches() {
        let config = MonitorConfig::default();
        let v4 = classify_listener(&listener([127, 0, 0, 1], 31337, UNKNOWN_PROCESS), &config);
        assert_eq!(v4.verdict, Verdict::Benign);

        let v6 = ConnectionRecord {
            local: Endpoint::new("::1".parse().expect("ipv6"), 31337),
            ..listener([127, 0, 0, 1], 31337, UNKNOWN_PROCESS)
        };
        assert_eq!(classify_listener(&v6, &config).verdict, Verdict::Benign);
    }

    #[test]
    fn classification_is_deterministic() {
        let config = MonitorConfig::default();
        let record = listener([10, 0, 0, 5], 8080, "malware.exe");
        assert_eq!(
            classify_listener(&record, &config),
            classify_listener(&record, &config)
        );
    }

    #[test]
    fn listener_is_always_incoming() {
        let config = MonitorConfig::default();
        let record = listener([10, 0, 0, 5], 8080, "nginx");
        assert!(is_incoming(&record, &no_local_addrs(), &config));
    }

    #[test]
    fn well_known_local_port_from_ephemeral_remote_is_incoming() {
        let config = MonitorConfig::default();
        let conn = established(([10, 0, 0, 5], 22), ([203, 0, 113, 9], 52000), "backdoor");
        assert!(is_incoming(&conn, &no_local_addrs(), &config));
    }

    #[test]
    fn loopback_pair_is_never_incoming() {
        let config = MonitorConfig::default();
        let conn = established(([127, 0, 0, 1], 22), ([127, 0, 0, 1], 52000), "sshd");
        assert!(!is_incoming(&conn, &no_local_addrs(), &config));
    }

    #[test]
    fn recognized_process_on_registered_port_is_incoming() {
        let config = MonitorConfig::default();
        let conn = established(([10, 0, 0, 5], 4501), ([203, 0, 113, 9], 443), "PanGPS");
        assert!(is_incoming(&conn, &no_local_addrs(), &config));
    }

    #[test]
    fn recognized_process_above_registered_range_is_not_incoming() {
        let config = MonitorConfig::default();
        let conn = established(([10, 0, 0, 5], 50000), ([203, 0, 113, 9], 443), "chrome");
        assert!(!is_incoming(&conn, &no_local_addrs(), &config));
    }

    #[test]
    fn unrecognized_process_outside_port_band_is_not_incoming() {
        let config = MonitorConfig::default();
        let conn = established(([10, 0, 0, 5], 8080), ([203, 0, 113, 9], 443), "whatever");
        assert!(!is_incoming(&conn, &no_local_addrs(), &config));
    }

    #[test]
    fn non_established_states_are_not_incoming() {
        let config = MonitorConfig::default();
        let mut conn = established(([10, 0, 0, 5], 22), ([203, 0, 113, 9], 52000), "sshd");
        conn.state = SocketState::Other;
        assert!(!is_incoming(&conn, &no_local_addrs(), &config));
    }

    #[test]
    fn established_without_remote_is_not_incoming() {
        let config = MonitorConfig::default();
        let mut conn = established(([10, 0, 0, 5], 22), ([203, 0, 113, 9], 52000), "sshd");
        conn.remote = None;
        assert!(!is_incoming(&conn, &no_local_addrs(), &config));
    }

    #[test]
    fn same_machine_when_addresses_are_equal() {
        let local = endpoint([192, 168, 1, 5], 22);
        let remote = endpoint([192, 168, 1, 5], 52000);
        assert!(is_same_machine(&local, &remote, &no_local_addrs()));
    }

    #[test]
    fn same_machine_when_both_belong_to_the_host() {
        let mut addrs = HashSet::new();
        let _ = addrs.insert(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 5)));
        let _ = addrs.insert(IpAddr::V4(Ipv4Addr::new(10, 8, 0, 2)));
        let local = endpoint([192, 168, 1, 5], 22);
        let remote = endpoint([10, 8, 0, 2], 52000);
        assert!(is_same_machine(&local, &remote, &addrs));
        assert!(!is_same_machine(
            &local,
            &endpoint([203, 0, 113, 9], 52000),
            &addrs
        ));
    }
}

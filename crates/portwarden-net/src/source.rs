//! Snapshot model and the connection-source seam.

use std::collections::HashSet;
use std::net::IpAddr;

use portwarden_common::error::Result;
use portwarden_common::types::{ConnectionRecord, ProcessId};

/// One consistent view of the host's TCP sockets, taken at the start of a
/// polling cycle.
///
/// Process IDs and names are resolved at snapshot time. No freshness
/// guarantee holds between the listener and established tables — OS state
/// may change between the two reads, which is an accepted weak-consistency
/// window.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Listening sockets, deduplicated by (address, port).
    pub listeners: Vec<ConnectionRecord>,
    /// Non-listening sockets (established sessions and other states).
    pub established: Vec<ConnectionRecord>,
    /// The host's own interface addresses, for same-machine detection.
    pub local_addrs: HashSet<IpAddr>,
}

impl Snapshot {
    /// Distinct resolved processes owning any connection in this snapshot,
    /// in first-seen order.
    #[must_use]
    pub fn distinct_processes(&self) -> Vec<(ProcessId, String)> {
        let mut seen = HashSet::new();
        let mut processes = Vec::new();
        for record in self.listeners.iter().chain(&self.established) {
            if record.pid.is_resolved() && seen.insert(record.pid) {
                processes.push((record.pid, record.process_name.clone()));
            }
        }
        processes
    }
}

/// Read-only queries against OS socket and process state.
///
/// Implementors must never fail for individual resolution problems; a
/// snapshot degrades per item to the sentinel PID/name and only errors
/// with `SourceUnavailable` when the socket tables cannot be read at all.
pub trait ConnectionSource {
    /// Takes one snapshot of current listeners and established connections.
    ///
    /// # Errors
    ///
    /// Returns [`portwarden_common::error::WardenError::SourceUnavailable`]
    /// when no socket table could be enumerated.
    fn snapshot(&mut self) -> Result<Snapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use portwarden_common::types::{Endpoint, SocketState, UNKNOWN_PROCESS};
    use std::net::Ipv4Addr;

    fn record(port: u16, pid: i32, name: &str) -> ConnectionRecord {
        ConnectionRecord {
            local: Endpoint::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)), port),
            remote: None,
            state: SocketState::Listening,
            pid: ProcessId::new(pid),
            process_name: name.to_owned(),
        }
    }

    #[test]
    fn distinct_processes_dedups_by_pid() {
        let snapshot = Snapshot {
            listeners: vec![record(80, 100, "nginx"), record(443, 100, "nginx")],
            established: vec![record(8080, 200, "node")],
            local_addrs: HashSet::new(),
        };
        let processes = snapshot.distinct_processes();
        assert_eq!(
            processes,
            vec![
                (ProcessId::new(100), "nginx".to_owned()),
                (ProcessId::new(200), "node".to_owned()),
            ]
        );
    }

    #[test]
    fn distinct_processes_skips_unresolved_pids() {
        let snapshot = Snapshot {
            listeners: vec![record(9999, -1, UNKNOWN_PROCESS)],
            established: Vec::new(),
            local_addrs: HashSet::new(),
        };
        assert!(snapshot.distinct_processes().is_empty());
    }
}

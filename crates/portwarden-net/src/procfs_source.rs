//! procfs-backed connection source for Linux.
//!
//! Builds one socket-inode→PID map per snapshot by walking `/proc/<pid>/fd`
//! and joins it against the kernel TCP tables, instead of spawning a
//! `netstat` subprocess per port.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

use portwarden_common::error::{Result, WardenError};
use portwarden_common::types::{
    ConnectionRecord, Endpoint, ProcessId, SocketState, UNKNOWN_PROCESS,
};

use crate::local_addrs;
use crate::source::{ConnectionSource, Snapshot};

/// Socket-inode→owner map, collected once per snapshot.
#[derive(Debug, Default)]
struct SocketOwners {
    by_inode: HashMap<u64, ProcessId>,
}

impl SocketOwners {
    /// Walks every readable `/proc/<pid>/fd` entry. Processes that exit or
    /// deny access mid-walk are skipped; their sockets stay unresolved.
    fn collect() -> Self {
        let mut by_inode = HashMap::new();

        let processes = match procfs::process::all_processes() {
            Ok(processes) => processes,
            Err(e) => {
                tracing::warn!(error = %e, "could not enumerate processes, owners unresolved");
                return Self::default();
            }
        };

        for process in processes.flatten() {
            let pid = ProcessId::new(process.pid());
            let Ok(fds) = process.fd() else {
                continue;
            };
            for fd in fds.flatten() {
                if let procfs::process::FDTarget::Socket(inode) = fd.target {
                    let _ = by_inode.insert(inode, pid);
                }
            }
        }

        Self { by_inode }
    }

    /// Owner of a socket inode, or the unresolved sentinel.
    fn owner_of(&self, inode: u64) -> ProcessId {
        self.by_inode
            .get(&inode)
            .copied()
            .unwrap_or(ProcessId::UNRESOLVED)
    }
}

/// [`ConnectionSource`] reading the kernel TCP tables through procfs and
/// resolving process names through sysinfo.
pub struct ProcfsSource {
    system: sysinfo::System,
}

impl ProcfsSource {
    /// Creates a new source with an empty process table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            system: sysinfo::System::new(),
        }
    }

    /// Resolves a process name, yielding [`UNKNOWN_PROCESS`] when the
    /// process has exited or the lookup is denied.
    #[must_use]
    pub fn resolve_process_name(&self, pid: ProcessId) -> String {
        if !pid.is_resolved() {
            return UNKNOWN_PROCESS.to_owned();
        }
        #[allow(clippy::cast_sign_loss)]
        let sys_pid = sysinfo::Pid::from_u32(pid.as_raw() as u32);
        match self.system.process(sys_pid) {
            Some(process) if !process.name().is_empty() => {
                process.name().to_string_lossy().into_owned()
            }
            _ => UNKNOWN_PROCESS.to_owned(),
        }
    }

    fn record(&self, entry: &procfs::net::TcpNetEntry, owners: &SocketOwners) -> ConnectionRecord {
        let state = map_state(&entry.state);
        let pid = owners.owner_of(entry.inode);
        ConnectionRecord {
            local: endpoint(entry.local_address),
            remote: if state == SocketState::Listening {
                None
            } else {
                Some(endpoint(entry.remote_address))
            },
            state,
            pid,
            process_name: self.resolve_process_name(pid),
        }
    }
}

impl Default for ProcfsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionSource for ProcfsSource {
    fn snapshot(&mut self) -> Result<Snapshot> {
        let _ = self.system.refresh_processes_specifics(
            sysinfo::ProcessesToUpdate::All,
            true,
            sysinfo::ProcessRefreshKind::nothing(),
        );
        let owners = SocketOwners::collect();

        let tcp4 = procfs::net::tcp();
        let tcp6 = procfs::net::tcp6();
        if let (Err(e4), Err(e6)) = (&tcp4, &tcp6) {
            return Err(WardenError::SourceUnavailable {
                message: format!("tcp: {e4}; tcp6: {e6}"),
            });
        }

        let mut snapshot = Snapshot {
            local_addrs: local_addrs::host_addresses(),
            ..Snapshot::default()
        };
        let mut seen_listeners: HashSet<Endpoint> = HashSet::new();

        for entry in tcp4.into_iter().chain(tcp6).flatten() {
            let record = self.record(&entry, &owners);
            match record.state {
                SocketState::Listening => {
                    // One record per (address, port) pair.
                    if seen_listeners.insert(record.local) {
                        snapshot.listeners.push(record);
                    }
                }
                SocketState::Established | SocketState::Other => {
                    snapshot.established.push(record);
                }
            }
        }

        tracing::debug!(
            listeners = snapshot.listeners.len(),
            established = snapshot.established.len(),
            "snapshot taken"
        );
        Ok(snapshot)
    }
}

const fn map_state(state: &procfs::net::TcpState) -> SocketState {
    match state {
        procfs::net::TcpState::Listen => SocketState::Listening,
        procfs::net::TcpState::Established => SocketState::Established,
        _ => SocketState::Other,
    }
}

fn endpoint(addr: SocketAddr) -> Endpoint {
    Endpoint::new(addr.ip(), addr.port())
}

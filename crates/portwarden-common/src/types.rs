//! Domain primitive types used across the Portwarden workspace.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Process name reported when resolution fails (process exited between
/// snapshot and lookup, or access was denied).
pub const UNKNOWN_PROCESS: &str = "unknown";

/// Identifier of the process owning a socket.
///
/// The OS lookup can legitimately fail — the owning process may have
/// exited, or the query may lack privileges — so an unresolved ID is a
/// valid, expected value rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessId(i32);

impl ProcessId {
    /// Sentinel for a socket whose owner could not be resolved.
    pub const UNRESOLVED: Self = Self(-1);

    /// Creates a process ID from a raw OS PID.
    #[must_use]
    pub const fn new(pid: i32) -> Self {
        Self(pid)
    }

    /// Returns `true` when the ID refers to an actual process.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        self.0 > 0
    }

    /// Returns the raw PID value (`-1` when unresolved).
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_resolved() {
            write!(f, "{}", self.0)
        } else {
            f.write_str("?")
        }
    }
}

/// An address/port pair. Equality is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// IP address of the endpoint.
    pub addr: IpAddr,
    /// TCP port of the endpoint.
    pub port: u16,
}

impl Endpoint {
    /// Creates an endpoint from an address and port.
    #[must_use]
    pub const fn new(addr: IpAddr, port: u16) -> Self {
        Self { addr, port }
    }

    /// Returns `true` when the address is a loopback literal (IPv4 or IPv6).
    #[must_use]
    pub const fn is_loopback(&self) -> bool {
        self.addr.is_loopback()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.addr, self.port)
    }
}

/// State of a TCP socket as observed in the OS tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketState {
    /// Accepting inbound connection attempts.
    Listening,
    /// Active bidirectional session with a remote endpoint.
    Established,
    /// Any other TCP state (`SYN_SENT`, `TIME_WAIT`, ...).
    Other,
}

/// One TCP socket with its owning process, resolved at snapshot time.
///
/// Resolving the PID and process name when the snapshot is taken keeps a
/// cycle's findings self-consistent even if the process exits mid-cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Local endpoint of the socket.
    pub local: Endpoint,
    /// Remote endpoint; absent for pure listeners.
    pub remote: Option<Endpoint>,
    /// Observed socket state.
    pub state: SocketState,
    /// Owning process, or [`ProcessId::UNRESOLVED`].
    pub pid: ProcessId,
    /// Owning process name, or [`UNKNOWN_PROCESS`].
    pub process_name: String,
}

/// Classification outcome for one connection or process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Covered by a whitelist, a trusted name, or loopback exemption.
    Benign,
    /// Merits the operator's attention.
    Suspicious,
    /// Recognized as commonly legitimate but still worth surfacing.
    KnownNotable,
}

/// The analysis stage that produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageKind {
    /// Classification of every listening socket.
    ListeningServices,
    /// Established connections that look externally initiated.
    EstablishedIncoming,
    /// Whitelist check over every process owning a connection.
    ProcessInventory,
    /// Known-but-notable processes with incoming connections.
    KnownNotableIncoming,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ListeningServices => "listening services",
            Self::EstablishedIncoming => "established incoming connections",
            Self::ProcessInventory => "processes with network connections",
            Self::KnownNotableIncoming => "known processes with incoming connections",
        })
    }
}

/// One classified observation emitted by an analysis stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Stage that produced this finding.
    pub stage: StageKind,
    /// Classification verdict.
    pub verdict: Verdict,
    /// The connection the verdict applies to.
    pub record: ConnectionRecord,
    /// Short human-readable reason for the verdict.
    pub reason: String,
    /// For known-notable findings: whether the process also holds at
    /// least one non-same-machine established connection.
    pub external_confirmed: Option<bool>,
}

/// Severity of an operator alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSeverity {
    /// Suspicious listener exposed to the network.
    Critical,
    /// Externally initiated established connection.
    Warning,
    /// Non-whitelisted process observed with a connection.
    Info,
}

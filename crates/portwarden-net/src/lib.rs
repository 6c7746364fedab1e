//! # portwarden-net
//!
//! The connection source: read-only queries against OS socket and process
//! state, producing per-cycle snapshots of listeners and established
//! connections with their owning processes resolved.
//!
//! Individual lookup failures degrade to the sentinel values defined in
//! `portwarden-common` — only a total inability to read the socket tables
//! surfaces as an error.

pub mod local_addrs;
pub mod procfs_source;
pub mod source;

pub use procfs_source::ProcfsSource;
pub use source::{ConnectionSource, Snapshot};

//! Unified error types for the Portwarden workspace.
//!
//! Per-item lookup failures (a port with no resolvable owner, a process
//! that exited mid-cycle) are not errors at all — they degrade to the
//! sentinel values defined in [`crate::types`]. These variants cover the
//! failures that abort an operation outright.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum WardenError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// The OS socket/process tables could not be queried at all.
    ///
    /// Raised only on total enumeration failure for one cycle; the
    /// scheduler logs it and proceeds to the next cycle.
    #[error("connection source unavailable: {message}")]
    SourceUnavailable {
        /// Description of the enumeration failure.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, WardenError>;

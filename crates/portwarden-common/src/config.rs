//! Monitoring configuration model and on-disk store.
//!
//! The persisted shape keeps the camelCase field names of the legacy
//! `security_config.json` so existing operator configs keep loading.
//! Configuration is immutable for the duration of one polling cycle; the
//! engine only ever reads it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WardenError};

/// Default poll interval in milliseconds.
const DEFAULT_CHECK_INTERVAL_MS: u64 = 5000;

/// Operator-configured whitelists and monitoring options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    /// Ports exempt from listener suspicion. Deduplicated by construction.
    pub whitelisted_ports: BTreeSet<u16>,
    /// Process names exempt from suspicion, matched case-insensitively.
    pub whitelisted_processes: Vec<String>,
    /// Known-but-notable process names mapped to a human description.
    /// Keys are matched case-insensitively.
    pub known_suspicious_processes: BTreeMap<String, String>,
    /// Poll interval in milliseconds.
    #[serde(rename = "checkInterval")]
    pub check_interval_ms: u64,
    /// Whether suspicious findings are appended to the log file.
    pub log_to_file: bool,
}

impl MonitorConfig {
    /// Returns `true` when the port is operator-approved.
    #[must_use]
    pub fn is_port_whitelisted(&self, port: u16) -> bool {
        self.whitelisted_ports.contains(&port)
    }

    /// Case-insensitive whitelist membership. A blank name is never
    /// whitelisted.
    #[must_use]
    pub fn is_process_whitelisted(&self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.whitelisted_processes
            .iter()
            .any(|p| p.eq_ignore_ascii_case(name))
    }

    /// Case-insensitive lookup in the known-notable map, returning the
    /// configured description on a hit.
    #[must_use]
    pub fn notable_description(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.known_suspicious_processes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` when the name is present in the known-notable map.
    #[must_use]
    pub fn is_known_notable(&self, name: &str) -> bool {
        self.notable_description(name).is_some()
    }

    /// Poll interval as a duration. A zero interval in a stored config is
    /// treated as invalid and replaced with the built-in default.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        if self.check_interval_ms == 0 {
            Duration::from_millis(DEFAULT_CHECK_INTERVAL_MS)
        } else {
            Duration::from_millis(self.check_interval_ms)
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            whitelisted_ports: [
                80, 443, 53, 21, 22, 25, 110, 143, 5432, 7680, 4767, 135, 139, 445, 5040, 49664,
                49665, 49666, 49667, 49668, 49669, 49672,
            ]
            .into_iter()
            .collect(),
            whitelisted_processes: [
                "chrome",
                "firefox",
                "edge",
                "explorer",
                "svchost",
                "winlogon",
                "services",
                "system",
                "postgres",
                "java",
                "code",
                "node",
                "python",
                "php",
                "docker",
                "sshd",
                "systemd",
                "slack",
                "pangps",
                "embeddings-server",
                "datagrip64",
                "com.docker.backend",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            known_suspicious_processes: [
                ("PanGPS", "GlobalProtect VPN - Corporate software"),
                ("embeddings-server", "AI Service - Legitimate"),
                ("datagrip64", "JetBrains DataGrip - Legitimate IDE"),
                ("com.docker.backend", "Docker Desktop - Legitimate"),
                ("OneDrive.Sync.Service", "Microsoft OneDrive - Legitimate"),
                ("jhi_service", "Intel Service - Legitimate"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect(),
            check_interval_ms: DEFAULT_CHECK_INTERVAL_MS,
            log_to_file: true,
        }
    }
}

/// Loads and persists [`MonitorConfig`] as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default location under the data directory.
    #[must_use]
    pub fn default_location() -> Self {
        Self::new(crate::constants::default_config_file())
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored configuration.
    ///
    /// A missing or unparsable file falls back to the built-in defaults,
    /// which are best-effort persisted so every subsequent load observes
    /// the same stable values.
    #[must_use]
    pub fn load(&self) -> MonitorConfig {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    tracing::debug!(path = %self.path.display(), "configuration loaded");
                    config
                }
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "stored configuration is unparsable, using defaults"
                    );
                    self.fall_back_to_defaults()
                }
            },
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "no stored configuration, using defaults"
                );
                self.fall_back_to_defaults()
            }
        }
    }

    fn fall_back_to_defaults(&self) -> MonitorConfig {
        let config = MonitorConfig::default();
        if let Err(e) = self.save(&config) {
            tracing::warn!(error = %e, "could not persist default configuration");
        }
        config
    }

    /// Persists the configuration, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn save(&self, config: &MonitorConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| WardenError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, json).map_err(|source| WardenError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

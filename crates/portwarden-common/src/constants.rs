//! System-wide constants and default paths.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Default base directory for Portwarden data on Linux with root access.
pub const SYSTEM_DATA_DIR: &str = "/var/lib/portwarden";

/// Returns the data directory, preferring `$HOME/.portwarden` for non-root
/// environments, falling back to `/var/lib/portwarden`.
fn resolve_data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        let user_dir = PathBuf::from(home).join(".portwarden");
        if std::fs::create_dir_all(&user_dir).is_ok() {
            return user_dir;
        }
    }
    PathBuf::from(SYSTEM_DATA_DIR)
}

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the resolved data directory for this session.
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(resolve_data_dir)
}

/// Returns the default configuration file path.
pub fn default_config_file() -> PathBuf {
    data_dir().join("security_config.json")
}

/// Returns the default findings log path.
pub fn default_log_file() -> PathBuf {
    data_dir().join("findings.log")
}

/// Highest registered port; everything above is the dynamic/ephemeral range.
pub const MAX_REGISTERED_PORT: u16 = 49151;

/// Upper bound of the well-known port range.
pub const WELL_KNOWN_PORT_CEILING: u16 = 1024;

/// Remote ports above this value are treated as ephemeral client ports.
pub const DYNAMIC_PORT_FLOOR: u16 = 49152;

/// Process names trusted unconditionally before any whitelist is consulted.
pub const TRUSTED_SYSTEM_PROCESSES: &[&str] = &["System", "svchost"];

/// Slice used for cancellation-aware sleeping, bounding shutdown latency.
pub const SHUTDOWN_POLL_MS: u64 = 100;

/// Application name used in CLI output and data paths.
pub const APP_NAME: &str = "portwarden";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "pwarden";

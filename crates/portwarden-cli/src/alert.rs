//! Audible alerts via the terminal bell.
//!
//! Strictly best-effort: a terminal without a bell, a closed stdout, or
//! any other failure must never interrupt monitoring.

use std::io::Write;
use std::time::Duration;

use portwarden_common::types::AlertSeverity;

/// Plays bell patterns for findings that merit attention.
#[derive(Debug, Clone, Copy)]
pub struct AlertSink {
    enabled: bool,
}

impl AlertSink {
    /// Creates a sink; a disabled sink swallows every alert.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Sounds the bell pattern for the given severity.
    pub fn play(&self, severity: AlertSeverity) {
        if !self.enabled {
            return;
        }
        let bells = match severity {
            AlertSeverity::Critical => 2,
            AlertSeverity::Warning | AlertSeverity::Info => 1,
        };
        for _ in 0..bells {
            if let Err(e) = write_bell() {
                tracing::debug!(error = %e, "sound alert unavailable");
                return;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

fn write_bell() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(b"\x07")?;
    stdout.flush()
}

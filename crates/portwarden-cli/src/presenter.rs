//! Console rendering of cycle findings.
//!
//! The presenter is the only component that prints; analysis stages hand
//! it structured findings. In raw terminal mode (the `watch` command) it
//! emits explicit `\r\n` line endings.

#![allow(clippy::print_stdout)]

use std::fmt;
use std::io::Write;

use crossterm::style::Stylize;
use portwarden_common::constants::TRUSTED_SYSTEM_PROCESSES;
use portwarden_common::types::{
    AlertSeverity, Finding, StageKind, UNKNOWN_PROCESS, Verdict,
};
use portwarden_engine::CycleReport;

/// Maps a finding to the alert severity it should sound, if any.
#[must_use]
pub fn severity_for(finding: &Finding) -> Option<AlertSeverity> {
    match (finding.stage, finding.verdict) {
        (StageKind::ListeningServices, Verdict::Suspicious) => Some(AlertSeverity::Critical),
        (StageKind::EstablishedIncoming, Verdict::Suspicious) => Some(AlertSeverity::Warning),
        (StageKind::ProcessInventory, Verdict::Suspicious) => Some(AlertSeverity::Info),
        _ => None,
    }
}

/// Renders findings to the console with color-coded verdicts.
#[derive(Debug, Clone, Copy)]
pub struct Presenter {
    raw: bool,
}

impl Presenter {
    /// Creates a presenter; `raw` selects `\r\n` line endings for raw
    /// terminal mode.
    #[must_use]
    pub const fn new(raw: bool) -> Self {
        Self { raw }
    }

    /// Prints one line, honoring the raw-mode line ending.
    pub fn line(&self, text: impl fmt::Display) {
        if self.raw {
            print!("{text}\r\n");
            let _ = std::io::stdout().flush();
        } else {
            println!("{text}");
        }
    }

    /// Renders one cycle: a timestamped header, then findings grouped by
    /// stage, then a reassurance line for stages with nothing to show.
    pub fn render_cycle(&self, report: &CycleReport) {
        self.line(format!(
            "[{}] scan #{} (press q to quit)",
            chrono::Local::now().format("%H:%M:%S"),
            report.cycle
        ));

        for stage in [
            StageKind::ListeningServices,
            StageKind::EstablishedIncoming,
            StageKind::ProcessInventory,
            StageKind::KnownNotableIncoming,
        ] {
            self.render_stage(stage, report);
        }
        self.line("");
    }

    fn render_stage(&self, stage: StageKind, report: &CycleReport) {
        self.line(format!("{stage}:").to_uppercase().cyan());

        let mut shown = 0usize;
        for finding in report.findings.iter().filter(|f| f.stage == stage) {
            if self.render_finding(finding) {
                shown += 1;
            }
        }
        if shown == 0 {
            self.line("  nothing to report".green());
        }
    }

    /// Renders one finding; returns `false` when it is suppressed as
    /// benign noise.
    fn render_finding(&self, finding: &Finding) -> bool {
        let record = &finding.record;
        if finding.verdict == Verdict::Benign
            && (record.process_name == UNKNOWN_PROCESS
                || TRUSTED_SYSTEM_PROCESSES.contains(&record.process_name.as_str()))
        {
            return false;
        }

        let text = match finding.stage {
            StageKind::ListeningServices => format!(
                "  port {} - {} (pid {}) [{}]",
                record.local.port, record.process_name, record.pid, finding.reason
            ),
            StageKind::EstablishedIncoming => format!(
                "  {} <- {} - {} (pid {})",
                record.local,
                record.remote.map_or_else(|| "?".to_owned(), |r| r.to_string()),
                record.process_name,
                record.pid
            ),
            StageKind::ProcessInventory => format!(
                "  {} (pid {}) [{}]",
                record.process_name, record.pid, finding.reason
            ),
            StageKind::KnownNotableIncoming => format!(
                "  {} (pid {}) - {} [{}]",
                record.process_name,
                record.pid,
                finding.reason,
                if finding.external_confirmed == Some(true) {
                    "external incoming connections detected"
                } else {
                    "only local connections, check manually"
                }
            ),
        };

        match finding.verdict {
            Verdict::Benign => self.line(text.green()),
            Verdict::Suspicious => self.line(text.red()),
            Verdict::KnownNotable => self.line(text.yellow()),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portwarden_common::types::{ConnectionRecord, Endpoint, ProcessId, SocketState};
    use std::net::{IpAddr, Ipv4Addr};

    fn finding(stage: StageKind, verdict: Verdict, name: &str) -> Finding {
        Finding {
            stage,
            verdict,
            record: ConnectionRecord {
                local: Endpoint::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 8080),
                remote: None,
                state: SocketState::Listening,
                pid: ProcessId::new(1),
                process_name: name.to_owned(),
            },
            reason: "test".to_owned(),
            external_confirmed: None,
        }
    }

    #[test]
    fn suspicious_listener_sounds_critical() {
        let f = finding(StageKind::ListeningServices, Verdict::Suspicious, "x");
        assert_eq!(severity_for(&f), Some(AlertSeverity::Critical));
    }

    #[test]
    fn established_incoming_sounds_warning() {
        let f = finding(StageKind::EstablishedIncoming, Verdict::Suspicious, "x");
        assert_eq!(severity_for(&f), Some(AlertSeverity::Warning));
    }

    #[test]
    fn benign_and_notable_findings_are_silent() {
        let benign = finding(StageKind::ListeningServices, Verdict::Benign, "chrome");
        assert_eq!(severity_for(&benign), None);
        let notable = finding(StageKind::KnownNotableIncoming, Verdict::KnownNotable, "PanGPS");
        assert_eq!(severity_for(&notable), None);
    }
}

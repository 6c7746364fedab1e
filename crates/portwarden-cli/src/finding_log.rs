//! Append-only log of suspicious findings.
//!
//! A write failure is reported once and otherwise ignored; monitoring
//! continues regardless of log health.

use std::io::Write;
use std::path::PathBuf;

use portwarden_common::types::{Finding, Verdict};

/// Timestamped, append-only finding log.
#[derive(Debug)]
pub struct FindingLog {
    path: PathBuf,
    enabled: bool,
    warned: bool,
}

impl FindingLog {
    /// Creates a log writer; disabled logs drop every entry.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            path: path.into(),
            enabled,
            warned: false,
        }
    }

    /// Appends one entry per suspicious finding; everything else is
    /// skipped.
    pub fn record(&mut self, finding: &Finding) {
        if !self.enabled || finding.verdict != Verdict::Suspicious {
            return;
        }
        let line = format!(
            "[{}] {}: {} (pid {}) {} - {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            finding.stage,
            finding.record.process_name,
            finding.record.pid,
            finding.record.local,
            finding.reason
        );
        if let Err(e) = self.append(&line) {
            if !self.warned {
                self.warned = true;
                tracing::warn!(path = %self.path.display(), error = %e, "finding log unavailable");
            }
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portwarden_common::types::{ConnectionRecord, Endpoint, ProcessId, SocketState, StageKind};
    use std::net::{IpAddr, Ipv4Addr};

    fn finding(verdict: Verdict) -> Finding {
        Finding {
            stage: StageKind::ListeningServices,
            verdict,
            record: ConnectionRecord {
                local: Endpoint::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 8080),
                remote: None,
                state: SocketState::Listening,
                pid: ProcessId::new(7),
                process_name: "malware.exe".to_owned(),
            },
            reason: "not covered by any whitelist".to_owned(),
            external_confirmed: None,
        }
    }

    #[test]
    fn suspicious_findings_are_appended() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("findings.log");
        let mut log = FindingLog::new(&path, true);

        log.record(&finding(Verdict::Suspicious));
        log.record(&finding(Verdict::Suspicious));

        let contents = std::fs::read_to_string(&path).expect("log exists");
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("malware.exe"));
    }

    #[test]
    fn benign_findings_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("findings.log");
        let mut log = FindingLog::new(&path, true);

        log.record(&finding(Verdict::Benign));
        assert!(!path.exists());
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("findings.log");
        let mut log = FindingLog::new(&path, false);

        log.record(&finding(Verdict::Suspicious));
        assert!(!path.exists());
    }
}

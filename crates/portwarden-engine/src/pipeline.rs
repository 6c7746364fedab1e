//! Ordered analysis stages over one snapshot.
//!
//! Stages are independent — no stage consumes another's output — but they
//! run in a fixed order so findings within a cycle are reproducibly
//! ordered. Every stage checks the shared cancellation flag between items,
//! bounding shutdown latency to one item's evaluation, and returns partial
//! findings when interrupted.

use portwarden_common::config::MonitorConfig;
use portwarden_common::types::{ConnectionRecord, Finding, ProcessId, SocketState, StageKind, Verdict};
use portwarden_net::Snapshot;

use crate::cancel::CancelFlag;
use crate::classify;

/// One analysis stage pairing a subset of snapshot data with the
/// classifier.
pub trait AnalyzerStage {
    /// Identifies the stage in findings and logs.
    fn kind(&self) -> StageKind;

    /// Runs the stage over one snapshot. Partial results are valid when
    /// cancellation interrupts the iteration.
    fn analyze(&self, snapshot: &Snapshot, config: &MonitorConfig, cancel: &CancelFlag)
    -> Vec<Finding>;
}

/// Classifies every listening socket.
pub struct ListeningServices;

impl AnalyzerStage for ListeningServices {
    fn kind(&self) -> StageKind {
        StageKind::ListeningServices
    }

    fn analyze(
        &self,
        snapshot: &Snapshot,
        config: &MonitorConfig,
        cancel: &CancelFlag,
    ) -> Vec<Finding> {
        let mut findings = Vec::with_capacity(snapshot.listeners.len());
        for listener in &snapshot.listeners {
            if cancel.is_cancelled() {
                break;
            }
            let classification = classify::classify_listener(listener, config);
            findings.push(Finding {
                stage: self.kind(),
                verdict: classification.verdict,
                record: listener.clone(),
                reason: classification.reason.to_owned(),
                external_confirmed: None,
            });
        }
        findings
    }
}

/// Surfaces established connections that look externally initiated.
pub struct EstablishedIncoming;

impl AnalyzerStage for EstablishedIncoming {
    fn kind(&self) -> StageKind {
        StageKind::EstablishedIncoming
    }

    fn analyze(
        &self,
        snapshot: &Snapshot,
        config: &MonitorConfig,
        cancel: &CancelFlag,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();
        for conn in &snapshot.established {
            if cancel.is_cancelled() {
                break;
            }
            if conn.state == SocketState::Established
                && classify::is_incoming(conn, &snapshot.local_addrs, config)
            {
                findings.push(Finding {
                    stage: self.kind(),
                    verdict: Verdict::Suspicious,
                    record: conn.clone(),
                    reason: "established incoming connection".to_owned(),
                    external_confirmed: None,
                });
            }
        }
        findings
    }
}

/// Checks every process owning a connection against the whitelist.
pub struct ProcessInventory;

impl AnalyzerStage for ProcessInventory {
    fn kind(&self) -> StageKind {
        StageKind::ProcessInventory
    }

    fn analyze(
        &self,
        snapshot: &Snapshot,
        config: &MonitorConfig,
        cancel: &CancelFlag,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (pid, name) in snapshot.distinct_processes() {
            if cancel.is_cancelled() {
                break;
            }
            let Some(record) = first_record_of(snapshot, pid) else {
                continue;
            };
            let whitelisted = config.is_process_whitelisted(&name);
            findings.push(Finding {
                stage: self.kind(),
                verdict: if whitelisted {
                    Verdict::Benign
                } else {
                    Verdict::Suspicious
                },
                record: record.clone(),
                reason: if whitelisted {
                    "process whitelisted".to_owned()
                } else {
                    "process not whitelisted".to_owned()
                },
                external_confirmed: None,
            });
        }
        findings
    }
}

/// Surfaces known-but-notable processes with incoming connections, flagging
/// whether each also holds a non-same-machine established connection.
pub struct KnownNotableIncoming;

impl AnalyzerStage for KnownNotableIncoming {
    fn kind(&self) -> StageKind {
        StageKind::KnownNotableIncoming
    }

    fn analyze(
        &self,
        snapshot: &Snapshot,
        config: &MonitorConfig,
        cancel: &CancelFlag,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut seen: Vec<ProcessId> = Vec::new();

        for conn in snapshot.listeners.iter().chain(&snapshot.established) {
            if cancel.is_cancelled() {
                break;
            }
            if !classify::is_incoming(conn, &snapshot.local_addrs, config) {
                continue;
            }
            let Some(description) = config.notable_description(&conn.process_name) else {
                continue;
            };
            if seen.contains(&conn.pid) {
                continue;
            }
            seen.push(conn.pid);

            findings.push(Finding {
                stage: self.kind(),
                verdict: Verdict::KnownNotable,
                record: conn.clone(),
                reason: description.to_owned(),
                external_confirmed: Some(has_external_connection(snapshot, conn.pid)),
            });
        }
        findings
    }
}

fn first_record_of(snapshot: &Snapshot, pid: ProcessId) -> Option<&ConnectionRecord> {
    snapshot
        .listeners
        .iter()
        .chain(&snapshot.established)
        .find(|r| r.pid == pid)
}

fn has_external_connection(snapshot: &Snapshot, pid: ProcessId) -> bool {
    snapshot.established.iter().any(|conn| {
        conn.pid == pid
            && conn.state == SocketState::Established
            && conn.remote.as_ref().is_some_and(|remote| {
                !classify::is_same_machine(&conn.local, remote, &snapshot.local_addrs)
            })
    })
}

/// The fixed, ordered sequence of analysis stages run each cycle.
pub struct AnalyzerPipeline {
    stages: Vec<Box<dyn AnalyzerStage + Send>>,
}

impl AnalyzerPipeline {
    /// Creates the standard four-stage pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: vec![
                Box::new(ListeningServices),
                Box::new(EstablishedIncoming),
                Box::new(ProcessInventory),
                Box::new(KnownNotableIncoming),
            ],
        }
    }

    /// Creates a pipeline over a custom stage sequence, run in the given
    /// order.
    #[must_use]
    pub fn with_stages(stages: Vec<Box<dyn AnalyzerStage + Send>>) -> Self {
        Self { stages }
    }

    /// Runs every stage in order, checking the cancellation flag between
    /// stages. Findings accumulated before an interruption are returned.
    #[must_use]
    pub fn run(
        &self,
        snapshot: &Snapshot,
        config: &MonitorConfig,
        cancel: &CancelFlag,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();
        for stage in &self.stages {
            if cancel.is_cancelled() {
                break;
            }
            let stage_findings = stage.analyze(snapshot, config, cancel);
            tracing::debug!(stage = %stage.kind(), count = stage_findings.len(), "stage done");
            findings.extend(stage_findings);
        }
        findings
    }
}

impl Default for AnalyzerPipeline {
    fn default() -> Self {
        Self::new()
    }
}

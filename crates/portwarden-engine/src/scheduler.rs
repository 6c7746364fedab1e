//! Fixed-interval polling driver.
//!
//! Runs snapshot → pipeline → report cycles until the shared cancellation
//! flag is set, then joins the cooperating watcher thread before returning
//! control. Cycles are strictly sequential; findings always reflect one
//! consistent snapshot.

use std::thread::JoinHandle;
use std::time::Duration;

use portwarden_common::config::MonitorConfig;
use portwarden_common::constants::SHUTDOWN_POLL_MS;
use portwarden_common::error::{Result, WardenError};
use portwarden_common::types::Finding;
use portwarden_net::ConnectionSource;

use crate::cancel::CancelFlag;
use crate::pipeline::AnalyzerPipeline;

/// Lifecycle of the scheduler. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, not yet run.
    Idle,
    /// Cycle loop in progress.
    Running,
    /// Cycle loop exited; the scheduler cannot be restarted.
    Stopped,
}

/// Findings of one completed (possibly interrupted) polling cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Zero-based cycle counter.
    pub cycle: u64,
    /// Findings in fixed stage order.
    pub findings: Vec<Finding>,
}

/// Drives the analyzer pipeline at the configured interval.
pub struct PollingScheduler<S> {
    source: S,
    pipeline: AnalyzerPipeline,
    cancel: CancelFlag,
    state: SchedulerState,
    watcher: Option<JoinHandle<()>>,
}

impl<S: ConnectionSource> PollingScheduler<S> {
    /// Creates an idle scheduler over the given connection source.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            pipeline: AnalyzerPipeline::new(),
            cancel: CancelFlag::new(),
            state: SchedulerState::Idle,
            watcher: None,
        }
    }

    /// Returns a handle to the shared cancellation flag, for watcher
    /// threads and signal handlers.
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Requests a cooperative stop; observed at the next checkpoint.
    pub fn request_stop(&self) {
        self.cancel.cancel();
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// Registers a watcher thread to be joined when the cycle loop exits,
    /// so a clean stop leaks no thread.
    pub fn attach_watcher(&mut self, handle: JoinHandle<()>) {
        self.watcher = Some(handle);
    }

    /// Runs the cycle loop until stop is requested.
    ///
    /// A cycle whose snapshot fails with `SourceUnavailable` is logged and
    /// skipped — transient OS hiccups must not terminate monitoring. Any
    /// other error requests a stop and joins the watcher before
    /// surfacing.
    ///
    /// # Errors
    ///
    /// Returns an error when called on a non-idle scheduler, or when a
    /// cycle fails with anything other than `SourceUnavailable`.
    pub fn run(
        &mut self,
        config: &MonitorConfig,
        report: &mut dyn FnMut(CycleReport),
    ) -> Result<()> {
        if self.state != SchedulerState::Idle {
            return Err(WardenError::Config {
                message: "scheduler cannot be restarted".to_owned(),
            });
        }
        self.state = SchedulerState::Running;
        tracing::info!(interval = ?config.interval(), "monitoring started");

        let result = self.cycle_loop(config, report);

        self.state = SchedulerState::Stopped;
        // Set even on the error path so the watcher always observes stop.
        self.cancel.cancel();
        if let Some(handle) = self.watcher.take() {
            if handle.join().is_err() {
                tracing::warn!("input watcher thread panicked");
            }
        }
        tracing::info!("monitoring stopped");
        result
    }

    fn cycle_loop(
        &mut self,
        config: &MonitorConfig,
        report: &mut dyn FnMut(CycleReport),
    ) -> Result<()> {
        let mut cycle: u64 = 0;
        while !self.cancel.is_cancelled() {
            match self.source.snapshot() {
                Ok(snapshot) => {
                    // Partial findings from an interrupted pipeline are
                    // still reported.
                    let findings = self.pipeline.run(&snapshot, config, &self.cancel);
                    report(CycleReport { cycle, findings });
                }
                Err(WardenError::SourceUnavailable { message }) => {
                    tracing::warn!(%message, "socket tables unavailable, skipping cycle");
                }
                Err(e) => return Err(e),
            }
            cycle += 1;
            self.sleep_until_cancelled(config.interval());
        }
        Ok(())
    }

    /// Sleeps in short slices so a stop request interrupts the wait within
    /// one slice instead of one full poll interval.
    fn sleep_until_cancelled(&self, total: Duration) {
        let slice = Duration::from_millis(SHUTDOWN_POLL_MS);
        let mut remaining = total;
        while !self.cancel.is_cancelled() && !remaining.is_zero() {
            let step = remaining.min(slice);
            std::thread::sleep(step);
            remaining = remaining.saturating_sub(step);
        }
    }
}

//! Continuous monitoring command.

use anyhow::Context;
use clap::Args;
use crossterm::style::Stylize;
use portwarden_common::config::ConfigStore;
use portwarden_engine::PollingScheduler;
use portwarden_net::ProcfsSource;

use crate::alert::AlertSink;
use crate::finding_log::FindingLog;
use crate::input;
use crate::presenter::{self, Presenter};

/// Arguments for `pwarden watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Override the configured poll interval, in milliseconds.
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Disable the audible alert bell.
    #[arg(long)]
    pub silent: bool,
}

/// Runs the monitoring loop until a shutdown keystroke or signal.
///
/// # Errors
///
/// Returns an error if the signal handler cannot be installed or the
/// scheduler fails fatally.
pub fn execute(args: WatchArgs, store: &ConfigStore) -> anyhow::Result<()> {
    let mut config = store.load();
    if let Some(ms) = args.interval_ms {
        config.check_interval_ms = ms;
    }

    let mut scheduler = PollingScheduler::new(ProcfsSource::new());
    let cancel = scheduler.cancel_flag();

    // Covers the non-tty case; with a raw terminal, Ctrl-C arrives as a
    // key event handled by the watcher instead.
    let signal_cancel = cancel.clone();
    ctrlc::set_handler(move || signal_cancel.cancel())
        .context("could not install signal handler")?;

    let raw = crossterm::terminal::enable_raw_mode().is_ok();
    scheduler.attach_watcher(input::spawn_watcher(cancel));

    let presenter = Presenter::new(raw);
    presenter.line(
        format!(
            "{} - watching TCP sockets every {} ms",
            portwarden_common::constants::APP_NAME,
            config.interval().as_millis()
        )
        .cyan(),
    );

    let alerts = AlertSink::new(!args.silent);
    let mut log = FindingLog::new(
        portwarden_common::constants::default_log_file(),
        config.log_to_file,
    );

    let result = scheduler.run(&config, &mut |report| {
        presenter.render_cycle(&report);
        for finding in &report.findings {
            if let Some(severity) = presenter::severity_for(finding) {
                alerts.play(severity);
            }
            log.record(finding);
        }
    });

    if raw {
        let _ = crossterm::terminal::disable_raw_mode();
    }
    // The scheduler has already joined the watcher, on both exit paths.
    result.context("monitoring loop failed")?;
    presenter.line("monitoring stopped".red());
    Ok(())
}

//! Single-cycle scan command.

#![allow(clippy::print_stdout)]

use anyhow::Context;
use clap::Args;
use portwarden_common::config::ConfigStore;
use portwarden_engine::{AnalyzerPipeline, CancelFlag, CycleReport};
use portwarden_net::{ConnectionSource, ProcfsSource};

use crate::presenter::Presenter;

/// Arguments for `pwarden scan`.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Emit findings as JSON instead of styled text.
    #[arg(long)]
    pub json: bool,
}

/// Takes one snapshot, runs the pipeline once, and prints the findings.
///
/// # Errors
///
/// Returns an error if the socket tables cannot be enumerated.
pub fn execute(args: &ScanArgs, store: &ConfigStore) -> anyhow::Result<()> {
    let config = store.load();
    let mut source = ProcfsSource::new();
    let snapshot = source.snapshot().context("could not take snapshot")?;
    let findings = AnalyzerPipeline::new().run(&snapshot, &config, &CancelFlag::new());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
    } else {
        Presenter::new(false).render_cycle(&CycleReport { cycle: 0, findings });
    }
    Ok(())
}

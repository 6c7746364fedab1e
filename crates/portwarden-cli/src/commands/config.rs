//! Configuration inspection and initialization command.

#![allow(clippy::print_stdout)]

use clap::Args;
use portwarden_common::config::{ConfigStore, MonitorConfig};

/// Arguments for `pwarden config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write the built-in defaults to the store path and exit.
    #[arg(long)]
    pub init: bool,
}

/// Shows the active configuration, or initializes the store.
///
/// # Errors
///
/// Returns an error if writing the defaults fails.
pub fn execute(args: &ConfigArgs, store: &ConfigStore) -> anyhow::Result<()> {
    if args.init {
        store.save(&MonitorConfig::default())?;
        println!("defaults written to {}", store.path().display());
        return Ok(());
    }
    let config = store.load();
    println!("# {}", store.path().display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

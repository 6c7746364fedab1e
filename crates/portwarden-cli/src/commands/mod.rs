//! CLI command definitions and dispatch.

pub mod config;
pub mod scan;
pub mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use portwarden_common::config::ConfigStore;

/// Portwarden — host TCP socket security monitor.
#[derive(Parser, Debug)]
#[command(name = portwarden_common::constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Monitor continuously until q/Esc/Ctrl-C is pressed.
    Watch(watch::WatchArgs),
    /// Run a single polling cycle and print the findings.
    Scan(scan::ScanArgs),
    /// Show or initialize the stored configuration.
    Config(config::ConfigArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let store = cli
        .config
        .map_or_else(ConfigStore::default_location, ConfigStore::new);
    match cli.command {
        Command::Watch(args) => watch::execute(args, &store),
        Command::Scan(args) => scan::execute(&args, &store),
        Command::Config(args) => config::execute(&args, &store),
    }
}

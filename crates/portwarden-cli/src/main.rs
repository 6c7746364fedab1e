//! # pwarden — Portwarden CLI
//!
//! Host network security monitor: watches TCP listeners and established
//! connections, classifying each against operator whitelists.

mod alert;
mod commands;
mod finding_log;
mod input;
mod presenter;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}

//! ## sluice-cli
//! **Command-line entrypoint for the resource simulation**
//!
//! `sluice run` loads a configuration, runs every system to completion and prints the
//! final report. `sluice check` only validates the configuration.

use clap::Parser;

mod commands;

use commands::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::run_command(cli)
}

//! Asset Export CLI Binary
//!
//! Converts asset server history into a git fast-import commit stream.

use anyhow::Context;
use asset_export::logging::init_logging;
use asset_export::tooling::cli::{Cli, CliContext};
use clap::Parser;
use std::process;

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut context =
        CliContext::new(cli.config.clone()).context("Failed to load configuration")?;
    cli.apply_logging_overrides(&mut context.config_mut().logging);
    context.check_logging(&cli.command)?;
    init_logging(Some(&context.config().logging)).context("Failed to initialize logging")?;

    let output = context.execute(&cli.command)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

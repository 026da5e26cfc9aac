// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Catapult CLI
//!
//! Entry point for the `catapult` binary. Parses CLI arguments, initializes
//! logging, runs one offline command, and prints its JSON result on stdout.
//!
//! Subcommands:
//!
//! - `keygen`        - generate an account
//! - `sign-transfer` - build and sign a transfer
//! - `decode`        - decode a hex payload
//! - `verify`        - check a payload's signatures
//! - `version`       - print build version information

mod cli;
mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use cli::{CatapultCli, Commands};

fn main() -> Result<()> {
    let cli = CatapultCli::parse();
    let level = if cli.verbose {
        "catapult=debug,catapult_sdk=debug"
    } else {
        "catapult=warn,catapult_sdk=warn"
    };
    logging::init_logging(level, cli.log_format);

    let output = match &cli.command {
        Commands::Keygen(args) => commands::keygen(args),
        Commands::SignTransfer(args) => commands::sign_transfer(args)?,
        Commands::Decode(args) => commands::decode(args)?,
        Commands::Verify(args) => commands::verify(args)?,
        Commands::Version => {
            print_version();
            return Ok(());
        }
    };
    print_json(&output)
}

fn print_json(value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{text}");
    Ok(())
}

fn print_version() {
    println!("catapult     {}", env!("CARGO_PKG_VERSION"));
    println!("rustc        {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

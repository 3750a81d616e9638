//! # Prisma Shim CLI
//!
//! This is the binary entry point for the `prisma-shim` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing the wrapper's own flags using `clap`.
//! - Forwarding everything else to the cached Prisma CLI and exiting with
//!   its exit code.
//! - Handling top-level application errors and translating them into
//!   user-friendly output.
//!
//! The core application logic is defined in the `lib.rs` library crate,
//! ensuring that the binary is a thin wrapper around the reusable library
//! functionality.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let code = cli.execute()?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

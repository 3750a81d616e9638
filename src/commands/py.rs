//! The `py` namespace: commands handled by prisma-shim itself

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::iter;
use std::path::PathBuf;

use super::{cache, format, version};
use prisma_shim::config::{Config, CACHE_ROOT_ENV};
use prisma_shim::output::OutputConfig;

/// Commands provided by prisma-shim rather than the Prisma CLI
#[derive(Parser, Debug)]
#[command(name = "prisma-shim py")]
#[command(version, about, long_about = None)]
pub struct PyCli {
    /// Root directory of the binary cache
    ///
    /// Defaults to the system's cache directory (e.g.
    /// `~/.cache/prisma-shim/binaries` on Linux).
    #[arg(long, global = true, value_name = "DIR", env = CACHE_ROOT_ENV)]
    cache_root: Option<PathBuf>,

    #[command(subcommand)]
    command: PyCommand,
}

#[derive(Subcommand, Debug)]
enum PyCommand {
    /// Show the pinned Prisma CLI version and where it is installed
    Version(version::VersionArgs),

    /// Manage the Prisma CLI binary cache
    Cache(cache::CacheArgs),

    /// Reorder generator properties in a schema file
    Format(format::FormatArgs),
}

/// Parse and run a `py` command line (without the leading `py`).
pub fn execute(args: &[String], output: &OutputConfig) -> Result<()> {
    let argv = iter::once("prisma-shim py").chain(args.iter().map(String::as_str));
    let cli = PyCli::parse_from(argv);

    let mut config = Config::from_env().context("Invalid prisma-shim configuration")?;
    if let Some(cache_root) = cli.cache_root {
        config = config.with_cache_root(cache_root);
    }

    match cli.command {
        PyCommand::Version(args) => version::execute(&config, args),
        PyCommand::Cache(args) => cache::execute(&config, args),
        PyCommand::Format(args) => format::execute(args, output),
    }
}

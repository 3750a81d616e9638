//! CLI argument parsing and command dispatch

use anyhow::{anyhow, Result};
use clap::Parser;
use log::LevelFilter;

use crate::commands;
use prisma_shim::output::OutputConfig;

/// Prisma Shim - install, cache and run the Prisma CLI
///
/// All arguments are forwarded to the Prisma CLI, except `py ...` which
/// runs prisma-shim's own commands.
#[derive(Parser, Debug)]
#[command(name = "prisma-shim")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Arguments passed to the Prisma CLI
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl Cli {
    /// Execute the CLI command, returning the process exit code
    pub fn execute(self) -> Result<i32> {
        init_logging(&self.log_level)?;
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.args.split_first() {
            Some((first, rest)) if first == "py" => {
                commands::py::execute(rest, &output)?;
                Ok(0)
            }
            _ => commands::forward::execute(&self.args, output),
        }
    }
}

/// Initialize `env_logger`; `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str) -> Result<()> {
    let filter: LevelFilter = level
        .parse()
        .map_err(|_| anyhow!("Invalid log level: '{}'", level))?;

    env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .format_timestamp(None)
        .init();
    Ok(())
}

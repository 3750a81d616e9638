//! Forwarding of command lines to the cached Prisma CLI

use anyhow::{Context, Result};
use prisma_shim::config::Config;
use prisma_shim::output::OutputConfig;
use prisma_shim::runner::Runner;

/// Run the Prisma CLI with `args`, returning its exit code.
pub fn execute(args: &[String], output: OutputConfig) -> Result<i32> {
    let config = Config::from_env().context("Invalid prisma-shim configuration")?;
    let runner = Runner::new(config, output);
    let code = runner.run(args, false, None)?;
    Ok(code)
}

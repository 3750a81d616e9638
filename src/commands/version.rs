//! # Version Command Implementation
//!
//! `py version` reports which Prisma CLI build prisma-shim manages and
//! whether it is already present in the binary cache.

use anyhow::Result;
use clap::Args;
use prisma_shim::binary_cache::BinaryCache;
use prisma_shim::config::Config;

/// Arguments for the version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Execute the `py version` command.
pub fn execute(config: &Config, args: VersionArgs) -> Result<()> {
    let installed = BinaryCache::new(config.clone()).is_installed();

    if args.json {
        let info = serde_json::json!({
            "shim": env!("CARGO_PKG_VERSION"),
            "prisma": config.cli_version(),
            "engine": config.engine_version(),
            "cache_dir": config.cache_dir(),
            "entrypoint": config.entrypoint(),
            "installed": installed,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("prisma-shim       : {}", env!("CARGO_PKG_VERSION"));
    println!("prisma            : {}", config.cli_version());
    println!("engine            : {}", config.engine_version());
    println!("cache directory   : {}", config.cache_dir().display());
    println!("entrypoint        : {}", config.entrypoint().display());
    let state = if installed { "yes" } else { "no" };
    println!("installed         : {}", state);
    Ok(())
}

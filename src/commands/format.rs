//! Format command implementation
//!
//! `py format` runs the generator-block formatter on a schema file without
//! involving the Prisma CLI.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use prisma_shim::defaults::DEFAULT_SCHEMA_PATH;
use prisma_shim::output::{emoji, OutputConfig};
use prisma_shim::schema_format::format_schema_file;

/// Arguments for the format command
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Path to the schema file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SCHEMA_PATH)]
    pub schema: PathBuf,
}

/// Execute the `py format` command.
pub fn execute(args: FormatArgs, output: &OutputConfig) -> Result<()> {
    if !args.schema.exists() {
        println!("Schema file not found: {}", args.schema.display());
        return Ok(());
    }

    let changed = format_schema_file(&args.schema)
        .with_context(|| format!("Failed to format {}", args.schema.display()))?;

    if changed {
        println!(
            "{} Formatted generator properties in {}",
            emoji(output, "✓", "[ok]"),
            args.schema.display()
        );
    } else {
        println!("Schema already formatted: {}", args.schema.display());
    }
    Ok(())
}

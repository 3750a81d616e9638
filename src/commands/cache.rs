//! # Cache Command Implementation
//!
//! This module implements the `py cache` subcommand, which inspects and
//! prunes the Prisma CLI binary cache.
//!
//! ## Subcommands
//!
//! - **`list`**: Display every installed CLI/engine combination
//! - **`clean`**: Remove stale installs (anything but the pinned version), or
//!   everything with `--all`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};
use semver::Version;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use prisma_shim::config::{entrypoint_in, Config};

/// Manage the Prisma CLI binary cache
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// List all cached Prisma CLI installs
    List(ListArgs),
    /// Remove cached Prisma CLI installs
    Clean(CleanArgs),
}

/// Arguments for the cache list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the cache clean command
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Show what would be deleted without actually deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Also delete the install for the currently pinned version
    #[arg(long)]
    pub all: bool,

    /// Skip confirmation prompt and delete immediately
    #[arg(long)]
    pub yes: bool,
}

/// One `<cli version>/<engine version>` directory in the cache.
#[derive(Debug, Clone)]
struct CacheEntry {
    cli_version: String,
    engine_version: String,
    size: u64,
    file_count: usize,
    last_modified: Option<SystemTime>,
    installed: bool,
    current: bool,
    dir_path: PathBuf,
}

/// Execute the `py cache` command.
pub fn execute(config: &Config, args: CacheArgs) -> Result<()> {
    match args.command {
        CacheSubcommand::List(list_args) => execute_list(config, list_args),
        CacheSubcommand::Clean(clean_args) => execute_clean(config, clean_args),
    }
}

/// Execute the `py cache list` command.
fn execute_list(config: &Config, args: ListArgs) -> Result<()> {
    let cache_root = config.cache_root();

    if !cache_root.exists() {
        if args.json {
            println!("[]");
        } else {
            println!("Cache directory does not exist: {}", cache_root.display());
            println!("No cached Prisma CLI installs found.");
        }
        return Ok(());
    }

    let entries = scan_cache_directory(config)?;

    if entries.is_empty() {
        if args.json {
            println!("[]");
        } else {
            println!(
                "No cached Prisma CLI installs found in: {}",
                cache_root.display()
            );
        }
        return Ok(());
    }

    if args.json {
        display_json(&entries)?;
    } else {
        display_table(&entries);
    }

    Ok(())
}

/// Execute the `py cache clean` command.
fn execute_clean(config: &Config, args: CleanArgs) -> Result<()> {
    let cache_root = config.cache_root();

    if !cache_root.exists() {
        println!("Cache directory does not exist: {}", cache_root.display());
        println!("No cached Prisma CLI installs to clean.");
        return Ok(());
    }

    let entries = scan_cache_directory(config)?;
    let entries_to_delete = filter_entries_for_cleanup(&entries, args.all);

    if entries_to_delete.is_empty() {
        println!("No cache entries match the specified criteria.");
        return Ok(());
    }

    println!("Cache entries to be deleted:\n");
    let total_size: u64 = entries_to_delete.iter().map(|e| e.size).sum();
    for entry in &entries_to_delete {
        println!(
            "  {} {} ({})",
            entry.cli_version,
            short_engine(&entry.engine_version),
            format_size(entry.size)
        );
    }
    println!(
        "\nTotal: {} entries ({})",
        entries_to_delete.len(),
        format_size(total_size)
    );

    if args.dry_run {
        println!("\n🔎 Dry run mode - no changes were made.");
        return Ok(());
    }

    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Do you want to delete these cache entries?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Clean cancelled.");
            return Ok(());
        }
    }

    println!("\n🗑️  Deleting cache entries...");
    let mut deleted_count = 0;
    let mut failed_count = 0;

    for entry in &entries_to_delete {
        match fs::remove_dir_all(&entry.dir_path) {
            Ok(_) => {
                deleted_count += 1;
                println!("  ✅ Deleted: {}", entry.dir_path.display());
                // Drop the version directory once its last engine is gone.
                if let Some(version_dir) = entry.dir_path.parent() {
                    let _ = fs::remove_dir(version_dir);
                }
            }
            Err(e) => {
                failed_count += 1;
                eprintln!("  ❌ Failed to delete {}: {}", entry.dir_path.display(), e);
            }
        }
    }

    if deleted_count > 0 {
        println!("\n✅ Successfully deleted {} cache entries.", deleted_count);
    }
    if failed_count > 0 {
        eprintln!("\n⚠️  Failed to delete {} cache entries.", failed_count);
    }

    Ok(())
}

/// Select the entries a clean should remove.
fn filter_entries_for_cleanup(entries: &[CacheEntry], all: bool) -> Vec<CacheEntry> {
    entries
        .iter()
        .filter(|entry| all || !entry.current)
        .cloned()
        .collect()
}

/// Scan `<cache_root>/<cli version>/<engine version>` directories.
fn scan_cache_directory(config: &Config) -> Result<Vec<CacheEntry>> {
    let cache_root = config.cache_root();
    let current_dir = config.cache_dir();
    let mut entries = Vec::new();

    for version_entry in fs::read_dir(cache_root)
        .with_context(|| format!("Failed to read {}", cache_root.display()))?
    {
        let version_path = version_entry?.path();
        if !version_path.is_dir() {
            continue;
        }
        let Some(cli_version) = dir_name(&version_path) else {
            continue;
        };

        for engine_entry in fs::read_dir(&version_path)? {
            let dir_path = engine_entry?.path();
            if !dir_path.is_dir() {
                continue;
            }
            let Some(engine_version) = dir_name(&dir_path) else {
                continue;
            };

            let (size, file_count, last_modified) = calculate_directory_info(&dir_path);
            entries.push(CacheEntry {
                cli_version: cli_version.clone(),
                engine_version,
                size,
                file_count,
                last_modified,
                installed: entrypoint_in(&dir_path).is_file(),
                current: dir_path == current_dir,
                dir_path,
            });
        }
    }

    sort_entries(&mut entries);
    Ok(entries)
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
}

/// Sort by semantic version (non-semver names last), then engine.
fn sort_entries(entries: &mut [CacheEntry]) {
    entries.sort_by(|a, b| {
        let va = Version::parse(&a.cli_version).ok();
        let vb = Version::parse(&b.cli_version).ok();
        let by_version = match (va, vb) {
            (Some(va), Some(vb)) => va.cmp(&vb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cli_version.cmp(&b.cli_version),
        };
        by_version.then_with(|| a.engine_version.cmp(&b.engine_version))
    });
}

/// Calculate directory size, file count, and last modified time
fn calculate_directory_info(dir_path: &Path) -> (u64, usize, Option<SystemTime>) {
    let mut total_size = 0u64;
    let mut file_count = 0usize;
    let mut latest_mtime: Option<SystemTime> = None;

    for entry in WalkDir::new(dir_path).into_iter().flatten() {
        if let Ok(meta) = entry.metadata() {
            if meta.is_file() {
                total_size += meta.len();
                file_count += 1;

                if let Ok(mtime) = meta.modified() {
                    latest_mtime = Some(latest_mtime.map_or(mtime, |prev| prev.max(mtime)));
                }
            }
        }
    }

    (total_size, file_count, latest_mtime)
}

fn short_engine(engine: &str) -> &str {
    engine
        .char_indices()
        .nth(12)
        .map_or(engine, |(i, _)| &engine[..i])
}

/// Display cache entries in table format
fn display_table(entries: &[CacheEntry]) {
    println!("Cached Prisma CLI installs:\n");
    println!(
        "{:<12} {:<14} {:<10} {:>8} {:>12}",
        "VERSION", "ENGINE", "STATUS", "FILES", "SIZE"
    );
    println!("{}", "-".repeat(60));

    for entry in entries {
        let status = match (entry.current, entry.installed) {
            (true, true) => "current",
            (false, true) => "installed",
            (_, false) => "incomplete",
        };
        println!(
            "{:<12} {:<14} {:<10} {:>8} {:>12}",
            entry.cli_version,
            short_engine(&entry.engine_version),
            status,
            entry.file_count,
            format_size(entry.size)
        );
    }

    println!("\nTotal: {} cached installs", entries.len());
}

/// Display cache entries in JSON format
fn display_json(entries: &[CacheEntry]) -> Result<()> {
    let json_entries: Vec<serde_json::Value> = entries
        .iter()
        .map(|e| {
            serde_json::json!({
                "version": e.cli_version,
                "engine": e.engine_version,
                "installed": e.installed,
                "current": e.current,
                "size": e.size,
                "file_count": e.file_count,
                "last_modified": e
                    .last_modified
                    .and_then(|m| m.duration_since(std::time::UNIX_EPOCH).ok())
                    .map(|d| d.as_secs()),
                "path": e.dir_path,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json_entries)?);
    Ok(())
}

/// Format size in human-readable format
fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

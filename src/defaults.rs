//! Default values for prisma-shim configuration.
//!
//! This module provides centralized default values used by the library and
//! the CLI, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// The npm package that provides the Prisma CLI.
pub const PRISMA_PACKAGE: &str = "prisma";

/// The Prisma CLI version installed into the binary cache.
pub const PRISMA_VERSION: &str = "6.8.2";

/// The query engine build the pinned CLI version ships with.
pub const ENGINE_VERSION: &str = "2060c79ba17c6bb9f5823312b6f6b7f4a845738e";

/// Schema file used by `db pull` and `format` when no `--schema` is given.
pub const DEFAULT_SCHEMA_PATH: &str = "prisma/schema.prisma";

/// Program used to run the cached entrypoint.
pub const NODE_PROGRAM: &str = "node";

/// Program used to install the CLI into the cache.
pub const NPM_PROGRAM: &str = "npm";

/// Returns the default binary cache root.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/prisma-shim/binaries` (XDG Base Directory)
/// - macOS: `~/Library/Caches/prisma-shim/binaries`
/// - Windows: `{FOLDERID_LocalAppData}\prisma-shim\binaries`
///
/// Falls back to `.prisma-shim-cache/binaries` in the current directory if
/// the platform cache directory cannot be determined.
///
/// This can be overridden by the `PRISMA_SHIM_CACHE_ROOT` environment
/// variable or the `--cache-root` flag of the `py` commands.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("prisma-shim"))
        .unwrap_or_else(|| PathBuf::from(".prisma-shim-cache"))
        .join("binaries")
}

//! # Runtime Configuration
//!
//! `Config` is the single, immutable description of which Prisma CLI build
//! the shim manages and where it lives on disk. It is built once at process
//! start (usually with [`Config::from_env`]) and then handed to the
//! [`BinaryCache`](crate::binary_cache::BinaryCache) and
//! [`Runner`](crate::runner::Runner). Nothing reads the environment again
//! after that point, except the per-call opt-out check the runner performs on
//! the environment map supplied by its caller.
//!
//! ## Environment Variables
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `PRISMA_VERSION` | Prisma CLI version to install (must be semver) |
//! | `PRISMA_EXPECTED_ENGINE_VERSION` | Engine build, part of the cache path |
//! | `PRISMA_SHIM_CACHE_ROOT` | Root of the binary cache |
//! | `PRISMA_SHIM_NODE` | Program used to run the CLI entrypoint |
//! | `PRISMA_SHIM_NPM` | Program used to install the CLI |
//! | `PRISMA_SHIM_DISABLE_AUTO_FORMAT` | Any non-empty value disables schema formatting |

use std::env;
use std::path::{Path, PathBuf};

use semver::Version;

use crate::defaults;
use crate::error::{Error, Result};

pub const CLI_VERSION_ENV: &str = "PRISMA_VERSION";
pub const ENGINE_VERSION_ENV: &str = "PRISMA_EXPECTED_ENGINE_VERSION";
pub const CACHE_ROOT_ENV: &str = "PRISMA_SHIM_CACHE_ROOT";
pub const NODE_ENV: &str = "PRISMA_SHIM_NODE";
pub const NPM_ENV: &str = "PRISMA_SHIM_NPM";
pub const DISABLE_AUTO_FORMAT_ENV: &str = "PRISMA_SHIM_DISABLE_AUTO_FORMAT";

/// Relative location of the CLI entrypoint inside a cache directory.
const ENTRYPOINT: [&str; 4] = ["node_modules", "prisma", "build", "index.js"];

/// Immutable configuration for the managed Prisma CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    cli_version: String,
    engine_version: String,
    cache_root: PathBuf,
    node: PathBuf,
    npm: PathBuf,
    auto_format: bool,
}

impl Config {
    /// Build a configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let mut config = Self::default();

        if let Some(version) = get(CLI_VERSION_ENV) {
            config = config.with_cli_version(&version)?;
        }
        if let Some(engine) = get(ENGINE_VERSION_ENV) {
            config = config.with_engine_version(engine);
        }
        if let Some(root) = get(CACHE_ROOT_ENV) {
            config = config.with_cache_root(root);
        }
        if let Some(node) = get(NODE_ENV) {
            config = config.with_node(node);
        }
        if let Some(npm) = get(NPM_ENV) {
            config = config.with_npm(npm);
        }
        let auto_format = get(DISABLE_AUTO_FORMAT_ENV).is_none();
        Ok(config.with_auto_format(auto_format))
    }

    /// Replace the pinned CLI version, validating it as semver.
    pub fn with_cli_version(mut self, version: &str) -> Result<Self> {
        Version::parse(version).map_err(|e| Error::Config {
            message: format!(
                "{} '{}' is not a valid version: {}",
                CLI_VERSION_ENV, version, e
            ),
        })?;
        self.cli_version = version.to_string();
        Ok(self)
    }

    pub fn with_engine_version(mut self, engine_version: impl Into<String>) -> Self {
        self.engine_version = engine_version.into();
        self
    }

    pub fn with_cache_root(mut self, cache_root: impl Into<PathBuf>) -> Self {
        self.cache_root = cache_root.into();
        self
    }

    pub fn with_node(mut self, node: impl Into<PathBuf>) -> Self {
        self.node = node.into();
        self
    }

    pub fn with_npm(mut self, npm: impl Into<PathBuf>) -> Self {
        self.npm = npm.into();
        self
    }

    pub fn with_auto_format(mut self, enabled: bool) -> Self {
        self.auto_format = enabled;
        self
    }

    pub fn cli_version(&self) -> &str {
        &self.cli_version
    }

    pub fn engine_version(&self) -> &str {
        &self.engine_version
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn node(&self) -> &Path {
        &self.node
    }

    pub fn npm(&self) -> &Path {
        &self.npm
    }

    /// Whether schema formatting after `db pull` / `format` is enabled.
    pub fn auto_format(&self) -> bool {
        self.auto_format
    }

    /// The cache directory for the pinned CLI and engine versions.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_root
            .join(&self.cli_version)
            .join(&self.engine_version)
    }

    /// The CLI entrypoint inside [`Config::cache_dir`].
    pub fn entrypoint(&self) -> PathBuf {
        entrypoint_in(&self.cache_dir())
    }

    /// The npm package spec to install, e.g. `prisma@6.8.2`.
    pub fn package_spec(&self) -> String {
        format!("{}@{}", defaults::PRISMA_PACKAGE, self.cli_version)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cli_version: defaults::PRISMA_VERSION.to_string(),
            engine_version: defaults::ENGINE_VERSION.to_string(),
            cache_root: defaults::default_cache_root(),
            node: PathBuf::from(defaults::NODE_PROGRAM),
            npm: PathBuf::from(defaults::NPM_PROGRAM),
            auto_format: true,
        }
    }
}

/// The CLI entrypoint location for any cache directory.
pub fn entrypoint_in(cache_dir: &Path) -> PathBuf {
    ENTRYPOINT
        .iter()
        .fold(cache_dir.to_path_buf(), |path, part| path.join(part))
}

//! # Command Runner
//!
//! Forwards a command line to the cached Prisma CLI and post-processes the
//! schema file after commands that may rewrite it.
//!
//! ## Flow
//!
//! 1. Build a [`CommandInvocation`]: merged environment, whether the command
//!    may mutate the schema (`db pull`, `format`) and which schema file it
//!    targets.
//! 2. Resolve the entrypoint through the [`BinaryCache`], installing the CLI
//!    on first use.
//! 3. Run it with inherited stdout/stderr and wait for it to exit.
//! 4. On success, format the schema file's generator blocks (see
//!    [`crate::schema_format`]). Formatting failures are logged and never
//!    change the exit code.
//!
//! The exit code of the CLI is returned unchanged.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};

use crate::binary_cache::BinaryCache;
use crate::config::{Config, DISABLE_AUTO_FORMAT_ENV};
use crate::defaults::DEFAULT_SCHEMA_PATH;
use crate::error::{Error, Result};
use crate::output::{bold, emoji, OutputConfig};
use crate::process::{DefaultNodeOperations, NodeOperations};
use crate::schema_format::format_schema_file;

pub const HIDE_UPDATE_MESSAGE_ENV: &str = "PRISMA_HIDE_UPDATE_MESSAGE";
pub const ENGINE_TYPE_ENV: &str = "PRISMA_CLI_QUERY_ENGINE_TYPE";

const HELP_FLAGS: [&str; 2] = ["--help", "-h"];
const SCHEMA_FLAG: &str = "--schema";

/// Environment every forwarded command gets unless the caller overrides it.
pub fn default_env() -> HashMap<String, String> {
    HashMap::from([
        (HIDE_UPDATE_MESSAGE_ENV.to_string(), "true".to_string()),
        (ENGINE_TYPE_ENV.to_string(), "binary".to_string()),
    ])
}

/// Commands that may rewrite the schema file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaCommand {
    /// `db pull`
    DbPull,
    /// `format`
    Format,
}

impl SchemaCommand {
    pub fn detect(args: &[String]) -> Option<Self> {
        match args {
            [first, second, ..] if first == "db" && second == "pull" => Some(Self::DbPull),
            [first, ..] if first == "format" => Some(Self::Format),
            _ => None,
        }
    }
}

/// Everything needed to run one forwarded command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub args: Vec<String>,
    /// Default environment overlaid with the caller's.
    pub env: HashMap<String, String>,
    pub schema_command: Option<SchemaCommand>,
    pub should_format_schema: bool,
    /// Only resolved when `should_format_schema` is set.
    pub schema_path: Option<PathBuf>,
}

impl CommandInvocation {
    pub fn new(args: &[String], env: Option<&HashMap<String, String>>) -> Self {
        let mut merged = default_env();
        if let Some(env) = env {
            merged.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        let schema_command = SchemaCommand::detect(args);
        let should_format_schema = schema_command.is_some();
        let schema_path = should_format_schema.then(|| {
            schema_path_from_args(args).unwrap_or_else(|| PathBuf::from(DEFAULT_SCHEMA_PATH))
        });

        Self {
            args: args.to_vec(),
            env: merged,
            schema_command,
            should_format_schema,
            schema_path,
        }
    }

    fn is_help(&self) -> bool {
        self.args
            .first()
            .is_some_and(|arg| HELP_FLAGS.contains(&arg.as_str()))
    }
}

/// Find the first `--schema=<path>` or `--schema <path>` in `args`.
pub fn schema_path_from_args(args: &[String]) -> Option<PathBuf> {
    for (i, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--schema=") {
            return Some(PathBuf::from(path));
        }
        if arg == SCHEMA_FLAG {
            if let Some(path) = args.get(i + 1) {
                return Some(PathBuf::from(path));
            }
        }
    }
    None
}

/// Runs Prisma CLI commands through the binary cache.
pub struct Runner {
    cache: BinaryCache,
    node: Arc<dyn NodeOperations>,
    output: OutputConfig,
}

impl Runner {
    pub fn new(config: Config, output: OutputConfig) -> Self {
        let node = Arc::new(DefaultNodeOperations::from_config(&config));
        Self::with_operations(config, output, node)
    }

    /// Create a runner with custom Node.js operations (used in tests).
    pub fn with_operations(
        config: Config,
        output: OutputConfig,
        node: Arc<dyn NodeOperations>,
    ) -> Self {
        Self {
            cache: BinaryCache::with_operations(config, node.clone()),
            node,
            output,
        }
    }

    pub fn cache(&self) -> &BinaryCache {
        &self.cache
    }

    /// Run the Prisma CLI with `args` and return its exit code.
    ///
    /// With `check`, a non-zero exit is returned as [`Error::CommandFailed`]
    /// instead. `env` is layered over the default environment.
    pub fn run(
        &self,
        args: &[String],
        check: bool,
        env: Option<&HashMap<String, String>>,
    ) -> Result<i32> {
        debug!("Running prisma command with args: {:?}", args);

        let invocation = CommandInvocation::new(args, env);
        let entry = self.cache.ensure_cached()?;
        let code = self
            .node
            .run_script(&entry.entrypoint, &invocation.args, &invocation.env)?;

        if check && code != 0 {
            return Err(Error::CommandFailed {
                command: format!("prisma {}", args.join(" ")),
                code,
            });
        }

        if code == 0 {
            self.format_schema(&invocation);
        }

        if invocation.is_help() {
            self.print_help_hint();
        }

        Ok(code)
    }

    fn auto_format_enabled(&self, invocation: &CommandInvocation) -> bool {
        let disabled_by_caller = invocation
            .env
            .get(DISABLE_AUTO_FORMAT_ENV)
            .is_some_and(|value| !value.is_empty());
        self.cache.config().auto_format() && !disabled_by_caller
    }

    fn format_schema(&self, invocation: &CommandInvocation) {
        let Some(path) = &invocation.schema_path else {
            return;
        };
        if !invocation.should_format_schema || !self.auto_format_enabled(invocation) {
            return;
        }
        if !path.exists() {
            debug!("Schema {} does not exist, not formatting", path.display());
            return;
        }

        match format_schema_file(path) {
            Ok(changed) => {
                if changed && invocation.schema_command == Some(SchemaCommand::DbPull) {
                    println!(
                        "{} Formatted generator properties in {}",
                        emoji(&self.output, "✓", "[ok]"),
                        path.display()
                    );
                }
            }
            Err(e) => warn!("Failed to format schema file {}: {}", path.display(), e),
        }
    }

    fn print_help_hint(&self) {
        println!("{}\n", bold(&self.output, "Shim Commands"));
        println!(
            "  For prisma-shim commands run {}",
            bold(&self.output, "prisma-shim py --help")
        );
    }
}

//! # External Process Operations
//!
//! The shim talks to two external programs: `npm`, to install the Prisma CLI
//! into the binary cache, and `node`, to run the installed entrypoint. Both
//! calls go through the [`NodeOperations`] trait so the cache and runner
//! logic can be exercised in tests without a Node.js toolchain.
//!
//! [`DefaultNodeOperations`] is the real implementation, built on
//! `std::process::Command`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use log::debug;

use crate::config::Config;
use crate::error::{Error, Result};

/// Result of an install step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutput {
    /// Whether the installer exited successfully.
    pub success: bool,
    /// Captured installer output: stdout followed by stderr.
    pub log: String,
}

/// Trait for Node.js operations - allows mocking in tests
pub trait NodeOperations: Send + Sync {
    /// Installs `package_spec` (e.g. `prisma@6.8.2`) with `cwd` as the
    /// working directory, capturing the installer output.
    fn install(&self, package_spec: &str, cwd: &Path) -> Result<InstallOutput>;

    /// Runs `script` with `args`, layering `env` over the inherited process
    /// environment. Standard output and error are inherited. Returns the exit
    /// code.
    fn run_script(
        &self,
        script: &Path,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> Result<i32>;
}

/// The default implementation of `NodeOperations`, which runs the real
/// `npm` and `node` programs.
#[derive(Debug, Clone)]
pub struct DefaultNodeOperations {
    node: PathBuf,
    npm: PathBuf,
}

impl DefaultNodeOperations {
    pub fn new(node: impl Into<PathBuf>, npm: impl Into<PathBuf>) -> Self {
        Self {
            node: node.into(),
            npm: npm.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.node(), config.npm())
    }
}

impl NodeOperations for DefaultNodeOperations {
    fn install(&self, package_spec: &str, cwd: &Path) -> Result<InstallOutput> {
        debug!(
            "Running {} install {} in {}",
            self.npm.display(),
            package_spec,
            cwd.display()
        );

        let output = Command::new(&self.npm)
            .args(["install", package_spec])
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Spawn {
                program: self.npm.display().to_string(),
                message: e.to_string(),
            })?;

        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        log.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(InstallOutput {
            success: output.status.success(),
            log,
        })
    }

    fn run_script(
        &self,
        script: &Path,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> Result<i32> {
        debug!(
            "Running {} {} {:?}",
            self.node.display(),
            script.display(),
            args
        );

        let status = Command::new(&self.node)
            .arg(script)
            .args(args)
            .envs(env)
            .status()
            .map_err(|e| Error::Spawn {
                program: self.node.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(exit_code(status))
    }
}

/// Maps an exit status to a shell-style exit code.
///
/// On Unix a process terminated by a signal reports `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

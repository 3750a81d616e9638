//! Shared test utilities for E2E tests.
//!
//! [`ShimFixture`] provides an isolated binary cache plus fake `npm` and
//! `node` programs, so the `prisma-shim` binary can be driven end to end
//! without a Node.js toolchain or network access.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = ShimFixture::new();
//!     fixture.command().arg("--version").assert().success();
//! }
//! ```
//!
//! The fake `node` appends each forwarded argument list to a log file and
//! exits with `$FAKE_NODE_EXIT` (default 0). When `$FAKE_PULL_SCHEMA` is
//! set it writes `$FAKE_PULL_CONTENT` there first, mimicking `db pull`.
//! The fake `npm` installs an entrypoint, or with `$FAKE_NPM_FAIL` writes a
//! partial one and fails.

#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use std::fs;
use std::path::{Path, PathBuf};

use prisma_shim::config::Config;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::schemas;
    pub use super::ShimFixture;
}

/// Schema snippets shared by tests.
pub mod schemas {
    pub const UNFORMATTED: &str = concat!(
        "generator client {\n",
        "  output = \"./client\"\n",
        "  provider = \"prisma-client-py\"\n",
        "}\n",
    );

    pub const FORMATTED: &str = concat!(
        "generator client {\n",
        "  provider                = \"prisma-client-py\"\n",
        "  output                  = \"./client\"\n",
        "}\n",
    );
}

const FAKE_NPM: &str = r#"#!/bin/sh
entrypoint="node_modules/prisma/build/index.js"
mkdir -p "$(dirname "$entrypoint")"
if [ -n "$FAKE_NPM_FAIL" ]; then
  printf 'partial' > "$entrypoint"
  echo "npm ERR! fake install failure for $2"
  exit 1
fi
echo "// $2" > "$entrypoint"
echo "added 1 package"
"#;

const FAKE_NODE: &str = r#"#!/bin/sh
shift
echo "$* | engine=$PRISMA_CLI_QUERY_ENGINE_TYPE hide=$PRISMA_HIDE_UPDATE_MESSAGE" >> "$FAKE_NODE_LOG"
if [ -n "$FAKE_PULL_SCHEMA" ]; then
  printf '%s' "$FAKE_PULL_CONTENT" > "$FAKE_PULL_SCHEMA"
fi
exit "${FAKE_NODE_EXIT:-0}"
"#;

/// Temporary workspace with fake Node.js tooling and its own cache.
pub struct ShimFixture {
    pub temp: TempDir,
}

impl ShimFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let bin = temp.child("bin");
        bin.create_dir_all().unwrap();
        write_executable(&bin.path().join("npm"), FAKE_NPM);
        write_executable(&bin.path().join("node"), FAKE_NODE);
        temp.child("work").create_dir_all().unwrap();
        Self { temp }
    }

    pub fn cache_root(&self) -> PathBuf {
        self.temp.path().join("cache")
    }

    /// Directory the binary runs in.
    pub fn work_dir(&self) -> PathBuf {
        self.temp.path().join("work")
    }

    pub fn node_log_path(&self) -> PathBuf {
        self.temp.path().join("node.log")
    }

    /// Everything the fake `node` was called with, one line per call.
    pub fn node_log(&self) -> String {
        fs::read_to_string(self.node_log_path()).unwrap_or_default()
    }

    pub fn entrypoint(&self) -> PathBuf {
        Config::default()
            .with_cache_root(self.cache_root())
            .entrypoint()
    }

    /// A `prisma-shim` command wired to the fake tooling.
    pub fn command(&self) -> assert_cmd::Command {
        let bin = self.temp.path().join("bin");
        let mut cmd = cargo_bin_cmd!("prisma-shim");
        cmd.current_dir(self.work_dir())
            .env("PRISMA_SHIM_CACHE_ROOT", self.cache_root())
            .env("PRISMA_SHIM_NODE", bin.join("node"))
            .env("PRISMA_SHIM_NPM", bin.join("npm"))
            .env("FAKE_NODE_LOG", self.node_log_path())
            .env("NO_COLOR", "1")
            .env_remove("PRISMA_SHIM_DISABLE_AUTO_FORMAT")
            .env_remove("PRISMA_VERSION")
            .env_remove("PRISMA_EXPECTED_ENGINE_VERSION")
            .env_remove("RUST_LOG");
        cmd
    }
}

fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

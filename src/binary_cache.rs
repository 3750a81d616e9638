//! # Binary Cache Manager
//!
//! Ensures a working copy of the Prisma CLI is present in the binary cache,
//! installing it with `npm` on first use.
//!
//! ## Layout
//!
//! ```text
//! <cache_root>/<cli version>/<engine version>/   <- cache_dir
//! ├── package.json                               <- manifest stub
//! └── node_modules/prisma/build/index.js         <- entrypoint
//! ```
//!
//! Whether the entrypoint file exists is the only signal used to decide if
//! the CLI is installed. A failed install therefore removes any entrypoint
//! it may have left behind, so the next call starts a fresh install instead
//! of running a broken one.
//!
//! Two processes installing into the same cache directory at once are not
//! coordinated; the last writer wins.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use indicatif::ProgressBar;
use log::debug;
use serde::Serialize;

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::process::{DefaultNodeOperations, NodeOperations};

const MANIFEST_FILE: &str = "package.json";

/// Resolved location of the installed CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub cache_dir: PathBuf,
    /// Always inside `cache_dir`.
    pub entrypoint: PathBuf,
}

/// Placeholder `package.json` written into the cache directory.
///
/// Without it npm walks up the directory tree, finds some unrelated
/// `package.json` and installs the CLI next to that instead.
#[derive(Debug, Serialize)]
struct ManifestStub {
    name: &'static str,
    version: &'static str,
    private: bool,
    description: &'static str,
    main: &'static str,
    license: &'static str,
}

impl Default for ManifestStub {
    fn default() -> Self {
        Self {
            name: "prisma-binaries",
            version: "1.0.0",
            private: true,
            description: "Cache directory created by prisma-shim for the Prisma CLI",
            main: "node_modules/prisma/build/index.js",
            license: "Apache-2.0",
        }
    }
}

/// Installs and locates the cached Prisma CLI.
pub struct BinaryCache {
    config: Config,
    node: Arc<dyn NodeOperations>,
}

impl BinaryCache {
    /// Create a cache manager that installs with the real `npm`.
    pub fn new(config: Config) -> Self {
        let node = Arc::new(DefaultNodeOperations::from_config(&config));
        Self::with_operations(config, node)
    }

    /// Create a cache manager with custom Node.js operations (used in tests).
    pub fn with_operations(config: Config, node: Arc<dyn NodeOperations>) -> Self {
        Self { config, node }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the entrypoint for the configured version is present.
    pub fn is_installed(&self) -> bool {
        self.config.entrypoint().is_file()
    }

    /// Return the cached CLI, installing it first if necessary.
    pub fn ensure_cached(&self) -> Result<CacheEntry> {
        let cache_dir = self.config.cache_dir();
        let entrypoint = config::entrypoint_in(&cache_dir);

        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir)?;
        }

        write_manifest_stub(&cache_dir)?;

        if !entrypoint.exists() {
            println!("Installing Prisma CLI");

            if let Err(err) = self.install(&cache_dir) {
                if entrypoint.exists() {
                    if let Err(e) = fs::remove_file(&entrypoint) {
                        debug!(
                            "Could not remove partial entrypoint {}: {}",
                            entrypoint.display(),
                            e
                        );
                    }
                }
                return Err(err);
            }
        }

        if !entrypoint.exists() {
            return Err(Error::EntrypointMissing { path: entrypoint });
        }

        Ok(CacheEntry {
            cache_dir,
            entrypoint,
        })
    }

    fn install(&self, cache_dir: &Path) -> Result<()> {
        let package_spec = self.config.package_spec();

        let spinner = ProgressBar::new_spinner();
        spinner.set_message(format!("npm install {}", package_spec));
        spinner.enable_steady_tick(Duration::from_millis(100));
        let output = self.node.install(&package_spec, cache_dir);
        spinner.finish_and_clear();

        let output = output?;
        if !output.success {
            return Err(Error::Installation {
                message: format!(
                    "An error occurred while installing the Prisma CLI ({})",
                    package_spec
                ),
                log: output.log,
            });
        }

        debug!("Installed {} into {}", package_spec, cache_dir.display());
        Ok(())
    }
}

/// Write the manifest stub unless one already exists.
fn write_manifest_stub(cache_dir: &Path) -> Result<()> {
    let manifest = cache_dir.join(MANIFEST_FILE);
    if manifest.exists() {
        return Ok(());
    }

    let content = serde_json::to_string_pretty(&ManifestStub::default())?;
    fs::write(&manifest, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::InstallOutput;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// What the fake installer does on one `install` call.
    #[derive(Debug, Clone, Copy)]
    enum Install {
        /// Writes the entrypoint and succeeds.
        Succeed,
        /// Succeeds without producing an entrypoint.
        SucceedEmpty,
        /// Writes a partial entrypoint, then exits non-zero.
        FailAfterPartialWrite,
        /// Writes a partial entrypoint, then fails to report at all.
        ErrorAfterPartialWrite,
    }

    struct FakeNode {
        script: Mutex<VecDeque<Install>>,
        calls: Mutex<Vec<(String, PathBuf)>>,
    }

    impl FakeNode {
        fn new(script: &[Install]) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.iter().copied().collect()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn install_calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl NodeOperations for FakeNode {
        fn install(&self, package_spec: &str, cwd: &Path) -> Result<InstallOutput> {
            self.calls
                .lock()
                .unwrap()
                .push((package_spec.to_string(), cwd.to_path_buf()));

            let step = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected install call");
            let entrypoint = config::entrypoint_in(cwd);
            let write_entrypoint = |content: &str| {
                fs::create_dir_all(entrypoint.parent().unwrap()).unwrap();
                fs::write(&entrypoint, content).unwrap();
            };

            match step {
                Install::Succeed => {
                    write_entrypoint("console.log('prisma')");
                    Ok(InstallOutput {
                        success: true,
                        log: "added 2 packages".to_string(),
                    })
                }
                Install::SucceedEmpty => Ok(InstallOutput {
                    success: true,
                    log: String::new(),
                }),
                Install::FailAfterPartialWrite => {
                    write_entrypoint("console.lo");
                    Ok(InstallOutput {
                        success: false,
                        log: "npm ERR! code ECONNRESET".to_string(),
                    })
                }
                Install::ErrorAfterPartialWrite => {
                    write_entrypoint("console.lo");
                    Err(Error::Spawn {
                        program: "npm".to_string(),
                        message: "interrupted".to_string(),
                    })
                }
            }
        }

        fn run_script(
            &self,
            _script: &Path,
            _args: &[String],
            _env: &HashMap<String, String>,
        ) -> Result<i32> {
            unreachable!("the cache never runs the CLI")
        }
    }

    fn cache_with(temp: &TempDir, node: Arc<FakeNode>) -> BinaryCache {
        let config = Config::default().with_cache_root(temp.path().join("binaries"));
        BinaryCache::with_operations(config, node)
    }

    #[test]
    fn test_ensure_cached_installs_on_first_use() {
        let temp = TempDir::new().unwrap();
        let node = FakeNode::new(&[Install::Succeed]);
        let cache = cache_with(&temp, node.clone());

        assert!(!cache.is_installed());
        let entry = cache.ensure_cached().unwrap();

        assert_eq!(entry.cache_dir, cache.config().cache_dir());
        assert!(entry.entrypoint.starts_with(&entry.cache_dir));
        assert!(entry.entrypoint.is_file());
        assert!(cache.is_installed());

        let calls = node.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].0,
            format!("prisma@{}", crate::defaults::PRISMA_VERSION)
        );
        assert_eq!(calls[0].1, entry.cache_dir);
    }

    #[test]
    fn test_ensure_cached_skips_install_when_present() {
        let temp = TempDir::new().unwrap();
        let node = FakeNode::new(&[Install::Succeed]);
        let cache = cache_with(&temp, node.clone());

        let first = cache.ensure_cached().unwrap();
        let second = cache.ensure_cached().unwrap();

        assert_eq!(first, second);
        assert_eq!(node.install_calls(), 1);
    }

    #[test]
    fn test_manifest_stub_written_once() {
        let temp = TempDir::new().unwrap();
        let node = FakeNode::new(&[Install::Succeed]);
        let cache = cache_with(&temp, node);

        let entry = cache.ensure_cached().unwrap();
        let manifest = entry.cache_dir.join(MANIFEST_FILE);
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&manifest).unwrap()).unwrap();
        assert_eq!(parsed["name"], "prisma-binaries");
        assert_eq!(parsed["private"], true);
        assert_eq!(parsed["main"], "node_modules/prisma/build/index.js");

        // An existing manifest is left alone.
        let custom = "{\"name\": \"custom\"}";
        fs::write(&manifest, custom).unwrap();
        cache.ensure_cached().unwrap();
        assert_eq!(fs::read_to_string(&manifest).unwrap(), custom);
    }

    #[test]
    fn test_failed_install_surfaces_log() {
        let temp = TempDir::new().unwrap();
        let node = FakeNode::new(&[Install::FailAfterPartialWrite]);
        let cache = cache_with(&temp, node);

        let err = cache.ensure_cached().unwrap_err();
        match err {
            Error::Installation { log, .. } => assert!(log.contains("ECONNRESET")),
            other => panic!("expected installation error, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_install_removes_partial_entrypoint_and_retries() {
        let temp = TempDir::new().unwrap();
        let node = FakeNode::new(&[Install::FailAfterPartialWrite, Install::Succeed]);
        let cache = cache_with(&temp, node.clone());

        assert!(cache.ensure_cached().is_err());
        assert!(!cache.config().entrypoint().exists());

        let entry = cache.ensure_cached().unwrap();
        assert_eq!(node.install_calls(), 2);
        assert_eq!(
            fs::read_to_string(&entry.entrypoint).unwrap(),
            "console.log('prisma')"
        );
    }

    #[test]
    fn test_install_error_removes_partial_entrypoint_and_propagates() {
        let temp = TempDir::new().unwrap();
        let node = FakeNode::new(&[Install::ErrorAfterPartialWrite]);
        let cache = cache_with(&temp, node);

        let err = cache.ensure_cached().unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
        assert!(!cache.config().entrypoint().exists());
    }

    #[test]
    fn test_missing_entrypoint_after_install() {
        let temp = TempDir::new().unwrap();
        let node = FakeNode::new(&[Install::SucceedEmpty]);
        let cache = cache_with(&temp, node);

        let err = cache.ensure_cached().unwrap_err();
        match err {
            Error::EntrypointMissing { path } => {
                assert_eq!(path, cache.config().entrypoint());
            }
            other => panic!("expected missing entrypoint, got {:?}", other),
        }
    }
}

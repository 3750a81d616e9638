//! # Error Handling
//!
//! This module defines the centralized error type for the `prisma-shim`
//! library. It uses the `thiserror` library to create an `Error` enum that
//! covers the failure modes of installing the Prisma CLI into the binary
//! cache and forwarding commands to it.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors. Each
//!   variant carries the context needed to explain the failure to a user
//!   (the captured `npm install` log, the missing entrypoint path, the exit
//!   code of a forwarded command, ...).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Installation and entrypoint errors are fatal and propagate to the caller.
//! Schema formatting errors are also expressed with this type, but the
//! command runner logs and swallows them so they never change the exit code
//! of the forwarded command.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for prisma-shim operations
#[derive(Error, Debug)]
pub enum Error {
    /// `npm install` exited unsuccessfully while populating the binary cache.
    ///
    /// The captured install output is kept so it can be shown to the user.
    #[error("Installation error: {message}{}", install_log_section(log))]
    Installation { message: String, log: String },

    /// The install step finished (or was skipped) but the expected
    /// entrypoint file is still absent.
    #[error(
        "CLI installation appeared to complete but the expected entrypoint ({}) could not be found",
        path.display()
    )]
    EntrypointMissing { path: PathBuf },

    /// A forwarded command exited with a non-zero code while `check` was
    /// requested.
    #[error("Command failed with exit code {code}: {command}")]
    CommandFailed { command: String, code: i32 },

    /// A program (`npm`, `node`) could not be started at all.
    #[error("Failed to start {program}: {message}")]
    Spawn { program: String, message: String },

    /// A configuration value is invalid.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

fn install_log_section(log: &str) -> String {
    if log.is_empty() {
        String::new()
    } else {
        format!("\n  npm install log:\n{}", log)
    }
}

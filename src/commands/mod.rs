//! # CLI Command Implementations
//!
//! This module contains the implementation of what the `prisma-shim`
//! binary can do: forward a command line to the Prisma CLI, or run one of
//! its own `py` subcommands.
//!
//! ## Structure
//!
//! Each `py` subcommand module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic, calling into the `prisma_shim` library.

pub mod cache;
pub mod format;
pub mod forward;
pub mod py;
pub mod version;

//! # Prisma Shim Library
//!
//! This library installs the Prisma CLI into a local binary cache, forwards
//! command lines to it, and normalizes the `generator` blocks of the schema
//! file after commands that rewrite it. It is designed to be used by the
//! `prisma-shim` command-line tool but can also be embedded in other tools
//! that need to drive the Prisma CLI.
//!
//! ## Quick Example
//!
//! ```
//! use prisma_shim::schema_format::format_schema;
//!
//! let schema = "generator client {\n  output = \"./client\"\n  provider = \"prisma-client-py\"\n}";
//! let formatted = format_schema(schema);
//!
//! assert_eq!(
//!     formatted,
//!     "generator client {\n  provider                = \"prisma-client-py\"\n  output                  = \"./client\"\n}"
//! );
//! // Formatting is idempotent.
//! assert_eq!(format_schema(&formatted), formatted);
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: An immutable `Config` naming the pinned
//!   Prisma CLI version, engine version and cache location, built once from
//!   the environment.
//! - **Binary Cache (`binary_cache`)**: Installs the CLI with `npm` on first
//!   use and hands out the entrypoint path. A failed install never leaves a
//!   half-written entrypoint behind.
//! - **Runner (`runner`)**: Runs the entrypoint with the caller's arguments
//!   and returns its exit code, formatting the schema after a successful
//!   `db pull` or `format`.
//! - **Schema Formatter (`schema_format`)**: Rewrites generator blocks into
//!   canonical property order.
//! - **Process Operations (`process`)**: The `npm`/`node` seam, replaceable
//!   in tests.
//!
//! ## Execution Flow
//!
//! ```text
//! Runner::run
//!   ├── BinaryCache::ensure_cached   (npm install prisma@<version> if absent)
//!   ├── node <entrypoint> <args...>
//!   └── format_schema_file           (db pull / format, exit code 0 only)
//! ```

pub mod binary_cache;
pub mod config;
pub mod defaults;
pub mod error;
pub mod output;
pub mod process;
pub mod runner;
pub mod schema_format;

#[cfg(test)]
mod schema_format_proptest;

//! zipkeep - dated zip backups with per-target filter configs
//!
//! This library provides the core functionality for the zipkeep CLI. It
//! archives a target file or directory into a timestamped zip at a
//! destination directory, filters paths through persisted allow/deny lists,
//! and prunes superseded backups with a keep-latest-per-past-month policy.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `backup`: sessions, enumeration, archive writing, retention
//! - `config`: the per-target JSON config cache
//! - `display`: ANSI path coloring and size formatting
//! - `error`: custom error types
//! - `cli`: request handling for the binary
//!
//! # Example
//!
//! ```rust,ignore
//! use zipkeep::backup::{BackupManager, BackupOptions};
//!
//! let manager = BackupManager::new(&target, &destination, BackupOptions::default())?;
//! let outcome = manager.compress()?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;

pub use error::{ZipkeepError, ZipkeepResult};

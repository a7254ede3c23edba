//! Backup core for zipkeep
//!
//! Turns a target file or directory into a dated zip archive at a
//! destination directory.
//!
//! # Architecture
//!
//! - `PathFilter`: allow/deny substring filtering, allow wins
//! - `TreeWalker`: lazy, deterministic enumeration of archive members
//! - `ArchiveName`: dated/dateless naming and positional parsing
//! - `ArchiveWriter`: temp-file zip construction with atomic publish
//! - `RetentionManager`: keep-latest-per-past-month pruning
//! - `BackupManager`: the session tying it all together
//!
//! # Workflow
//!
//! A session loads its config record (or, on the first gated run, snapshots
//! one and skips compression), enumerates the filtered tree, streams members
//! into a temp zip inside the destination, atomically renames it to
//! `{YYYY-MM-DD}-{stem}.zip`, and finally prunes superseded backups from
//! fully elapsed months.

mod filter;
mod manager;
mod name;
mod retention;
mod walk;
mod writer;

pub use filter::{PathFilter, DEFAULT_DENYLIST};
pub use manager::{BackupManager, BackupOptions, CompressOutcome};
pub use name::ArchiveName;
pub use retention::{BackupRecord, RetentionManager};
pub use walk::{TreeWalker, WalkEntry};
pub use writer::{ArchiveStats, ArchiveWriter, EntryStats, PendingArchive, DEFAULT_COMPRESSION_LEVEL};

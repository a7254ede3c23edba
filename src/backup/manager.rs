//! Backup session management
//!
//! A `BackupManager` ties one target to one destination: it derives the
//! archive name, loads and merges the target's config record, owns the path
//! filter, and runs the compression workflow with its three gates (config
//! snapshot, preview, auto-clean).

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::Value;

use crate::backup::filter::{PathFilter, DEFAULT_DENYLIST};
use crate::backup::name::{strip_zip_suffix, ArchiveName};
use crate::backup::retention::RetentionManager;
use crate::backup::walk::{TreeWalker, WalkEntry};
use crate::backup::writer::{ArchiveStats, ArchiveWriter, PendingArchive, DEFAULT_COMPRESSION_LEVEL};
use crate::config::{ConfigCache, ConfigRecord};
use crate::display;
use crate::error::{ZipkeepError, ZipkeepResult};

/// Session flags and overrides for one backup run
#[derive(Debug, Clone)]
pub struct BackupOptions {
    /// Explicit archive name; `.zip` suffix is stripped. Defaults to the
    /// target's base name (file stem for plain files).
    pub arcname: Option<String>,
    /// Prune superseded past-month backups after a successful publish
    pub auto_clean: bool,
    /// Gate compression on a persisted config record
    pub required_config: bool,
    /// Name the archive without a date prefix (disables retention)
    pub dateless: bool,
    /// Enumerate and log only; write nothing
    pub preview: bool,
    /// Deflate level passed to the archive writer
    pub compression_level: i64,
    /// Extra allow patterns for this session
    pub allow: Vec<String>,
    /// Extra deny patterns for this session
    pub deny: Vec<String>,
    /// Shared handle for interrupt cleanup of the in-flight temp file
    pub pending: PendingArchive,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            arcname: None,
            auto_clean: true,
            required_config: true,
            dateless: false,
            preview: false,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            allow: Vec::new(),
            deny: Vec::new(),
            pending: PendingArchive::new(),
        }
    }
}

/// What a `compress` call did
#[derive(Debug)]
pub enum CompressOutcome {
    /// An archive was published
    Archived {
        /// Final archive path
        path: PathBuf,
        /// Compression statistics
        stats: ArchiveStats,
        /// Backups removed by auto-clean
        deleted: Vec<PathBuf>,
    },
    /// Preview mode: entries were logged, nothing was written
    Previewed {
        /// Number of members that would have been written
        entries: usize,
    },
    /// First gated run: a config snapshot was written, compression skipped
    ConfigCreated {
        /// Path of the new record
        record: PathBuf,
    },
}

/// Manages one backup target against one destination directory
#[derive(Debug)]
pub struct BackupManager {
    /// Resolved absolute target path
    target: PathBuf,
    /// Resolved absolute destination directory; exists after construction
    destination: PathBuf,
    /// Archive name (dated unless the session is dateless)
    name: ArchiveName,
    filter: PathFilter,
    cache: ConfigCache,
    /// Extra scalar settings carried through the config record
    settings: BTreeMap<String, Value>,
    auto_clean: bool,
    required_config: bool,
    preview: bool,
    compression_level: i64,
    pending: PendingArchive,
}

impl BackupManager {
    /// Build a session for `target`, archiving into `destination`
    ///
    /// The destination (and nothing else) is created if missing. When config
    /// is required and a record exists, its filter lists merge additively
    /// into the session's and its recognized settings override session flags.
    pub fn new(target: &Path, destination: &Path, options: BackupOptions) -> ZipkeepResult<Self> {
        let target = target
            .canonicalize()
            .map_err(|_| ZipkeepError::TargetNotFound(target.to_string_lossy().to_string()))?;

        std::fs::create_dir_all(destination).map_err(|e| {
            ZipkeepError::Io(format!("Failed to create destination directory: {}", e))
        })?;
        let destination = destination
            .canonicalize()
            .map_err(|e| ZipkeepError::Io(format!("Failed to resolve destination: {}", e)))?;

        let stem = match &options.arcname {
            Some(name) => strip_zip_suffix(name).to_string(),
            None => derive_stem(&target)?,
        };

        let name = if options.dateless {
            ArchiveName::dateless(stem)
        } else {
            ArchiveName::dated(stem, Local::now().date_naive())
        };

        let cache = ConfigCache::new(&destination, name.stem());

        let mut allow: BTreeSet<String> = options.allow.iter().cloned().collect();
        let mut deny: BTreeSet<String> = options.deny.iter().cloned().collect();
        let mut settings = BTreeMap::new();
        let mut auto_clean = options.auto_clean;

        let record = if options.required_config {
            cache.load()?
        } else {
            None
        };
        match record {
            Some(record) => {
                // The stored lists replace the built-in denylist; they were
                // snapshotted from it on the first run
                allow.extend(record.allowlist.iter().cloned());
                deny.extend(record.denylist.iter().cloned());
                if let Some(value) = record.auto_clean() {
                    auto_clean = value;
                }
                settings = record.settings;
                settings.remove("auto_clean");
            }
            None => {
                deny.extend(DEFAULT_DENYLIST.iter().map(|s| s.to_string()));
            }
        }

        Ok(Self {
            target,
            destination,
            name,
            filter: PathFilter::new(allow, deny),
            cache,
            settings,
            auto_clean,
            required_config: options.required_config,
            preview: options.preview,
            compression_level: options.compression_level,
            pending: options.pending,
        })
    }

    /// Resolved target path
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Resolved destination directory
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// The archive name for this session
    pub fn archive_name(&self) -> &ArchiveName {
        &self.name
    }

    /// Full path the archive will be published at
    pub fn archive_path(&self) -> PathBuf {
        self.destination.join(self.name.file_name())
    }

    /// Path of this target's config record
    pub fn record_path(&self) -> &Path {
        self.cache.record_path()
    }

    /// Whether auto-clean will run after a successful publish
    pub fn auto_clean_enabled(&self) -> bool {
        self.auto_clean
    }

    /// The effective path filter
    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }

    /// Enumerate the members that a write would produce, without writing
    pub fn entries(&self) -> ZipkeepResult<Vec<WalkEntry>> {
        TreeWalker::new(&self.target, &self.filter)?.collect()
    }

    /// The config record capturing this session's current state
    pub fn snapshot(&self) -> ConfigRecord {
        let mut settings = self.settings.clone();
        settings.insert("auto_clean".to_string(), Value::Bool(self.auto_clean));
        ConfigRecord::new(
            self.filter.allowlist().map(String::from),
            self.filter.denylist().map(String::from),
            settings,
        )
    }

    /// Run the compression workflow
    ///
    /// Preview short-circuits before anything touches the destination. A
    /// gated first run writes the config snapshot and skips compression.
    /// Otherwise the record is re-persisted, the archive is written and
    /// published atomically, and auto-clean prunes superseded backups.
    pub fn compress(&self) -> ZipkeepResult<CompressOutcome> {
        if self.preview {
            return self.preview_entries();
        }

        if self.required_config {
            if !self.cache.exists() {
                self.cache.save(&self.snapshot())?;
                return Ok(CompressOutcome::ConfigCreated {
                    record: self.cache.record_path().to_path_buf(),
                });
            }
            // Write-through: every compressing run re-persists current state
            self.cache.save(&self.snapshot())?;
        }

        let writer = ArchiveWriter::new(
            self.destination.clone(),
            self.compression_level,
            self.pending.clone(),
        );
        let walker = TreeWalker::new(&self.target, &self.filter)?;
        let (path, stats) = writer.write(
            &self.name.file_name(),
            self.name.stem(),
            walker,
            |entry, size| match size {
                Some(size) => eprintln!("{} ({})", display::color_path(&entry.arcname), size),
                None => eprintln!("{}", display::color_path(&entry.arcname)),
            },
        )?;

        let deleted = if self.auto_clean && !self.name.is_dateless() {
            self.run_auto_clean()
        } else {
            Vec::new()
        };

        Ok(CompressOutcome::Archived {
            path,
            stats,
            deleted,
        })
    }

    fn preview_entries(&self) -> ZipkeepResult<CompressOutcome> {
        let entries = self.entries()?;
        for entry in &entries {
            if entry.is_dir {
                eprintln!("{}", display::color_path(&entry.arcname));
            } else {
                let size = std::fs::metadata(&entry.source)
                    .map_err(|e| {
                        ZipkeepError::Io(format!("Failed to stat {}: {}", entry.source.display(), e))
                    })?
                    .len();
                eprintln!("{} ({})", display::color_path(&entry.arcname), size);
            }
        }
        Ok(CompressOutcome::Previewed {
            entries: entries.len(),
        })
    }

    /// Retention runs only after a successful publish; a failure here is
    /// reported but must not fail the backup itself
    fn run_auto_clean(&self) -> Vec<PathBuf> {
        let today = self.name.date().unwrap_or_else(|| Local::now().date_naive());
        let retention = RetentionManager::new(self.destination.clone(), today);
        match retention.auto_clean(self.name.stem()) {
            Ok(deleted) => deleted,
            Err(e) => {
                eprintln!("warning: auto-clean failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Archive stem for a target with no explicit name
fn derive_stem(target: &Path) -> ZipkeepResult<String> {
    let name = if target.is_file() {
        target.file_stem()
    } else {
        target.file_name()
    };
    name.map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ZipkeepError::TargetNotFound(target.to_string_lossy().to_string()))
}

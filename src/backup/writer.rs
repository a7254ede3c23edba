//! Archive construction
//!
//! `ArchiveWriter` streams enumerated entries into a zip container built in a
//! uniquely-named temp file inside the destination directory, then atomically
//! persists it to its final name. The temp file lives in the destination so
//! the rename stays on one filesystem.
//!
//! While a write is in flight the temp path is published through a
//! `PendingArchive` handle so an interrupt handler can remove it; destructors
//! do not run on SIGINT, which is the one path `NamedTempFile`'s drop cannot
//! cover.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::backup::walk::WalkEntry;
use crate::display;
use crate::error::{ZipkeepError, ZipkeepResult};

/// Deflate compression level used when none is configured
pub const DEFAULT_COMPRESSION_LEVEL: i64 = 9;

/// Shared handle to the temp file of an in-flight write
///
/// Cloneable and thread-safe; one handle is typically registered with the
/// process interrupt handler while another lives in the session.
#[derive(Debug, Clone, Default)]
pub struct PendingArchive(Arc<Mutex<Option<PathBuf>>>);

impl PendingArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the temp file currently being written
    fn set(&self, path: &Path) {
        *self.lock() = Some(path.to_path_buf());
    }

    /// Forget the recorded temp file (after persist or deletion)
    fn clear(&self) {
        *self.lock() = None;
    }

    /// The temp path currently in flight, if any
    pub fn current(&self) -> Option<PathBuf> {
        self.lock().clone()
    }

    /// Delete the in-flight temp file, if any, and return its path
    ///
    /// Intended for interrupt handlers; a file that is already gone still
    /// clears the handle.
    pub fn remove_pending(&self) -> Option<PathBuf> {
        let path = self.lock().take()?;
        let _ = std::fs::remove_file(&path);
        Some(path)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PathBuf>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Size bookkeeping for one file member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryStats {
    /// Archive-relative member name
    pub arcname: String,
    /// Uncompressed size in bytes
    pub size: u64,
    /// Compressed size in bytes
    pub compressed: u64,
}

impl EntryStats {
    /// Deflate saving as a percentage of the original size
    ///
    /// Exactly 0% for empty files and for files whose compressed size is not
    /// smaller than the original.
    pub fn deflate_percent(&self) -> f64 {
        if self.size == 0 || self.compressed >= self.size {
            return 0.0;
        }
        (self.size - self.compressed) as f64 / self.size as f64 * 100.0
    }
}

/// Aggregate statistics for one written archive
#[derive(Debug, Clone, Default)]
pub struct ArchiveStats {
    /// Per-file sizes, in member order
    pub entries: Vec<EntryStats>,
    /// Sum of uncompressed file sizes
    pub total_size: u64,
    /// Sum of compressed file sizes
    pub total_compressed: u64,
    /// Deepest member path observed, in components
    pub max_depth: usize,
}

impl ArchiveStats {
    fn push(&mut self, entry: EntryStats) {
        self.total_size += entry.size;
        self.total_compressed += entry.compressed;
        self.entries.push(entry);
    }

    /// Overall deflate saving; 0% when nothing was compressed
    pub fn total_deflate_percent(&self) -> f64 {
        if self.total_size == 0 || self.total_compressed >= self.total_size {
            return 0.0;
        }
        (self.total_size - self.total_compressed) as f64 / self.total_size as f64 * 100.0
    }
}

/// Writes enumerated entries into a published zip archive
pub struct ArchiveWriter {
    destination: PathBuf,
    level: i64,
    pending: PendingArchive,
}

impl ArchiveWriter {
    pub fn new(destination: PathBuf, level: i64, pending: PendingArchive) -> Self {
        Self {
            destination,
            level,
            pending,
        }
    }

    /// Stream `entries` into `{destination}/{file_name}`
    ///
    /// `progress` is invoked once per entry with the file size (None for
    /// directories) before the entry is written. Returns the published path
    /// and the collected statistics. On any error the temp file is removed
    /// and nothing is published.
    pub fn write(
        &self,
        file_name: &str,
        stem: &str,
        entries: impl Iterator<Item = ZipkeepResult<WalkEntry>>,
        mut progress: impl FnMut(&WalkEntry, Option<u64>),
    ) -> ZipkeepResult<(PathBuf, ArchiveStats)> {
        let temp = tempfile::Builder::new()
            .prefix(&format!("{}_", stem))
            .tempfile_in(&self.destination)
            .map_err(|e| ZipkeepError::Io(format!("Failed to create temp file: {}", e)))?;
        self.pending.set(temp.path());

        // The temp file is dropped (and deleted) inside write_inner on any
        // error, so the handle can be cleared on every exit
        let result = self.write_inner(temp, file_name, entries, &mut progress);
        self.pending.clear();
        result
    }

    fn write_inner(
        &self,
        temp: NamedTempFile,
        file_name: &str,
        entries: impl Iterator<Item = ZipkeepResult<WalkEntry>>,
        progress: &mut impl FnMut(&WalkEntry, Option<u64>),
    ) -> ZipkeepResult<(PathBuf, ArchiveStats)> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(self.level));

        let mut zipw = ZipWriter::new(reopen(&temp)?);
        let mut max_depth = 0;

        for entry in entries {
            let entry = entry?;
            max_depth = max_depth.max(display::path_depth(&entry.arcname));

            if entry.is_dir {
                progress(&entry, None);
                zipw.add_directory(entry.arcname.trim_end_matches('/'), options)?;
            } else {
                let size = std::fs::metadata(&entry.source)
                    .map_err(|e| {
                        ZipkeepError::Io(format!(
                            "Failed to stat {}: {}",
                            entry.source.display(),
                            e
                        ))
                    })?
                    .len();
                progress(&entry, Some(size));

                zipw.start_file(entry.arcname.as_str(), options)?;
                let mut file = File::open(&entry.source).map_err(|e| {
                    ZipkeepError::Io(format!("Failed to open {}: {}", entry.source.display(), e))
                })?;
                io::copy(&mut file, &mut zipw)
                    .map_err(|e| ZipkeepError::Io(format!("Failed to write archive member: {}", e)))?;
            }
        }

        zipw.finish()?;

        // Collect per-member compressed sizes from the finished container
        let mut stats = ArchiveStats {
            max_depth,
            ..Default::default()
        };
        let mut archive = ZipArchive::new(reopen(&temp)?)?;
        for i in 0..archive.len() {
            let member = archive.by_index(i)?;
            if member.is_dir() {
                continue;
            }
            stats.push(EntryStats {
                arcname: member.name().to_string(),
                size: member.size(),
                compressed: member.compressed_size(),
            });
        }
        drop(archive);

        let published = self.destination.join(file_name);
        temp.persist(&published)
            .map_err(|e| ZipkeepError::Io(format!("Failed to publish archive: {}", e)))?;

        Ok((published, stats))
    }
}

fn reopen(temp: &NamedTempFile) -> ZipkeepResult<File> {
    temp.reopen()
        .map_err(|e| ZipkeepError::Io(format!("Failed to reopen temp file: {}", e)))
}

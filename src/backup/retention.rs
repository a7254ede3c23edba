//! Retention of dated backups
//!
//! For every past month, only the chronologically latest backup of a target
//! survives; the current month is never touched. Retention is keyed on the
//! date prefix of archive names, so it is disabled entirely for dateless
//! archives (the session never calls it in that mode).

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};

use crate::backup::name::ArchiveName;
use crate::error::{ZipkeepError, ZipkeepResult};

/// One historical backup found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// Archive file path
    pub path: PathBuf,
    /// Date parsed from the file name
    pub date: NaiveDate,
}

/// Prunes superseded backups of one logical target
#[derive(Debug, Clone)]
pub struct RetentionManager {
    /// Destination directory holding the published archives
    destination: PathBuf,
    /// The date treated as "today" for the current-month exclusion
    today: NaiveDate,
}

impl RetentionManager {
    pub fn new(destination: PathBuf, today: NaiveDate) -> Self {
        Self { destination, today }
    }

    /// Find all dated backups whose name remainder equals `stem`
    ///
    /// Scans only the destination's immediate entries; directories and
    /// undated or foreign names are ignored.
    pub fn find_backups(&self, stem: &str) -> ZipkeepResult<Vec<BackupRecord>> {
        let mut records = Vec::new();

        for entry in std::fs::read_dir(&self.destination)
            .map_err(|e| ZipkeepError::Io(format!("Failed to read destination directory: {}", e)))?
        {
            let entry = entry
                .map_err(|e| ZipkeepError::Io(format!("Failed to read directory entry: {}", e)))?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }

            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            let Some((date, remainder)) = ArchiveName::parse_dated(&file_name) else {
                continue;
            };
            if remainder == stem {
                records.push(BackupRecord { path, date });
            }
        }

        Ok(records)
    }

    /// Delete every non-latest backup within each fully elapsed month
    ///
    /// Backups from the current (year, month) are excluded from consideration
    /// entirely. Needs at least two past-month candidates to do anything.
    /// A failed delete is reported on stderr but does not abort the pass.
    /// Returns the paths that were deleted.
    pub fn auto_clean(&self, stem: &str) -> ZipkeepResult<Vec<PathBuf>> {
        let current = month_ordinal(self.today);
        let mut candidates: Vec<BackupRecord> = self
            .find_backups(stem)?
            .into_iter()
            .filter(|record| month_ordinal(record.date) < current)
            .collect();

        if candidates.len() < 2 {
            return Ok(Vec::new());
        }

        candidates.sort_by(|a, b| b.date.cmp(&a.date));

        let mut deleted = Vec::new();
        let mut reference = candidates[0].date;
        for record in candidates.into_iter().skip(1) {
            if month_ordinal(record.date) == month_ordinal(reference) {
                // Superseded within its month
                match std::fs::remove_file(&record.path) {
                    Ok(()) => deleted.push(record.path),
                    Err(e) => eprintln!(
                        "warning: could not delete {}: {}",
                        record.path.display(),
                        e
                    ),
                }
            }
            reference = record.date;
        }

        Ok(deleted)
    }
}

/// Chronological (year, month) key for whole-month comparison
fn month_ordinal(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

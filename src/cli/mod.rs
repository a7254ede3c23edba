//! Request handling for the zipkeep binary
//!
//! Translates one CLI archive request into a backup session, runs it, and
//! prints the outcome. All policy lives in the `backup` module; this layer
//! only formats.

use std::path::{Path, PathBuf};

use crate::backup::{BackupManager, BackupOptions, CompressOutcome, EntryStats, PendingArchive};
use crate::display::{color_path, format_size};
use crate::error::ZipkeepResult;

/// One archive request from the command line
#[derive(Debug, Clone)]
pub struct BackupRequest {
    /// Target file or directory
    pub target: PathBuf,
    /// Explicit archive name (`-n`), or None for fast requests (`-f`)
    pub name: Option<String>,
}

/// Global flags shared by all requests of one invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalFlags {
    /// Disable both the config gate and auto-clean
    pub force: bool,
    /// Name archives without a date prefix
    pub dateless: bool,
    /// Enumerate and log without writing
    pub preview: bool,
}

/// Run one backup request and report what happened
pub fn handle_request(
    request: &BackupRequest,
    destination: &Path,
    flags: GlobalFlags,
    pending: PendingArchive,
) -> ZipkeepResult<()> {
    let options = BackupOptions {
        arcname: request.name.clone(),
        auto_clean: !flags.force,
        required_config: !flags.force,
        dateless: flags.dateless,
        preview: flags.preview,
        pending,
        ..Default::default()
    };

    let manager = BackupManager::new(&request.target, destination, options)?;
    eprintln!("\nconstructing {}\n", manager.archive_path().display());

    match manager.compress()? {
        CompressOutcome::ConfigCreated { record } => {
            println!("{} not found", record.display());
            println!("config file constructed");
            println!("skip compression");
        }
        CompressOutcome::Previewed { entries } => {
            eprintln!("\npreview: {} member(s), nothing written", entries);
        }
        CompressOutcome::Archived {
            path,
            stats,
            deleted,
        } => {
            for entry in &stats.entries {
                eprintln!("{}", deflate_line(entry));
            }
            if stats.total_size > 0 {
                eprintln!(
                    "total deflate {:.2}% ({} -> {})",
                    stats.total_deflate_percent(),
                    format_size(stats.total_size),
                    format_size(stats.total_compressed),
                );
                eprintln!("max depth {}", stats.max_depth);
            }
            println!("archived {}", path.display());
            for old in &deleted {
                eprintln!("deleted {}", old.display());
            }
        }
    }

    Ok(())
}

/// Per-file stat line: `path (size -> compressed deflate X.XX%)`
fn deflate_line(entry: &EntryStats) -> String {
    format!(
        "{} ({} -> {} deflate {:.2}%)",
        color_path(&entry.arcname),
        entry.size,
        entry.compressed,
        entry.deflate_percent(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fast_request_gate_then_archive() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("docs");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("a.txt"), "a").unwrap();
        let dest = temp_dir.path().join("dest");

        let request = BackupRequest {
            target: target.clone(),
            name: None,
        };
        let flags = GlobalFlags::default();

        handle_request(&request, &dest, flags, PendingArchive::new()).unwrap();
        assert!(dest.join("cache").join("docs.json").exists());

        handle_request(&request, &dest, flags, PendingArchive::new()).unwrap();
        let zips = fs::read_dir(&dest)
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .ends_with(".zip")
            })
            .count();
        assert_eq!(zips, 1);
    }

    #[test]
    fn test_deflate_line_reports_zero_when_not_smaller() {
        let entry = EntryStats {
            arcname: "proj/photo.jpg".to_string(),
            size: 100,
            compressed: 100,
        };
        let line = deflate_line(&entry);
        assert!(line.contains("photo.jpg"));
        assert!(line.ends_with("(100 -> 100 deflate 0.00%)"));
    }

    #[test]
    fn test_deflate_line_reports_savings() {
        let entry = EntryStats {
            arcname: "proj/a.txt".to_string(),
            size: 200,
            compressed: 50,
        };
        assert!(deflate_line(&entry).ends_with("(200 -> 50 deflate 75.00%)"));
    }

    #[test]
    fn test_named_request_uses_explicit_name() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("docs");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("a.txt"), "a").unwrap();
        let dest = temp_dir.path().join("dest");

        let request = BackupRequest {
            target,
            name: Some("notes".to_string()),
        };
        let flags = GlobalFlags {
            force: true,
            dateless: true,
            preview: false,
        };

        handle_request(&request, &dest, flags, PendingArchive::new()).unwrap();
        assert!(dest.join("notes.zip").exists());
    }
}

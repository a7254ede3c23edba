//! Per-target configuration records
//!
//! Records are stored as pretty-printed JSON at `{destination}/cache/{stem}.json`,
//! keyed by the archive stem so repeated runs against the same target hit the
//! same record.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ZipkeepError, ZipkeepResult};

/// A persisted configuration record for one backup target
///
/// Besides the two filter lists, the record carries an open bag of extra
/// scalar settings. `auto_clean` is the only key zipkeep itself recognizes;
/// unknown keys are preserved verbatim across load/save cycles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigRecord {
    /// Allow patterns, sorted (highest filter priority)
    pub allowlist: Vec<String>,
    /// Deny patterns, sorted
    pub denylist: Vec<String>,
    /// Extra scalar settings, passed through untouched
    #[serde(flatten)]
    pub settings: BTreeMap<String, Value>,
}

impl ConfigRecord {
    /// Build a record from filter sets and a settings bag, sorting the lists
    pub fn new(
        allowlist: impl IntoIterator<Item = String>,
        denylist: impl IntoIterator<Item = String>,
        settings: BTreeMap<String, Value>,
    ) -> Self {
        let mut allowlist: Vec<String> = allowlist.into_iter().collect();
        let mut denylist: Vec<String> = denylist.into_iter().collect();
        allowlist.sort();
        denylist.sort();
        Self {
            allowlist,
            denylist,
            settings,
        }
    }

    /// Read the recognized `auto_clean` key, if present and boolean
    pub fn auto_clean(&self) -> Option<bool> {
        self.settings.get("auto_clean").and_then(Value::as_bool)
    }
}

/// Loads and stores config records for one archive stem
#[derive(Debug, Clone)]
pub struct ConfigCache {
    /// Path to this target's record file
    record_path: PathBuf,
}

impl ConfigCache {
    /// Create a cache handle for `stem` under `destination/cache/`
    ///
    /// Nothing is touched on disk until the first `save`; preview runs must
    /// not leave a cache directory behind.
    pub fn new(destination: &Path, stem: &str) -> Self {
        Self {
            record_path: destination.join("cache").join(format!("{}.json", stem)),
        }
    }

    /// Path of the record file (whether or not it exists yet)
    pub fn record_path(&self) -> &Path {
        &self.record_path
    }

    /// Whether a record exists on disk for this target
    pub fn exists(&self) -> bool {
        self.record_path.exists()
    }

    /// Load the record, or `None` if no record has been written yet
    pub fn load(&self) -> ZipkeepResult<Option<ConfigRecord>> {
        if !self.record_path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.record_path)
            .map_err(|e| ZipkeepError::Io(format!("Failed to read config record: {}", e)))?;

        let record: ConfigRecord = serde_json::from_str(&contents)?;
        Ok(Some(record))
    }

    /// Write the record to disk, replacing any previous one
    pub fn save(&self, record: &ConfigRecord) -> ZipkeepResult<()> {
        if let Some(parent) = self.record_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ZipkeepError::Io(format!("Failed to create cache directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(record)?;

        std::fs::write(&self.record_path, contents)
            .map_err(|e| ZipkeepError::Io(format!("Failed to write config record: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_record() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ConfigCache::new(temp_dir.path(), "docs");

        assert!(!cache.exists());
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ConfigCache::new(temp_dir.path(), "docs");

        let record = ConfigRecord::new(
            vec!["keep-me".to_string()],
            vec![".zip".to_string(), "__pycache__".to_string()],
            BTreeMap::new(),
        );
        cache.save(&record).unwrap();

        assert!(cache.exists());
        let loaded = cache.load().unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_lists_are_sorted() {
        let record = ConfigRecord::new(
            vec!["b".to_string(), "a".to_string()],
            vec!["z".to_string(), "m".to_string()],
            BTreeMap::new(),
        );
        assert_eq!(record.allowlist, vec!["a", "b"]);
        assert_eq!(record.denylist, vec!["m", "z"]);
    }

    #[test]
    fn test_extra_settings_pass_through() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ConfigCache::new(temp_dir.path(), "docs");

        // Hand-written record with keys zipkeep does not recognize
        std::fs::create_dir_all(cache.record_path().parent().unwrap()).unwrap();
        std::fs::write(
            cache.record_path(),
            r#"{"allowlist": [], "denylist": [], "auto_clean": false, "owner": "ops"}"#,
        )
        .unwrap();

        let loaded = cache.load().unwrap().unwrap();
        assert_eq!(loaded.auto_clean(), Some(false));
        assert_eq!(
            loaded.settings.get("owner"),
            Some(&Value::String("ops".to_string()))
        );

        // Unknown keys survive a save/load cycle untouched
        cache.save(&loaded).unwrap();
        let reloaded = cache.load().unwrap().unwrap();
        assert_eq!(reloaded, loaded);
    }

    #[test]
    fn test_corrupt_record_is_a_json_error() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ConfigCache::new(temp_dir.path(), "docs");

        std::fs::create_dir_all(cache.record_path().parent().unwrap()).unwrap();
        std::fs::write(cache.record_path(), "{not json").unwrap();

        let err = cache.load().unwrap_err();
        assert!(matches!(err, ZipkeepError::Json(_)));
    }

    #[test]
    fn test_record_file_location() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ConfigCache::new(temp_dir.path(), "photos");

        assert_eq!(
            cache.record_path(),
            temp_dir.path().join("cache").join("photos.json")
        );
        // Nothing created until the first save
        assert!(!temp_dir.path().join("cache").exists());
        cache
            .save(&ConfigRecord::new(vec![], vec![], BTreeMap::new()))
            .unwrap();
        assert!(temp_dir.path().join("cache").is_dir());
    }
}

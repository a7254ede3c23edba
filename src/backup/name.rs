//! Archive naming conventions
//!
//! Dated archives are named `{YYYY-MM-DD}-{stem}.zip`; dateless archives are
//! `{stem}.zip`. The 10-character date prefix and the `.zip` suffix are
//! structurally significant: retention groups historical backups by parsing
//! them positionally.

use chrono::NaiveDate;

/// Length of the `YYYY-MM-DD` prefix in dated archive names
const DATE_PREFIX_LEN: usize = 10;

/// The name of one archive: a stem plus an optional date prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    stem: String,
    date: Option<NaiveDate>,
}

impl ArchiveName {
    /// A dated archive name, `{date}-{stem}.zip`
    pub fn dated(stem: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            stem: stem.into(),
            date: Some(date),
        }
    }

    /// A dateless archive name, `{stem}.zip`
    pub fn dateless(stem: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            date: None,
        }
    }

    /// The name remainder: the stem without date prefix or suffix
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// The date prefix, if this name is dated
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Whether this name carries no date prefix
    pub fn is_dateless(&self) -> bool {
        self.date.is_none()
    }

    /// The full archive file name
    pub fn file_name(&self) -> String {
        match self.date {
            Some(date) => format!("{}-{}.zip", date.format("%Y-%m-%d"), self.stem),
            None => format!("{}.zip", self.stem),
        }
    }

    /// Parse a dated archive file name into its date and name remainder
    ///
    /// Returns `None` unless the name ends in `.zip`, starts with a valid
    /// `YYYY-MM-DD` prefix, and has a `-` separator after the prefix.
    pub fn parse_dated(file_name: &str) -> Option<(NaiveDate, &str)> {
        let without_suffix = file_name.strip_suffix(".zip")?;
        let prefix = without_suffix.get(..DATE_PREFIX_LEN)?;
        let date = NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()?;

        let rest = without_suffix.get(DATE_PREFIX_LEN..)?;
        let stem = rest.strip_prefix('-')?;
        Some((date, stem))
    }
}

/// Strip a trailing `.zip` from an explicitly requested archive name
pub fn strip_zip_suffix(name: &str) -> &str {
    name.strip_suffix(".zip").unwrap_or(name)
}

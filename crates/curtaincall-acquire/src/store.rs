// Filesystem persistence for review records and the failure ledger.
//
// Layout under the data directory:
//   reviews/<show-id>/<record>.json   one ReviewRecord per file
//   failed-fetches.json               the FailureLedger
// All writes go to a sibling temp file first and are renamed into place.

use curtaincall_model::{FailureLedger, ReviewRecord};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// A record together with its stable locator.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    /// Path relative to the data directory, `/`-separated.
    pub locator: String,
    pub record: ReviewRecord,
}

/// Reads and writes per-show collections of review records.
pub struct ReviewStore {
    data_dir: PathBuf,
}

impl ReviewStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn reviews_dir(&self) -> PathBuf {
        self.data_dir.join("reviews")
    }

    /// Load every record, shows and files in lexical order.
    ///
    /// A missing `reviews/` directory yields an empty collection; an
    /// unreadable directory or file is an error. Files that do not parse
    /// as a record are logged and skipped.
    pub fn load_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let root = self.reviews_dir();
        if !root.exists() {
            tracing::warn!(path = %root.display(), "No reviews directory");
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for show_dir in sorted_entries(&root)? {
            if !show_dir.is_dir() {
                continue;
            }
            records.extend(self.load_dir(&show_dir)?);
        }
        Ok(records)
    }

    /// Load one show's collection.
    pub fn load_show(&self, show_id: &str) -> Result<Vec<StoredRecord>, StoreError> {
        let dir = self.reviews_dir().join(show_id);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        self.load_dir(&dir)
    }

    fn load_dir(&self, dir: &Path) -> Result<Vec<StoredRecord>, StoreError> {
        let mut records = Vec::new();
        for path in sorted_entries(dir)? {
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let contents = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
            let record: ReviewRecord = match serde_json::from_str(&contents) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping malformed record file");
                    continue;
                }
            };
            records.push(StoredRecord {
                locator: self.locator_for(&path),
                record,
            });
        }
        Ok(records)
    }

    /// Rewrite a record in place.
    pub fn save(&self, stored: &StoredRecord) -> Result<(), StoreError> {
        let path = self.data_dir.join(&stored.locator);
        write_json_atomic(&path, &stored.record)
    }

    fn locator_for(&self, path: &Path) -> String {
        relative_locator(&self.data_dir, path)
    }
}

/// Loads and flushes the failure ledger file.
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger; a missing file is an empty ledger.
    pub fn load(&self) -> Result<FailureLedger, StoreError> {
        if !self.path.exists() {
            return Ok(FailureLedger::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        if contents.trim().is_empty() {
            return Ok(FailureLedger::new());
        }
        serde_json::from_str(&contents).map_err(|e| StoreError::json(&self.path, e))
    }

    pub fn save(&self, ledger: &FailureLedger) -> Result<(), StoreError> {
        write_json_atomic(&self.path, ledger)?;
        tracing::debug!(path = %self.path.display(), entries = ledger.len(), "Flushed failure ledger");
        Ok(())
    }
}

/// `path` relative to `base`, joined with `/` regardless of platform.
pub(crate) fn relative_locator(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| StoreError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError::io(dir, e))?;
    entries.sort();
    Ok(entries)
}

/// Serialize as pretty JSON and atomically replace `path`.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut json = serde_json::to_string_pretty(value).map_err(|e| StoreError::json(path, e))?;
    json.push('\n');
    write_atomic(path, json.as_bytes())
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));
    fs::write(&tmp, bytes).map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
}

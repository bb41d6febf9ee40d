//! On-disk catalog document
//!
//! Each operation opens the file, works on the parsed document and, for
//! mutations, writes a sibling temp file that is renamed over the original.
//! Callers serialize access; nothing here locks.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{de::Error as _, Deserialize, Serialize};

use crate::{
    catalog::record::ScreenshotRecord,
    error::{StoreError, StoreResult},
};

pub(crate) const CATALOG_VERSION: u32 = 1;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CatalogDocument {
    pub version: u32,
    /// Next id to hand out; never decreases, so ids are never reused
    pub next_id: u64,
    pub records: Vec<ScreenshotRecord>,
}

impl Default for CatalogDocument {
    fn default() -> Self {
        Self {
            version: CATALOG_VERSION,
            next_id: 1,
            records: Vec::new(),
        }
    }
}

pub(crate) struct CatalogFile<'a> {
    path: &'a Path,
}

impl<'a> CatalogFile<'a> {
    pub fn new(path: &'a Path) -> Self {
        Self { path }
    }

    fn io(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.to_path_buf(),
            source,
        }
    }

    fn ids_exhausted(&self) -> StoreError {
        StoreError::Corrupt {
            path: self.path.to_path_buf(),
            source: serde_json::Error::custom("record ids exhausted the u64 range"),
        }
    }

    /// Read the document; a missing file is an empty catalog
    pub fn read(&self) -> StoreResult<CatalogDocument> {
        let raw = match std::fs::read(self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CatalogDocument::default())
            }
            Err(e) => return Err(self.io(e)),
        };

        let mut document: CatalogDocument =
            serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
                path: self.path.to_path_buf(),
                source,
            })?;

        // A hand-edited file may carry ids at or past next_id
        let max_id = document.records.iter().map(|r| r.id).max().unwrap_or(0);
        let after_max = max_id.checked_add(1).ok_or_else(|| self.ids_exhausted())?;
        document.next_id = document.next_id.max(after_max).max(1);
        Ok(document)
    }

    pub fn write(&self, document: &CatalogDocument) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io(e))?;
        }

        let json = serde_json::to_vec_pretty(document)?;
        let temp = temp_path(self.path);
        std::fs::write(&temp, json).map_err(|e| self.io(e))?;
        std::fs::rename(&temp, self.path).map_err(|e| {
            let _ = std::fs::remove_file(&temp);
            self.io(e)
        })
    }

    pub fn list_all(&self) -> StoreResult<Vec<ScreenshotRecord>> {
        let mut records = self.read()?.records;
        records.sort_by(|a, b| {
            b.captured_at
                .cmp(&a.captured_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    pub fn get_by_id(&self, id: u64) -> StoreResult<Option<ScreenshotRecord>> {
        Ok(self.read()?.records.into_iter().find(|r| r.id == id))
    }

    pub fn search(&self, query: &str) -> StoreResult<Vec<ScreenshotRecord>> {
        let needle = query.to_lowercase();
        Ok(self
            .read()?
            .records
            .into_iter()
            .filter(|r| r.matches_lowercase(&needle))
            .collect())
    }

    pub fn add(&self, mut record: ScreenshotRecord) -> StoreResult<u64> {
        let mut document = self.read()?;
        let id = document.next_id;
        record.id = id;
        document.next_id = id.checked_add(1).ok_or_else(|| self.ids_exhausted())?;
        document.records.push(record);
        self.write(&document)?;
        Ok(id)
    }

    pub fn delete(&self, id: u64) -> StoreResult<bool> {
        let mut document = self.read()?;
        let before = document.records.len();
        document.records.retain(|r| r.id != id);
        if document.records.len() == before {
            return Ok(false);
        }
        self.write(&document)?;
        Ok(true)
    }

    /// Drop every record, returning the pre-clear snapshot
    pub fn clear_all(&self) -> StoreResult<Vec<ScreenshotRecord>> {
        let mut document = self.read()?;
        let removed = std::mem::take(&mut document.records);
        self.write(&document)?;
        Ok(removed)
    }
}

/// Sibling temp file, unique per process and write
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    name.push(format!(".{}.{}.tmp", std::process::id(), seq));
    path.with_file_name(name)
}

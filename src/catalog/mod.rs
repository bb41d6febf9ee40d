//! Screenshot catalog store
//!
//! A JSON file per installation holds every [`ScreenshotRecord`]. The file
//! is opened, operated on and closed within each call; one mutex per backing
//! file serializes those cycles, so stores opened separately on the same path
//! still cannot interleave a read-modify-write. All operations run on tokio's
//! blocking pool.

mod file;
pub mod record;

pub use record::ScreenshotRecord;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::error::{StoreError, StoreResult};
use file::CatalogFile;

pub const CATALOG_FILE: &str = "catalog.json";

/// Process-wide file locks, keyed by absolute catalog path
static FILE_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn file_lock(path: &Path) -> Arc<Mutex<()>> {
    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    Arc::clone(FILE_LOCKS.lock().entry(key).or_default())
}

struct StoreInner {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

/// Handle to a catalog file; every handle on the same path shares one lock
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<StoreInner>,
}

impl CatalogStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock = file_lock(&path);
        Self {
            inner: Arc::new(StoreInner { path, lock }),
        }
    }

    /// Store at `<data dir>/snapcap/catalog.json`
    pub fn default_location() -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("snapcap");
        Self::open(dir.join(CATALOG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// All records, newest first
    pub async fn list_all(&self) -> StoreResult<Vec<ScreenshotRecord>> {
        self.run(|file| file.list_all()).await
    }

    pub async fn get_by_id(&self, id: u64) -> StoreResult<Option<ScreenshotRecord>> {
        self.run(move |file| file.get_by_id(id)).await
    }

    /// Records whose title, tags or OCR text contain `query`, ignoring case
    pub async fn search(&self, query: &str) -> StoreResult<Vec<ScreenshotRecord>> {
        let query = query.to_string();
        self.run(move |file| file.search(&query)).await
    }

    /// Insert a record and return its newly assigned id
    pub async fn add(&self, record: ScreenshotRecord) -> StoreResult<u64> {
        let id = self.run(move |file| file.add(record)).await?;
        log::info!("catalog: added record {}", id);
        Ok(id)
    }

    /// Remove a record; the image file is left alone
    pub async fn delete(&self, id: u64) -> StoreResult<bool> {
        let existed = self.run(move |file| file.delete(id)).await?;
        if existed {
            log::info!("catalog: deleted record {}", id);
        }
        Ok(existed)
    }

    /// Remove every record and return what was removed
    pub async fn clear_all(&self) -> StoreResult<Vec<ScreenshotRecord>> {
        let removed = self.run(|file| file.clear_all()).await?;
        log::info!("catalog: cleared {} records", removed.len());
        Ok(removed)
    }

    async fn run<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&CatalogFile<'_>) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let _guard = inner.lock.lock();
            op(&CatalogFile::new(&inner.path))
        })
        .await
        .map_err(|join| StoreError::Worker(join.to_string()))?
    }
}

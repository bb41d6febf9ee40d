//! Capture-then-catalog flow
//!
//! Ordering within one capture: the image is fully materialized (native
//! resources released) before the record is built, the file is saved before
//! the record is inserted, and the insert completes before history is read
//! again.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};

use crate::{
    capture::{CaptureEngine, PlatformBackend},
    catalog::{CatalogStore, ScreenshotRecord},
    clipboard::ClipboardSink,
    desktop::VirtualDesktop,
    encoder::{thumbnail_png, THUMBNAIL_MAX_HEIGHT, THUMBNAIL_MAX_WIDTH},
    error::{CaptureError, CaptureResult, WorkflowError},
    output,
    selector::RegionSelector,
    settings::Settings,
    types::{CaptureRect, CapturedImage, ScreenshotType, WindowDescriptor, WindowHandle},
    window_list,
};

/// Optional text recognition; none ships with the crate
pub trait TextRecognizer: Send + Sync {
    /// Recognized text, `None` when the image holds none
    fn recognize(&self, image: &CapturedImage) -> anyhow::Result<Option<String>>;
}

/// What to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTarget {
    /// Absolute rectangle, usually from a finished region selection
    Region(CaptureRect),
    /// Monitor holding `hint`, or the primary monitor
    FullScreen { hint: Option<WindowHandle> },
    Window(WindowHandle),
}

impl CaptureTarget {
    fn kind(&self) -> ScreenshotType {
        match self {
            CaptureTarget::Region(_) => ScreenshotType::Regional,
            CaptureTarget::FullScreen { .. } => ScreenshotType::FullScreen,
            CaptureTarget::Window(_) => ScreenshotType::Window,
        }
    }
}

/// Outcome of [`ScreenshotService::clear_history`]
#[derive(Debug, Default)]
pub struct ClearReport {
    /// Records removed from the catalog
    pub records: usize,
    /// Backing files deleted
    pub files_removed: usize,
    /// Files that could not be deleted, with the reason
    pub failures: Vec<(PathBuf, String)>,
}

pub struct ScreenshotService {
    engine: CaptureEngine,
    catalog: CatalogStore,
    settings: Settings,
    clipboard: Option<Arc<dyn ClipboardSink>>,
    recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl ScreenshotService {
    pub fn new(backend: PlatformBackend, catalog: CatalogStore, settings: Settings) -> Self {
        let engine = CaptureEngine::new(backend).with_settle_delay(settings.settle_delay());
        Self {
            engine,
            catalog,
            settings,
            clipboard: None,
            recognizer: None,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardSink>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn engine(&self) -> &CaptureEngine {
        &self.engine
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start a region-selection session over a freshly queried desktop
    pub async fn begin_region_selection(&self) -> CaptureResult<RegionSelector> {
        let screen = Arc::clone(self.engine.screen());
        let desktop = tokio::task::spawn_blocking(move || VirtualDesktop::query(&*screen))
            .await
            .map_err(|join| CaptureError::CaptureFailed(format!("desktop query failed: {}", join)))??;
        Ok(RegionSelector::begin(desktop))
    }

    /// Windows a picker can offer; empty when enumeration fails
    pub async fn list_windows(&self, self_handle: Option<WindowHandle>) -> Vec<WindowDescriptor> {
        let windows = Arc::clone(self.engine.windows());
        let listed = tokio::task::spawn_blocking(move || {
            window_list::list_capturable_windows(&*windows, self_handle)
        })
        .await;

        match listed {
            Ok(Ok(descriptors)) => descriptors,
            Ok(Err(e)) => {
                log::warn!("window enumeration failed: {}", e);
                Vec::new()
            }
            Err(join) => {
                log::warn!("window enumeration worker failed: {}", join);
                Vec::new()
            }
        }
    }

    /// Capture `target` and catalog it. `Ok(None)` means the capture itself
    /// produced nothing (already logged by the engine).
    pub async fn capture(
        &self,
        target: CaptureTarget,
    ) -> Result<Option<ScreenshotRecord>, WorkflowError> {
        let image = match target {
            CaptureTarget::Region(rect) => self.engine.capture_region(rect).await,
            CaptureTarget::FullScreen { hint } => self.engine.capture_full_screen(hint).await?,
            CaptureTarget::Window(handle) => self.engine.capture_window(handle).await,
        };

        match image {
            Some(image) => Ok(Some(self.process_captured(image, target.kind()).await?)),
            None => Ok(None),
        }
    }

    /// Save, copy, recognize, thumbnail and catalog one captured image
    pub async fn process_captured(
        &self,
        image: CapturedImage,
        kind: ScreenshotType,
    ) -> Result<ScreenshotRecord, WorkflowError> {
        let settings = self.settings.clone();
        let clipboard = self.clipboard.clone();
        let recognizer = self.recognizer.clone();
        let now = Local::now();

        let mut record = blocking(move || {
            prepare_record(
                &image,
                kind,
                &settings,
                now,
                clipboard.as_deref(),
                recognizer.as_deref(),
            )
        })
        .await??;

        record.id = self.catalog.add(record.clone()).await?;
        Ok(record)
    }

    /// Catalog contents, newest first; empty when the catalog is unreadable
    pub async fn history(&self) -> Vec<ScreenshotRecord> {
        self.catalog.list_all().await.unwrap_or_else(|e| {
            log::warn!("failed to load history: {}", e);
            Vec::new()
        })
    }

    pub async fn search(&self, query: &str) -> Vec<ScreenshotRecord> {
        self.catalog.search(query).await.unwrap_or_else(|e| {
            log::warn!("history search failed: {}", e);
            Vec::new()
        })
    }

    /// Delete the image file, then the record. A missing file is fine.
    /// Returns whether a record existed.
    pub async fn delete_everywhere(&self, id: u64) -> Result<bool, WorkflowError> {
        let Some(record) = self.catalog.get_by_id(id).await? else {
            return Ok(false);
        };

        if let Some(path) = record.file_path {
            blocking(move || match std::fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    log::debug!("{:?} already gone", path);
                    Ok(())
                }
                Err(source) => Err(WorkflowError::File { path, source }),
            })
            .await??;
        }

        Ok(self.catalog.delete(id).await?)
    }

    /// Clear the catalog, then delete every file from the pre-clear
    /// snapshot. Individual file failures are collected, never fatal.
    pub async fn clear_history(&self) -> Result<ClearReport, WorkflowError> {
        let removed = self.catalog.clear_all().await?;

        let report = blocking(move || {
            let mut report = ClearReport {
                records: removed.len(),
                ..ClearReport::default()
            };
            for path in removed.into_iter().filter_map(|r| r.file_path) {
                match std::fs::remove_file(&path) {
                    Ok(()) => report.files_removed += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => {
                        log::warn!("failed to delete {:?}: {}", path, e);
                        report.failures.push((path, e.to_string()));
                    }
                }
            }
            report
        })
        .await?;

        Ok(report)
    }
}

fn prepare_record(
    image: &CapturedImage,
    kind: ScreenshotType,
    settings: &Settings,
    now: DateTime<Local>,
    clipboard: Option<&dyn ClipboardSink>,
    recognizer: Option<&dyn TextRecognizer>,
) -> Result<ScreenshotRecord, WorkflowError> {
    let mut record = ScreenshotRecord::new(
        kind,
        image.width(),
        image.height(),
        now.with_timezone(&Utc),
    );

    if settings.auto_save {
        let path = output::save_with_settings(image, settings, &now)?;
        let size = std::fs::metadata(&path).map_err(|source| WorkflowError::File {
            path: path.clone(),
            source,
        })?;
        record.file_size_bytes = size.len();
        record.file_path = Some(path);
    }

    if settings.copy_to_clipboard {
        if let Some(clipboard) = clipboard {
            clipboard.copy_image(image);
        }
    }

    if settings.enable_ocr {
        if let Some(recognizer) = recognizer {
            match recognizer.recognize(image) {
                Ok(text) => record.ocr_text = text,
                Err(e) => log::warn!("text recognition failed: {:#}", e),
            }
        }
    }

    match thumbnail_png(image, THUMBNAIL_MAX_WIDTH, THUMBNAIL_MAX_HEIGHT) {
        Ok(png) => record.thumbnail = Some(png),
        Err(e) => log::warn!("thumbnail generation failed: {}", e),
    }

    Ok(record)
}

async fn blocking<T, F>(work: F) -> Result<T, WorkflowError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|join| WorkflowError::Worker(join.to_string()))
}

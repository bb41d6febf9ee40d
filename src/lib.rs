//! Screenshot Capture Library
//!
//! Multi-monitor, DPI-aware screenshot capture with interactive region
//! selection, window capture and a local catalog of captured images.
//!
//! # Example
//!
//! ```no_run
//! use snapcap::{
//!     CaptureTarget, CatalogStore, Capturer, LogicalPoint, ScreenshotService, SelectorEvent,
//!     SettingsStore,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = SettingsStore::default_location().load();
//! let service = ScreenshotService::new(
//!     Capturer::new()?,
//!     CatalogStore::default_location(),
//!     settings,
//! );
//!
//! // Drive a selection session with pointer events from the overlay
//! let mut selector = service.begin_region_selection().await?;
//! selector.on_presented();
//! let outcome = selector.run([
//!     SelectorEvent::PointerDown(LogicalPoint::new(100.0, 100.0)),
//!     SelectorEvent::PointerUp(LogicalPoint::new(500.0, 400.0)),
//! ]);
//!
//! if let Some(rect) = outcome.rect {
//!     if let Some(record) = service.capture(CaptureTarget::Region(rect)).await? {
//!         println!("saved screenshot {} to {:?}", record.id, record.file_path);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod capture;
pub mod catalog;
pub mod clipboard;
pub mod desktop;
pub mod encoder;
pub mod error;
pub mod geometry;
pub mod output;
pub mod selector;
pub mod service;
pub mod settings;
pub mod types;
pub mod window_list;

// Re-export main types
pub use capture::{CaptureEngine, Capturer, PlatformBackend, ScreenCapture, WindowSystem};
pub use catalog::{CatalogStore, ScreenshotRecord};
pub use clipboard::{ArboardClipboard, ClipboardSink};
pub use desktop::{compute_bounds, VirtualDesktop};
pub use encoder::ImageFormat;
pub use error::{
    CaptureError, CaptureResult, EncodingError, EncodingResult, SaveError, SaveResult,
    SettingsError, SettingsResult, StoreError, StoreResult, WorkflowError,
};
pub use geometry::{to_absolute_pixels, to_absolute_rect, LogicalPoint, OverlayWindow, PixelPoint};
pub use selector::{RegionSelector, SelectionOutcome, SelectorEvent, SelectorState, MIN_SELECTION_SIZE};
pub use service::{CaptureTarget, ClearReport, ScreenshotService, TextRecognizer};
pub use settings::{Settings, SettingsStore};
pub use types::{
    CaptureRect, CapturedImage, DisplayInfo, PixelFormat, Rectangle, ScreenshotType,
    VirtualDesktopBounds, WindowDescriptor, WindowHandle, WindowRect,
};
pub use window_list::list_capturable_windows;

/// Library version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Name of the native backend compiled for this platform
pub fn platform_backend() -> &'static str {
    if cfg!(target_os = "windows") {
        "Windows GDI"
    } else if cfg!(target_os = "linux") {
        "Linux X11"
    } else {
        "unsupported"
    }
}

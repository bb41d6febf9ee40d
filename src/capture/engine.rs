//! Asynchronous capture operations over a platform backend
//!
//! Native failures never escape as errors: they are logged and collapse to
//! `None`, so UI-facing callers handle a single failure shape. Only
//! environment errors (no monitors, no primary monitor) are reported.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{
    capture::{PlatformBackend, ScreenCapture, WindowSystem},
    error::{CaptureError, CaptureResult},
    types::{CaptureRect, CapturedImage, DisplayInfo, WindowHandle},
};

/// Wait between foreground activation and the pixel copy of a window capture
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Capture engine: region, full-screen and window capture
#[derive(Clone)]
pub struct CaptureEngine {
    screen: Arc<dyn ScreenCapture>,
    windows: Arc<dyn WindowSystem>,
    settle_delay: Duration,
}

impl CaptureEngine {
    pub fn new(backend: PlatformBackend) -> Self {
        Self {
            screen: backend.screen,
            windows: backend.windows,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Override the window-capture settling delay
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    pub fn screen(&self) -> &Arc<dyn ScreenCapture> {
        &self.screen
    }

    pub fn windows(&self) -> &Arc<dyn WindowSystem> {
        &self.windows
    }

    /// Capture an absolute pixel rectangle
    pub async fn capture_region(&self, rect: CaptureRect) -> Option<CapturedImage> {
        let screen = Arc::clone(&self.screen);
        let outcome = run_blocking(move || copy_pixels(&*screen, rect)).await;
        settle("region", outcome)
    }

    /// Capture the monitor holding `hint`, or the primary monitor without one
    pub async fn capture_full_screen(
        &self,
        hint: Option<WindowHandle>,
    ) -> CaptureResult<Option<CapturedImage>> {
        let screen = Arc::clone(&self.screen);
        let windows = Arc::clone(&self.windows);

        let target = run_blocking(move || -> CaptureResult<Option<CaptureRect>> {
            let displays = screen.get_displays()?;
            let display = select_full_screen_display(&displays, &*windows, hint)?;
            log::debug!(
                "full-screen capture of display {} ({})",
                display.index,
                display.name
            );
            Ok(display.capture_rect())
        })
        .await;

        let rect = match target {
            Ok(Some(rect)) => rect,
            Ok(None) => {
                log::warn!("full-screen capture: target display has no area");
                return Ok(None);
            }
            Err(
                err @ (CaptureError::NoMonitorsDetected | CaptureError::NoPrimaryMonitor),
            ) => return Err(err),
            Err(err) => {
                log::warn!("full-screen capture failed: {}", err);
                return Ok(None);
            }
        };

        Ok(self.capture_region(rect).await)
    }

    /// Capture a top-level window.
    ///
    /// Raises the window and waits the settling delay before copying, so
    /// compositing window managers have redrawn it.
    pub async fn capture_window(&self, handle: WindowHandle) -> Option<CapturedImage> {
        let windows = Arc::clone(&self.windows);
        let prepared = run_blocking(move || -> CaptureResult<CaptureRect> {
            if !windows.is_window(handle) || !windows.is_visible(handle) {
                return Err(CaptureError::InvalidHandle(handle));
            }
            let rect = windows.window_rect(handle)?;
            let capture = rect.to_capture_rect().ok_or(CaptureError::InvalidGeometry {
                width: rect.width(),
                height: rect.height(),
            })?;
            if !windows.bring_to_foreground(handle) {
                log::debug!("window {} refused foreground activation", handle);
            }
            Ok(capture)
        })
        .await;

        let rect = settle("window", prepared)?;

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let screen = Arc::clone(&self.screen);
        let windows = Arc::clone(&self.windows);
        let outcome = run_blocking(move || {
            // The window may have been destroyed during the settling delay
            if !windows.is_window(handle) {
                return Err(CaptureError::InvalidHandle(handle));
            }
            copy_pixels(&*screen, rect)
        })
        .await;
        settle("window", outcome)
    }
}

/// Choose the display for a full-screen capture
pub fn select_full_screen_display<'a>(
    displays: &'a [DisplayInfo],
    windows: &dyn WindowSystem,
    hint: Option<WindowHandle>,
) -> CaptureResult<&'a DisplayInfo> {
    if displays.is_empty() {
        return Err(CaptureError::NoMonitorsDetected);
    }

    if let Some(handle) = hint {
        let hinted = windows
            .window_rect(handle)
            .ok()
            .and_then(|rect| rect.to_capture_rect())
            .and_then(|rect| display_for_rect(displays, &rect));
        match hinted {
            Some(display) => return Ok(display),
            None => log::debug!("hint window {} not on any display, using primary", handle),
        }
    }

    displays
        .iter()
        .find(|d| d.is_primary)
        .ok_or(CaptureError::NoPrimaryMonitor)
}

/// Display with the largest overlap with `rect`
fn display_for_rect<'a>(displays: &'a [DisplayInfo], rect: &CaptureRect) -> Option<&'a DisplayInfo> {
    let target = rect.as_rectangle();
    displays
        .iter()
        .map(|d| (d, d.bounds().intersection_area(&target)))
        .filter(|(_, area)| *area > 0)
        .max_by_key(|(_, area)| *area)
        .map(|(d, _)| d)
}

fn copy_pixels(screen: &dyn ScreenCapture, rect: CaptureRect) -> CaptureResult<CapturedImage> {
    let start = Instant::now();
    let image = screen.capture_region(rect)?;
    log::debug!(
        "{}: captured {} in {:?}",
        screen.implementation_name(),
        rect,
        start.elapsed()
    );
    Ok(image)
}

/// Run native work on the blocking pool; a panicked worker becomes a
/// capture failure
async fn run_blocking<T, F>(work: F) -> CaptureResult<T>
where
    F: FnOnce() -> CaptureResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result,
        Err(join) => Err(CaptureError::CaptureFailed(format!(
            "capture worker failed: {}",
            join
        ))),
    }
}

fn settle<T>(operation: &str, outcome: CaptureResult<T>) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("{} capture failed: {}", operation, err);
            None
        }
    }
}

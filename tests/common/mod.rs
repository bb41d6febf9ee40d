//! Recording mock backend shared by the integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use snapcap::{
    CaptureError, CaptureRect, CaptureResult, CapturedImage, DisplayInfo, PixelFormat,
    PlatformBackend, ScreenCapture, WindowHandle, WindowRect, WindowSystem,
};

#[derive(Debug, Clone)]
pub struct MockWindow {
    pub title: String,
    pub process: Option<String>,
    pub rect: WindowRect,
    pub visible: bool,
    /// Window closes as soon as it is asked to come to the foreground
    pub closes_on_activate: bool,
}

impl MockWindow {
    pub fn new(title: &str, process: &str, rect: WindowRect) -> Self {
        Self {
            title: title.to_string(),
            process: Some(process.to_string()),
            rect,
            visible: true,
            closes_on_activate: false,
        }
    }
}

#[derive(Default)]
pub struct MockBackend {
    pub displays: Mutex<Vec<DisplayInfo>>,
    pub windows: Mutex<BTreeMap<u64, MockWindow>>,
    pub copied: Mutex<Vec<CaptureRect>>,
    pub activations: AtomicUsize,
    pub fail_copies: AtomicBool,
}

impl MockBackend {
    pub fn with_displays(displays: Vec<DisplayInfo>) -> Arc<Self> {
        let backend = Self::default();
        *backend.displays.lock() = displays;
        Arc::new(backend)
    }

    pub fn add_window(&self, id: u64, window: MockWindow) -> WindowHandle {
        self.windows.lock().insert(id, window);
        WindowHandle::from_raw(id)
    }

    pub fn pixel_copies(&self) -> usize {
        self.copied.lock().len()
    }

    pub fn platform(self: &Arc<Self>) -> PlatformBackend {
        PlatformBackend::new(self.clone(), self.clone())
    }
}

pub fn display(index: usize, x: i32, y: i32, width: u32, height: u32, primary: bool) -> DisplayInfo {
    DisplayInfo {
        index,
        name: format!("MOCK{}", index),
        width,
        height,
        x,
        y,
        scale_factor: 1.0,
        is_primary: primary,
    }
}

impl ScreenCapture for MockBackend {
    fn get_displays(&self) -> CaptureResult<Vec<DisplayInfo>> {
        Ok(self.displays.lock().clone())
    }

    fn capture_region(&self, rect: CaptureRect) -> CaptureResult<CapturedImage> {
        self.copied.lock().push(rect);
        if self.fail_copies.load(Ordering::SeqCst) {
            return Err(CaptureError::CaptureFailed("mock BitBlt failed".to_string()));
        }
        let size = rect.width() as usize * rect.height() as usize * 4;
        CapturedImage::new(vec![0x80; size], rect.width(), rect.height(), PixelFormat::RGBA8)
    }

    fn implementation_name(&self) -> String {
        "Mock".to_string()
    }
}

impl WindowSystem for MockBackend {
    fn window_handles(&self) -> CaptureResult<Vec<WindowHandle>> {
        Ok(self
            .windows
            .lock()
            .keys()
            .map(|&id| WindowHandle::from_raw(id))
            .collect())
    }

    fn is_window(&self, handle: WindowHandle) -> bool {
        self.windows.lock().contains_key(&handle.raw())
    }

    fn is_visible(&self, handle: WindowHandle) -> bool {
        self.windows
            .lock()
            .get(&handle.raw())
            .map_or(false, |w| w.visible)
    }

    fn title(&self, handle: WindowHandle) -> String {
        self.windows
            .lock()
            .get(&handle.raw())
            .map(|w| w.title.clone())
            .unwrap_or_default()
    }

    fn process_name(&self, handle: WindowHandle) -> CaptureResult<String> {
        self.windows
            .lock()
            .get(&handle.raw())
            .and_then(|w| w.process.clone())
            .ok_or(CaptureError::InvalidHandle(handle))
    }

    fn window_rect(&self, handle: WindowHandle) -> CaptureResult<WindowRect> {
        self.windows
            .lock()
            .get(&handle.raw())
            .map(|w| w.rect)
            .ok_or(CaptureError::InvalidHandle(handle))
    }

    fn bring_to_foreground(&self, handle: WindowHandle) -> bool {
        self.activations.fetch_add(1, Ordering::SeqCst);
        let mut windows = self.windows.lock();
        let closes = windows
            .get(&handle.raw())
            .map_or(false, |w| w.closes_on_activate);
        if closes {
            windows.remove(&handle.raw());
        }
        true
    }
}

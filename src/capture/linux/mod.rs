//! Linux screen capture implementation

mod x11_capture;

use crate::{
    capture::traits::{ScreenCapture, WindowSystem},
    error::{CaptureError, CaptureResult},
    types::{CaptureRect, CapturedImage, DisplayInfo, WindowHandle, WindowRect},
};

/// Linux screen capture implementation
pub struct LinuxCapture {
    x11: x11_capture::X11Capture,
}

impl LinuxCapture {
    /// Create a new Linux capturer
    pub fn new() -> CaptureResult<Self> {
        if std::env::var_os("DISPLAY").is_none() {
            return Err(CaptureError::PlatformError(
                "No X11 display found (DISPLAY is not set)".to_string(),
            ));
        }

        Ok(Self {
            x11: x11_capture::X11Capture::new()?,
        })
    }
}

impl ScreenCapture for LinuxCapture {
    fn get_displays(&self) -> CaptureResult<Vec<DisplayInfo>> {
        self.x11.get_displays()
    }

    fn capture_region(&self, rect: CaptureRect) -> CaptureResult<CapturedImage> {
        self.x11.capture_region(rect)
    }

    fn implementation_name(&self) -> String {
        "Linux X11".to_string()
    }
}

impl WindowSystem for LinuxCapture {
    fn window_handles(&self) -> CaptureResult<Vec<WindowHandle>> {
        self.x11.client_windows()
    }

    fn is_window(&self, handle: WindowHandle) -> bool {
        self.x11.is_window(handle)
    }

    fn is_visible(&self, handle: WindowHandle) -> bool {
        self.x11.is_viewable(handle)
    }

    fn title(&self, handle: WindowHandle) -> String {
        self.x11.title(handle)
    }

    fn process_name(&self, handle: WindowHandle) -> CaptureResult<String> {
        self.x11.process_name(handle)
    }

    fn window_rect(&self, handle: WindowHandle) -> CaptureResult<WindowRect> {
        self.x11.window_rect(handle)
    }

    fn bring_to_foreground(&self, handle: WindowHandle) -> bool {
        self.x11.activate(handle)
    }
}

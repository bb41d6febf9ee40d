//! Traits for screen and window capture backends

use crate::error::CaptureResult;
use crate::types::{CaptureRect, CapturedImage, DisplayInfo, WindowHandle, WindowRect};

/// Pixel source: monitor enumeration plus the native "copy screen pixels"
/// primitive.
///
/// Implementations own every native resource they acquire inside a call and
/// release it before returning, on success and on error.
pub trait ScreenCapture: Send + Sync {
    /// Get list of active displays
    fn get_displays(&self) -> CaptureResult<Vec<DisplayInfo>>;

    /// Copy the pixels of an absolute virtual-desktop rectangle
    fn capture_region(&self, rect: CaptureRect) -> CaptureResult<CapturedImage>;

    /// Get the implementation name
    fn implementation_name(&self) -> String;
}

/// Top-level window queries and activation
pub trait WindowSystem: Send + Sync {
    /// Snapshot of all top-level windows, materialized before any filtering
    fn window_handles(&self) -> CaptureResult<Vec<WindowHandle>>;

    /// Whether the handle still refers to a window
    fn is_window(&self, handle: WindowHandle) -> bool;

    fn is_visible(&self, handle: WindowHandle) -> bool;

    /// Window title, empty when it has none
    fn title(&self, handle: WindowHandle) -> String;

    /// Name of the owning process
    fn process_name(&self, handle: WindowHandle) -> CaptureResult<String>;

    /// Screen rectangle of the window in virtual-desktop pixels
    fn window_rect(&self, handle: WindowHandle) -> CaptureResult<WindowRect>;

    /// Ask the window manager to raise and focus the window.
    ///
    /// Returns false when the request was refused; capture proceeds anyway.
    fn bring_to_foreground(&self, handle: WindowHandle) -> bool;
}

/// Helper trait for pixel format conversion
pub trait PixelFormatConverter {
    /// Convert BGRA to RGBA
    fn convert_bgra_to_rgba(&self, data: &mut [u8]);

    /// Convert BGRX (undefined fourth byte) to opaque RGBA
    fn convert_bgrx_to_rgba(&self, data: &mut [u8]);
}

/// Default implementation for pixel format conversion
pub struct DefaultPixelConverter;

impl PixelFormatConverter for DefaultPixelConverter {
    fn convert_bgra_to_rgba(&self, data: &mut [u8]) {
        // Process 4 bytes at a time (BGRA -> RGBA)
        for chunk in data.chunks_exact_mut(4) {
            chunk.swap(0, 2); // Swap B and R
        }
    }

    fn convert_bgrx_to_rgba(&self, data: &mut [u8]) {
        for chunk in data.chunks_exact_mut(4) {
            chunk.swap(0, 2);
            chunk[3] = 0xFF;
        }
    }
}

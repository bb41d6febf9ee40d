//! Core types shared by capture, selection and catalog code

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capture::traits::{DefaultPixelConverter, PixelFormatConverter};
use crate::error::{CaptureError, CaptureResult};

/// Information about a display/monitor
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayInfo {
    /// Display index (0-based, enumeration order)
    pub index: usize,
    /// Display name or identifier
    pub name: String,
    /// Width in physical pixels
    pub width: u32,
    /// Height in physical pixels
    pub height: u32,
    /// X offset in virtual-desktop coordinates
    pub x: i32,
    /// Y offset in virtual-desktop coordinates
    pub y: i32,
    /// Effective scale factor (1.0 = 96 DPI)
    pub scale_factor: f64,
    /// Whether this is the primary display
    pub is_primary: bool,
}

impl Default for DisplayInfo {
    fn default() -> Self {
        Self {
            index: 0,
            name: "Primary Display".to_string(),
            width: 1920,
            height: 1080,
            x: 0,
            y: 0,
            scale_factor: 1.0,
            is_primary: true,
        }
    }
}

impl DisplayInfo {
    /// Get the display bounds as a rectangle
    pub fn bounds(&self) -> Rectangle {
        Rectangle {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Capture rectangle covering the whole display, `None` for a zero-sized mode
    pub fn capture_rect(&self) -> Option<CaptureRect> {
        CaptureRect::new(self.x, self.y, self.width, self.height).ok()
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }
}

/// Rectangle structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        let (px, py) = (px as i64, py as i64);
        px >= self.x as i64
            && py >= self.y as i64
            && px < self.x as i64 + self.width as i64
            && py < self.y as i64 + self.height as i64
    }

    /// Area of the overlap with `other`, 0 when disjoint
    pub fn intersection_area(&self, other: &Rectangle) -> u64 {
        let left = (self.x as i64).max(other.x as i64);
        let top = (self.y as i64).max(other.y as i64);
        let right = (self.x as i64 + self.width as i64).min(other.x as i64 + other.width as i64);
        let bottom = (self.y as i64 + self.height as i64).min(other.y as i64 + other.height as i64);
        if right <= left || bottom <= top {
            0
        } else {
            ((right - left) * (bottom - top)) as u64
        }
    }
}

/// Absolute, physical-pixel rectangle in virtual-desktop coordinates.
///
/// Width and height are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureRect {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl CaptureRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> CaptureResult<Self> {
        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidGeometry {
                width: width as i64,
                height: height as i64,
            });
        }
        Ok(Self { x, y, width, height })
    }

    /// Build from a top-left and an exclusive bottom-right corner.
    pub fn from_corners(left: i32, top: i32, right: i32, bottom: i32) -> CaptureResult<Self> {
        let width = right as i64 - left as i64;
        let height = bottom as i64 - top as i64;
        if width <= 0 || height <= 0 || width > u32::MAX as i64 || height > u32::MAX as i64 {
            return Err(CaptureError::InvalidGeometry { width, height });
        }
        Ok(Self {
            x: left,
            y: top,
            width: width as u32,
            height: height as u32,
        })
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_rectangle(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.width, self.height)
    }
}

impl fmt::Display for CaptureRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Native window rectangle as reported by the window system.
///
/// Edges are signed and unchecked; a minimized or degenerate window may
/// report `right <= left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl WindowRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> i64 {
        self.right as i64 - self.left as i64
    }

    pub fn height(&self) -> i64 {
        self.bottom as i64 - self.top as i64
    }

    /// Convert into a capture rectangle, `None` for a non-positive size
    pub fn to_capture_rect(&self) -> Option<CaptureRect> {
        CaptureRect::from_corners(self.left, self.top, self.right, self.bottom).ok()
    }
}

/// Union of all monitor rectangles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualDesktopBounds {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl VirtualDesktopBounds {
    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    /// Whether `rect` lies entirely inside the bounds
    pub fn contains(&self, rect: &Rectangle) -> bool {
        rect.x as i64 >= self.left as i64
            && rect.y as i64 >= self.top as i64
            && rect.x as i64 + rect.width as i64 <= self.right()
            && rect.y as i64 + rect.height as i64 <= self.bottom()
    }
}

/// Pixel format for captured image data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Red, Green, Blue, Alpha (8 bits per channel)
    RGBA8,
    /// Blue, Green, Red, Alpha (8 bits per channel)
    BGRA8,
}

impl PixelFormat {
    /// Get the number of bytes per pixel
    pub fn bytes_per_pixel(&self) -> usize {
        4
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::RGBA8 => write!(f, "RGBA8"),
            PixelFormat::BGRA8 => write!(f, "BGRA8"),
        }
    }
}

/// Owned, immutable pixel buffer produced by a capture.
///
/// Never aliases OS resources: every native handle used to produce it has
/// been released by the time a value exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    stride: usize,
}

impl CapturedImage {
    /// Create an image with a tightly packed stride
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> CaptureResult<Self> {
        let stride = width as usize * format.bytes_per_pixel();
        Self::with_stride(data, width, height, format, stride)
    }

    /// Create an image with custom stride (bytes per row, may include padding)
    pub fn with_stride(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        stride: usize,
    ) -> CaptureResult<Self> {
        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidGeometry {
                width: width as i64,
                height: height as i64,
            });
        }
        let row = width as usize * format.bytes_per_pixel();
        if stride < row || data.len() < stride * height as usize {
            return Err(CaptureError::CaptureFailed(format!(
                "pixel buffer too small: {} bytes for {}x{} (stride {})",
                data.len(),
                width,
                height,
                stride
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            format,
            stride,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the total size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Get a pixel at the given coordinates
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let pixel_size = self.format.bytes_per_pixel();
        let offset = (y as usize) * self.stride + (x as usize) * pixel_size;
        self.data.get(offset..offset + pixel_size)
    }

    /// Tightly packed RGBA8 bytes, converting and dropping row padding as needed
    pub fn to_rgba8(&self) -> Vec<u8> {
        let row = self.width as usize * 4;
        let mut out = Vec::with_capacity(row * self.height as usize);
        for line in self.data.chunks(self.stride).take(self.height as usize) {
            out.extend_from_slice(&line[..row]);
        }
        if self.format == PixelFormat::BGRA8 {
            DefaultPixelConverter.convert_bgra_to_rgba(&mut out);
        }
        out
    }

    /// Convert into an `image` buffer
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        // to_rgba8 always yields width * height * 4 bytes
        image::RgbaImage::from_raw(self.width, self.height, self.to_rgba8())
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }
}

/// Opaque identifier of a top-level window (HWND on Windows, XID on X11)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(u64);

impl WindowHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A capturable window, valid for the duration of one window-pick session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDescriptor {
    pub handle: WindowHandle,
    pub title: String,
    /// Owning process name, empty when the lookup failed
    pub process_name: String,
    pub display_name: String,
}

impl WindowDescriptor {
    pub fn new(handle: WindowHandle, title: String, process_name: String) -> Self {
        let display_name = if process_name.is_empty() {
            title.clone()
        } else {
            format!("{} - {}", process_name, title)
        };
        Self {
            handle,
            title,
            process_name,
            display_name,
        }
    }
}

/// How a screenshot was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenshotType {
    Regional,
    FullScreen,
    Window,
    Stitched,
}

impl fmt::Display for ScreenshotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenshotType::Regional => write!(f, "Regional"),
            ScreenshotType::FullScreen => write!(f, "FullScreen"),
            ScreenshotType::Window => write!(f, "Window"),
            ScreenshotType::Stitched => write!(f, "Stitched"),
        }
    }
}

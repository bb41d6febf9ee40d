//! Windows GDI-based screen capture
//!
//! Every GDI object is held by a guard whose `Drop` releases it, so each
//! exit path of `capture_region` (including early returns and panics)
//! frees the screen DC, memory DC, bitmap and selection.

use crate::{
    capture::traits::{DefaultPixelConverter, PixelFormatConverter},
    error::{CaptureError, CaptureResult},
    types::{CaptureRect, CapturedImage, PixelFormat},
};

use windows::Win32::{
    Foundation::HWND,
    Graphics::Gdi::*,
};

/// DC for the entire virtual desktop (all monitors)
struct ScreenDc(HDC);

impl ScreenDc {
    fn acquire() -> CaptureResult<Self> {
        // GetDC(NULL) accepts negative coordinates for monitors left of or
        // above the primary one
        let hdc = unsafe { GetDC(HWND(std::ptr::null_mut())) };
        if hdc.is_invalid() {
            return Err(CaptureError::CaptureFailed(
                "Failed to get screen DC for virtual desktop".to_string(),
            ));
        }
        Ok(Self(hdc))
    }
}

impl Drop for ScreenDc {
    fn drop(&mut self) {
        unsafe {
            ReleaseDC(HWND(std::ptr::null_mut()), self.0);
        }
    }
}

struct MemoryDc(HDC);

impl MemoryDc {
    fn compatible_with(screen: &ScreenDc) -> CaptureResult<Self> {
        let hdc = unsafe { CreateCompatibleDC(screen.0) };
        if hdc.is_invalid() {
            return Err(CaptureError::CaptureFailed(
                "Failed to create compatible DC".to_string(),
            ));
        }
        Ok(Self(hdc))
    }
}

impl Drop for MemoryDc {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteDC(self.0);
        }
    }
}

struct Bitmap(HBITMAP);

impl Bitmap {
    fn compatible_with(screen: &ScreenDc, width: i32, height: i32) -> CaptureResult<Self> {
        let hbitmap = unsafe { CreateCompatibleBitmap(screen.0, width, height) };
        if hbitmap.is_invalid() {
            return Err(CaptureError::CaptureFailed(format!(
                "Failed to create compatible bitmap {}x{}",
                width, height
            )));
        }
        Ok(Self(hbitmap))
    }
}

impl Drop for Bitmap {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(self.0);
        }
    }
}

/// Bitmap selected into a memory DC; restores the previous object on drop
struct Selection<'a> {
    dc: &'a MemoryDc,
    previous: HGDIOBJ,
}

impl<'a> Selection<'a> {
    fn select(dc: &'a MemoryDc, bitmap: &Bitmap) -> CaptureResult<Self> {
        let previous = unsafe { SelectObject(dc.0, bitmap.0) };
        if previous.is_invalid() {
            return Err(CaptureError::CaptureFailed(
                "Failed to select bitmap into memory DC".to_string(),
            ));
        }
        Ok(Self { dc, previous })
    }
}

impl Drop for Selection<'_> {
    fn drop(&mut self) {
        unsafe {
            SelectObject(self.dc.0, self.previous);
        }
    }
}

/// GDI-based screen capture
pub struct GdiCapture;

impl GdiCapture {
    /// Create a new GDI capturer
    pub fn new() -> CaptureResult<Self> {
        Ok(Self)
    }

    /// Capture a specific region using GDI
    pub fn capture_region(&self, rect: CaptureRect) -> CaptureResult<CapturedImage> {
        let too_large = || CaptureError::InvalidGeometry {
            width: rect.width() as i64,
            height: rect.height() as i64,
        };
        let width = i32::try_from(rect.width()).map_err(|_| too_large())?;
        let height = i32::try_from(rect.height()).map_err(|_| too_large())?;

        let screen = ScreenDc::acquire()?;
        let memory = MemoryDc::compatible_with(&screen)?;
        let bitmap = Bitmap::compatible_with(&screen, width, height)?;

        {
            let _selection = Selection::select(&memory, &bitmap)?;

            log::debug!("[GDI] BitBlt {} from virtual desktop", rect);
            unsafe {
                BitBlt(
                    memory.0,
                    0,
                    0,
                    width,
                    height,
                    screen.0,
                    rect.x(),
                    rect.y(),
                    ROP_CODE(SRCCOPY.0 | CAPTUREBLT.0),
                )
            }
            .map_err(|e| CaptureError::CaptureFailed(format!("BitBlt failed: {}", e)))?;
            // The selection is undone here: GetDIBits needs the bitmap
            // deselected from every DC.
        }

        let mut bmp_info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                biHeight: -height, // Negative for top-down bitmap
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };

        let buffer_size = width as usize * height as usize * 4;
        let mut data = vec![0u8; buffer_size];

        let scan_lines = unsafe {
            GetDIBits(
                memory.0,
                bitmap.0,
                0,
                height as u32,
                Some(data.as_mut_ptr() as *mut _),
                &mut bmp_info,
                DIB_RGB_COLORS,
            )
        };

        if scan_lines != height {
            return Err(CaptureError::CaptureFailed(format!(
                "GetDIBits copied {} of {} scan lines",
                scan_lines, height
            )));
        }

        // GDI leaves the fourth byte undefined for screen bitmaps
        DefaultPixelConverter.convert_bgrx_to_rgba(&mut data);

        CapturedImage::new(data, rect.width(), rect.height(), PixelFormat::RGBA8)
    }
}

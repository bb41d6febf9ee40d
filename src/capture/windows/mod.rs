//! Windows screen capture implementation

mod gdi;
mod window;

use crate::{
    capture::traits::{ScreenCapture, WindowSystem},
    error::{CaptureError, CaptureResult},
    types::{CaptureRect, CapturedImage, DisplayInfo, WindowHandle, WindowRect},
};

use windows::Win32::{
    Foundation::*,
    Graphics::Gdi::*,
    UI::HiDpi::{GetDpiForMonitor, MDT_EFFECTIVE_DPI},
};

/// DPI at which one logical unit is one device pixel
const BASE_DPI: f64 = 96.0;

/// Windows screen capture implementation
pub struct WindowsCapture {
    gdi_capturer: gdi::GdiCapture,
}

impl WindowsCapture {
    /// Create a new Windows capturer
    pub fn new() -> CaptureResult<Self> {
        Ok(Self {
            gdi_capturer: gdi::GdiCapture::new()?,
        })
    }

    /// Enumerate all displays
    fn enumerate_displays() -> CaptureResult<Vec<DisplayInfo>> {
        let mut displays: Vec<DisplayInfo> = Vec::new();

        unsafe extern "system" fn monitor_enum_proc(
            hmonitor: HMONITOR,
            _hdc: HDC,
            _rect: *mut RECT,
            lparam: LPARAM,
        ) -> BOOL {
            let displays = &mut *(lparam.0 as *mut Vec<DisplayInfo>);

            let mut info = MONITORINFOEXW {
                monitorInfo: MONITORINFO {
                    cbSize: std::mem::size_of::<MONITORINFOEXW>() as u32,
                    ..Default::default()
                },
                ..Default::default()
            };

            if GetMonitorInfoW(hmonitor, &mut info.monitorInfo as *mut _ as *mut MONITORINFO)
                .as_bool()
            {
                let rect = info.monitorInfo.rcMonitor;
                let name_len = info
                    .szDevice
                    .iter()
                    .position(|&c| c == 0)
                    .unwrap_or(info.szDevice.len());

                displays.push(DisplayInfo {
                    index: displays.len(),
                    name: String::from_utf16_lossy(&info.szDevice[..name_len]),
                    width: (rect.right - rect.left).max(0) as u32,
                    height: (rect.bottom - rect.top).max(0) as u32,
                    x: rect.left,
                    y: rect.top,
                    scale_factor: monitor_scale(hmonitor),
                    is_primary: (info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY) != 0,
                });
            }

            TRUE
        }

        let enumerated = unsafe {
            EnumDisplayMonitors(
                HDC::default(),
                None,
                Some(monitor_enum_proc),
                LPARAM(&mut displays as *mut Vec<DisplayInfo> as isize),
            )
        };

        if !enumerated.as_bool() {
            return Err(CaptureError::DisplayEnumerationFailed(
                "EnumDisplayMonitors failed".to_string(),
            ));
        }

        if displays.is_empty() {
            return Err(CaptureError::NoMonitorsDetected);
        }

        log::debug!("[Windows] enumerated {} displays", displays.len());
        Ok(displays)
    }
}

/// Effective DPI of a monitor relative to 96 DPI
fn monitor_scale(hmonitor: HMONITOR) -> f64 {
    let mut dpi_x = 0u32;
    let mut dpi_y = 0u32;
    match unsafe { GetDpiForMonitor(hmonitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y) } {
        Ok(()) if dpi_x > 0 => dpi_x as f64 / BASE_DPI,
        _ => 1.0,
    }
}

impl ScreenCapture for WindowsCapture {
    fn get_displays(&self) -> CaptureResult<Vec<DisplayInfo>> {
        Self::enumerate_displays()
    }

    fn capture_region(&self, rect: CaptureRect) -> CaptureResult<CapturedImage> {
        self.gdi_capturer.capture_region(rect)
    }

    fn implementation_name(&self) -> String {
        "Windows GDI".to_string()
    }
}

impl WindowSystem for WindowsCapture {
    fn window_handles(&self) -> CaptureResult<Vec<WindowHandle>> {
        window::enumerate_top_level()
    }

    fn is_window(&self, handle: WindowHandle) -> bool {
        window::is_window(handle)
    }

    fn is_visible(&self, handle: WindowHandle) -> bool {
        window::is_visible(handle)
    }

    fn title(&self, handle: WindowHandle) -> String {
        window::title(handle)
    }

    fn process_name(&self, handle: WindowHandle) -> CaptureResult<String> {
        window::process_name(handle)
    }

    fn window_rect(&self, handle: WindowHandle) -> CaptureResult<WindowRect> {
        window::window_rect(handle)
    }

    fn bring_to_foreground(&self, handle: WindowHandle) -> bool {
        window::bring_to_foreground(handle)
    }
}

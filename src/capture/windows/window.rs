//! Top-level window queries over Win32

use std::ffi::c_void;
use std::path::Path;

use crate::{
    error::{CaptureError, CaptureResult},
    types::{WindowHandle, WindowRect},
};

use windows::core::PWSTR;
use windows::Win32::{
    Foundation::*,
    Graphics::Dwm::{DwmGetWindowAttribute, DWMWA_EXTENDED_FRAME_BOUNDS},
    System::Threading::{
        OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_FORMAT,
        PROCESS_QUERY_LIMITED_INFORMATION,
    },
    UI::WindowsAndMessaging::*,
};

fn hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.raw() as usize as *mut c_void)
}

/// Closes a process handle on drop
struct ProcessHandle(HANDLE);

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

pub(super) fn enumerate_top_level() -> CaptureResult<Vec<WindowHandle>> {
    let mut handles: Vec<WindowHandle> = Vec::new();

    unsafe extern "system" fn enum_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
        let handles = &mut *(lparam.0 as *mut Vec<WindowHandle>);
        handles.push(WindowHandle::from_raw(hwnd.0 as usize as u64));
        TRUE
    }

    unsafe {
        EnumWindows(
            Some(enum_proc),
            LPARAM(&mut handles as *mut Vec<WindowHandle> as isize),
        )
    }
    .map_err(|e| CaptureError::PlatformError(format!("EnumWindows failed: {}", e)))?;

    Ok(handles)
}

pub(super) fn is_window(handle: WindowHandle) -> bool {
    unsafe { IsWindow(hwnd(handle)) }.as_bool()
}

pub(super) fn is_visible(handle: WindowHandle) -> bool {
    unsafe { IsWindowVisible(hwnd(handle)) }.as_bool()
}

pub(super) fn title(handle: WindowHandle) -> String {
    let hwnd = hwnd(handle);
    let len = unsafe { GetWindowTextLengthW(hwnd) };
    if len <= 0 {
        return String::new();
    }

    let mut buf = vec![0u16; len as usize + 1];
    let copied = unsafe { GetWindowTextW(hwnd, &mut buf) };
    String::from_utf16_lossy(&buf[..copied.max(0) as usize])
}

/// Executable name of the owning process, without directory or extension
pub(super) fn process_name(handle: WindowHandle) -> CaptureResult<String> {
    let mut pid = 0u32;
    unsafe { GetWindowThreadProcessId(hwnd(handle), Some(&mut pid)) };
    if pid == 0 {
        return Err(CaptureError::InvalidHandle(handle));
    }

    let process = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, FALSE, pid) }
        .map(ProcessHandle)
        .map_err(|e| CaptureError::PlatformError(format!("OpenProcess({}) failed: {}", pid, e)))?;

    let mut buf = vec![0u16; MAX_PATH as usize];
    let mut len = buf.len() as u32;
    unsafe {
        QueryFullProcessImageNameW(
            process.0,
            PROCESS_NAME_FORMAT(0),
            PWSTR(buf.as_mut_ptr()),
            &mut len,
        )
    }
    .map_err(|e| CaptureError::PlatformError(format!("QueryFullProcessImageNameW failed: {}", e)))?;

    let path = String::from_utf16_lossy(&buf[..len as usize]);
    Ok(Path::new(&path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or(path))
}

/// Visible frame of the window.
///
/// DWM's extended frame excludes the invisible resize borders that
/// `GetWindowRect` reports on Windows 10 and later.
pub(super) fn window_rect(handle: WindowHandle) -> CaptureResult<WindowRect> {
    let hwnd = hwnd(handle);
    let mut rect = RECT::default();

    let extended = unsafe {
        DwmGetWindowAttribute(
            hwnd,
            DWMWA_EXTENDED_FRAME_BOUNDS,
            &mut rect as *mut RECT as *mut c_void,
            std::mem::size_of::<RECT>() as u32,
        )
    };

    if extended.is_err() {
        unsafe { GetWindowRect(hwnd, &mut rect) }
            .map_err(|_| CaptureError::InvalidHandle(handle))?;
    }

    Ok(WindowRect {
        left: rect.left,
        top: rect.top,
        right: rect.right,
        bottom: rect.bottom,
    })
}

pub(super) fn bring_to_foreground(handle: WindowHandle) -> bool {
    let hwnd = hwnd(handle);
    unsafe {
        if IsIconic(hwnd).as_bool() {
            let _ = ShowWindow(hwnd, SW_RESTORE);
        }
        SetForegroundWindow(hwnd).as_bool()
    }
}

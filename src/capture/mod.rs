//! Screen capture module with platform-specific implementations

pub mod engine;
pub mod traits;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "linux")]
pub mod linux;

pub use engine::{CaptureEngine, DEFAULT_SETTLE_DELAY};
pub use traits::{ScreenCapture, WindowSystem};

use std::sync::Arc;

use crate::error::CaptureResult;

/// A pixel source and a window system, usually backed by the same native
/// connection
#[derive(Clone)]
pub struct PlatformBackend {
    pub screen: Arc<dyn ScreenCapture>,
    pub windows: Arc<dyn WindowSystem>,
}

impl PlatformBackend {
    pub fn new(screen: Arc<dyn ScreenCapture>, windows: Arc<dyn WindowSystem>) -> Self {
        Self { screen, windows }
    }
}

/// Platform-specific capturer factory
pub struct Capturer;

impl Capturer {
    /// Create the native backend for the current platform
    pub fn new() -> CaptureResult<PlatformBackend> {
        #[cfg(target_os = "windows")]
        {
            let native = Arc::new(windows::WindowsCapture::new()?);
            Ok(PlatformBackend::new(native.clone(), native))
        }

        #[cfg(target_os = "linux")]
        {
            let native = Arc::new(linux::LinuxCapture::new()?);
            Ok(PlatformBackend::new(native.clone(), native))
        }

        #[cfg(not(any(target_os = "windows", target_os = "linux")))]
        {
            Err(crate::error::CaptureError::PlatformError(
                "Unsupported platform".to_string(),
            ))
        }
    }
}

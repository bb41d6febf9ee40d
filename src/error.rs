//! Error types for the snapcap library

use std::path::PathBuf;

use thiserror::Error;

use crate::types::WindowHandle;

/// Main error type for screen capture and selection operations
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Coordinate transform requested before the overlay has a device context
    #[error("Device transform unavailable: overlay has no device context yet")]
    TransformUnavailable,

    /// Monitor enumeration produced nothing
    #[error("No monitors detected")]
    NoMonitorsDetected,

    /// No monitor is flagged as primary and no hint window was given
    #[error("No primary monitor found")]
    NoPrimaryMonitor,

    /// Display enumeration failed
    #[error("Failed to enumerate displays: {0}")]
    DisplayEnumerationFailed(String),

    /// Native capture operation failed
    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    /// Window handle does not refer to a live, visible window
    #[error("Invalid window handle: {0}")]
    InvalidHandle(WindowHandle),

    /// Rectangle with a non-positive dimension
    #[error("Invalid capture geometry: {width}x{height}")]
    InvalidGeometry { width: i64, height: i64 },

    /// Platform-specific error
    #[error("Platform error: {0}")]
    PlatformError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Windows-specific error
    #[cfg(windows)]
    #[error("Windows error: {0}")]
    WindowsError(#[from] windows::core::Error),
}

/// Error type for image encoding operations
#[derive(Error, Debug)]
pub enum EncodingError {
    /// Invalid image dimensions
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Invalid quality parameter
    #[error("Invalid quality parameter: {0} (must be 1-100)")]
    InvalidQuality(u8),

    /// Encoding failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed { format: &'static str, message: String },
}

/// Error type for catalog store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing file unreadable or unwritable
    #[error("Catalog I/O failure at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file exists but cannot be parsed
    #[error("Catalog file {path:?} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Catalog could not be serialized
    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Background worker panicked or was cancelled
    #[error("Catalog worker failed: {0}")]
    Worker(String),
}

/// Error type for settings persistence
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings I/O failure at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Error type for writing captured images to disk
#[derive(Error, Debug)]
pub enum SaveError {
    /// The OS refused access to the target path
    #[error("Access denied writing {path:?}")]
    AccessDenied { path: PathBuf },

    /// Any other I/O failure
    #[error("I/O error writing {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every numeric suffix up to the bound is already taken
    #[error("No free file name left for {base:?}")]
    NamesExhausted { base: PathBuf },

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Error type for the capture-then-catalog flow
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Environment error from the capture engine (no monitors, no primary)
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Removing a backing image file failed for a reason other than not-found
    #[error("Failed to remove {path:?}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Background worker panicked or was cancelled
    #[error("Workflow worker failed: {0}")]
    Worker(String),
}

/// Combined result type for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Combined result type for encoding operations
pub type EncodingResult<T> = Result<T, EncodingError>;

/// Combined result type for catalog operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Combined result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Combined result type for file writes
pub type SaveResult<T> = Result<T, SaveError>;

impl CaptureError {
    /// Check if the error is recoverable (worth retrying)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CaptureError::CaptureFailed(_) | CaptureError::InvalidHandle(_)
        )
    }

    /// Whether the error aborts an interactive selection session
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            CaptureError::TransformUnavailable | CaptureError::NoMonitorsDetected
        )
    }
}

impl SaveError {
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            SaveError::AccessDenied { path }
        } else {
            SaveError::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_error_display() {
        let err = CaptureError::InvalidHandle(WindowHandle::from_raw(0x42));
        assert_eq!(err.to_string(), "Invalid window handle: 0x42");
    }

    #[test]
    fn test_encoding_error_display() {
        let err = EncodingError::InvalidQuality(150);
        assert_eq!(
            err.to_string(),
            "Invalid quality parameter: 150 (must be 1-100)"
        );
    }

    #[test]
    fn test_is_recoverable() {
        assert!(CaptureError::CaptureFailed("BitBlt".to_string()).is_recoverable());
        assert!(!CaptureError::NoPrimaryMonitor.is_recoverable());
        assert!(CaptureError::TransformUnavailable.is_session_fatal());
    }

    #[test]
    fn test_permission_denied_maps_to_access_denied() {
        let io = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let err = SaveError::from_io(PathBuf::from("/root/x.png"), io);
        assert!(matches!(err, SaveError::AccessDenied { .. }));

        let io = std::io::Error::from(std::io::ErrorKind::Other);
        let err = SaveError::from_io(PathBuf::from("/tmp/x.png"), io);
        assert!(matches!(err, SaveError::Io { .. }));
    }
}

//! Virtual desktop bounds

use crate::{
    capture::ScreenCapture,
    error::{CaptureError, CaptureResult},
    types::{DisplayInfo, VirtualDesktopBounds},
};

/// Compute the rectangle enclosing every monitor.
///
/// An empty monitor list is an error, never a zero-sized rectangle.
pub fn compute_bounds(monitors: &[DisplayInfo]) -> CaptureResult<VirtualDesktopBounds> {
    if monitors.is_empty() {
        return Err(CaptureError::NoMonitorsDetected);
    }

    let mut min_x = i64::MAX;
    let mut min_y = i64::MAX;
    let mut max_x = i64::MIN;
    let mut max_y = i64::MIN;

    for monitor in monitors {
        min_x = min_x.min(monitor.x as i64);
        min_y = min_y.min(monitor.y as i64);
        max_x = max_x.max(monitor.right());
        max_y = max_y.max(monitor.bottom());
    }

    Ok(VirtualDesktopBounds {
        left: min_x as i32,
        top: min_y as i32,
        width: (max_x - min_x).clamp(0, u32::MAX as i64) as u32,
        height: (max_y - min_y).clamp(0, u32::MAX as i64) as u32,
    })
}

/// Monitor layout sampled once per selection session
#[derive(Debug, Clone)]
pub struct VirtualDesktop {
    pub bounds: VirtualDesktopBounds,
    pub monitors: Vec<DisplayInfo>,
}

impl VirtualDesktop {
    /// Query the current monitor set from a capture backend
    pub fn query(capturer: &dyn ScreenCapture) -> CaptureResult<Self> {
        let desktop = Self::from_monitors(capturer.get_displays()?)?;
        log::debug!(
            "virtual desktop: {} monitor(s), {}x{} at ({}, {})",
            desktop.monitors.len(),
            desktop.bounds.width,
            desktop.bounds.height,
            desktop.bounds.left,
            desktop.bounds.top
        );
        Ok(desktop)
    }

    pub fn from_monitors(monitors: Vec<DisplayInfo>) -> CaptureResult<Self> {
        let bounds = compute_bounds(&monitors)?;
        Ok(Self { bounds, monitors })
    }

    pub fn primary(&self) -> Option<&DisplayInfo> {
        self.monitors.iter().find(|m| m.is_primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(x: i32, y: i32, width: u32, height: u32) -> DisplayInfo {
        DisplayInfo {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_monitor_list_fails() {
        assert!(matches!(
            compute_bounds(&[]),
            Err(CaptureError::NoMonitorsDetected)
        ));
    }

    #[test]
    fn test_single_monitor() {
        let bounds = compute_bounds(&[monitor(0, 0, 1920, 1080)]).unwrap();
        assert_eq!(
            bounds,
            VirtualDesktopBounds {
                left: 0,
                top: 0,
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn test_monitor_left_of_and_above_primary() {
        let monitors = [
            monitor(0, 0, 2560, 1440),
            monitor(-1920, -200, 1920, 1080),
            monitor(2560, 400, 1280, 1024),
        ];
        let bounds = compute_bounds(&monitors).unwrap();
        assert_eq!(bounds.left, -1920);
        assert_eq!(bounds.top, -200);
        assert_eq!(bounds.width, 1920 + 2560 + 1280);
        assert_eq!(bounds.height, 1440 + 200);
        for m in &monitors {
            assert!(bounds.contains(&m.bounds()));
        }
    }
}

//! Window-space to physical-pixel coordinate transforms
//!
//! Pointer positions arrive in the overlay window's local, logical space.
//! Two transforms take them to absolute device pixels:
//!
//! 1. window-local → virtual-desktop logical: translate by the overlay
//!    origin, which is pinned to the virtual desktop's top-left corner;
//! 2. logical → physical: scale by the effective DPI transform of the
//!    monitor the point is sampled on.
//!
//! Rounding is half-away-from-zero and is applied to each rectangle corner
//! independently, never to a width or height.

use crate::{
    error::{CaptureError, CaptureResult},
    types::{CaptureRect, DisplayInfo, VirtualDesktopBounds},
};

/// Point in the overlay window's local logical coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicalPoint {
    pub x: f64,
    pub y: f64,
}

impl LogicalPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Absolute device-pixel point in virtual-desktop coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

/// Axis-aligned logical rectangle, normalized so that `left <= right`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicalRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl LogicalRect {
    /// Rectangle spanned by two points, independent of drag direction
    pub fn spanning(a: LogicalPoint, b: LogicalPoint) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Absolute pixel rectangle before the minimum-size policy is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    pub fn width(&self) -> i64 {
        self.right as i64 - self.left as i64
    }

    pub fn height(&self) -> i64 {
        self.bottom as i64 - self.top as i64
    }

    pub fn to_capture_rect(&self) -> CaptureResult<CaptureRect> {
        CaptureRect::from_corners(self.left, self.top, self.right, self.bottom)
    }
}

/// Logical-to-device scale, the equivalent of a compositor's
/// transform-to-device matrix without shear or offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceTransform {
    pub scale_x: f64,
    pub scale_y: f64,
}

impl DeviceTransform {
    pub const IDENTITY: DeviceTransform = DeviceTransform {
        scale_x: 1.0,
        scale_y: 1.0,
    };

    pub fn uniform(scale: f64) -> Self {
        Self {
            scale_x: scale,
            scale_y: scale,
        }
    }

    /// Scale a desktop-logical coordinate pair and round to device pixels
    pub fn to_device(&self, x: f64, y: f64) -> PixelPoint {
        PixelPoint {
            x: round_to_pixel(x * self.scale_x),
            y: round_to_pixel(y * self.scale_y),
        }
    }
}

/// Full-virtual-desktop overlay surface used as the selection coordinate space.
///
/// The device transform is unavailable until the overlay has been presented
/// by the compositor.
#[derive(Debug, Clone)]
pub struct OverlayWindow {
    bounds: VirtualDesktopBounds,
    monitors: Vec<DisplayInfo>,
    presented: bool,
}

impl OverlayWindow {
    pub fn new(bounds: VirtualDesktopBounds, monitors: Vec<DisplayInfo>) -> Self {
        Self {
            bounds,
            monitors,
            presented: false,
        }
    }

    pub fn bounds(&self) -> VirtualDesktopBounds {
        self.bounds
    }

    pub fn monitors(&self) -> &[DisplayInfo] {
        &self.monitors
    }

    /// Called once the compositor has attached a device context
    pub fn mark_presented(&mut self) {
        self.presented = true;
    }

    pub fn is_presented(&self) -> bool {
        self.presented
    }

    /// Translate a window-local point into desktop-logical coordinates
    pub fn to_desktop_logical(&self, point: LogicalPoint) -> (f64, f64) {
        (
            point.x + self.bounds.left as f64,
            point.y + self.bounds.top as f64,
        )
    }

    /// Device transform of the monitor under `point`.
    ///
    /// Falls back to the primary monitor, then the first one, when the point
    /// is outside every monitor (e.g. in a gap of an L-shaped layout).
    pub fn device_transform_at(&self, point: LogicalPoint) -> CaptureResult<DeviceTransform> {
        if !self.presented {
            return Err(CaptureError::TransformUnavailable);
        }

        let (dx, dy) = self.to_desktop_logical(point);
        let (px, py) = (dx.floor() as i32, dy.floor() as i32);

        let monitor = self
            .monitors
            .iter()
            .find(|m| m.bounds().contains_point(px, py))
            .or_else(|| self.monitors.iter().find(|m| m.is_primary))
            .or_else(|| self.monitors.first())
            .ok_or(CaptureError::TransformUnavailable)?;

        Ok(DeviceTransform::uniform(sanitize_scale(monitor.scale_factor)))
    }
}

/// Round half away from zero to the nearest integer pixel, saturating at
/// the `i32` range.
pub fn round_to_pixel(value: f64) -> i32 {
    // f64::round rounds half-way cases away from zero; `as` saturates
    value.round() as i32
}

fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// Convert a window-local point to absolute physical pixels
pub fn to_absolute_pixels(point: LogicalPoint, window: &OverlayWindow) -> CaptureResult<PixelPoint> {
    let transform = window.device_transform_at(point)?;
    let (dx, dy) = window.to_desktop_logical(point);
    Ok(transform.to_device(dx, dy))
}

/// Convert the rectangle spanned by `anchor` and `release` to absolute
/// physical pixels.
///
/// The device transform is sampled once, at the release point, and applied
/// to both corners; a drag that crosses monitors with different scale
/// factors is resolved entirely in the release monitor's scale.
pub fn to_absolute_rect(
    anchor: LogicalPoint,
    release: LogicalPoint,
    window: &OverlayWindow,
) -> CaptureResult<PixelRect> {
    let transform = window.device_transform_at(release)?;
    let rect = LogicalRect::spanning(anchor, release);

    let (left, top) = window.to_desktop_logical(LogicalPoint::new(rect.left, rect.top));
    let (right, bottom) = window.to_desktop_logical(LogicalPoint::new(rect.right, rect.bottom));

    let top_left = transform.to_device(left, top);
    let bottom_right = transform.to_device(right, bottom);

    Ok(PixelRect {
        left: top_left.x,
        top: top_left.y,
        right: bottom_right.x,
        bottom: bottom_right.y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(scale: f64) -> OverlayWindow {
        let monitor = DisplayInfo {
            scale_factor: scale,
            ..Default::default()
        };
        let bounds = VirtualDesktopBounds {
            left: 0,
            top: 0,
            width: 1920,
            height: 1080,
        };
        let mut window = OverlayWindow::new(bounds, vec![monitor]);
        window.mark_presented();
        window
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        assert_eq!(round_to_pixel(2.5), 3);
        assert_eq!(round_to_pixel(-2.5), -3);
        assert_eq!(round_to_pixel(2.4999), 2);
        assert_eq!(round_to_pixel(-0.5), -1);
    }

    #[test]
    fn test_transform_unavailable_before_presentation() {
        let bounds = VirtualDesktopBounds {
            left: 0,
            top: 0,
            width: 100,
            height: 100,
        };
        let window = OverlayWindow::new(bounds, vec![DisplayInfo::default()]);
        let result = to_absolute_pixels(LogicalPoint::new(1.0, 1.0), &window);
        assert!(matches!(result, Err(CaptureError::TransformUnavailable)));
    }

    #[test]
    fn test_origin_offset_is_applied() {
        let left = DisplayInfo {
            x: -1920,
            is_primary: false,
            ..Default::default()
        };
        let right = DisplayInfo::default();
        let bounds = VirtualDesktopBounds {
            left: -1920,
            top: 0,
            width: 3840,
            height: 1080,
        };
        let mut window = OverlayWindow::new(bounds, vec![left, right]);
        window.mark_presented();

        let p = to_absolute_pixels(LogicalPoint::new(10.0, 20.0), &window).unwrap();
        assert_eq!(p, PixelPoint { x: -1910, y: 20 });
    }

    #[test]
    fn test_corners_rounded_independently() {
        let window = window(1.25);
        // 10.2 * 1.25 = 12.75 -> 13, 17.8 * 1.25 = 22.25 -> 22
        let rect =
            to_absolute_rect(LogicalPoint::new(10.2, 10.2), LogicalPoint::new(17.8, 17.8), &window)
                .unwrap();
        assert_eq!((rect.left, rect.right), (13, 22));
        assert_eq!(rect.width(), 9);
    }

    #[test]
    fn test_drag_direction_does_not_matter() {
        let window = window(1.0);
        let forward =
            to_absolute_rect(LogicalPoint::new(100.0, 100.0), LogicalPoint::new(500.0, 400.0), &window)
                .unwrap();
        let backward =
            to_absolute_rect(LogicalPoint::new(500.0, 400.0), LogicalPoint::new(100.0, 100.0), &window)
                .unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_scale_sampled_from_monitor_under_point() {
        let left = DisplayInfo::default();
        let right = DisplayInfo {
            x: 1920,
            scale_factor: 2.0,
            is_primary: false,
            ..Default::default()
        };
        let bounds = VirtualDesktopBounds {
            left: 0,
            top: 0,
            width: 3840,
            height: 1080,
        };
        let mut window = OverlayWindow::new(bounds, vec![left, right]);
        window.mark_presented();

        let on_right = to_absolute_pixels(LogicalPoint::new(2000.0, 10.0), &window).unwrap();
        assert_eq!(on_right, PixelPoint { x: 4000, y: 20 });

        // Below the right monitor nothing is under the point; primary scale applies
        let in_gap = to_absolute_pixels(LogicalPoint::new(2000.0, 1500.0), &window).unwrap();
        assert_eq!(in_gap, PixelPoint { x: 2000, y: 1500 });
    }

    #[test]
    fn test_invalid_scale_falls_back_to_identity() {
        let window = window(f64::NAN);
        let p = to_absolute_pixels(LogicalPoint::new(7.0, 9.0), &window).unwrap();
        assert_eq!(p, PixelPoint { x: 7, y: 9 });
    }
}

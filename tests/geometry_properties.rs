//! Property tests for coordinate transforms and desktop bounds

use approx::assert_relative_eq;
use proptest::prelude::*;
use snapcap::geometry::LogicalRect;
use snapcap::{
    compute_bounds, to_absolute_pixels, to_absolute_rect, DisplayInfo, LogicalPoint,
    OverlayWindow, VirtualDesktopBounds,
};

fn overlay(left: i32, top: i32, scale: f64) -> OverlayWindow {
    let monitor = DisplayInfo {
        x: left,
        y: top,
        width: 4000,
        height: 4000,
        scale_factor: scale,
        ..Default::default()
    };
    let bounds = VirtualDesktopBounds {
        left,
        top,
        width: 4000,
        height: 4000,
    };
    let mut window = OverlayWindow::new(bounds, vec![monitor]);
    window.mark_presented();
    window
}

fn arb_monitor() -> impl Strategy<Value = DisplayInfo> {
    (-5000i32..5000, -5000i32..5000, 1u32..4000, 1u32..4000).prop_map(|(x, y, width, height)| {
        DisplayInfo {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    })
}

proptest! {
    #[test]
    fn unit_scale_is_pure_translation(
        left in -4000i32..4000,
        top in -4000i32..4000,
        x in 0i32..4000,
        y in 0i32..4000,
    ) {
        let window = overlay(left, top, 1.0);
        let p = to_absolute_pixels(LogicalPoint::new(x as f64, y as f64), &window).unwrap();
        prop_assert_eq!((p.x, p.y), (left + x, top + y));
    }

    #[test]
    fn scaled_rect_size_tracks_logical_size(
        x in 0.0f64..1000.0,
        y in 0.0f64..1000.0,
        w in 0.0f64..1000.0,
        h in 0.0f64..1000.0,
        scale in prop::sample::select(vec![1.0, 1.25, 1.5, 1.75, 2.0]),
    ) {
        let window = overlay(0, 0, scale);
        let rect = to_absolute_rect(
            LogicalPoint::new(x, y),
            LogicalPoint::new(x + w, y + h),
            &window,
        )
        .unwrap();

        prop_assert!(rect.width() >= 0 && rect.height() >= 0);
        prop_assert!((rect.width() - (w * scale).round() as i64).abs() <= 1);
        prop_assert!((rect.height() - (h * scale).round() as i64).abs() <= 1);
    }

    #[test]
    fn bounds_contain_every_monitor(monitors in prop::collection::vec(arb_monitor(), 1..6)) {
        let bounds = compute_bounds(&monitors).unwrap();
        for monitor in &monitors {
            prop_assert!(bounds.contains(&monitor.bounds()));
        }
        let min_x = monitors.iter().map(|m| m.x).min().unwrap();
        prop_assert_eq!(bounds.left, min_x);
    }
}

#[test]
fn test_fractional_scale_corner_rounding() {
    let window = overlay(0, 0, 1.25);
    let p = to_absolute_pixels(LogicalPoint::new(101.0, 201.0), &window).unwrap();
    assert_eq!((p.x, p.y), (126, 251));
}

#[test]
fn test_logical_span_is_direction_independent() {
    let rect = LogicalRect::spanning(LogicalPoint::new(17.8, 1.1), LogicalPoint::new(10.2, 3.3));

    assert_relative_eq!(rect.left, 10.2);
    assert_relative_eq!(rect.width(), 7.6, epsilon = 1e-9);
    assert_relative_eq!(rect.height(), 2.2, epsilon = 1e-9);
}

#[test]
fn test_empty_monitor_list_has_no_bounds() {
    assert!(compute_bounds(&[]).is_err());
}

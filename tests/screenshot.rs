// tests/screenshot.rs - One-shot capture helpers

mod common;

use common::{FakePlatform, RGBA_PIXEL};
use deskshot::screenshot::{
    capture_display_with, capture_rect_with, count_active_displays_with, display_bounds_with,
};
use deskshot::{CaptureError, ChannelOrder, Rect};

#[test]
fn test_display_queries() {
    let platform = FakePlatform::new(&[Rect::new(0, 0, 1920, 1080), Rect::new(-1280, 0, 1280, 1024)]);
    assert_eq!(count_active_displays_with(&*platform), 2);
    for i in 0..count_active_displays_with(&*platform) {
        let bounds = display_bounds_with(&*platform, i);
        assert!(bounds.width > 0 && bounds.height > 0);
    }
    assert_eq!(display_bounds_with(&*platform, 1), Rect::new(-1280, 0, 1280, 1024));
    assert!(display_bounds_with(&*platform, 2).is_empty());
}

#[test]
fn test_capture_display() {
    let platform = FakePlatform::new(&[Rect::new(0, 0, 4, 4), Rect::new(4, 0, 3, 2)]);
    let frame = capture_display_with(&*platform, 1).unwrap();
    assert_eq!(frame.bounds(), Rect::new(4, 0, 3, 2));
    assert_eq!(frame.order(), ChannelOrder::Rgba);
    assert_eq!(frame.pixel(0, 0), Some(RGBA_PIXEL));
    assert_eq!(platform.canvases_alive(), 0);
}

#[test]
fn test_capture_missing_display() {
    let platform = FakePlatform::single(4, 4);
    assert!(matches!(
        capture_display_with(&*platform, 3),
        Err(CaptureError::InvalidDisplay { index: 3, available: 1 })
    ));
}

#[test]
fn test_capture_zero_size_display() {
    let platform = FakePlatform::new(&[Rect::new(0, 0, 0, 1080)]);
    assert_eq!(count_active_displays_with(&*platform), 1);
    assert!(matches!(
        capture_display_with(&*platform, 0),
        Err(CaptureError::GeometryResolution { display: 0 })
    ));
    assert_eq!(platform.canvases_created(), 0);
}

#[test]
fn test_capture_rect() {
    let platform = FakePlatform::single(100, 100);
    let frame = capture_rect_with(&*platform, Rect::new(10, 20, 5, 7)).unwrap();
    assert_eq!(frame.as_bytes().len(), 5 * 7 * 4);
    assert_eq!(frame.stride(), 20);
    assert_eq!(platform.canvases_created(), 1);
    assert_eq!(platform.canvases_alive(), 0);
}

#[test]
fn test_capture_empty_rect() {
    let platform = FakePlatform::single(100, 100);
    assert!(matches!(
        capture_rect_with(&*platform, Rect::new(0, 0, 0, 10)),
        Err(CaptureError::InvalidRegion { width: 0, height: 10 })
    ));
    assert_eq!(platform.canvases_created(), 0);
}

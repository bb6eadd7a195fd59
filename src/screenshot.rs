// screenshot.rs - One-Shot Capture Helpers
//
// Convenience wrappers for callers that want a single image and do not keep a
// session around. Each call allocates and frees its own GDI resources.

use log::debug;

use crate::backend::{BlitCanvas, BlitDevice, Platform};
use crate::error::{CaptureError, Result};
use crate::frame::{ChannelOrder, Frame};
use crate::geometry::{DisplayGeometryResolver, MonitorSource, Rect};
use crate::pixel;
use crate::platform;
use crate::session;

/// Number of displays attached to the desktop
pub fn count_active_displays() -> usize {
    count_active_displays_with(&*platform::system())
}

/// Desktop rectangle of display `index`, empty if it does not exist
pub fn display_bounds(index: usize) -> Rect {
    display_bounds_with(&*platform::system(), index)
}

/// Capture display `index` as RGBA
pub fn capture_display(index: usize) -> Result<Frame> {
    capture_display_with(&*platform::system(), index)
}

/// Capture an arbitrary rectangle of the virtual desktop as RGBA
pub fn capture_rect(rect: Rect) -> Result<Frame> {
    capture_rect_with(&*platform::system(), rect)
}

pub fn count_active_displays_with<S: MonitorSource + ?Sized>(source: &S) -> usize {
    DisplayGeometryResolver::new(source).count_active_displays()
}

pub fn display_bounds_with<S: MonitorSource + ?Sized>(source: &S, index: usize) -> Rect {
    DisplayGeometryResolver::new(source).display_bounds(index)
}

pub fn capture_display_with<P: Platform>(platform: &P, index: usize) -> Result<Frame> {
    let bounds = session::resolve_init_bounds(platform, index)?;
    capture_rect_with(platform, bounds)
}

pub fn capture_rect_with<P: Platform>(platform: &P, rect: Rect) -> Result<Frame> {
    if rect.is_empty() {
        return Err(CaptureError::InvalidRegion {
            width: rect.width,
            height: rect.height,
        });
    }

    debug!("One-shot capture of {:?}", rect);
    let mut canvas = platform.create_canvas(rect)?;
    canvas.blit()?;

    let mut data = canvas.pixels().to_vec();
    pixel::swap_channel_order(&mut data);
    Frame::new(rect, ChannelOrder::Rgba, data)
}

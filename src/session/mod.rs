// session/mod.rs - Capture Session Contract
//
// A session owns the backend resources for one display. Every capture re-checks the
// display's live bounds and, if they moved or changed size, transparently releases
// and re-initializes once before grabbing the frame.
//
// Lifecycle: new (uninitialized) -> init -> capture* -> release, and a released
// session can be initialized again.

mod blit;
mod duplication;

pub use blit::BlitCapture;
pub use duplication::DuplicationCapture;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{CaptureError, Result};
use crate::frame::Frame;
use crate::geometry::{DisplayGeometryResolver, MonitorSource, Rect};

/// Common contract of both capture backends
pub trait CaptureSession: Send {
    /// Bind the session to `display` and allocate backend resources
    fn init(&mut self, display: usize) -> Result<()>;

    /// Capture the whole display as RGBA
    fn capture(&mut self) -> Result<Frame>;

    /// Capture the whole display in the backend's native BGRA order
    fn capture_raw(&mut self) -> Result<Frame>;

    /// Free all backend resources. Safe to call repeatedly and in any state.
    fn release(&mut self);

    /// Display index passed to the last `init`
    fn display_id(&self) -> usize;

    /// Stable backend identifier
    fn capture_name(&self) -> &'static str;

    /// Cached display bounds, `None` while uninitialized or released
    fn bounds(&self) -> Option<Rect>;

    /// Shared handle to the cursor-draw flag
    fn cursor_switch(&self) -> CursorSwitch;

    /// Toggle cursor compositing for subsequent captures
    fn draw_cursor(&self, enabled: bool) {
        self.cursor_switch().set(enabled);
    }

    fn is_initialized(&self) -> bool {
        self.bounds().is_some()
    }
}

/// Cursor-draw flag that may be flipped from another thread while a capture runs.
///
/// A capture started after `set` returns sees the new value.
#[derive(Debug, Clone, Default)]
pub struct CursorSwitch(Arc<AtomicBool>);

impl CursorSwitch {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Resolve and validate the bounds `init` binds to
pub(crate) fn resolve_init_bounds<S: MonitorSource + ?Sized>(source: &S, display: usize) -> Result<Rect> {
    let resolver = DisplayGeometryResolver::new(source);
    let bounds = resolver.display_bounds(display);
    if !bounds.is_empty() {
        return Ok(bounds);
    }

    let available = resolver.count_active_displays();
    if display >= available {
        Err(CaptureError::InvalidDisplay {
            index: display,
            available,
        })
    } else {
        Err(CaptureError::GeometryResolution { display })
    }
}

/// Live bounds if they differ from `cached`
fn detect_drift<S: MonitorSource + ?Sized>(source: &S, display: usize, cached: Rect) -> Option<Rect> {
    let live = DisplayGeometryResolver::new(source).display_bounds(display);
    (live != cached).then_some(live)
}

fn reinit_failed(display: usize, source: CaptureError) -> CaptureError {
    CaptureError::Reinitialization {
        display,
        source: Box::new(source),
    }
}

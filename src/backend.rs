// backend.rs - Platform Capture Capabilities
//
// The two capture sessions are written against these traits rather than the OS
// directly. `platform::SystemPlatform` implements them with GDI and DXGI on
// Windows; tests implement them with in-memory fakes.

use crate::config::DuplicationOptions;
use crate::cursor::{CursorCanvas, CursorSource};
use crate::error::Result;
use crate::geometry::{MonitorSource, Rect};

/// Software blit capability: copy a desktop rectangle into CPU memory
pub trait BlitDevice {
    type Canvas: BlitCanvas;

    /// Allocate a device context, a compatible memory context and a bitmap sized to `bounds`.
    ///
    /// Partially created resources are released before an error is returned.
    fn create_canvas(&self, bounds: Rect) -> Result<Self::Canvas>;
}

/// Resources owned by one blit target; dropping it releases them
pub trait BlitCanvas: CursorCanvas + Send {
    /// Desktop rectangle this canvas copies
    fn bounds(&self) -> Rect;

    /// Copy the desktop rectangle into the canvas bitmap
    fn blit(&mut self) -> Result<()>;

    /// Pixels of the last blit, BGRA, exactly width * height * 4 bytes
    fn pixels(&self) -> &[u8];
}

/// Result of asking a duplicated output for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The destination buffer holds a complete frame
    Frame,
    /// The duplication was invalidated (mode change, secure desktop) and must be recreated
    AccessLost,
}

/// What the session asks of the hardware backend for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    /// Wait budget for a new surface
    pub timeout_ms: u32,
    /// Whether the pointer should be composited into the frame
    pub include_cursor: bool,
}

/// Hardware duplication capability
pub trait DuplicationDevice {
    type Output: DuplicatedOutput;

    /// Cheap check that desktop duplication can be used at all on this system
    fn probe_duplication(&self) -> Result<()>;

    /// Create a device, an immediate context and a duplication of the display at `display`
    fn duplicate_output(
        &self,
        display: usize,
        bounds: Rect,
        options: DuplicationOptions,
    ) -> Result<Self::Output>;
}

/// Resources of one duplicated display; dropping it releases them
pub trait DuplicatedOutput: Send {
    /// Copy the next desktop surface, BGRA, into `dst` (width * height * 4 bytes).
    ///
    /// The output composites the cursor itself when `request.include_cursor` is set.
    fn acquire_frame(&mut self, request: FrameRequest, dst: &mut [u8]) -> Result<AcquireOutcome>;
}

/// Everything a capture session needs from the OS
pub trait Platform:
    MonitorSource + CursorSource + BlitDevice + DuplicationDevice + Send + Sync + 'static
{
}

impl<T> Platform for T where
    T: MonitorSource + CursorSource + BlitDevice + DuplicationDevice + Send + Sync + 'static
{
}

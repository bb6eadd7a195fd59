// platform/unsupported.rs - Stub for non-Windows targets
//
// Screen capture is only implemented for Windows. This stub keeps the public API
// identical elsewhere: no displays are reported and every allocation fails with
// `CaptureError::Unsupported`.

use log::debug;

use crate::backend::{
    AcquireOutcome, BlitCanvas, BlitDevice, DuplicatedOutput, DuplicationDevice, FrameRequest,
};
use crate::config::DuplicationOptions;
use crate::cursor::{CursorCanvas, CursorIcon, CursorSource, CursorState};
use crate::error::{CaptureError, Result};
use crate::geometry::{MonitorInfo, MonitorSource, Rect};

pub struct SystemPlatform;

impl SystemPlatform {
    pub fn new() -> Self {
        debug!("Screen capture is not supported on this platform");
        Self
    }
}

impl Default for SystemPlatform {
    fn default() -> Self {
        Self::new()
    }
}

/// Never constructed; the stub cannot allocate a canvas
pub enum NoCanvas {}

/// Never constructed; the stub cannot duplicate an output
pub enum NoOutput {}

impl MonitorSource for SystemPlatform {
    fn monitors(&self) -> Vec<MonitorInfo> {
        Vec::new()
    }

    fn display_mode(&self, _device_name: &str) -> Option<Rect> {
        None
    }
}

impl CursorSource for SystemPlatform {
    fn query_cursor(&self) -> Option<CursorState> {
        None
    }
}

impl BlitDevice for SystemPlatform {
    type Canvas = NoCanvas;

    fn create_canvas(&self, _bounds: Rect) -> Result<NoCanvas> {
        Err(CaptureError::Unsupported { backend: "GDI" })
    }
}

impl DuplicationDevice for SystemPlatform {
    type Output = NoOutput;

    fn probe_duplication(&self) -> Result<()> {
        Err(CaptureError::Unsupported { backend: "DXGI" })
    }

    fn duplicate_output(
        &self,
        _display: usize,
        _bounds: Rect,
        _options: DuplicationOptions,
    ) -> Result<NoOutput> {
        Err(CaptureError::Unsupported { backend: "DXGI" })
    }
}

impl CursorCanvas for NoCanvas {
    fn draw_icon(&mut self, _icon: CursorIcon, _x: i32, _y: i32) -> bool {
        match *self {}
    }
}

impl BlitCanvas for NoCanvas {
    fn bounds(&self) -> Rect {
        match *self {}
    }

    fn blit(&mut self) -> Result<()> {
        match *self {}
    }

    fn pixels(&self) -> &[u8] {
        match *self {}
    }
}

impl DuplicatedOutput for NoOutput {
    fn acquire_frame(&mut self, _request: FrameRequest, _dst: &mut [u8]) -> Result<AcquireOutcome> {
        match *self {}
    }
}

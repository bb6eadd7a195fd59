// session/duplication.rs - DXGI Desktop Duplication Capture Session
//
// Hardware backend: the display's output is duplicated once at init and every
// capture asks it for the next surface. The backend composites the pointer itself,
// so the cursor flag is passed down as a hint instead of drawing an overlay here.

use std::sync::Arc;

use log::{info, warn};

use super::{detect_drift, reinit_failed, resolve_init_bounds, CaptureSession, CursorSwitch};
use crate::backend::{AcquireOutcome, DuplicatedOutput, DuplicationDevice, FrameRequest, Platform};
use crate::config::DuplicationOptions;
use crate::error::{CaptureError, Result};
use crate::frame::{ChannelOrder, Frame};
use crate::geometry::Rect;
use crate::pixel;
use crate::platform::SystemPlatform;

struct DuplicationState<O> {
    bounds: Rect,
    output: O,
}

pub struct DuplicationCapture<P: Platform = SystemPlatform> {
    platform: Arc<P>,
    options: DuplicationOptions,
    display: usize,
    state: Option<DuplicationState<<P as DuplicationDevice>::Output>>,
    cursor: CursorSwitch,
}

impl<P: Platform> DuplicationCapture<P> {
    pub const NAME: &'static str = "DXGI";

    /// Build the session without checking that duplication is available
    pub fn new(platform: Arc<P>, options: DuplicationOptions) -> Self {
        Self {
            platform,
            options,
            display: 0,
            state: None,
            cursor: CursorSwitch::default(),
        }
    }

    /// Build the session only if the system supports desktop duplication
    pub fn try_new(platform: Arc<P>, options: DuplicationOptions) -> Result<Self> {
        platform.probe_duplication()?;
        Ok(Self::new(platform, options))
    }

    fn reinit(&mut self) -> Result<()> {
        self.release();
        self.init(self.display)
            .map_err(|e| reinit_failed(self.display, e))
    }

    /// Returns whether a reinit happened
    fn heal_geometry(&mut self) -> Result<bool> {
        let cached = self
            .state
            .as_ref()
            .map(|state| state.bounds)
            .ok_or(CaptureError::NotInitialized)?;

        match detect_drift(&*self.platform, self.display, cached) {
            Some(live) => {
                warn!(
                    "Display {} geometry changed from {:?} to {:?}, reinitializing",
                    self.display, cached, live
                );
                self.reinit()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn grab(&mut self, order: ChannelOrder) -> Result<Frame> {
        let request = FrameRequest {
            timeout_ms: self.options.frame_timeout_ms,
            include_cursor: self.cursor.is_enabled(),
        };
        let mut reinitialized = self.heal_geometry()?;

        loop {
            let state = self.state.as_mut().ok_or(CaptureError::NotInitialized)?;
            let mut data = vec![0u8; state.bounds.buffer_len()];

            match state.output.acquire_frame(request, &mut data)? {
                AcquireOutcome::Frame => {
                    if order == ChannelOrder::Rgba {
                        pixel::swap_channel_order(&mut data);
                    }
                    return Frame::new(state.bounds, order, data);
                }
                AcquireOutcome::AccessLost if !reinitialized => {
                    warn!("Duplication of display {} lost access, reinitializing", self.display);
                    self.reinit()?;
                    reinitialized = true;
                }
                AcquireOutcome::AccessLost => {
                    return Err(CaptureError::acquisition(
                        Self::NAME,
                        "access to the duplicated output was lost again after reinitialization",
                    ));
                }
            }
        }
    }
}

impl<P: Platform> CaptureSession for DuplicationCapture<P> {
    fn init(&mut self, display: usize) -> Result<()> {
        self.release();
        self.display = display;

        let bounds = resolve_init_bounds(&*self.platform, display)?;
        let output = self.platform.duplicate_output(display, bounds, self.options)?;
        info!("DXGI capture initialized for display {} at {:?}", display, bounds);

        self.state = Some(DuplicationState { bounds, output });
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame> {
        self.grab(ChannelOrder::Rgba)
    }

    fn capture_raw(&mut self) -> Result<Frame> {
        self.grab(ChannelOrder::Bgra)
    }

    fn release(&mut self) {
        if self.state.take().is_some() {
            info!("DXGI capture released for display {}", self.display);
        }
    }

    fn display_id(&self) -> usize {
        self.display
    }

    fn capture_name(&self) -> &'static str {
        Self::NAME
    }

    fn bounds(&self) -> Option<Rect> {
        self.state.as_ref().map(|state| state.bounds)
    }

    fn cursor_switch(&self) -> CursorSwitch {
        self.cursor.clone()
    }
}

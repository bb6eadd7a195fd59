// session/blit.rs - GDI Blit Capture Session
//
// Software backend: the desktop rectangle of the display is copied into a bitmap
// owned by the session on every capture. Works everywhere GDI works, including
// remote sessions where desktop duplication is unavailable.

use std::sync::Arc;

use log::{info, warn};

use super::{detect_drift, reinit_failed, resolve_init_bounds, CaptureSession, CursorSwitch};
use crate::backend::{BlitCanvas, BlitDevice, Platform};
use crate::cursor::CursorOverlay;
use crate::error::{CaptureError, Result};
use crate::frame::{ChannelOrder, Frame};
use crate::geometry::Rect;
use crate::pixel;
use crate::platform::SystemPlatform;

pub struct BlitCapture<P: Platform = SystemPlatform> {
    platform: Arc<P>,
    display: usize,
    canvas: Option<<P as BlitDevice>::Canvas>,
    cursor: CursorSwitch,
}

impl<P: Platform> BlitCapture<P> {
    pub const NAME: &'static str = "GDI";

    pub fn new(platform: Arc<P>) -> Self {
        Self {
            platform,
            display: 0,
            canvas: None,
            cursor: CursorSwitch::default(),
        }
    }

    /// Release and re-init if the display geometry changed since the last init
    fn heal_geometry(&mut self) -> Result<()> {
        let cached = self
            .canvas
            .as_ref()
            .map(|canvas| canvas.bounds())
            .ok_or(CaptureError::NotInitialized)?;

        if let Some(live) = detect_drift(&*self.platform, self.display, cached) {
            warn!(
                "Display {} geometry changed from {:?} to {:?}, reinitializing",
                self.display, cached, live
            );
            self.release();
            self.init(self.display)
                .map_err(|e| reinit_failed(self.display, e))?;
        }
        Ok(())
    }

    fn grab(&mut self, order: ChannelOrder) -> Result<Frame> {
        self.heal_geometry()?;

        let draw_cursor = self.cursor.is_enabled();
        let canvas = self.canvas.as_mut().ok_or(CaptureError::NotInitialized)?;
        canvas.blit()?;

        let bounds = canvas.bounds();
        if draw_cursor {
            CursorOverlay::new(&*self.platform).overlay(canvas, (bounds.x, bounds.y));
        }

        let mut data = canvas.pixels().to_vec();
        if order == ChannelOrder::Rgba {
            pixel::swap_channel_order(&mut data);
        }
        Frame::new(bounds, order, data)
    }
}

impl<P: Platform> CaptureSession for BlitCapture<P> {
    fn init(&mut self, display: usize) -> Result<()> {
        self.release();
        self.display = display;

        let bounds = resolve_init_bounds(&*self.platform, display)?;
        let canvas = self.platform.create_canvas(bounds)?;
        info!("GDI capture initialized for display {} at {:?}", display, bounds);

        self.canvas = Some(canvas);
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame> {
        self.grab(ChannelOrder::Rgba)
    }

    fn capture_raw(&mut self) -> Result<Frame> {
        self.grab(ChannelOrder::Bgra)
    }

    fn release(&mut self) {
        if self.canvas.take().is_some() {
            info!("GDI capture released for display {}", self.display);
        }
    }

    fn display_id(&self) -> usize {
        self.display
    }

    fn capture_name(&self) -> &'static str {
        Self::NAME
    }

    fn bounds(&self) -> Option<Rect> {
        self.canvas.as_ref().map(|canvas| canvas.bounds())
    }

    fn cursor_switch(&self) -> CursorSwitch {
        self.cursor.clone()
    }
}

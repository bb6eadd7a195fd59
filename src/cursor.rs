// cursor.rs - Cursor Overlay
//
// The blit backend copies the desktop without the mouse pointer, so the cursor is
// queried from the OS on every capture and painted onto the capture target with
// the system icon. The duplication backend instead receives the pointer shape as
// pixel data and blends it into the CPU buffer itself (see `PointerShape`).

use log::trace;

/// Opaque OS cursor handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorIcon(pub isize);

impl CursorIcon {
    /// Shared handle of the standard system arrow
    pub const DEFAULT_ARROW: CursorIcon = CursorIcon(0x10005);

    pub fn is_default_arrow(&self) -> bool {
        *self == Self::DEFAULT_ARROW
    }
}

/// Registration-point correction applied when drawing the standard arrow
pub const DEFAULT_ARROW_OFFSET: (i32, i32) = (8, 9);

/// Cursor state at the time of one capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    /// Screen position in virtual desktop coordinates
    pub position: (i32, i32),
    pub visible: bool,
    pub icon: CursorIcon,
}

/// Something that can report the current cursor
pub trait CursorSource {
    /// Current cursor, or `None` if the OS query failed
    fn query_cursor(&self) -> Option<CursorState>;
}

/// A capture target the cursor icon can be painted onto
pub trait CursorCanvas {
    /// Paint `icon` with its top-left corner at (x, y) in target coordinates
    fn draw_icon(&mut self, icon: CursorIcon, x: i32, y: i32) -> bool;
}

/// Queries the OS cursor and composites it onto capture targets.
///
/// Best effort: the arrow correction is empirical and other cursor shapes are
/// drawn without any adjustment.
pub struct CursorOverlay<'a, S: CursorSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: CursorSource + ?Sized> CursorOverlay<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub fn query_cursor(&self) -> Option<CursorState> {
        self.source.query_cursor()
    }

    /// Draw `state` onto `canvas`, whose top-left pixel sits at `origin` on the desktop.
    ///
    /// Returns whether anything was drawn.
    pub fn composite<C: CursorCanvas + ?Sized>(
        &self,
        canvas: &mut C,
        state: &CursorState,
        origin: (i32, i32),
    ) -> bool {
        if !state.visible {
            return false;
        }

        let (x, y) = target_position(state, origin);
        trace!("Drawing cursor {:?} at ({}, {})", state.icon, x, y);
        canvas.draw_icon(state.icon, x, y)
    }

    /// Query the cursor and draw it in one step
    pub fn overlay<C: CursorCanvas + ?Sized>(&self, canvas: &mut C, origin: (i32, i32)) -> bool {
        match self.query_cursor() {
            Some(state) => self.composite(canvas, &state, origin),
            None => false,
        }
    }
}

/// Convert a screen position to target coordinates, applying the arrow correction
pub fn target_position(state: &CursorState, origin: (i32, i32)) -> (i32, i32) {
    let mut x = state.position.0 - origin.0;
    let mut y = state.position.1 - origin.1;
    if state.icon.is_default_arrow() {
        x -= DEFAULT_ARROW_OFFSET.0;
        y -= DEFAULT_ARROW_OFFSET.1;
    }
    (x, y)
}

/// Pointer shape encodings delivered by desktop duplication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerShapeKind {
    /// 1 bpp AND mask followed by 1 bpp XOR mask; `height` covers both masks
    Monochrome,
    /// 32 bpp BGRA with straight alpha
    Color,
    /// 32 bpp BGR; alpha 0 replaces the pixel, alpha 0xFF XORs it
    MaskedColor,
}

/// Pointer image as received from the duplication API
#[derive(Debug, Clone)]
pub struct PointerShape {
    pub kind: PointerShapeKind,
    pub width: u32,
    /// Rows of the buffer; for `Monochrome` this is twice the visible height
    pub height: u32,
    /// Bytes per row
    pub pitch: u32,
    pub data: Vec<u8>,
}

impl PointerShape {
    fn visible_height(&self) -> u32 {
        match self.kind {
            PointerShapeKind::Monochrome => self.height / 2,
            _ => self.height,
        }
    }

    /// Blend the shape into a packed BGRA frame with its top-left corner at (x, y).
    ///
    /// Parts falling outside the frame are clipped.
    pub fn blend_into(&self, frame: &mut [u8], frame_width: u32, frame_height: u32, x: i32, y: i32) {
        let stride = frame_width as usize * 4;
        if frame.len() < stride * frame_height as usize {
            return;
        }

        let height = self.visible_height();
        for row in 0..height {
            let dst_y = y + row as i32;
            if dst_y < 0 || dst_y >= frame_height as i32 {
                continue;
            }
            for col in 0..self.width {
                let dst_x = x + col as i32;
                if dst_x < 0 || dst_x >= frame_width as i32 {
                    continue;
                }
                let dst_idx = dst_y as usize * stride + dst_x as usize * 4;
                let Some(dst) = frame.get_mut(dst_idx..dst_idx + 4) else {
                    continue;
                };
                match self.kind {
                    PointerShapeKind::Color => self.blend_color(dst, row, col),
                    PointerShapeKind::MaskedColor => self.blend_masked(dst, row, col),
                    PointerShapeKind::Monochrome => self.blend_monochrome(dst, row, col, height),
                }
            }
        }
    }

    fn source_pixel(&self, row: u32, col: u32) -> Option<&[u8]> {
        let idx = row as usize * self.pitch as usize + col as usize * 4;
        self.data.get(idx..idx + 4)
    }

    fn blend_color(&self, dst: &mut [u8], row: u32, col: u32) {
        let Some(src) = self.source_pixel(row, col) else {
            return;
        };
        let alpha = src[3] as u32;
        let inv_alpha = 255 - alpha;
        for c in 0..3 {
            dst[c] = ((src[c] as u32 * alpha + dst[c] as u32 * inv_alpha) / 255) as u8;
        }
    }

    fn blend_masked(&self, dst: &mut [u8], row: u32, col: u32) {
        let Some(src) = self.source_pixel(row, col) else {
            return;
        };
        if src[3] == 0 {
            dst[..3].copy_from_slice(&src[..3]);
        } else {
            for c in 0..3 {
                dst[c] ^= src[c];
            }
        }
    }

    fn blend_monochrome(&self, dst: &mut [u8], row: u32, col: u32, height: u32) {
        let byte = col as usize / 8;
        let bit = 0x80u8 >> (col % 8);
        let and_idx = row as usize * self.pitch as usize + byte;
        let xor_idx = (row + height) as usize * self.pitch as usize + byte;
        let (Some(and_mask), Some(xor_mask)) = (self.data.get(and_idx), self.data.get(xor_idx)) else {
            return;
        };
        let and = if and_mask & bit != 0 { 0xFF } else { 0x00 };
        let xor = if xor_mask & bit != 0 { 0xFF } else { 0x00 };
        for c in dst.iter_mut().take(3) {
            *c = (*c & and) ^ xor;
        }
    }
}

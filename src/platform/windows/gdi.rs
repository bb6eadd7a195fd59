// platform/windows/gdi.rs - GDI Blit Canvas
//
// A canvas is the screen DC, a compatible memory DC and a top-down 32 bpp DIB
// section selected into it. BitBlt copies the desktop straight into the DIB
// memory, which is then read without any GetDIBits round trip.

use std::ffi::c_void;
use std::mem::size_of;
use std::ptr::null_mut;

use log::trace;
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, GdiFlush, GetDC,
    ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, CAPTUREBLT, DIB_RGB_COLORS,
    HBITMAP, HDC, HGDIOBJ, ROP_CODE, SRCCOPY,
};
use windows::Win32::UI::WindowsAndMessaging::{DrawIcon, HICON};

use super::SystemPlatform;
use crate::backend::{BlitCanvas, BlitDevice};
use crate::cursor::{CursorCanvas, CursorIcon};
use crate::error::{CaptureError, Result};
use crate::geometry::Rect;

pub struct GdiCanvas {
    bounds: Rect,
    screen_dc: HDC,
    mem_dc: HDC,
    bitmap: HBITMAP,
    previous: HGDIOBJ,
    bits: *mut u8,
}

// GDI handles are only touched through &mut self or on drop
unsafe impl Send for GdiCanvas {}

impl GdiCanvas {
    fn new(bounds: Rect) -> Result<Self> {
        // Filled step by step; Drop releases whatever was created if a step fails
        let mut canvas = Self {
            bounds,
            screen_dc: HDC::default(),
            mem_dc: HDC::default(),
            bitmap: HBITMAP::default(),
            previous: HGDIOBJ::default(),
            bits: null_mut(),
        };

        canvas.screen_dc = unsafe { GetDC(None) };
        if canvas.screen_dc.is_invalid() {
            return Err(CaptureError::allocation("GetDC", "returned a null device context"));
        }

        canvas.mem_dc = unsafe { CreateCompatibleDC(Some(canvas.screen_dc)) };
        if canvas.mem_dc.is_invalid() {
            return Err(CaptureError::allocation(
                "CreateCompatibleDC",
                "returned a null device context",
            ));
        }

        let bmi = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: bounds.width as i32,
                // Negative height: top-down rows
                biHeight: -(bounds.height as i32),
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };

        let mut bits: *mut c_void = null_mut();
        canvas.bitmap = unsafe {
            CreateDIBSection(Some(canvas.mem_dc), &bmi, DIB_RGB_COLORS, &mut bits, None, 0)
        }
        .map_err(|e| CaptureError::allocation("CreateDIBSection", e))?;
        if bits.is_null() {
            return Err(CaptureError::allocation(
                "CreateDIBSection",
                "returned a null pixel buffer",
            ));
        }
        canvas.bits = bits.cast();

        let previous = unsafe { SelectObject(canvas.mem_dc, canvas.bitmap.into()) };
        if previous.is_invalid() {
            return Err(CaptureError::allocation(
                "SelectObject",
                "could not select the bitmap into the memory context",
            ));
        }
        canvas.previous = previous;

        trace!("GDI canvas allocated for {:?}", bounds);
        Ok(canvas)
    }
}

impl BlitDevice for SystemPlatform {
    type Canvas = GdiCanvas;

    fn create_canvas(&self, bounds: Rect) -> Result<GdiCanvas> {
        GdiCanvas::new(bounds)
    }
}

impl BlitCanvas for GdiCanvas {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn blit(&mut self) -> Result<()> {
        unsafe {
            BitBlt(
                self.mem_dc,
                0,
                0,
                self.bounds.width as i32,
                self.bounds.height as i32,
                Some(self.screen_dc),
                self.bounds.x,
                self.bounds.y,
                // CAPTUREBLT includes layered windows
                ROP_CODE(SRCCOPY.0 | CAPTUREBLT.0),
            )
        }
        .map_err(|e| CaptureError::acquisition("GDI", format!("BitBlt failed: {e}")))?;

        // Make sure the DIB memory holds the finished blit before it is read
        let _ = unsafe { GdiFlush() };
        Ok(())
    }

    fn pixels(&self) -> &[u8] {
        // bits is non-null and sized to bounds for the whole life of the canvas
        unsafe { std::slice::from_raw_parts(self.bits, self.bounds.buffer_len()) }
    }
}

impl CursorCanvas for GdiCanvas {
    fn draw_icon(&mut self, icon: CursorIcon, x: i32, y: i32) -> bool {
        unsafe { DrawIcon(self.mem_dc, x, y, HICON(icon.0 as *mut c_void)) }.is_ok()
    }
}

impl Drop for GdiCanvas {
    fn drop(&mut self) {
        unsafe {
            if !self.previous.is_invalid() {
                SelectObject(self.mem_dc, self.previous);
            }
            if !self.bitmap.is_invalid() {
                let _ = DeleteObject(self.bitmap.into());
            }
            if !self.mem_dc.is_invalid() {
                let _ = DeleteDC(self.mem_dc);
            }
            if !self.screen_dc.is_invalid() {
                ReleaseDC(None, self.screen_dc);
            }
        }
        trace!("GDI canvas released for {:?}", self.bounds);
    }
}

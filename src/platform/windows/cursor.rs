// platform/windows/cursor.rs - Cursor Query

use std::mem::size_of;

use log::trace;
use windows::Win32::UI::WindowsAndMessaging::{GetCursorInfo, CURSORINFO, CURSOR_SHOWING};

use super::SystemPlatform;
use crate::cursor::{CursorIcon, CursorSource, CursorState};

impl CursorSource for SystemPlatform {
    fn query_cursor(&self) -> Option<CursorState> {
        let mut info = CURSORINFO {
            cbSize: size_of::<CURSORINFO>() as u32,
            ..Default::default()
        };

        if let Err(e) = unsafe { GetCursorInfo(&mut info) } {
            trace!("GetCursorInfo failed: {:?}", e);
            return None;
        }

        Some(CursorState {
            position: (info.ptScreenPos.x, info.ptScreenPos.y),
            visible: info.flags.0 & CURSOR_SHOWING.0 != 0,
            icon: CursorIcon(info.hCursor.0 as isize),
        })
    }
}

// platform/windows/monitor.rs - Monitor Enumeration
//
// EnumDisplayMonitors reports bounds in virtual desktop coordinates, which a
// DPI-unaware process sees scaled. The current display-settings record of the
// monitor's device holds the unscaled mode, so it is queried as well.

use std::mem::size_of;

use log::trace;
use windows::core::{BOOL, PCWSTR};
use windows::Win32::Foundation::{LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, EnumDisplaySettingsW, GetMonitorInfoW, DEVMODEW, ENUM_CURRENT_SETTINGS,
    HDC, HMONITOR, MONITORINFO, MONITORINFOEXW,
};

use super::SystemPlatform;
use crate::geometry::{MonitorInfo, MonitorSource, Rect};

unsafe extern "system" fn collect_monitor(
    monitor: HMONITOR,
    _hdc: HDC,
    rect: *mut RECT,
    data: LPARAM,
) -> BOOL {
    let monitors = &mut *(data.0 as *mut Vec<MonitorInfo>);
    let Some(rect) = rect.as_ref() else {
        return BOOL::from(true);
    };

    monitors.push(MonitorInfo {
        virtual_bounds: Rect::from_edges(rect.left, rect.top, rect.right, rect.bottom),
        device_name: device_name(monitor),
    });
    BOOL::from(true)
}

/// GDI device name of a monitor, e.g. `\\.\DISPLAY1`
fn device_name(monitor: HMONITOR) -> Option<String> {
    let mut info = MONITORINFOEXW {
        monitorInfo: MONITORINFO {
            cbSize: size_of::<MONITORINFOEXW>() as u32,
            ..Default::default()
        },
        ..Default::default()
    };

    if !unsafe { GetMonitorInfoW(monitor, (&mut info as *mut MONITORINFOEXW).cast()) }.as_bool() {
        return None;
    }
    Some(wide_to_string(&info.szDevice))
}

/// Decode a NUL-terminated UTF-16 buffer
pub(super) fn wide_to_string(wide: &[u16]) -> String {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    String::from_utf16_lossy(&wide[..len])
}

impl MonitorSource for SystemPlatform {
    fn monitors(&self) -> Vec<MonitorInfo> {
        let mut monitors: Vec<MonitorInfo> = Vec::new();
        let ok = unsafe {
            EnumDisplayMonitors(
                None,
                None,
                Some(collect_monitor),
                LPARAM(&mut monitors as *mut Vec<MonitorInfo> as isize),
            )
        };
        if !ok.as_bool() {
            trace!("EnumDisplayMonitors stopped early");
        }
        monitors
    }

    fn display_mode(&self, device_name: &str) -> Option<Rect> {
        let wide: Vec<u16> = device_name.encode_utf16().chain(std::iter::once(0)).collect();
        let mut mode = DEVMODEW {
            dmSize: size_of::<DEVMODEW>() as u16,
            ..Default::default()
        };

        let ok = unsafe {
            EnumDisplaySettingsW(PCWSTR(wide.as_ptr()), ENUM_CURRENT_SETTINGS, &mut mode)
        };
        if !ok.as_bool() {
            trace!("EnumDisplaySettingsW failed for {}", device_name);
            return None;
        }

        let position = unsafe { mode.Anonymous1.Anonymous2.dmPosition };
        Some(Rect::new(position.x, position.y, mode.dmPelsWidth, mode.dmPelsHeight))
    }
}

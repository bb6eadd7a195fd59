// platform/windows/mod.rs - Windows Platform Implementation
//
// Win32 GDI and DXGI bindings behind the capture traits:
//   monitor.rs - monitor enumeration and current display modes
//   cursor.rs  - cursor query
//   gdi.rs     - blit canvas (screen DC, memory DC, DIB section)
//   dxgi.rs    - desktop duplication output

mod cursor;
mod dxgi;
mod gdi;
mod monitor;

use log::debug;

/// Handle to the Windows desktop. Holds no state of its own; every resource is
/// owned by the canvas or output it was allocated for.
pub struct SystemPlatform;

impl SystemPlatform {
    pub fn new() -> Self {
        debug!("Using Win32 GDI/DXGI capture platform");
        Self
    }
}

impl Default for SystemPlatform {
    fn default() -> Self {
        Self::new()
    }
}

// platform/mod.rs - Platform Abstraction Layer
//
// The real implementation of the capture traits lives in `windows/`. Other
// targets get a stub that reports no displays and refuses to allocate, so the
// crate still builds and its tests run anywhere.
//
// `SystemPlatform` is created once per process and shared by every session and
// free function that does not bring its own platform.

use std::sync::Arc;

use lazy_static::lazy_static;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "windows")]
pub use self::windows::SystemPlatform;

#[cfg(not(target_os = "windows"))]
mod unsupported;

#[cfg(not(target_os = "windows"))]
pub use self::unsupported::SystemPlatform;

lazy_static! {
    static ref SYSTEM: Arc<SystemPlatform> = Arc::new(SystemPlatform::new());
}

/// Shared handle to the process-wide platform
pub fn system() -> Arc<SystemPlatform> {
    Arc::clone(&SYSTEM)
}

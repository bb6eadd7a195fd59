//! deskshot - Windows Desktop Screenshot Library
//!
//! Captures whole displays or desktop rectangles into CPU-side RGBA frames using
//! either GDI blits or DXGI desktop duplication, with an optional cursor overlay.
//!
//! ```no_run
//! use deskshot::{new_capture_session, CaptureProvider};
//!
//! let mut session = new_capture_session(CaptureProvider::Auto);
//! session.draw_cursor(true);
//! session.init(0)?;
//! let frame = session.capture()?;
//! println!("{} {}x{}", session.capture_name(), frame.width(), frame.height());
//! session.release();
//! # Ok::<(), deskshot::CaptureError>(())
//! ```

pub mod backend;
pub mod config;
pub mod cursor;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod pixel;
pub mod platform;
pub mod provider;
pub mod screenshot;
pub mod session;

// Re-export commonly used types
pub use config::{CaptureConfig, DuplicationOptions};
pub use cursor::{CursorOverlay, CursorState};
pub use error::{CaptureError, Result};
pub use frame::{ChannelOrder, Frame};
pub use geometry::{DisplayGeometryResolver, Rect};
pub use platform::SystemPlatform;
pub use provider::{new_capture_session, CaptureProvider, CaptureProviderFactory};
pub use screenshot::{capture_display, capture_rect, count_active_displays, display_bounds};
pub use session::{BlitCapture, CaptureSession, CursorSwitch, DuplicationCapture};

// error.rs - Capture Error Types
//
// Every fallible operation in the library returns `CaptureError`. OS failures are
// turned into a `reason` string at the FFI boundary so the public API looks the
// same on every target.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CaptureError>;

#[derive(Error, Debug)]
pub enum CaptureError {
    /// Display index is outside the enumerated monitors
    #[error("display {index} is invalid ({available} active displays)")]
    InvalidDisplay { index: usize, available: usize },

    /// A backend resource could not be created; `step` names the failing call
    #[error("resource allocation failed at {step}: {reason}")]
    ResourceAllocation { step: &'static str, reason: String },

    #[error("capture session is not initialized, call init first")]
    NotInitialized,

    /// Bounds for the display resolved to an empty rectangle
    #[error("could not resolve bounds of display {display}")]
    GeometryResolution { display: usize },

    /// Requested capture region has no area
    #[error("capture region {width}x{height} is empty")]
    InvalidRegion { width: u32, height: u32 },

    #[error("{backend} could not acquire a frame: {reason}")]
    FrameAcquisition { backend: &'static str, reason: String },

    /// Self-healing reinit after a geometry change failed
    #[error("reinitialization of display {display} failed")]
    Reinitialization {
        display: usize,
        #[source]
        source: Box<CaptureError>,
    },

    #[error("{backend} capture is not supported on this platform")]
    Unsupported { backend: &'static str },
}

impl CaptureError {
    pub fn allocation(step: &'static str, reason: impl ToString) -> Self {
        Self::ResourceAllocation {
            step,
            reason: reason.to_string(),
        }
    }

    pub fn acquisition(backend: &'static str, reason: impl ToString) -> Self {
        Self::FrameAcquisition {
            backend,
            reason: reason.to_string(),
        }
    }
}

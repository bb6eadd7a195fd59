// provider.rs - Capture Provider Factory
//
// Picks the backend a caller gets. `Auto` prefers desktop duplication and only
// falls back to GDI when the duplication session cannot be constructed at all;
// an `init` failure later on is reported to the caller as is.

use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::backend::Platform;
use crate::config::DuplicationOptions;
use crate::platform::{self, SystemPlatform};
use crate::session::{BlitCapture, CaptureSession, DuplicationCapture};

/// Backend preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureProvider {
    #[default]
    Auto,
    Blit,
    Duplication,
}

pub struct CaptureProviderFactory<P: Platform = SystemPlatform> {
    platform: Arc<P>,
    options: DuplicationOptions,
}

impl CaptureProviderFactory<SystemPlatform> {
    /// Factory bound to the process-wide system platform
    pub fn system() -> Self {
        Self::with_platform(platform::system())
    }
}

impl<P: Platform> CaptureProviderFactory<P> {
    pub fn with_platform(platform: Arc<P>) -> Self {
        Self {
            platform,
            options: DuplicationOptions::default(),
        }
    }

    /// Wait budget handed to duplication sessions this factory creates
    pub fn duplication_options(mut self, options: DuplicationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn create(&self, provider: CaptureProvider) -> Box<dyn CaptureSession> {
        match provider {
            CaptureProvider::Duplication => {
                Box::new(DuplicationCapture::new(Arc::clone(&self.platform), self.options))
            }
            CaptureProvider::Blit => Box::new(BlitCapture::new(Arc::clone(&self.platform))),
            CaptureProvider::Auto => {
                match DuplicationCapture::try_new(Arc::clone(&self.platform), self.options) {
                    Ok(session) => {
                        info!("Using DXGI desktop duplication");
                        Box::new(session)
                    }
                    Err(e) => {
                        warn!("Desktop duplication unavailable ({}), falling back to GDI", e);
                        Box::new(BlitCapture::new(Arc::clone(&self.platform)))
                    }
                }
            }
        }
    }
}

/// Create an uninitialized session on the system platform
pub fn new_capture_session(provider: CaptureProvider) -> Box<dyn CaptureSession> {
    CaptureProviderFactory::system().create(provider)
}

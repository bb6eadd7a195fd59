// config.rs - Capture Configuration
//
// Settings consumed by the session factory and the demo binary. The library
// never reads them on its own; callers load a file and pass the values in.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::provider::CaptureProvider;

/// Wait budget of the hardware duplication backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicationOptions {
    /// Timeout for each frame request; 0 returns immediately
    pub frame_timeout_ms: u32,
    /// Timeout used until the first surface of a fresh duplication arrives
    pub first_frame_timeout_ms: u32,
}

impl Default for DuplicationOptions {
    fn default() -> Self {
        Self {
            frame_timeout_ms: 0,
            first_frame_timeout_ms: 500,
        }
    }
}

/// Settings file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub provider: CaptureProvider,
    pub display: usize,
    pub draw_cursor: bool,
    pub frame_timeout_ms: u32,
    pub first_frame_timeout_ms: u32,
    /// Number of frames the demo captures
    pub frames: u32,
    /// Where the demo writes its PNG files
    pub output_dir: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        let duplication = DuplicationOptions::default();
        Self {
            provider: CaptureProvider::Auto,
            display: 0,
            draw_cursor: true,
            frame_timeout_ms: duplication.frame_timeout_ms,
            first_frame_timeout_ms: duplication.first_frame_timeout_ms,
            frames: 10,
            output_dir: PathBuf::from("."),
        }
    }
}

impl CaptureConfig {
    /// Default settings location: `<config dir>/deskshot/capture.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("deskshot")
            .join("capture.json")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse capture config")
    }

    /// Load settings from `path`, falling back to defaults if missing or unreadable
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("No config at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))
            .and_then(|contents| Self::from_json(&contents))
        {
            Ok(config) => {
                info!("Config loaded from {:?}", path);
                config
            }
            Err(e) => {
                error!("{:#}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize capture config")?;
        fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
        info!("Config saved to {:?}", path);
        Ok(())
    }

    pub fn duplication_options(&self) -> DuplicationOptions {
        DuplicationOptions {
            frame_timeout_ms: self.frame_timeout_ms,
            first_frame_timeout_ms: self.first_frame_timeout_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CaptureConfig::from_json(r#"{ "provider": "blit", "display": 1 }"#).unwrap();
        assert_eq!(config.provider, CaptureProvider::Blit);
        assert_eq!(config.display, 1);
        assert!(config.draw_cursor);
        assert_eq!(config.duplication_options(), DuplicationOptions::default());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(CaptureConfig::from_json(r#"{ "provider": "opengl" }"#).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("deskshot-config-{}", std::process::id()));
        let path = dir.join("capture.json");
        let config = CaptureConfig {
            provider: CaptureProvider::Duplication,
            frame_timeout_ms: 16,
            frames: 3,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(CaptureConfig::load(&path), config);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_or_malformed_file_gives_defaults() {
        let dir = std::env::temp_dir().join(format!("deskshot-bad-config-{}", std::process::id()));
        assert_eq!(CaptureConfig::load(&dir.join("missing.json")), CaptureConfig::default());

        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(CaptureConfig::load(&path), CaptureConfig::default());
        let _ = fs::remove_dir_all(&dir);
    }
}

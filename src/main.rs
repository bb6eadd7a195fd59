// main.rs - deskshot Demo
//
// Captures a handful of frames from one display and writes them as PNG files.
//
// Usage: deskshot [config.json]
// Without an argument the config is read from the user's config directory;
// missing settings fall back to defaults.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};

use deskshot::{pixel, CaptureConfig, CaptureProviderFactory, ChannelOrder};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(CaptureConfig::default_path);
    let config = CaptureConfig::load(&config_path);
    info!("deskshot starting with {:?}", config);

    let displays = deskshot::count_active_displays();
    for index in 0..displays {
        info!("Display {}: {:?}", index, deskshot::display_bounds(index));
    }

    let factory =
        CaptureProviderFactory::system().duplication_options(config.duplication_options());
    let mut session = factory.create(config.provider);
    session.draw_cursor(config.draw_cursor);
    session
        .init(config.display)
        .with_context(|| format!("Failed to initialize capture of display {}", config.display))?;
    info!("Capturing display {} with {}", session.display_id(), session.capture_name());

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {:?}", config.output_dir))?;

    let mut saved = 0;
    for i in 0..config.frames {
        let started = Instant::now();
        let frame = match session.capture_raw() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Frame {} failed: {:#}", i, anyhow::Error::from(e));
                continue;
            }
        };
        info!(
            "Frame {}: {}x{} in {:?}",
            i,
            frame.width(),
            frame.height(),
            started.elapsed()
        );

        // GDI leaves the alpha byte undefined
        let bounds = frame.bounds();
        let mut data = frame.into_bytes();
        pixel::fill_alpha(&mut data, 0xFF);
        let frame = deskshot::Frame::new(bounds, ChannelOrder::Bgra, data)?;

        let path = config.output_dir.join(format!("{}.png", i));
        frame
            .to_rgba_image()
            .context("Frame buffer does not match its bounds")?
            .save(&path)
            .with_context(|| format!("Failed to save {:?}", path))?;
        saved += 1;
    }

    session.release();
    info!("Saved {} of {} frames to {:?}", saved, config.frames, config.output_dir);
    Ok(())
}

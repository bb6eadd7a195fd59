// geometry.rs - Display Geometry Resolution
//
// Displays are addressed by their position in the monitor enumeration order.
// The bounds reported by enumeration may already be scaled by the OS DPI
// virtualization, so every lookup first asks the display's current mode for its
// real pixel size and only falls back to the enumerated rectangle when that fails.

use serde::{Deserialize, Serialize};

/// A rectangle in virtual desktop coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Build from left/top/right/bottom edges; inverted edges give an empty rect
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            x: left,
            y: top,
            width: right.saturating_sub(left).max(0) as u32,
            height: bottom.saturating_sub(top).max(0) as u32,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(i32::try_from(self.width).unwrap_or(i32::MAX))
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(i32::try_from(self.height).unwrap_or(i32::MAX))
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Size in bytes of a tightly packed 4-byte-per-pixel image of this rect
    pub fn buffer_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// One monitor as reported by enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    /// Bounds as reported by enumeration (possibly DPI-scaled)
    pub virtual_bounds: Rect,
    /// Display device name used to query the current mode, if it could be read
    pub device_name: Option<String>,
}

/// Source of monitor information, implemented by each platform
pub trait MonitorSource {
    /// All active monitors, in stable enumeration order
    fn monitors(&self) -> Vec<MonitorInfo>;

    /// Real position and pixel size from the device's current display settings
    fn display_mode(&self, device_name: &str) -> Option<Rect>;
}

/// Resolves display indices to their true pixel bounds
pub struct DisplayGeometryResolver<'a, S: MonitorSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: MonitorSource + ?Sized> DisplayGeometryResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub fn count_active_displays(&self) -> usize {
        self.source.monitors().len()
    }

    /// Bounds of the display at `index`.
    ///
    /// Returns an empty rectangle when the index is past the last monitor; callers
    /// treat a zero-area result as "no such display".
    pub fn display_bounds(&self, index: usize) -> Rect {
        match self.source.monitors().into_iter().nth(index) {
            Some(monitor) => self.resolve(&monitor),
            None => Rect::default(),
        }
    }

    fn resolve(&self, monitor: &MonitorInfo) -> Rect {
        let corrected = monitor
            .device_name
            .as_deref()
            .and_then(|name| self.source.display_mode(name))
            .filter(|rect| !rect.is_empty());

        match corrected {
            Some(rect) => rect,
            None => {
                log::debug!(
                    "No display mode for {:?}, using enumerated bounds {:?}",
                    monitor.device_name,
                    monitor.virtual_bounds
                );
                monitor.virtual_bounds
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StaticMonitors {
        monitors: Vec<MonitorInfo>,
        modes: HashMap<String, Rect>,
    }

    impl MonitorSource for StaticMonitors {
        fn monitors(&self) -> Vec<MonitorInfo> {
            self.monitors.clone()
        }

        fn display_mode(&self, device_name: &str) -> Option<Rect> {
            self.modes.get(device_name).copied()
        }
    }

    fn monitor(name: Option<&str>, bounds: Rect) -> MonitorInfo {
        MonitorInfo {
            virtual_bounds: bounds,
            device_name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_rect_from_edges() {
        assert_eq!(Rect::from_edges(-1920, 0, 0, 1080), Rect::new(-1920, 0, 1920, 1080));
        assert!(Rect::from_edges(10, 10, 5, 20).is_empty());
    }

    #[test]
    fn test_rect_contains_and_len() {
        let rect = Rect::new(10, 20, 4, 3);
        assert!(rect.contains(10, 20));
        assert!(rect.contains(13, 22));
        assert!(!rect.contains(14, 22));
        assert_eq!(rect.buffer_len(), 48);
    }

    #[test]
    fn test_oversized_rect_edges_saturate() {
        let rect = Rect::new(0, 0, u32::MAX, 1);
        assert_eq!(rect.right(), i32::MAX);
        assert!(rect.contains(0, 0));
        assert!(rect.contains(i32::MAX - 1, 0));
        assert!(!rect.contains(-1, 0));

        let shifted = Rect::new(-10, 0, u32::MAX, 1);
        assert_eq!(shifted.right(), i32::MAX - 10);
        assert!(shifted.contains(-10, 0));
    }

    #[test]
    fn test_corrected_bounds_take_precedence() {
        // 150% scaling: enumeration reports 1280x720, real mode is 1920x1080
        let source = StaticMonitors {
            monitors: vec![monitor(Some("\\\\.\\DISPLAY1"), Rect::new(0, 0, 1280, 720))],
            modes: HashMap::from([("\\\\.\\DISPLAY1".to_string(), Rect::new(0, 0, 1920, 1080))]),
        };
        let resolver = DisplayGeometryResolver::new(&source);
        assert_eq!(resolver.display_bounds(0), Rect::new(0, 0, 1920, 1080));
    }

    #[test]
    fn test_falls_back_to_virtual_bounds() {
        let source = StaticMonitors {
            monitors: vec![
                monitor(None, Rect::new(0, 0, 1920, 1080)),
                monitor(Some("\\\\.\\DISPLAY2"), Rect::new(1920, 0, 2560, 1440)),
            ],
            modes: HashMap::new(),
        };
        let resolver = DisplayGeometryResolver::new(&source);
        assert_eq!(resolver.count_active_displays(), 2);
        assert_eq!(resolver.display_bounds(0), Rect::new(0, 0, 1920, 1080));
        assert_eq!(resolver.display_bounds(1), Rect::new(1920, 0, 2560, 1440));
    }

    #[test]
    fn test_empty_mode_is_ignored() {
        let source = StaticMonitors {
            monitors: vec![monitor(Some("A"), Rect::new(0, 0, 800, 600))],
            modes: HashMap::from([("A".to_string(), Rect::new(0, 0, 0, 0))]),
        };
        let resolver = DisplayGeometryResolver::new(&source);
        assert_eq!(resolver.display_bounds(0), Rect::new(0, 0, 800, 600));
    }

    #[test]
    fn test_out_of_range_index_is_empty() {
        let source = StaticMonitors {
            monitors: vec![monitor(None, Rect::new(0, 0, 800, 600))],
            modes: HashMap::new(),
        };
        let resolver = DisplayGeometryResolver::new(&source);
        assert!(resolver.display_bounds(1).is_empty());
        assert!(resolver.display_bounds(usize::MAX).is_empty());
    }
}

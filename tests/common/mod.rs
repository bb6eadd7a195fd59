// tests/common/mod.rs - In-memory platform for session tests
//
// Pixels produced by both fake backends are BGRA [1, 2, 3, 4]. The duplication
// fake marks the first pixel [9, 9, 9, 255] when asked to include the cursor.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use deskshot::backend::{
    AcquireOutcome, BlitCanvas, BlitDevice, DuplicatedOutput, DuplicationDevice, FrameRequest,
};
use deskshot::cursor::{CursorCanvas, CursorIcon, CursorSource, CursorState};
use deskshot::geometry::{MonitorInfo, MonitorSource};
use deskshot::{CaptureError, DuplicationOptions, Rect};

pub const RAW_PIXEL: [u8; 4] = [1, 2, 3, 4];
pub const RGBA_PIXEL: [u8; 4] = [3, 2, 1, 4];
pub const CURSOR_PIXEL: [u8; 4] = [9, 9, 9, 255];

#[derive(Default)]
struct State {
    monitors: Vec<Rect>,
    duplication_supported: bool,
    fail_allocations: bool,
    cursor: Option<CursorState>,
    access_lost: u32,
    cursor_draws: Vec<(CursorIcon, i32, i32)>,
    requests: Vec<FrameRequest>,
    duplicated: Vec<(usize, DuplicationOptions)>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    canvases_created: AtomicUsize,
    canvases_alive: AtomicUsize,
    outputs_created: AtomicUsize,
    outputs_alive: AtomicUsize,
}

impl Shared {
    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

pub struct FakePlatform {
    shared: Arc<Shared>,
}

impl FakePlatform {
    pub fn new(monitors: &[Rect]) -> Arc<Self> {
        let platform = Self {
            shared: Arc::new(Shared::default()),
        };
        {
            let mut state = platform.shared.state();
            state.monitors = monitors.to_vec();
            state.duplication_supported = true;
        }
        Arc::new(platform)
    }

    pub fn single(width: u32, height: u32) -> Arc<Self> {
        Self::new(&[Rect::new(0, 0, width, height)])
    }

    pub fn set_monitors(&self, monitors: &[Rect]) {
        self.shared.state().monitors = monitors.to_vec();
    }

    pub fn set_duplication_supported(&self, supported: bool) {
        self.shared.state().duplication_supported = supported;
    }

    pub fn set_fail_allocations(&self, fail: bool) {
        self.shared.state().fail_allocations = fail;
    }

    pub fn set_cursor(&self, cursor: Option<CursorState>) {
        self.shared.state().cursor = cursor;
    }

    /// The next `count` frame requests report lost access
    pub fn lose_access(&self, count: u32) {
        self.shared.state().access_lost = count;
    }

    pub fn cursor_draws(&self) -> Vec<(CursorIcon, i32, i32)> {
        self.shared.state().cursor_draws.clone()
    }

    pub fn requests(&self) -> Vec<FrameRequest> {
        self.shared.state().requests.clone()
    }

    pub fn duplicated(&self) -> Vec<(usize, DuplicationOptions)> {
        self.shared.state().duplicated.clone()
    }

    pub fn canvases_created(&self) -> usize {
        self.shared.canvases_created.load(Ordering::SeqCst)
    }

    pub fn canvases_alive(&self) -> usize {
        self.shared.canvases_alive.load(Ordering::SeqCst)
    }

    pub fn outputs_created(&self) -> usize {
        self.shared.outputs_created.load(Ordering::SeqCst)
    }

    pub fn outputs_alive(&self) -> usize {
        self.shared.outputs_alive.load(Ordering::SeqCst)
    }
}

fn fill(dst: &mut [u8]) {
    for px in dst.chunks_exact_mut(4) {
        px.copy_from_slice(&RAW_PIXEL);
    }
}

impl MonitorSource for FakePlatform {
    fn monitors(&self) -> Vec<MonitorInfo> {
        self.shared
            .state()
            .monitors
            .iter()
            .map(|&virtual_bounds| MonitorInfo {
                virtual_bounds,
                device_name: None,
            })
            .collect()
    }

    fn display_mode(&self, _device_name: &str) -> Option<Rect> {
        None
    }
}

impl CursorSource for FakePlatform {
    fn query_cursor(&self) -> Option<CursorState> {
        self.shared.state().cursor
    }
}

pub struct FakeCanvas {
    bounds: Rect,
    pixels: Vec<u8>,
    shared: Arc<Shared>,
}

impl BlitDevice for FakePlatform {
    type Canvas = FakeCanvas;

    fn create_canvas(&self, bounds: Rect) -> deskshot::Result<FakeCanvas> {
        if self.shared.state().fail_allocations {
            return Err(CaptureError::allocation("CreateDIBSection", "injected failure"));
        }
        self.shared.canvases_created.fetch_add(1, Ordering::SeqCst);
        self.shared.canvases_alive.fetch_add(1, Ordering::SeqCst);
        Ok(FakeCanvas {
            bounds,
            pixels: vec![0; bounds.buffer_len()],
            shared: Arc::clone(&self.shared),
        })
    }
}

impl BlitCanvas for FakeCanvas {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn blit(&mut self) -> deskshot::Result<()> {
        fill(&mut self.pixels);
        Ok(())
    }

    fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl CursorCanvas for FakeCanvas {
    fn draw_icon(&mut self, icon: CursorIcon, x: i32, y: i32) -> bool {
        self.shared.state().cursor_draws.push((icon, x, y));
        true
    }
}

impl Drop for FakeCanvas {
    fn drop(&mut self) {
        self.shared.canvases_alive.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct FakeOutput {
    bounds: Rect,
    shared: Arc<Shared>,
}

impl DuplicationDevice for FakePlatform {
    type Output = FakeOutput;

    fn probe_duplication(&self) -> deskshot::Result<()> {
        if self.shared.state().duplication_supported {
            Ok(())
        } else {
            Err(CaptureError::allocation("CreateDXGIFactory1", "no adapter"))
        }
    }

    fn duplicate_output(
        &self,
        display: usize,
        bounds: Rect,
        options: DuplicationOptions,
    ) -> deskshot::Result<FakeOutput> {
        {
            let mut state = self.shared.state();
            if state.fail_allocations {
                return Err(CaptureError::allocation("DuplicateOutput", "injected failure"));
            }
            state.duplicated.push((display, options));
        }
        self.shared.outputs_created.fetch_add(1, Ordering::SeqCst);
        self.shared.outputs_alive.fetch_add(1, Ordering::SeqCst);
        Ok(FakeOutput {
            bounds,
            shared: Arc::clone(&self.shared),
        })
    }
}

impl DuplicatedOutput for FakeOutput {
    fn acquire_frame(
        &mut self,
        request: FrameRequest,
        dst: &mut [u8],
    ) -> deskshot::Result<AcquireOutcome> {
        let mut state = self.shared.state();
        state.requests.push(request);
        if state.access_lost > 0 {
            state.access_lost -= 1;
            return Ok(AcquireOutcome::AccessLost);
        }

        assert_eq!(dst.len(), self.bounds.buffer_len());
        fill(dst);
        if request.include_cursor {
            dst[..4].copy_from_slice(&CURSOR_PIXEL);
        }
        Ok(AcquireOutcome::Frame)
    }
}

impl Drop for FakeOutput {
    fn drop(&mut self) {
        self.shared.outputs_alive.fetch_sub(1, Ordering::SeqCst);
    }
}

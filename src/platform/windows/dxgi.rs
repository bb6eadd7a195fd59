// platform/windows/dxgi.rs - DXGI Desktop Duplication Output
//
// One duplicated output per capture session: a D3D11 device created on the
// adapter that drives the display, its immediate context, the output
// duplication and a CPU-readable staging texture reused across frames.

use std::ffi::c_void;

use log::{debug, info, trace};
use windows::core::Interface;
use windows::Win32::Foundation::HMODULE;
use windows::Win32::Graphics::Direct3D::D3D_DRIVER_TYPE_UNKNOWN;
use windows::Win32::Graphics::Direct3D11::{
    D3D11CreateDevice, ID3D11Device, ID3D11DeviceContext, ID3D11Texture2D, D3D11_CPU_ACCESS_READ,
    D3D11_CREATE_DEVICE_BGRA_SUPPORT, D3D11_MAPPED_SUBRESOURCE, D3D11_MAP_READ, D3D11_SDK_VERSION,
    D3D11_TEXTURE2D_DESC, D3D11_USAGE_STAGING,
};
use windows::Win32::Graphics::Dxgi::{
    CreateDXGIFactory1, IDXGIAdapter, IDXGIAdapter1, IDXGIFactory1, IDXGIOutput, IDXGIOutput1,
    IDXGIOutputDuplication, IDXGIResource, DXGI_ERROR_ACCESS_LOST, DXGI_ERROR_WAIT_TIMEOUT,
    DXGI_OUTDUPL_FRAME_INFO, DXGI_OUTDUPL_POINTER_SHAPE_INFO,
    DXGI_OUTDUPL_POINTER_SHAPE_TYPE_COLOR, DXGI_OUTDUPL_POINTER_SHAPE_TYPE_MASKED_COLOR,
    DXGI_OUTDUPL_POINTER_SHAPE_TYPE_MONOCHROME,
};

use super::monitor::wide_to_string;
use super::SystemPlatform;
use crate::backend::{AcquireOutcome, DuplicatedOutput, DuplicationDevice, FrameRequest};
use crate::config::DuplicationOptions;
use crate::cursor::{PointerShape, PointerShapeKind};
use crate::error::{CaptureError, Result};
use crate::geometry::{MonitorSource, Rect};

const BACKEND: &str = "DXGI";

/// Last pointer state reported by the duplication
#[derive(Default)]
struct PointerState {
    position: (i32, i32),
    visible: bool,
    shape: Option<PointerShape>,
}

pub struct DxgiOutput {
    // Field order is drop order: duplication before the device it was created on
    duplication: IDXGIOutputDuplication,
    staging: Option<ID3D11Texture2D>,
    context: ID3D11DeviceContext,
    device: ID3D11Device,
    bounds: Rect,
    options: DuplicationOptions,
    has_frame: bool,
    pointer: PointerState,
}

// COM pointers are only used through &mut self from the owning session
unsafe impl Send for DxgiOutput {}

fn factory() -> Result<IDXGIFactory1> {
    unsafe { CreateDXGIFactory1() }.map_err(|e| CaptureError::allocation("CreateDXGIFactory1", e))
}

/// Desktop-attached outputs of every adapter, in enumeration order
fn attached_outputs(factory: &IDXGIFactory1) -> Vec<(IDXGIAdapter1, IDXGIOutput, String)> {
    let mut outputs = Vec::new();
    let mut adapter_index = 0;
    while let Ok(adapter) = unsafe { factory.EnumAdapters1(adapter_index) } {
        let mut output_index = 0;
        while let Ok(output) = unsafe { adapter.EnumOutputs(output_index) } {
            if let Ok(desc) = unsafe { output.GetDesc() } {
                if desc.AttachedToDesktop.as_bool() {
                    outputs.push((adapter.clone(), output, wide_to_string(&desc.DeviceName)));
                }
            }
            output_index += 1;
        }
        adapter_index += 1;
    }
    outputs
}

/// Find the output showing `display`, by GDI device name first and ordinal second
fn find_output(
    display: usize,
    device_name: Option<&str>,
) -> Result<(IDXGIAdapter1, IDXGIOutput)> {
    let mut outputs = attached_outputs(&factory()?);

    let by_name = device_name.and_then(|name| outputs.iter().position(|(_, _, n)| n == name));
    let index = by_name.unwrap_or(display);
    if by_name.is_none() {
        debug!("No DXGI output named {:?}, using ordinal {}", device_name, display);
    }

    if index >= outputs.len() {
        return Err(CaptureError::allocation(
            "EnumOutputs",
            format!("no desktop output for display {display}"),
        ));
    }
    let (adapter, output, _) = outputs.swap_remove(index);
    Ok((adapter, output))
}

fn create_device(adapter: &IDXGIAdapter1) -> Result<(ID3D11Device, ID3D11DeviceContext)> {
    let adapter: IDXGIAdapter = adapter
        .cast()
        .map_err(|e| CaptureError::allocation("D3D11CreateDevice", e))?;

    let mut device = None;
    let mut context = None;
    unsafe {
        D3D11CreateDevice(
            &adapter,
            D3D_DRIVER_TYPE_UNKNOWN,
            HMODULE::default(),
            D3D11_CREATE_DEVICE_BGRA_SUPPORT,
            None,
            D3D11_SDK_VERSION,
            Some(&mut device),
            None,
            Some(&mut context),
        )
    }
    .map_err(|e| CaptureError::allocation("D3D11CreateDevice", e))?;

    match (device, context) {
        (Some(device), Some(context)) => Ok((device, context)),
        _ => Err(CaptureError::allocation(
            "D3D11CreateDevice",
            "returned a null device or context",
        )),
    }
}

impl DuplicationDevice for SystemPlatform {
    type Output = DxgiOutput;

    fn probe_duplication(&self) -> Result<()> {
        let factory = factory()?;
        let adapter = unsafe { factory.EnumAdapters1(0) }
            .map_err(|e| CaptureError::allocation("EnumAdapters1", e))?;
        let output = unsafe { adapter.EnumOutputs(0) }
            .map_err(|e| CaptureError::allocation("EnumOutputs", e))?;
        output
            .cast::<IDXGIOutput1>()
            .map(|_| ())
            .map_err(|e| CaptureError::allocation("IDXGIOutput1", e))
    }

    fn duplicate_output(
        &self,
        display: usize,
        bounds: Rect,
        options: DuplicationOptions,
    ) -> Result<DxgiOutput> {
        let device_name = self
            .monitors()
            .into_iter()
            .nth(display)
            .and_then(|monitor| monitor.device_name);

        let (adapter, output) = find_output(display, device_name.as_deref())?;
        let (device, context) = create_device(&adapter)?;

        let output1: IDXGIOutput1 = output
            .cast()
            .map_err(|e| CaptureError::allocation("IDXGIOutput1", e))?;
        let duplication = unsafe { output1.DuplicateOutput(&device) }
            .map_err(|e| CaptureError::allocation("DuplicateOutput", e))?;

        info!("Duplicating output {:?} for display {}", device_name, display);
        Ok(DxgiOutput {
            duplication,
            staging: None,
            context,
            device,
            bounds,
            options,
            has_frame: false,
            pointer: PointerState::default(),
        })
    }
}

impl DxgiOutput {
    fn acquisition_error(reason: impl ToString) -> CaptureError {
        CaptureError::acquisition(BACKEND, reason)
    }

    /// Copy the acquired surface into the staging texture
    fn copy_to_staging(&mut self, resource: Option<IDXGIResource>) -> Result<()> {
        let texture: ID3D11Texture2D = resource
            .ok_or_else(|| Self::acquisition_error("AcquireNextFrame returned no surface"))?
            .cast()
            .map_err(Self::acquisition_error)?;

        let mut desc = D3D11_TEXTURE2D_DESC::default();
        unsafe { texture.GetDesc(&mut desc) };
        if desc.Width != self.bounds.width || desc.Height != self.bounds.height {
            return Err(Self::acquisition_error(format!(
                "surface is {}x{} but display bounds are {}x{}",
                desc.Width, desc.Height, self.bounds.width, self.bounds.height
            )));
        }

        if self.staging.is_none() {
            let staging_desc = D3D11_TEXTURE2D_DESC {
                MipLevels: 1,
                ArraySize: 1,
                Usage: D3D11_USAGE_STAGING,
                BindFlags: 0,
                CPUAccessFlags: D3D11_CPU_ACCESS_READ.0 as u32,
                MiscFlags: 0,
                ..desc
            };
            let mut staging = None;
            unsafe { self.device.CreateTexture2D(&staging_desc, None, Some(&mut staging)) }
                .map_err(|e| Self::acquisition_error(format!("CreateTexture2D failed: {e}")))?;
            self.staging = staging;
        }

        let staging = self
            .staging
            .as_ref()
            .ok_or_else(|| Self::acquisition_error("staging texture missing"))?;
        unsafe { self.context.CopyResource(staging, &texture) };
        Ok(())
    }

    /// Copy the staging texture into `dst`, dropping row padding
    fn read_staging(&self, dst: &mut [u8]) -> Result<()> {
        let staging = self
            .staging
            .as_ref()
            .ok_or_else(|| Self::acquisition_error("no frame has been acquired yet"))?;

        let row_bytes = self.bounds.width as usize * 4;
        let height = self.bounds.height as usize;
        if dst.len() < row_bytes * height {
            return Err(Self::acquisition_error("destination buffer too small"));
        }

        let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
        unsafe { self.context.Map(staging, 0, D3D11_MAP_READ, 0, Some(&mut mapped)) }
            .map_err(|e| Self::acquisition_error(format!("Map failed: {e}")))?;

        let stride = mapped.RowPitch as usize;
        unsafe {
            let src_ptr = mapped.pData as *const u8;
            for row in 0..height {
                let src_row = src_ptr.add(row * stride);
                let dst_row = dst.as_mut_ptr().add(row * row_bytes);
                std::ptr::copy_nonoverlapping(src_row, dst_row, row_bytes);
            }
            self.context.Unmap(staging, 0);
        }
        Ok(())
    }

    fn update_pointer(&mut self, info: &DXGI_OUTDUPL_FRAME_INFO) {
        if info.LastMouseUpdateTime != 0 {
            self.pointer.visible = info.PointerPosition.Visible.as_bool();
            self.pointer.position = (
                info.PointerPosition.Position.x,
                info.PointerPosition.Position.y,
            );
        }

        if info.PointerShapeBufferSize == 0 {
            return;
        }

        let mut buffer = vec![0u8; info.PointerShapeBufferSize as usize];
        let mut required = 0u32;
        let mut shape_info = DXGI_OUTDUPL_POINTER_SHAPE_INFO::default();
        let fetched = unsafe {
            self.duplication.GetFramePointerShape(
                buffer.len() as u32,
                buffer.as_mut_ptr() as *mut c_void,
                &mut required,
                &mut shape_info,
            )
        };
        if let Err(e) = fetched {
            trace!("GetFramePointerShape failed: {:?}", e);
            return;
        }

        let kind = match shape_info.Type {
            t if t == DXGI_OUTDUPL_POINTER_SHAPE_TYPE_COLOR.0 as u32 => PointerShapeKind::Color,
            t if t == DXGI_OUTDUPL_POINTER_SHAPE_TYPE_MASKED_COLOR.0 as u32 => {
                PointerShapeKind::MaskedColor
            }
            t if t == DXGI_OUTDUPL_POINTER_SHAPE_TYPE_MONOCHROME.0 as u32 => {
                PointerShapeKind::Monochrome
            }
            other => {
                trace!("Unknown pointer shape type {}", other);
                return;
            }
        };

        self.pointer.shape = Some(PointerShape {
            kind,
            width: shape_info.Width,
            height: shape_info.Height,
            pitch: shape_info.Pitch,
            data: buffer,
        });
    }

    fn composite_pointer(&self, dst: &mut [u8]) {
        if !self.pointer.visible {
            return;
        }
        if let Some(shape) = &self.pointer.shape {
            let (x, y) = self.pointer.position;
            shape.blend_into(dst, self.bounds.width, self.bounds.height, x, y);
        }
    }

    fn finish(&self, request: FrameRequest, dst: &mut [u8]) -> Result<AcquireOutcome> {
        self.read_staging(dst)?;
        if request.include_cursor {
            self.composite_pointer(dst);
        }
        Ok(AcquireOutcome::Frame)
    }
}

impl DuplicatedOutput for DxgiOutput {
    fn acquire_frame(&mut self, request: FrameRequest, dst: &mut [u8]) -> Result<AcquireOutcome> {
        // A fresh duplication has nothing cached, so give the first surface time to arrive
        let timeout = if self.has_frame {
            request.timeout_ms
        } else {
            request.timeout_ms.max(self.options.first_frame_timeout_ms)
        };

        let mut info = DXGI_OUTDUPL_FRAME_INFO::default();
        let mut resource: Option<IDXGIResource> = None;
        if let Err(e) = unsafe { self.duplication.AcquireNextFrame(timeout, &mut info, &mut resource) }
        {
            let code = e.code();
            if code == DXGI_ERROR_ACCESS_LOST {
                self.staging = None;
                self.has_frame = false;
                return Ok(AcquireOutcome::AccessLost);
            }
            if code == DXGI_ERROR_WAIT_TIMEOUT {
                if self.has_frame {
                    trace!("Desktop unchanged, reusing last frame");
                    return self.finish(request, dst);
                }
                return Err(Self::acquisition_error(format!(
                    "no desktop frame within {timeout} ms"
                )));
            }
            return Err(Self::acquisition_error(format!("AcquireNextFrame failed: {e}")));
        }

        let copied = self.copy_to_staging(resource);
        self.update_pointer(&info);
        let _ = unsafe { self.duplication.ReleaseFrame() };
        copied?;

        self.has_frame = true;
        self.finish(request, dst)
    }
}

impl Drop for DxgiOutput {
    fn drop(&mut self) {
        trace!("DXGI output released for {:?}", self.bounds);
    }
}

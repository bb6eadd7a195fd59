// frame.rs - Captured Frame
//
// An owned, immutable, tightly packed 4-byte-per-pixel image of one display.

use crate::error::{CaptureError, Result};
use crate::geometry::Rect;
use crate::pixel;

/// Byte order of each pixel in a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Normalized public order
    Rgba,
    /// Native order of both Windows backends
    Bgra,
}

/// A captured frame containing pixel data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bounds: Rect,
    order: ChannelOrder,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap `data` as a frame of `bounds`; the length must be exactly width * height * 4
    pub fn new(bounds: Rect, order: ChannelOrder, data: Vec<u8>) -> Result<Self> {
        if data.len() != bounds.buffer_len() {
            return Err(CaptureError::acquisition(
                "frame",
                format!(
                    "buffer of {} bytes does not match {}x{}",
                    data.len(),
                    bounds.width,
                    bounds.height
                ),
            ));
        }
        Ok(Self { bounds, order, data })
    }

    pub fn width(&self) -> u32 {
        self.bounds.width
    }

    pub fn height(&self) -> u32 {
        self.bounds.height
    }

    /// Desktop rectangle this frame was captured from
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    /// Bytes per row; rows are never padded
    pub fn stride(&self) -> usize {
        self.bounds.width as usize * 4
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// The four bytes of the pixel at (x, y), in this frame's channel order
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.bounds.width || y >= self.bounds.height {
            return None;
        }
        let offset = y as usize * self.stride() + x as usize * 4;
        let bytes = &self.data[offset..offset + 4];
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Convert to an `image` buffer, swapping channels if the frame is raw BGRA.
    ///
    /// `None` only if the buffer does not match the bounds, which `Frame::new` rules out.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        let mut data = self.data.clone();
        if self.order == ChannelOrder::Bgra {
            pixel::swap_channel_order(&mut data);
        }
        image::RgbaImage::from_raw(self.bounds.width, self.bounds.height, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_length() {
        let err = Frame::new(Rect::new(0, 0, 2, 2), ChannelOrder::Rgba, vec![0; 15]).unwrap_err();
        assert!(matches!(err, CaptureError::FrameAcquisition { .. }));
    }

    #[test]
    fn test_pixel_lookup() {
        let data: Vec<u8> = (0..24).collect();
        let frame = Frame::new(Rect::new(100, 50, 3, 2), ChannelOrder::Rgba, data).unwrap();
        assert_eq!(frame.stride(), 12);
        assert_eq!(frame.pixel(0, 0), Some([0, 1, 2, 3]));
        assert_eq!(frame.pixel(2, 1), Some([20, 21, 22, 23]));
        assert_eq!(frame.pixel(3, 0), None);
        assert_eq!(frame.bounds().x, 100);
    }

    #[test]
    fn test_bgra_frame_converts_to_rgba_image() {
        let frame = Frame::new(Rect::new(0, 0, 1, 1), ChannelOrder::Bgra, vec![10, 20, 30, 255]).unwrap();
        let image = frame.to_rgba_image().unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [30, 20, 10, 255]);
    }

    #[test]
    fn test_rgba_image_keeps_dimensions() {
        let frame = Frame::new(Rect::new(-5, 7, 3, 2), ChannelOrder::Rgba, vec![1; 24]).unwrap();
        let image = frame.to_rgba_image().unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [1, 1, 1, 1]);
    }
}

//! Color and depth storage for software rendering

use glam::Vec4;

/// Convert a [0,1] channel to a byte (clamp, scale, truncate)
pub(crate) fn channel_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// Framebuffer written by the fragment stage.
///
/// Pixels are RGBA, 4 bytes per pixel; depth is one f32 per pixel. Both
/// planes are sized `width * height` and must not be resized while a draw
/// is in flight.
pub struct FrameBuffer {
    pub pixels: Vec<u8>,
    pub depth: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            depth: vec![f32::MAX; width * height],
            width,
            height,
        }
    }

    /// Fill the pixel plane with a single color, alpha included.
    pub fn clear_color(&mut self, color: Vec4) {
        let rgba = [
            channel_to_byte(color.x),
            channel_to_byte(color.y),
            channel_to_byte(color.z),
            channel_to_byte(color.w),
        ];
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }

    /// Fill the depth plane with a single value.
    pub fn clear_depth(&mut self, depth: f32) {
        self.depth.fill(depth);
    }
}

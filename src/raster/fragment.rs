//! Fragment stage: depth test, pixel-stage invocation, blending and the
//! output merge into the pixel buffer

use glam::Vec4;

use crate::context::PipelineOptions;
use crate::framebuffer::{channel_to_byte, FrameBuffer};
use crate::shader::Shader;

/// Per-draw fragment state shared by both fill strategies.
pub(crate) struct FragmentPipe<'a> {
    shader: &'a dyn Shader,
    constants: &'a [f32],
    scratch: &'a mut [f32],
    enable_blend: bool,
    depth_test: bool,
    depth_write: bool,
}

impl<'a> FragmentPipe<'a> {
    pub fn new(
        shader: &'a dyn Shader,
        options: &PipelineOptions,
        constants: &'a [f32],
        scratch: &'a mut [f32],
    ) -> Self {
        Self {
            shader,
            constants,
            scratch,
            enable_blend: options.enable_blend,
            depth_test: options.depth_test,
            depth_write: options.depth_write,
        }
    }

    /// Process one covered pixel. `interpolate` populates the varying
    /// scratch block and only runs once the depth test has passed.
    ///
    /// Equal depths pass the test. A discarded fragment leaves both the
    /// pixel and depth planes untouched; alpha is never written.
    pub fn emit(
        &mut self,
        fb: &mut FrameBuffer,
        index: usize,
        depth: f32,
        interpolate: impl FnOnce(&mut [f32]),
    ) {
        if self.depth_test && depth > fb.depth[index] {
            return;
        }

        interpolate(self.scratch);

        let Some(color) = self.shader.pixel(self.scratch, self.constants) else {
            return;
        };
        let color = color.clamp(Vec4::ZERO, Vec4::ONE);

        let base = index * 4;
        let rgb = if self.enable_blend {
            // out = src * src_alpha + dst * (1 - src_alpha)
            let alpha = color.w;
            let dst = [
                f32::from(fb.pixels[base]) / 255.0,
                f32::from(fb.pixels[base + 1]) / 255.0,
                f32::from(fb.pixels[base + 2]) / 255.0,
            ];
            [
                color.x * alpha + dst[0] * (1.0 - alpha),
                color.y * alpha + dst[1] * (1.0 - alpha),
                color.z * alpha + dst[2] * (1.0 - alpha),
            ]
        } else {
            [color.x, color.y, color.z]
        };

        fb.pixels[base] = channel_to_byte(rgb[0]);
        fb.pixels[base + 1] = channel_to_byte(rgb[1]);
        fb.pixels[base + 2] = channel_to_byte(rgb[2]);

        if self.depth_write {
            fb.depth[index] = depth;
        }
    }
}

//! Projection-to-pixel path: perspective division, back-face culling,
//! viewport mapping and the two triangle fill strategies

mod barycentric;
mod fragment;
mod scanline;
mod setup;

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::context::{PipelineContext, PipelineOptions};
use crate::framebuffer::FrameBuffer;
use crate::shader::Shader;
use fragment::FragmentPipe;

/// Triangle fill strategy, selectable per draw configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RasterStrategy {
    /// Edge-walking scanline fill over trapezoids. Depth and varyings are
    /// interpolated linearly in screen space; kept as the legacy fast path.
    Scanline,
    /// Bounding-box fill with barycentric coverage testing and
    /// perspective-correct varying interpolation.
    #[default]
    Barycentric,
}

/// Run the vertex stage over the context's three attribute blocks, then
/// rasterize the resulting triangle into `fb`.
pub fn draw(fb: &mut FrameBuffer, context: &mut PipelineContext) {
    let PipelineContext {
        shader,
        options,
        attributes,
        vertex_varyings,
        fragment_varyings,
        constants,
    } = context;

    let mut clip = [Vec4::ZERO; 3];
    for i in 0..3 {
        clip[i] = shader.vertex(&attributes[i], constants, &mut vertex_varyings[i]);
    }
    let varyings = [
        &vertex_varyings[0][..],
        &vertex_varyings[1][..],
        &vertex_varyings[2][..],
    ];

    rasterize(
        fb,
        &**shader,
        options,
        constants,
        fragment_varyings,
        &clip,
        varyings,
    );
}

/// Rasterize one triangle from clip-space positions and per-vertex varying
/// blocks, skipping the vertex stage.
///
/// Each varying block must be as long as the context's declared varying
/// block. Produces only framebuffer side effects; degenerate triangles
/// fill zero pixels.
pub fn draw_triangle(
    fb: &mut FrameBuffer,
    context: &mut PipelineContext,
    clip: &[Vec4; 3],
    varyings: [&[f32]; 3],
) {
    let PipelineContext {
        shader,
        options,
        fragment_varyings,
        constants,
        ..
    } = context;

    rasterize(
        fb,
        &**shader,
        options,
        constants,
        fragment_varyings,
        clip,
        varyings,
    );
}

fn rasterize(
    fb: &mut FrameBuffer,
    shader: &dyn Shader,
    options: &PipelineOptions,
    constants: &[f32],
    scratch: &mut [f32],
    clip: &[Vec4; 3],
    varyings: [&[f32]; 3],
) {
    for block in &varyings {
        debug_assert_eq!(block.len(), scratch.len(), "varying block size mismatch");
    }

    // Perspective division
    let mut ndc = [Vec3::ZERO; 3];
    for i in 0..3 {
        ndc[i] = clip[i].truncate() / clip[i].w;
    }

    if !options.two_sided && is_back_facing(&ndc) {
        return;
    }

    // Clip-space w reciprocals for perspective-correct interpolation,
    // taken before viewport mapping.
    let inv_w = [1.0 / clip[0].w, 1.0 / clip[1].w, 1.0 / clip[2].w];

    // Viewport mapping; depth stays the NDC z.
    let mut screen = [Vec2::ZERO; 3];
    let mut depth = [0.0f32; 3];
    for i in 0..3 {
        screen[i] = viewport_transform(fb.width, fb.height, ndc[i]);
        depth[i] = ndc[i].z;
    }

    let mut pipe = FragmentPipe::new(shader, options, constants, scratch);
    match options.strategy {
        RasterStrategy::Scanline => scanline::fill(fb, &mut pipe, &screen, &depth, &varyings),
        RasterStrategy::Barycentric => {
            barycentric::fill(fb, &mut pipe, &screen, &depth, &varyings, &inv_w)
        }
    }
}

/// Map NDC x/y from [-1, 1] to pixel coordinates, y growing downward.
fn viewport_transform(width: usize, height: usize, ndc: Vec3) -> Vec2 {
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * width as f32,
        (1.0 - ndc.y) * 0.5 * height as f32,
    )
}

/// Signed-area facing test in NDC; counter-clockwise triangles face the
/// camera. `two_sided` draw configurations skip this test entirely.
fn is_back_facing(ndc: &[Vec3; 3]) -> bool {
    let ab = ndc[1] - ndc[0];
    let ac = ndc[2] - ndc[0];
    ab.x * ac.y - ab.y * ac.x < 0.0
}

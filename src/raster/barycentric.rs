//! Bounding-box fill with barycentric coverage testing, the default
//! strategy. Varyings are interpolated perspective-correctly using the
//! clip-space w reciprocals.

use glam::{Vec2, Vec3};

use super::fragment::FragmentPipe;
use super::setup;
use crate::framebuffer::FrameBuffer;

pub(crate) fn fill(
    fb: &mut FrameBuffer,
    pipe: &mut FragmentPipe,
    screen: &[Vec2; 3],
    depth: &[f32; 3],
    varyings: &[&[f32]; 3],
    inv_w: &[f32; 3],
) {
    let bounds = setup::bounding_box(screen, fb.width, fb.height);

    for y in bounds.min_y..bounds.max_y {
        for x in bounds.min_x..bounds.max_x {
            let point = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let weights = setup::barycentric_weights(screen, point);
            // Strictly positive weights only: a shared edge is never drawn
            // by both neighbors, but its pixels may be dropped by both.
            if !(weights.x > 0.0 && weights.y > 0.0 && weights.z > 0.0) {
                continue;
            }
            let index = y as usize * fb.width + x as usize;
            let z = depth[0] * weights.x + depth[1] * weights.y + depth[2] * weights.z;
            pipe.emit(fb, index, z, |scratch| {
                interpolate_varyings(varyings, scratch, weights, inv_w);
            });
        }
    }
}

/// Each vertex contributes its barycentric weight scaled by its clip-space
/// 1/w, normalized by the weighted reciprocal sum.
fn interpolate_varyings(src: &[&[f32]; 3], dst: &mut [f32], weights: Vec3, inv_w: &[f32; 3]) {
    let w0 = inv_w[0] * weights.x;
    let w1 = inv_w[1] * weights.y;
    let w2 = inv_w[2] * weights.z;
    let normalizer = 1.0 / (w0 + w1 + w2);
    for i in 0..dst.len() {
        dst[i] = (src[0][i] * w0 + src[1][i] * w1 + src[2][i] * w2) * normalizer;
    }
}

//! Edge-walking scanline fill, the legacy strategy. Depth and varyings are
//! interpolated linearly in screen space: along each side edge, then across
//! the span.

use glam::Vec2;

use super::fragment::FragmentPipe;
use super::setup::{self, Trapezoid};
use crate::framebuffer::FrameBuffer;

pub(crate) fn fill(
    fb: &mut FrameBuffer,
    pipe: &mut FragmentPipe,
    screen: &[Vec2; 3],
    depth: &[f32; 3],
    varyings: &[&[f32]; 3],
) {
    for trapezoid in setup::make_trapezoids(screen, depth, varyings) {
        fill_trapezoid(fb, pipe, &trapezoid);
    }
}

fn fill_trapezoid(fb: &mut FrameBuffer, pipe: &mut FragmentPipe, trapezoid: &Trapezoid) {
    let min_y = ((trapezoid.top + 0.5).floor() as i32).max(0);
    let max_y = ((trapezoid.bottom - 0.5).ceil() as i32).min(fb.height as i32);

    // A zero-height edge makes these steps infinite. Setup rejects the
    // fully degenerate triangles before we get here; near-degenerate ones
    // walk an empty span.
    let step_y_left = 1.0 / (trapezoid.left.p1.y - trapezoid.left.p0.y);
    let step_y_right = 1.0 / (trapezoid.right.p1.y - trapezoid.right.p0.y);

    for y in min_y..max_y {
        let fy = y as f32 + 0.5;
        let ty_left = (fy - trapezoid.left.p0.y) * step_y_left;
        let ty_right = (fy - trapezoid.right.p0.y) * step_y_right;
        let x_left = lerp(trapezoid.left.p0.x, trapezoid.left.p1.x, ty_left);
        let x_right = lerp(trapezoid.right.p0.x, trapezoid.right.p1.x, ty_right);
        let min_x = ((x_left + 0.5).floor() as i32).max(0);
        let max_x = ((x_right - 0.5).ceil() as i32).min(fb.width as i32);

        let step_x = 1.0 / (x_right - x_left);
        for x in min_x..max_x {
            let fx = x as f32 + 0.5;
            let tx = (fx - x_left) * step_x;
            let index = y as usize * fb.width + x as usize;
            let z = interpolate_depth(trapezoid, tx, ty_left, ty_right);
            pipe.emit(fb, index, z, |scratch| {
                interpolate_varyings(trapezoid, scratch, tx, ty_left, ty_right);
            });
        }
    }
}

fn interpolate_depth(trapezoid: &Trapezoid, tx: f32, ty_left: f32, ty_right: f32) -> f32 {
    let left = lerp(trapezoid.left.z0, trapezoid.left.z1, ty_left);
    let right = lerp(trapezoid.right.z0, trapezoid.right.z1, ty_right);
    lerp(left, right, tx)
}

fn interpolate_varyings(
    trapezoid: &Trapezoid,
    dst: &mut [f32],
    tx: f32,
    ty_left: f32,
    ty_right: f32,
) {
    for i in 0..dst.len() {
        let left = lerp(trapezoid.left.v0[i], trapezoid.left.v1[i], ty_left);
        let right = lerp(trapezoid.right.v0[i], trapezoid.right.v1[i], ty_right);
        dst[i] = lerp(left, right, tx);
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

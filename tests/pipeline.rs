//! End-to-end pipeline tests: geometry in clip space, pixels out.

use std::mem::size_of;

use softpipe::glam::Vec4;
use softpipe::shader::{FlatAttributes, FlatConstants, FlatShader, FlatVaryings};
use softpipe::{
    draw, draw_triangle, FrameBuffer, PipelineContext, PipelineOptions, RasterStrategy, Shader,
};

const SIZE: usize = 200;
const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];

fn flat_options() -> PipelineOptions {
    PipelineOptions::new(
        size_of::<FlatAttributes>(),
        size_of::<FlatVaryings>(),
        size_of::<FlatConstants>(),
    )
}

fn flat_context(options: PipelineOptions) -> PipelineContext {
    PipelineContext::new(Box::new(FlatShader), options).unwrap()
}

/// Clip position whose screen projection lands at pixel (x, y) of a
/// SIZE x SIZE framebuffer, with the given NDC depth and clip w.
fn clip_at(x: f32, y: f32, z: f32, w: f32) -> Vec4 {
    let half = SIZE as f32 / 2.0;
    let ndc_x = x / half - 1.0;
    let ndc_y = 1.0 - y / half;
    Vec4::new(ndc_x * w, ndc_y * w, z * w, w)
}

/// The triangle from the end-to-end property: screen vertices (100,10),
/// (10,190), (190,190), counter-clockwise, at the given NDC depth.
fn wide_triangle(z: f32) -> [Vec4; 3] {
    [
        clip_at(100.0, 10.0, z, 1.0),
        clip_at(10.0, 190.0, z, 1.0),
        clip_at(190.0, 190.0, z, 1.0),
    ]
}

fn draw_solid(
    fb: &mut FrameBuffer,
    context: &mut PipelineContext,
    clip: &[Vec4; 3],
    color: [f32; 4],
) {
    let block: &[f32] = &color;
    draw_triangle(fb, context, clip, [block, block, block]);
}

fn pixel(fb: &FrameBuffer, x: usize, y: usize) -> [u8; 3] {
    let base = (y * fb.width + x) * 4;
    [fb.pixels[base], fb.pixels[base + 1], fb.pixels[base + 2]]
}

/// Pure red, allowing one bit of rounding from the perspective-correct
/// normalization.
fn assert_red(p: [u8; 3]) {
    assert!(p[0] >= 254 && p[1] == 0 && p[2] == 0, "expected red, got {p:?}");
}

fn count_red(fb: &FrameBuffer) -> usize {
    fb.pixels
        .chunks_exact(4)
        .filter(|p| p[0] > 200 && p[1] < 50 && p[2] < 50)
        .count()
}

#[test]
fn degenerate_triangles_fill_zero_pixels() {
    for strategy in [RasterStrategy::Scanline, RasterStrategy::Barycentric] {
        let mut options = flat_options();
        options.strategy = strategy;
        options.two_sided = true;
        let mut context = flat_context(options);
        let mut fb = FrameBuffer::new(SIZE, SIZE);

        // All three x equal.
        let vertical = [
            clip_at(50.0, 10.0, 0.0, 1.0),
            clip_at(50.0, 100.0, 0.0, 1.0),
            clip_at(50.0, 180.0, 0.0, 1.0),
        ];
        draw_solid(&mut fb, &mut context, &vertical, RED);

        // All three y equal.
        let horizontal = [
            clip_at(10.0, 70.0, 0.0, 1.0),
            clip_at(100.0, 70.0, 0.0, 1.0),
            clip_at(180.0, 70.0, 0.0, 1.0),
        ];
        draw_solid(&mut fb, &mut context, &horizontal, RED);

        assert!(
            fb.pixels.iter().all(|&b| b == 0),
            "{strategy:?} wrote pixels for degenerate input"
        );
    }
}

#[test]
fn strategies_cover_the_same_interior() {
    let mut covered = Vec::new();
    for strategy in [RasterStrategy::Scanline, RasterStrategy::Barycentric] {
        let mut options = flat_options();
        options.strategy = strategy;
        let mut context = flat_context(options);
        let mut fb = FrameBuffer::new(SIZE, SIZE);
        draw_solid(&mut fb, &mut context, &wide_triangle(0.0), RED);
        covered.push(
            fb.pixels
                .chunks_exact(4)
                .map(|p| p[0] > 200)
                .collect::<Vec<_>>(),
        );
    }

    let both: usize = covered[0].iter().filter(|&&c| c).count();
    assert!(both > 15_000);
    let disagreements = covered[0]
        .iter()
        .zip(&covered[1])
        .filter(|(a, b)| a != b)
        .count();
    // Only edge-inclusion boundaries may differ.
    assert!(
        disagreements < 800,
        "strategies disagree on {disagreements} pixels"
    );
}

#[test]
fn constant_varying_is_constant_under_mixed_w() {
    let mut context = flat_context(flat_options());
    let mut fb = FrameBuffer::new(SIZE, SIZE);

    // Equal NDC geometry, wildly different clip-space w per vertex.
    let clip = [
        clip_at(100.0, 20.0, 0.0, 1.0),
        clip_at(20.0, 180.0, 0.0, 4.0),
        clip_at(180.0, 180.0, 0.0, 0.25),
    ];
    draw_solid(&mut fb, &mut context, &clip, RED);

    let mut checked = 0usize;
    for p in fb.pixels.chunks_exact(4) {
        if p[0] == 0 && p[1] == 0 && p[2] == 0 {
            continue;
        }
        // Perspective-correct normalization cancels the w variation; one
        // bit of rounding in the byte conversion is allowed.
        assert!(p[0] >= 254, "red channel drifted to {}", p[0]);
        assert_eq!(p[1], 0);
        assert_eq!(p[2], 0);
        checked += 1;
    }
    assert!(checked > 10_000);
}

#[test]
fn depth_test_keeps_near_triangle_in_both_orders() {
    for strategy in [RasterStrategy::Scanline, RasterStrategy::Barycentric] {
        let mut options = flat_options();
        options.strategy = strategy;

        for near_first in [true, false] {
            let mut context = flat_context(options);
            let mut fb = FrameBuffer::new(SIZE, SIZE);
            fb.clear_depth(f32::MAX);

            let near = wide_triangle(-0.5);
            let far = wide_triangle(0.5);
            if near_first {
                draw_solid(&mut fb, &mut context, &near, RED);
                draw_solid(&mut fb, &mut context, &far, GREEN);
            } else {
                draw_solid(&mut fb, &mut context, &far, GREEN);
                draw_solid(&mut fb, &mut context, &near, RED);
            }

            let p = pixel(&fb, 100, 100);
            assert!(
                p[0] >= 254 && p[1] == 0 && p[2] == 0,
                "{strategy:?} near_first={near_first}: got {p:?}"
            );
        }
    }
}

#[test]
fn depth_write_off_lets_later_fragments_repass() {
    let mut options = flat_options();
    options.depth_write = false;
    let mut context = flat_context(options);
    let mut fb = FrameBuffer::new(SIZE, SIZE);

    draw_solid(&mut fb, &mut context, &wide_triangle(-0.5), RED);
    draw_solid(&mut fb, &mut context, &wide_triangle(0.5), GREEN);

    // Without the depth write the far triangle still passes against the
    // cleared depth plane and overdraws the near one.
    let p = pixel(&fb, 100, 100);
    assert!(p[0] == 0 && p[1] >= 254 && p[2] == 0, "expected green, got {p:?}");
}

#[test]
fn blending_follows_source_alpha() {
    let half_red = [1.0, 0.0, 0.0, 0.5];

    let mut blended = flat_options();
    blended.enable_blend = true;
    let mut context = flat_context(blended);
    let mut fb = FrameBuffer::new(SIZE, SIZE);
    fb.clear_color(Vec4::new(0.0, 0.0, 0.0, 1.0));
    draw_solid(&mut fb, &mut context, &wide_triangle(0.0), half_red);
    assert_eq!(pixel(&fb, 100, 100), [127, 0, 0]);

    let mut context = flat_context(flat_options());
    let mut fb = FrameBuffer::new(SIZE, SIZE);
    fb.clear_color(Vec4::new(0.0, 0.0, 0.0, 1.0));
    draw_solid(&mut fb, &mut context, &wide_triangle(0.0), half_red);
    assert_red(pixel(&fb, 100, 100));
}

#[test]
fn covered_area_matches_triangle_geometry() {
    let mut context = flat_context(flat_options());
    let mut fb = FrameBuffer::new(SIZE, SIZE);
    draw_solid(&mut fb, &mut context, &wide_triangle(0.0), RED);

    assert_red(pixel(&fb, 100, 100));
    assert_eq!(pixel(&fb, 5, 5), [0, 0, 0]);

    // Geometric area of the (100,10)-(10,190)-(190,190) triangle.
    let expected = 16_200.0f64;
    let covered = count_red(&fb) as f64;
    let deviation = (covered - expected).abs() / expected;
    assert!(
        deviation < 0.01,
        "covered {covered} pixels, expected about {expected}"
    );
}

#[test]
fn back_faces_cull_unless_two_sided() {
    let reversed = {
        let t = wide_triangle(0.0);
        [t[0], t[2], t[1]]
    };

    let mut context = flat_context(flat_options());
    let mut fb = FrameBuffer::new(SIZE, SIZE);
    draw_solid(&mut fb, &mut context, &reversed, RED);
    assert_eq!(count_red(&fb), 0);

    let mut options = flat_options();
    options.two_sided = true;
    let mut context = flat_context(options);
    draw_solid(&mut fb, &mut context, &reversed, RED);
    assert!(count_red(&fb) > 15_000);
}

#[test]
fn full_pipeline_draw_runs_vertex_stage() {
    let mut context = flat_context(flat_options());
    let mut fb = FrameBuffer::new(SIZE, SIZE);

    context.set_constants(&FlatConstants::identity());
    let positions = [[0.0, 0.9, 0.0], [-0.9, -0.9, 0.0], [0.9, -0.9, 0.0]];
    for (i, position) in positions.iter().enumerate() {
        context.set_attributes(
            i,
            &FlatAttributes {
                position: *position,
                color: RED,
            },
        );
    }
    draw(&mut fb, &mut context);

    assert_red(pixel(&fb, 100, 100));
    assert!(count_red(&fb) > 10_000);
}

struct DiscardAll;

impl Shader for DiscardAll {
    fn vertex(&self, _: &[f32], _: &[f32], _: &mut [f32]) -> Vec4 {
        Vec4::ZERO
    }

    fn pixel(&self, _: &[f32], _: &[f32]) -> Option<Vec4> {
        None
    }
}

#[test]
fn discarded_fragments_leave_both_planes_untouched() {
    let options = PipelineOptions::new(4, 4, 4);
    let mut context = PipelineContext::new(Box::new(DiscardAll), options).unwrap();
    let mut fb = FrameBuffer::new(SIZE, SIZE);

    let block: &[f32] = &[0.0];
    draw_triangle(
        &mut fb,
        &mut context,
        &wide_triangle(0.0),
        [block, block, block],
    );

    assert!(fb.pixels.iter().all(|&b| b == 0));
    assert!(fb.depth.iter().all(|&d| d == f32::MAX));
}

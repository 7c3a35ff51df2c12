//! Demo host for the softpipe rasterizer
//!
//! Renders a small animated scene through the flat shader and blits the
//! pixel buffer to a macroquad window each frame. Keys: 1/2 select the
//! fill strategy, B toggles blending, T toggles two-sided drawing, P
//! writes a PNG capture.

use std::mem::size_of;

use macroquad::prelude::{
    clear_background, draw_text, draw_texture_ex, get_time, is_key_pressed, next_frame,
    screen_height, screen_width, vec2, Color, Conf, DrawTextureParams, KeyCode, Texture2D, WHITE,
};

use softpipe::glam::{Mat4, Vec3, Vec4};
use softpipe::shader::{FlatAttributes, FlatConstants, FlatShader, FlatVaryings};
use softpipe::{draw, FrameBuffer, PipelineContext, PipelineOptions, RasterStrategy, VERSION};

const WIDTH: usize = 800;
const HEIGHT: usize = 600;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("softpipe v{}", VERSION),
        window_width: WIDTH as i32,
        window_height: HEIGHT as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn flat_options() -> PipelineOptions {
    PipelineOptions::new(
        size_of::<FlatAttributes>(),
        size_of::<FlatVaryings>(),
        size_of::<FlatConstants>(),
    )
}

/// Load draw options from assets/demo.ron, falling back to defaults.
/// Block sizes always follow the flat shader's records.
fn load_options() -> PipelineOptions {
    let mut options = match std::fs::read_to_string("assets/demo.ron") {
        Ok(text) => match ron::from_str::<PipelineOptions>(&text) {
            Ok(options) => options,
            Err(e) => {
                log::warn!("assets/demo.ron: {}", e);
                flat_options()
            }
        },
        Err(_) => flat_options(),
    };
    options.attribute_bytes = size_of::<FlatAttributes>();
    options.varying_bytes = size_of::<FlatVaryings>();
    options.constant_bytes = size_of::<FlatConstants>();
    options
}

struct Triangle {
    vertices: [FlatAttributes; 3],
    /// Rotation speed around the y axis, radians per second.
    spin: f32,
}

fn vertex(x: f32, y: f32, z: f32, color: [f32; 4]) -> FlatAttributes {
    FlatAttributes {
        position: [x, y, z],
        color,
    }
}

fn scene() -> Vec<Triangle> {
    vec![
        // Static backdrop triangle, furthest from the camera.
        Triangle {
            vertices: [
                vertex(-0.9, 0.7, -0.5, [0.9, 0.8, 0.1, 1.0]),
                vertex(-0.9, -0.9, -0.5, [0.9, 0.8, 0.1, 1.0]),
                vertex(0.5, -0.2, -0.5, [0.6, 0.4, 0.1, 1.0]),
            ],
            spin: 0.0,
        },
        // Spinning RGB triangle; with two-sided drawing off it culls away
        // while its back faces the camera.
        Triangle {
            vertices: [
                vertex(0.0, 0.8, 0.0, [1.0, 0.0, 0.0, 1.0]),
                vertex(-0.8, -0.6, 0.0, [0.0, 1.0, 0.0, 1.0]),
                vertex(0.8, -0.6, 0.0, [0.0, 0.0, 1.0, 1.0]),
            ],
            spin: 0.8,
        },
        // Translucent triangle nearest the camera; visible as a blend
        // layer when blending is on.
        Triangle {
            vertices: [
                vertex(0.1, 0.5, 0.5, [1.0, 1.0, 1.0, 0.35]),
                vertex(-0.5, -0.5, 0.5, [1.0, 1.0, 1.0, 0.35]),
                vertex(0.7, -0.3, 0.5, [1.0, 1.0, 1.0, 0.35]),
            ],
            spin: 0.0,
        },
    ]
}

fn render(fb: &mut FrameBuffer, context: &mut PipelineContext, triangles: &[Triangle], time: f32) {
    fb.clear_color(Vec4::new(0.05, 0.05, 0.08, 1.0));
    fb.clear_depth(f32::MAX);

    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 2.5), Vec3::ZERO, Vec3::Y);
    let projection = Mat4::perspective_rh(
        60f32.to_radians(),
        WIDTH as f32 / HEIGHT as f32,
        0.1,
        100.0,
    );

    for triangle in triangles {
        let world = Mat4::from_rotation_y(time * triangle.spin);
        context.set_constants(&FlatConstants::new(world, view, projection));
        for (i, v) in triangle.vertices.iter().enumerate() {
            context.set_attributes(i, v);
        }
        draw(fb, context);
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut options = load_options();
    let mut context = PipelineContext::new(Box::new(FlatShader), options)
        .expect("flat shader block sizes are valid");
    let mut fb = FrameBuffer::new(WIDTH, HEIGHT);
    let triangles = scene();

    log::info!("softpipe demo: 1/2 fill strategy, B blend, T two-sided, P capture");

    loop {
        let mut next = options;
        if is_key_pressed(KeyCode::Key1) {
            next.strategy = RasterStrategy::Scanline;
        }
        if is_key_pressed(KeyCode::Key2) {
            next.strategy = RasterStrategy::Barycentric;
        }
        if is_key_pressed(KeyCode::B) {
            next.enable_blend = !next.enable_blend;
        }
        if is_key_pressed(KeyCode::T) {
            next.two_sided = !next.two_sided;
        }
        if next != options {
            // A changed draw configuration means a fresh context.
            options = next;
            context = PipelineContext::new(Box::new(FlatShader), options)
                .expect("flat shader block sizes are valid");
        }

        render(&mut fb, &mut context, &triangles, get_time() as f32);

        if is_key_pressed(KeyCode::P) {
            let result = image::save_buffer(
                "capture.png",
                &fb.pixels,
                WIDTH as u32,
                HEIGHT as u32,
                image::ExtendedColorType::Rgba8,
            );
            match result {
                Ok(()) => log::info!("wrote capture.png"),
                Err(e) => log::error!("capture failed: {}", e),
            }
        }

        clear_background(Color::from_rgba(0, 0, 0, 255));
        let texture = Texture2D::from_rgba8(WIDTH as u16, HEIGHT as u16, &fb.pixels);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );
        draw_text(
            &format!(
                "{:?}  blend {}  two-sided {}",
                options.strategy,
                on_off(options.enable_blend),
                on_off(options.two_sided)
            ),
            12.0,
            24.0,
            24.0,
            WHITE,
        );

        next_frame().await;
    }
}

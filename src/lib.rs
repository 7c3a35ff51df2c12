//! softpipe: a CPU triangle rasterization pipeline
//!
//! Turns clip-space triangles with caller-defined per-vertex attribute
//! blocks into colored pixels in an in-memory framebuffer:
//! - perspective division and viewport mapping
//! - two fill strategies: edge-walking scanlines and barycentric
//!   bounding-box testing (perspective-correct, the default)
//! - depth testing, fragment discard and source-alpha blending
//! - a pluggable two-stage shader contract, with a flat pass-through
//!   shader as the reference implementation
//!
//! No frustum clipping is performed: triangles must lie inside the view
//! volume, and vertices with w <= 0 produce undefined output. Draws run
//! single-threaded to completion; a framebuffer/context pair supports one
//! draw in flight. Window creation and presentation are host concerns;
//! the demo binary shows a macroquad host that blits the pixel buffer.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod context;
pub mod framebuffer;
pub mod raster;
pub mod shader;

pub use context::{ContextError, PipelineContext, PipelineOptions};
pub use framebuffer::FrameBuffer;
pub use raster::{draw, draw_triangle, RasterStrategy};
pub use shader::{FlatShader, Shader};

pub use glam;

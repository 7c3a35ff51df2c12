//! Per-draw pipeline configuration and scratch memory

use bytemuck::NoUninit;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::raster::RasterStrategy;
use crate::shader::Shader;

const FLOAT_BYTES: usize = std::mem::size_of::<f32>();

/// Block sizes and fixed-function switches for one draw configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Size in bytes of one per-vertex attribute block.
    pub attribute_bytes: usize,
    /// Size in bytes of one varying block. Interpolation treats the block
    /// as an array of f32.
    pub varying_bytes: usize,
    /// Size in bytes of the shader constants block.
    pub constant_bytes: usize,
    /// Skip the back-face cull when set.
    pub two_sided: bool,
    /// Blend fragment output against current framebuffer contents using
    /// the fragment's alpha.
    pub enable_blend: bool,
    /// Compare fragment depth against the depth plane before shading.
    pub depth_test: bool,
    /// Store fragment depth when the test passes and the fragment is not
    /// discarded. Turning this off keeps the legacy test-only behavior:
    /// later fragments of equal or lesser depth re-pass and re-blend.
    pub depth_write: bool,
    /// Triangle fill strategy.
    pub strategy: RasterStrategy,
}

impl PipelineOptions {
    /// Options for the given block sizes with the default switches:
    /// one-sided, no blending, depth tested and written, barycentric fill.
    pub fn new(attribute_bytes: usize, varying_bytes: usize, constant_bytes: usize) -> Self {
        Self {
            attribute_bytes,
            varying_bytes,
            constant_bytes,
            two_sided: false,
            enable_blend: false,
            depth_test: true,
            depth_write: true,
            strategy: RasterStrategy::default(),
        }
    }
}

/// Rejected draw configuration. Raised at context creation so the draw
/// path itself stays infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("{0} block size must be positive")]
    EmptyBlock(&'static str),
    #[error("{0} block size {1} is not a multiple of 4 bytes")]
    MisalignedBlock(&'static str, usize),
}

/// Owns the active shader and the scratch blocks for one draw
/// configuration.
///
/// Blocks are stored as f32 so typed plain-data views stay aligned. The
/// fragment varying block is overwritten for every covered pixel; nothing
/// read from it may outlive the current draw.
pub struct PipelineContext {
    pub(crate) shader: Box<dyn Shader>,
    pub(crate) options: PipelineOptions,
    pub(crate) attributes: [Vec<f32>; 3],
    pub(crate) vertex_varyings: [Vec<f32>; 3],
    pub(crate) fragment_varyings: Vec<f32>,
    pub(crate) constants: Vec<f32>,
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("options", &self.options)
            .field("attributes", &self.attributes)
            .field("vertex_varyings", &self.vertex_varyings)
            .field("fragment_varyings", &self.fragment_varyings)
            .field("constants", &self.constants)
            .finish_non_exhaustive()
    }
}

impl PipelineContext {
    pub fn new(shader: Box<dyn Shader>, options: PipelineOptions) -> Result<Self, ContextError> {
        check_block("attribute", options.attribute_bytes)?;
        check_block("varying", options.varying_bytes)?;
        check_block("constant", options.constant_bytes)?;

        let attribute_floats = options.attribute_bytes / FLOAT_BYTES;
        let varying_floats = options.varying_bytes / FLOAT_BYTES;
        let constant_floats = options.constant_bytes / FLOAT_BYTES;

        log::debug!(
            "pipeline context: {}B attributes, {}B varyings, {}B constants, {:?} fill",
            options.attribute_bytes,
            options.varying_bytes,
            options.constant_bytes,
            options.strategy
        );

        Ok(Self {
            shader,
            options,
            attributes: std::array::from_fn(|_| vec![0.0; attribute_floats]),
            vertex_varyings: std::array::from_fn(|_| vec![0.0; varying_floats]),
            fragment_varyings: vec![0.0; varying_floats],
            constants: vec![0.0; constant_floats],
        })
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn shader(&self) -> &dyn Shader {
        self.shader.as_ref()
    }

    /// Raw view of one vertex's attribute block.
    pub fn attributes_mut(&mut self, vertex: usize) -> &mut [f32] {
        &mut self.attributes[vertex]
    }

    /// Raw view of the shader constants block.
    pub fn constants_mut(&mut self) -> &mut [f32] {
        &mut self.constants
    }

    /// Copy a plain-data record into one vertex's attribute block.
    ///
    /// # Panics
    /// Panics if the record size does not match the declared attribute
    /// block size.
    pub fn set_attributes<T: NoUninit>(&mut self, vertex: usize, value: &T) {
        write_block(&mut self.attributes[vertex], value);
    }

    /// Copy a plain-data record into the shader constants block.
    ///
    /// # Panics
    /// Panics if the record size does not match the declared constant
    /// block size.
    pub fn set_constants<T: NoUninit>(&mut self, value: &T) {
        write_block(&mut self.constants, value);
    }
}

fn check_block(name: &'static str, bytes: usize) -> Result<(), ContextError> {
    if bytes == 0 {
        return Err(ContextError::EmptyBlock(name));
    }
    if bytes % FLOAT_BYTES != 0 {
        return Err(ContextError::MisalignedBlock(name, bytes));
    }
    Ok(())
}

fn write_block<T: NoUninit>(block: &mut [f32], value: &T) {
    let dst = bytemuck::cast_slice_mut::<f32, u8>(block);
    let src = bytemuck::bytes_of(value);
    assert_eq!(
        src.len(),
        dst.len(),
        "record size does not match declared block size"
    );
    dst.copy_from_slice(src);
}

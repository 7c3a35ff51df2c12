//! Two-stage shader contract and the flat reference shader

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Programmable stages of the pipeline.
///
/// Block layouts are caller-defined plain data and must match the sizes
/// declared when the pipeline context was created. `vertex` transforms one
/// vertex's attribute block into a clip-space position and writes that
/// vertex's varyings; `pixel` turns an interpolated varying block into a
/// color, or `None` to discard the fragment.
pub trait Shader {
    fn vertex(&self, attributes: &[f32], constants: &[f32], varyings: &mut [f32]) -> Vec4;
    fn pixel(&self, varyings: &[f32], constants: &[f32]) -> Option<Vec4>;
}

/// Typed view of a shader block. The block length must match the record
/// size exactly; records built from f32 arrays stay properly aligned.
pub fn from_block<T: Pod>(block: &[f32]) -> &T {
    bytemuck::from_bytes(bytemuck::cast_slice(block))
}

/// Mutable typed view of a shader block.
pub fn from_block_mut<T: Pod>(block: &mut [f32]) -> &mut T {
    bytemuck::from_bytes_mut(bytemuck::cast_slice_mut(block))
}

/// Attribute block of [`FlatShader`]: object-space position and vertex color.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FlatAttributes {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Varying block of [`FlatShader`]: the color interpolated per fragment.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FlatVaryings {
    pub color: [f32; 4],
}

/// Constants block of [`FlatShader`]: column-major transform matrices.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FlatConstants {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl FlatConstants {
    pub fn new(world: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            world: world.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
        }
    }

    pub fn identity() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

/// Pass-through shader: transforms positions by world, view and projection
/// matrices and hands the vertex color to the pixel stage untouched.
#[derive(Debug, Default)]
pub struct FlatShader;

impl Shader for FlatShader {
    fn vertex(&self, attributes: &[f32], constants: &[f32], varyings: &mut [f32]) -> Vec4 {
        let input: &FlatAttributes = from_block(attributes);
        let uniform: &FlatConstants = from_block(constants);
        let output: &mut FlatVaryings = from_block_mut(varyings);

        output.color = input.color;

        let world = Mat4::from_cols_array_2d(&uniform.world);
        let view = Mat4::from_cols_array_2d(&uniform.view);
        let projection = Mat4::from_cols_array_2d(&uniform.projection);
        projection * view * world * Vec3::from_array(input.position).extend(1.0)
    }

    fn pixel(&self, varyings: &[f32], _constants: &[f32]) -> Option<Vec4> {
        let input: &FlatVaryings = from_block(varyings);
        Some(Vec4::from_array(input.color))
    }
}

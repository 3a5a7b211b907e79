use anyhow::Result;
use glam::{Mat4, Vec3, Vec4};

use crate::image::Image;
use crate::render::Vertex;

/// Handle to a vertex/index buffer pair stored in the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Handle to a 2D or cube texture stored in the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Handle to a compiled shader program stored in the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// A value that can be written to a named shader uniform.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Vec4Array(Vec<Vec4>),
}

impl UniformValue {
    pub fn as_mat4(&self) -> Option<Mat4> {
        match self {
            UniformValue::Mat4(m) => Some(*m),
            _ => None,
        }
    }

    pub fn as_vec4(&self) -> Option<Vec4> {
        match self {
            UniformValue::Vec4(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            UniformValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            UniformValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Abstraction over the GPU binding state the traversal mutates: the active
/// program, named uniforms, scoped texture units, depth bias and draw calls.
///
/// Resource creation happens once at scene-construction time; everything
/// else is frame-scoped. Whoever binds a texture unit must unbind it before
/// returning control up the call chain; running out of units is fatal.
/// Writes to uniform names the program does not declare are ignored.
pub trait RenderBackend {
    fn create_program(&mut self, source: &str) -> Result<ProgramHandle>;
    fn create_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<MeshHandle>;
    fn create_texture(&mut self, image: &Image) -> Result<TextureHandle>;
    fn create_cube_texture(&mut self, faces: &[Image; 6]) -> Result<TextureHandle>;

    fn use_program(&mut self, program: ProgramHandle) -> Result<()>;
    fn set_uniform(&mut self, name: &str, value: UniformValue);
    /// Last value written to a uniform, if any. Appearances use this to save
    /// and restore the values they overwrite.
    fn get_uniform(&self, name: &str) -> Option<UniformValue>;
    /// Returns a uniform to its never-written state, so a later
    /// `get_uniform` reports `None` again.
    fn clear_uniform(&mut self, name: &str);

    /// Binds `texture` to the next free unit for the named sampler and
    /// returns the unit. Must be paired with `unbind_texture`.
    fn bind_texture(&mut self, sampler: &str, texture: TextureHandle) -> Result<u32>;
    fn unbind_texture(&mut self);

    /// Enables (`Some((factor, units))`) or disables depth bias.
    fn set_polygon_offset(&mut self, bias: Option<(f32, f32)>);

    fn draw(&mut self, mesh: MeshHandle) -> Result<()>;

    fn begin_frame(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        Ok(())
    }
}

use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::image::Image;
use crate::render::backend::{
    MeshHandle, ProgramHandle, RenderBackend, TextureHandle, UniformValue,
};
use crate::render::Vertex;

/// Everything the backend knew at the moment of one draw call.
#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub mesh: MeshHandle,
    pub program: Option<ProgramHandle>,
    pub uniforms: HashMap<String, UniformValue>,
    /// Bound units at draw time, innermost last.
    pub textures: Vec<(String, TextureHandle)>,
    pub polygon_offset: Option<(f32, f32)>,
}

impl DrawRecord {
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    /// The texture a sampler resolves to: the innermost binding wins.
    pub fn texture(&self, sampler: &str) -> Option<TextureHandle> {
        self.textures
            .iter()
            .rev()
            .find(|(name, _)| name == sampler)
            .map(|(_, handle)| *handle)
    }
}

/// A headless backend that records binding state and draw calls instead of
/// talking to a GPU. Traversal properties (matrix composition, sibling
/// isolation, light uniforms) are asserted against its recordings.
pub struct TraceBackend {
    max_units: usize,
    next_handle: u64,
    program: Option<ProgramHandle>,
    uniforms: HashMap<String, UniformValue>,
    bound: Vec<(String, TextureHandle)>,
    polygon_offset: Option<(f32, f32)>,
    pub draws: Vec<DrawRecord>,
    pub frames_begun: u32,
    pub frames_ended: u32,
}

impl TraceBackend {
    pub const MAX_UNITS: usize = 4;

    pub fn new() -> Self {
        Self {
            max_units: Self::MAX_UNITS,
            next_handle: 1,
            program: None,
            uniforms: HashMap::new(),
            bound: Vec::new(),
            polygon_offset: None,
            draws: Vec::new(),
            frames_begun: 0,
            frames_ended: 0,
        }
    }

    /// Lowers the unit budget, for exhaustion tests.
    pub fn with_max_units(max_units: usize) -> Self {
        Self {
            max_units,
            ..Self::new()
        }
    }

    pub fn bound_units(&self) -> usize {
        self.bound.len()
    }

    fn take_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl Default for TraceBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for TraceBackend {
    fn create_program(&mut self, _source: &str) -> Result<ProgramHandle> {
        Ok(ProgramHandle(self.take_handle()))
    }

    fn create_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<MeshHandle> {
        debug_assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        Ok(MeshHandle(self.take_handle()))
    }

    fn create_texture(&mut self, _image: &Image) -> Result<TextureHandle> {
        Ok(TextureHandle(self.take_handle()))
    }

    fn create_cube_texture(&mut self, _faces: &[Image; 6]) -> Result<TextureHandle> {
        Ok(TextureHandle(self.take_handle()))
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<()> {
        self.program = Some(program);
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.uniforms.insert(name.to_owned(), value);
    }

    fn get_uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).cloned()
    }

    fn clear_uniform(&mut self, name: &str) {
        self.uniforms.remove(name);
    }

    fn bind_texture(&mut self, sampler: &str, texture: TextureHandle) -> Result<u32> {
        if self.bound.len() >= self.max_units {
            return Err(anyhow!("no free texture unit for sampler {sampler}"));
        }
        self.bound.push((sampler.to_owned(), texture));
        Ok(self.bound.len() as u32 - 1)
    }

    fn unbind_texture(&mut self) {
        debug_assert!(!self.bound.is_empty(), "unbind without matching bind");
        self.bound.pop();
    }

    fn set_polygon_offset(&mut self, bias: Option<(f32, f32)>) {
        self.polygon_offset = bias;
    }

    fn draw(&mut self, mesh: MeshHandle) -> Result<()> {
        self.draws.push(DrawRecord {
            mesh,
            program: self.program,
            uniforms: self.uniforms.clone(),
            textures: self.bound.clone(),
            polygon_offset: self.polygon_offset,
        });
        Ok(())
    }

    fn begin_frame(&mut self) -> Result<()> {
        self.frames_begun += 1;
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        self.frames_ended += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_exhaustion_is_an_error() {
        let mut backend = TraceBackend::with_max_units(1);
        let tex = backend.create_texture(&Image::solid(1.0, 1.0, 1.0)).unwrap();
        backend.bind_texture("decal", tex).unwrap();
        assert!(backend.bind_texture("roughness", tex).is_err());
        backend.unbind_texture();
        assert!(backend.bind_texture("roughness", tex).is_ok());
    }

    #[test]
    fn innermost_sampler_binding_wins() {
        let mut backend = TraceBackend::new();
        let outer = backend.create_texture(&Image::solid(1.0, 0.0, 0.0)).unwrap();
        let inner = backend.create_texture(&Image::solid(0.0, 1.0, 0.0)).unwrap();
        let mesh = backend.create_mesh(&[], &[]).unwrap();

        backend.bind_texture("decal", outer).unwrap();
        backend.bind_texture("decal", inner).unwrap();
        backend.draw(mesh).unwrap();
        backend.unbind_texture();
        backend.draw(mesh).unwrap();

        assert_eq!(backend.draws[0].texture("decal"), Some(inner));
        assert_eq!(backend.draws[1].texture("decal"), Some(outer));
    }
}

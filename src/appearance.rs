use std::cell::RefCell;
use std::path::Path;

use anyhow::Result;
use glam::{Vec3, Vec4};
use id_arena::Id;

use crate::image::Image;
use crate::render::backend::{RenderBackend, TextureHandle, UniformValue};
use crate::state::State;

pub type AppearanceId = Id<Appearance>;

/// A bindable visual-state modifier with a scoped load/unload pair. A node's
/// appearances are loaded in list order before its shape draws and unloaded
/// in reverse order after its children render, so appearance state set on an
/// ancestor stays visible to every descendant and never leaks to siblings.
pub enum Appearance {
    Material(Material),
    Texture(Texture),
    TexCube(TexCube),
    PolygonOffset(PolygonOffset),
}

impl Appearance {
    pub fn load(&self, st: &mut State) -> Result<()> {
        match self {
            Appearance::Material(m) => m.load(st),
            Appearance::Texture(t) => t.load(st),
            Appearance::TexCube(t) => t.load(st),
            Appearance::PolygonOffset(p) => p.load(st),
        }
    }

    pub fn unload(&self, st: &mut State) {
        match self {
            Appearance::Material(m) => m.unload(st),
            Appearance::Texture(t) => t.unload(st),
            Appearance::TexCube(t) => t.unload(st),
            Appearance::PolygonOffset(p) => p.unload(st),
        }
    }
}

const MATERIAL_UNIFORMS: [&str; 4] = ["mamb", "mdif", "mspe", "mshi"];

/// Color and shading coefficients, uploaded as `mamb`/`mdif`/`mspe`/`mshi`.
/// Loading saves whatever values those uniforms held so unloading can
/// restore the ancestor material for siblings rendered afterwards.
pub struct Material {
    ambient: Vec4,
    diffuse: Vec4,
    specular: Vec4,
    shininess: f32,
    saved: RefCell<Vec<[Option<UniformValue>; 4]>>,
}

impl Material {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            ambient: Vec4::new(r, g, b, 1.0),
            diffuse: Vec4::new(r, g, b, 1.0),
            specular: Vec4::new(0.0, 0.0, 0.0, 1.0),
            shininess: 64.0,
            saved: RefCell::new(Vec::new()),
        }
    }

    pub fn set_ambient(&mut self, r: f32, g: f32, b: f32) {
        self.ambient = Vec4::new(r, g, b, 1.0);
    }

    pub fn set_diffuse(&mut self, r: f32, g: f32, b: f32) {
        self.diffuse = Vec4::new(r, g, b, 1.0);
    }

    pub fn set_specular(&mut self, r: f32, g: f32, b: f32) {
        self.specular = Vec4::new(r, g, b, 1.0);
    }

    pub fn set_shininess(&mut self, shininess: f32) {
        self.shininess = shininess;
    }

    fn load(&self, st: &mut State) -> Result<()> {
        let saved = MATERIAL_UNIFORMS.map(|name| st.backend.get_uniform(name));
        self.saved.borrow_mut().push(saved);

        st.backend.set_uniform("mamb", UniformValue::Vec4(self.ambient));
        st.backend.set_uniform("mdif", UniformValue::Vec4(self.diffuse));
        st.backend.set_uniform("mspe", UniformValue::Vec4(self.specular));
        st.backend.set_uniform("mshi", UniformValue::Float(self.shininess));
        Ok(())
    }

    fn unload(&self, st: &mut State) {
        let Some(saved) = self.saved.borrow_mut().pop() else {
            return;
        };
        for (name, value) in MATERIAL_UNIFORMS.into_iter().zip(saved) {
            match value {
                Some(value) => st.backend.set_uniform(name, value),
                // No ancestor ever wrote this uniform; return it to the
                // never-written state so the next sibling sees exactly what
                // this node saw.
                None => st.backend.clear_uniform(name),
            }
        }
    }
}

/// A 2D sampler binding. The texture occupies one unit between load and
/// unload; an ancestor binding of the same sampler shows through again once
/// this one is released.
pub struct Texture {
    sampler: String,
    handle: TextureHandle,
}

impl Texture {
    pub fn from_file(
        backend: &mut dyn RenderBackend,
        sampler: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let image = Image::from_file(path)?;
        Ok(Self {
            sampler: sampler.into(),
            handle: backend.create_texture(&image)?,
        })
    }

    /// 1x1 solid-color texture, the plain-color stand-in for a decal map.
    pub fn solid(
        backend: &mut dyn RenderBackend,
        sampler: impl Into<String>,
        color: Vec3,
    ) -> Result<Self> {
        let image = Image::solid(color.x, color.y, color.z);
        Ok(Self {
            sampler: sampler.into(),
            handle: backend.create_texture(&image)?,
        })
    }

    fn load(&self, st: &mut State) -> Result<()> {
        st.backend.bind_texture(&self.sampler, self.handle)?;
        Ok(())
    }

    fn unload(&self, st: &mut State) {
        st.backend.unbind_texture();
    }
}

/// A cube-map sampler binding, assembled from a 4x3 cross atlas.
pub struct TexCube {
    sampler: String,
    handle: TextureHandle,
}

impl TexCube {
    pub fn from_atlas(
        backend: &mut dyn RenderBackend,
        sampler: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        Self::from_image(backend, sampler, &Image::from_file(path)?)
    }

    pub fn from_image(
        backend: &mut dyn RenderBackend,
        sampler: impl Into<String>,
        atlas: &Image,
    ) -> Result<Self> {
        let faces = atlas.cube_faces()?;
        Ok(Self {
            sampler: sampler.into(),
            handle: backend.create_cube_texture(&faces)?,
        })
    }

    fn load(&self, st: &mut State) -> Result<()> {
        st.backend.bind_texture(&self.sampler, self.handle)?;
        Ok(())
    }

    fn unload(&self, st: &mut State) {
        st.backend.unbind_texture();
    }
}

/// Depth-bias toggle used to draw coplanar decals (a page lying on the
/// table) without z-fighting.
pub struct PolygonOffset {
    factor: f32,
    units: f32,
}

impl PolygonOffset {
    pub fn new(factor: f32, units: f32) -> Self {
        Self { factor, units }
    }

    fn load(&self, st: &mut State) -> Result<()> {
        st.backend.set_polygon_offset(Some((self.factor, self.units)));
        Ok(())
    }

    fn unload(&self, st: &mut State) {
        st.backend.set_polygon_offset(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::trace::TraceBackend;

    #[test]
    fn tex_cube_slices_an_atlas_into_one_cube_texture() {
        let mut backend = TraceBackend::new();
        let atlas = Image::from_raw(8, 6, 3, vec![0; 8 * 6 * 3]).unwrap();
        let cube = TexCube::from_image(&mut backend, "envMap", &atlas).unwrap();
        assert_eq!(cube.sampler, "envMap");
    }

    #[test]
    fn tex_cube_rejects_an_atlas_too_small_for_the_cross() {
        let mut backend = TraceBackend::new();
        let atlas = Image::from_raw(2, 2, 3, vec![0; 2 * 2 * 3]).unwrap();
        assert!(TexCube::from_image(&mut backend, "envMap", &atlas).is_err());
    }
}

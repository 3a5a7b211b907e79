pub mod geometry;
pub mod gltf_mesh;

use std::f32::consts::FRAC_PI_2;
use std::path::Path;

use anyhow::Result;
use glam::{Mat4, Vec3};
use id_arena::Id;

use crate::render::backend::{MeshHandle, RenderBackend};
use crate::scene::Scene;
use crate::state::State;

pub type ShapeId = Id<Shape>;

/// A drawable geometry resource. Vertex and index data are uploaded once at
/// construction; afterwards the shape is stateless and safely shared by any
/// number of nodes.
pub struct Shape {
    meshes: Vec<MeshHandle>,
    /// Cap disks drawn with a local transform relative to the body
    /// (cylinder ends, cone base).
    caps: Vec<(Mat4, MeshHandle)>,
}

impl Shape {
    fn upload(backend: &mut dyn RenderBackend, data: &geometry::MeshData) -> Result<MeshHandle> {
        backend.create_mesh(&data.vertices, &data.indices)
    }

    fn cap_transform(y: f32, angle_rad: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, y, 0.0)) * Mat4::from_rotation_x(angle_rad)
    }

    pub fn cylinder(
        backend: &mut dyn RenderBackend,
        stacks: u32,
        slices: u32,
        caps: bool,
    ) -> Result<Self> {
        let side = Self::upload(backend, &geometry::cylinder(stacks, slices))?;
        let mut cap_meshes = Vec::new();
        if caps {
            let disk = Self::upload(backend, &geometry::disk(slices))?;
            cap_meshes.push((Self::cap_transform(0.5, -FRAC_PI_2), disk));
            let disk = Self::upload(backend, &geometry::disk(slices))?;
            cap_meshes.push((Self::cap_transform(-0.5, FRAC_PI_2), disk));
        }
        Ok(Self {
            meshes: vec![side],
            caps: cap_meshes,
        })
    }

    pub fn cone(
        backend: &mut dyn RenderBackend,
        stacks: u32,
        slices: u32,
        cap: bool,
    ) -> Result<Self> {
        let side = Self::upload(backend, &geometry::cone(stacks, slices))?;
        let mut cap_meshes = Vec::new();
        if cap {
            let disk = Self::upload(backend, &geometry::disk(slices))?;
            cap_meshes.push((Self::cap_transform(-0.5, FRAC_PI_2), disk));
        }
        Ok(Self {
            meshes: vec![side],
            caps: cap_meshes,
        })
    }

    pub fn disk(backend: &mut dyn RenderBackend, slices: u32) -> Result<Self> {
        Ok(Self {
            meshes: vec![Self::upload(backend, &geometry::disk(slices))?],
            caps: Vec::new(),
        })
    }

    pub fn cube(backend: &mut dyn RenderBackend) -> Result<Self> {
        Ok(Self {
            meshes: vec![Self::upload(backend, &geometry::cube())?],
            caps: Vec::new(),
        })
    }

    pub fn sphere(backend: &mut dyn RenderBackend, stacks: u32, slices: u32) -> Result<Self> {
        Ok(Self {
            meshes: vec![Self::upload(backend, &geometry::sphere(stacks, slices))?],
            caps: Vec::new(),
        })
    }

    pub fn quad(backend: &mut dyn RenderBackend) -> Result<Self> {
        Ok(Self {
            meshes: vec![Self::upload(backend, &geometry::quad())?],
            caps: Vec::new(),
        })
    }

    /// Loads every triangle primitive of the first mesh in a glTF file.
    pub fn from_gltf(backend: &mut dyn RenderBackend, path: impl AsRef<Path>) -> Result<Self> {
        let meshes = gltf_mesh::load_gltf_mesh(path)?
            .iter()
            .map(|data| Self::upload(backend, data))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            meshes,
            caps: Vec::new(),
        })
    }

    /// Issues the draw calls for this shape with the currently bound shader,
    /// matrices and appearances. Caps re-upload matrices for their local
    /// transform and restore the stack afterwards.
    pub fn draw(&self, st: &mut State, scene: &Scene) -> Result<()> {
        for mesh in &self.meshes {
            st.backend.draw(*mesh)?;
        }
        for (local, mesh) in &self.caps {
            st.push_matrix();
            st.mult_matrix(*local);
            st.load_matrices(scene)?;
            st.backend.draw(*mesh)?;
            st.pop_matrix();
        }
        Ok(())
    }
}

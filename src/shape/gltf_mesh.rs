use std::path::Path;

use anyhow::{bail, Context, Result};
use glam::{Vec2, Vec3};
use itertools::izip;

use crate::render::Vertex;
use crate::shape::geometry::MeshData;

/// Reads every triangle primitive of the first mesh in a glTF file.
pub fn load_gltf_mesh(path: impl AsRef<Path>) -> Result<Vec<MeshData>> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path)
        .with_context(|| format!("could not import glTF file {}", path.display()))?;

    let mesh = document
        .meshes()
        .next()
        .with_context(|| format!("no meshes in {}", path.display()))?;

    let mut primitives = Vec::new();
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            bail!("unsupported primitive mode: {:?}", primitive.mode());
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .context("primitive has no positions")?
            .collect();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .context("primitive has no normals")?
            .collect();
        let tex_coords: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
            Some(tc) => tc.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };

        let vertices = izip!(&positions, &normals, &tex_coords)
            .map(|(pos, normal, uv)| {
                Vertex::new(Vec3::from(*pos), Vec3::from(*normal), Vec2::from(*uv))
            })
            .collect::<Vec<Vertex>>();

        let indices = reader
            .read_indices()
            .context("primitive has no indices")?
            .into_u32()
            .collect::<Vec<u32>>();

        primitives.push(MeshData { vertices, indices });
    }

    if primitives.is_empty() {
        bail!("mesh without primitives in {}", path.display());
    }

    Ok(primitives)
}

use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::render::Vertex;

/// CPU-side triangle-list geometry, uploaded once at shape construction.
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Regular (nx+1)x(ny+1) grid of unit-square uv coordinates with
/// triangle-list indices; the parametric surfaces below map it to their
/// shape.
fn grid(nx: u32, ny: u32) -> (Vec<Vec2>, Vec<u32>) {
    let mut uvs = Vec::with_capacity(((nx + 1) * (ny + 1)) as usize);
    for j in 0..=ny {
        for i in 0..=nx {
            uvs.push(Vec2::new(i as f32 / nx as f32, j as f32 / ny as f32));
        }
    }

    let mut indices = Vec::with_capacity((6 * nx * ny) as usize);
    for j in 0..ny {
        for i in 0..nx {
            let v0 = j * (nx + 1) + i;
            let v1 = v0 + 1;
            let v2 = v0 + (nx + 1);
            let v3 = v2 + 1;
            indices.extend_from_slice(&[v0, v1, v3, v0, v3, v2]);
        }
    }

    (uvs, indices)
}

/// Cylinder side: radius 1, axis +Y, height 1 centered at the origin.
/// Caps are separate disks drawn with local transforms.
pub fn cylinder(stacks: u32, slices: u32) -> MeshData {
    let (uvs, indices) = grid(slices, stacks);
    let vertices = uvs
        .iter()
        .map(|uv| {
            let theta = uv.x * 2.0 * PI;
            let (s, c) = theta.sin_cos();
            Vertex::new(
                Vec3::new(s, uv.y - 0.5, c),
                Vec3::new(s, 0.0, c),
                *uv,
            )
        })
        .collect();
    MeshData { vertices, indices }
}

/// Cone side: base radius 1 at y=-0.5, apex at y=+0.5.
pub fn cone(stacks: u32, slices: u32) -> MeshData {
    let (uvs, indices) = grid(slices, stacks);
    let vertices = uvs
        .iter()
        .map(|uv| {
            let theta = uv.x * 2.0 * PI;
            let (s, c) = theta.sin_cos();
            let r = 1.0 - uv.y;
            // Side normal of a right cone with H = R = 1.
            let normal = Vec3::new(s, 1.0, c).normalize();
            Vertex::new(Vec3::new(r * s, uv.y - 0.5, r * c), normal, *uv)
        })
        .collect();
    MeshData { vertices, indices }
}

/// Unit disk in the XY plane, normal +Z: a fan around a center vertex.
pub fn disk(slices: u32) -> MeshData {
    let mut vertices = Vec::with_capacity(slices as usize + 2);
    vertices.push(Vertex::new(Vec3::ZERO, Vec3::Z, Vec2::new(0.5, 0.5)));
    for i in 0..=slices {
        let theta = i as f32 / slices as f32 * 2.0 * PI;
        let (s, c) = theta.sin_cos();
        vertices.push(Vertex::new(
            Vec3::new(c, s, 0.0),
            Vec3::Z,
            Vec2::new(0.5 * (c + 1.0), 0.5 * (s + 1.0)),
        ));
    }

    let mut indices = Vec::with_capacity(3 * slices as usize);
    for i in 1..=slices {
        indices.extend_from_slice(&[0, i, i + 1]);
    }

    MeshData { vertices, indices }
}

/// Unit cube centered at the origin, per-face normals and uvs.
pub fn cube() -> MeshData {
    const H: f32 = 0.5;
    // (normal, tangent, bitangent) per face.
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, (normal, tangent, bitangent)) in faces.into_iter().enumerate() {
        let base = (face * 4) as u32;
        for (u, v) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            let position =
                normal * H + tangent * (u - 0.5) * 2.0 * H + bitangent * (v - 0.5) * 2.0 * H;
            vertices.push(Vertex::new(position, normal, Vec2::new(u, v)));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

/// Unit sphere centered at the origin, latitude/longitude parametrization.
pub fn sphere(stacks: u32, slices: u32) -> MeshData {
    let (uvs, indices) = grid(slices, stacks);
    let vertices = uvs
        .iter()
        .map(|uv| {
            let theta = uv.x * 2.0 * PI;
            let phi = uv.y * PI;
            let position = Vec3::new(
                phi.sin() * theta.sin(),
                -phi.cos(),
                phi.sin() * theta.cos(),
            );
            Vertex::new(position, position, *uv)
        })
        .collect();
    MeshData { vertices, indices }
}

/// Unit quad in the XY plane, normal +Z, corners at (-0.5, -0.5)..(0.5, 0.5).
pub fn quad() -> MeshData {
    const H: f32 = 0.5;
    let vertices = vec![
        Vertex::new(Vec3::new(-H, -H, 0.0), Vec3::Z, Vec2::new(0.0, 0.0)),
        Vertex::new(Vec3::new(H, -H, 0.0), Vec3::Z, Vec2::new(1.0, 0.0)),
        Vertex::new(Vec3::new(H, H, 0.0), Vec3::Z, Vec2::new(1.0, 1.0)),
        Vertex::new(Vec3::new(-H, H, 0.0), Vec3::Z, Vec2::new(0.0, 1.0)),
    ];
    MeshData {
        vertices,
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_indices_in_range(data: &MeshData) {
        assert!(data
            .indices
            .iter()
            .all(|&i| (i as usize) < data.vertices.len()));
        assert_eq!(data.indices.len() % 3, 0);
    }

    #[test]
    fn cylinder_points_lie_on_the_unit_circle() {
        let data = cylinder(8, 16);
        assert_indices_in_range(&data);
        for v in &data.vertices {
            let r = (v.position.x * v.position.x + v.position.z * v.position.z).sqrt();
            assert_relative_eq!(r, 1.0, epsilon = 1e-5);
            assert!(v.position.y >= -0.5 && v.position.y <= 0.5);
            assert_relative_eq!(v.normal.y, 0.0);
        }
    }

    #[test]
    fn cone_narrows_to_the_apex() {
        let data = cone(8, 16);
        assert_indices_in_range(&data);
        for v in &data.vertices {
            let r = (v.position.x * v.position.x + v.position.z * v.position.z).sqrt();
            assert_relative_eq!(r, 0.5 - v.position.y, epsilon = 1e-5);
            assert_relative_eq!(v.normal.length(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn cube_has_one_quad_per_face() {
        let data = cube();
        assert_eq!(data.vertices.len(), 24);
        assert_eq!(data.indices.len(), 36);
        assert_indices_in_range(&data);
        for v in &data.vertices {
            // Every vertex sits on a corner of the half-unit cube.
            assert_relative_eq!(v.position.x.abs(), 0.5);
            assert_relative_eq!(v.position.y.abs(), 0.5);
            assert_relative_eq!(v.position.z.abs(), 0.5);
        }
    }

    #[test]
    fn sphere_vertices_are_unit_length_with_matching_normals() {
        let data = sphere(8, 16);
        assert_indices_in_range(&data);
        for v in &data.vertices {
            assert_relative_eq!(v.position.length(), 1.0, epsilon = 1e-5);
            assert_relative_eq!((v.normal - v.position).length(), 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn disk_is_a_closed_fan() {
        let data = disk(16);
        assert_indices_in_range(&data);
        assert_eq!(data.indices.len(), 3 * 16);
        // First and last rim vertices coincide, closing the fan.
        let first = data.vertices[1].position;
        let last = data.vertices.last().unwrap().position;
        assert_relative_eq!((first - last).length(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn quad_spans_the_centered_unit_square() {
        let data = quad();
        assert_eq!(data.vertices.len(), 4);
        assert_eq!(data.indices, vec![0, 1, 2, 0, 2, 3]);
    }
}

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec3};

/// Shared handle to a transform. A node owns one, while engines and other
/// scene-construction code may hold clones of the same handle to animate it.
pub type TransformPtr = Rc<RefCell<Transform>>;

/// An affine matrix builder. Each operation post-multiplies the composed
/// matrix, so calls compose in issue order and the last call is the innermost
/// (applied first to a vertex).
#[derive(Debug, Clone)]
pub struct Transform {
    matrix: Mat4,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }

    /// Convenience constructor for the common shared case.
    pub fn make() -> TransformPtr {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn load_identity(&mut self) {
        self.matrix = Mat4::IDENTITY;
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.matrix *= Mat4::from_translation(Vec3::new(x, y, z));
    }

    /// Rotation by `angle_deg` degrees around the given axis. The axis does
    /// not need to be normalized.
    pub fn rotate(&mut self, angle_deg: f32, ax: f32, ay: f32, az: f32) {
        let axis = Vec3::new(ax, ay, az).normalize();
        self.matrix *= Mat4::from_axis_angle(axis, angle_deg.to_radians());
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.matrix *= Mat4::from_scale(Vec3::new(sx, sy, sz));
    }

    /// The composed matrix, by value.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec4;

    #[test]
    fn starts_as_identity() {
        let t = Transform::new();
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translate_then_scale_keeps_translation_outermost() {
        // Composition is in call order: the translation is applied after the
        // scale, so the origin lands exactly at the translation.
        let mut t = Transform::new();
        t.translate(1.0, 0.0, 0.0);
        t.scale(2.0, 2.0, 2.0);
        let p = t.matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 0.0);
        assert_relative_eq!(p.z, 0.0);
    }

    #[test]
    fn rotate_uses_degrees() {
        let mut t = Transform::new();
        t.rotate(90.0, 0.0, 0.0, 1.0);
        let p = t.matrix() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn load_identity_resets_composition() {
        let mut t = Transform::new();
        t.translate(3.0, 4.0, 5.0);
        t.load_identity();
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn rotations_accumulate_in_call_order() {
        let mut a = Transform::new();
        a.rotate(30.0, 0.0, 1.0, 0.0);
        a.rotate(60.0, 0.0, 1.0, 0.0);

        let mut b = Transform::new();
        b.rotate(90.0, 0.0, 1.0, 0.0);

        let pa = a.matrix() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        let pb = b.matrix() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(pa.x, pb.x, epsilon = 1e-5);
        assert_relative_eq!(pa.z, pb.z, epsilon = 1e-5);
    }
}

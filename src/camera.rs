use glam::{Mat4, Quat, Vec3};

/// View/projection provider consumed read-only by the traversal and by
/// lights converting between lighting spaces.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub center: Vec3,
    pub up: Vec3,
    fovy_deg: f32,
    aspect: f32,
    near: f32,
    far: f32,
    /// Arcball rotation applied around the center.
    rotation: Mat4,
}

impl Camera {
    pub fn new(eye: Vec3) -> Self {
        Self {
            eye,
            center: Vec3::ZERO,
            up: Vec3::Y,
            fovy_deg: 30.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
            rotation: Mat4::IDENTITY,
        }
    }

    pub fn set_center(&mut self, x: f32, y: f32, z: f32) {
        self.center = Vec3::new(x, y, z);
    }

    /// Vertical field of view in degrees; doubles as the zoom control.
    pub fn set_angle(&mut self, fovy_deg: f32) {
        self.fovy_deg = fovy_deg;
    }

    pub fn angle(&self) -> f32 {
        self.fovy_deg
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn set_rotation(&mut self, rotation: Mat4) {
        self.rotation = rotation;
    }

    pub fn view_matrix(&self) -> Mat4 {
        let look = Mat4::look_at_rh(self.eye, self.center, self.up);
        // The arcball orbits the scene around the camera target.
        look * Mat4::from_translation(self.center)
            * self.rotation
            * Mat4::from_translation(-self.center)
    }

    pub fn proj_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn create_arcball(&self, width: f32, height: f32) -> Arcball {
        Arcball::new(width, height)
    }
}

/// Accumulates mouse drags into a rotation by projecting screen points onto
/// a virtual sphere over the viewport.
pub struct Arcball {
    width: f32,
    height: f32,
    last: Vec3,
    rotation: Quat,
}

impl Arcball {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            last: Vec3::Z,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn map_to_sphere(&self, x: f32, y: f32) -> Vec3 {
        let px = (2.0 * x - self.width) / self.width;
        let py = (2.0 * y - self.height) / self.height;
        let len2 = px * px + py * py;
        if len2 > 1.0 {
            let inv = 1.0 / len2.sqrt();
            Vec3::new(px * inv, py * inv, 0.0)
        } else {
            Vec3::new(px, py, (1.0 - len2).sqrt())
        }
    }

    pub fn init_mouse_motion(&mut self, x: f32, y: f32) {
        self.last = self.map_to_sphere(x, y);
    }

    pub fn accumulate_mouse_motion(&mut self, x: f32, y: f32) {
        let current = self.map_to_sphere(x, y);
        let axis = self.last.cross(current);
        if axis.length_squared() > 1e-12 {
            let angle = self.last.dot(current).clamp(-1.0, 1.0).acos();
            self.rotation = Quat::from_axis_angle(axis.normalize(), angle) * self.rotation;
        }
        self.last = current;
    }

    pub fn rotation(&self) -> Mat4 {
        Mat4::from_quat(self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec4;

    #[test]
    fn view_matrix_moves_eye_to_origin() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
        let eye = camera.view_matrix() * Vec4::new(0.0, 0.0, 5.0, 1.0);
        assert_relative_eq!(eye.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(eye.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(eye.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn arcball_identity_without_motion() {
        let camera = Camera::new(Vec3::new(2.0, 3.5, 4.0));
        let arcball = camera.create_arcball(1000.0, 800.0);
        assert_eq!(arcball.rotation(), Mat4::IDENTITY);
    }

    #[test]
    fn arcball_drag_produces_a_rotation() {
        let mut arcball = Arcball::new(100.0, 100.0);
        arcball.init_mouse_motion(50.0, 50.0);
        arcball.accumulate_mouse_motion(60.0, 50.0);
        let rot = arcball.rotation();
        assert_ne!(rot, Mat4::IDENTITY);
        // Rotations preserve length.
        let v = rot * Vec4::new(1.0, 2.0, 3.0, 0.0);
        assert_relative_eq!(v.length(), (14.0f32).sqrt(), epsilon = 1e-5);
    }
}

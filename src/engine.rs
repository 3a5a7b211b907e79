use glam::Vec3;

use crate::transform::TransformPtr;

/// Per-frame behavior unit. Engines hold shared transform handles they were
/// given at construction and mutate them on every update; they have no
/// visibility into the node graph and cannot add or remove nodes.
pub trait Engine {
    fn update(&mut self, dt: f32);
}

/// Rotates one transform at a fixed rate around an axis.
pub struct OrbitEngine {
    transform: TransformPtr,
    rate_deg_per_sec: f32,
    axis: Vec3,
}

impl OrbitEngine {
    pub fn new(transform: TransformPtr, rate_deg_per_sec: f32, axis: Vec3) -> Self {
        Self {
            transform,
            rate_deg_per_sec,
            axis,
        }
    }
}

impl Engine for OrbitEngine {
    fn update(&mut self, dt: f32) {
        self.transform.borrow_mut().rotate(
            self.rate_deg_per_sec * dt,
            self.axis.x,
            self.axis.y,
            self.axis.z,
        );
    }
}

const EARTH_ORBIT_SPEED: f32 = 15.0; // deg/s
const EARTH_SPIN_SPEED: f32 = -45.0;
const MOON_ORBIT_SPEED: f32 = 60.0;
const MERCURY_ORBIT_SPEED: f32 = 70.0;

/// Drives the orbital degrees of freedom of the solar-system demo scene.
pub struct SolarEngine {
    earth_orbit: TransformPtr,
    earth_spin: TransformPtr,
    moon_orbit: TransformPtr,
    mercury_orbit: TransformPtr,
}

impl SolarEngine {
    pub fn new(
        earth_orbit: TransformPtr,
        earth_spin: TransformPtr,
        moon_orbit: TransformPtr,
        mercury_orbit: TransformPtr,
    ) -> Self {
        Self {
            earth_orbit,
            earth_spin,
            moon_orbit,
            mercury_orbit,
        }
    }
}

impl Engine for SolarEngine {
    fn update(&mut self, dt: f32) {
        self.earth_orbit
            .borrow_mut()
            .rotate(EARTH_ORBIT_SPEED * dt, 0.0, 0.0, 1.0);
        self.earth_spin
            .borrow_mut()
            .rotate(EARTH_SPIN_SPEED * dt, 0.0, 0.0, 1.0);
        self.moon_orbit
            .borrow_mut()
            .rotate(MOON_ORBIT_SPEED * dt, 0.0, 0.0, 1.0);
        self.mercury_orbit
            .borrow_mut()
            .rotate(MERCURY_ORBIT_SPEED * dt, 0.0, 0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;
    use approx::assert_relative_eq;
    use glam::{Mat4, Vec4};

    #[test]
    fn orbit_engine_advances_by_the_encoded_rate() {
        let transform = Transform::make();
        let mut engine = OrbitEngine::new(transform.clone(), 15.0, Vec3::Z);

        engine.update(1.0);

        let expected = Mat4::from_rotation_z(15.0f32.to_radians());
        let got = transform.borrow().matrix();
        let p = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let (pg, pe) = (got * p, expected * p);
        assert_relative_eq!(pg.x, pe.x, epsilon = 1e-5);
        assert_relative_eq!(pg.y, pe.y, epsilon = 1e-5);
    }

    #[test]
    fn updates_accumulate_across_frames() {
        let transform = Transform::make();
        let mut engine = OrbitEngine::new(transform.clone(), 90.0, Vec3::Z);

        engine.update(0.5);
        engine.update(0.5);

        let got = transform.borrow().matrix() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(got.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(got.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn solar_engine_drives_all_four_transforms() {
        let (a, b, c, d) = (
            Transform::make(),
            Transform::make(),
            Transform::make(),
            Transform::make(),
        );
        let mut engine = SolarEngine::new(a.clone(), b.clone(), c.clone(), d.clone());
        engine.update(1.0);

        for t in [&a, &b, &c, &d] {
            assert_ne!(t.borrow().matrix(), Mat4::IDENTITY);
        }
    }
}

use anyhow::Result;
use glam::{Mat4, Vec3, Vec4};
use id_arena::Id;

use crate::node::NodeId;
use crate::render::backend::UniformValue;
use crate::scene::Scene;
use crate::state::State;

pub type LightId = Id<Light>;

/// Coordinate frame in which lighting uniforms are expressed. A light whose
/// declared space differs from its shader's is converted through the camera
/// view matrix at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightSpace {
    World,
    Camera,
}

/// Three-valued spotlight switch: by default the spot term is enabled
/// exactly when the light is positional and follows a reference node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotMode {
    Auto,
    On,
    Off,
}

/// A positional/directional/spot light. When `reference` is set, the
/// light's placement and orientation are re-derived from that node's
/// current model matrix every time the light is loaded; the light itself
/// never caches a transform. The node's matrix is only as fresh as the most
/// recent traversal that visited it, so a reference rendered later in
/// traversal order than the shader consuming this light contributes the
/// previous frame's matrix.
pub struct Light {
    space: LightSpace,
    ambient: Vec4,
    diffuse: Vec4,
    specular: Vec4,
    position: Vec4,
    reference: Option<NodeId>,
    spot_cutoff_deg: f32,
    spot_exponent: f32,
    attenuation: Vec3,
    spot_mode: SpotMode,
}

impl Light {
    pub fn new(x: f32, y: f32, z: f32, w: f32, space: LightSpace) -> Self {
        Self {
            space,
            ambient: Vec4::new(0.3, 0.3, 0.3, 1.0),
            diffuse: Vec4::new(0.7, 0.7, 0.7, 1.0),
            specular: Vec4::new(1.0, 1.0, 1.0, 1.0),
            position: Vec4::new(x, y, z, w),
            reference: None,
            spot_cutoff_deg: 14.0,
            spot_exponent: 32.0,
            attenuation: Vec3::new(1.0, 0.22, 0.20),
            spot_mode: SpotMode::Auto,
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32, w: f32) {
        self.position = Vec4::new(x, y, z, w);
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

    /// Non-owning link to the node whose live transform places this light.
    pub fn set_reference(&mut self, reference: Option<NodeId>) {
        self.reference = reference;
    }

    pub fn reference(&self) -> Option<NodeId> {
        self.reference
    }

    pub fn set_spotlight(&mut self, cutoff_deg: f32, exponent: f32) {
        self.spot_cutoff_deg = cutoff_deg;
        self.spot_exponent = exponent;
    }

    pub fn set_attenuation(&mut self, constant: f32, linear: f32, quadratic: f32) {
        self.attenuation = Vec3::new(constant, linear, quadratic);
    }

    pub fn set_spot_mode(&mut self, mode: SpotMode) {
        self.spot_mode = mode;
    }

    /// Writes the light's uniforms into the active shader.
    ///
    /// The effective transform starts as identity, gains the world/camera
    /// conversion when the light's space differs from the shader's lighting
    /// space, and is then right-multiplied by the reference node's current
    /// model matrix when one is set.
    pub fn load(&self, st: &mut State, scene: &Scene) -> Result<()> {
        st.backend.set_uniform("lamb", UniformValue::Vec4(self.ambient));
        st.backend.set_uniform("ldif", UniformValue::Vec4(self.diffuse));
        st.backend.set_uniform("lspe", UniformValue::Vec4(self.specular));

        let shader_space = st
            .shader()
            .map(|id| scene.shader(id).lighting_space())
            .unwrap_or(LightSpace::World);

        let mut m = Mat4::IDENTITY;
        if self.space == LightSpace::World && shader_space == LightSpace::Camera {
            m = st.camera().view_matrix();
        } else if self.space == LightSpace::Camera && shader_space == LightSpace::World {
            m = st.camera().view_matrix().inverse();
        }
        if let Some(node_id) = self.reference {
            m = m * scene.node(node_id).model_matrix();
        }

        let pos = m * self.position;
        st.backend.set_uniform("lpos", UniformValue::Vec4(pos));

        // Direction: the reference node's local -Y axis (apex toward the
        // cone opening); without a reference, straight ahead.
        let dir = if self.reference.is_some() {
            (m * Vec4::new(0.0, -1.0, 0.0, 0.0)).truncate().normalize()
        } else {
            Vec3::new(0.0, 0.0, -1.0)
        };
        st.backend
            .set_uniform("ldir", UniformValue::Vec4(dir.extend(0.0)));

        let use_spot = match self.spot_mode {
            SpotMode::Auto => (pos.w != 0.0 && self.reference.is_some()) as i32,
            SpotMode::On => 1,
            SpotMode::Off => 0,
        };
        st.backend.set_uniform("useSpot", UniformValue::Int(use_spot));
        st.backend.set_uniform(
            "spotCutoff",
            UniformValue::Float(self.spot_cutoff_deg.to_radians().cos()),
        );
        st.backend
            .set_uniform("spotExponent", UniformValue::Float(self.spot_exponent));
        st.backend
            .set_uniform("att", UniformValue::Vec3(self.attenuation));

        Ok(())
    }
}

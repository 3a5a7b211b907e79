use anyhow::Result;
use glam::Mat4;

use crate::camera::Camera;
use crate::light::LightSpace;
use crate::render::backend::{RenderBackend, UniformValue};
use crate::scene::Scene;
use crate::shader::ShaderId;

/// Per-render traversal context: the accumulated model-matrix stack, the
/// active shader and camera, and the explicitly threaded GPU binding state.
///
/// Lives for exactly one `Scene::render` call. Every `push_matrix` during a
/// traversal is matched by one `pop_matrix` inside the same call frame;
/// that pairing, not a runtime check, is what keeps sibling subtrees from
/// seeing each other's transforms.
pub struct State<'a> {
    stack: Vec<Mat4>,
    shader: Option<ShaderId>,
    camera: &'a Camera,
    pub backend: &'a mut dyn RenderBackend,
}

impl<'a> State<'a> {
    pub fn new(camera: &'a Camera, backend: &'a mut dyn RenderBackend) -> Self {
        Self {
            stack: vec![Mat4::IDENTITY],
            shader: None,
            camera,
            backend,
        }
    }

    /// Duplicates the top of the matrix stack.
    pub fn push_matrix(&mut self) {
        let top = self.top();
        self.stack.push(top);
    }

    /// Right-multiplies the top of the stack by `m`.
    pub fn mult_matrix(&mut self, m: Mat4) {
        let top = self.stack.last_mut().expect("matrix stack is never empty");
        *top = *top * m;
    }

    /// Discards the top, restoring the prior matrix. Popping the seed matrix
    /// would be a traversal bug.
    pub fn pop_matrix(&mut self) {
        debug_assert!(self.stack.len() > 1, "pop_matrix without matching push");
        self.stack.pop();
    }

    /// The accumulated model matrix for the current traversal path.
    pub fn top(&self) -> Mat4 {
        *self.stack.last().expect("matrix stack is never empty")
    }

    /// Current stack depth; traversal balance tests compare it before and
    /// after a render.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn camera(&self) -> &Camera {
        self.camera
    }

    pub fn shader(&self) -> Option<ShaderId> {
        self.shader
    }

    /// Switches the active program; stays in effect for the rest of the
    /// traversal unless another node overrides it.
    pub fn use_shader(&mut self, scene: &Scene, id: ShaderId) -> Result<()> {
        self.backend.use_program(scene.shader(id).program())?;
        self.shader = Some(id);
        Ok(())
    }

    /// Uploads the current model matrix combined with the camera matrices to
    /// the active shader, and (re)loads the shader's light. This runs with
    /// the parent chain's matrices applied, before any child is visited, so
    /// a light bound here sees the node's freshly stored matrix.
    pub fn load_matrices(&mut self, scene: &Scene) -> Result<()> {
        let Some(id) = self.shader else {
            log::trace!("load_matrices with no active shader");
            return Ok(());
        };

        let model = self.top();
        let view = self.camera.view_matrix();
        let proj = self.camera.proj_matrix();

        let shader = scene.shader(id);
        let normal = match shader.lighting_space() {
            LightSpace::Camera => (view * model).inverse().transpose(),
            LightSpace::World => model.inverse().transpose(),
        };

        self.backend.set_uniform("model", UniformValue::Mat4(model));
        self.backend.set_uniform("view", UniformValue::Mat4(view));
        self.backend.set_uniform("proj", UniformValue::Mat4(proj));
        self.backend.set_uniform("normalMat", UniformValue::Mat4(normal));

        if let Some(light_id) = shader.light() {
            scene.light(light_id).load(self, scene)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::trace::TraceBackend;
    use glam::Vec3;

    #[test]
    fn stack_starts_with_identity_seed() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
        let mut backend = TraceBackend::new();
        let state = State::new(&camera, &mut backend);
        assert_eq!(state.depth(), 1);
        assert_eq!(state.top(), Mat4::IDENTITY);
    }

    #[test]
    fn push_mult_pop_restores_prior_top() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
        let mut backend = TraceBackend::new();
        let mut state = State::new(&camera, &mut backend);

        let t = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        state.push_matrix();
        state.mult_matrix(t);
        assert_eq!(state.top(), t);

        state.push_matrix();
        state.mult_matrix(Mat4::from_scale(Vec3::splat(2.0)));
        assert_eq!(state.top(), t * Mat4::from_scale(Vec3::splat(2.0)));

        state.pop_matrix();
        assert_eq!(state.top(), t);
        state.pop_matrix();
        assert_eq!(state.top(), Mat4::IDENTITY);
    }

    #[test]
    fn mult_is_a_right_multiply() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
        let mut backend = TraceBackend::new();
        let mut state = State::new(&camera, &mut backend);

        let a = Mat4::from_translation(Vec3::X);
        let b = Mat4::from_scale(Vec3::splat(3.0));
        state.mult_matrix(a);
        state.mult_matrix(b);
        assert_eq!(state.top(), a * b);
    }
}

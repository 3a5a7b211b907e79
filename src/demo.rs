//! The desk scene: a wooden table with a lamp, a ball, a small cylinder and
//! a paper page, lit by a spotlight attached to the lamp head.

use anyhow::Result;
use glam::{Vec2, Vec3, Vec4};

use crate::appearance::{Appearance, Material, PolygonOffset, Texture};
use crate::builders::{make_lamp, make_table, TableDims};
use crate::camera::Camera;
use crate::light::{Light, LightId, LightSpace};
use crate::node::Node;
use crate::render::backend::{RenderBackend, UniformValue};
use crate::scene::Scene;
use crate::shader::{Shader, ShaderId};
use crate::shape::Shape;
use crate::transform::Transform;

const VIEWER_POS: Vec3 = Vec3::new(2.0, 3.5, 4.0);
const TOP_Y: f32 = 1.1;

const SPOT_CUTOFF_DEG: f32 = 14.0;
const SPOT_EXPONENT: f32 = 32.0;

/// Matches the backend's clear color, so fogged geometry fades into the
/// background.
const FOG_COLOR: Vec3 = Vec3::new(0.06, 0.06, 0.08);

pub struct DemoState {
    pub scene: Scene,
    pub camera: Camera,
    pub light: LightId,
    pub shader: ShaderId,

    clip_enabled: bool,
    clip_keep_above: bool,
    fog_enabled: bool,
    fog_start: f32,
    fog_end: f32,
    rough_factor: f32,
}

impl DemoState {
    pub fn new(backend: &mut dyn RenderBackend) -> Result<Self> {
        let mut scene = Scene::new();

        let mut camera = Camera::new(VIEWER_POS);
        camera.set_center(0.0, TOP_Y, 0.0);
        camera.set_angle(30.0);

        // Spotlight attached to the lamp head below; world space, converted
        // by the shader's camera lighting space at load time.
        let mut light = Light::new(-1.5, 2.5, 2.2, 1.0, LightSpace::World);
        light.set_spotlight(SPOT_CUTOFF_DEG, SPOT_EXPONENT);
        let light = scene.add_light(light);

        let shader = Shader::make(backend, Some(light), LightSpace::Camera)?;
        let shader = scene.add_shader(shader);

        // Shapes, shared between nodes.
        let cube = scene.add_shape(Shape::cube(backend)?);
        let sphere = scene.add_shape(Shape::sphere(backend, 64, 64)?);
        let cylinder = scene.add_shape(Shape::cylinder(backend, 64, 64, true)?);
        let cone = scene.add_shape(Shape::cone(backend, 64, 64, true)?);
        let quad = scene.add_shape(Shape::quad(backend)?);

        // Materials.
        let mat_white = scene.add_appearance(Appearance::Material(Material::new(1.0, 1.0, 1.0)));
        let mat_wood = {
            let mut m = Material::new(0.55, 0.36, 0.20);
            m.set_shininess(16.0);
            scene.add_appearance(Appearance::Material(m))
        };
        let mat_green = {
            let mut m = Material::new(0.20, 0.80, 0.20);
            m.set_shininess(32.0);
            scene.add_appearance(Appearance::Material(m))
        };
        let mat_orange = {
            let mut m = Material::new(1.00, 0.50, 0.00);
            m.set_shininess(24.0);
            scene.add_appearance(Appearance::Material(m))
        };

        // Solid-color decals and roughness maps.
        let tex_white = scene.add_appearance(Appearance::Texture(Texture::solid(
            backend, "decal", Vec3::ONE,
        )?));
        let tex_wood = scene.add_appearance(Appearance::Texture(Texture::solid(
            backend,
            "decal",
            Vec3::new(0.72, 0.52, 0.30),
        )?));
        let tex_paper = scene.add_appearance(Appearance::Texture(Texture::solid(
            backend,
            "decal",
            Vec3::new(0.96, 0.95, 0.90),
        )?));
        let poly_off = scene.add_appearance(Appearance::PolygonOffset(PolygonOffset::new(
            -1.0, -1.0,
        )));
        let rough_default = scene.add_appearance(Appearance::Texture(Texture::solid(
            backend,
            "roughness",
            Vec3::splat(0.8),
        )?));
        let rough_metal = scene.add_appearance(Appearance::Texture(Texture::solid(
            backend,
            "roughness",
            Vec3::splat(0.2),
        )?));
        let rough_wood = scene.add_appearance(Appearance::Texture(Texture::solid(
            backend,
            "roughness",
            Vec3::splat(0.6),
        )?));

        let table = make_table(&mut scene, TOP_Y, &TableDims::default(), mat_wood, tex_wood, cube);
        let table_wrapped = scene.add_node(Node::group(vec![rough_wood], vec![table]));

        let lamp = make_lamp(
            &mut scene,
            backend,
            Vec3::new(-0.55, 0.0, -0.10),
            TOP_Y,
            Vec2::new(0.35, TOP_Y + 0.06),
            cylinder,
            cone,
            Some(light),
        )?;
        let lamp_wrapped = scene.add_node(Node::group(vec![rough_metal], vec![lamp]));

        let trf_ball = Transform::make();
        {
            let mut t = trf_ball.borrow_mut();
            t.translate(0.35, TOP_Y + 0.1, 0.1);
            t.scale(0.06, 0.06, 0.06);
        }
        let ball = scene.add_node(Node::drawable(
            Some(trf_ball),
            vec![mat_green, tex_white],
            sphere,
        ));

        let cyl_h = 0.18;
        let trf_cyl = Transform::make();
        {
            let mut t = trf_cyl.borrow_mut();
            t.translate(-0.3, TOP_Y + 0.5 * cyl_h, -0.05);
            t.scale(0.06, cyl_h, 0.06);
        }
        let cyl_obj = scene.add_node(Node::drawable(
            Some(trf_cyl),
            vec![mat_orange, tex_white],
            cylinder,
        ));

        // Page lying flat on the table top, depth-biased against it.
        let trf_page = Transform::make();
        {
            let mut t = trf_page.borrow_mut();
            t.translate(-0.25, TOP_Y + 0.04, -0.1);
            t.rotate(-90.0, 1.0, 0.0, 0.0);
            t.scale(0.21, 0.30, 1.0);
        }
        let page = scene.add_node(Node::drawable(
            Some(trf_page),
            vec![poly_off, mat_white, tex_paper],
            quad,
        ));

        let mut root = Node::group(
            vec![rough_default],
            vec![table_wrapped, lamp_wrapped, ball, cyl_obj, page],
        );
        root.shader = Some(shader);
        let root = scene.add_node(root);
        scene.set_root(root);

        Ok(Self {
            scene,
            camera,
            light,
            shader,
            clip_enabled: false,
            clip_keep_above: true,
            fog_enabled: true,
            fog_start: 3.0,
            fog_end: 8.0,
            rough_factor: 1.0,
        })
    }

    pub fn update(&mut self, dt: f32) {
        self.scene.update(dt);
    }

    /// Uploads the frame-wide uniforms (fog, roughness, clipping) before the
    /// traversal starts.
    pub fn apply_frame_uniforms(&self, backend: &mut dyn RenderBackend) -> Result<()> {
        backend.use_program(self.scene.shader(self.shader).program())?;

        if self.fog_enabled {
            backend.set_uniform("fogStart", UniformValue::Float(self.fog_start));
            backend.set_uniform("fogEnd", UniformValue::Float(self.fog_end));
        } else {
            // Collapsing the range past the far plane disables fog.
            backend.set_uniform("fogStart", UniformValue::Float(1e9));
            backend.set_uniform("fogEnd", UniformValue::Float(1e9 + 1.0));
        }
        backend.set_uniform("fogColor", UniformValue::Vec3(FOG_COLOR));
        backend.set_uniform("roughFactor", UniformValue::Float(self.rough_factor));
        backend.set_uniform("envStrength", UniformValue::Float(0.0));

        // Horizontal clip plane at the table top, transformed into eye
        // space. Keep-above uses n=(0,1,0), d=-top so y - top >= 0 survives.
        let (n_world, d_world) = if self.clip_keep_above {
            (Vec3::new(0.0, 1.0, 0.0), -TOP_Y)
        } else {
            (Vec3::new(0.0, -1.0, 0.0), TOP_Y)
        };
        let plane_world = Vec4::new(n_world.x, n_world.y, n_world.z, d_world);
        let view = self.camera.view_matrix();
        let plane_eye = view.inverse().transpose() * plane_world;

        backend.set_uniform(
            "clipCount",
            UniformValue::Int(if self.clip_enabled { 1 } else { 0 }),
        );
        let mut planes = vec![Vec4::ZERO; 4];
        planes[0] = plane_eye;
        backend.set_uniform("clipPlane", UniformValue::Vec4Array(planes));
        Ok(())
    }

    pub fn render(&self, backend: &mut dyn RenderBackend) -> Result<()> {
        self.apply_frame_uniforms(backend)?;
        self.scene.render(&self.camera, backend)
    }

    pub fn toggle_clip(&mut self) {
        self.clip_enabled = !self.clip_enabled;
        log::info!(
            "clip {}",
            if self.clip_enabled { "on (table plane)" } else { "off" }
        );
    }

    pub fn toggle_clip_side(&mut self) {
        self.clip_keep_above = !self.clip_keep_above;
        log::info!(
            "clip keeps {} the table",
            if self.clip_keep_above { "above" } else { "below" }
        );
    }

    pub fn toggle_fog(&mut self) {
        self.fog_enabled = !self.fog_enabled;
        log::info!("fog {}", if self.fog_enabled { "on" } else { "off" });
    }

    pub fn adjust_fog_end(&mut self, delta: f32) {
        self.fog_end = (self.fog_end + delta).clamp(self.fog_start + 0.5, 50.0);
        log::info!("fog range [{:.2}, {:.2}]", self.fog_start, self.fog_end);
    }

    pub fn adjust_roughness(&mut self, delta: f32) {
        self.rough_factor = (self.rough_factor + delta).clamp(0.10, 3.00);
        log::info!("roughness factor {:.2}", self.rough_factor);
    }

    pub fn reset_roughness(&mut self) {
        self.rough_factor = 1.0;
        log::info!("roughness factor reset to 1.00");
    }

    /// Scroll zoom: each notch moves the field of view by two degrees.
    pub fn zoom(&mut self, notches: f32) {
        let fov = (self.camera.angle() - notches * 2.0).clamp(15.0, 90.0);
        self.camera.set_angle(fov);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::trace::TraceBackend;

    #[test]
    fn builds_the_full_scene() {
        let mut backend = TraceBackend::new();
        let demo = DemoState::new(&mut backend).expect("demo scene");

        let root = demo.scene.root().expect("root");
        // table, lamp, ball, cylinder, page
        assert_eq!(demo.scene.node(root).children.len(), 5);
        assert!(demo.scene.node(root).shader.is_some());
    }

    #[test]
    fn renders_without_running_out_of_texture_units() {
        let mut backend = TraceBackend::new();
        let demo = DemoState::new(&mut backend).expect("demo scene");
        demo.render(&mut backend).expect("render");
        assert!(!backend.draws.is_empty());
    }

    #[test]
    fn zoom_clamps_to_the_fov_range() {
        let mut backend = TraceBackend::new();
        let mut demo = DemoState::new(&mut backend).expect("demo scene");
        demo.zoom(100.0);
        assert_eq!(demo.camera.angle(), 15.0);
        demo.zoom(-100.0);
        assert_eq!(demo.camera.angle(), 90.0);
    }
}

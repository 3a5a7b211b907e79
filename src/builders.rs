//! Node assembly helpers for the demo scenes.

use anyhow::Result;
use glam::{Vec2, Vec3};

use crate::appearance::{Appearance, AppearanceId, Material, Texture};
use crate::engine::SolarEngine;
use crate::light::LightId;
use crate::node::{Node, NodeId};
use crate::render::backend::RenderBackend;
use crate::scene::Scene;
use crate::shape::ShapeId;
use crate::transform::Transform;

/// Table dimensions: half-extents of the top, top thickness, leg height and
/// leg cross-section.
pub struct TableDims {
    pub top_hx: f32,
    pub top_hz: f32,
    pub top_h: f32,
    pub leg_h: f32,
    pub leg_s: f32,
}

impl Default for TableDims {
    fn default() -> Self {
        Self {
            top_hx: 0.9,
            top_hz: 0.6,
            top_h: 0.08,
            leg_h: 0.72,
            leg_s: 0.10,
        }
    }
}

/// A table standing on the floor with its top surface at `top_y`. The group
/// node carries an identity transform so the caller can place the table by
/// wrapping it in another node.
pub fn make_table(
    scene: &mut Scene,
    top_y: f32,
    dims: &TableDims,
    mat_wood: AppearanceId,
    tex_wood: AppearanceId,
    cube: ShapeId,
) -> NodeId {
    let trf_top = Transform::make();
    {
        let mut t = trf_top.borrow_mut();
        t.translate(0.0, top_y - 0.5 * dims.top_h, 0.0);
        t.scale(2.0 * dims.top_hx, dims.top_h, 2.0 * dims.top_hz);
    }
    let top = scene.add_node(Node::drawable(
        Some(trf_top),
        vec![mat_wood, tex_wood],
        cube,
    ));

    let leg_yc = 0.5 * dims.leg_h;
    let dx = dims.top_hx - 0.5 * dims.leg_s;
    let dz = dims.top_hz - 0.5 * dims.leg_s;

    let mut children = vec![top];
    for (x, z) in [(dx, dz), (dx, -dz), (-dx, dz), (-dx, -dz)] {
        let trf = Transform::make();
        {
            let mut t = trf.borrow_mut();
            t.translate(x, leg_yc, z);
            t.scale(dims.leg_s, dims.leg_h, dims.leg_s);
        }
        children.push(scene.add_node(Node::drawable(Some(trf), vec![mat_wood, tex_wood], cube)));
    }

    let mut table = Node::with_transform(Transform::make());
    table.children = children;
    scene.add_node(table)
}

/// A desk lamp: cylinder base, two arm segments in the XZ=0 plane and a cone
/// head aimed at `head_target_xy`. When `attach_light` is given the light is
/// parented to the head pivot and positioned at the cone mouth, so it points
/// wherever the head points.
#[allow(clippy::too_many_arguments)]
pub fn make_lamp(
    scene: &mut Scene,
    backend: &mut dyn RenderBackend,
    base_pos: Vec3,
    top_y: f32,
    head_target_xy: Vec2,
    cylinder: ShapeId,
    cone: ShapeId,
    attach_light: Option<LightId>,
) -> Result<NodeId> {
    let base_h = 0.05f32;
    let arm_r = 0.045f32;
    let l1 = 0.48f32;
    let l2 = 0.36f32;

    // Arm angles about Z, degrees: a slight lean, then a bend forward.
    let ang1 = 14.0f32;
    let ang2 = -65.0f32;

    let head_scale = 0.65f32;
    let head_r = 0.19 * head_scale;
    let head_h = 0.46 * head_scale;

    // Clearance so the second arm leaves the first by its side instead of
    // intersecting it.
    let eps = 0.003f32;

    let mat_metal = {
        let mut m = Material::new(0.75, 0.75, 0.78);
        m.set_specular(1.0, 1.0, 1.0);
        m.set_shininess(96.0);
        scene.add_appearance(Appearance::Material(m))
    };
    let tex_white = scene.add_appearance(Appearance::Texture(Texture::solid(
        backend,
        "decal",
        Vec3::ONE,
    )?));

    let trf_lamp = Transform::make();
    trf_lamp
        .borrow_mut()
        .translate(base_pos.x, base_pos.y, base_pos.z);

    let trf_base = Transform::make();
    {
        let mut t = trf_base.borrow_mut();
        t.translate(0.0, top_y + 0.5 * base_h, 0.0);
        t.scale(0.16, base_h, 0.16);
    }
    let base = scene.add_node(Node::drawable(
        Some(trf_base),
        vec![mat_metal, tex_white],
        cylinder,
    ));

    // Planar joint chain in XY.
    let r1 = ang1.to_radians();
    let r2 = ang2.to_radians();

    let d1 = Vec2::new(-r1.sin(), r1.cos());
    let n1 = Vec2::new(r1.cos(), r1.sin());

    let j1 = Vec2::new(0.0, top_y + base_h);
    let c1 = j1 + d1 * (0.5 * l1);
    let j2 = j1 + d1 * l1 + n1 * (arm_r + eps);

    let d2 = Vec2::new(-r2.sin(), r2.cos());
    let c2 = j2 + d2 * (0.5 * l2);

    let mat_arm = {
        let mut m = Material::new(1.0, 0.5, 0.0);
        m.set_shininess(24.0);
        scene.add_appearance(Appearance::Material(m))
    };

    let trf_arm1 = Transform::make();
    {
        let mut t = trf_arm1.borrow_mut();
        t.translate(c1.x, c1.y, 0.0);
        t.rotate(ang1, 0.0, 0.0, 1.0);
        t.scale(arm_r, l1, arm_r);
    }
    let arm1 = scene.add_node(Node::drawable(
        Some(trf_arm1),
        vec![mat_arm, tex_white],
        cylinder,
    ));

    // One offset for the whole second segment, applied to the arm and the
    // head alike.
    let arm2_off = Vec3::new(-0.1, -0.1, -0.05);

    let trf_arm2 = Transform::make();
    {
        let mut t = trf_arm2.borrow_mut();
        t.translate(c2.x + arm2_off.x, c2.y + arm2_off.y, arm2_off.z);
        t.rotate(ang2, 0.0, 0.0, 1.0);
        t.scale(arm_r, l2, arm_r);
    }
    let arm2 = scene.add_node(Node::drawable(
        Some(trf_arm2),
        vec![mat_arm, tex_white],
        cylinder,
    ));

    // Head pivot: the cone apex sits at the arm tip, rotated so local -Y
    // (the light direction) crosses the target.
    let j3_xy = j2 + d2 * l2 + Vec2::new(arm2_off.x, arm2_off.y);
    let v = head_target_xy - j3_xy;
    let ang_head = v.x.atan2(-v.y).to_degrees();
    let ang_rad = ang_head.to_radians();

    let y_local = Vec2::new(-ang_rad.sin(), ang_rad.cos());
    let head_center = j3_xy - y_local * (0.5 * head_h);

    let trf_head_pivot = Transform::make();
    {
        let mut t = trf_head_pivot.borrow_mut();
        t.translate(head_center.x - 0.03, head_center.y + 0.03, arm2_off.z);
        t.rotate(ang_head, 0.0, 0.0, 1.0);
    }
    let head_pivot = scene.add_node(Node::with_transform(trf_head_pivot));

    let trf_head_geom = Transform::make();
    trf_head_geom.borrow_mut().scale(head_r, head_h, head_r);
    let mat_head = {
        let mut m = Material::new(0.05, 0.10, 0.30);
        m.set_shininess(32.0);
        scene.add_appearance(Appearance::Material(m))
    };
    let head_geom = scene.add_node(Node::drawable(
        Some(trf_head_geom),
        vec![mat_head, tex_white],
        cone,
    ));
    scene.add_child(head_pivot, head_geom);

    if let Some(light) = attach_light {
        let light = scene.light_mut(light);
        light.set_reference(Some(head_pivot));
        // Local position at the cone mouth; w of 1 makes it positional.
        light.set_position(0.0, 0.5 * head_h, 0.0, 1.0);
    }

    let mut lamp = Node::with_transform(trf_lamp);
    lamp.children = vec![base, arm1, arm2, head_pivot];
    Ok(scene.add_node(lamp))
}

/// A sun with orbiting earth, moon and mercury, animated by a registered
/// `SolarEngine`. Orbit pivots are bare group nodes whose transforms the
/// engine rotates about +Z.
pub fn make_solar(
    scene: &mut Scene,
    backend: &mut dyn RenderBackend,
    sphere: ShapeId,
) -> Result<NodeId> {
    let earth_radius = 2.5f32;
    let moon_radius = 0.8f32;
    let mercury_radius = 1.4f32;

    let mat_neutral = scene.add_appearance(Appearance::Material(Material::new(1.0, 1.0, 1.0)));
    let tex_sun = scene.add_appearance(Appearance::Texture(Texture::solid(
        backend,
        "decal",
        Vec3::new(1.0, 0.95, 0.3),
    )?));
    let tex_earth = scene.add_appearance(Appearance::Texture(Texture::solid(
        backend,
        "decal",
        Vec3::new(0.2, 0.4, 0.9),
    )?));
    let tex_moon = scene.add_appearance(Appearance::Texture(Texture::solid(
        backend,
        "decal",
        Vec3::splat(0.7),
    )?));
    let tex_mercury = scene.add_appearance(Appearance::Texture(Texture::solid(
        backend,
        "decal",
        Vec3::new(0.6, 0.5, 0.4),
    )?));

    let planet = |scene: &mut Scene, scale: f32, material, texture| {
        let trf = Transform::make();
        trf.borrow_mut().scale(scale, scale, scale);
        scene.add_node(Node::drawable(Some(trf), vec![material, texture], sphere))
    };

    let sun_geom = planet(scene, 1.3, mat_neutral, tex_sun);

    // Earth chain: orbit pivot -> translate to orbit radius -> spin pivot
    // -> geometry. The moon orbits the translate node so it follows the
    // earth around the sun.
    let earth_orbit_trf = Transform::make();
    let earth_spin_trf = Transform::make();
    let earth_geom = planet(scene, 0.6, mat_neutral, tex_earth);
    let earth_spin = scene.add_node(Node::with_transform(earth_spin_trf.clone()));
    scene.add_child(earth_spin, earth_geom);

    let trf_earth_translate = Transform::make();
    trf_earth_translate
        .borrow_mut()
        .translate(earth_radius, 0.0, 0.0);
    let earth_translate = scene.add_node(Node::with_transform(trf_earth_translate));
    scene.add_child(earth_translate, earth_spin);

    let earth_orbit = scene.add_node(Node::with_transform(earth_orbit_trf.clone()));
    scene.add_child(earth_orbit, earth_translate);

    let moon_orbit_trf = Transform::make();
    let trf_moon = Transform::make();
    {
        let mut t = trf_moon.borrow_mut();
        t.translate(moon_radius, 0.0, 0.0);
        t.scale(0.25, 0.25, 0.25);
    }
    let moon = scene.add_node(Node::drawable(
        Some(trf_moon),
        vec![mat_neutral, tex_moon],
        sphere,
    ));
    let moon_orbit = scene.add_node(Node::with_transform(moon_orbit_trf.clone()));
    scene.add_child(moon_orbit, moon);
    scene.add_child(earth_translate, moon_orbit);

    let mercury_orbit_trf = Transform::make();
    let trf_mercury = Transform::make();
    {
        let mut t = trf_mercury.borrow_mut();
        t.translate(mercury_radius, 0.0, 0.0);
        t.scale(0.35, 0.35, 0.35);
    }
    let mercury = scene.add_node(Node::drawable(
        Some(trf_mercury),
        vec![mat_neutral, tex_mercury],
        sphere,
    ));
    let mercury_orbit = scene.add_node(Node::with_transform(mercury_orbit_trf.clone()));
    scene.add_child(mercury_orbit, mercury);

    let mut sun = Node::new();
    sun.children = vec![sun_geom, earth_orbit, mercury_orbit];
    let sun = scene.add_node(sun);

    scene.add_engine(Box::new(SolarEngine::new(
        earth_orbit_trf,
        earth_spin_trf,
        moon_orbit_trf,
        mercury_orbit_trf,
    )));

    Ok(sun)
}

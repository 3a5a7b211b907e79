//! Scene-walk behavior observed through a recording backend: matrix
//! composition, sibling isolation, light addressing and engine-driven
//! animation.

use approx::assert_relative_eq;
use glam::{Mat4, Vec3, Vec4};

use arbor::appearance::{Appearance, Material, Texture};
use arbor::camera::Camera;
use arbor::engine::OrbitEngine;
use arbor::light::{Light, LightSpace, SpotMode};
use arbor::node::Node;
use arbor::render::backend::UniformValue;
use arbor::render::trace::TraceBackend;
use arbor::scene::Scene;
use arbor::shader::Shader;
use arbor::shape::{Shape, ShapeId};
use arbor::transform::{Transform, TransformPtr};

fn camera() -> Camera {
    Camera::new(Vec3::new(0.0, 0.0, 5.0))
}

fn scene_with_quad(backend: &mut TraceBackend) -> (Scene, ShapeId) {
    let mut scene = Scene::new();
    let quad = scene.add_shape(Shape::quad(backend).expect("quad"));
    (scene, quad)
}

fn model_of(backend: &TraceBackend, draw: usize) -> Mat4 {
    backend.draws[draw]
        .uniform("model")
        .and_then(UniformValue::as_mat4)
        .expect("model uniform")
}

fn translation(x: f32, y: f32, z: f32) -> TransformPtr {
    let trf = Transform::make();
    trf.borrow_mut().translate(x, y, z);
    trf
}

#[test]
fn nested_transforms_compose_parent_to_child() {
    let mut backend = TraceBackend::new();
    let (mut scene, quad) = scene_with_quad(&mut backend);
    let shader = scene.add_shader(Shader::make(&mut backend, None, LightSpace::World).unwrap());

    let leaf = scene.add_node(Node::drawable(
        Some(translation(0.0, 0.0, 3.0)),
        vec![],
        quad,
    ));
    let mid = scene.add_node(Node::drawable(
        Some(translation(0.0, 2.0, 0.0)),
        vec![],
        quad,
    ));
    scene.add_child(mid, leaf);

    let mut root = Node::with_transform(translation(1.0, 0.0, 0.0));
    root.shader = Some(shader);
    let root = scene.add_node(root);
    scene.add_child(root, mid);
    scene.set_root(root);

    scene.render(&camera(), &mut backend).unwrap();

    assert_eq!(backend.draws.len(), 2);
    let expected_mid = Mat4::from_translation(Vec3::new(1.0, 2.0, 0.0));
    let expected_leaf = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(model_of(&backend, 0), expected_mid);
    assert_eq!(model_of(&backend, 1), expected_leaf);
}

#[test]
fn sibling_after_deep_subtree_sees_only_its_own_transform() {
    let mut backend = TraceBackend::new();
    let (mut scene, quad) = scene_with_quad(&mut backend);
    let shader = scene.add_shader(Shader::make(&mut backend, None, LightSpace::World).unwrap());

    // Three-deep chain, then a sibling of the chain's head.
    let c = scene.add_node(Node::drawable(Some(translation(0.0, 0.0, 1.0)), vec![], quad));
    let b = scene.add_node(Node::with_transform(translation(0.0, 1.0, 0.0)));
    scene.add_child(b, c);
    let a = scene.add_node(Node::with_transform(translation(1.0, 0.0, 0.0)));
    scene.add_child(a, b);

    let sibling = scene.add_node(Node::drawable(
        Some(translation(-7.0, 0.0, 0.0)),
        vec![],
        quad,
    ));

    let mut root = Node::new();
    root.shader = Some(shader);
    let root = scene.add_node(root);
    scene.add_child(root, a);
    scene.add_child(root, sibling);
    scene.set_root(root);

    scene.render(&camera(), &mut backend).unwrap();

    assert_eq!(backend.draws.len(), 2);
    assert_eq!(
        model_of(&backend, 0),
        Mat4::from_translation(Vec3::new(1.0, 1.0, 1.0))
    );
    // Nothing from the chain leaks into the sibling.
    assert_eq!(
        model_of(&backend, 1),
        Mat4::from_translation(Vec3::new(-7.0, 0.0, 0.0))
    );
}

#[test]
fn material_on_one_sibling_is_restored_for_the_next() {
    let mut backend = TraceBackend::new();
    let (mut scene, quad) = scene_with_quad(&mut backend);
    let shader = scene.add_shader(Shader::make(&mut backend, None, LightSpace::World).unwrap());

    let red = scene.add_appearance(Appearance::Material(Material::new(1.0, 0.0, 0.0)));
    let green = scene.add_appearance(Appearance::Material(Material::new(0.0, 1.0, 0.0)));

    let first = scene.add_node(Node::drawable(None, vec![green], quad));
    let second = scene.add_node(Node::drawable(None, vec![], quad));

    let mut root = Node::group(vec![red], vec![first, second]);
    root.shader = Some(shader);
    root.shape = Some(quad);
    let root = scene.add_node(root);
    scene.set_root(root);

    scene.render(&camera(), &mut backend).unwrap();

    let diffuse = |draw: usize| {
        backend.draws[draw]
            .uniform("mdif")
            .and_then(UniformValue::as_vec4)
            .expect("mdif uniform")
    };
    // Root and the second child render red; the green material stays inside
    // the first child.
    assert_eq!(diffuse(0), Vec4::new(1.0, 0.0, 0.0, 1.0));
    assert_eq!(diffuse(1), Vec4::new(0.0, 1.0, 0.0, 1.0));
    assert_eq!(diffuse(2), Vec4::new(1.0, 0.0, 0.0, 1.0));
}

#[test]
fn material_under_a_bare_root_does_not_leak_to_the_next_sibling() {
    let mut backend = TraceBackend::new();
    let (mut scene, quad) = scene_with_quad(&mut backend);
    let shader = scene.add_shader(Shader::make(&mut backend, None, LightSpace::World).unwrap());

    let green = scene.add_appearance(Appearance::Material(Material::new(0.0, 1.0, 0.0)));
    let first = scene.add_node(Node::drawable(None, vec![green], quad));
    let second = scene.add_node(Node::drawable(None, vec![], quad));

    // No material anywhere above the siblings.
    let mut root = Node::group(vec![], vec![first, second]);
    root.shader = Some(shader);
    let root = scene.add_node(root);
    scene.set_root(root);

    scene.render(&camera(), &mut backend).unwrap();

    assert_eq!(backend.draws.len(), 2);
    assert_eq!(
        backend.draws[0]
            .uniform("mdif")
            .and_then(UniformValue::as_vec4),
        Some(Vec4::new(0.0, 1.0, 0.0, 1.0))
    );
    // The material uniforms return to their never-written state, so the
    // second sibling draws exactly what it would have drawn first.
    assert!(backend.draws[1].uniform("mdif").is_none());
    assert!(backend.draws[1].uniform("mamb").is_none());
    assert!(backend.draws[1].uniform("mshi").is_none());
}

#[test]
fn inner_decal_overrides_and_releases_the_outer_one() {
    let mut backend = TraceBackend::new();
    let (mut scene, quad) = scene_with_quad(&mut backend);
    let shader = scene.add_shader(Shader::make(&mut backend, None, LightSpace::World).unwrap());

    let outer_tex = Texture::solid(&mut backend, "decal", Vec3::ONE).unwrap();
    let inner_tex = Texture::solid(&mut backend, "decal", Vec3::ZERO).unwrap();
    let outer = scene.add_appearance(Appearance::Texture(outer_tex));
    let inner = scene.add_appearance(Appearance::Texture(inner_tex));

    let first = scene.add_node(Node::drawable(None, vec![inner], quad));
    let second = scene.add_node(Node::drawable(None, vec![], quad));

    let mut root = Node::group(vec![outer], vec![first, second]);
    root.shader = Some(shader);
    let root = scene.add_node(root);
    scene.set_root(root);

    scene.render(&camera(), &mut backend).unwrap();

    assert_eq!(backend.draws.len(), 2);
    let decal0 = backend.draws[0].texture("decal");
    let decal1 = backend.draws[1].texture("decal");
    assert_ne!(decal0, decal1);
    // All units released once the traversal is over.
    assert_eq!(backend.bound_units(), 0);
}

#[test]
fn spot_term_follows_the_auto_rule_and_overrides() {
    let mut backend = TraceBackend::new();
    let (mut scene, quad) = scene_with_quad(&mut backend);

    let light = scene.add_light(Light::new(0.0, 2.0, 0.0, 1.0, LightSpace::World));
    let shader = scene.add_shader(
        Shader::make(&mut backend, Some(light), LightSpace::World).unwrap(),
    );

    let reference = scene.add_node(Node::drawable(None, vec![], quad));
    let mut root = Node::new();
    root.shader = Some(shader);
    let root = scene.add_node(root);
    scene.add_child(root, reference);
    scene.set_root(root);

    let use_spot = |backend: &TraceBackend| {
        backend
            .draws
            .last()
            .and_then(|d| d.uniform("useSpot"))
            .and_then(UniformValue::as_int)
            .expect("useSpot uniform")
    };

    // Positional but unreferenced: no spot.
    scene.render(&camera(), &mut backend).unwrap();
    assert_eq!(use_spot(&backend), 0);

    // Positional and referenced: spot.
    scene.light_mut(light).set_reference(Some(reference));
    scene.render(&camera(), &mut backend).unwrap();
    assert_eq!(use_spot(&backend), 1);

    // Directional kills the auto spot even with a reference.
    scene.light_mut(light).set_position(0.0, 2.0, 0.0, 0.0);
    scene.render(&camera(), &mut backend).unwrap();
    assert_eq!(use_spot(&backend), 0);

    // Explicit overrides beat the rule in both directions.
    scene.light_mut(light).set_spot_mode(SpotMode::On);
    scene.render(&camera(), &mut backend).unwrap();
    assert_eq!(use_spot(&backend), 1);

    scene.light_mut(light).set_position(0.0, 2.0, 0.0, 1.0);
    scene.light_mut(light).set_spot_mode(SpotMode::Off);
    scene.render(&camera(), &mut backend).unwrap();
    assert_eq!(use_spot(&backend), 0);
}

#[test]
fn light_reference_rendered_later_lags_one_frame() {
    let mut backend = TraceBackend::new();
    let (mut scene, quad) = scene_with_quad(&mut backend);

    let light = scene.add_light(Light::new(0.0, 0.0, 0.0, 1.0, LightSpace::World));
    let shader = scene.add_shader(
        Shader::make(&mut backend, Some(light), LightSpace::World).unwrap(),
    );

    let reference = scene.add_node(Node::drawable(
        Some(translation(5.0, 0.0, 0.0)),
        vec![],
        quad,
    ));
    scene.light_mut(light).set_reference(Some(reference));

    // The shader activates at the root, before the reference node has been
    // visited this frame.
    let mut root = Node::drawable(None, vec![], quad);
    root.shader = Some(shader);
    let root = scene.add_node(root);
    scene.add_child(root, reference);
    scene.set_root(root);

    let cam = camera();
    let lpos_at = |backend: &TraceBackend, draw: usize| {
        backend.draws[draw]
            .uniform("lpos")
            .and_then(UniformValue::as_vec4)
            .expect("lpos uniform")
    };

    scene.render(&cam, &mut backend).unwrap();
    // Frame 1, root draw: the reference has never been traversed, so the
    // light still sits at its untransformed position.
    assert_eq!(lpos_at(&backend, 0), Vec4::new(0.0, 0.0, 0.0, 1.0));
    // Same frame, reference draw: its matrix was stored just before the
    // light reloaded.
    assert_eq!(lpos_at(&backend, 1), Vec4::new(5.0, 0.0, 0.0, 1.0));

    scene.render(&cam, &mut backend).unwrap();
    // Frame 2, root draw: last frame's reference matrix.
    assert_eq!(lpos_at(&backend, 2), Vec4::new(5.0, 0.0, 0.0, 1.0));
}

#[test]
fn shader_override_stays_active_for_later_siblings() {
    let mut backend = TraceBackend::new();
    let (mut scene, quad) = scene_with_quad(&mut backend);
    let base = scene.add_shader(Shader::make(&mut backend, None, LightSpace::World).unwrap());
    let other = scene.add_shader(Shader::make(&mut backend, None, LightSpace::World).unwrap());

    let mut override_node = Node::drawable(None, vec![], quad);
    override_node.shader = Some(other);
    let override_node = scene.add_node(override_node);
    let after = scene.add_node(Node::drawable(None, vec![], quad));

    let mut root = Node::drawable(None, vec![], quad);
    root.shader = Some(base);
    let root = scene.add_node(root);
    scene.add_child(root, override_node);
    scene.add_child(root, after);
    scene.set_root(root);

    scene.render(&camera(), &mut backend).unwrap();

    let programs: Vec<_> = backend.draws.iter().map(|d| d.program).collect();
    let base_program = scene.shader(base).program();
    let other_program = scene.shader(other).program();
    // The override is not undone when its subtree ends.
    assert_eq!(
        programs,
        vec![
            Some(base_program),
            Some(other_program),
            Some(other_program)
        ]
    );
}

#[test]
fn shader_wrapping_an_existing_program_can_gain_a_light_later() {
    let mut backend = TraceBackend::new();
    let (mut scene, quad) = scene_with_quad(&mut backend);
    let base = scene.add_shader(Shader::make(&mut backend, None, LightSpace::World).unwrap());

    // Second shader over the same compiled program, initially unlit.
    let program = scene.shader(base).program();
    let lit = scene.add_shader(Shader::from_program(program, None, LightSpace::World));

    let root = scene.add_node(Node::drawable(None, vec![], quad));
    scene.node_mut(root).shader = Some(lit);
    scene.set_root(root);

    let cam = camera();
    scene.render(&cam, &mut backend).unwrap();
    assert_eq!(backend.draws[0].program, Some(program));
    assert!(backend.draws[0].uniform("ldif").is_none());

    let mut light = Light::new(0.0, 2.0, 0.0, 1.0, LightSpace::World);
    light.set_diffuse(0.9, 0.8, 0.7);
    let light = scene.add_light(light);
    scene.shader_mut(lit).set_light(Some(light));

    scene.render(&cam, &mut backend).unwrap();
    assert_eq!(
        backend.draws[1]
            .uniform("ldif")
            .and_then(UniformValue::as_vec4),
        Some(Vec4::new(0.9, 0.8, 0.7, 1.0))
    );
}

#[test]
fn engine_rotation_reaches_the_next_frame_model_matrix() {
    let mut backend = TraceBackend::new();
    let (mut scene, quad) = scene_with_quad(&mut backend);
    let shader = scene.add_shader(Shader::make(&mut backend, None, LightSpace::World).unwrap());

    let trf = Transform::make();
    let node = scene.add_node(Node::drawable(Some(trf.clone()), vec![], quad));
    let mut root = Node::new();
    root.shader = Some(shader);
    let root = scene.add_node(root);
    scene.add_child(root, node);
    scene.set_root(root);

    scene.add_engine(Box::new(OrbitEngine::new(trf, 90.0, Vec3::Z)));

    let cam = camera();
    scene.render(&cam, &mut backend).unwrap();
    assert_eq!(model_of(&backend, 0), Mat4::IDENTITY);

    // One second at 90 deg/s maps +X to +Y.
    scene.update(1.0);
    scene.render(&cam, &mut backend).unwrap();
    let rotated = model_of(&backend, 1) * Vec4::new(1.0, 0.0, 0.0, 0.0);
    assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-5);
    assert_relative_eq!(rotated.y, 1.0, epsilon = 1e-5);
}

use anyhow::Result;
use id_arena::Arena;

use crate::appearance::{Appearance, AppearanceId};
use crate::camera::Camera;
use crate::engine::Engine;
use crate::light::{Light, LightId};
use crate::node::{Node, NodeId};
use crate::render::backend::RenderBackend;
use crate::shader::{Shader, ShaderId};
use crate::shape::{Shape, ShapeId};
use crate::state::State;

/// Owns the node graph and every resource it references (appearances,
/// shapes, shaders, lights), plus the engines animating it. Handles are
/// plain arena ids, so a shape or appearance added once can decorate any
/// number of nodes, and the append-only child lists keep the graph a tree
/// by construction.
pub struct Scene {
    nodes: Arena<Node>,
    appearances: Arena<Appearance>,
    shapes: Arena<Shape>,
    shaders: Arena<Shader>,
    lights: Arena<Light>,
    engines: Vec<Box<dyn Engine>>,
    root: Option<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            appearances: Arena::new(),
            shapes: Arena::new(),
            shaders: Arena::new(),
            lights: Arena::new(),
            engines: Vec::new(),
            root: None,
        }
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.nodes.alloc(node)
    }

    /// Appends `child` to `parent`'s ordered child list.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent].children.push(child);
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn add_appearance(&mut self, appearance: Appearance) -> AppearanceId {
        self.appearances.alloc(appearance)
    }

    pub fn appearance(&self, id: AppearanceId) -> &Appearance {
        &self.appearances[id]
    }

    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        self.shapes.alloc(shape)
    }

    pub fn shape(&self, id: ShapeId) -> &Shape {
        &self.shapes[id]
    }

    pub fn add_shader(&mut self, shader: Shader) -> ShaderId {
        self.shaders.alloc(shader)
    }

    pub fn shader(&self, id: ShaderId) -> &Shader {
        &self.shaders[id]
    }

    pub fn shader_mut(&mut self, id: ShaderId) -> &mut Shader {
        &mut self.shaders[id]
    }

    pub fn add_light(&mut self, light: Light) -> LightId {
        self.lights.alloc(light)
    }

    pub fn light(&self, id: LightId) -> &Light {
        &self.lights[id]
    }

    pub fn light_mut(&mut self, id: LightId) -> &mut Light {
        &mut self.lights[id]
    }

    pub fn add_engine(&mut self, engine: Box<dyn Engine>) {
        self.engines.push(engine);
    }

    /// Runs every engine in registration order. Engines sharing a transform
    /// compose in that order; nothing else about their relative order is
    /// guaranteed.
    pub fn update(&mut self, dt: f32) {
        for engine in &mut self.engines {
            engine.update(dt);
        }
    }

    /// Renders one frame: a fresh traversal context seeded with the
    /// identity matrix and the given camera, then a depth-first walk from
    /// the root.
    pub fn render(&self, camera: &Camera, backend: &mut dyn RenderBackend) -> Result<()> {
        let Some(root) = self.root else {
            log::warn!("render called on a scene without a root node");
            return Ok(());
        };

        let mut state = State::new(camera, backend);
        self.render_node(root, &mut state)
    }

    /// Depth-first node traversal:
    /// 1. apply the node's shader override, if any;
    /// 2. push the matrix stack and multiply in the node's transform;
    /// 3. store the node's model matrix and upload matrices (which also
    ///    reloads the active shader's light);
    /// 4. load appearances in list order;
    /// 5. draw the node's shape, if any;
    /// 6. recurse into children in list order;
    /// 7. unload appearances in reverse order;
    /// 8. pop the matrix stack.
    /// The push/pop pair and the reverse unloads are what isolate sibling
    /// subtrees from each other.
    fn render_node(&self, id: NodeId, st: &mut State) -> Result<()> {
        let node = &self.nodes[id];

        if let Some(shader) = node.shader {
            st.use_shader(self, shader)?;
        }

        st.push_matrix();
        if let Some(transform) = &node.transform {
            st.mult_matrix(transform.borrow().matrix());
        }
        node.store_model_matrix(st.top());
        st.load_matrices(self)?;

        for &appearance in &node.appearances {
            self.appearances[appearance].load(st)?;
        }

        if let Some(shape) = node.shape {
            self.shapes[shape].draw(st, self)?;
        }

        for &child in &node.children {
            self.render_node(child, st)?;
        }

        for &appearance in node.appearances.iter().rev() {
            self.appearances[appearance].unload(st);
        }

        st.pop_matrix();
        Ok(())
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

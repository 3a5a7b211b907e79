use std::cell::Cell;

use glam::Mat4;
use id_arena::Id;

use crate::appearance::AppearanceId;
use crate::shader::ShaderId;
use crate::shape::ShapeId;
use crate::transform::TransformPtr;

pub type NodeId = Id<Node>;

/// Composite scene-graph element: an optional local transform, an ordered
/// appearance list, an optional shape, an ordered child list and an
/// optional shader override for the subtree it roots.
///
/// A node without a transform behaves as identity; a node without a shape
/// only contributes grouping, transform and appearance context to its
/// descendants.
pub struct Node {
    pub transform: Option<TransformPtr>,
    pub appearances: Vec<AppearanceId>,
    pub shape: Option<ShapeId>,
    pub shader: Option<ShaderId>,
    pub children: Vec<NodeId>,
    /// World matrix most recently computed for this node by a traversal.
    /// Lights referencing this node read it at load time, so its freshness
    /// depends on traversal order (see `Light`).
    model_matrix: Cell<Mat4>,
}

impl Node {
    pub fn new() -> Self {
        Self {
            transform: None,
            appearances: Vec::new(),
            shape: None,
            shader: None,
            children: Vec::new(),
            model_matrix: Cell::new(Mat4::IDENTITY),
        }
    }

    pub fn with_transform(transform: TransformPtr) -> Self {
        Self {
            transform: Some(transform),
            ..Self::new()
        }
    }

    /// Leaf constructor: transform, appearance list, shape.
    pub fn drawable(
        transform: Option<TransformPtr>,
        appearances: Vec<AppearanceId>,
        shape: ShapeId,
    ) -> Self {
        Self {
            transform,
            appearances,
            shape: Some(shape),
            ..Self::new()
        }
    }

    /// Group constructor: appearance context wrapped around children.
    pub fn group(appearances: Vec<AppearanceId>, children: Vec<NodeId>) -> Self {
        Self {
            appearances,
            children,
            ..Self::new()
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix.get()
    }

    pub(crate) fn store_model_matrix(&self, m: Mat4) {
        self.model_matrix.set(m);
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

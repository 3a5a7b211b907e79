use anyhow::Result;
use id_arena::Id;

use crate::light::{LightId, LightSpace};
use crate::render::backend::{ProgramHandle, RenderBackend};

pub type ShaderId = Id<Shader>;

/// The WGSL program every scene shader compiles by default.
pub const SCENE_SHADER_SOURCE: &str = include_str!("shaders/scene.wgsl");

/// Couples a compiled program with at most one light and the coordinate
/// space its lighting math expects. Uniform writes and texture-unit
/// bookkeeping go through the backend; names the program does not declare
/// are dropped there.
pub struct Shader {
    program: ProgramHandle,
    light: Option<LightId>,
    lighting_space: LightSpace,
}

impl Shader {
    /// Compiles the default scene program.
    pub fn make(
        backend: &mut dyn RenderBackend,
        light: Option<LightId>,
        lighting_space: LightSpace,
    ) -> Result<Self> {
        let program = backend.create_program(SCENE_SHADER_SOURCE)?;
        Ok(Self {
            program,
            light,
            lighting_space,
        })
    }

    /// Wraps an already compiled program, for subtrees that render with
    /// their own shader (skybox-style overrides).
    pub fn from_program(
        program: ProgramHandle,
        light: Option<LightId>,
        lighting_space: LightSpace,
    ) -> Self {
        Self {
            program,
            light,
            lighting_space,
        }
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn light(&self) -> Option<LightId> {
        self.light
    }

    pub fn set_light(&mut self, light: Option<LightId>) {
        self.light = light;
    }

    pub fn lighting_space(&self) -> LightSpace {
        self.lighting_space
    }
}

//! Shader and shader program resources.

use std::sync::Arc;

use crate::layout::VertexLayout;
use crate::types::ShaderStage;

use super::{ResourceId, impl_graphics_resource};

/// One compiled shader stage.
#[derive(Debug)]
pub struct Shader {
    pub(crate) id: ResourceId,
    stage: ShaderStage,
}

impl Shader {
    pub(crate) fn new(id: ResourceId, stage: ShaderStage) -> Self {
        Self { id, stage }
    }

    /// Pipeline stage of the shader.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl_graphics_resource!(Shader, Shader);

/// A shader program.
///
/// Programs are created empty, receive shaders through
/// [`GraphicsDevice::attach_shader`](crate::GraphicsDevice::attach_shader) and
/// must be linked before they can be made current.
#[derive(Debug)]
pub struct ShaderProgram {
    pub(crate) id: ResourceId,
    layout: Arc<VertexLayout>,
    pub(crate) linked: bool,
}

impl ShaderProgram {
    pub(crate) fn new(id: ResourceId, layout: Arc<VertexLayout>) -> Self {
        Self {
            id,
            layout,
            linked: false,
        }
    }

    /// Vertex layout the program's inputs expect.
    pub fn layout(&self) -> &Arc<VertexLayout> {
        &self.layout
    }

    /// Whether the program has been linked successfully.
    pub fn is_linked(&self) -> bool {
        self.linked
    }
}

impl_graphics_resource!(ShaderProgram, ShaderProgram);

static_assertions::assert_impl_all!(Shader: Send, Sync);
static_assertions::assert_impl_all!(ShaderProgram: Send, Sync);

//! Vertex array resource.

use std::sync::Arc;

use crate::layout::VertexLayout;

use super::{ResourceId, impl_graphics_resource};

/// A vertex buffer and optional index buffer bound under one layout.
///
/// The array refers to its buffers by id and does not own them: both buffers
/// must stay alive for as long as the array is drawn.
#[derive(Debug)]
pub struct VertexArray {
    pub(crate) id: ResourceId,
    vertex_buffer: ResourceId,
    index_buffer: Option<ResourceId>,
    layout: Arc<VertexLayout>,
}

impl VertexArray {
    pub(crate) fn new(
        id: ResourceId,
        vertex_buffer: ResourceId,
        index_buffer: Option<ResourceId>,
        layout: Arc<VertexLayout>,
    ) -> Self {
        Self {
            id,
            vertex_buffer,
            index_buffer,
            layout,
        }
    }

    /// Id of the vertex buffer.
    pub fn vertex_buffer(&self) -> ResourceId {
        self.vertex_buffer
    }

    /// Id of the index buffer, if any.
    pub fn index_buffer(&self) -> Option<ResourceId> {
        self.index_buffer
    }

    /// Layout of the vertex buffer.
    pub fn layout(&self) -> &Arc<VertexLayout> {
        &self.layout
    }

    /// Whether the array can be drawn with indexed draws.
    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }
}

impl_graphics_resource!(VertexArray, VertexArray);

static_assertions::assert_impl_all!(VertexArray: Send, Sync);

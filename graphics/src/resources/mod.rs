//! GPU resources.
//!
//! This module contains the resource handles created by [`GraphicsDevice`]:
//! - [`Buffer`] - vertex or index data
//! - [`Texture2D`] - sampled image
//! - [`Shader`] / [`ShaderProgram`] - compiled stages and linked programs
//! - [`VertexArray`] - buffers bound under a vertex layout
//! - [`RenderTarget`] - off-screen color (and depth) target
//!
//! Handles are plain ids into the device's [`ResourceRegistry`]. They are not
//! `Clone`: releasing a resource consumes its handle, so a resource cannot be
//! freed twice through safe code paths.
//!
//! [`GraphicsDevice`]: crate::GraphicsDevice

mod buffer;
mod registry;
mod render_target;
mod shader;
mod texture;
mod vertex_array;

pub use buffer::Buffer;
pub use registry::{
    GpuHandle, RawResource, ResourceId, ResourceKind, ResourceRegistry, ResourceState,
};
pub use render_target::RenderTarget;
pub use shader::{Shader, ShaderProgram};
pub use texture::Texture2D;
pub use vertex_array::VertexArray;

/// Common interface of every device-created resource.
pub trait GraphicsResource {
    /// Registry id of the resource.
    fn id(&self) -> ResourceId;

    /// Kind of GPU object.
    fn kind(&self) -> ResourceKind;
}

macro_rules! impl_graphics_resource {
    ($ty:ty, $kind:ident) => {
        impl $crate::resources::GraphicsResource for $ty {
            fn id(&self) -> $crate::resources::ResourceId {
                self.id
            }

            fn kind(&self) -> $crate::resources::ResourceKind {
                $crate::resources::ResourceKind::$kind
            }
        }
    };
}
pub(crate) use impl_graphics_resource;

static_assertions::assert_impl_all!(ResourceId: Send, Sync, Copy);

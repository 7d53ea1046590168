//! Off-screen render target resource.

use super::{ResourceId, Texture2D, impl_graphics_resource};

/// A framebuffer with a color texture and an optional depth buffer.
///
/// The color texture belongs to the target: it can be bound for sampling
/// through [`RenderTarget::texture`] and is destroyed together with the
/// target.
#[derive(Debug)]
pub struct RenderTarget {
    pub(crate) id: ResourceId,
    texture: Texture2D,
    has_depth: bool,
}

impl RenderTarget {
    pub(crate) fn new(id: ResourceId, texture: Texture2D, has_depth: bool) -> Self {
        Self {
            id,
            texture,
            has_depth,
        }
    }

    /// Color attachment.
    pub fn texture(&self) -> &Texture2D {
        &self.texture
    }

    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    /// Whether a depth buffer is attached.
    pub fn has_depth(&self) -> bool {
        self.has_depth
    }
}

impl_graphics_resource!(RenderTarget, RenderTarget);

static_assertions::assert_impl_all!(RenderTarget: Send, Sync);

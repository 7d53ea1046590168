//! GPU texture resource.

use crate::types::{PixelFormat, TextureDescriptor, TextureFilter, TextureWrap};

use super::{ResourceId, impl_graphics_resource};

/// A 2D texture.
///
/// Created by [`GraphicsDevice::create_texture`](crate::GraphicsDevice::create_texture),
/// or owned by a [`RenderTarget`](super::RenderTarget) as its color attachment.
pub struct Texture2D {
    pub(crate) id: ResourceId,
    descriptor: TextureDescriptor,
}

impl Texture2D {
    pub(crate) fn new(id: ResourceId, descriptor: TextureDescriptor) -> Self {
        Self { id, descriptor }
    }

    /// Get the texture descriptor.
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    pub fn width(&self) -> u32 {
        self.descriptor.width
    }

    pub fn height(&self) -> u32 {
        self.descriptor.height
    }

    pub fn format(&self) -> PixelFormat {
        self.descriptor.format
    }

    pub fn mip_levels(&self) -> u32 {
        self.descriptor.mip_levels
    }

    pub fn filter(&self) -> TextureFilter {
        self.descriptor.filter
    }

    pub fn wrap(&self) -> TextureWrap {
        self.descriptor.wrap
    }

    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }

    pub(crate) fn set_filter(&mut self, filter: TextureFilter) {
        self.descriptor.filter = filter;
    }

    pub(crate) fn set_wrap(&mut self, wrap: TextureWrap) {
        self.descriptor.wrap = wrap;
    }
}

impl std::fmt::Debug for Texture2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture2D")
            .field("id", &self.id)
            .field("size", &(self.descriptor.width, self.descriptor.height))
            .field("format", &self.descriptor.format)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

impl_graphics_resource!(Texture2D, Texture);

static_assertions::assert_impl_all!(Texture2D: Send, Sync);

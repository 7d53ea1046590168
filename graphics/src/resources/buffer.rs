//! GPU buffer resource.

use crate::types::{BufferDescriptor, BufferType, BufferUsage, IndexType};

use super::{ResourceId, impl_graphics_resource};

/// A GPU buffer resource.
///
/// Buffers are created by [`GraphicsDevice::create_buffer`] and released with
/// [`GraphicsDevice::free`].
///
/// # Example
///
/// ```ignore
/// let desc = BufferDescriptor::vertex(BufferUsage::Dynamic, 36, 4);
/// let buffer = device.create_buffer(&desc, None)?;
/// println!("Buffer size: {}", buffer.byte_size());
/// ```
///
/// [`GraphicsDevice::create_buffer`]: crate::GraphicsDevice::create_buffer
/// [`GraphicsDevice::free`]: crate::GraphicsDevice::free
pub struct Buffer {
    pub(crate) id: ResourceId,
    descriptor: BufferDescriptor,
}

impl Buffer {
    /// Create a new buffer (called by GraphicsDevice).
    pub(crate) fn new(id: ResourceId, descriptor: BufferDescriptor) -> Self {
        Self { id, descriptor }
    }

    /// Get the buffer descriptor.
    pub fn descriptor(&self) -> &BufferDescriptor {
        &self.descriptor
    }

    /// Vertex or index buffer.
    pub fn buffer_type(&self) -> BufferType {
        self.descriptor.buffer_type
    }

    /// Update frequency.
    pub fn usage(&self) -> BufferUsage {
        self.descriptor.usage
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> u32 {
        self.descriptor.element_size
    }

    /// Capacity in elements.
    pub fn capacity(&self) -> u32 {
        self.descriptor.count
    }

    /// Capacity in bytes.
    pub fn byte_size(&self) -> usize {
        self.descriptor.byte_size()
    }

    /// Index width, for index buffers.
    pub fn index_type(&self) -> Option<IndexType> {
        self.descriptor.index_type()
    }

    /// Get the buffer label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.id)
            .field("type", &self.descriptor.buffer_type)
            .field("size", &self.byte_size())
            .field("label", &self.descriptor.label)
            .finish()
    }
}

impl_graphics_resource!(Buffer, Buffer);

// Ensure Buffer is Send + Sync
static_assertions::assert_impl_all!(Buffer: Send, Sync);
static_assertions::assert_not_impl_any!(Buffer: Clone);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{GraphicsResource, ResourceKind};

    #[test]
    fn test_buffer_debug() {
        let desc = BufferDescriptor::vertex(BufferUsage::Static, 16, 64);
        let buffer = Buffer::new(ResourceId::INVALID, desc);
        let debug = format!("{:?}", buffer);
        assert!(debug.contains("Buffer"));
        assert!(debug.contains("1024"));
    }

    #[test]
    fn test_buffer_accessors() {
        let desc = BufferDescriptor::index(BufferUsage::Stream, IndexType::U32, 12).with_label("ib");
        let buffer = Buffer::new(ResourceId::INVALID, desc);
        assert_eq!(buffer.kind(), ResourceKind::Buffer);
        assert_eq!(buffer.capacity(), 12);
        assert_eq!(buffer.byte_size(), 48);
        assert_eq!(buffer.index_type(), Some(IndexType::U32));
        assert_eq!(buffer.label(), Some("ib"));
    }
}

//! Buffer types and descriptors.

/// What a buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferType {
    /// Per-vertex attribute data.
    Vertex,
    /// Element indices (16 or 32 bit).
    Index,
}

/// How often the buffer contents change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Written once at creation.
    #[default]
    Static,
    /// Rewritten occasionally.
    Dynamic,
    /// Rewritten every frame.
    Stream,
}

impl BufferUsage {
    /// Whether the buffer accepts writes after creation.
    pub fn is_writable(self) -> bool {
        !matches!(self, Self::Static)
    }
}

/// Index width stored in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    /// Index type matching an element size in bytes.
    pub fn from_element_size(size: u32) -> Option<Self> {
        match size {
            2 => Some(Self::U16),
            4 => Some(Self::U32),
            _ => None,
        }
    }

    /// Size of one index in bytes.
    pub fn size(self) -> u32 {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// Descriptor for creating a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferDescriptor {
    /// Debug label for the buffer.
    pub label: Option<String>,
    /// Vertex or index data.
    pub buffer_type: BufferType,
    /// Update frequency.
    pub usage: BufferUsage,
    /// Size of one element in bytes.
    pub element_size: u32,
    /// Capacity in elements.
    pub count: u32,
}

impl BufferDescriptor {
    /// Create a new buffer descriptor.
    pub fn new(buffer_type: BufferType, usage: BufferUsage, element_size: u32, count: u32) -> Self {
        Self {
            label: None,
            buffer_type,
            usage,
            element_size,
            count,
        }
    }

    /// Vertex buffer holding `count` elements of `element_size` bytes.
    pub fn vertex(usage: BufferUsage, element_size: u32, count: u32) -> Self {
        Self::new(BufferType::Vertex, usage, element_size, count)
    }

    /// Index buffer holding `count` indices of `index_type`.
    pub fn index(usage: BufferUsage, index_type: IndexType, count: u32) -> Self {
        Self::new(BufferType::Index, usage, index_type.size(), count)
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Total capacity in bytes.
    pub fn byte_size(&self) -> usize {
        self.element_size as usize * self.count as usize
    }

    /// Index type, for index buffers with a valid element size.
    pub fn index_type(&self) -> Option<IndexType> {
        match self.buffer_type {
            BufferType::Index => IndexType::from_element_size(self.element_size),
            BufferType::Vertex => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_size() {
        let desc = BufferDescriptor::vertex(BufferUsage::Dynamic, 36, 4).with_label("quad");
        assert_eq!(desc.byte_size(), 144);
        assert_eq!(desc.label.as_deref(), Some("quad"));
        assert_eq!(desc.index_type(), None);
    }

    #[test]
    fn test_index_descriptor() {
        let desc = BufferDescriptor::index(BufferUsage::Static, IndexType::U16, 6);
        assert_eq!(desc.element_size, 2);
        assert_eq!(desc.index_type(), Some(IndexType::U16));
        assert_eq!(IndexType::from_element_size(3), None);
    }

    #[test]
    fn test_usage_writable() {
        assert!(!BufferUsage::Static.is_writable());
        assert!(BufferUsage::Dynamic.is_writable());
        assert!(BufferUsage::Stream.is_writable());
    }
}

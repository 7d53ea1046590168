//! Vertex layout definitions.
//!
//! A [`VertexLayout`] describes one interleaved vertex buffer: an ordered list
//! of named elements, their byte offsets and the stride between vertices.
//! Element names are matched against the attribute names a linked program
//! exposes, so a layout can be shared by any program whose inputs agree with
//! it.
//!
//! Layouts are shared via `Arc` between programs and vertex arrays since there
//! are typically only a few of them.
//!
//! # Example
//!
//! ```
//! use ngine_graphics::{ElementType, VertexElement, VertexLayout};
//!
//! let layout = VertexLayout::new()
//!     .with_element(VertexElement::new("position", ElementType::Float, 2))
//!     .with_element(VertexElement::new("color", ElementType::Float, 4));
//! assert_eq!(layout.stride(), 24);
//! assert_eq!(layout.offset_of(1), Some(8));
//! ```

const COMPONENT: &str = "VertexLayout";

/// Maximum number of components in one vertex element.
pub const MAX_ELEMENT_COMPONENTS: u32 = 4;

/// Scalar type of a vertex element component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Float,
    Int,
    UnsignedInt,
}

impl ElementType {
    /// Size of one component in bytes.
    pub fn size(self) -> u32 {
        4
    }
}

/// One named attribute inside a vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexElement {
    /// Attribute name, as declared in the vertex shader.
    pub name: String,
    /// Component type.
    pub element_type: ElementType,
    /// Number of components (1 to 4).
    pub count: u32,
    /// Normalize integer components to `[0, 1]` / `[-1, 1]`.
    pub normalized: bool,
}

impl VertexElement {
    /// Create a non-normalized element.
    ///
    /// Panics if `count` is zero or greater than four.
    pub fn new(name: impl Into<String>, element_type: ElementType, count: u32) -> Self {
        let name = name.into();
        if count == 0 {
            fatal!(COMPONENT, "VertexBufferElement \"{name}\" must have at least one component.");
        }
        if count > MAX_ELEMENT_COMPONENTS {
            fatal!(COMPONENT, "VertexBufferElement count cannot be greater than 4.");
        }
        Self {
            name,
            element_type,
            count,
            normalized: false,
        }
    }

    /// Shorthand for a float element.
    pub fn float(name: impl Into<String>, count: u32) -> Self {
        Self::new(name, ElementType::Float, count)
    }

    /// Mark the element as normalized.
    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }

    /// Size of the element in bytes.
    pub fn size(&self) -> u32 {
        self.element_type.size() * self.count
    }

    /// Whether two elements occupy a vertex the same way. Names are ignored.
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.element_type == other.element_type && self.count == other.count
    }
}

/// Ordered set of vertex elements with computed offsets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexLayout {
    elements: Vec<VertexElement>,
    offsets: Vec<u32>,
    packed_size: u32,
    stride: Option<u32>,
}

impl VertexLayout {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// The engine's sprite vertex: position, texture coordinate and color.
    pub fn sprite() -> Self {
        Self::new()
            .with_element(VertexElement::float("NG_VertexPos", 3))
            .with_element(VertexElement::float("NG_VertexTexCoord", 2))
            .with_element(VertexElement::float("NG_VertexColor", 4))
    }

    /// Append an element after the existing ones.
    pub fn with_element(mut self, element: VertexElement) -> Self {
        self.offsets.push(self.packed_size);
        self.packed_size += element.size();
        self.elements.push(element);
        if let Some(stride) = self.stride
            && stride < self.packed_size
        {
            fatal!(
                COMPONENT,
                "declared stride {stride} is smaller than the packed vertex size {}",
                self.packed_size
            );
        }
        self
    }

    /// Declare an explicit stride (for padded vertices).
    ///
    /// Panics if the stride is smaller than the packed element size.
    pub fn with_stride(mut self, stride: u32) -> Self {
        if stride < self.packed_size {
            fatal!(
                COMPONENT,
                "declared stride {stride} is smaller than the packed vertex size {}",
                self.packed_size
            );
        }
        self.stride = Some(stride);
        self
    }

    /// Elements in declaration order.
    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    /// Elements paired with their byte offsets.
    pub fn iter(&self) -> impl Iterator<Item = (&VertexElement, u32)> + '_ {
        self.elements.iter().zip(self.offsets.iter().copied())
    }

    /// Byte offset of element `index`.
    pub fn offset_of(&self, index: usize) -> Option<u32> {
        self.offsets.get(index).copied()
    }

    /// Sum of all element sizes.
    pub fn packed_size(&self) -> u32 {
        self.packed_size
    }

    /// Distance between consecutive vertices in bytes.
    pub fn stride(&self) -> u32 {
        self.stride.unwrap_or(self.packed_size)
    }

    /// Element-for-element compatibility: same count, and each pair agrees on
    /// type and component count in order.
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.elements.len() == other.elements.len()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| a.is_compatible_with(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_and_stride() {
        let layout = VertexLayout::sprite();
        assert_eq!(layout.offset_of(0), Some(0));
        assert_eq!(layout.offset_of(1), Some(12));
        assert_eq!(layout.offset_of(2), Some(20));
        assert_eq!(layout.offset_of(3), None);
        assert_eq!(layout.stride(), 36);
        assert_eq!(layout.packed_size(), 36);
    }

    #[test]
    fn test_explicit_stride() {
        let layout = VertexLayout::new()
            .with_element(VertexElement::float("position", 2))
            .with_stride(16);
        assert_eq!(layout.stride(), 16);
        assert_eq!(layout.packed_size(), 8);
    }

    #[test]
    #[should_panic(expected = "smaller than the packed vertex size")]
    fn test_stride_too_small() {
        let _ = VertexLayout::sprite().with_stride(20);
    }

    #[test]
    #[should_panic(expected = "VertexBufferElement count cannot be greater than 4.")]
    fn test_element_count_limit() {
        let _ = VertexElement::float("matrix_row", 5);
    }

    #[test]
    fn test_compatibility_ignores_names() {
        let a = VertexLayout::new()
            .with_element(VertexElement::float("pos", 2))
            .with_element(VertexElement::new("id", ElementType::UnsignedInt, 1));
        let b = VertexLayout::new()
            .with_element(VertexElement::float("position", 2))
            .with_element(VertexElement::new("index", ElementType::UnsignedInt, 1));
        let c = VertexLayout::new()
            .with_element(VertexElement::new("id", ElementType::UnsignedInt, 1))
            .with_element(VertexElement::float("pos", 2));

        assert!(a.is_compatible_with(&b));
        assert!(!a.is_compatible_with(&c));
        assert!(!a.is_compatible_with(&VertexLayout::sprite()));
    }

    #[test]
    fn test_iter_pairs_offsets() {
        let layout = VertexLayout::sprite();
        let names: Vec<_> = layout.iter().map(|(e, o)| (e.name.as_str(), o)).collect();
        assert_eq!(
            names,
            vec![("NG_VertexPos", 0), ("NG_VertexTexCoord", 12), ("NG_VertexColor", 20)]
        );
    }
}

//! Shader stages and uniform values.

use std::fmt;
use std::sync::Arc;

use crate::layout::VertexLayout;

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// A value uploaded to a program uniform.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    UnsignedInt(u32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Column-major 4x4 matrix.
    Matrix4([f32; 16]),
    IntArray(Vec<i32>),
}

/// Descriptor for creating a shader program.
#[derive(Debug, Clone)]
pub struct ShaderProgramDescriptor {
    /// Debug label for the program.
    pub label: Option<String>,
    /// Vertex layout the program's inputs expect.
    pub layout: Arc<VertexLayout>,
    /// Name of the sampler array uniform, if the program samples textures.
    pub sampler_uniform: Option<String>,
    /// Number of samplers in the sampler array.
    pub sampler_count: u32,
}

impl ShaderProgramDescriptor {
    /// Create a descriptor for a program consuming `layout`.
    pub fn new(layout: Arc<VertexLayout>) -> Self {
        Self {
            label: None,
            layout,
            sampler_uniform: None,
            sampler_count: 0,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Declare a sampler array uniform bound to units `0..count`.
    pub fn with_samplers(mut self, uniform: impl Into<String>, count: u32) -> Self {
        self.sampler_uniform = Some(uniform.into());
        self.sampler_count = count;
        self
    }
}

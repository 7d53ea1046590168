//! Common types and descriptors for graphics resources.
//!
//! This module contains pixel formats, buffer and texture descriptors,
//! shader stages and the small value types used in draw calls.

mod buffer;
mod common;
mod pixel_format;
mod shader;
mod texture;

pub use buffer::{BufferDescriptor, BufferType, BufferUsage, IndexType};
pub use common::{Color, PrimitiveType, Viewport};
pub use pixel_format::{PixelFormat, mip_dimensions, pixel_data_size};
pub use shader::{ShaderProgramDescriptor, ShaderStage, UniformValue};
pub use texture::{RenderTargetDescriptor, TextureDescriptor, TextureFilter, TextureWrap};

//! Graphics backend abstraction layer.
//!
//! This module provides a trait-based abstraction over platform graphics
//! APIs. The [`GraphicsDevice`](crate::GraphicsDevice) validates every call
//! and keeps the binding cursor; a backend only translates already-valid
//! requests into API calls and owns whatever API state it needs to avoid
//! redundant work.
//!
//! # Available Backends
//!
//! - [`dummy`]: headless backend for tests and tooling
//! - [`opengl`]: desktop OpenGL, OpenGL ES 2.0 and OpenGL ES 3.x
//!
//! DirectX and Vulkan are recognised context types but have no backend;
//! [`create_backend`] rejects them with [`GraphicsError::BackendUnavailable`].

pub mod dummy;
pub(crate) mod glsl;
pub mod opengl;

use crate::capabilities::Capabilities;
use crate::context::{ContextDescriptor, ContextType};
use crate::error::GraphicsError;
use crate::layout::VertexLayout;
use crate::resources::{GpuHandle, RawResource, ResourceId};
use crate::types::{
    BufferDescriptor, Color, IndexType, PrimitiveType, RenderTargetDescriptor, ShaderStage,
    TextureDescriptor, UniformValue,
};

use self::opengl::{GlApi, OpenGlBackend};

/// Platform glue that owns the drawable surface.
pub trait Presenter {
    /// Swap the back buffer to the screen.
    fn swap_buffers(&mut self);

    /// Current drawable size in pixels.
    fn drawable_size(&self) -> (u32, u32);
}

/// A vertex array as the backend sees it when binding.
#[derive(Debug, Clone, Copy)]
pub struct VertexArrayBinding<'a> {
    pub id: ResourceId,
    /// Vertex array object, NULL without VAO support.
    pub handle: GpuHandle,
    pub vertex_buffer: GpuHandle,
    pub index_buffer: GpuHandle,
    pub layout: &'a VertexLayout,
}

/// A linked program as the backend sees it when binding.
#[derive(Debug, Clone, Copy)]
pub struct ProgramBinding<'a> {
    pub handle: GpuHandle,
    pub layout: &'a VertexLayout,
    pub sampler_uniform: Option<&'a str>,
    pub sampler_count: u32,
}

/// Backend objects behind a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetHandles {
    pub framebuffer: GpuHandle,
    pub texture: GpuHandle,
    /// NULL when the target has no depth buffer.
    pub depth_buffer: GpuHandle,
}

/// Operations every graphics backend provides.
///
/// Callers guarantee that handles are live and arguments are in range; the
/// device checks this before delegating.
pub trait GraphicsBackend {
    /// Human-readable backend name.
    fn name(&self) -> &'static str;

    /// Context type the backend serves.
    fn context_type(&self) -> ContextType;

    /// Capabilities detected at initialization.
    fn capabilities(&self) -> &Capabilities;

    /// Current drawable size in pixels.
    fn drawable_size(&self) -> (u32, u32);

    /// Enable straight alpha blending.
    fn enable_alpha_blending(&mut self);

    /// Allocate a buffer of `descriptor.byte_size()` bytes, optionally filled.
    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        data: Option<&[u8]>,
    ) -> Result<GpuHandle, GraphicsError>;

    /// Overwrite the start of a buffer without reallocating it.
    fn update_buffer(&mut self, buffer: GpuHandle, descriptor: &BufferDescriptor, data: &[u8]);

    /// Read back the whole buffer.
    fn read_buffer(
        &mut self,
        buffer: GpuHandle,
        descriptor: &BufferDescriptor,
    ) -> Result<Vec<u8>, GraphicsError>;

    /// Create a texture and upload every mip level present in `data`.
    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        data: Option<&[u8]>,
    ) -> Result<GpuHandle, GraphicsError>;

    /// Apply the filter and wrap mode in `descriptor` to an existing texture.
    fn apply_sampling(&mut self, texture: GpuHandle, descriptor: &TextureDescriptor);

    /// Bind `texture` to `unit`; NULL unbinds.
    fn bind_texture(&mut self, unit: u32, texture: GpuHandle);

    /// Compile one shader stage.
    fn create_shader(&mut self, stage: ShaderStage, source: &str)
    -> Result<GpuHandle, GraphicsError>;

    /// Create an empty program.
    fn create_program(&mut self) -> Result<GpuHandle, GraphicsError>;

    fn attach_shader(&mut self, program: GpuHandle, shader: GpuHandle);

    fn link_program(&mut self, program: GpuHandle) -> Result<(), GraphicsError>;

    /// Make `program` current and upload its sampler unit indices.
    fn use_program(&mut self, program: &ProgramBinding<'_>);

    fn attrib_location(&mut self, program: GpuHandle, name: &str) -> Option<u32>;

    /// Upload a uniform to the current program. Returns false if the program
    /// has no uniform called `name`.
    fn set_uniform(&mut self, program: GpuHandle, name: &str, value: &UniformValue) -> bool;

    /// Create the backend object for a vertex array, NULL if none is needed.
    fn create_vertex_array(&mut self) -> Result<GpuHandle, GraphicsError>;

    /// Bind an array's buffers and reconcile attribute state with `program`.
    fn bind_vertex_array(
        &mut self,
        array: &VertexArrayBinding<'_>,
        program: Option<&ProgramBinding<'_>>,
    );

    fn create_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTargetHandles, GraphicsError>;

    /// Redirect drawing to `framebuffer` (NULL is the screen) and set the viewport.
    fn bind_render_target(&mut self, framebuffer: GpuHandle, width: u32, height: u32);

    fn clear(&mut self, color: Color);

    fn set_viewport(&mut self, width: u32, height: u32);

    fn draw(&mut self, primitive: PrimitiveType, start: u32, count: u32);

    fn draw_indexed(
        &mut self,
        primitive: PrimitiveType,
        start: u32,
        count: u32,
        index_type: IndexType,
    );

    /// Delete the backend objects of a resource.
    fn destroy(&mut self, id: ResourceId, resource: &RawResource);

    /// Show the frame.
    fn present(&mut self);
}

/// Create the backend matching `descriptor` on top of an OpenGL function table.
///
/// Returns [`GraphicsError::InvalidContextDescriptor`] for versions the
/// engine does not accept and [`GraphicsError::BackendUnavailable`] for
/// DirectX and Vulkan.
pub fn create_backend<G, P>(
    descriptor: &ContextDescriptor,
    gl: G,
    presenter: P,
) -> Result<Box<dyn GraphicsBackend>, GraphicsError>
where
    G: GlApi + 'static,
    P: Presenter + 'static,
{
    if !descriptor.verify() {
        return Err(GraphicsError::InvalidContextDescriptor {
            context_type: descriptor.context_type,
            major: descriptor.major_version,
            minor: descriptor.minor_version,
        });
    }
    match descriptor.context_type {
        ContextType::OpenGL | ContextType::OpenGLES => {
            let backend = OpenGlBackend::new(gl, presenter, descriptor.context_type)?;
            Ok(Box::new(backend))
        }
        other => {
            log::warn!("create_backend: no backend implements {other}");
            Err(GraphicsError::BackendUnavailable(other))
        }
    }
}

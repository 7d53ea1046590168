//! Dummy graphics backend for testing and development.
//!
//! This backend doesn't perform any GPU work but provides a complete
//! implementation of [`GraphicsBackend`] so the device layer can run without
//! a graphics context: handles are allocated from a counter, buffer contents
//! are kept in memory for read-back, and shader sources are scanned for their
//! declarations.

use std::collections::HashMap;

use crate::capabilities::Capabilities;
use crate::context::ContextType;
use crate::error::GraphicsError;
use crate::resources::{GpuHandle, RawResource, ResourceId};
use crate::types::{
    BufferDescriptor, Color, IndexType, PrimitiveType, RenderTargetDescriptor, ShaderStage,
    TextureDescriptor, UniformValue,
};

use super::glsl;
use super::{GraphicsBackend, ProgramBinding, RenderTargetHandles, VertexArrayBinding};

#[derive(Debug, Default)]
struct DummyProgram {
    sources: Vec<(ShaderStage, String)>,
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

/// Counters of the work a [`DummyBackend`] was asked to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DummyStats {
    pub draws: u64,
    pub texture_binds: u64,
    pub program_binds: u64,
    pub vertex_array_binds: u64,
    pub presents: u64,
    pub destroyed: u64,
}

/// Dummy graphics backend.
#[derive(Debug)]
pub struct DummyBackend {
    capabilities: Capabilities,
    drawable_size: (u32, u32),
    next_handle: u32,
    buffers: HashMap<GpuHandle, Vec<u8>>,
    shaders: HashMap<GpuHandle, (ShaderStage, String)>,
    programs: HashMap<GpuHandle, DummyProgram>,
    live: usize,
    stats: DummyStats,
}

impl DummyBackend {
    /// Create a new dummy backend with a 1280x720 drawable.
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::headless())
    }

    /// Create a dummy backend that reports `capabilities`.
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            drawable_size: (1280, 720),
            next_handle: 1,
            buffers: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            live: 0,
            stats: DummyStats::default(),
        }
    }

    /// Override the reported drawable size.
    pub fn with_drawable_size(mut self, width: u32, height: u32) -> Self {
        self.drawable_size = (width, height);
        self
    }

    /// Work counters.
    pub fn stats(&self) -> DummyStats {
        self.stats
    }

    /// Number of backend objects currently allocated.
    pub fn live_objects(&self) -> usize {
        self.live
    }

    fn allocate(&mut self) -> GpuHandle {
        let handle = GpuHandle(self.next_handle);
        self.next_handle += 1;
        self.live += 1;
        handle
    }

    fn release(&mut self, handle: GpuHandle) {
        if !handle.is_null() {
            self.live -= 1;
        }
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    fn context_type(&self) -> ContextType {
        ContextType::OpenGL
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn drawable_size(&self) -> (u32, u32) {
        self.drawable_size
    }

    fn enable_alpha_blending(&mut self) {}

    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        data: Option<&[u8]>,
    ) -> Result<GpuHandle, GraphicsError> {
        let handle = self.allocate();
        log::trace!(
            "DummyBackend: creating buffer {:?} {handle} ({} bytes)",
            descriptor.label,
            descriptor.byte_size()
        );
        let contents = data.map_or_else(|| vec![0; descriptor.byte_size()], <[u8]>::to_vec);
        self.buffers.insert(handle, contents);
        Ok(handle)
    }

    fn update_buffer(&mut self, buffer: GpuHandle, _descriptor: &BufferDescriptor, data: &[u8]) {
        if let Some(contents) = self.buffers.get_mut(&buffer) {
            contents[..data.len()].copy_from_slice(data);
        }
    }

    fn read_buffer(
        &mut self,
        buffer: GpuHandle,
        _descriptor: &BufferDescriptor,
    ) -> Result<Vec<u8>, GraphicsError> {
        self.buffers
            .get(&buffer)
            .cloned()
            .ok_or_else(|| GraphicsError::ResourceCreationFailed(format!("unknown buffer {buffer}")))
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        _data: Option<&[u8]>,
    ) -> Result<GpuHandle, GraphicsError> {
        let handle = self.allocate();
        log::trace!(
            "DummyBackend: creating texture {:?} {handle} ({}x{} {})",
            descriptor.label,
            descriptor.width,
            descriptor.height,
            descriptor.format
        );
        Ok(handle)
    }

    fn apply_sampling(&mut self, _texture: GpuHandle, _descriptor: &TextureDescriptor) {}

    fn bind_texture(&mut self, _unit: u32, _texture: GpuHandle) {
        self.stats.texture_binds += 1;
    }

    fn create_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<GpuHandle, GraphicsError> {
        if !glsl::has_entry_point(source) {
            return Err(GraphicsError::ShaderCompilation {
                stage,
                log: "no entry point".to_string(),
            });
        }
        let handle = self.allocate();
        self.shaders.insert(handle, (stage, source.to_string()));
        Ok(handle)
    }

    fn create_program(&mut self) -> Result<GpuHandle, GraphicsError> {
        let handle = self.allocate();
        self.programs.insert(handle, DummyProgram::default());
        Ok(handle)
    }

    fn attach_shader(&mut self, program: GpuHandle, shader: GpuHandle) {
        if let (Some(program), Some(source)) =
            (self.programs.get_mut(&program), self.shaders.get(&shader))
        {
            program.sources.push(source.clone());
        }
    }

    fn link_program(&mut self, program: GpuHandle) -> Result<(), GraphicsError> {
        let program = self.programs.get_mut(&program).ok_or_else(|| GraphicsError::ShaderLink {
            log: format!("unknown program {program}"),
        })?;
        let has_stage = |stage| program.sources.iter().any(|(s, _)| *s == stage);
        if !has_stage(ShaderStage::Vertex) || !has_stage(ShaderStage::Fragment) {
            return Err(GraphicsError::ShaderLink {
                log: "a vertex and a fragment shader are required".to_string(),
            });
        }
        program.attributes = program
            .sources
            .iter()
            .filter(|(stage, _)| *stage == ShaderStage::Vertex)
            .flat_map(|(_, source)| glsl::declared_inputs(source))
            .collect();
        program.uniforms = program
            .sources
            .iter()
            .flat_map(|(_, source)| glsl::declared_uniforms(source))
            .collect();
        Ok(())
    }

    fn use_program(&mut self, _program: &ProgramBinding<'_>) {
        self.stats.program_binds += 1;
    }

    fn attrib_location(&mut self, program: GpuHandle, name: &str) -> Option<u32> {
        let program = self.programs.get(&program)?;
        program
            .attributes
            .iter()
            .position(|attribute| attribute == name)
            .map(|index| index as u32)
    }

    fn set_uniform(&mut self, program: GpuHandle, name: &str, _value: &UniformValue) -> bool {
        self.programs
            .get(&program)
            .is_some_and(|program| program.uniforms.iter().any(|uniform| uniform == name))
    }

    fn create_vertex_array(&mut self) -> Result<GpuHandle, GraphicsError> {
        Ok(self.allocate())
    }

    fn bind_vertex_array(
        &mut self,
        _array: &VertexArrayBinding<'_>,
        _program: Option<&ProgramBinding<'_>>,
    ) {
        self.stats.vertex_array_binds += 1;
    }

    fn create_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTargetHandles, GraphicsError> {
        let framebuffer = self.allocate();
        let texture = self.allocate();
        let depth_buffer = if descriptor.depth {
            self.allocate()
        } else {
            GpuHandle::NULL
        };
        Ok(RenderTargetHandles {
            framebuffer,
            texture,
            depth_buffer,
        })
    }

    fn bind_render_target(&mut self, _framebuffer: GpuHandle, _width: u32, _height: u32) {}

    fn clear(&mut self, _color: Color) {}

    fn set_viewport(&mut self, width: u32, height: u32) {
        log::trace!("DummyBackend: viewport {width}x{height}");
    }

    fn draw(&mut self, _primitive: PrimitiveType, _start: u32, _count: u32) {
        self.stats.draws += 1;
    }

    fn draw_indexed(
        &mut self,
        _primitive: PrimitiveType,
        _start: u32,
        _count: u32,
        _index_type: IndexType,
    ) {
        self.stats.draws += 1;
    }

    fn destroy(&mut self, id: ResourceId, resource: &RawResource) {
        log::trace!("DummyBackend: destroying {} {id}", resource.kind());
        self.stats.destroyed += 1;
        match resource {
            RawResource::Buffer { handle, .. } => {
                self.buffers.remove(handle);
                self.release(*handle);
            }
            RawResource::Shader { handle, .. } => {
                self.shaders.remove(handle);
                self.release(*handle);
            }
            RawResource::ShaderProgram { handle, .. } => {
                self.programs.remove(handle);
                self.release(*handle);
            }
            RawResource::VertexArray { handle, .. } | RawResource::Texture { handle, .. } => {
                self.release(*handle);
            }
            RawResource::RenderTarget {
                framebuffer,
                depth_buffer,
                ..
            } => {
                self.release(*framebuffer);
                self.release(*depth_buffer);
            }
        }
    }

    fn present(&mut self) {
        self.stats.presents += 1;
    }
}

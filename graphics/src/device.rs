//! Graphics device.
//!
//! The [`GraphicsDevice`] is the main interface for creating GPU resources
//! and issuing draws. It validates every request, keeps the binding cursor
//! (texture units, current program, bound vertex array and render target)
//! and owns the registry of everything it created. Backends receive only
//! requests that already passed validation.
//!
//! Freed resources are not destroyed immediately: the GPU may still be
//! reading them for frames already submitted. They wait in a
//! [`DeferredFreeQueue`] and are destroyed by a later [`GraphicsDevice::present`].

use std::sync::Arc;

use crate::backend::{
    self, GraphicsBackend, Presenter, ProgramBinding, VertexArrayBinding, opengl::GlApi,
};
use crate::capabilities::{Capabilities, Features};
use crate::config::DeviceConfig;
use crate::context::ContextDescriptor;
use crate::deferred::{DeferredFreeQueue, ResourceReleaser};
use crate::error::GraphicsError;
use crate::layout::VertexLayout;
use crate::resources::{
    Buffer, GpuHandle, GraphicsResource, RawResource, RenderTarget, ResourceId, ResourceRegistry,
    ResourceState, Shader, ShaderProgram, Texture2D, VertexArray,
};
use crate::types::{
    BufferDescriptor, BufferType, BufferUsage, Color, PixelFormat, PrimitiveType,
    RenderTargetDescriptor, ShaderProgramDescriptor, ShaderStage, TextureDescriptor,
    TextureFilter, TextureWrap, UniformValue, Viewport,
};

const COMPONENT: &str = "GraphicsDevice";

/// Number of texture units the device manages.
pub const MAX_TEXTURE_UNITS: u32 = 8;

#[derive(Debug, Default)]
struct Bindings {
    textures: [Option<ResourceId>; MAX_TEXTURE_UNITS as usize],
    program: Option<ResourceId>,
    vertex_array: Option<ResourceId>,
    render_target: Option<ResourceId>,
}

impl Bindings {
    fn forget(&mut self, id: ResourceId) {
        for unit in &mut self.textures {
            if *unit == Some(id) {
                *unit = None;
            }
        }
        for slot in [&mut self.program, &mut self.vertex_array] {
            if *slot == Some(id) {
                *slot = None;
            }
        }
    }
}

fn program_binding(resource: &RawResource) -> Option<ProgramBinding<'_>> {
    match resource {
        RawResource::ShaderProgram {
            handle,
            layout,
            sampler_uniform,
            sampler_count,
            ..
        } => Some(ProgramBinding {
            handle: *handle,
            layout,
            sampler_uniform: sampler_uniform.as_deref(),
            sampler_count: *sampler_count,
        }),
        _ => None,
    }
}

/// Resolve a vertex array and the buffers it refers to.
fn array_binding(registry: &ResourceRegistry, id: ResourceId) -> Option<VertexArrayBinding<'_>> {
    let RawResource::VertexArray {
        handle,
        vertex_buffer,
        index_buffer,
        layout,
    } = registry.get(id)?
    else {
        return None;
    };
    let vertex_buffer = registry.get(*vertex_buffer)?.handle();
    let index_buffer = match index_buffer {
        Some(index_buffer) => registry.get(*index_buffer)?.handle(),
        None => GpuHandle::NULL,
    };
    Some(VertexArrayBinding {
        id,
        handle: *handle,
        vertex_buffer,
        index_buffer,
        layout,
    })
}

/// A graphics device for creating GPU resources and drawing with them.
///
/// # Thread Safety
///
/// The device is used from the thread that owns the graphics context and is
/// not `Send`. Other threads free resources through a [`ResourceReleaser`]
/// obtained from [`GraphicsDevice::releaser`].
///
/// # Example
///
/// ```ignore
/// let mut device = GraphicsDevice::new(Box::new(DummyBackend::new()), DeviceConfig::default());
///
/// let layout = Arc::new(VertexLayout::sprite());
/// let vertices = device.create_buffer(
///     &BufferDescriptor::vertex(BufferUsage::Dynamic, layout.stride(), 4),
///     None,
/// )?;
/// let array = device.create_vertex_array(&vertices, None, layout)?;
/// device.bind_vertex_array(&array);
/// device.use_program(&program);
/// device.draw_primitives(PrimitiveType::TriangleStrip, 0, 4);
/// device.present();
/// ```
pub struct GraphicsDevice {
    backend: Box<dyn GraphicsBackend>,
    registry: ResourceRegistry,
    queue: Arc<DeferredFreeQueue>,
    config: DeviceConfig,
    bindings: Bindings,
    viewport: Viewport,
}

impl GraphicsDevice {
    /// Create a device on top of `backend`.
    pub fn new(mut backend: Box<dyn GraphicsBackend>, config: DeviceConfig) -> Self {
        let (width, height) = config
            .initial_viewport
            .unwrap_or_else(|| backend.drawable_size());
        backend.set_viewport(width, height);
        if config.alpha_blending {
            backend.enable_alpha_blending();
        }
        log::info!(
            "{COMPONENT}: created on {} ({width}x{height}, {} frames of grace)",
            backend.name(),
            config.frames_of_grace
        );
        let queue = Arc::new(DeferredFreeQueue::new(config.frames_of_grace));
        Self {
            backend,
            registry: ResourceRegistry::new(),
            queue,
            config,
            bindings: Bindings::default(),
            viewport: Viewport::new(width, height),
        }
    }

    /// Create the backend for `descriptor` and a device on top of it.
    ///
    /// # Errors
    ///
    /// Fails if the descriptor is invalid, names a context type with no
    /// backend, or does not match the current context.
    pub fn from_descriptor<G, P>(
        descriptor: &ContextDescriptor,
        gl: G,
        presenter: P,
        config: DeviceConfig,
    ) -> Result<Self, GraphicsError>
    where
        G: GlApi + 'static,
        P: Presenter + 'static,
    {
        let backend = backend::create_backend(descriptor, gl, presenter)?;
        Ok(Self::new(backend, config))
    }

    /// Capabilities of the backend.
    pub fn capabilities(&self) -> &Capabilities {
        self.backend.capabilities()
    }

    /// Whether textures of `format` can be created on this device.
    pub fn supports_format(&self, format: PixelFormat) -> bool {
        self.capabilities().supports_format(format)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Settings the device was created with.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Registry entry of a resource that is usable. Fatal otherwise.
    fn live(&self, id: ResourceId, what: &str) -> &RawResource {
        match self.registry.get_live(id) {
            Some(resource) if !self.queue.is_queued(id) => resource,
            _ => fatal!(COMPONENT, "{what} {id} is not live ({:?})", self.resource_state(id)),
        }
    }

    fn check_unit(unit: u32) {
        if unit >= MAX_TEXTURE_UNITS {
            fatal!(
                COMPONENT,
                "Ngine limits the number of texture units to {MAX_TEXTURE_UNITS}."
            );
        }
    }

    fn check_wrap(&self, wrap: TextureWrap) {
        if wrap == TextureWrap::MirrorClamp && !self.capabilities().has(Features::TEXTURE_MIRROR_CLAMP)
        {
            fatal!(COMPONENT, "Wrap mode not supported.");
        }
    }

    // ------------------------------------------------------------------
    // Buffers
    // ------------------------------------------------------------------

    /// Create a vertex or index buffer, optionally filled with `data`.
    ///
    /// Panics if the element size or count is zero, if an index buffer's
    /// element size is not 2 or 4, or if `data` is not exactly
    /// `element_size * count` bytes.
    pub fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        data: Option<&[u8]>,
    ) -> Result<Buffer, GraphicsError> {
        if descriptor.element_size == 0 || descriptor.count == 0 {
            fatal!(
                COMPONENT,
                "buffer element size and count must be non-zero (got {} x {})",
                descriptor.element_size,
                descriptor.count
            );
        }
        if descriptor.buffer_type == BufferType::Index && descriptor.index_type().is_none() {
            fatal!(
                COMPONENT,
                "index buffer element size must be 2 or 4 bytes, got {}",
                descriptor.element_size
            );
        }
        if let Some(data) = data
            && data.len() != descriptor.byte_size()
        {
            fatal!(
                COMPONENT,
                "buffer data is {} bytes, expected {}",
                data.len(),
                descriptor.byte_size()
            );
        }

        let handle = self.backend.create_buffer(descriptor, data)?;
        let id = self.registry.insert(RawResource::Buffer {
            handle,
            descriptor: descriptor.clone(),
        });
        log::trace!(
            "{COMPONENT}: created {:?} buffer {id} ({} x {} bytes)",
            descriptor.buffer_type,
            descriptor.count,
            descriptor.element_size
        );
        Ok(Buffer::new(id, descriptor.clone()))
    }

    /// Create a buffer holding `data`, one element per item.
    pub fn create_buffer_from_slice<T: bytemuck::Pod>(
        &mut self,
        buffer_type: BufferType,
        usage: BufferUsage,
        data: &[T],
    ) -> Result<Buffer, GraphicsError> {
        let descriptor = BufferDescriptor::new(
            buffer_type,
            usage,
            std::mem::size_of::<T>() as u32,
            data.len() as u32,
        );
        self.create_buffer(&descriptor, Some(bytemuck::cast_slice(data)))
    }

    /// Overwrite the first `count` elements of `buffer`.
    ///
    /// Panics if the buffer is static, if `count` exceeds its capacity, or if
    /// `data` is not exactly `count` elements long.
    pub fn write_buffer(&mut self, buffer: &Buffer, data: &[u8], count: u32) {
        let descriptor = buffer.descriptor();
        if !descriptor.usage.is_writable() {
            fatal!(COMPONENT, "static buffer {} cannot be written", buffer.id);
        }
        if count > descriptor.count {
            fatal!(
                COMPONENT,
                "write of {count} elements exceeds the capacity of buffer {} ({})",
                buffer.id,
                descriptor.count
            );
        }
        let expected = count as usize * descriptor.element_size as usize;
        if data.len() != expected {
            fatal!(
                COMPONENT,
                "buffer write is {} bytes, {count} elements need {expected}",
                data.len()
            );
        }
        let handle = self.live(buffer.id, "buffer").handle();
        self.backend.update_buffer(handle, descriptor, data);
    }

    /// Overwrite the start of `buffer` with `data`.
    pub fn write_buffer_from_slice<T: bytemuck::Pod>(&mut self, buffer: &Buffer, data: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let count = bytes.len() / buffer.element_size().max(1) as usize;
        self.write_buffer(buffer, bytes, count as u32);
    }

    /// Read back the full contents of `buffer`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::FeatureNotSupported`] where the backend has
    /// no read-back path (OpenGL ES).
    pub fn read_buffer(&mut self, buffer: &Buffer) -> Result<Vec<u8>, GraphicsError> {
        let handle = self.live(buffer.id, "buffer").handle();
        self.backend.read_buffer(handle, buffer.descriptor())
    }

    // ------------------------------------------------------------------
    // Textures
    // ------------------------------------------------------------------

    /// Create a texture from `data`, which holds every mip level in order.
    ///
    /// Panics on zero dimensions or mip levels, an unsupported format or wrap
    /// mode, data shorter than the mip chain, or a compressed texture
    /// without data.
    pub fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        data: Option<&[u8]>,
    ) -> Result<Texture2D, GraphicsError> {
        if descriptor.width == 0 || descriptor.height == 0 {
            fatal!(
                COMPONENT,
                "texture dimensions must be non-zero (got {}x{})",
                descriptor.width,
                descriptor.height
            );
        }
        if descriptor.mip_levels == 0 {
            fatal!(COMPONENT, "texture must have at least one mip level");
        }
        if !self.supports_format(descriptor.format) {
            fatal!(COMPONENT, "Format not supported.");
        }
        self.check_wrap(descriptor.wrap);
        let required = descriptor.data_size();
        match data {
            Some(data) if data.len() < required => fatal!(
                COMPONENT,
                "texture data is {} bytes, {} mip levels of {} need {required}",
                data.len(),
                descriptor.mip_levels,
                descriptor.format
            ),
            None if descriptor.format.is_compressed() => {
                fatal!(COMPONENT, "compressed texture {} needs initial data", descriptor.format)
            }
            _ => {}
        }

        let handle = self.backend.create_texture(descriptor, data)?;
        let id = self.registry.insert(RawResource::Texture {
            handle,
            descriptor: descriptor.clone(),
        });
        log::trace!(
            "{COMPONENT}: created texture {id} ({}x{} {})",
            descriptor.width,
            descriptor.height,
            descriptor.format
        );
        Ok(Texture2D::new(id, descriptor.clone()))
    }

    fn update_sampling(&mut self, texture: &Texture2D) {
        let handle = self.live(texture.id, "texture").handle();
        if let Some(RawResource::Texture { descriptor, .. }) = self.registry.get_mut(texture.id) {
            *descriptor = texture.descriptor().clone();
        }
        self.backend.apply_sampling(handle, texture.descriptor());
    }

    /// Change the sampling filter of `texture`.
    pub fn set_texture_filter(&mut self, texture: &mut Texture2D, filter: TextureFilter) {
        texture.set_filter(filter);
        self.update_sampling(texture);
    }

    /// Change the wrap mode of `texture`. Panics if the mode is unsupported.
    pub fn set_texture_wrap(&mut self, texture: &mut Texture2D, wrap: TextureWrap) {
        self.check_wrap(wrap);
        texture.set_wrap(wrap);
        self.update_sampling(texture);
    }

    /// Bind `texture` to texture unit `unit`.
    ///
    /// Binding the texture a unit already holds does not reach the backend.
    /// Panics if `unit` is 8 or above.
    pub fn bind_texture(&mut self, unit: u32, texture: &Texture2D) {
        Self::check_unit(unit);
        if self.bindings.textures[unit as usize] == Some(texture.id) {
            log::trace!("{COMPONENT}: texture {} already bound to unit {unit}", texture.id);
            return;
        }
        let handle = self.live(texture.id, "texture").handle();
        self.backend.bind_texture(unit, handle);
        self.bindings.textures[unit as usize] = Some(texture.id);
    }

    /// Clear texture unit `unit`.
    pub fn unbind_texture(&mut self, unit: u32) {
        Self::check_unit(unit);
        if self.bindings.textures[unit as usize].take().is_some() {
            self.backend.bind_texture(unit, GpuHandle::NULL);
        }
    }

    /// Texture bound to `unit`, if any.
    pub fn bound_texture(&self, unit: u32) -> Option<ResourceId> {
        self.bindings.textures.get(unit as usize).copied().flatten()
    }

    // ------------------------------------------------------------------
    // Shaders
    // ------------------------------------------------------------------

    /// Compile one shader stage from GLSL source.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::ShaderCompilation`] with the driver log.
    pub fn create_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Shader, GraphicsError> {
        let handle = self.backend.create_shader(stage, source)?;
        let id = self
            .registry
            .insert(RawResource::Shader { handle, stage });
        log::trace!("{COMPONENT}: compiled {stage} shader {id}");
        Ok(Shader::new(id, stage))
    }

    /// Create an empty shader program.
    pub fn create_shader_program(
        &mut self,
        descriptor: &ShaderProgramDescriptor,
    ) -> Result<ShaderProgram, GraphicsError> {
        if descriptor.sampler_count > MAX_TEXTURE_UNITS {
            fatal!(
                COMPONENT,
                "Ngine limits the number of texture units to {MAX_TEXTURE_UNITS}."
            );
        }
        let handle = self.backend.create_program()?;
        let id = self.registry.insert(RawResource::ShaderProgram {
            handle,
            layout: descriptor.layout.clone(),
            sampler_uniform: descriptor.sampler_uniform.clone(),
            sampler_count: descriptor.sampler_count,
            shaders: Vec::new(),
            linked: false,
        });
        log::trace!("{COMPONENT}: created program {:?} {id}", descriptor.label);
        Ok(ShaderProgram::new(id, descriptor.layout.clone()))
    }

    /// Attach a compiled shader. Panics if the program is already linked.
    pub fn attach_shader(&mut self, program: &mut ShaderProgram, shader: &Shader) {
        if program.linked {
            fatal!(
                COMPONENT,
                "cannot attach shader {} to program {}, it is already linked",
                shader.id,
                program.id
            );
        }
        let shader_handle = self.live(shader.id, "shader").handle();
        let program_handle = self.live(program.id, "program").handle();
        self.backend.attach_shader(program_handle, shader_handle);
        if let Some(RawResource::ShaderProgram { shaders, .. }) = self.registry.get_mut(program.id)
        {
            shaders.push(shader.id);
        }
    }

    /// Link the attached shaders.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::ShaderLink`] with the driver log.
    pub fn link_program(&mut self, program: &mut ShaderProgram) -> Result<(), GraphicsError> {
        let handle = self.live(program.id, "program").handle();
        self.backend.link_program(handle)?;
        program.linked = true;
        if let Some(RawResource::ShaderProgram { linked, .. }) = self.registry.get_mut(program.id) {
            *linked = true;
        }
        log::trace!("{COMPONENT}: linked program {}", program.id);
        Ok(())
    }

    /// Make `program` current. Panics if it is not linked.
    pub fn use_program(&mut self, program: &ShaderProgram) {
        if !program.linked {
            fatal!(COMPONENT, "program {} must be linked before use", program.id);
        }
        if self.bindings.program == Some(program.id) {
            return;
        }
        self.live(program.id, "program");
        let Some(binding) = self.registry.get(program.id).and_then(program_binding) else {
            fatal!(COMPONENT, "{} is not a shader program", program.id);
        };
        self.backend.use_program(&binding);
        self.bindings.program = Some(program.id);

        // The bound array's attributes depend on the program.
        if let Some(array) = self.bindings.vertex_array {
            self.apply_vertex_array(array);
        }
    }

    /// Location of the vertex attribute `name` in a linked program.
    pub fn attrib_location(&mut self, program: &ShaderProgram, name: &str) -> Option<u32> {
        if !program.linked {
            fatal!(COMPONENT, "program {} must be linked before querying attributes", program.id);
        }
        let handle = self.live(program.id, "program").handle();
        self.backend.attrib_location(handle, name)
    }

    /// Upload a uniform value. Names the program does not use are ignored.
    pub fn set_uniform(&mut self, program: &ShaderProgram, name: &str, value: UniformValue) {
        if !program.linked {
            fatal!(COMPONENT, "program {} must be linked before setting uniforms", program.id);
        }
        let handle = self.live(program.id, "program").handle();
        if !self.backend.set_uniform(handle, name, &value) {
            log::debug!("{COMPONENT}: program {} has no uniform {name}", program.id);
        }
    }

    // ------------------------------------------------------------------
    // Vertex arrays
    // ------------------------------------------------------------------

    /// Describe how `vertex_buffer` (and optionally `index_buffer`) feed a
    /// program.
    ///
    /// The array refers to the buffers without owning them. Panics if the
    /// buffer kinds are wrong, a buffer is not live, or the layout is empty.
    pub fn create_vertex_array(
        &mut self,
        vertex_buffer: &Buffer,
        index_buffer: Option<&Buffer>,
        layout: Arc<VertexLayout>,
    ) -> Result<VertexArray, GraphicsError> {
        if vertex_buffer.buffer_type() != BufferType::Vertex {
            fatal!(
                COMPONENT,
                "buffer {} is an {:?} buffer, a vertex buffer is required",
                vertex_buffer.id,
                vertex_buffer.buffer_type()
            );
        }
        if let Some(index_buffer) = index_buffer
            && index_buffer.buffer_type() != BufferType::Index
        {
            fatal!(
                COMPONENT,
                "buffer {} is a {:?} buffer, an index buffer is required",
                index_buffer.id,
                index_buffer.buffer_type()
            );
        }
        if layout.elements().is_empty() {
            fatal!(COMPONENT, "vertex layout has no elements");
        }
        self.live(vertex_buffer.id, "vertex buffer");
        if let Some(index_buffer) = index_buffer {
            self.live(index_buffer.id, "index buffer");
        }
        if layout.stride() != vertex_buffer.element_size() {
            log::warn!(
                "{COMPONENT}: layout stride {} differs from the element size {} of buffer {}",
                layout.stride(),
                vertex_buffer.element_size(),
                vertex_buffer.id
            );
        }

        let handle = self.backend.create_vertex_array()?;
        let index_id = index_buffer.map(|buffer| buffer.id);
        let id = self.registry.insert(RawResource::VertexArray {
            handle,
            vertex_buffer: vertex_buffer.id,
            index_buffer: index_id,
            layout: layout.clone(),
        });
        log::trace!("{COMPONENT}: created vertex array {id}");
        Ok(VertexArray::new(id, vertex_buffer.id, index_id, layout))
    }

    fn apply_vertex_array(&mut self, id: ResourceId) {
        let Some(array) = array_binding(&self.registry, id) else {
            fatal!(COMPONENT, "vertex array {id} refers to a destroyed buffer");
        };
        let program = self
            .bindings
            .program
            .and_then(|program| self.registry.get(program))
            .and_then(program_binding);
        self.backend.bind_vertex_array(&array, program.as_ref());
    }

    /// Bind `array` for drawing.
    ///
    /// Buffer bindings are re-established and the array's attributes are
    /// pointed at the current program's inputs.
    pub fn bind_vertex_array(&mut self, array: &VertexArray) {
        self.live(array.id, "vertex array");
        self.bindings.vertex_array = Some(array.id);
        self.apply_vertex_array(array.id);
    }

    // ------------------------------------------------------------------
    // Render targets
    // ------------------------------------------------------------------

    /// Create an off-screen render target.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::FramebufferIncomplete`] if the driver rejects
    /// the attachment combination.
    pub fn create_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTarget, GraphicsError> {
        if descriptor.width == 0 || descriptor.height == 0 {
            fatal!(
                COMPONENT,
                "render target dimensions must be non-zero (got {}x{})",
                descriptor.width,
                descriptor.height
            );
        }
        if descriptor.format.is_compressed() {
            fatal!(
                COMPONENT,
                "render targets cannot use compressed format {}",
                descriptor.format
            );
        }
        if !self.supports_format(descriptor.format) {
            fatal!(COMPONENT, "Format not supported.");
        }

        let handles = self.backend.create_render_target(descriptor)?;
        let color = descriptor.color_texture();
        let texture = self.registry.insert(RawResource::Texture {
            handle: handles.texture,
            descriptor: color.clone(),
        });
        let id = self.registry.insert(RawResource::RenderTarget {
            framebuffer: handles.framebuffer,
            depth_buffer: handles.depth_buffer,
            texture,
            width: descriptor.width,
            height: descriptor.height,
        });
        log::trace!(
            "{COMPONENT}: created render target {id} ({}x{}, depth: {})",
            descriptor.width,
            descriptor.height,
            descriptor.depth
        );
        Ok(RenderTarget::new(
            id,
            Texture2D::new(texture, color),
            descriptor.depth,
        ))
    }

    /// Draw into `target`, or into the screen with `None`.
    pub fn bind_render_target(&mut self, target: Option<&RenderTarget>) {
        match target {
            Some(target) => {
                let framebuffer = self.live(target.id, "render target").handle();
                self.backend
                    .bind_render_target(framebuffer, target.width(), target.height());
                self.bindings.render_target = Some(target.id);
            }
            None => {
                let Viewport { width, height } = self.viewport;
                self.backend
                    .bind_render_target(GpuHandle::NULL, width, height);
                self.bindings.render_target = None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Clear the current target's color and depth.
    pub fn clear(&mut self, color: Color) {
        self.backend.clear(color);
    }

    /// Resize the screen viewport, for example after a window resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        if self.bindings.render_target.is_none() {
            self.backend.set_viewport(width, height);
        }
    }

    /// Screen viewport size.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn draw_state(&self) -> ResourceId {
        let Some(array) = self.bindings.vertex_array else {
            fatal!(COMPONENT, "draw call without a bound vertex array");
        };
        if self.bindings.program.is_none() {
            fatal!(COMPONENT, "draw call without a shader program in use");
        }
        array
    }

    /// Draw `count` vertices starting at vertex `start`.
    pub fn draw_primitives(&mut self, primitive: PrimitiveType, start: u32, count: u32) {
        self.draw_state();
        self.backend.draw(primitive, start, count);
    }

    /// Draw `count` indices starting at index `start` of the bound array's
    /// index buffer.
    pub fn draw_indexed_primitives(&mut self, primitive: PrimitiveType, start: u32, count: u32) {
        let array = self.draw_state();
        let index_type = match self.registry.get(array) {
            Some(RawResource::VertexArray {
                index_buffer: Some(index_buffer),
                ..
            }) => match self.registry.get(*index_buffer) {
                Some(RawResource::Buffer { descriptor, .. }) => descriptor.index_type(),
                _ => None,
            },
            _ => None,
        };
        let Some(index_type) = index_type else {
            fatal!(COMPONENT, "vertex array {array} has no index buffer");
        };
        self.backend
            .draw_indexed(primitive, start, count, index_type);
    }

    // ------------------------------------------------------------------
    // Lifetime
    // ------------------------------------------------------------------

    /// Queue a resource for destruction, consuming its handle.
    ///
    /// The backend object survives the configured number of presents so
    /// in-flight frames can still use it.
    pub fn free<R: GraphicsResource>(&mut self, resource: R) {
        let id = resource.id();
        if self.queue.is_queued(id) {
            fatal!(
                COMPONENT,
                "{} {id} is already queued for destruction",
                resource.kind()
            );
        }
        match self.registry.mark_queued(id) {
            ResourceState::Live => {}
            ResourceState::Queued => fatal!(
                COMPONENT,
                "{} {id} is already queued for destruction",
                resource.kind()
            ),
            ResourceState::Destroyed => {
                fatal!(COMPONENT, "{} {id} was already destroyed", resource.kind())
            }
        }
        log::trace!("{COMPONENT}: freeing {} {id}", resource.kind());
        self.queue.enqueue(id);
    }

    /// Handle for freeing resources from other threads.
    pub fn releaser(&self) -> ResourceReleaser {
        ResourceReleaser::new(Arc::clone(&self.queue))
    }

    /// Whether `resource` is still usable.
    pub fn is_valid(&self, resource: &impl GraphicsResource) -> bool {
        self.resource_state(resource.id()) == ResourceState::Live
    }

    /// Lifecycle stage of `id`.
    pub fn resource_state(&self, id: ResourceId) -> ResourceState {
        if self.queue.is_queued(id) {
            ResourceState::Queued
        } else {
            self.registry.state(id)
        }
    }

    /// Backend handle of a resource that has not been destroyed.
    pub fn raw_handle(&self, resource: &impl GraphicsResource) -> Option<GpuHandle> {
        self.registry.get(resource.id()).map(RawResource::handle)
    }

    /// Resources not yet destroyed, counting render target color textures
    /// separately.
    pub fn live_resource_count(&self) -> usize {
        self.registry.len()
    }

    /// Resources waiting in the deferred free queue.
    pub fn pending_free_count(&self) -> usize {
        self.queue.pending_count()
    }

    /// Number of presents so far.
    pub fn frame_index(&self) -> u64 {
        self.queue.current_frame()
    }

    /// Show the frame and destroy resources whose grace period ended.
    pub fn present(&mut self) {
        self.backend.present();
        for id in self.queue.advance_frame() {
            if !self.destroy(id) {
                fatal!(COMPONENT, "resource {id} was destroyed twice");
            }
        }
    }

    /// Destroy a resource now. Returns false if it was already gone.
    fn destroy(&mut self, id: ResourceId) -> bool {
        let Some(resource) = self.registry.remove(id) else {
            return false;
        };
        self.bindings.forget(id);
        if self.bindings.render_target == Some(id) {
            self.bindings.render_target = None;
            let Viewport { width, height } = self.viewport;
            self.backend.set_viewport(width, height);
        }
        self.backend.destroy(id, &resource);

        // A render target owns its color texture.
        if let RawResource::RenderTarget { texture, .. } = resource
            && let Some(color) = self.registry.remove(texture)
        {
            self.bindings.forget(texture);
            self.backend.destroy(texture, &color);
        }
        true
    }
}

impl Drop for GraphicsDevice {
    fn drop(&mut self) {
        for id in self.queue.drain_all() {
            if !self.destroy(id) {
                log::warn!("{COMPONENT}: skipping stale id {id} during shutdown");
            }
        }
        let leaked = self.registry.ids();
        if !leaked.is_empty() {
            log::warn!(
                "{COMPONENT}: {} resources were never freed, destroying them",
                leaked.len()
            );
        }
        for id in leaked {
            self.destroy(id);
        }
        log::debug!("{COMPONENT}: shut down after {} frames", self.queue.current_frame());
    }
}

static_assertions::assert_not_impl_any!(GraphicsDevice: Send, Sync);

//! OpenGL backend.
//!
//! One backend serves desktop OpenGL 3.x/4.x, OpenGL ES 2.0 and OpenGL ES
//! 3.x. The dialect is detected from the live context at creation time and
//! decides which optional paths are taken:
//!
//! - vertex array objects, when core or `GL_OES_vertex_array_object`
//! - luminance formats on GLES, swizzled `RED`/`RG` formats on desktop
//! - `TEXTURE_MAX_LEVEL` everywhere except GLES 2.0
//!
//! The backend is generic over [`GlApi`] so it can run on `glow` or on the
//! `RecordingGl` test double (`recording` feature).

pub mod api;
mod attributes;
mod detect;
mod formats;
#[cfg(all(feature = "opengl", not(target_arch = "wasm32")))]
mod glow_impl;
#[cfg(any(test, feature = "recording"))]
pub mod recording;

use std::collections::HashMap;

use crate::capabilities::{Capabilities, Dialect, Features};
use crate::context::ContextType;
use crate::error::GraphicsError;
use crate::resources::{GpuHandle, RawResource, ResourceId};
use crate::types::{
    BufferDescriptor, BufferType, Color, IndexType, PrimitiveType, RenderTargetDescriptor,
    ShaderStage, TextureDescriptor, TextureFilter, UniformValue, mip_dimensions,
};

use self::api::gl;
use self::attributes::AttributeCache;
use self::formats::FormatTriple;
use super::{
    GraphicsBackend, Presenter, ProgramBinding, RenderTargetHandles, VertexArrayBinding,
};

pub use api::{GlApi, GlVersion};
#[cfg(all(feature = "opengl", not(target_arch = "wasm32")))]
pub use glow_impl::GlowContext;
#[cfg(any(test, feature = "recording"))]
pub use recording::{GlCall, GlProfile, RecordingGl, RecordingPresenter};

const COMPONENT: &str = "OpenGlBackend";

/// Texture units tracked by the backend.
const TEXTURE_UNITS: usize = 8;

fn created(result: Result<u32, String>, what: &str) -> Result<u32, GraphicsError> {
    result.map_err(|err| GraphicsError::ResourceCreationFailed(format!("{what}: {err}")))
}

fn buffer_target(buffer_type: BufferType) -> u32 {
    match buffer_type {
        BufferType::Vertex => gl::ARRAY_BUFFER,
        BufferType::Index => gl::ELEMENT_ARRAY_BUFFER,
    }
}

/// OpenGL implementation of [`GraphicsBackend`].
pub struct OpenGlBackend<G: GlApi, P: Presenter> {
    gl: G,
    presenter: P,
    context_type: ContextType,
    capabilities: Capabilities,
    attributes: AttributeCache,
    /// Uniform lookups per program, including misses.
    uniform_locations: HashMap<GpuHandle, HashMap<String, Option<u32>>>,
    unit_textures: [GpuHandle; TEXTURE_UNITS],
    active_unit: u32,
    current_program: GpuHandle,
    bound_vertex_array: GpuHandle,
    /// Element buffer of the bound vertex array. Creating or updating an
    /// index buffer binds it temporarily and restores this afterwards.
    bound_index_buffer: GpuHandle,
    framebuffer: GpuHandle,
}

impl<G: GlApi, P: Presenter> OpenGlBackend<G, P> {
    /// Detect the current context and set up the backend.
    ///
    /// Fails if the context does not match `context_type`, for example an
    /// OpenGL ES request answered by a desktop context.
    pub fn new(gl: G, presenter: P, context_type: ContextType) -> Result<Self, GraphicsError> {
        let capabilities = detect::detect_capabilities(&gl);
        let wants_gles = context_type == ContextType::OpenGLES;
        if !context_type.is_opengl_family() || capabilities.dialect.is_gles() != wants_gles {
            return Err(GraphicsError::InitializationFailed(format!(
                "requested {context_type} but the current context is {}",
                capabilities.dialect
            )));
        }

        let attributes =
            AttributeCache::new(capabilities.has(Features::VERTEX_ARRAY_OBJECT));
        let backend = Self {
            gl,
            presenter,
            context_type,
            capabilities,
            attributes,
            uniform_locations: HashMap::new(),
            unit_textures: [GpuHandle::NULL; TEXTURE_UNITS],
            active_unit: 0,
            current_program: GpuHandle::NULL,
            bound_vertex_array: GpuHandle::NULL,
            bound_index_buffer: GpuHandle::NULL,
            framebuffer: GpuHandle::NULL,
        };
        let (width, height) = backend.presenter.drawable_size();
        backend.gl.viewport(0, 0, width as i32, height as i32);
        Ok(backend)
    }

    /// The function table the backend issues calls through.
    pub fn gl(&self) -> &G {
        &self.gl
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    fn vertex_array_objects(&self) -> bool {
        self.capabilities.has(Features::VERTEX_ARRAY_OBJECT)
    }

    fn restore_buffer_binding(&self, target: u32) {
        if target == gl::ELEMENT_ARRAY_BUFFER {
            self.gl.bind_buffer(target, self.bound_index_buffer.0);
        }
    }

    fn select_unit(&mut self, unit: u32) {
        if self.active_unit != unit {
            self.gl.active_texture(gl::TEXTURE0 + unit);
            self.active_unit = unit;
        }
    }

    /// Bind `texture` on unit 0 for configuration. Undo with
    /// [`Self::end_scratch_bind`].
    fn begin_scratch_bind(&mut self, texture: u32) {
        self.select_unit(0);
        self.gl.bind_texture(gl::TEXTURE_2D, texture);
    }

    fn end_scratch_bind(&self) {
        self.gl.bind_texture(gl::TEXTURE_2D, self.unit_textures[0].0);
    }

    /// Attach color and depth to the bound framebuffer `handles.framebuffer`.
    ///
    /// Every object created is recorded in `handles`, even on failure.
    fn build_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor,
        triple: FormatTriple,
        handles: &mut RenderTargetHandles,
    ) -> Result<(), GraphicsError> {
        let (width, height) = (descriptor.width as i32, descriptor.height as i32);

        let texture = created(self.gl.create_texture(), "render target texture")?;
        handles.texture = GpuHandle(texture);
        self.begin_scratch_bind(texture);
        self.gl.tex_image_2d(
            gl::TEXTURE_2D,
            0,
            triple.internal_format as i32,
            width,
            height,
            triple.format,
            triple.data_type,
            None,
        );
        self.gl
            .tex_parameter_i32(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as i32);
        self.gl
            .tex_parameter_i32(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as i32);
        self.gl
            .tex_parameter_i32(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
        self.gl
            .tex_parameter_i32(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
        self.end_scratch_bind();
        self.gl.framebuffer_texture_2d(
            gl::FRAMEBUFFER,
            gl::COLOR_ATTACHMENT0,
            gl::TEXTURE_2D,
            texture,
            0,
        );

        if descriptor.depth {
            let depth_buffer = created(self.gl.create_renderbuffer(), "depth buffer")?;
            handles.depth_buffer = GpuHandle(depth_buffer);
            let depth_format = if self.capabilities.max_depth_bits >= 24 {
                gl::DEPTH_COMPONENT24
            } else {
                gl::DEPTH_COMPONENT16
            };
            self.gl.bind_renderbuffer(gl::RENDERBUFFER, depth_buffer);
            self.gl
                .renderbuffer_storage(gl::RENDERBUFFER, depth_format, width, height);
            self.gl.framebuffer_renderbuffer(
                gl::FRAMEBUFFER,
                gl::DEPTH_ATTACHMENT,
                gl::RENDERBUFFER,
                depth_buffer,
            );
            self.gl.bind_renderbuffer(gl::RENDERBUFFER, 0);
        }

        let status = self.gl.check_framebuffer_status(gl::FRAMEBUFFER);
        if status != gl::FRAMEBUFFER_COMPLETE {
            log::warn!(
                "{COMPONENT}: framebuffer {} incomplete (status 0x{status:04X})",
                handles.framebuffer
            );
            return Err(GraphicsError::FramebufferIncomplete { status });
        }
        Ok(())
    }

    fn texture_triple(&self, descriptor: &TextureDescriptor) -> FormatTriple {
        match formats::texture_format(descriptor.format, &self.capabilities) {
            Some(triple) => triple,
            None => fatal!(COMPONENT, "Format not supported."),
        }
    }

    fn upload_levels(
        &self,
        descriptor: &TextureDescriptor,
        triple: FormatTriple,
        data: Option<&[u8]>,
    ) {
        let format = descriptor.format;
        let mut offset = 0;
        for level in 0..descriptor.mip_levels {
            let (width, height) = mip_dimensions(descriptor.width, descriptor.height, level);
            let size = format.data_size(width, height);
            let level_data = data.and_then(|bytes| bytes.get(offset..offset + size));
            offset += size;

            if format.is_compressed() {
                let Some(bytes) = level_data else {
                    break;
                };
                self.gl.compressed_tex_image_2d(
                    gl::TEXTURE_2D,
                    level as i32,
                    triple.internal_format,
                    width as i32,
                    height as i32,
                    bytes,
                );
            } else {
                self.gl.tex_image_2d(
                    gl::TEXTURE_2D,
                    level as i32,
                    triple.internal_format as i32,
                    width as i32,
                    height as i32,
                    triple.format,
                    triple.data_type,
                    level_data,
                );
            }
        }
    }

    /// Apply filter and wrap parameters to the texture bound on the active unit.
    fn configure_sampling(&self, descriptor: &TextureDescriptor) {
        let Some(wrap) = formats::wrap(descriptor.wrap, &self.capabilities) else {
            fatal!(COMPONENT, "Wrap mode not supported.");
        };

        let mipmapped = descriptor.mip_levels > 1;
        let pick = |plain: u32, mipped: u32| if mipmapped { mipped } else { plain };
        let (min, mag) = match descriptor.filter {
            TextureFilter::Point => (pick(gl::NEAREST, gl::NEAREST_MIPMAP_NEAREST), gl::NEAREST),
            TextureFilter::Bilinear => (pick(gl::LINEAR, gl::LINEAR_MIPMAP_NEAREST), gl::LINEAR),
            TextureFilter::Trilinear | TextureFilter::Anisotropic(_) => {
                (pick(gl::LINEAR, gl::LINEAR_MIPMAP_LINEAR), gl::LINEAR)
            }
        };
        self.gl
            .tex_parameter_i32(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, min as i32);
        self.gl
            .tex_parameter_i32(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, mag as i32);

        if let TextureFilter::Anisotropic(level) = descriptor.filter {
            if self.capabilities.has(Features::ANISOTROPIC_FILTER) {
                let max = self.capabilities.max_anisotropy.max(1.0);
                self.gl.tex_parameter_f32(
                    gl::TEXTURE_2D,
                    gl::TEXTURE_MAX_ANISOTROPY_EXT,
                    level.clamp(1.0, max),
                );
            } else {
                log::warn!("{COMPONENT}: anisotropic filtering unavailable, using trilinear");
            }
        }

        self.gl
            .tex_parameter_i32(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap as i32);
        self.gl
            .tex_parameter_i32(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap as i32);
    }

    fn uniform_location(&mut self, program: GpuHandle, name: &str) -> Option<u32> {
        let cache = self.uniform_locations.entry(program).or_default();
        if let Some(location) = cache.get(name) {
            return *location;
        }
        let location = self.gl.uniform_location(program.0, name);
        cache.insert(name.to_string(), location);
        location
    }

    fn upload_uniform(&self, location: u32, value: &UniformValue) {
        match value {
            UniformValue::Int(v) => self.gl.uniform_1_i32(location, *v),
            UniformValue::UnsignedInt(v) => self.gl.uniform_1_u32(location, *v),
            UniformValue::Float(v) => self.gl.uniform_1_f32(location, *v),
            UniformValue::Vec2([x, y]) => self.gl.uniform_2_f32(location, *x, *y),
            UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(location, *x, *y, *z),
            UniformValue::Vec4([x, y, z, w]) => self.gl.uniform_4_f32(location, *x, *y, *z, *w),
            UniformValue::Matrix4(m) => self.gl.uniform_matrix_4_f32(location, m),
            UniformValue::IntArray(values) => self.gl.uniform_1_i32_slice(location, values),
        }
    }

    /// Point the array's attributes at the inputs of `program`.
    fn configure_attributes(&mut self, array: &VertexArrayBinding<'_>, program: &ProgramBinding<'_>) {
        let Some(stale) = self.attributes.begin(array.id, program.handle) else {
            log::trace!(
                "{COMPONENT}: attributes of {} already set for program {}",
                array.id,
                program.handle
            );
            return;
        };
        for location in stale {
            self.gl.disable_vertex_attrib_array(location);
        }

        if !program.layout.is_compatible_with(array.layout) {
            log::debug!(
                "{COMPONENT}: layout of vertex array {} does not match program {}",
                array.id,
                program.handle
            );
            return;
        }

        let stride = array.layout.stride() as i32;
        let mut enabled = Vec::with_capacity(array.layout.elements().len());
        for (input, (element, offset)) in program.layout.elements().iter().zip(array.layout.iter()) {
            let Some(location) = self.gl.attrib_location(program.handle.0, &input.name) else {
                log::debug!(
                    "{COMPONENT}: program {} has no active attribute {}",
                    program.handle,
                    input.name
                );
                continue;
            };
            self.gl.enable_vertex_attrib_array(location);
            self.gl.vertex_attrib_pointer(
                location,
                element.count as i32,
                formats::element_type(element.element_type),
                element.normalized,
                stride,
                offset as i32,
            );
            enabled.push(location);
        }
        self.attributes.finish(array.id, program.handle, enabled);
    }
}

impl<G: GlApi, P: Presenter> GraphicsBackend for OpenGlBackend<G, P> {
    fn name(&self) -> &'static str {
        match self.context_type {
            ContextType::OpenGLES => "OpenGL ES Backend",
            _ => "OpenGL Backend",
        }
    }

    fn context_type(&self) -> ContextType {
        self.context_type
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn drawable_size(&self) -> (u32, u32) {
        self.presenter.drawable_size()
    }

    fn enable_alpha_blending(&mut self) {
        self.gl.enable(gl::BLEND);
        self.gl.blend_func(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
    }

    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        data: Option<&[u8]>,
    ) -> Result<GpuHandle, GraphicsError> {
        let target = buffer_target(descriptor.buffer_type);
        let buffer = created(self.gl.create_buffer(), "buffer")?;
        log::trace!(
            "{COMPONENT}: creating buffer {:?} {buffer} ({} bytes)",
            descriptor.label,
            descriptor.byte_size()
        );
        self.gl.bind_buffer(target, buffer);
        self.gl.buffer_data(
            target,
            descriptor.byte_size(),
            data,
            formats::buffer_usage(descriptor.usage),
        );
        self.restore_buffer_binding(target);
        Ok(GpuHandle(buffer))
    }

    fn update_buffer(&mut self, buffer: GpuHandle, descriptor: &BufferDescriptor, data: &[u8]) {
        let target = buffer_target(descriptor.buffer_type);
        self.gl.bind_buffer(target, buffer.0);
        self.gl.buffer_sub_data(target, 0, data);
        self.restore_buffer_binding(target);
    }

    fn read_buffer(
        &mut self,
        buffer: GpuHandle,
        descriptor: &BufferDescriptor,
    ) -> Result<Vec<u8>, GraphicsError> {
        if self.capabilities.dialect.is_gles() {
            return Err(GraphicsError::FeatureNotSupported(
                "buffer read-back on OpenGL ES".to_string(),
            ));
        }
        let target = buffer_target(descriptor.buffer_type);
        let mut contents = vec![0; descriptor.byte_size()];
        self.gl.bind_buffer(target, buffer.0);
        self.gl.get_buffer_sub_data(target, 0, &mut contents);
        self.restore_buffer_binding(target);
        Ok(contents)
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        data: Option<&[u8]>,
    ) -> Result<GpuHandle, GraphicsError> {
        let triple = self.texture_triple(descriptor);
        if !descriptor.is_power_of_two() && !self.capabilities.has(Features::TEXTURE_NPOT) {
            log::warn!(
                "{COMPONENT}: {}x{} texture is not a power of two and the context lacks NPOT support",
                descriptor.width,
                descriptor.height
            );
        }

        let texture = created(self.gl.create_texture(), "texture")?;
        log::trace!(
            "{COMPONENT}: creating texture {:?} {texture} ({}x{} {}, {} mips)",
            descriptor.label,
            descriptor.width,
            descriptor.height,
            descriptor.format,
            descriptor.mip_levels
        );
        self.begin_scratch_bind(texture);
        self.gl.pixel_store_i32(gl::UNPACK_ALIGNMENT, 1);
        self.upload_levels(descriptor, triple, data);

        let dialect = self.capabilities.dialect;
        if let Some(mask) = formats::swizzle_mask(descriptor.format, dialect) {
            self.gl
                .tex_parameter_i32_slice(gl::TEXTURE_2D, gl::TEXTURE_SWIZZLE_RGBA, &mask);
        }
        if dialect != Dialect::Gles2 {
            self.gl.tex_parameter_i32(
                gl::TEXTURE_2D,
                gl::TEXTURE_MAX_LEVEL,
                descriptor.mip_levels.saturating_sub(1) as i32,
            );
        }
        self.configure_sampling(descriptor);
        self.end_scratch_bind();
        Ok(GpuHandle(texture))
    }

    fn apply_sampling(&mut self, texture: GpuHandle, descriptor: &TextureDescriptor) {
        self.begin_scratch_bind(texture.0);
        self.configure_sampling(descriptor);
        self.end_scratch_bind();
    }

    fn bind_texture(&mut self, unit: u32, texture: GpuHandle) {
        self.select_unit(unit);
        self.gl.bind_texture(gl::TEXTURE_2D, texture.0);
        if let Some(slot) = self.unit_textures.get_mut(unit as usize) {
            *slot = texture;
        }
    }

    fn create_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<GpuHandle, GraphicsError> {
        let shader = created(self.gl.create_shader(formats::shader_stage(stage)), "shader")?;
        self.gl.shader_source(shader, source);
        self.gl.compile_shader(shader);
        if !self.gl.shader_compile_status(shader) {
            let log = self.gl.shader_info_log(shader);
            self.gl.delete_shader(shader);
            log::error!("{COMPONENT}: {stage} shader failed to compile: {log}");
            return Err(GraphicsError::ShaderCompilation { stage, log });
        }
        Ok(GpuHandle(shader))
    }

    fn create_program(&mut self) -> Result<GpuHandle, GraphicsError> {
        created(self.gl.create_program(), "program").map(GpuHandle)
    }

    fn attach_shader(&mut self, program: GpuHandle, shader: GpuHandle) {
        self.gl.attach_shader(program.0, shader.0);
    }

    fn link_program(&mut self, program: GpuHandle) -> Result<(), GraphicsError> {
        self.gl.link_program(program.0);
        self.uniform_locations.remove(&program);
        self.attributes.forget_program(program);
        if !self.gl.program_link_status(program.0) {
            let log = self.gl.program_info_log(program.0);
            log::error!("{COMPONENT}: program {program} failed to link: {log}");
            return Err(GraphicsError::ShaderLink { log });
        }
        Ok(())
    }

    fn use_program(&mut self, program: &ProgramBinding<'_>) {
        if self.current_program != program.handle {
            self.gl.use_program(program.handle.0);
            self.current_program = program.handle;
        }
        if let Some(name) = program.sampler_uniform
            && program.sampler_count > 0
        {
            match self.uniform_location(program.handle, name) {
                Some(location) => {
                    let units: Vec<i32> = (0..program.sampler_count as i32).collect();
                    self.gl.uniform_1_i32_slice(location, &units);
                }
                None => log::debug!(
                    "{COMPONENT}: program {} has no sampler uniform {name}",
                    program.handle
                ),
            }
        }
    }

    fn attrib_location(&mut self, program: GpuHandle, name: &str) -> Option<u32> {
        self.gl.attrib_location(program.0, name)
    }

    fn set_uniform(&mut self, program: GpuHandle, name: &str, value: &UniformValue) -> bool {
        let Some(location) = self.uniform_location(program, name) else {
            return false;
        };
        let previous = self.current_program;
        if previous != program {
            self.gl.use_program(program.0);
        }
        self.upload_uniform(location, value);
        if previous != program {
            self.gl.use_program(previous.0);
        }
        true
    }

    fn create_vertex_array(&mut self) -> Result<GpuHandle, GraphicsError> {
        if !self.vertex_array_objects() {
            return Ok(GpuHandle::NULL);
        }
        created(self.gl.create_vertex_array(), "vertex array").map(GpuHandle)
    }

    fn bind_vertex_array(
        &mut self,
        array: &VertexArrayBinding<'_>,
        program: Option<&ProgramBinding<'_>>,
    ) {
        if self.vertex_array_objects() && self.bound_vertex_array != array.handle {
            self.gl.bind_vertex_array(array.handle.0);
            self.bound_vertex_array = array.handle;
        }
        self.gl.bind_buffer(gl::ARRAY_BUFFER, array.vertex_buffer.0);
        self.gl
            .bind_buffer(gl::ELEMENT_ARRAY_BUFFER, array.index_buffer.0);
        self.bound_index_buffer = array.index_buffer;

        if let Some(program) = program {
            self.configure_attributes(array, program);
        }
    }

    fn create_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTargetHandles, GraphicsError> {
        let triple = self.texture_triple(&descriptor.color_texture());
        let framebuffer = created(self.gl.create_framebuffer(), "framebuffer")?;
        self.gl.bind_framebuffer(gl::FRAMEBUFFER, framebuffer);

        let mut handles = RenderTargetHandles {
            framebuffer: GpuHandle(framebuffer),
            texture: GpuHandle::NULL,
            depth_buffer: GpuHandle::NULL,
        };
        let result = self.build_render_target(descriptor, triple, &mut handles);
        self.gl.bind_framebuffer(gl::FRAMEBUFFER, self.framebuffer.0);

        match result {
            Ok(()) => Ok(handles),
            Err(err) => {
                self.gl.delete_framebuffer(handles.framebuffer.0);
                if !handles.texture.is_null() {
                    self.gl.delete_texture(handles.texture.0);
                }
                if !handles.depth_buffer.is_null() {
                    self.gl.delete_renderbuffer(handles.depth_buffer.0);
                }
                Err(err)
            }
        }
    }

    fn bind_render_target(&mut self, framebuffer: GpuHandle, width: u32, height: u32) {
        if self.framebuffer != framebuffer {
            self.gl.bind_framebuffer(gl::FRAMEBUFFER, framebuffer.0);
            self.framebuffer = framebuffer;
        }
        self.set_viewport(width, height);
    }

    fn clear(&mut self, color: Color) {
        self.gl.clear_color(color.r, color.g, color.b, color.a);
        self.gl.clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    fn draw(&mut self, primitive: PrimitiveType, start: u32, count: u32) {
        self.gl
            .draw_arrays(formats::primitive(primitive), start as i32, count as i32);
    }

    fn draw_indexed(
        &mut self,
        primitive: PrimitiveType,
        start: u32,
        count: u32,
        index_type: IndexType,
    ) {
        let Some(offset) = start
            .checked_mul(index_type.size())
            .and_then(|offset| i32::try_from(offset).ok())
        else {
            fatal!(
                COMPONENT,
                "index offset of {start} {index_type:?} indices overflows"
            );
        };
        self.gl.draw_elements(
            formats::primitive(primitive),
            count as i32,
            formats::index_type(index_type),
            offset,
        );
    }

    fn destroy(&mut self, id: ResourceId, resource: &RawResource) {
        log::trace!("{COMPONENT}: destroying {} {id}", resource.kind());
        match resource {
            RawResource::Buffer { handle, .. } => {
                if self.bound_index_buffer == *handle {
                    self.bound_index_buffer = GpuHandle::NULL;
                }
                self.gl.delete_buffer(handle.0);
            }
            RawResource::Shader { handle, .. } => self.gl.delete_shader(handle.0),
            RawResource::ShaderProgram { handle, .. } => {
                if self.current_program == *handle {
                    self.current_program = GpuHandle::NULL;
                }
                self.attributes.forget_program(*handle);
                self.uniform_locations.remove(handle);
                self.gl.delete_program(handle.0);
            }
            RawResource::VertexArray { handle, .. } => {
                self.attributes.forget_array(id);
                if !handle.is_null() {
                    if self.bound_vertex_array == *handle {
                        self.bound_vertex_array = GpuHandle::NULL;
                        self.bound_index_buffer = GpuHandle::NULL;
                    }
                    self.gl.delete_vertex_array(handle.0);
                }
            }
            RawResource::Texture { handle, .. } => {
                for slot in &mut self.unit_textures {
                    if *slot == *handle {
                        *slot = GpuHandle::NULL;
                    }
                }
                self.gl.delete_texture(handle.0);
            }
            RawResource::RenderTarget {
                framebuffer,
                depth_buffer,
                ..
            } => {
                if self.framebuffer == *framebuffer {
                    self.gl.bind_framebuffer(gl::FRAMEBUFFER, 0);
                    self.framebuffer = GpuHandle::NULL;
                }
                self.gl.delete_framebuffer(framebuffer.0);
                if !depth_buffer.is_null() {
                    self.gl.delete_renderbuffer(depth_buffer.0);
                }
            }
        }
    }

    fn present(&mut self) {
        self.presenter.swap_buffers();
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::layout::{VertexElement, VertexLayout};
    use crate::resources::ResourceRegistry;
    use crate::types::{BufferUsage, PixelFormat, TextureWrap};

    type TestBackend = OpenGlBackend<RecordingGl, RecordingPresenter>;

    const VERTEX: &str = "attribute vec3 NG_VertexPos;\n\
                          attribute vec2 NG_VertexTexCoord;\n\
                          attribute vec4 NG_VertexColor;\n\
                          uniform mat4 NGU_MATRIX_MVP;\n\
                          void main() {}";
    const FRAGMENT: &str = "uniform sampler2D NGU_TEXTURE[8];\nvoid main() {}";

    fn backend(profile: GlProfile) -> (TestBackend, RecordingGl) {
        let context_type = if profile.version.is_embedded {
            ContextType::OpenGLES
        } else {
            ContextType::OpenGL
        };
        let gl = RecordingGl::new(profile);
        let backend =
            OpenGlBackend::new(gl.clone(), RecordingPresenter::new(800, 600), context_type)
                .unwrap();
        (backend, gl)
    }

    fn linked_program(backend: &mut TestBackend) -> GpuHandle {
        let vs = backend.create_shader(ShaderStage::Vertex, VERTEX).unwrap();
        let fs = backend.create_shader(ShaderStage::Fragment, FRAGMENT).unwrap();
        let program = backend.create_program().unwrap();
        backend.attach_shader(program, vs);
        backend.attach_shader(program, fs);
        backend.link_program(program).unwrap();
        program
    }

    fn array_id() -> ResourceId {
        ResourceRegistry::new().insert(RawResource::Shader {
            handle: GpuHandle(1),
            stage: ShaderStage::Vertex,
        })
    }

    #[test]
    fn test_new_sets_viewport() {
        let (backend, gl) = backend(GlProfile::desktop(3, 3));
        assert_eq!(backend.name(), "OpenGL Backend");
        assert_eq!(
            gl.calls(),
            vec![GlCall::Viewport {
                x: 0,
                y: 0,
                width: 800,
                height: 600
            }]
        );
    }

    #[test]
    fn test_dialect_mismatch_fails() {
        let result = OpenGlBackend::new(
            RecordingGl::new(GlProfile::desktop(3, 3)),
            RecordingPresenter::new(800, 600),
            ContextType::OpenGLES,
        );
        assert!(matches!(result, Err(GraphicsError::InitializationFailed(_))));
    }

    #[test]
    fn test_alpha_blending() {
        let (mut backend, gl) = backend(GlProfile::gles2());
        gl.clear_calls();
        backend.enable_alpha_blending();
        assert_eq!(
            gl.calls(),
            vec![
                GlCall::Enable(gl::BLEND),
                GlCall::BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA)
            ]
        );
    }

    #[test]
    fn test_index_buffer_creation_restores_binding() {
        let (mut backend, gl) = backend(GlProfile::desktop(3, 3));
        let desc = BufferDescriptor::index(BufferUsage::Dynamic, IndexType::U16, 6);
        let buffer = backend.create_buffer(&desc, None).unwrap();

        let element_binds: Vec<u32> = gl
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                GlCall::BindBuffer {
                    target: gl::ELEMENT_ARRAY_BUFFER,
                    buffer,
                } => Some(buffer),
                _ => None,
            })
            .collect();
        assert_eq!(element_binds, vec![buffer.0, 0]);
        assert_eq!(gl.buffer_contents(buffer.0), Some(vec![0; 12]));
    }

    #[test]
    fn test_buffer_update_and_read_back() {
        let (mut backend, _gl) = backend(GlProfile::desktop(3, 3));
        let desc = BufferDescriptor::vertex(BufferUsage::Dynamic, 2, 3);
        let buffer = backend.create_buffer(&desc, None).unwrap();
        backend.update_buffer(buffer, &desc, &[1, 2, 3, 4]);
        assert_eq!(
            backend.read_buffer(buffer, &desc).unwrap(),
            vec![1, 2, 3, 4, 0, 0]
        );
    }

    #[test]
    fn test_gles_cannot_read_back() {
        let (mut backend, _gl) = backend(GlProfile::gles3());
        let desc = BufferDescriptor::vertex(BufferUsage::Dynamic, 4, 1);
        let buffer = backend.create_buffer(&desc, None).unwrap();
        assert!(matches!(
            backend.read_buffer(buffer, &desc),
            Err(GraphicsError::FeatureNotSupported(_))
        ));
    }

    #[test]
    fn test_texture_uploads_every_mip() {
        let (mut backend, gl) = backend(GlProfile::desktop(3, 3));
        let desc =
            TextureDescriptor::new_2d(4, 4, PixelFormat::UncompressedR8G8B8A8).with_mip_levels(3);
        let data = vec![0u8; desc.data_size()];
        backend.create_texture(&desc, Some(&data)).unwrap();

        let uploads: Vec<(i32, i32, Option<usize>)> = gl
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                GlCall::TexImage2D {
                    level, width, len, ..
                } => Some((level, width, len)),
                _ => None,
            })
            .collect();
        assert_eq!(uploads, vec![(0, 4, Some(64)), (1, 2, Some(16)), (2, 1, Some(4))]);
        assert!(gl.calls().contains(&GlCall::TexParameterI {
            parameter: gl::TEXTURE_MAX_LEVEL,
            value: 2
        }));
        assert!(gl.calls().contains(&GlCall::TexParameterI {
            parameter: gl::TEXTURE_MIN_FILTER,
            value: gl::NEAREST_MIPMAP_NEAREST as i32
        }));
    }

    #[test]
    fn test_gles2_skips_max_level() {
        let (mut backend, gl) = backend(GlProfile::gles2());
        let desc = TextureDescriptor::new_2d(8, 8, PixelFormat::UncompressedR8G8B8);
        backend.create_texture(&desc, None).unwrap();
        assert_eq!(
            gl.count(|call| matches!(
                call,
                GlCall::TexParameterI {
                    parameter: gl::TEXTURE_MAX_LEVEL,
                    ..
                }
            )),
            0
        );
        assert!(gl.calls().contains(&GlCall::TexImage2D {
            level: 0,
            internal_format: gl::RGB as i32,
            width: 8,
            height: 8,
            format: gl::RGB,
            data_type: gl::UNSIGNED_BYTE,
            len: None,
        }));
    }

    #[test]
    fn test_compressed_upload() {
        let profile = GlProfile::gles2().with_extension("GL_OES_compressed_ETC1_RGB8_texture");
        let (mut backend, gl) = backend(profile);
        let desc = TextureDescriptor::new_2d(4, 4, PixelFormat::CompressedEtc1Rgb);
        backend.create_texture(&desc, Some(&[0; 8])).unwrap();
        assert!(gl.calls().contains(&GlCall::CompressedTexImage2D {
            level: 0,
            internal_format: gl::ETC1_RGB8_OES,
            width: 4,
            height: 4,
            len: 8,
        }));
    }

    #[test]
    #[should_panic(expected = "Format not supported.")]
    fn test_unsupported_format_is_fatal() {
        let (mut backend, _gl) = backend(GlProfile::desktop(3, 3));
        let desc = TextureDescriptor::new_2d(8, 8, PixelFormat::CompressedAstc8x8Rgba);
        let _ = backend.create_texture(&desc, Some(&[0; 16]));
    }

    #[test]
    #[should_panic(expected = "Wrap mode not supported.")]
    fn test_unsupported_wrap_is_fatal() {
        let (mut backend, _gl) = backend(GlProfile::desktop(3, 3));
        let desc = TextureDescriptor::new_2d(8, 8, PixelFormat::UncompressedR8G8B8A8)
            .with_wrap(TextureWrap::MirrorClamp);
        let _ = backend.create_texture(&desc, None);
    }

    #[test]
    fn test_desktop_grayscale_is_swizzled() {
        let (mut backend, gl) = backend(GlProfile::desktop(3, 3));
        let desc = TextureDescriptor::new_2d(4, 4, PixelFormat::UncompressedGrayscale);
        backend.create_texture(&desc, None).unwrap();
        let red = gl::RED as i32;
        assert!(gl.calls().contains(&GlCall::TexParameterIv {
            parameter: gl::TEXTURE_SWIZZLE_RGBA,
            values: vec![red, red, red, gl::ONE as i32],
        }));
    }

    #[test]
    fn test_anisotropy_is_clamped() {
        let profile = GlProfile::desktop(4, 5)
            .with_extension("GL_EXT_texture_filter_anisotropic")
            .with_max_anisotropy(8.0);
        let (mut backend, gl) = backend(profile);
        let desc = TextureDescriptor::new_2d(4, 4, PixelFormat::UncompressedR8G8B8A8)
            .with_filter(TextureFilter::Anisotropic(16.0));
        backend.create_texture(&desc, None).unwrap();
        assert!(gl.calls().contains(&GlCall::TexParameterF {
            parameter: gl::TEXTURE_MAX_ANISOTROPY_EXT,
            value: 8.0
        }));
    }

    #[test]
    fn test_anisotropy_falls_back_to_trilinear() {
        let (mut backend, gl) = backend(GlProfile::desktop(3, 3));
        let desc = TextureDescriptor::new_2d(4, 4, PixelFormat::UncompressedR8G8B8A8)
            .with_mip_levels(2)
            .with_filter(TextureFilter::Anisotropic(4.0));
        backend.create_texture(&desc, None).unwrap();
        assert_eq!(gl.count(|call| matches!(call, GlCall::TexParameterF { .. })), 0);
        assert!(gl.calls().contains(&GlCall::TexParameterI {
            parameter: gl::TEXTURE_MIN_FILTER,
            value: gl::LINEAR_MIPMAP_LINEAR as i32
        }));
    }

    #[test]
    fn test_texture_creation_restores_unit_zero() {
        let (mut backend, gl) = backend(GlProfile::desktop(3, 3));
        let desc = TextureDescriptor::new_2d(4, 4, PixelFormat::UncompressedR8G8B8A8);
        let bound = backend.create_texture(&desc, None).unwrap();
        backend.bind_texture(0, bound);
        backend.create_texture(&desc, None).unwrap();

        let last_bind = gl.calls().into_iter().rev().find_map(|call| match call {
            GlCall::BindTexture { texture, .. } => Some(texture),
            _ => None,
        });
        assert_eq!(last_bind, Some(bound.0));
    }

    #[test]
    fn test_bind_texture_selects_unit_once() {
        let (mut backend, gl) = backend(GlProfile::desktop(3, 3));
        gl.clear_calls();
        backend.bind_texture(3, GpuHandle(5));
        backend.bind_texture(3, GpuHandle(6));
        assert_eq!(
            gl.count(|call| *call == GlCall::ActiveTexture(gl::TEXTURE0 + 3)),
            1
        );
    }

    #[test]
    fn test_compile_failure_deletes_shader() {
        let (mut backend, gl) = backend(GlProfile::desktop(3, 3));
        let err = backend
            .create_shader(ShaderStage::Fragment, "precision mediump float;")
            .unwrap_err();
        assert!(matches!(
            err,
            GraphicsError::ShaderCompilation {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert_eq!(gl.count(|call| matches!(call, GlCall::DeleteShader(_))), 1);
    }

    #[test]
    fn test_link_failure_returns_log() {
        let (mut backend, _gl) = backend(GlProfile::desktop(3, 3));
        let vs = backend.create_shader(ShaderStage::Vertex, VERTEX).unwrap();
        let program = backend.create_program().unwrap();
        backend.attach_shader(program, vs);
        let err = backend.link_program(program).unwrap_err();
        assert!(err.to_string().contains("vertex and a fragment"));
    }

    #[test]
    fn test_use_program_uploads_sampler_units() {
        let (mut backend, gl) = backend(GlProfile::desktop(3, 3));
        let program = linked_program(&mut backend);
        let layout = VertexLayout::sprite();
        backend.use_program(&ProgramBinding {
            handle: program,
            layout: &layout,
            sampler_uniform: Some("NGU_TEXTURE"),
            sampler_count: 4,
        });
        assert!(gl.calls().contains(&GlCall::UseProgram(program.0)));
        assert!(gl.calls().contains(&GlCall::Uniform1iv {
            location: 1,
            values: vec![0, 1, 2, 3]
        }));
    }

    #[test]
    fn test_set_uniform_restores_current_program() {
        let (mut backend, gl) = backend(GlProfile::desktop(3, 3));
        let program = linked_program(&mut backend);
        gl.clear_calls();

        assert!(backend.set_uniform(program, "NGU_MATRIX_MVP", &UniformValue::Matrix4([1.0; 16])));
        assert!(!backend.set_uniform(program, "missing", &UniformValue::Int(1)));
        assert_eq!(
            gl.calls(),
            vec![
                GlCall::UseProgram(program.0),
                GlCall::UniformMatrix4 {
                    location: 0,
                    values: [1.0; 16]
                },
                GlCall::UseProgram(0),
            ]
        );
    }

    #[test]
    fn test_attributes_configured_once_per_program() {
        let (mut backend, gl) = backend(GlProfile::desktop(3, 3));
        let program = linked_program(&mut backend);
        let layout = VertexLayout::sprite();
        let binding = ProgramBinding {
            handle: program,
            layout: &layout,
            sampler_uniform: None,
            sampler_count: 0,
        };
        let vao = backend.create_vertex_array().unwrap();
        assert!(!vao.is_null());
        let array = VertexArrayBinding {
            id: array_id(),
            handle: vao,
            vertex_buffer: GpuHandle(40),
            index_buffer: GpuHandle::NULL,
            layout: &layout,
        };

        backend.bind_vertex_array(&array, Some(&binding));
        backend.bind_vertex_array(&array, Some(&binding));

        let pointers: Vec<(u32, i32, i32)> = gl
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                GlCall::VertexAttribPointer {
                    index,
                    stride,
                    offset,
                    ..
                } => Some((index, stride, offset)),
                _ => None,
            })
            .collect();
        assert_eq!(pointers, vec![(0, 36, 0), (1, 36, 12), (2, 36, 20)]);
        assert_eq!(gl.count(|call| *call == GlCall::BindVertexArray(vao.0)), 1);
    }

    #[test]
    fn test_gles2_without_extension_never_touches_vertex_arrays() {
        let (mut backend, gl) = backend(GlProfile::gles2());
        let program = linked_program(&mut backend);
        let layout = VertexLayout::sprite();
        let binding = ProgramBinding {
            handle: program,
            layout: &layout,
            sampler_uniform: None,
            sampler_count: 0,
        };
        let handle = backend.create_vertex_array().unwrap();
        assert!(handle.is_null());
        let array = VertexArrayBinding {
            id: array_id(),
            handle,
            vertex_buffer: GpuHandle(40),
            index_buffer: GpuHandle(41),
            layout: &layout,
        };
        backend.bind_vertex_array(&array, Some(&binding));
        backend.destroy(
            array.id,
            &RawResource::VertexArray {
                handle,
                vertex_buffer: ResourceId::INVALID,
                index_buffer: None,
                layout: std::sync::Arc::new(layout.clone()),
            },
        );

        assert_eq!(
            gl.count(|call| matches!(
                call,
                GlCall::CreateVertexArray(_)
                    | GlCall::BindVertexArray(_)
                    | GlCall::DeleteVertexArray(_)
            )),
            0
        );
        assert_eq!(
            gl.count(|call| matches!(call, GlCall::VertexAttribPointer { .. })),
            3
        );
    }

    #[test]
    fn test_incompatible_layout_enables_nothing() {
        let (mut backend, gl) = backend(GlProfile::desktop(3, 3));
        let program = linked_program(&mut backend);
        let program_layout = VertexLayout::sprite();
        let array_layout = VertexLayout::new().with_element(VertexElement::float("pos", 2));
        let binding = ProgramBinding {
            handle: program,
            layout: &program_layout,
            sampler_uniform: None,
            sampler_count: 0,
        };
        let array = VertexArrayBinding {
            id: array_id(),
            handle: backend.create_vertex_array().unwrap(),
            vertex_buffer: GpuHandle(40),
            index_buffer: GpuHandle::NULL,
            layout: &array_layout,
        };
        backend.bind_vertex_array(&array, Some(&binding));
        assert_eq!(
            gl.count(|call| matches!(call, GlCall::EnableVertexAttribArray(_))),
            0
        );
    }

    #[test]
    fn test_draw_indexed_offset_in_bytes() {
        let (mut backend, gl) = backend(GlProfile::desktop(3, 3));
        gl.clear_calls();
        backend.draw_indexed(PrimitiveType::TriangleList, 6, 3, IndexType::U16);
        backend.draw(PrimitiveType::LineList, 2, 4);
        assert_eq!(
            gl.calls(),
            vec![
                GlCall::DrawElements {
                    mode: gl::TRIANGLES,
                    count: 3,
                    element_type: gl::UNSIGNED_SHORT,
                    offset: 12
                },
                GlCall::DrawArrays {
                    mode: gl::LINES,
                    first: 2,
                    count: 4
                },
            ]
        );
    }

    #[test]
    fn test_render_target_depth_precision() {
        let (mut backend, gl) = backend(GlProfile::gles2());
        let handles = backend
            .create_render_target(&RenderTargetDescriptor::new(64, 32))
            .unwrap();
        assert!(!handles.depth_buffer.is_null());
        assert!(gl.calls().contains(&GlCall::RenderbufferStorage {
            internal_format: gl::DEPTH_COMPONENT16,
            width: 64,
            height: 32
        }));
        // The screen framebuffer is bound again afterwards.
        assert_eq!(
            gl.calls().into_iter().rev().find(|c| matches!(c, GlCall::BindFramebuffer(_))),
            Some(GlCall::BindFramebuffer(0))
        );
    }

    #[test]
    fn test_incomplete_render_target_is_cleaned_up() {
        let (mut backend, gl) = backend(GlProfile::desktop(3, 3).with_incomplete_framebuffers());
        let err = backend
            .create_render_target(&RenderTargetDescriptor::new(64, 64))
            .unwrap_err();
        assert!(matches!(err, GraphicsError::FramebufferIncomplete { .. }));
        assert_eq!(gl.count(|call| matches!(call, GlCall::DeleteFramebuffer(_))), 1);
        assert_eq!(gl.count(|call| matches!(call, GlCall::DeleteTexture(_))), 1);
        assert_eq!(gl.count(|call| matches!(call, GlCall::DeleteRenderbuffer(_))), 1);
    }

    #[rstest]
    #[case::texture_fails(1, 0)]
    #[case::depth_buffer_fails(2, 1)]
    fn test_failed_render_target_allocation_is_cleaned_up(
        #[case] limit: u32,
        #[case] textures: usize,
    ) {
        let (mut backend, gl) = backend(GlProfile::desktop(3, 3).with_object_limit(limit));
        gl.clear_calls();
        let err = backend
            .create_render_target(&RenderTargetDescriptor::new(64, 64))
            .unwrap_err();
        assert!(matches!(err, GraphicsError::ResourceCreationFailed(_)));

        assert_eq!(gl.count(|call| matches!(call, GlCall::DeleteFramebuffer(1))), 1);
        assert_eq!(gl.count(|call| matches!(call, GlCall::DeleteTexture(_))), textures);
        assert_eq!(gl.count(|call| matches!(call, GlCall::DeleteRenderbuffer(_))), 0);
        // The screen framebuffer is bound again.
        let binds: Vec<_> = gl
            .calls()
            .into_iter()
            .filter(|call| matches!(call, GlCall::BindFramebuffer(_)))
            .collect();
        assert_eq!(binds, vec![GlCall::BindFramebuffer(1), GlCall::BindFramebuffer(0)]);
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn test_draw_indexed_offset_overflow_is_fatal() {
        let (mut backend, _gl) = backend(GlProfile::desktop(3, 3));
        backend.draw_indexed(PrimitiveType::TriangleList, u32::MAX / 2, 3, IndexType::U32);
    }

    #[test]
    fn test_present_swaps() {
        let presenter = RecordingPresenter::new(320, 240);
        let mut backend = OpenGlBackend::new(
            RecordingGl::new(GlProfile::gles3()),
            presenter.clone(),
            ContextType::OpenGLES,
        )
        .unwrap();
        backend.present();
        backend.present();
        assert_eq!(presenter.swap_count(), 2);
        assert_eq!(backend.drawable_size(), (320, 240));
    }
}

//! Recording OpenGL implementation.
//!
//! [`RecordingGl`] implements [`GlApi`] without a driver. It models just
//! enough state to behave like a context (object names, buffer contents,
//! shader compilation and program linking) and records every state-changing
//! call so tests can assert on the exact API traffic the backend produces.
//! Clones share the same state.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::backend::Presenter;
use crate::backend::glsl;

use super::api::{GlApi, GlVersion, gl};

/// Driver characteristics a [`RecordingGl`] pretends to have.
#[derive(Debug, Clone, PartialEq)]
pub struct GlProfile {
    pub version: GlVersion,
    pub extensions: Vec<String>,
    pub max_anisotropy: f32,
    /// Status returned by every framebuffer completeness check.
    pub framebuffer_status: u32,
    /// Number of objects that can be created before creation starts failing.
    pub object_limit: Option<u32>,
}

impl GlProfile {
    /// Desktop OpenGL context.
    pub fn desktop(major: u32, minor: u32) -> Self {
        Self::new(GlVersion::desktop(major, minor))
    }

    /// OpenGL ES 2.0 context.
    pub fn gles2() -> Self {
        Self::new(GlVersion::embedded(2, 0))
    }

    /// OpenGL ES 3.0 context.
    pub fn gles3() -> Self {
        Self::new(GlVersion::embedded(3, 0))
    }

    fn new(version: GlVersion) -> Self {
        Self {
            version,
            extensions: Vec::new(),
            max_anisotropy: 0.0,
            framebuffer_status: gl::FRAMEBUFFER_COMPLETE,
            object_limit: None,
        }
    }

    /// Report an additional extension.
    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.extensions.push(name.into());
        self
    }

    /// Value reported for `MAX_TEXTURE_MAX_ANISOTROPY_EXT`.
    pub fn with_max_anisotropy(mut self, max: f32) -> Self {
        self.max_anisotropy = max;
        self
    }

    /// Fail every object creation after the first `count`.
    pub fn with_object_limit(mut self, count: u32) -> Self {
        self.object_limit = Some(count);
        self
    }

    /// Report every framebuffer as incomplete.
    pub fn with_incomplete_framebuffers(mut self) -> Self {
        self.framebuffer_status = gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT;
        self
    }
}

/// One recorded state-changing call.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    ClearColor([f32; 4]),
    Clear(u32),
    Enable(u32),
    BlendFunc(u32, u32),

    CreateBuffer(u32),
    BindBuffer { target: u32, buffer: u32 },
    BufferData { target: u32, size: usize, usage: u32, initialized: bool },
    BufferSubData { target: u32, offset: usize, len: usize },
    GetBufferSubData { target: u32, offset: usize, len: usize },
    DeleteBuffer(u32),

    CreateVertexArray(u32),
    BindVertexArray(u32),
    DeleteVertexArray(u32),
    EnableVertexAttribArray(u32),
    DisableVertexAttribArray(u32),
    VertexAttribPointer {
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    },

    CreateShader { stage: u32, shader: u32 },
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    UseProgram(u32),
    DeleteProgram(u32),

    Uniform1i { location: u32, value: i32 },
    Uniform1u { location: u32, value: u32 },
    UniformFloats { location: u32, values: Vec<f32> },
    Uniform1iv { location: u32, values: Vec<i32> },
    UniformMatrix4 { location: u32, values: [f32; 16] },

    CreateTexture(u32),
    ActiveTexture(u32),
    BindTexture { target: u32, texture: u32 },
    TexImage2D {
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        data_type: u32,
        len: Option<usize>,
    },
    CompressedTexImage2D {
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        len: usize,
    },
    TexParameterI { parameter: u32, value: i32 },
    TexParameterF { parameter: u32, value: f32 },
    TexParameterIv { parameter: u32, values: Vec<i32> },
    PixelStore { parameter: u32, value: i32 },
    DeleteTexture(u32),

    CreateFramebuffer(u32),
    BindFramebuffer(u32),
    FramebufferTexture2D { attachment: u32, texture: u32 },
    CheckFramebufferStatus(u32),
    DeleteFramebuffer(u32),
    CreateRenderbuffer(u32),
    BindRenderbuffer(u32),
    RenderbufferStorage { internal_format: u32, width: i32, height: i32 },
    FramebufferRenderbuffer { attachment: u32, renderbuffer: u32 },
    DeleteRenderbuffer(u32),

    DrawArrays { mode: u32, first: i32, count: i32 },
    DrawElements { mode: u32, count: i32, element_type: u32, offset: i32 },
}

#[derive(Debug)]
struct RecordedShader {
    stage: u32,
    source: String,
    compiled: bool,
}

#[derive(Debug, Default)]
struct RecordedProgram {
    shaders: Vec<u32>,
    linked: bool,
    log: String,
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct RecordingState {
    next_name: u32,
    calls: Vec<GlCall>,
    bindings: HashMap<u32, u32>,
    buffers: HashMap<u32, Vec<u8>>,
    shaders: HashMap<u32, RecordedShader>,
    programs: HashMap<u32, RecordedProgram>,
}

impl RecordingState {
    fn allocate(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }

    fn bound_buffer(&mut self, target: u32) -> Option<&mut Vec<u8>> {
        let name = *self.bindings.get(&target)?;
        self.buffers.get_mut(&name)
    }
}

/// Fake OpenGL context that records its calls.
#[derive(Debug, Clone)]
pub struct RecordingGl {
    profile: Arc<GlProfile>,
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingGl {
    /// Create a context reporting `profile`.
    pub fn new(profile: GlProfile) -> Self {
        Self {
            profile: Arc::new(profile),
            state: Arc::new(Mutex::new(RecordingState::default())),
        }
    }

    /// Profile the context reports.
    pub fn profile(&self) -> &GlProfile {
        &self.profile
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.lock().calls.clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&GlCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| predicate(c)).count()
    }

    /// Forget recorded calls, keeping object state.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Current contents of `buffer`.
    pub fn buffer_contents(&self, buffer: u32) -> Option<Vec<u8>> {
        self.state.lock().buffers.get(&buffer).cloned()
    }

    fn record(&self, call: GlCall) {
        self.state.lock().calls.push(call);
    }

    fn create(&self, call: impl FnOnce(u32) -> GlCall) -> Result<u32, String> {
        let mut state = self.state.lock();
        if self
            .profile
            .object_limit
            .is_some_and(|limit| state.next_name >= limit)
        {
            return Err("out of memory".to_string());
        }
        let name = state.allocate();
        state.calls.push(call(name));
        Ok(name)
    }
}

impl GlApi for RecordingGl {
    fn version(&self) -> GlVersion {
        self.profile.version
    }

    fn get_string(&self, name: u32) -> String {
        match name {
            gl::VENDOR => "Ngine".to_string(),
            gl::RENDERER => "Recording".to_string(),
            gl::VERSION => {
                let v = self.profile.version;
                let prefix = if v.is_embedded { "OpenGL ES " } else { "" };
                format!("{prefix}{}.{}", v.major, v.minor)
            }
            gl::EXTENSIONS => self.profile.extensions.join(" "),
            _ => String::new(),
        }
    }

    fn get_string_indexed(&self, name: u32, index: u32) -> String {
        match name {
            gl::EXTENSIONS => self
                .profile
                .extensions
                .get(index as usize)
                .cloned()
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn get_integer(&self, name: u32) -> i32 {
        match name {
            gl::NUM_EXTENSIONS => self.profile.extensions.len() as i32,
            _ => 0,
        }
    }

    fn get_float(&self, name: u32) -> f32 {
        match name {
            gl::MAX_TEXTURE_MAX_ANISOTROPY_EXT => self.profile.max_anisotropy,
            _ => 0.0,
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear(&self, mask: u32) {
        self.record(GlCall::Clear(mask));
    }

    fn enable(&self, capability: u32) {
        self.record(GlCall::Enable(capability));
    }

    fn blend_func(&self, src: u32, dst: u32) {
        self.record(GlCall::BlendFunc(src, dst));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let name = self.create(GlCall::CreateBuffer)?;
        self.state.lock().buffers.insert(name, Vec::new());
        Ok(name)
    }

    fn bind_buffer(&self, target: u32, buffer: u32) {
        let mut state = self.state.lock();
        state.bindings.insert(target, buffer);
        state.calls.push(GlCall::BindBuffer { target, buffer });
    }

    fn buffer_data(&self, target: u32, size: usize, data: Option<&[u8]>, usage: u32) {
        let mut state = self.state.lock();
        if let Some(contents) = state.bound_buffer(target) {
            *contents = data.map_or_else(|| vec![0; size], <[u8]>::to_vec);
        }
        state.calls.push(GlCall::BufferData {
            target,
            size,
            usage,
            initialized: data.is_some(),
        });
    }

    fn buffer_sub_data(&self, target: u32, offset: usize, data: &[u8]) {
        let mut state = self.state.lock();
        if let Some(contents) = state.bound_buffer(target)
            && let Some(dst) = contents.get_mut(offset..offset + data.len())
        {
            dst.copy_from_slice(data);
        }
        state.calls.push(GlCall::BufferSubData {
            target,
            offset,
            len: data.len(),
        });
    }

    fn get_buffer_sub_data(&self, target: u32, offset: usize, data: &mut [u8]) {
        let mut state = self.state.lock();
        let len = data.len();
        if let Some(contents) = state.bound_buffer(target)
            && let Some(src) = contents.get(offset..offset + len)
        {
            data.copy_from_slice(src);
        }
        state.calls.push(GlCall::GetBufferSubData {
            target,
            offset,
            len,
        });
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut state = self.state.lock();
        state.buffers.remove(&buffer);
        state.calls.push(GlCall::DeleteBuffer(buffer));
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        self.create(GlCall::CreateVertexArray)
    }

    fn bind_vertex_array(&self, array: u32) {
        self.record(GlCall::BindVertexArray(array));
    }

    fn delete_vertex_array(&self, array: u32) {
        self.record(GlCall::DeleteVertexArray(array));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::DisableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.record(GlCall::VertexAttribPointer {
            index,
            size,
            data_type,
            normalized,
            stride,
            offset,
        });
    }

    fn create_shader(&self, stage: u32) -> Result<u32, String> {
        let shader = self.create(|shader| GlCall::CreateShader { stage, shader })?;
        self.state.lock().shaders.insert(
            shader,
            RecordedShader {
                stage,
                source: String::new(),
                compiled: false,
            },
        );
        Ok(shader)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let mut state = self.state.lock();
        if let Some(recorded) = state.shaders.get_mut(&shader) {
            recorded.source = source.to_string();
        }
        state.calls.push(GlCall::ShaderSource(shader));
    }

    fn compile_shader(&self, shader: u32) {
        let mut state = self.state.lock();
        if let Some(recorded) = state.shaders.get_mut(&shader) {
            recorded.compiled = glsl::has_entry_point(&recorded.source);
        }
        state.calls.push(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .lock()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            "0:1(1): error: main function not found".to_string()
        }
    }

    fn delete_shader(&self, shader: u32) {
        let mut state = self.state.lock();
        state.shaders.remove(&shader);
        state.calls.push(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        let program = self.create(GlCall::CreateProgram)?;
        self.state
            .lock()
            .programs
            .insert(program, RecordedProgram::default());
        Ok(program)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.lock();
        if let Some(recorded) = state.programs.get_mut(&program) {
            recorded.shaders.push(shader);
        }
        state.calls.push(GlCall::AttachShader { program, shader });
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.lock();
        state.calls.push(GlCall::LinkProgram(program));

        let attached = match state.programs.get(&program) {
            Some(recorded) => recorded.shaders.clone(),
            None => return,
        };
        let mut attributes = Vec::new();
        let mut uniforms = Vec::new();
        let mut stages = Vec::new();
        let mut log = String::new();
        for shader in attached {
            match state.shaders.get(&shader) {
                Some(s) if s.compiled => {
                    if s.stage == gl::VERTEX_SHADER {
                        attributes.extend(glsl::declared_inputs(&s.source));
                    }
                    uniforms.extend(glsl::declared_uniforms(&s.source));
                    stages.push(s.stage);
                }
                _ => log = format!("shader {shader} is not compiled"),
            }
        }
        if log.is_empty()
            && !(stages.contains(&gl::VERTEX_SHADER) && stages.contains(&gl::FRAGMENT_SHADER))
        {
            log = "error: linking requires a vertex and a fragment shader".to_string();
        }
        if let Some(recorded) = state.programs.get_mut(&program) {
            recorded.linked = log.is_empty();
            recorded.log = log;
            recorded.attributes = attributes;
            uniforms.dedup();
            recorded.uniforms = uniforms;
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .lock()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .lock()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: u32) {
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.lock();
        state.programs.remove(&program);
        state.calls.push(GlCall::DeleteProgram(program));
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.lock();
        let program = state.programs.get(&program).filter(|p| p.linked)?;
        program
            .attributes
            .iter()
            .position(|a| a == name)
            .map(|i| i as u32)
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.lock();
        let program = state.programs.get(&program).filter(|p| p.linked)?;
        program
            .uniforms
            .iter()
            .position(|u| u == name)
            .map(|i| i as u32)
    }

    fn uniform_1_i32(&self, location: u32, value: i32) {
        self.record(GlCall::Uniform1i { location, value });
    }

    fn uniform_1_u32(&self, location: u32, value: u32) {
        self.record(GlCall::Uniform1u { location, value });
    }

    fn uniform_1_f32(&self, location: u32, value: f32) {
        self.record(GlCall::UniformFloats {
            location,
            values: vec![value],
        });
    }

    fn uniform_2_f32(&self, location: u32, x: f32, y: f32) {
        self.record(GlCall::UniformFloats {
            location,
            values: vec![x, y],
        });
    }

    fn uniform_3_f32(&self, location: u32, x: f32, y: f32, z: f32) {
        self.record(GlCall::UniformFloats {
            location,
            values: vec![x, y, z],
        });
    }

    fn uniform_4_f32(&self, location: u32, x: f32, y: f32, z: f32, w: f32) {
        self.record(GlCall::UniformFloats {
            location,
            values: vec![x, y, z, w],
        });
    }

    fn uniform_1_i32_slice(&self, location: u32, values: &[i32]) {
        self.record(GlCall::Uniform1iv {
            location,
            values: values.to_vec(),
        });
    }

    fn uniform_matrix_4_f32(&self, location: u32, values: &[f32; 16]) {
        self.record(GlCall::UniformMatrix4 {
            location,
            values: *values,
        });
    }

    fn create_texture(&self) -> Result<u32, String> {
        self.create(GlCall::CreateTexture)
    }

    fn active_texture(&self, unit: u32) {
        self.record(GlCall::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: u32, texture: u32) {
        self.record(GlCall::BindTexture { target, texture });
    }

    fn tex_image_2d(
        &self,
        _target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        data_type: u32,
        data: Option<&[u8]>,
    ) {
        self.record(GlCall::TexImage2D {
            level,
            internal_format,
            width,
            height,
            format,
            data_type,
            len: data.map(<[u8]>::len),
        });
    }

    fn compressed_tex_image_2d(
        &self,
        _target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        data: &[u8],
    ) {
        self.record(GlCall::CompressedTexImage2D {
            level,
            internal_format,
            width,
            height,
            len: data.len(),
        });
    }

    fn tex_parameter_i32(&self, _target: u32, parameter: u32, value: i32) {
        self.record(GlCall::TexParameterI { parameter, value });
    }

    fn tex_parameter_f32(&self, _target: u32, parameter: u32, value: f32) {
        self.record(GlCall::TexParameterF { parameter, value });
    }

    fn tex_parameter_i32_slice(&self, _target: u32, parameter: u32, values: &[i32]) {
        self.record(GlCall::TexParameterIv {
            parameter,
            values: values.to_vec(),
        });
    }

    fn pixel_store_i32(&self, parameter: u32, value: i32) {
        self.record(GlCall::PixelStore { parameter, value });
    }

    fn delete_texture(&self, texture: u32) {
        self.record(GlCall::DeleteTexture(texture));
    }

    fn create_framebuffer(&self) -> Result<u32, String> {
        self.create(GlCall::CreateFramebuffer)
    }

    fn bind_framebuffer(&self, _target: u32, framebuffer: u32) {
        self.record(GlCall::BindFramebuffer(framebuffer));
    }

    fn framebuffer_texture_2d(
        &self,
        _target: u32,
        attachment: u32,
        _texture_target: u32,
        texture: u32,
        _level: i32,
    ) {
        self.record(GlCall::FramebufferTexture2D {
            attachment,
            texture,
        });
    }

    fn check_framebuffer_status(&self, target: u32) -> u32 {
        self.record(GlCall::CheckFramebufferStatus(target));
        self.profile.framebuffer_status
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        self.record(GlCall::DeleteFramebuffer(framebuffer));
    }

    fn create_renderbuffer(&self) -> Result<u32, String> {
        self.create(GlCall::CreateRenderbuffer)
    }

    fn bind_renderbuffer(&self, _target: u32, renderbuffer: u32) {
        self.record(GlCall::BindRenderbuffer(renderbuffer));
    }

    fn renderbuffer_storage(&self, _target: u32, internal_format: u32, width: i32, height: i32) {
        self.record(GlCall::RenderbufferStorage {
            internal_format,
            width,
            height,
        });
    }

    fn framebuffer_renderbuffer(
        &self,
        _target: u32,
        attachment: u32,
        _renderbuffer_target: u32,
        renderbuffer: u32,
    ) {
        self.record(GlCall::FramebufferRenderbuffer {
            attachment,
            renderbuffer,
        });
    }

    fn delete_renderbuffer(&self, renderbuffer: u32) {
        self.record(GlCall::DeleteRenderbuffer(renderbuffer));
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.record(GlCall::DrawArrays { mode, first, count });
    }

    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32) {
        self.record(GlCall::DrawElements {
            mode,
            count,
            element_type,
            offset,
        });
    }
}

/// Presenter for a [`RecordingGl`] context. Clones share the swap counter.
#[derive(Debug, Clone)]
pub struct RecordingPresenter {
    size: (u32, u32),
    swaps: Arc<AtomicU64>,
}

impl RecordingPresenter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            swaps: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of buffer swaps so far.
    pub fn swap_count(&self) -> u64 {
        self.swaps.load(Ordering::Relaxed)
    }
}

impl Presenter for RecordingPresenter {
    fn swap_buffers(&mut self) {
        self.swaps.fetch_add(1, Ordering::Relaxed);
    }

    fn drawable_size(&self) -> (u32, u32) {
        self.size
    }
}

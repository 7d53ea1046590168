//! [`GlApi`] on top of `glow`.
//!
//! `glow` wraps object names in `NonZeroU32` newtypes; the function table
//! uses plain `u32` names with `0` for "none", so names are converted at the
//! boundary.

use std::ffi::{CStr, c_void};
use std::num::NonZeroU32;

use glow::HasContext;

use super::api::{GlApi, GlVersion};

/// A `glow` context current on the calling thread.
pub struct GlowContext {
    gl: glow::Context,
}

impl GlowContext {
    /// Wrap an existing `glow` context.
    pub fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    /// Load OpenGL entry points through `loader`.
    ///
    /// # Safety
    ///
    /// A context must be current on the calling thread and `loader` must
    /// return valid function pointers for it.
    pub unsafe fn from_loader_function<F>(loader: F) -> Self
    where
        F: FnMut(&CStr) -> *const c_void,
    {
        // SAFETY: forwarded from the caller.
        let gl = unsafe { glow::Context::from_loader_function_cstr(loader) };
        Self::new(gl)
    }

    /// The wrapped context.
    pub fn inner(&self) -> &glow::Context {
        &self.gl
    }
}

fn name(value: u32) -> Option<NonZeroU32> {
    NonZeroU32::new(value)
}

fn buffer(value: u32) -> Option<glow::NativeBuffer> {
    name(value).map(glow::NativeBuffer)
}

fn shader(value: u32) -> Option<glow::NativeShader> {
    name(value).map(glow::NativeShader)
}

fn program(value: u32) -> Option<glow::NativeProgram> {
    name(value).map(glow::NativeProgram)
}

fn texture(value: u32) -> Option<glow::NativeTexture> {
    name(value).map(glow::NativeTexture)
}

fn vertex_array(value: u32) -> Option<glow::NativeVertexArray> {
    name(value).map(glow::NativeVertexArray)
}

fn framebuffer(value: u32) -> Option<glow::NativeFramebuffer> {
    name(value).map(glow::NativeFramebuffer)
}

fn renderbuffer(value: u32) -> Option<glow::NativeRenderbuffer> {
    name(value).map(glow::NativeRenderbuffer)
}

fn location(value: u32) -> glow::NativeUniformLocation {
    glow::NativeUniformLocation(value)
}

impl GlApi for GlowContext {
    fn version(&self) -> GlVersion {
        let version = self.gl.version();
        GlVersion {
            major: version.major,
            minor: version.minor,
            is_embedded: version.is_embedded,
        }
    }

    fn get_string(&self, name: u32) -> String {
        // SAFETY: string queries have no preconditions beyond a current context.
        unsafe { self.gl.get_parameter_string(name) }
    }

    fn get_string_indexed(&self, name: u32, index: u32) -> String {
        // SAFETY: callers bound `index` by NUM_EXTENSIONS.
        unsafe { self.gl.get_parameter_indexed_string(name, index) }
    }

    fn get_integer(&self, name: u32) -> i32 {
        // SAFETY: scalar query.
        unsafe { self.gl.get_parameter_i32(name) }
    }

    fn get_float(&self, name: u32) -> f32 {
        // SAFETY: scalar query.
        unsafe { self.gl.get_parameter_f32(name) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        // SAFETY: plain state change.
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        // SAFETY: plain state change.
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear(&self, mask: u32) {
        // SAFETY: clears the bound framebuffer.
        unsafe { self.gl.clear(mask) }
    }

    fn enable(&self, capability: u32) {
        // SAFETY: plain state change.
        unsafe { self.gl.enable(capability) }
    }

    fn blend_func(&self, src: u32, dst: u32) {
        // SAFETY: plain state change.
        unsafe { self.gl.blend_func(src, dst) }
    }

    fn create_buffer(&self) -> Result<u32, String> {
        // SAFETY: allocates a new name.
        unsafe { self.gl.create_buffer() }.map(|b| b.0.get())
    }

    fn bind_buffer(&self, target: u32, name: u32) {
        // SAFETY: `name` is zero or a live buffer owned by the backend.
        unsafe { self.gl.bind_buffer(target, buffer(name)) }
    }

    fn buffer_data(&self, target: u32, size: usize, data: Option<&[u8]>, usage: u32) {
        // SAFETY: a buffer is bound to `target`; slices outlive the call.
        unsafe {
            match data {
                Some(bytes) => self.gl.buffer_data_u8_slice(target, bytes, usage),
                None => self.gl.buffer_data_size(target, size as i32, usage),
            }
        }
    }

    fn buffer_sub_data(&self, target: u32, offset: usize, data: &[u8]) {
        // SAFETY: the device keeps `offset + data.len()` within the buffer.
        unsafe { self.gl.buffer_sub_data_u8_slice(target, offset as i32, data) }
    }

    fn get_buffer_sub_data(&self, target: u32, offset: usize, data: &mut [u8]) {
        // SAFETY: the device keeps the read within the buffer.
        unsafe { self.gl.get_buffer_sub_data(target, offset as i32, data) }
    }

    fn delete_buffer(&self, name: u32) {
        if let Some(b) = buffer(name) {
            // SAFETY: the backend deletes each buffer once.
            unsafe { self.gl.delete_buffer(b) }
        }
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        // SAFETY: only called when vertex array objects are supported.
        unsafe { self.gl.create_vertex_array() }.map(|a| a.0.get())
    }

    fn bind_vertex_array(&self, name: u32) {
        // SAFETY: `name` is zero or a live vertex array.
        unsafe { self.gl.bind_vertex_array(vertex_array(name)) }
    }

    fn delete_vertex_array(&self, name: u32) {
        if let Some(a) = vertex_array(name) {
            // SAFETY: the backend deletes each vertex array once.
            unsafe { self.gl.delete_vertex_array(a) }
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        // SAFETY: `index` is a location reported by the driver.
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        // SAFETY: `index` is a location reported by the driver.
        unsafe { self.gl.disable_vertex_attrib_array(index) }
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
        // SAFETY: a vertex buffer is bound to ARRAY_BUFFER; offsets come
        // from the layout.
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, data_type, normalized, stride, offset)
        }
    }

    fn create_shader(&self, stage: u32) -> Result<u32, String> {
        // SAFETY: `stage` is VERTEX_SHADER or FRAGMENT_SHADER.
        unsafe { self.gl.create_shader(stage) }.map(|s| s.0.get())
    }

    fn shader_source(&self, name: u32, source: &str) {
        if let Some(s) = shader(name) {
            // SAFETY: `s` is a live shader.
            unsafe { self.gl.shader_source(s, source) }
        }
    }

    fn compile_shader(&self, name: u32) {
        if let Some(s) = shader(name) {
            // SAFETY: `s` is a live shader.
            unsafe { self.gl.compile_shader(s) }
        }
    }

    fn shader_compile_status(&self, name: u32) -> bool {
        // SAFETY: `s` is a live shader.
        shader(name).is_some_and(|s| unsafe { self.gl.get_shader_compile_status(s) })
    }

    fn shader_info_log(&self, name: u32) -> String {
        shader(name)
            // SAFETY: `s` is a live shader.
            .map(|s| unsafe { self.gl.get_shader_info_log(s) })
            .unwrap_or_default()
    }

    fn delete_shader(&self, name: u32) {
        if let Some(s) = shader(name) {
            // SAFETY: the backend deletes each shader once.
            unsafe { self.gl.delete_shader(s) }
        }
    }

    fn create_program(&self) -> Result<u32, String> {
        // SAFETY: allocates a new name.
        unsafe { self.gl.create_program() }.map(|p| p.0.get())
    }

    fn attach_shader(&self, name: u32, shader_name: u32) {
        if let (Some(p), Some(s)) = (program(name), shader(shader_name)) {
            // SAFETY: both objects are live.
            unsafe { self.gl.attach_shader(p, s) }
        }
    }

    fn link_program(&self, name: u32) {
        if let Some(p) = program(name) {
            // SAFETY: `p` is a live program.
            unsafe { self.gl.link_program(p) }
        }
    }

    fn program_link_status(&self, name: u32) -> bool {
        // SAFETY: `p` is a live program.
        program(name).is_some_and(|p| unsafe { self.gl.get_program_link_status(p) })
    }

    fn program_info_log(&self, name: u32) -> String {
        program(name)
            // SAFETY: `p` is a live program.
            .map(|p| unsafe { self.gl.get_program_info_log(p) })
            .unwrap_or_default()
    }

    fn use_program(&self, name: u32) {
        // SAFETY: `name` is zero or a linked program.
        unsafe { self.gl.use_program(program(name)) }
    }

    fn delete_program(&self, name: u32) {
        if let Some(p) = program(name) {
            // SAFETY: the backend deletes each program once.
            unsafe { self.gl.delete_program(p) }
        }
    }

    fn attrib_location(&self, name: u32, attribute: &str) -> Option<u32> {
        let p = program(name)?;
        // SAFETY: `p` is a linked program.
        unsafe { self.gl.get_attrib_location(p, attribute) }
    }

    fn uniform_location(&self, name: u32, uniform: &str) -> Option<u32> {
        let p = program(name)?;
        // SAFETY: `p` is a linked program.
        unsafe { self.gl.get_uniform_location(p, uniform) }.map(|l| l.0)
    }

    fn uniform_1_i32(&self, loc: u32, value: i32) {
        // SAFETY: `loc` belongs to the current program.
        unsafe { self.gl.uniform_1_i32(Some(&location(loc)), value) }
    }

    fn uniform_1_u32(&self, loc: u32, value: u32) {
        // SAFETY: `loc` belongs to the current program.
        unsafe { self.gl.uniform_1_u32(Some(&location(loc)), value) }
    }

    fn uniform_1_f32(&self, loc: u32, value: f32) {
        // SAFETY: `loc` belongs to the current program.
        unsafe { self.gl.uniform_1_f32(Some(&location(loc)), value) }
    }

    fn uniform_2_f32(&self, loc: u32, x: f32, y: f32) {
        // SAFETY: `loc` belongs to the current program.
        unsafe { self.gl.uniform_2_f32(Some(&location(loc)), x, y) }
    }

    fn uniform_3_f32(&self, loc: u32, x: f32, y: f32, z: f32) {
        // SAFETY: `loc` belongs to the current program.
        unsafe { self.gl.uniform_3_f32(Some(&location(loc)), x, y, z) }
    }

    fn uniform_4_f32(&self, loc: u32, x: f32, y: f32, z: f32, w: f32) {
        // SAFETY: `loc` belongs to the current program.
        unsafe { self.gl.uniform_4_f32(Some(&location(loc)), x, y, z, w) }
    }

    fn uniform_1_i32_slice(&self, loc: u32, values: &[i32]) {
        // SAFETY: `loc` belongs to the current program.
        unsafe { self.gl.uniform_1_i32_slice(Some(&location(loc)), values) }
    }

    fn uniform_matrix_4_f32(&self, loc: u32, values: &[f32; 16]) {
        // SAFETY: `loc` belongs to the current program.
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(&location(loc)), false, values)
        }
    }

    fn create_texture(&self) -> Result<u32, String> {
        // SAFETY: allocates a new name.
        unsafe { self.gl.create_texture() }.map(|t| t.0.get())
    }

    fn active_texture(&self, unit: u32) {
        // SAFETY: the device limits units to the tracked range.
        unsafe { self.gl.active_texture(unit) }
    }

    fn bind_texture(&self, target: u32, name: u32) {
        // SAFETY: `name` is zero or a live texture.
        unsafe { self.gl.bind_texture(target, texture(name)) }
    }

    fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        data_type: u32,
        data: Option<&[u8]>,
    ) {
        // SAFETY: the device checks `data` covers the level; UNPACK_ALIGNMENT
        // is 1.
        unsafe {
            self.gl.tex_image_2d(
                target,
                level,
                internal_format,
                width,
                height,
                0,
                format,
                data_type,
                glow::PixelUnpackData::Slice(data),
            )
        }
    }

    fn compressed_tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        data: &[u8],
    ) {
        // SAFETY: `data` holds exactly one compressed level.
        unsafe {
            self.gl.compressed_tex_image_2d(
                target,
                level,
                internal_format as i32,
                width,
                height,
                0,
                data.len() as i32,
                data,
            )
        }
    }

    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
        // SAFETY: a texture is bound to `target`.
        unsafe { self.gl.tex_parameter_i32(target, parameter, value) }
    }

    fn tex_parameter_f32(&self, target: u32, parameter: u32, value: f32) {
        // SAFETY: a texture is bound to `target`.
        unsafe { self.gl.tex_parameter_f32(target, parameter, value) }
    }

    fn tex_parameter_i32_slice(&self, target: u32, parameter: u32, values: &[i32]) {
        // SAFETY: a texture is bound to `target`.
        unsafe { self.gl.tex_parameter_i32_slice(target, parameter, values) }
    }

    fn pixel_store_i32(&self, parameter: u32, value: i32) {
        // SAFETY: plain state change.
        unsafe { self.gl.pixel_store_i32(parameter, value) }
    }

    fn delete_texture(&self, name: u32) {
        if let Some(t) = texture(name) {
            // SAFETY: the backend deletes each texture once.
            unsafe { self.gl.delete_texture(t) }
        }
    }

    fn create_framebuffer(&self) -> Result<u32, String> {
        // SAFETY: allocates a new name.
        unsafe { self.gl.create_framebuffer() }.map(|f| f.0.get())
    }

    fn bind_framebuffer(&self, target: u32, name: u32) {
        // SAFETY: `name` is zero (the screen) or a live framebuffer.
        unsafe { self.gl.bind_framebuffer(target, framebuffer(name)) }
    }

    fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        name: u32,
        level: i32,
    ) {
        // SAFETY: a framebuffer is bound to `target`.
        unsafe {
            self.gl
                .framebuffer_texture_2d(target, attachment, texture_target, texture(name), level)
        }
    }

    fn check_framebuffer_status(&self, target: u32) -> u32 {
        // SAFETY: status query.
        unsafe { self.gl.check_framebuffer_status(target) }
    }

    fn delete_framebuffer(&self, name: u32) {
        if let Some(f) = framebuffer(name) {
            // SAFETY: the backend deletes each framebuffer once.
            unsafe { self.gl.delete_framebuffer(f) }
        }
    }

    fn create_renderbuffer(&self) -> Result<u32, String> {
        // SAFETY: allocates a new name.
        unsafe { self.gl.create_renderbuffer() }.map(|r| r.0.get())
    }

    fn bind_renderbuffer(&self, target: u32, name: u32) {
        // SAFETY: `name` is zero or a live renderbuffer.
        unsafe { self.gl.bind_renderbuffer(target, renderbuffer(name)) }
    }

    fn renderbuffer_storage(&self, target: u32, internal_format: u32, width: i32, height: i32) {
        // SAFETY: a renderbuffer is bound to `target`.
        unsafe {
            self.gl
                .renderbuffer_storage(target, internal_format, width, height)
        }
    }

    fn framebuffer_renderbuffer(
        &self,
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        name: u32,
    ) {
        // SAFETY: a framebuffer is bound to `target`.
        unsafe {
            self.gl.framebuffer_renderbuffer(
                target,
                attachment,
                renderbuffer_target,
                renderbuffer(name),
            )
        }
    }

    fn delete_renderbuffer(&self, name: u32) {
        if let Some(r) = renderbuffer(name) {
            // SAFETY: the backend deletes each renderbuffer once.
            unsafe { self.gl.delete_renderbuffer(r) }
        }
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        // SAFETY: the device checks a vertex array and a program are bound.
        unsafe { self.gl.draw_arrays(mode, first, count) }
    }

    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32) {
        // SAFETY: an index buffer is bound to ELEMENT_ARRAY_BUFFER.
        unsafe { self.gl.draw_elements(mode, count, element_type, offset) }
    }
}

//! OpenGL function table.
//!
//! [`GlApi`] is the subset of OpenGL / OpenGL ES the backend issues. Object
//! names are plain `u32`s with `0` meaning "none", matching the C API. The
//! production implementation forwards to `glow`; tests use
//! [`RecordingGl`](super::recording::RecordingGl).

/// Context version as reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlVersion {
    pub major: u32,
    pub minor: u32,
    /// OpenGL ES (or WebGL) rather than desktop OpenGL.
    pub is_embedded: bool,
}

impl GlVersion {
    pub const fn desktop(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            is_embedded: false,
        }
    }

    pub const fn embedded(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            is_embedded: true,
        }
    }
}

/// The OpenGL entry points used by [`OpenGlBackend`](super::OpenGlBackend).
///
/// Methods take `&self`: the underlying API is a global state machine bound
/// to the calling thread.
pub trait GlApi {
    fn version(&self) -> GlVersion;
    fn get_string(&self, name: u32) -> String;
    fn get_string_indexed(&self, name: u32, index: u32) -> String;
    fn get_integer(&self, name: u32) -> i32;
    fn get_float(&self, name: u32) -> f32;

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&self, mask: u32);
    fn enable(&self, capability: u32);
    fn blend_func(&self, src: u32, dst: u32);

    fn create_buffer(&self) -> Result<u32, String>;
    fn bind_buffer(&self, target: u32, buffer: u32);
    /// Allocate `size` bytes, optionally initialised from `data`.
    fn buffer_data(&self, target: u32, size: usize, data: Option<&[u8]>, usage: u32);
    fn buffer_sub_data(&self, target: u32, offset: usize, data: &[u8]);
    fn get_buffer_sub_data(&self, target: u32, offset: usize, data: &mut [u8]);
    fn delete_buffer(&self, buffer: u32);

    fn create_vertex_array(&self) -> Result<u32, String>;
    fn bind_vertex_array(&self, array: u32);
    fn delete_vertex_array(&self, array: u32);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn disable_vertex_attrib_array(&self, index: u32);
    #[allow(clippy::too_many_arguments)]
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );

    fn create_shader(&self, stage: u32) -> Result<u32, String>;
    fn shader_source(&self, shader: u32, source: &str);
    fn compile_shader(&self, shader: u32);
    fn shader_compile_status(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;
    fn delete_shader(&self, shader: u32);

    fn create_program(&self) -> Result<u32, String>;
    fn attach_shader(&self, program: u32, shader: u32);
    fn link_program(&self, program: u32);
    fn program_link_status(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    fn use_program(&self, program: u32);
    fn delete_program(&self, program: u32);
    fn attrib_location(&self, program: u32, name: &str) -> Option<u32>;
    fn uniform_location(&self, program: u32, name: &str) -> Option<u32>;

    fn uniform_1_i32(&self, location: u32, value: i32);
    fn uniform_1_u32(&self, location: u32, value: u32);
    fn uniform_1_f32(&self, location: u32, value: f32);
    fn uniform_2_f32(&self, location: u32, x: f32, y: f32);
    fn uniform_3_f32(&self, location: u32, x: f32, y: f32, z: f32);
    fn uniform_4_f32(&self, location: u32, x: f32, y: f32, z: f32, w: f32);
    fn uniform_1_i32_slice(&self, location: u32, values: &[i32]);
    fn uniform_matrix_4_f32(&self, location: u32, values: &[f32; 16]);

    fn create_texture(&self) -> Result<u32, String>;
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, target: u32, texture: u32);
    #[allow(clippy::too_many_arguments)]
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
    );
    fn compressed_tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        data: &[u8],
    );
    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32);
    fn tex_parameter_f32(&self, target: u32, parameter: u32, value: f32);
    fn tex_parameter_i32_slice(&self, target: u32, parameter: u32, values: &[i32]);
    fn pixel_store_i32(&self, parameter: u32, value: i32);
    fn delete_texture(&self, texture: u32);

    fn create_framebuffer(&self) -> Result<u32, String>;
    fn bind_framebuffer(&self, target: u32, framebuffer: u32);
    fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: u32,
        level: i32,
    );
    fn check_framebuffer_status(&self, target: u32) -> u32;
    fn delete_framebuffer(&self, framebuffer: u32);
    fn create_renderbuffer(&self) -> Result<u32, String>;
    fn bind_renderbuffer(&self, target: u32, renderbuffer: u32);
    fn renderbuffer_storage(&self, target: u32, internal_format: u32, width: i32, height: i32);
    fn framebuffer_renderbuffer(
        &self,
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        renderbuffer: u32,
    );
    fn delete_renderbuffer(&self, renderbuffer: u32);

    fn draw_arrays(&self, mode: u32, first: i32, count: i32);
    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32);
}

/// OpenGL enum values used by the backend.
///
/// Extension enums are not exposed by every binding, so the values the
/// backend needs are collected here.
#[allow(dead_code)]
pub mod gl {
    pub const VENDOR: u32 = 0x1F00;
    pub const RENDERER: u32 = 0x1F01;
    pub const VERSION: u32 = 0x1F02;
    pub const EXTENSIONS: u32 = 0x1F03;
    pub const NUM_EXTENSIONS: u32 = 0x821D;

    pub const DEPTH_BUFFER_BIT: u32 = 0x0000_0100;
    pub const COLOR_BUFFER_BIT: u32 = 0x0000_4000;

    pub const LINES: u32 = 0x0001;
    pub const LINE_STRIP: u32 = 0x0003;
    pub const TRIANGLES: u32 = 0x0004;
    pub const TRIANGLE_STRIP: u32 = 0x0005;

    pub const BLEND: u32 = 0x0BE2;
    pub const SRC_ALPHA: u32 = 0x0302;
    pub const ONE_MINUS_SRC_ALPHA: u32 = 0x0303;

    pub const BYTE: u32 = 0x1400;
    pub const UNSIGNED_BYTE: u32 = 0x1401;
    pub const SHORT: u32 = 0x1402;
    pub const UNSIGNED_SHORT: u32 = 0x1403;
    pub const INT: u32 = 0x1404;
    pub const UNSIGNED_INT: u32 = 0x1405;
    pub const FLOAT: u32 = 0x1406;
    pub const UNSIGNED_SHORT_4_4_4_4: u32 = 0x8033;
    pub const UNSIGNED_SHORT_5_5_5_1: u32 = 0x8034;
    pub const UNSIGNED_SHORT_5_6_5: u32 = 0x8363;

    pub const ARRAY_BUFFER: u32 = 0x8892;
    pub const ELEMENT_ARRAY_BUFFER: u32 = 0x8893;
    pub const STREAM_DRAW: u32 = 0x88E0;
    pub const STATIC_DRAW: u32 = 0x88E4;
    pub const DYNAMIC_DRAW: u32 = 0x88E8;

    pub const FRAGMENT_SHADER: u32 = 0x8B30;
    pub const VERTEX_SHADER: u32 = 0x8B31;

    pub const TEXTURE_2D: u32 = 0x0DE1;
    pub const TEXTURE0: u32 = 0x84C0;
    pub const TEXTURE_MAG_FILTER: u32 = 0x2800;
    pub const TEXTURE_MIN_FILTER: u32 = 0x2801;
    pub const TEXTURE_WRAP_S: u32 = 0x2802;
    pub const TEXTURE_WRAP_T: u32 = 0x2803;
    pub const TEXTURE_MAX_LEVEL: u32 = 0x813D;
    pub const TEXTURE_SWIZZLE_RGBA: u32 = 0x8E46;
    pub const TEXTURE_MAX_ANISOTROPY_EXT: u32 = 0x84FE;
    pub const MAX_TEXTURE_MAX_ANISOTROPY_EXT: u32 = 0x84FF;
    pub const UNPACK_ALIGNMENT: u32 = 0x0CF5;

    pub const NEAREST: u32 = 0x2600;
    pub const LINEAR: u32 = 0x2601;
    pub const NEAREST_MIPMAP_NEAREST: u32 = 0x2700;
    pub const LINEAR_MIPMAP_NEAREST: u32 = 0x2701;
    pub const NEAREST_MIPMAP_LINEAR: u32 = 0x2702;
    pub const LINEAR_MIPMAP_LINEAR: u32 = 0x2703;

    pub const REPEAT: u32 = 0x2901;
    pub const CLAMP_TO_EDGE: u32 = 0x812F;
    pub const MIRRORED_REPEAT: u32 = 0x8370;
    pub const MIRROR_CLAMP_EXT: u32 = 0x8742;

    pub const ONE: u32 = 1;
    pub const RED: u32 = 0x1903;
    pub const GREEN: u32 = 0x1904;
    pub const RG: u32 = 0x8227;
    pub const RGB: u32 = 0x1907;
    pub const RGBA: u32 = 0x1908;
    pub const LUMINANCE: u32 = 0x1909;
    pub const LUMINANCE_ALPHA: u32 = 0x190A;

    pub const R8: u32 = 0x8229;
    pub const RG8: u32 = 0x822B;
    pub const RGB565: u32 = 0x8D62;
    pub const RGB8: u32 = 0x8051;
    pub const RGB5_A1: u32 = 0x8057;
    pub const RGBA4: u32 = 0x8056;
    pub const RGBA8: u32 = 0x8058;
    pub const R32F: u32 = 0x822E;
    pub const RGB32F: u32 = 0x8815;
    pub const RGBA32F: u32 = 0x8814;

    pub const COMPRESSED_RGB_S3TC_DXT1_EXT: u32 = 0x83F0;
    pub const COMPRESSED_RGBA_S3TC_DXT1_EXT: u32 = 0x83F1;
    pub const COMPRESSED_RGBA_S3TC_DXT3_EXT: u32 = 0x83F2;
    pub const COMPRESSED_RGBA_S3TC_DXT5_EXT: u32 = 0x83F3;
    pub const ETC1_RGB8_OES: u32 = 0x8D64;
    pub const COMPRESSED_RGB8_ETC2: u32 = 0x9274;
    pub const COMPRESSED_RGBA8_ETC2_EAC: u32 = 0x9278;
    pub const COMPRESSED_RGB_PVRTC_4BPPV1_IMG: u32 = 0x8C00;
    pub const COMPRESSED_RGBA_PVRTC_4BPPV1_IMG: u32 = 0x8C02;
    pub const COMPRESSED_RGBA_ASTC_4X4_KHR: u32 = 0x93B0;
    pub const COMPRESSED_RGBA_ASTC_8X8_KHR: u32 = 0x93B7;

    pub const FRAMEBUFFER: u32 = 0x8D40;
    pub const RENDERBUFFER: u32 = 0x8D41;
    pub const COLOR_ATTACHMENT0: u32 = 0x8CE0;
    pub const DEPTH_ATTACHMENT: u32 = 0x8D00;
    pub const FRAMEBUFFER_COMPLETE: u32 = 0x8CD5;
    pub const FRAMEBUFFER_INCOMPLETE_ATTACHMENT: u32 = 0x8CD6;
    pub const DEPTH_COMPONENT16: u32 = 0x81A5;
    pub const DEPTH_COMPONENT24: u32 = 0x81A6;
}

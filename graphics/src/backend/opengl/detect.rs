//! Capability probing for OpenGL contexts.

use crate::capabilities::{Capabilities, Dialect, Features};

use super::api::{GlApi, gl};

/// Work out the dialect of the current context.
pub fn dialect(gl: &impl GlApi) -> Dialect {
    let version = gl.version();
    match (version.is_embedded, version.major) {
        (false, _) => Dialect::Desktop,
        (true, major) if major >= 3 => Dialect::Gles3,
        (true, _) => Dialect::Gles2,
    }
}

/// Extension names reported by the driver.
///
/// GLES2 reports a single space-separated string; later contexts are queried
/// by index.
pub fn extensions(gl: &impl GlApi, dialect: Dialect) -> Vec<String> {
    match dialect {
        Dialect::Gles2 => gl
            .get_string(gl::EXTENSIONS)
            .split_whitespace()
            .map(str::to_string)
            .collect(),
        _ => {
            let count = gl.get_integer(gl::NUM_EXTENSIONS).max(0) as u32;
            (0..count)
                .map(|index| gl.get_string_indexed(gl::EXTENSIONS, index))
                .collect()
        }
    }
}

/// Detect the capabilities of the current context.
pub fn detect_capabilities(gl: &impl GlApi) -> Capabilities {
    let version = gl.version();
    let dialect = dialect(gl);
    let mut caps = Capabilities::new(dialect, (version.major, version.minor));

    match dialect {
        Dialect::Desktop if version.major >= 3 => {
            caps.features |= Features::VERTEX_ARRAY_OBJECT
                | Features::TEXTURE_NPOT
                | Features::TEXTURE_FLOAT
                | Features::TEXTURE_DEPTH;
        }
        Dialect::Gles3 => {
            caps.features |= Features::VERTEX_ARRAY_OBJECT
                | Features::TEXTURE_NPOT
                | Features::TEXTURE_DEPTH
                | Features::COMPRESSED_ETC2;
        }
        _ => {}
    }

    for extension in extensions(gl, dialect) {
        scan_extension(gl, &mut caps, &extension);
    }

    log::info!(
        "OpenGlBackend: {dialect} {}.{} ({}, {})",
        version.major,
        version.minor,
        gl.get_string(gl::RENDERER),
        gl.get_string(gl::VENDOR)
    );
    log::info!(
        "OpenGlBackend: features {:?}, max anisotropy {}, depth bits {}",
        caps.features,
        caps.max_anisotropy,
        caps.max_depth_bits
    );
    caps
}

fn scan_extension(gl: &impl GlApi, caps: &mut Capabilities, name: &str) {
    let gles = caps.dialect.is_gles();
    match name {
        "GL_OES_vertex_array_object" if caps.dialect == Dialect::Gles2 => {
            caps.features |= Features::VERTEX_ARRAY_OBJECT;
        }
        "GL_OES_texture_npot" if gles => caps.features |= Features::TEXTURE_NPOT,
        "GL_OES_texture_float" if gles => caps.features |= Features::TEXTURE_FLOAT,
        "GL_OES_depth_texture" | "GL_WEBGL_depth_texture" if gles => {
            caps.features |= Features::TEXTURE_DEPTH;
        }
        "GL_OES_depth24" if gles => caps.max_depth_bits = caps.max_depth_bits.max(24),
        "GL_OES_depth32" if gles => caps.max_depth_bits = caps.max_depth_bits.max(32),
        "GL_EXT_texture_compression_s3tc"
        | "GL_WEBGL_compressed_texture_s3tc"
        | "GL_WEBKIT_WEBGL_compressed_texture_s3tc" => {
            caps.features |= Features::COMPRESSED_DXT;
        }
        "GL_OES_compressed_ETC1_RGB8_texture" | "GL_WEBGL_compressed_texture_etc1" => {
            caps.features |= Features::COMPRESSED_ETC1;
        }
        "GL_ARB_ES3_compatibility" => caps.features |= Features::COMPRESSED_ETC2,
        "GL_IMG_texture_compression_pvrtc" => caps.features |= Features::COMPRESSED_PVRTC,
        "GL_KHR_texture_compression_astc_hdr" | "GL_KHR_texture_compression_astc_ldr" => {
            caps.features |= Features::COMPRESSED_ASTC;
        }
        "GL_EXT_texture_filter_anisotropic" => {
            caps.features |= Features::ANISOTROPIC_FILTER;
            caps.max_anisotropy = gl.get_float(gl::MAX_TEXTURE_MAX_ANISOTROPY_EXT);
        }
        "GL_EXT_texture_mirror_clamp" => caps.features |= Features::TEXTURE_MIRROR_CLAMP,
        _ => {}
    }
}

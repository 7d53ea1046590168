//! Pixel format and enum translation.

use crate::capabilities::{Capabilities, Dialect, Features};
use crate::layout::ElementType;
use crate::types::{BufferUsage, IndexType, PixelFormat, PrimitiveType, ShaderStage, TextureWrap};

use super::api::gl;

/// Internal format, pixel format and component type for one pixel format.
///
/// Compressed formats only use `internal_format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatTriple {
    pub internal_format: u32,
    pub format: u32,
    pub data_type: u32,
}

impl FormatTriple {
    const fn new(internal_format: u32, format: u32, data_type: u32) -> Self {
        Self {
            internal_format,
            format,
            data_type,
        }
    }

    const fn compressed(internal_format: u32) -> Self {
        Self::new(internal_format, 0, 0)
    }
}

/// Translate `format` for the context described by `caps`.
///
/// Returns `None` when the format is unsupported.
pub fn texture_format(format: PixelFormat, caps: &Capabilities) -> Option<FormatTriple> {
    use PixelFormat::*;

    if let Some(required) = Features::required_for(format)
        && !caps.has(required)
    {
        return None;
    }

    let gles = caps.dialect.is_gles();
    let triple = match format {
        UncompressedGrayscale if gles => {
            FormatTriple::new(gl::LUMINANCE, gl::LUMINANCE, gl::UNSIGNED_BYTE)
        }
        UncompressedGrayscale => FormatTriple::new(gl::R8, gl::RED, gl::UNSIGNED_BYTE),
        UncompressedGrayAlpha if gles => {
            FormatTriple::new(gl::LUMINANCE_ALPHA, gl::LUMINANCE_ALPHA, gl::UNSIGNED_BYTE)
        }
        UncompressedGrayAlpha => FormatTriple::new(gl::RG8, gl::RG, gl::UNSIGNED_BYTE),
        UncompressedR5G6B5 if gles => {
            FormatTriple::new(gl::RGB, gl::RGB, gl::UNSIGNED_SHORT_5_6_5)
        }
        UncompressedR5G6B5 => FormatTriple::new(gl::RGB565, gl::RGB, gl::UNSIGNED_SHORT_5_6_5),
        UncompressedR8G8B8 if gles => FormatTriple::new(gl::RGB, gl::RGB, gl::UNSIGNED_BYTE),
        UncompressedR8G8B8 => FormatTriple::new(gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
        UncompressedR5G5B5A1 if gles => {
            FormatTriple::new(gl::RGBA, gl::RGBA, gl::UNSIGNED_SHORT_5_5_5_1)
        }
        UncompressedR5G5B5A1 => {
            FormatTriple::new(gl::RGB5_A1, gl::RGBA, gl::UNSIGNED_SHORT_5_5_5_1)
        }
        UncompressedR4G4B4A4 if gles => {
            FormatTriple::new(gl::RGBA, gl::RGBA, gl::UNSIGNED_SHORT_4_4_4_4)
        }
        UncompressedR4G4B4A4 => FormatTriple::new(gl::RGBA4, gl::RGBA, gl::UNSIGNED_SHORT_4_4_4_4),
        UncompressedR8G8B8A8 if gles => FormatTriple::new(gl::RGBA, gl::RGBA, gl::UNSIGNED_BYTE),
        UncompressedR8G8B8A8 => FormatTriple::new(gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
        UncompressedR32 if gles => FormatTriple::new(gl::LUMINANCE, gl::LUMINANCE, gl::FLOAT),
        UncompressedR32 => FormatTriple::new(gl::R32F, gl::RED, gl::FLOAT),
        UncompressedR32G32B32 if gles => FormatTriple::new(gl::RGB, gl::RGB, gl::FLOAT),
        UncompressedR32G32B32 => FormatTriple::new(gl::RGB32F, gl::RGB, gl::FLOAT),
        UncompressedR32G32B32A32 if gles => FormatTriple::new(gl::RGBA, gl::RGBA, gl::FLOAT),
        UncompressedR32G32B32A32 => FormatTriple::new(gl::RGBA32F, gl::RGBA, gl::FLOAT),
        CompressedDxt1Rgb => FormatTriple::compressed(gl::COMPRESSED_RGB_S3TC_DXT1_EXT),
        CompressedDxt1Rgba => FormatTriple::compressed(gl::COMPRESSED_RGBA_S3TC_DXT1_EXT),
        CompressedDxt3Rgba => FormatTriple::compressed(gl::COMPRESSED_RGBA_S3TC_DXT3_EXT),
        CompressedDxt5Rgba => FormatTriple::compressed(gl::COMPRESSED_RGBA_S3TC_DXT5_EXT),
        CompressedEtc1Rgb => FormatTriple::compressed(gl::ETC1_RGB8_OES),
        CompressedEtc2Rgb => FormatTriple::compressed(gl::COMPRESSED_RGB8_ETC2),
        CompressedEtc2EacRgba => FormatTriple::compressed(gl::COMPRESSED_RGBA8_ETC2_EAC),
        CompressedPvrtRgb => FormatTriple::compressed(gl::COMPRESSED_RGB_PVRTC_4BPPV1_IMG),
        CompressedPvrtRgba => FormatTriple::compressed(gl::COMPRESSED_RGBA_PVRTC_4BPPV1_IMG),
        CompressedAstc4x4Rgba => FormatTriple::compressed(gl::COMPRESSED_RGBA_ASTC_4X4_KHR),
        CompressedAstc8x8Rgba => FormatTriple::compressed(gl::COMPRESSED_RGBA_ASTC_8X8_KHR),
    };
    Some(triple)
}

/// Swizzle mask that makes single and dual channel formats read as luminance
/// on desktop contexts, where `LUMINANCE` no longer exists.
pub fn swizzle_mask(format: PixelFormat, dialect: Dialect) -> Option<[i32; 4]> {
    if dialect != Dialect::Desktop {
        return None;
    }
    let red = gl::RED as i32;
    match format {
        PixelFormat::UncompressedGrayscale => Some([red, red, red, gl::ONE as i32]),
        PixelFormat::UncompressedGrayAlpha => Some([red, red, red, gl::GREEN as i32]),
        _ => None,
    }
}

pub fn buffer_usage(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::Static => gl::STATIC_DRAW,
        BufferUsage::Dynamic => gl::DYNAMIC_DRAW,
        BufferUsage::Stream => gl::STREAM_DRAW,
    }
}

pub fn element_type(element_type: ElementType) -> u32 {
    match element_type {
        ElementType::Float => gl::FLOAT,
        ElementType::Int => gl::INT,
        ElementType::UnsignedInt => gl::UNSIGNED_INT,
    }
}

pub fn index_type(index_type: IndexType) -> u32 {
    match index_type {
        IndexType::U16 => gl::UNSIGNED_SHORT,
        IndexType::U32 => gl::UNSIGNED_INT,
    }
}

pub fn primitive(primitive: PrimitiveType) -> u32 {
    match primitive {
        PrimitiveType::TriangleList => gl::TRIANGLES,
        PrimitiveType::TriangleStrip => gl::TRIANGLE_STRIP,
        PrimitiveType::LineList => gl::LINES,
        PrimitiveType::LineStrip => gl::LINE_STRIP,
    }
}

pub fn shader_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => gl::VERTEX_SHADER,
        ShaderStage::Fragment => gl::FRAGMENT_SHADER,
    }
}

/// Wrap mode enum, `None` when the mode needs a missing extension.
pub fn wrap(wrap: TextureWrap, caps: &Capabilities) -> Option<u32> {
    match wrap {
        TextureWrap::Repeat => Some(gl::REPEAT),
        TextureWrap::Clamp => Some(gl::CLAMP_TO_EDGE),
        TextureWrap::MirrorRepeat => Some(gl::MIRRORED_REPEAT),
        TextureWrap::MirrorClamp if caps.has(Features::TEXTURE_MIRROR_CLAMP) => {
            Some(gl::MIRROR_CLAMP_EXT)
        }
        TextureWrap::MirrorClamp => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn caps(dialect: Dialect, features: Features) -> Capabilities {
        Capabilities {
            features,
            ..Capabilities::new(dialect, (3, 0))
        }
    }

    #[rstest]
    #[case::gles_gray(Dialect::Gles2, PixelFormat::UncompressedGrayscale, gl::LUMINANCE, gl::LUMINANCE)]
    #[case::desktop_gray(Dialect::Desktop, PixelFormat::UncompressedGrayscale, gl::R8, gl::RED)]
    #[case::gles_rgba(Dialect::Gles3, PixelFormat::UncompressedR8G8B8A8, gl::RGBA, gl::RGBA)]
    #[case::desktop_rgba(Dialect::Desktop, PixelFormat::UncompressedR8G8B8A8, gl::RGBA8, gl::RGBA)]
    #[case::desktop_565(Dialect::Desktop, PixelFormat::UncompressedR5G6B5, gl::RGB565, gl::RGB)]
    fn test_uncompressed_triples(
        #[case] dialect: Dialect,
        #[case] format: PixelFormat,
        #[case] internal: u32,
        #[case] pixel: u32,
    ) {
        let triple = texture_format(format, &caps(dialect, Features::empty())).unwrap();
        assert_eq!(triple.internal_format, internal);
        assert_eq!(triple.format, pixel);
    }

    #[test]
    fn test_float_requires_flag() {
        let without = caps(Dialect::Gles2, Features::empty());
        let with = caps(Dialect::Gles2, Features::TEXTURE_FLOAT);
        assert_eq!(texture_format(PixelFormat::UncompressedR32G32B32A32, &without), None);
        let triple = texture_format(PixelFormat::UncompressedR32G32B32A32, &with).unwrap();
        assert_eq!(triple.data_type, gl::FLOAT);
    }

    #[test]
    fn test_compressed_requires_flag() {
        let without = caps(Dialect::Desktop, Features::empty());
        let with = caps(Dialect::Desktop, Features::COMPRESSED_ASTC);
        assert_eq!(texture_format(PixelFormat::CompressedAstc8x8Rgba, &without), None);
        assert_eq!(
            texture_format(PixelFormat::CompressedAstc8x8Rgba, &with)
                .unwrap()
                .internal_format,
            0x93B7
        );
    }

    #[test]
    fn test_swizzle_only_on_desktop() {
        assert_eq!(
            swizzle_mask(PixelFormat::UncompressedGrayAlpha, Dialect::Desktop),
            Some([gl::RED as i32, gl::RED as i32, gl::RED as i32, gl::GREEN as i32])
        );
        assert_eq!(swizzle_mask(PixelFormat::UncompressedGrayscale, Dialect::Gles3), None);
        assert_eq!(swizzle_mask(PixelFormat::UncompressedR8G8B8, Dialect::Desktop), None);
    }

    #[test]
    fn test_mirror_clamp_requires_flag() {
        let without = caps(Dialect::Desktop, Features::empty());
        let with = caps(Dialect::Desktop, Features::TEXTURE_MIRROR_CLAMP);
        assert_eq!(wrap(TextureWrap::MirrorClamp, &without), None);
        assert_eq!(wrap(TextureWrap::MirrorClamp, &with), Some(gl::MIRROR_CLAMP_EXT));
        assert_eq!(wrap(TextureWrap::Clamp, &without), Some(gl::CLAMP_TO_EDGE));
    }

    #[test]
    fn test_line_list_uses_lines() {
        assert_eq!(primitive(PrimitiveType::LineList), gl::LINES);
        assert_eq!(primitive(PrimitiveType::LineStrip), gl::LINE_STRIP);
    }
}

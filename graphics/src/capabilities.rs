//! Backend capability flags.
//!
//! A [`Capabilities`] value is produced once when a backend initializes and
//! is read-only afterwards. Everything that differs between drivers (VAO
//! support, compressed formats, float textures, anisotropy) is decided here
//! rather than re-queried per call.

use std::fmt;

use bitflags::bitflags;

use crate::types::PixelFormat;

bitflags! {
    /// Optional features a backend may expose.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Features: u32 {
        /// Vertex array objects (core in GL 3.0 / ES 3.0, an extension on ES 2.0).
        const VERTEX_ARRAY_OBJECT = 1 << 0;
        /// Anisotropic texture filtering.
        const ANISOTROPIC_FILTER = 1 << 1;
        /// Non-power-of-two textures with mipmaps and repeat wrapping.
        const TEXTURE_NPOT = 1 << 2;
        /// 32-bit float texture formats.
        const TEXTURE_FLOAT = 1 << 3;
        /// Depth textures.
        const TEXTURE_DEPTH = 1 << 4;
        /// Mirror-then-clamp wrap mode.
        const TEXTURE_MIRROR_CLAMP = 1 << 5;
        /// DXT1/3/5 (S3TC) compressed formats.
        const COMPRESSED_DXT = 1 << 6;
        /// ETC1 compressed format.
        const COMPRESSED_ETC1 = 1 << 7;
        /// ETC2/EAC compressed formats.
        const COMPRESSED_ETC2 = 1 << 8;
        /// PVRTC compressed formats.
        const COMPRESSED_PVRTC = 1 << 9;
        /// ASTC compressed formats.
        const COMPRESSED_ASTC = 1 << 10;
    }
}

impl Features {
    /// Feature a pixel format depends on, if any.
    pub fn required_for(format: PixelFormat) -> Option<Features> {
        use PixelFormat::*;
        match format {
            UncompressedR32 | UncompressedR32G32B32 | UncompressedR32G32B32A32 => {
                Some(Self::TEXTURE_FLOAT)
            }
            CompressedDxt1Rgb | CompressedDxt1Rgba | CompressedDxt3Rgba | CompressedDxt5Rgba => {
                Some(Self::COMPRESSED_DXT)
            }
            CompressedEtc1Rgb => Some(Self::COMPRESSED_ETC1),
            CompressedEtc2Rgb | CompressedEtc2EacRgba => Some(Self::COMPRESSED_ETC2),
            CompressedPvrtRgb | CompressedPvrtRgba => Some(Self::COMPRESSED_PVRTC),
            CompressedAstc4x4Rgba | CompressedAstc8x8Rgba => Some(Self::COMPRESSED_ASTC),
            _ => None,
        }
    }
}

/// Shading-language dialect of the active context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Desktop OpenGL.
    Desktop,
    /// OpenGL ES 2.0 / WebGL 1.
    Gles2,
    /// OpenGL ES 3.x / WebGL 2.
    Gles3,
    /// No GPU at all.
    Headless,
}

impl Dialect {
    /// Whether this is an OpenGL ES dialect.
    pub fn is_gles(self) -> bool {
        matches!(self, Self::Gles2 | Self::Gles3)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Desktop => "desktop GL",
            Self::Gles2 => "GLES2",
            Self::Gles3 => "GLES3",
            Self::Headless => "headless",
        };
        f.write_str(name)
    }
}

/// Detected capability set of a backend instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    /// Context dialect.
    pub dialect: Dialect,
    /// Context API version as (major, minor).
    pub version: (u32, u32),
    /// Supported optional features.
    pub features: Features,
    /// Maximum anisotropy level, 0 when anisotropic filtering is unsupported.
    pub max_anisotropy: f32,
    /// Bits available for depth renderbuffers.
    pub max_depth_bits: u32,
}

impl Capabilities {
    /// Create a capability set with no optional features.
    pub fn new(dialect: Dialect, version: (u32, u32)) -> Self {
        let max_depth_bits = match dialect {
            Dialect::Gles2 => 16,
            _ => 24,
        };
        Self {
            dialect,
            version,
            features: Features::empty(),
            max_anisotropy: 0.0,
            max_depth_bits,
        }
    }

    /// Everything enabled, for backends with no driver behind them.
    pub fn headless() -> Self {
        Self {
            features: Features::all(),
            max_anisotropy: 16.0,
            ..Self::new(Dialect::Headless, (0, 0))
        }
    }

    /// Check whether a feature is available.
    pub fn has(&self, features: Features) -> bool {
        self.features.contains(features)
    }

    /// Whether textures of `format` can be created.
    pub fn supports_format(&self, format: PixelFormat) -> bool {
        Features::required_for(format).is_none_or(|required| self.has(required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncompressed_formats_need_nothing() {
        let caps = Capabilities::new(Dialect::Gles2, (2, 0));
        assert!(caps.supports_format(PixelFormat::UncompressedR8G8B8A8));
        assert!(caps.supports_format(PixelFormat::UncompressedGrayAlpha));
        assert!(!caps.supports_format(PixelFormat::UncompressedR32));
        assert!(!caps.supports_format(PixelFormat::CompressedEtc1Rgb));
    }

    #[test]
    fn test_every_compressed_format_has_a_feature() {
        for format in PixelFormat::ALL.iter().filter(|f| f.is_compressed()) {
            assert!(Features::required_for(*format).is_some(), "{format}");
        }
    }

    #[test]
    fn test_headless_supports_everything() {
        let caps = Capabilities::headless();
        assert!(PixelFormat::ALL.iter().all(|f| caps.supports_format(*f)));
        assert!(caps.has(Features::VERTEX_ARRAY_OBJECT | Features::ANISOTROPIC_FILTER));
    }

    #[test]
    fn test_depth_bit_defaults() {
        assert_eq!(Capabilities::new(Dialect::Gles2, (2, 0)).max_depth_bits, 16);
        assert_eq!(Capabilities::new(Dialect::Gles3, (3, 0)).max_depth_bits, 24);
        assert_eq!(Capabilities::new(Dialect::Desktop, (3, 3)).max_depth_bits, 24);
    }
}

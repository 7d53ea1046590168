//! Texture pixel formats and their storage size.

use std::fmt;

/// Pixel formats understood by the engine.
///
/// The order is significant: every format from [`PixelFormat::CompressedDxt1Rgb`]
/// onwards is block compressed, so [`PixelFormat::is_compressed`] is a single
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PixelFormat {
    /// 8-bit luminance.
    UncompressedGrayscale,
    /// 8-bit luminance plus 8-bit alpha.
    UncompressedGrayAlpha,
    /// 16-bit packed RGB 5:6:5.
    UncompressedR5G6B5,
    /// 24-bit RGB.
    UncompressedR8G8B8,
    /// 16-bit packed RGBA 5:5:5:1.
    UncompressedR5G5B5A1,
    /// 16-bit packed RGBA 4:4:4:4.
    UncompressedR4G4B4A4,
    /// 32-bit RGBA.
    UncompressedR8G8B8A8,
    /// Single 32-bit float channel.
    UncompressedR32,
    /// Three 32-bit float channels.
    UncompressedR32G32B32,
    /// Four 32-bit float channels.
    UncompressedR32G32B32A32,
    /// DXT1 (BC1) without alpha.
    CompressedDxt1Rgb,
    /// DXT1 (BC1) with 1-bit alpha.
    CompressedDxt1Rgba,
    /// DXT3 (BC2).
    CompressedDxt3Rgba,
    /// DXT5 (BC3).
    CompressedDxt5Rgba,
    /// ETC1 RGB.
    CompressedEtc1Rgb,
    /// ETC2 RGB.
    CompressedEtc2Rgb,
    /// ETC2 RGBA with EAC alpha.
    CompressedEtc2EacRgba,
    /// PVRTC 4bpp RGB.
    CompressedPvrtRgb,
    /// PVRTC 4bpp RGBA.
    CompressedPvrtRgba,
    /// ASTC with 4x4 blocks.
    CompressedAstc4x4Rgba,
    /// ASTC with 8x8 blocks.
    CompressedAstc8x8Rgba,
}

impl PixelFormat {
    /// Every format, in declaration order.
    pub const ALL: [PixelFormat; 21] = [
        Self::UncompressedGrayscale,
        Self::UncompressedGrayAlpha,
        Self::UncompressedR5G6B5,
        Self::UncompressedR8G8B8,
        Self::UncompressedR5G5B5A1,
        Self::UncompressedR4G4B4A4,
        Self::UncompressedR8G8B8A8,
        Self::UncompressedR32,
        Self::UncompressedR32G32B32,
        Self::UncompressedR32G32B32A32,
        Self::CompressedDxt1Rgb,
        Self::CompressedDxt1Rgba,
        Self::CompressedDxt3Rgba,
        Self::CompressedDxt5Rgba,
        Self::CompressedEtc1Rgb,
        Self::CompressedEtc2Rgb,
        Self::CompressedEtc2EacRgba,
        Self::CompressedPvrtRgb,
        Self::CompressedPvrtRgba,
        Self::CompressedAstc4x4Rgba,
        Self::CompressedAstc8x8Rgba,
    ];

    /// Whether the format is block compressed.
    pub fn is_compressed(self) -> bool {
        self >= Self::CompressedDxt1Rgb
    }

    /// Whether the format stores 32-bit float channels.
    pub fn is_float(self) -> bool {
        matches!(
            self,
            Self::UncompressedR32 | Self::UncompressedR32G32B32 | Self::UncompressedR32G32B32A32
        )
    }

    /// Storage cost in bits per pixel.
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            Self::UncompressedGrayscale => 8,
            Self::UncompressedGrayAlpha
            | Self::UncompressedR5G6B5
            | Self::UncompressedR5G5B5A1
            | Self::UncompressedR4G4B4A4 => 16,
            Self::UncompressedR8G8B8 => 24,
            Self::UncompressedR8G8B8A8 | Self::UncompressedR32 => 32,
            Self::UncompressedR32G32B32 => 96,
            Self::UncompressedR32G32B32A32 => 128,
            Self::CompressedDxt1Rgb
            | Self::CompressedDxt1Rgba
            | Self::CompressedEtc1Rgb
            | Self::CompressedEtc2Rgb
            | Self::CompressedPvrtRgb
            | Self::CompressedPvrtRgba => 4,
            Self::CompressedDxt3Rgba
            | Self::CompressedDxt5Rgba
            | Self::CompressedEtc2EacRgba
            | Self::CompressedAstc4x4Rgba => 8,
            Self::CompressedAstc8x8Rgba => 2,
        }
    }

    /// Smallest upload a single compressed block may occupy, in bytes.
    ///
    /// Returns `None` for uncompressed formats.
    pub fn min_block_size(self) -> Option<usize> {
        if !self.is_compressed() {
            return None;
        }
        if self < Self::CompressedDxt3Rgba {
            Some(8)
        } else {
            Some(16)
        }
    }

    /// Byte size of one `width` x `height` image in this format.
    ///
    /// Compressed images smaller than 4x4 in both dimensions still occupy a
    /// whole block.
    pub fn data_size(self, width: u32, height: u32) -> usize {
        let size = width as usize * height as usize * self.bits_per_pixel() as usize / 8;
        match self.min_block_size() {
            Some(block) if width < 4 && height < 4 => block,
            _ => size,
        }
    }

    /// Byte size of a full mip chain starting at `width` x `height`.
    pub fn mip_chain_size(self, width: u32, height: u32, levels: u32) -> usize {
        (0..levels)
            .map(|level| {
                let (w, h) = mip_dimensions(width, height, level);
                self.data_size(w, h)
            })
            .sum()
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Dimensions of mip `level` for a base image of `width` x `height`.
pub fn mip_dimensions(width: u32, height: u32, level: u32) -> (u32, u32) {
    let shrink = |v: u32| v.checked_shr(level).unwrap_or(0).max(1);
    (shrink(width), shrink(height))
}

/// Byte size of a `width` x `height` image in `format`.
pub fn pixel_data_size(width: u32, height: u32, format: PixelFormat) -> usize {
    format.data_size(width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressed_boundary() {
        let compressed: Vec<_> = PixelFormat::ALL
            .iter()
            .filter(|f| f.is_compressed())
            .collect();
        assert_eq!(compressed.len(), 11);
        assert!(!PixelFormat::UncompressedR32G32B32A32.is_compressed());
        assert!(PixelFormat::CompressedDxt1Rgb.is_compressed());
    }

    #[test]
    fn test_float_formats() {
        assert!(PixelFormat::UncompressedR32.is_float());
        assert!(!PixelFormat::UncompressedR8G8B8A8.is_float());
        assert!(!PixelFormat::CompressedAstc4x4Rgba.is_float());
    }

    #[test]
    fn test_min_block_size() {
        assert_eq!(PixelFormat::UncompressedR8G8B8.min_block_size(), None);
        assert_eq!(PixelFormat::CompressedDxt1Rgba.min_block_size(), Some(8));
        assert_eq!(PixelFormat::CompressedDxt3Rgba.min_block_size(), Some(16));
        // Everything past DXT1 uses the 16-byte minimum.
        assert_eq!(PixelFormat::CompressedEtc1Rgb.min_block_size(), Some(16));
        assert_eq!(PixelFormat::CompressedPvrtRgba.min_block_size(), Some(16));
        assert_eq!(PixelFormat::CompressedAstc8x8Rgba.min_block_size(), Some(16));
    }

    #[test]
    fn test_mip_dimensions() {
        assert_eq!(mip_dimensions(256, 64, 0), (256, 64));
        assert_eq!(mip_dimensions(256, 64, 3), (32, 8));
        assert_eq!(mip_dimensions(256, 64, 7), (2, 1));
        assert_eq!(mip_dimensions(256, 64, 40), (1, 1));
    }

    #[test]
    fn test_mip_chain_size() {
        // 4x4 + 2x2 + 1x1 RGBA
        assert_eq!(
            PixelFormat::UncompressedR8G8B8A8.mip_chain_size(4, 4, 3),
            64 + 16 + 4
        );
        // 8x8 DXT1 chain: 32 bytes, then two sub-block mips at 8 bytes each
        assert_eq!(PixelFormat::CompressedDxt1Rgb.mip_chain_size(8, 8, 3), 32 + 8 + 8);
    }
}

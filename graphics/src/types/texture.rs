//! Texture types and descriptors.

use super::pixel_format::PixelFormat;

/// Texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TextureFilter {
    /// Nearest-neighbour sampling.
    #[default]
    Point,
    /// Linear sampling within a mip level.
    Bilinear,
    /// Linear sampling within and between mip levels.
    Trilinear,
    /// Trilinear sampling with the given anisotropy level.
    Anisotropic(f32),
}

/// Texture coordinate wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureWrap {
    /// Tile the texture.
    #[default]
    Repeat,
    /// Clamp coordinates to the edge texel.
    Clamp,
    /// Tile, mirroring every other repetition.
    MirrorRepeat,
    /// Mirror once, then clamp. Needs an extension on most drivers.
    MirrorClamp,
}

/// Descriptor for creating a 2D texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor {
    /// Debug label for the texture.
    pub label: Option<String>,
    /// Width of mip 0 in pixels.
    pub width: u32,
    /// Height of mip 0 in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: PixelFormat,
    /// Number of mip levels in the supplied data.
    pub mip_levels: u32,
    /// Sampling filter.
    pub filter: TextureFilter,
    /// Coordinate wrapping.
    pub wrap: TextureWrap,
}

impl TextureDescriptor {
    /// Create a descriptor for a single-level 2D texture.
    pub fn new_2d(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            label: None,
            width,
            height,
            format,
            mip_levels: 1,
            filter: TextureFilter::default(),
            wrap: TextureWrap::default(),
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the mip level count.
    pub fn with_mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    /// Set the sampling filter.
    pub fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the wrap mode.
    pub fn with_wrap(mut self, wrap: TextureWrap) -> Self {
        self.wrap = wrap;
        self
    }

    /// Total byte size of the image data for every mip level.
    pub fn data_size(&self) -> usize {
        self.format
            .mip_chain_size(self.width, self.height, self.mip_levels)
    }

    /// Whether both dimensions are powers of two.
    pub fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }
}

/// Descriptor for creating an off-screen render target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderTargetDescriptor {
    /// Debug label for the target.
    pub label: Option<String>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Color attachment format. Must be uncompressed.
    pub format: PixelFormat,
    /// Attach a depth buffer.
    pub depth: bool,
}

impl RenderTargetDescriptor {
    /// RGBA8 target with a depth buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            label: None,
            width,
            height,
            format: PixelFormat::UncompressedR8G8B8A8,
            depth: true,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the color format.
    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable the depth attachment.
    pub fn with_depth(mut self, depth: bool) -> Self {
        self.depth = depth;
        self
    }

    /// Descriptor of the color texture backing the target.
    pub fn color_texture(&self) -> TextureDescriptor {
        let mut desc = TextureDescriptor::new_2d(self.width, self.height, self.format)
            .with_wrap(TextureWrap::Clamp);
        desc.label = self.label.clone();
        desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_descriptor() {
        let desc = TextureDescriptor::new_2d(64, 32, PixelFormat::UncompressedR8G8B8A8)
            .with_label("atlas")
            .with_mip_levels(2)
            .with_filter(TextureFilter::Bilinear)
            .with_wrap(TextureWrap::Clamp);

        assert_eq!(desc.label.as_deref(), Some("atlas"));
        assert_eq!(desc.data_size(), 64 * 32 * 4 + 32 * 16 * 4);
        assert_eq!(desc.filter, TextureFilter::Bilinear);
        assert!(desc.is_power_of_two());
    }

    #[test]
    fn test_defaults() {
        let desc = TextureDescriptor::new_2d(100, 30, PixelFormat::UncompressedGrayscale);
        assert_eq!(desc.mip_levels, 1);
        assert_eq!(desc.filter, TextureFilter::Point);
        assert_eq!(desc.wrap, TextureWrap::Repeat);
        assert!(!desc.is_power_of_two());
    }
}

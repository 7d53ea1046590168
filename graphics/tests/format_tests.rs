//! Pixel storage sizes and context descriptor validation.

use rstest::rstest;

use ngine_graphics::{ContextDescriptor, ContextType, PixelFormat, TextureDescriptor, pixel_data_size};

#[rstest]
#[case::grayscale(PixelFormat::UncompressedGrayscale, 1)]
#[case::gray_alpha(PixelFormat::UncompressedGrayAlpha, 2)]
#[case::r5g6b5(PixelFormat::UncompressedR5G6B5, 2)]
#[case::rgb(PixelFormat::UncompressedR8G8B8, 3)]
#[case::r5g5b5a1(PixelFormat::UncompressedR5G5B5A1, 2)]
#[case::r4g4b4a4(PixelFormat::UncompressedR4G4B4A4, 2)]
#[case::rgba(PixelFormat::UncompressedR8G8B8A8, 4)]
#[case::r32(PixelFormat::UncompressedR32, 4)]
#[case::rgb32(PixelFormat::UncompressedR32G32B32, 12)]
#[case::rgba32(PixelFormat::UncompressedR32G32B32A32, 16)]
fn test_uncompressed_size_is_width_height_bytes(
    #[case] format: PixelFormat,
    #[case] bytes_per_pixel: usize,
) {
    for (width, height) in [(1, 1), (3, 5), (64, 32), (800, 600)] {
        assert_eq!(
            pixel_data_size(width, height, format),
            width as usize * height as usize * bytes_per_pixel,
            "{format} {width}x{height}"
        );
    }
}

#[rstest]
#[case::dxt1(PixelFormat::CompressedDxt1Rgb, 8)]
#[case::dxt1_alpha(PixelFormat::CompressedDxt1Rgba, 8)]
#[case::etc1(PixelFormat::CompressedEtc1Rgb, 16)]
#[case::etc2(PixelFormat::CompressedEtc2Rgb, 16)]
#[case::pvrt(PixelFormat::CompressedPvrtRgb, 16)]
#[case::pvrt_alpha(PixelFormat::CompressedPvrtRgba, 16)]
#[case::dxt3(PixelFormat::CompressedDxt3Rgba, 16)]
#[case::dxt5(PixelFormat::CompressedDxt5Rgba, 16)]
#[case::etc2_eac(PixelFormat::CompressedEtc2EacRgba, 16)]
#[case::astc4(PixelFormat::CompressedAstc4x4Rgba, 16)]
#[case::astc8(PixelFormat::CompressedAstc8x8Rgba, 16)]
fn test_tiny_compressed_images_occupy_a_block(
    #[case] format: PixelFormat,
    #[case] block: usize,
) {
    for (width, height) in [(1, 1), (2, 2), (3, 1), (1, 3)] {
        assert_eq!(pixel_data_size(width, height, format), block, "{format} {width}x{height}");
    }
}

#[rstest]
#[case::dxt1(PixelFormat::CompressedDxt1Rgb, 8)]
#[case::dxt5(PixelFormat::CompressedDxt5Rgba, 16)]
#[case::astc8(PixelFormat::CompressedAstc8x8Rgba, 4)]
fn test_compressed_size_from_bits_per_pixel(#[case] format: PixelFormat, #[case] per_4x4: usize) {
    assert_eq!(pixel_data_size(4, 4, format), per_4x4);
    assert_eq!(pixel_data_size(16, 16, format), per_4x4 * 16);
}

#[test]
fn test_mip_chain_size() {
    let descriptor =
        TextureDescriptor::new_2d(4, 2, PixelFormat::UncompressedR8G8B8A8).with_mip_levels(3);
    // 4x2, 2x1, 1x1
    assert_eq!(descriptor.data_size(), 32 + 8 + 4);
}

#[rstest]
#[case::gl_30(ContextType::OpenGL, 3, 0, true)]
#[case::gl_33(ContextType::OpenGL, 3, 3, true)]
#[case::gl_39(ContextType::OpenGL, 3, 9, false)]
#[case::gl_46(ContextType::OpenGL, 4, 6, true)]
#[case::gl_47(ContextType::OpenGL, 4, 7, false)]
#[case::gl_21(ContextType::OpenGL, 2, 1, false)]
#[case::gles_20(ContextType::OpenGLES, 2, 0, true)]
#[case::gles_21(ContextType::OpenGLES, 2, 1, false)]
#[case::gles_31(ContextType::OpenGLES, 3, 1, true)]
#[case::gles_32(ContextType::OpenGLES, 3, 2, false)]
#[case::directx(ContextType::DirectX, 0, 0, true)]
fn test_descriptor_verify(
    #[case] context_type: ContextType,
    #[case] major: u32,
    #[case] minor: u32,
    #[case] valid: bool,
) {
    assert_eq!(ContextDescriptor::new(context_type, major, minor).verify(), valid);
}

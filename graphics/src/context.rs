//! Graphics context selection.
//!
//! A [`ContextDescriptor`] names the graphics API and version the platform
//! glue should create a context for. The device layer only accepts API
//! versions it has been written against; [`ContextDescriptor::verify`] is the
//! single place that decides this.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Graphics API family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ContextType {
    /// Desktop OpenGL (3.0 or later).
    OpenGL,
    /// OpenGL ES (2.0 or 3.x).
    OpenGLES,
    /// Direct3D. No backend is implemented yet.
    DirectX,
    /// Vulkan. No backend is implemented yet.
    Vulkan,
}

impl ContextType {
    /// Whether this context type is served by the OpenGL backend.
    pub fn is_opengl_family(self) -> bool {
        matches!(self, Self::OpenGL | Self::OpenGLES)
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OpenGL => "OpenGL",
            Self::OpenGLES => "OpenGL ES",
            Self::DirectX => "DirectX",
            Self::Vulkan => "Vulkan",
        };
        f.write_str(name)
    }
}

/// Requested graphics API and version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContextDescriptor {
    /// API family.
    pub context_type: ContextType,
    /// Major API version.
    pub major_version: u32,
    /// Minor API version.
    pub minor_version: u32,
}

impl ContextDescriptor {
    /// Desktop OpenGL 3.3, the default everywhere except Windows.
    pub const OPENGL_3_3: Self = Self::new(ContextType::OpenGL, 3, 3);

    /// OpenGL ES 2.0.
    pub const OPENGLES_2_0: Self = Self::new(ContextType::OpenGLES, 2, 0);

    /// OpenGL ES 3.0.
    pub const OPENGLES_3_0: Self = Self::new(ContextType::OpenGLES, 3, 0);

    /// DirectX with no explicit version.
    pub const DIRECTX: Self = Self::new(ContextType::DirectX, 0, 0);

    /// Create a new descriptor.
    pub const fn new(context_type: ContextType, major_version: u32, minor_version: u32) -> Self {
        Self {
            context_type,
            major_version,
            minor_version,
        }
    }

    /// The descriptor used when the game does not ask for one.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "windows") {
            Self::DIRECTX
        } else {
            Self::OPENGL_3_3
        }
    }

    /// Check that the version is one the engine supports.
    ///
    /// OpenGL accepts 3.0-3.3 and 4.0-4.6. OpenGL ES accepts 2.0 and 3.0-3.1.
    /// DirectX and Vulkan versions are not checked.
    pub fn verify(&self) -> bool {
        let (major, minor) = (self.major_version, self.minor_version);
        match self.context_type {
            ContextType::OpenGL => match major {
                3 => minor <= 3,
                4 => minor <= 6,
                _ => major > 4,
            },
            ContextType::OpenGLES => match major {
                2 => minor == 0,
                3 => minor <= 1,
                _ => major > 3,
            },
            ContextType::DirectX | ContextType::Vulkan => true,
        }
    }
}

impl Default for ContextDescriptor {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl fmt::Display for ContextDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{}",
            self.context_type, self.major_version, self.minor_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::gl_3_0(ContextType::OpenGL, 3, 0, true)]
    #[case::gl_3_3(ContextType::OpenGL, 3, 3, true)]
    #[case::gl_3_4(ContextType::OpenGL, 3, 4, false)]
    #[case::gl_3_9(ContextType::OpenGL, 3, 9, false)]
    #[case::gl_4_6(ContextType::OpenGL, 4, 6, true)]
    #[case::gl_4_7(ContextType::OpenGL, 4, 7, false)]
    #[case::gl_2_1(ContextType::OpenGL, 2, 1, false)]
    #[case::gles_2_0(ContextType::OpenGLES, 2, 0, true)]
    #[case::gles_2_1(ContextType::OpenGLES, 2, 1, false)]
    #[case::gles_3_1(ContextType::OpenGLES, 3, 1, true)]
    #[case::gles_3_2(ContextType::OpenGLES, 3, 2, false)]
    #[case::gles_1_1(ContextType::OpenGLES, 1, 1, false)]
    #[case::directx(ContextType::DirectX, 0, 0, true)]
    #[case::vulkan(ContextType::Vulkan, 1, 3, true)]
    fn test_verify(
        #[case] context_type: ContextType,
        #[case] major: u32,
        #[case] minor: u32,
        #[case] expected: bool,
    ) {
        assert_eq!(
            ContextDescriptor::new(context_type, major, minor).verify(),
            expected
        );
    }

    #[test]
    fn test_platform_default() {
        let descriptor = ContextDescriptor::default();
        if cfg!(target_os = "windows") {
            assert_eq!(descriptor, ContextDescriptor::DIRECTX);
        } else {
            assert_eq!(descriptor, ContextDescriptor::OPENGL_3_3);
        }
        assert!(descriptor.verify());
    }

    #[test]
    fn test_display() {
        assert_eq!(ContextDescriptor::OPENGLES_3_0.to_string(), "OpenGL ES 3.0");
        assert!(ContextType::OpenGLES.is_opengl_family());
        assert!(!ContextType::Vulkan.is_opengl_family());
    }
}

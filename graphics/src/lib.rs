//! # Ngine Graphics
//!
//! Graphics device abstraction layer for the Ngine 2D engine.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GraphicsDevice`] - Validated resource creation, binding and drawing
//! - [`GraphicsBackend`] - Trait for graphics backend implementations
//! - [`ContextDescriptor`] - The graphics API and version to target
//! - Backends for desktop OpenGL, OpenGL ES 2.0/3.x and a headless dummy
//!
//! Resources are freed through a deferred queue: a freed texture or buffer
//! stays alive until the frames that might still use it have been presented.
//!
//! ## Example
//!
//! ```ignore
//! use ngine_graphics::{ContextDescriptor, DeviceConfig, GraphicsDevice};
//!
//! let gl = unsafe { GlowContext::from_loader_function(|name| window.get_proc_address(name)) };
//! let mut device = GraphicsDevice::from_descriptor(
//!     &ContextDescriptor::OPENGL_3_3,
//!     gl,
//!     window,
//!     DeviceConfig::default(),
//! )?;
//! device.clear(Color::CORNFLOWER_BLUE);
//! device.present();
//! ```

#[macro_use]
mod fatal;

pub mod backend;
pub mod capabilities;
pub mod config;
pub mod context;
pub mod deferred;
pub mod device;
pub mod error;
pub mod layout;
pub mod resources;
pub mod types;

#[doc(hidden)]
pub use log as __log;

// Re-export main types for convenience
#[cfg(all(feature = "opengl", not(target_arch = "wasm32")))]
pub use backend::opengl::GlowContext;
pub use backend::{
    GraphicsBackend, Presenter, create_backend,
    dummy::DummyBackend,
    opengl::{GlApi, GlVersion, OpenGlBackend},
};
pub use capabilities::{Capabilities, Dialect, Features};
pub use config::DeviceConfig;
pub use context::{ContextDescriptor, ContextType};
pub use deferred::ResourceReleaser;
pub use device::{GraphicsDevice, MAX_TEXTURE_UNITS};
pub use error::GraphicsError;
pub use layout::{ElementType, VertexElement, VertexLayout};
pub use resources::{
    Buffer, GraphicsResource, RenderTarget, ResourceId, ResourceKind, ResourceState, Shader,
    ShaderProgram, Texture2D, VertexArray,
};
pub use types::{
    BufferDescriptor, BufferType, BufferUsage, Color, IndexType, PixelFormat, PrimitiveType,
    RenderTargetDescriptor, ShaderProgramDescriptor, ShaderStage, TextureDescriptor,
    TextureFilter, TextureWrap, UniformValue, Viewport, pixel_data_size,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
///
/// This should be called before using any graphics functionality.
pub fn init() {
    log::info!("ngine graphics v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_dummy_device() {
        let device = GraphicsDevice::new(Box::new(DummyBackend::new()), DeviceConfig::default());
        assert_eq!(device.backend_name(), "Dummy Backend");
        assert_eq!(device.capabilities().dialect, Dialect::Headless);
    }

    #[test]
    fn test_texture_unit_limit() {
        assert_eq!(MAX_TEXTURE_UNITS, 8);
    }
}

//! Graphics error types.
//!
//! Only environment failures that a caller can react to are reported through
//! [`GraphicsError`]. Contract violations (out-of-range units, overflowing
//! writes, double frees) go through [`fatal!`](crate::fatal) instead.

use thiserror::Error;

use crate::context::ContextType;
use crate::types::ShaderStage;

/// Errors that can occur in the graphics system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphicsError {
    /// Failed to initialize the graphics system.
    #[error("initialization failed: {0}")]
    InitializationFailed(String),
    /// Failed to create a resource.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// A requested feature is not supported by the active backend.
    #[error("feature not supported: {0}")]
    FeatureNotSupported(String),
    /// No backend is compiled in or implemented for the requested context type.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(ContextType),
    /// The context descriptor names an API version the engine does not accept.
    #[error("invalid context descriptor: {context_type} {major}.{minor}")]
    InvalidContextDescriptor {
        context_type: ContextType,
        major: u32,
        minor: u32,
    },
    /// A shader stage failed to compile.
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompilation { stage: ShaderStage, log: String },
    /// A shader program failed to link.
    #[error("shader program failed to link: {log}")]
    ShaderLink { log: String },
    /// A render target framebuffer was reported incomplete by the driver.
    #[error("framebuffer incomplete (status 0x{status:04X})")]
    FramebufferIncomplete { status: u32 },
}

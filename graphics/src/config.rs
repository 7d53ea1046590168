//! Device configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::deferred::DEFAULT_FRAMES_OF_GRACE;

/// Settings applied when a [`GraphicsDevice`](crate::GraphicsDevice) is created.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceConfig {
    /// Number of presents a freed resource survives before it is destroyed.
    pub frames_of_grace: usize,
    /// Enable straight alpha blending at startup (the 2D default).
    pub alpha_blending: bool,
    /// Size of the drawable before the platform reports one, if any.
    pub initial_viewport: Option<(u32, u32)>,
}

impl DeviceConfig {
    /// Create a config with engine defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of presents a freed resource is kept alive for.
    pub fn with_frames_of_grace(mut self, frames: usize) -> Self {
        self.frames_of_grace = frames;
        self
    }

    /// Enable or disable alpha blending at startup.
    pub fn with_alpha_blending(mut self, enabled: bool) -> Self {
        self.alpha_blending = enabled;
        self
    }

    /// Override the initial viewport size.
    pub fn with_initial_viewport(mut self, width: u32, height: u32) -> Self {
        self.initial_viewport = Some((width, height));
        self
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            frames_of_grace: DEFAULT_FRAMES_OF_GRACE,
            alpha_blending: true,
            initial_viewport: None,
        }
    }
}

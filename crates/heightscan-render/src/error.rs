//! Rendering error types.

use heightscan_core::HeightscanError;
use thiserror::Error;

/// Errors that can occur in the GPU backend.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// The off-screen depth target could not be created.
    #[error("framebuffer setup failed: {0}")]
    FramebufferSetup(String),

    /// Mapping the readback buffer failed.
    #[error("GPU buffer mapping failed")]
    BufferMapFailed,

    /// Timeout waiting for GPU.
    #[error("timeout waiting for GPU")]
    Timeout,

    /// Image encoding or writing failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<RenderError> for HeightscanError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::FramebufferSetup(msg) => HeightscanError::FramebufferSetup(msg),
            other => HeightscanError::Render(other.to_string()),
        }
    }
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

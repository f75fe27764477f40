use thiserror::Error;

use crate::device::ShaderId;

/// Failures a device can report while allocating resources.
///
/// These only surface from construction paths. Per-frame misuse is logged
/// by the device and the offending pass is skipped.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to create shader {id:?}: {message}")]
    ShaderCreation { id: ShaderId, message: String },

    #[error("failed to link program for {id:?}: {message}")]
    ProgramLink { id: ShaderId, message: String },

    #[error("failed to create {width}x{height} render target: {message}")]
    TextureCreation { width: u32, height: u32, message: String },

    #[error("failed to create buffer: {0}")]
    BufferCreation(String),

    #[error("unknown texture handle {0}")]
    UnknownTexture(u32),
}

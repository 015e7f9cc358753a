//! GPU backend errors

use easel_paint::{EaselError, TargetId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("no suitable GPU adapter found")]
    AdapterNotFound,

    #[error("failed to request GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to map readback buffer: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    #[error("unknown render target {0:?}")]
    UnknownTarget(TargetId),

    #[error("readback of {width}x{height} target produced a malformed image")]
    Readback { width: u32, height: u32 },

    #[error("failed to encode frame: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, GpuError>;

impl From<GpuError> for EaselError {
    fn from(err: GpuError) -> Self {
        match err {
            GpuError::UnknownTarget(id) => EaselError::UnknownTarget(id),
            other => EaselError::Backend(other.to_string()),
        }
    }
}

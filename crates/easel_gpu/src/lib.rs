//! Easel GPU
//!
//! wgpu implementation of [`easel_paint::RenderBackend`]. Render targets are
//! offscreen textures; a [`Sketch`](easel_paint::Sketch) driven by
//! [`WgpuBackend`] can read any finished frame back as an image.
//!
//! ```ignore
//! use easel_gpu::{BackendConfig, WgpuBackend};
//! use easel_paint::{Sketch, SketchConfig};
//!
//! let backend = WgpuBackend::new_blocking(BackendConfig::default())?;
//! let mut sketch = Sketch::new(backend, SketchConfig::default())?;
//! sketch.frame(|s| s.circle(150.0, 150.0, 80.0))?;
//! sketch.backend().save_png(sketch.last_frame(), "frame.png")?;
//! ```

pub mod blend;
pub mod error;
pub mod renderer;
pub mod shaders;
pub mod target;

pub use blend::{blend_state, is_native};
pub use error::GpuError;
pub use renderer::{BackendConfig, WgpuBackend};
pub use target::{RenderTarget, TARGET_FORMAT};

//! Easel Paint
//!
//! Processing-style immediate-mode 2D drawing on top of a retained-mode
//! render backend.
//!
//! # Pipeline
//!
//! ```text
//! shape call ─▶ PrimitiveBuilder ─▶ GeometryCache
//!                      │
//!                      ▼
//!               BatchRenderer ─▶ RenderBackend ─▶ FrameBuffer ─▶ present
//! ```
//!
//! - [`PrimitiveBuilder`]: ellipses, arcs, (rounded) rects, curves and
//!   polygons with holes to fill triangles and stroke polylines
//! - [`GeometryCache`]: memoized ellipse and arc rings
//! - [`BatchRenderer`]: matrix transform (SIMD for large batches) and one
//!   draw call per primitive
//! - [`FrameBuffer`]: two alternating targets for redraw suppression and
//!   frame-to-frame persistence
//! - [`Sketch`]: the user-facing drawing API tying it all together

pub mod backend;
pub mod batch;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod frame;
pub mod shape;
pub mod tessellate;
pub mod transform;
pub mod triangulate;

pub use backend::{HeadlessBackend, RenderBackend, Submission, TargetId, Vertex};
pub use batch::{BatchRenderer, FrameStats, StrokeParams};
pub use cache::{CacheStats, GeometryCache};
pub use config::SketchConfig;
pub use context::Sketch;
pub use error::{EaselError, Result};
pub use frame::FrameBuffer;
pub use shape::ShapeRecorder;
pub use tessellate::{CornerRadius, Outline, PrimitiveBuilder, Tessellation};
pub use triangulate::PolygonTriangulator;

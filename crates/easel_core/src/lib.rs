//! Easel Core
//!
//! Leaf value types shared by every Easel crate:
//!
//! - **Geometry**: points, triangles, rects and 2D affine matrices
//! - **Color**: packed 8-bit RGBA where alpha 0 disables a paint
//! - **Style**: the immutable paint state consumed by the tessellator
//! - **Stacks**: LIFO save/restore of the active matrix and style
//!
//! # Example
//!
//! ```rust
//! use easel_core::{Color, Point, TransformStack};
//!
//! let mut transforms = TransformStack::new();
//! transforms.push();
//! transforms.translate(10.0, 0.0);
//! assert_eq!(transforms.current().transform_point(Point::ZERO), Point::new(10.0, 0.0));
//! transforms.pop();
//! assert_eq!(transforms.current().transform_point(Point::ZERO), Point::ZERO);
//!
//! assert!(Color::rgba(255, 0, 0, 0).is_transparent());
//! ```

pub mod color;
pub mod geometry;
pub mod stack;
pub mod style;

pub use color::Color;
pub use geometry::{Affine2D, Point, Rect, Triangle};
pub use stack::{StateStack, StyleStack, TransformStack};
pub use style::{ArcMode, BlendMode, LineCap, LineJoin, ShapeMode, Style};

//! Sketch context - the main drawing API
//!
//! [`Sketch`] owns the render backend, the active matrix and style stacks,
//! the tessellator and the batch renderer. Shape calls are only valid
//! inside [`Sketch::frame`]; state setters work at any time.
//!
//! ```rust
//! use easel_core::Color;
//! use easel_paint::{HeadlessBackend, Sketch, SketchConfig};
//!
//! let mut sketch = Sketch::new(HeadlessBackend::new(), SketchConfig::default())?;
//! sketch.frame(|s| {
//!     s.background(Color::gray(200))?;
//!     s.fill(Color::RED);
//!     s.push();
//!     s.translate(150.0, 150.0);
//!     s.ellipse(0.0, 0.0, 80.0, 80.0)?;
//!     s.pop();
//!     Ok(())
//! })?;
//! assert_eq!(sketch.frame_count(), 1);
//! # Ok::<(), easel_paint::EaselError>(())
//! ```

use easel_core::{
    Affine2D, ArcMode, BlendMode, Color, LineCap, LineJoin, Point, ShapeMode, Style, StyleStack,
    TransformStack,
};

use crate::backend::{RenderBackend, TargetId};
use crate::batch::{BatchRenderer, FrameStats};
use crate::cache::CacheStats;
use crate::config::SketchConfig;
use crate::error::{EaselError, Result};
use crate::frame::FrameBuffer;
use crate::shape::ShapeRecorder;
use crate::tessellate::{CornerRadius, PrimitiveBuilder, Tessellation};

/// Immediate-mode drawing surface over a [`RenderBackend`]
#[derive(Debug)]
pub struct Sketch<B: RenderBackend> {
    backend: B,
    builder: PrimitiveBuilder,
    batch: BatchRenderer,
    frames: FrameBuffer,
    transforms: TransformStack,
    styles: StyleStack,
    shape: ShapeRecorder,
}

impl<B: RenderBackend> Sketch<B> {
    pub fn new(mut backend: B, config: SketchConfig) -> Result<Self> {
        let frames = FrameBuffer::new(&mut backend, config.width, config.height, config.looping)?;
        tracing::debug!(
            width = config.width,
            height = config.height,
            sides = config.sides,
            "sketch created"
        );
        Ok(Self {
            backend,
            builder: PrimitiveBuilder::new(config.sides, config.catmull_rom_alpha),
            batch: BatchRenderer::new(config.initial_vertex_capacity, config.simd_threshold),
            frames,
            transforms: TransformStack::new(),
            styles: StyleStack::new(config.style),
            shape: ShapeRecorder::new(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame control
    // ─────────────────────────────────────────────────────────────────────────

    /// Run `draw` for one frame if a frame is due
    ///
    /// Returns `Ok(false)` when looping is off and no redraw was requested;
    /// the previous frame is presented again in that case. Each drawn frame
    /// starts with the identity matrix; the style carries over.
    pub fn frame<F>(&mut self, draw: F) -> Result<bool>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if self.frames.begin(&mut self.backend)?.is_none() {
            return Ok(false);
        }

        let stale_matrices = self.transforms.depth();
        let stale_styles = self.styles.clear_saved();
        if stale_matrices + stale_styles > 0 {
            tracing::warn!(
                matrices = stale_matrices,
                styles = stale_styles,
                "unbalanced push from the previous frame dropped"
            );
        }
        self.transforms.reset();
        self.batch.begin_frame();

        let result = draw(self);
        self.shape.discard();
        self.frames.finish(&mut self.backend)?;

        let stats = self.batch.stats();
        tracing::trace!(
            frame = self.frames.frame_count(),
            draw_calls = stats.draw_calls,
            triangles = stats.triangles,
            "frame finished"
        );
        result.map(|()| true)
    }

    /// Run `init` as a frame regardless of the loop state
    pub fn setup<F>(&mut self, init: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.frames.request_redraw();
        self.frame(init).map(|_| ())
    }

    /// Draw the next frame even when looping is off
    pub fn redraw(&mut self) {
        self.frames.request_redraw();
    }

    /// Stop running the draw closure every frame
    pub fn no_loop(&mut self) {
        self.frames.set_looping(false);
    }

    /// Run the draw closure every frame again
    pub fn start_loop(&mut self) {
        self.frames.set_looping(true);
    }

    pub fn is_looping(&self) -> bool {
        self.frames.is_looping()
    }

    /// Resize the surface before the next frame (contents are discarded)
    pub fn size(&mut self, width: u32, height: u32) {
        self.frames.request_resize(width, height);
    }

    pub fn width(&self) -> u32 {
        self.frames.size().0
    }

    pub fn height(&self) -> u32 {
        self.frames.size().1
    }

    pub fn frame_count(&self) -> u64 {
        self.frames.frame_count()
    }

    /// Target of the frame in progress
    pub fn target(&self) -> Option<TargetId> {
        self.frames.active()
    }

    /// Most recently finished frame
    pub fn last_frame(&self) -> TargetId {
        self.frames.last()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration and diagnostics
    // ─────────────────────────────────────────────────────────────────────────

    /// Segments per ellipse, arc and curve
    pub fn sides(&self) -> u32 {
        self.builder.sides()
    }

    /// Change the segment count (clears the geometry cache)
    pub fn set_sides(&mut self, sides: u32) {
        self.builder.set_sides(sides);
    }

    /// Counters for the current (or last drawn) frame
    pub fn frame_stats(&self) -> FrameStats {
        self.batch.stats()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.builder.cache_stats()
    }

    /// Both stacks have no outstanding pushes and never underflowed
    pub fn is_balanced(&self) -> bool {
        self.transforms.is_balanced() && self.styles.is_balanced()
    }

    /// Pops that found a stack empty, matrix and style combined
    pub fn underflows(&self) -> usize {
        self.transforms.underflows() + self.styles.underflows()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Style
    // ─────────────────────────────────────────────────────────────────────────

    pub fn style(&self) -> &Style {
        self.styles.current()
    }

    pub fn set_style(&mut self, style: Style) {
        self.styles.set(style);
    }

    pub fn fill(&mut self, color: impl Into<Color>) {
        let color = color.into();
        self.styles.update(|s| s.with_fill(color));
    }

    pub fn no_fill(&mut self) {
        self.styles.update(Style::without_fill);
    }

    pub fn stroke(&mut self, color: impl Into<Color>) {
        let color = color.into();
        self.styles.update(|s| s.with_stroke(color));
    }

    pub fn no_stroke(&mut self) {
        self.styles.update(Style::without_stroke);
    }

    pub fn stroke_weight(&mut self, weight: f32) {
        self.styles.update(|s| s.with_stroke_weight(weight));
    }

    pub fn stroke_cap(&mut self, cap: LineCap) {
        self.styles.update(|s| s.with_stroke_cap(cap));
    }

    pub fn stroke_join(&mut self, join: LineJoin) {
        self.styles.update(|s| s.with_stroke_join(join));
    }

    pub fn text_size(&mut self, size: f32) {
        self.styles.update(|s| s.with_text_size(size));
    }

    pub fn rect_mode(&mut self, mode: ShapeMode) {
        self.styles.update(|s| s.with_rect_mode(mode));
    }

    pub fn ellipse_mode(&mut self, mode: ShapeMode) {
        self.styles.update(|s| s.with_ellipse_mode(mode));
    }

    pub fn blend_mode(&mut self, mode: BlendMode) {
        self.styles.update(|s| s.with_blend_mode(mode));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Stacks and transforms
    // ─────────────────────────────────────────────────────────────────────────

    /// Save both the matrix and the style
    pub fn push(&mut self) {
        self.styles.push();
        self.transforms.push();
    }

    /// Restore both the matrix and the style
    pub fn pop(&mut self) {
        self.styles.pop();
        self.transforms.pop();
    }

    pub fn push_matrix(&mut self) {
        self.transforms.push();
    }

    pub fn pop_matrix(&mut self) {
        self.transforms.pop();
    }

    pub fn push_style(&mut self) {
        self.styles.push();
    }

    pub fn pop_style(&mut self) {
        self.styles.pop();
    }

    pub fn matrix(&self) -> Affine2D {
        *self.transforms.current()
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.transforms.translate(x, y);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.transforms.rotate(angle);
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.transforms.scale(sx, sy);
    }

    pub fn scale_uniform(&mut self, s: f32) {
        self.transforms.scale(s, s);
    }

    pub fn shear_x(&mut self, angle: f32) {
        self.transforms.shear_x(angle);
    }

    pub fn shear_y(&mut self, angle: f32) {
        self.transforms.shear_y(angle);
    }

    pub fn reset_matrix(&mut self) {
        self.transforms.reset_matrix();
    }

    /// Right-multiply the active matrix by `| a c e |  | b d f |`
    pub fn apply_matrix(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.transforms.apply_matrix(a, b, c, d, e, f);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Shapes
    // ─────────────────────────────────────────────────────────────────────────

    /// Fill the whole frame, ignoring the matrix and blend mode
    pub fn background(&mut self, color: impl Into<Color>) -> Result<()> {
        let target = self.active_target()?;
        self.backend.clear_target(target, color.into())
    }

    /// Clear the frame to transparent
    pub fn clear(&mut self) -> Result<()> {
        self.background(Color::TRANSPARENT)
    }

    pub fn ellipse(&mut self, a: f32, b: f32, c: f32, d: f32) -> Result<()> {
        self.draw_with(|builder, style| builder.ellipse(style, a, b, c, d))
    }

    /// Circle of diameter `d`, placed through the ellipse mode
    pub fn circle(&mut self, x: f32, y: f32, d: f32) -> Result<()> {
        self.ellipse(x, y, d, d)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        &mut self,
        a: f32,
        b: f32,
        c: f32,
        d: f32,
        start: f32,
        stop: f32,
        mode: ArcMode,
    ) -> Result<()> {
        self.draw_with(|builder, style| builder.arc(style, a, b, c, d, start, stop, mode))
    }

    pub fn rect(&mut self, a: f32, b: f32, c: f32, d: f32) -> Result<()> {
        self.draw_with(|builder, style| builder.rect(style, a, b, c, d))
    }

    /// Rectangle with rounded corners
    ///
    /// Accepts one radius, `[tl, tr, br, bl]`, or a slice where missing
    /// radii repeat the previous one.
    pub fn rounded_rect(
        &mut self,
        a: f32,
        b: f32,
        c: f32,
        d: f32,
        radii: impl Into<CornerRadius>,
    ) -> Result<()> {
        let radii = radii.into();
        self.draw_with(|builder, style| builder.rounded_rect(style, a, b, c, d, radii))
    }

    pub fn square(&mut self, x: f32, y: f32, size: f32) -> Result<()> {
        self.rect(x, y, size, size)
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<()> {
        let (from, to) = (Point::new(x1, y1), Point::new(x2, y2));
        self.draw_with(|builder, style| builder.line(style, from, to))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn quad(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
        x4: f32,
        y4: f32,
    ) -> Result<()> {
        let points = [
            Point::new(x1, y1),
            Point::new(x2, y2),
            Point::new(x3, y3),
            Point::new(x4, y4),
        ];
        self.draw_with(|builder, style| builder.quad(style, points))
    }

    pub fn triangle(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
    ) -> Result<()> {
        let points = [Point::new(x1, y1), Point::new(x2, y2), Point::new(x3, y3)];
        self.draw_with(|builder, style| builder.triangle(style, points))
    }

    pub fn point(&mut self, x: f32, y: f32) -> Result<()> {
        self.draw_with(|builder, style| builder.point(style, Point::new(x, y)))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn bezier(
        &mut self,
        x1: f32,
        y1: f32,
        cx1: f32,
        cy1: f32,
        cx2: f32,
        cy2: f32,
        x2: f32,
        y2: f32,
    ) -> Result<()> {
        let points = [
            Point::new(x1, y1),
            Point::new(cx1, cy1),
            Point::new(cx2, cy2),
            Point::new(x2, y2),
        ];
        self.draw_with(|builder, style| builder.bezier(style, points))
    }

    /// Catmull-Rom segment between the two middle points
    #[allow(clippy::too_many_arguments)]
    pub fn curve(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
        x4: f32,
        y4: f32,
    ) -> Result<()> {
        let points = [
            Point::new(x1, y1),
            Point::new(x2, y2),
            Point::new(x3, y3),
            Point::new(x4, y4),
        ];
        self.draw_with(|builder, style| builder.curve(style, points))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Custom shapes
    // ─────────────────────────────────────────────────────────────────────────

    pub fn begin_shape(&mut self) -> Result<()> {
        self.shape.begin_shape()
    }

    pub fn vertex(&mut self, x: f32, y: f32) -> Result<()> {
        self.shape.vertex(x, y)
    }

    pub fn begin_contour(&mut self) -> Result<()> {
        self.shape.begin_contour()
    }

    pub fn end_contour(&mut self) -> Result<()> {
        self.shape.end_contour()
    }

    /// Fill the recorded outer contour minus its holes, then stroke every
    /// contour closed
    pub fn end_shape(&mut self) -> Result<()> {
        let contours = self.shape.end_shape()?;
        self.draw_with(|builder, style| builder.polygon(style, &contours))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn active_target(&self) -> Result<TargetId> {
        self.frames.active().ok_or(EaselError::NoActiveFrame)
    }

    /// Tessellate with the active style and submit under the active matrix
    fn draw_with<F>(&mut self, build: F) -> Result<()>
    where
        F: FnOnce(&mut PrimitiveBuilder, &Style) -> Tessellation,
    {
        let target = self.active_target()?;
        let style = *self.styles.current();
        let shape = build(&mut self.builder, &style);
        if shape.is_empty() {
            return Ok(());
        }
        self.batch.draw(
            &mut self.backend,
            target,
            self.transforms.current(),
            &style,
            &shape,
        )
    }
}

//! Batch renderer
//!
//! Accumulates one primitive's triangles into a shared vertex buffer,
//! transforms them by the active matrix and hands them to the backend as a
//! single draw call. The buffer is overwritten by each submission and grows
//! by doubling; it is never shrunk.
//!
//! Strokes are tessellated with lyon in the shape's local space and then
//! transformed like fills, so stroke weight follows `scale`.

use std::f32::consts::TAU;

use easel_core::{Affine2D, BlendMode, Color, LineCap, LineJoin, Point, Style, Triangle};
use lyon::lyon_tessellation::{
    BuffersBuilder, StrokeOptions, StrokeTessellator, StrokeVertex, VertexBuffers,
};
use lyon::math::point;
use lyon::path::Path;

use crate::backend::{RenderBackend, TargetId, Vertex};
use crate::error::Result;
use crate::tessellate::{Outline, Tessellation};
use crate::transform::transform_points;

/// Segments used for round point caps
const POINT_SEGMENTS: usize = 16;

/// Per-frame counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Fill triangles submitted
    pub triangles: usize,
    /// Polyline points stroked
    pub stroke_points: usize,
    /// Backend submissions
    pub draw_calls: usize,
    /// Vertices uploaded
    pub vertices: usize,
}

/// Stroke parameters taken from a [`Style`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeParams {
    pub color: Color,
    pub weight: f32,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl StrokeParams {
    pub fn from_style(style: &Style) -> Self {
        Self {
            color: style.stroke,
            weight: style.stroke_weight,
            cap: style.stroke_cap,
            join: style.stroke_join,
        }
    }

    fn options(&self) -> StrokeOptions {
        StrokeOptions::default()
            .with_line_width(self.weight)
            .with_tolerance(0.1)
            .with_line_cap(match self.cap {
                LineCap::Butt => lyon::lyon_tessellation::LineCap::Butt,
                LineCap::Round => lyon::lyon_tessellation::LineCap::Round,
                LineCap::Square => lyon::lyon_tessellation::LineCap::Square,
            })
            .with_line_join(match self.join {
                LineJoin::Miter => lyon::lyon_tessellation::LineJoin::Miter,
                LineJoin::Round => lyon::lyon_tessellation::LineJoin::Round,
                LineJoin::Bevel => lyon::lyon_tessellation::LineJoin::Bevel,
            })
    }
}

/// Growable vertex batching with one draw call per primitive
pub struct BatchRenderer {
    vertices: Vec<Vertex>,
    capacity: usize,
    positions: Vec<Point>,
    stroke_geometry: VertexBuffers<Point, u32>,
    stroker: StrokeTessellator,
    simd_threshold: usize,
    stats: FrameStats,
}

impl std::fmt::Debug for BatchRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRenderer")
            .field("capacity", &self.capacity)
            .field("simd_threshold", &self.simd_threshold)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Default for BatchRenderer {
    fn default() -> Self {
        Self::new(1024, 64)
    }
}

impl BatchRenderer {
    /// `simd_threshold` is counted in triangles
    pub fn new(initial_capacity: usize, simd_threshold: usize) -> Self {
        let capacity = initial_capacity.max(3);
        Self {
            vertices: Vec::with_capacity(capacity),
            capacity,
            positions: Vec::with_capacity(capacity),
            stroke_geometry: VertexBuffers::new(),
            stroker: StrokeTessellator::new(),
            simd_threshold,
            stats: FrameStats::default(),
        }
    }

    /// Vertex capacity of the shared buffer
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn simd_threshold(&self) -> usize {
        self.simd_threshold
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Reset the per-frame counters, buffers keep their capacity
    pub fn begin_frame(&mut self) {
        self.stats = FrameStats::default();
    }

    /// Submit both halves of a tessellated shape
    pub fn draw<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        target: TargetId,
        matrix: &Affine2D,
        style: &Style,
        shape: &Tessellation,
    ) -> Result<()> {
        self.fill_triangles(
            backend,
            target,
            matrix,
            &shape.fill,
            style.fill,
            style.blend_mode,
        )?;
        let stroke = StrokeParams::from_style(style);
        for outline in &shape.outlines {
            self.stroke_polyline(backend, target, matrix, outline, &stroke, style.blend_mode)?;
        }
        Ok(())
    }

    /// Transform and submit a triangle list as one draw call
    pub fn fill_triangles<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        target: TargetId,
        matrix: &Affine2D,
        triangles: &[Triangle],
        color: Color,
        blend: BlendMode,
    ) -> Result<()> {
        if triangles.is_empty() || color.is_transparent() {
            return Ok(());
        }

        self.positions.clear();
        self.positions
            .extend_from_slice(bytemuck::cast_slice::<Triangle, Point>(triangles));
        self.submit_positions(backend, target, matrix, color, blend)?;
        self.stats.triangles += triangles.len();
        Ok(())
    }

    /// Stroke a polyline as one draw call
    ///
    /// A single point becomes a square (butt and square caps) or a disc
    /// (round cap) of diameter `weight`.
    pub fn stroke_polyline<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        target: TargetId,
        matrix: &Affine2D,
        outline: &Outline,
        stroke: &StrokeParams,
        blend: BlendMode,
    ) -> Result<()> {
        if outline.points.is_empty() || stroke.color.is_transparent() || stroke.weight <= 0.0 {
            return Ok(());
        }

        self.positions.clear();
        if let [at] = outline.points.as_slice() {
            point_geometry(&mut self.positions, *at, stroke);
        } else {
            self.tessellate_stroke(outline, stroke);
        }
        if self.positions.is_empty() {
            return Ok(());
        }

        self.submit_positions(backend, target, matrix, stroke.color, blend)?;
        self.stats.stroke_points += outline.points.len();
        Ok(())
    }

    fn tessellate_stroke(&mut self, outline: &Outline, stroke: &StrokeParams) {
        let first = outline.points[0];
        let mut builder = Path::builder();
        builder.begin(point(first.x, first.y));
        for p in &outline.points[1..] {
            builder.line_to(point(p.x, p.y));
        }
        builder.end(outline.closed);
        let path = builder.build();

        self.stroke_geometry.vertices.clear();
        self.stroke_geometry.indices.clear();

        let result = self.stroker.tessellate_path(
            &path,
            &stroke.options(),
            &mut BuffersBuilder::new(&mut self.stroke_geometry, |vertex: StrokeVertex| {
                let p = vertex.position();
                Point::new(p.x, p.y)
            }),
        );

        if let Err(err) = result {
            tracing::warn!("Polyline stroke tessellation failed: {:?}", err);
            return;
        }

        let vertices = &self.stroke_geometry.vertices;
        self.positions.extend(
            self.stroke_geometry
                .indices
                .iter()
                .map(|&i| vertices[i as usize]),
        );
    }

    /// Transform `self.positions`, color them and issue one submission
    fn submit_positions<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        target: TargetId,
        matrix: &Affine2D,
        color: Color,
        blend: BlendMode,
    ) -> Result<()> {
        let count = self.positions.len();
        let simd = count / 3 >= self.simd_threshold;
        transform_points(matrix, &mut self.positions, simd);

        self.reserve(count);
        let rgba = color.to_array();
        self.vertices.clear();
        self.vertices
            .extend(self.positions.iter().map(|p| Vertex {
                position: p.to_array(),
                color: rgba,
            }));

        tracing::trace!(vertices = count, simd, ?blend, "submitting batch");
        backend.submit(target, &self.vertices, blend)?;
        self.stats.draw_calls += 1;
        self.stats.vertices += count;
        Ok(())
    }

    /// Double the buffer until `needed` vertices fit
    fn reserve(&mut self, needed: usize) {
        if needed <= self.capacity {
            return;
        }
        let mut capacity = self.capacity;
        while capacity < needed {
            capacity *= 2;
        }
        tracing::trace!(from = self.capacity, to = capacity, "growing vertex buffer");
        self.vertices.reserve_exact(capacity - self.vertices.len());
        self.capacity = capacity;
    }
}

/// Triangles covering a stroked single point
fn point_geometry(out: &mut Vec<Point>, at: Point, stroke: &StrokeParams) {
    let r = stroke.weight / 2.0;
    match stroke.cap {
        LineCap::Butt | LineCap::Square => {
            let tl = Point::new(at.x - r, at.y - r);
            let tr = Point::new(at.x + r, at.y - r);
            let br = Point::new(at.x + r, at.y + r);
            let bl = Point::new(at.x - r, at.y + r);
            out.extend_from_slice(&[tl, tr, br, tl, br, bl]);
        }
        LineCap::Round => {
            let step = TAU / POINT_SEGMENTS as f32;
            let rim = |i: usize| {
                let angle = step * i as f32;
                Point::new(at.x + r * angle.cos(), at.y + r * angle.sin())
            };
            for i in 0..POINT_SEGMENTS {
                out.extend_from_slice(&[at, rim(i), rim((i + 1) % POINT_SEGMENTS)]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;

    fn setup() -> (HeadlessBackend, TargetId) {
        let mut backend = HeadlessBackend::new();
        let target = backend.create_target(100, 100).unwrap();
        (backend, target)
    }

    fn grid(n: usize) -> Vec<Triangle> {
        (0..n)
            .map(|i| {
                let o = Point::new(i as f32, 0.0);
                Triangle::new(o, o + Point::new(1.0, 0.0), o + Point::new(0.0, 1.0))
            })
            .collect()
    }

    #[test]
    fn test_one_draw_call_per_fill() {
        let (mut backend, target) = setup();
        let mut batch = BatchRenderer::default();
        batch
            .fill_triangles(
                &mut backend,
                target,
                &Affine2D::IDENTITY,
                &grid(10),
                Color::RED,
                BlendMode::Blend,
            )
            .unwrap();

        assert_eq!(backend.draw_calls(), 1);
        assert_eq!(backend.submissions()[0].triangle_count(), 10);
        assert_eq!(batch.stats().triangles, 10);
        assert_eq!(backend.submissions()[0].vertices[0].color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_transparent_or_empty_is_skipped() {
        let (mut backend, target) = setup();
        let mut batch = BatchRenderer::default();
        let m = Affine2D::IDENTITY;
        batch
            .fill_triangles(&mut backend, target, &m, &grid(3), Color::TRANSPARENT, BlendMode::Blend)
            .unwrap();
        batch
            .fill_triangles(&mut backend, target, &m, &[], Color::RED, BlendMode::Blend)
            .unwrap();
        assert_eq!(backend.draw_calls(), 0);
        assert_eq!(batch.stats(), FrameStats::default());
    }

    #[test]
    fn test_vertices_are_transformed() {
        let (mut backend, target) = setup();
        let mut batch = BatchRenderer::default();
        let m = Affine2D::translation(10.0, 20.0);
        batch
            .fill_triangles(&mut backend, target, &m, &grid(1), Color::BLACK, BlendMode::Add)
            .unwrap();
        let sub = &backend.submissions()[0];
        assert_eq!(sub.vertices[0].position, [10.0, 20.0]);
        assert_eq!(sub.vertices[1].position, [11.0, 20.0]);
        assert_eq!(sub.blend, BlendMode::Add);
    }

    #[test]
    fn test_simd_and_scalar_paths_agree() {
        let m = Affine2D::rotation(0.3).then(&Affine2D::scale(1.7, 0.4));
        let triangles = grid(100);

        let (mut backend_scalar, t1) = setup();
        let mut scalar = BatchRenderer::new(1024, usize::MAX);
        scalar
            .fill_triangles(&mut backend_scalar, t1, &m, &triangles, Color::RED, BlendMode::Blend)
            .unwrap();

        let (mut backend_simd, t2) = setup();
        let mut simd = BatchRenderer::new(1024, 0);
        simd.fill_triangles(&mut backend_simd, t2, &m, &triangles, Color::RED, BlendMode::Blend)
            .unwrap();

        assert_eq!(
            backend_scalar.submissions()[0].vertices,
            backend_simd.submissions()[0].vertices
        );
    }

    #[test]
    fn test_buffer_grows_by_doubling() {
        let (mut backend, target) = setup();
        let mut batch = BatchRenderer::new(1024, 64);
        let m = Affine2D::IDENTITY;

        // 600 triangles need 1800 vertices
        batch
            .fill_triangles(&mut backend, target, &m, &grid(600), Color::RED, BlendMode::Blend)
            .unwrap();
        assert_eq!(batch.capacity(), 2048);

        // smaller batches never shrink it
        batch
            .fill_triangles(&mut backend, target, &m, &grid(1), Color::RED, BlendMode::Blend)
            .unwrap();
        assert_eq!(batch.capacity(), 2048);

        batch
            .fill_triangles(&mut backend, target, &m, &grid(2000), Color::RED, BlendMode::Blend)
            .unwrap();
        assert_eq!(batch.capacity(), 8192);
        assert_eq!(backend.draw_calls(), 3);
    }

    #[test]
    fn test_stroke_polyline_is_one_draw_call() {
        let (mut backend, target) = setup();
        let mut batch = BatchRenderer::default();
        let outline = Outline::closed(vec![
            Point::new(10.0, 10.0),
            Point::new(50.0, 10.0),
            Point::new(50.0, 50.0),
        ]);
        let stroke = StrokeParams::from_style(&Style::default().with_stroke_weight(4.0));
        batch
            .stroke_polyline(
                &mut backend,
                target,
                &Affine2D::IDENTITY,
                &outline,
                &stroke,
                BlendMode::Blend,
            )
            .unwrap();

        assert_eq!(backend.draw_calls(), 1);
        assert!(backend.submissions()[0].triangle_count() > 0);
        assert_eq!(batch.stats().stroke_points, 3);
    }

    #[test]
    fn test_point_caps() {
        let (mut backend, target) = setup();
        let mut batch = BatchRenderer::default();
        let at = Outline::open(vec![Point::new(5.0, 5.0)]);
        let m = Affine2D::IDENTITY;

        let square = StrokeParams::from_style(
            &Style::default()
                .with_stroke_weight(2.0)
                .with_stroke_cap(LineCap::Square),
        );
        batch
            .stroke_polyline(&mut backend, target, &m, &at, &square, BlendMode::Blend)
            .unwrap();
        let round = StrokeParams {
            cap: LineCap::Round,
            ..square
        };
        batch
            .stroke_polyline(&mut backend, target, &m, &at, &round, BlendMode::Blend)
            .unwrap();

        let subs = backend.submissions();
        assert_eq!(subs[0].triangle_count(), 2);
        assert_eq!(subs[0].vertices[0].position, [4.0, 4.0]);
        assert_eq!(subs[1].triangle_count(), POINT_SEGMENTS);
    }

    #[test]
    fn test_begin_frame_resets_stats_but_not_capacity() {
        let (mut backend, target) = setup();
        let mut batch = BatchRenderer::new(16, 64);
        batch
            .fill_triangles(
                &mut backend,
                target,
                &Affine2D::IDENTITY,
                &grid(20),
                Color::RED,
                BlendMode::Blend,
            )
            .unwrap();
        let grown = batch.capacity();
        batch.begin_frame();
        assert_eq!(batch.stats(), FrameStats::default());
        assert_eq!(batch.capacity(), grown);
    }
}

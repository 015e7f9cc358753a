//! Polygon-with-holes triangulation using lyon
//!
//! The outer contour and every hole become closed subpaths of one lyon path,
//! filled with the even-odd rule so hole winding does not matter.

use easel_core::{Point, Triangle};
use lyon::lyon_tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};
use lyon::math::point;
use lyon::path::Path;

/// Reusable fill tessellator for arbitrary polygons
pub struct PolygonTriangulator {
    tessellator: FillTessellator,
    geometry: VertexBuffers<Point, u32>,
    options: FillOptions,
}

impl Default for PolygonTriangulator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PolygonTriangulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolygonTriangulator").finish_non_exhaustive()
    }
}

impl PolygonTriangulator {
    pub fn new() -> Self {
        Self {
            tessellator: FillTessellator::new(),
            geometry: VertexBuffers::new(),
            options: FillOptions::default()
                .with_fill_rule(FillRule::EvenOdd)
                .with_tolerance(0.1),
        }
    }

    /// Triangulate `outer` minus `holes`
    ///
    /// An outer contour with fewer than three points yields no triangles;
    /// holes with fewer than three points are skipped.
    pub fn triangulate<H: AsRef<[Point]>>(
        &mut self,
        outer: &[Point],
        holes: &[H],
    ) -> Vec<Triangle> {
        if outer.len() < 3 {
            return Vec::new();
        }

        let contours = std::iter::once(outer)
            .chain(holes.iter().map(AsRef::as_ref))
            .filter(|contour| contour.len() >= 3);

        let mut builder = Path::builder();
        for contour in contours {
            builder.begin(point(contour[0].x, contour[0].y));
            for p in &contour[1..] {
                builder.line_to(point(p.x, p.y));
            }
            builder.end(true);
        }
        let path = builder.build();

        self.geometry.vertices.clear();
        self.geometry.indices.clear();

        let result = self.tessellator.tessellate_path(
            &path,
            &self.options,
            &mut BuffersBuilder::new(&mut self.geometry, |vertex: FillVertex| {
                let p = vertex.position();
                Point::new(p.x, p.y)
            }),
        );

        if let Err(err) = result {
            tracing::warn!("Polygon fill tessellation failed: {:?}", err);
            return Vec::new();
        }

        let vertices = &self.geometry.vertices;
        self.geometry
            .indices
            .chunks_exact(3)
            .map(|i| {
                Triangle::new(
                    vertices[i[0] as usize],
                    vertices[i[1] as usize],
                    vertices[i[2] as usize],
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(triangles: &[Triangle]) -> f32 {
        triangles.iter().map(Triangle::area).sum()
    }

    fn square(x: f32, y: f32, size: f32) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ]
    }

    #[test]
    fn test_square_with_hole_area() {
        let mut triangulator = PolygonTriangulator::new();
        let outer = square(0.0, 0.0, 10.0);
        let hole = square(2.5, 2.5, 5.0);
        let triangles = triangulator.triangulate(&outer, &[hole]);
        assert!((area(&triangles) - 75.0).abs() < 1e-3);
    }

    #[test]
    fn test_hole_winding_is_irrelevant() {
        let mut triangulator = PolygonTriangulator::new();
        let outer = square(0.0, 0.0, 10.0);
        let mut hole = square(2.5, 2.5, 5.0);
        hole.reverse();
        let triangles = triangulator.triangulate(&outer, &[hole]);
        assert!((area(&triangles) - 75.0).abs() < 1e-3);
    }

    #[test]
    fn test_concave_polygon() {
        let mut triangulator = PolygonTriangulator::new();
        // L shape: 10x10 minus a 5x5 corner
        let outer = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(5.0, 5.0),
            Point::new(5.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let triangles = triangulator.triangulate::<Vec<Point>>(&outer, &[]);
        assert!((area(&triangles) - 75.0).abs() < 1e-3);
    }

    #[test]
    fn test_too_few_points_is_empty() {
        let mut triangulator = PolygonTriangulator::new();
        let outer = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert!(triangulator
            .triangulate::<Vec<Point>>(&outer, &[])
            .is_empty());
        assert!(triangulator.triangulate::<Vec<Point>>(&[], &[]).is_empty());
    }

    #[test]
    fn test_tiny_hole_ignored() {
        let mut triangulator = PolygonTriangulator::new();
        let outer = square(0.0, 0.0, 4.0);
        let hole = vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)];
        let triangles = triangulator.triangulate(&outer, &[hole]);
        assert!((area(&triangles) - 16.0).abs() < 1e-3);
    }
}

//! Primitive tessellation
//!
//! [`PrimitiveBuilder`] turns shape calls into untransformed geometry:
//! a triangle list for the fill and zero or more polylines for the stroke.
//! The active [`Style`] is passed in explicitly; a transparent fill or
//! stroke skips that half of the work entirely.
//!
//! Ellipse and arc rings come from the [`GeometryCache`], so repeated shapes
//! of the same size only pay for the fan construction.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use easel_core::{ArcMode, Point, Rect, ShapeMode, Style, Triangle};
use smallvec::SmallVec;

use crate::cache::{CacheStats, GeometryCache};
use crate::triangulate::PolygonTriangulator;

/// Smallest knot interval of the Catmull-Rom parameterization
const KNOT_EPSILON: f32 = 1e-4;

// ─────────────────────────────────────────────────────────────────────────────
// Output types
// ─────────────────────────────────────────────────────────────────────────────

/// A polyline to be stroked
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outline {
    pub points: Vec<Point>,
    /// Connect the last point back to the first
    pub closed: bool,
}

impl Outline {
    pub fn open(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    pub fn closed(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: true,
        }
    }
}

/// Geometry produced by one shape call
#[derive(Clone, Debug, Default)]
pub struct Tessellation {
    pub fill: Vec<Triangle>,
    pub outlines: SmallVec<[Outline; 1]>,
}

impl Tessellation {
    pub fn is_empty(&self) -> bool {
        self.fill.is_empty() && self.outlines.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.fill.len()
    }

    pub fn stroke_point_count(&self) -> usize {
        self.outlines.iter().map(|o| o.points.len()).sum()
    }
}

/// Corner radii for rounded rectangles
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CornerRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadius {
    pub const fn new(top_left: f32, top_right: f32, bottom_right: f32, bottom_left: f32) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    pub const fn uniform(radius: f32) -> Self {
        Self::new(radius, radius, radius, radius)
    }

    /// Radii listed clockwise from the top-left; a missing radius repeats
    /// the one before it, and an empty slice means square corners
    pub fn from_slice(radii: &[f32]) -> Self {
        let tl = radii.first().copied().unwrap_or(0.0);
        let tr = radii.get(1).copied().unwrap_or(tl);
        let br = radii.get(2).copied().unwrap_or(tr);
        let bl = radii.get(3).copied().unwrap_or(br);
        Self::new(tl, tr, br, bl)
    }

    /// Every radius limited to `[0, max]`
    pub fn clamped(&self, max: f32) -> Self {
        let max = max.max(0.0);
        let clamp = |r: f32| r.clamp(0.0, max);
        Self::new(
            clamp(self.top_left),
            clamp(self.top_right),
            clamp(self.bottom_right),
            clamp(self.bottom_left),
        )
    }

    pub fn is_zero(&self) -> bool {
        self.top_left == 0.0
            && self.top_right == 0.0
            && self.bottom_right == 0.0
            && self.bottom_left == 0.0
    }
}

impl From<f32> for CornerRadius {
    fn from(radius: f32) -> Self {
        Self::uniform(radius)
    }
}

impl From<[f32; 4]> for CornerRadius {
    fn from([tl, tr, br, bl]: [f32; 4]) -> Self {
        Self::new(tl, tr, br, bl)
    }
}

impl From<&[f32]> for CornerRadius {
    fn from(radii: &[f32]) -> Self {
        Self::from_slice(radii)
    }
}

/// Bounds of a shape given four numbers and a shape mode
pub fn resolve_bounds(mode: ShapeMode, a: f32, b: f32, c: f32, d: f32) -> Rect {
    let (p1, p2) = match mode {
        ShapeMode::Corner => (Point::new(a, b), Point::new(a + c, b + d)),
        ShapeMode::Corners => (Point::new(a, b), Point::new(c, d)),
        ShapeMode::Center => (
            Point::new(a - c / 2.0, b - d / 2.0),
            Point::new(a + c / 2.0, b + d / 2.0),
        ),
        ShapeMode::Radius => (Point::new(a - c, b - d), Point::new(a + c, b + d)),
    };
    Rect::from_points(p1, p2)
}

// ─────────────────────────────────────────────────────────────────────────────
// PrimitiveBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Tessellation engine for every shape entry point
#[derive(Debug)]
pub struct PrimitiveBuilder {
    cache: GeometryCache,
    triangulator: PolygonTriangulator,
    catmull_rom_alpha: f32,
}

impl Default for PrimitiveBuilder {
    fn default() -> Self {
        Self::new(30, 0.5)
    }
}

impl PrimitiveBuilder {
    pub fn new(sides: u32, catmull_rom_alpha: f32) -> Self {
        Self {
            cache: GeometryCache::new(sides),
            triangulator: PolygonTriangulator::new(),
            catmull_rom_alpha,
        }
    }

    pub fn sides(&self) -> u32 {
        self.cache.sides()
    }

    /// Change the segment count (clears the geometry cache)
    pub fn set_sides(&mut self, sides: u32) {
        self.cache.set_sides(sides);
    }

    pub fn cache(&mut self) -> &mut GeometryCache {
        &mut self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Ellipse whose four numbers are read through the ellipse mode
    pub fn ellipse(&mut self, style: &Style, a: f32, b: f32, c: f32, d: f32) -> Tessellation {
        let mut out = Tessellation::default();
        let bounds = resolve_bounds(style.ellipse_mode, a, b, c, d);
        let fill = style.has_fill() && !bounds.is_empty();
        let stroke = style.has_stroke();
        if !fill && !stroke {
            return out;
        }

        let center = bounds.center();
        let ring = self.cache.ellipse(bounds.width / 2.0, bounds.height / 2.0);
        let n = ring.len();

        if fill {
            out.fill.reserve(n);
            for i in 0..n {
                out.fill.push(Triangle::new(
                    center,
                    center + ring[i],
                    center + ring[(i + 1) % n],
                ));
            }
        }

        if stroke {
            out.outlines
                .push(Outline::closed(ring.iter().map(|p| *p + center).collect()));
        }

        out
    }

    /// Elliptical arc from `start` to `stop` (radians, clockwise on screen)
    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        &mut self,
        style: &Style,
        a: f32,
        b: f32,
        c: f32,
        d: f32,
        start: f32,
        stop: f32,
        mode: ArcMode,
    ) -> Tessellation {
        let mut out = Tessellation::default();
        let bounds = resolve_bounds(style.ellipse_mode, a, b, c, d);
        let fill = style.has_fill() && !bounds.is_empty() && start != stop;
        let stroke = style.has_stroke();
        if !fill && !stroke {
            return out;
        }

        let center = bounds.center();
        let cached = self
            .cache
            .arc(bounds.width / 2.0, bounds.height / 2.0, start, stop);
        let mut points: Vec<Point> = cached.iter().map(|p| *p + center).collect();

        if fill {
            // PIE fans around the center, OPEN and CHORD around the chord
            let pivot = match mode {
                ArcMode::Pie => center,
                ArcMode::Open | ArcMode::Chord => {
                    points[0].midpoint(points[points.len() - 1])
                }
            };
            out.fill.reserve(points.len() - 1);
            for w in points.windows(2) {
                out.fill.push(Triangle::new(pivot, w[0], w[1]));
            }
        }

        if stroke {
            let outline = match mode {
                ArcMode::Open => Outline::open(points),
                ArcMode::Chord => Outline::closed(points),
                ArcMode::Pie => {
                    points.push(center);
                    Outline::closed(points)
                }
            };
            out.outlines.push(outline);
        }

        out
    }

    /// Rectangle whose four numbers are read through the rect mode
    pub fn rect(&mut self, style: &Style, a: f32, b: f32, c: f32, d: f32) -> Tessellation {
        let bounds = resolve_bounds(style.rect_mode, a, b, c, d);
        self.rect_bounds(style, bounds)
    }

    fn rect_bounds(&mut self, style: &Style, bounds: Rect) -> Tessellation {
        let mut out = Tessellation::default();
        let corners = bounds.corners();
        if style.has_fill() && !bounds.is_empty() {
            push_quad(&mut out.fill, corners);
        }
        if style.has_stroke() {
            out.outlines.push(Outline::closed(corners.to_vec()));
        }
        out
    }

    /// Rectangle with per-corner radii
    ///
    /// Radii are limited to half the shorter side. The fill is five interior
    /// quads plus one fan per rounded corner.
    pub fn rounded_rect(
        &mut self,
        style: &Style,
        a: f32,
        b: f32,
        c: f32,
        d: f32,
        radii: CornerRadius,
    ) -> Tessellation {
        let bounds = resolve_bounds(style.rect_mode, a, b, c, d);
        let radii = radii.clamped(bounds.width.min(bounds.height) / 2.0);
        if radii.is_zero() {
            return self.rect_bounds(style, bounds);
        }

        let mut out = Tessellation::default();
        let fill = style.has_fill() && !bounds.is_empty();
        let stroke = style.has_stroke();
        if !fill && !stroke {
            return out;
        }

        let Rect {
            x,
            y,
            width: w,
            height: h,
        } = bounds;
        let CornerRadius {
            top_left: tl,
            top_right: tr,
            bottom_right: br,
            bottom_left: bl,
        } = radii;

        // Corner centers, clockwise from the top-left with their arc ranges
        let corners = [
            (Point::new(x + tl, y + tl), tl, PI, PI + FRAC_PI_2),
            (Point::new(x + w - tr, y + tr), tr, PI + FRAC_PI_2, TAU),
            (Point::new(x + w - br, y + h - br), br, 0.0, FRAC_PI_2),
            (Point::new(x + bl, y + h - bl), bl, FRAC_PI_2, PI),
        ];

        if fill {
            let p = Point::new;
            // top, left, bottom, right bands and the center
            let quads = [
                [p(x + tl, y), p(x + w - tr, y), p(x + w - tr, y + tr), p(x + tl, y + tl)],
                [p(x, y + tl), p(x + tl, y + tl), p(x + bl, y + h - bl), p(x, y + h - bl)],
                [
                    p(x + bl, y + h - bl),
                    p(x + w - br, y + h - br),
                    p(x + w - br, y + h),
                    p(x + bl, y + h),
                ],
                [
                    p(x + w - tr, y + tr),
                    p(x + w, y + tr),
                    p(x + w, y + h - br),
                    p(x + w - br, y + h - br),
                ],
                [
                    p(x + tl, y + tl),
                    p(x + w - tr, y + tr),
                    p(x + w - br, y + h - br),
                    p(x + bl, y + h - bl),
                ],
            ];
            for quad in quads {
                push_quad(&mut out.fill, quad);
            }

            for &(center, r, start, stop) in &corners {
                if r > 0.0 {
                    let arc = self.cache.arc(r, r, start, stop);
                    for w in arc.windows(2) {
                        out.fill
                            .push(Triangle::new(center, center + w[0], center + w[1]));
                    }
                }
            }
        }

        if stroke {
            let mut points = Vec::with_capacity(4 * (self.sides() as usize + 1));
            for &(center, r, start, stop) in &corners {
                if r > 0.0 {
                    let arc = self.cache.arc(r, r, start, stop);
                    points.extend(arc.iter().map(|p| *p + center));
                } else {
                    points.push(center);
                }
            }
            out.outlines.push(Outline::closed(points));
        }

        out
    }

    pub fn quad(&mut self, style: &Style, points: [Point; 4]) -> Tessellation {
        let mut out = Tessellation::default();
        if style.has_fill() {
            push_quad(&mut out.fill, points);
        }
        if style.has_stroke() {
            out.outlines.push(Outline::closed(points.to_vec()));
        }
        out
    }

    pub fn triangle(&mut self, style: &Style, points: [Point; 3]) -> Tessellation {
        let mut out = Tessellation::default();
        let [a, b, c] = points;
        let triangle = Triangle::new(a, b, c);
        if style.has_fill() && triangle.area() > 0.0 {
            out.fill.push(triangle);
        }
        if style.has_stroke() {
            out.outlines.push(Outline::closed(points.to_vec()));
        }
        out
    }

    /// Lines are stroke only; a zero-length line draws nothing
    pub fn line(&mut self, style: &Style, from: Point, to: Point) -> Tessellation {
        let mut out = Tessellation::default();
        if style.has_stroke() && from != to {
            out.outlines.push(Outline::open(vec![from, to]));
        }
        out
    }

    /// A single stroke point; its shape follows the stroke cap
    pub fn point(&mut self, style: &Style, at: Point) -> Tessellation {
        let mut out = Tessellation::default();
        if style.has_stroke() {
            out.outlines.push(Outline::open(vec![at]));
        }
        out
    }

    /// Cubic Bezier through anchors `p[0]`, `p[3]` with controls `p[1]`, `p[2]`
    pub fn bezier(&mut self, style: &Style, p: [Point; 4]) -> Tessellation {
        let mut out = Tessellation::default();
        if !style.has_stroke() {
            return out;
        }

        let sides = self.sides();
        let points = (0..=sides)
            .map(|i| {
                let t = i as f32 / sides as f32;
                let u = 1.0 - t;
                p[0] * (u * u * u)
                    + p[1] * (3.0 * u * u * t)
                    + p[2] * (3.0 * u * t * t)
                    + p[3] * (t * t * t)
            })
            .collect();
        out.outlines.push(Outline::open(points));
        out
    }

    /// Catmull-Rom segment from `p[1]` to `p[2]`, with `p[0]` and `p[3]` as
    /// the outer control points
    pub fn curve(&mut self, style: &Style, p: [Point; 4]) -> Tessellation {
        let mut out = Tessellation::default();
        if !style.has_stroke() {
            return out;
        }

        let alpha = self.catmull_rom_alpha;
        let knot = |ti: f32, a: Point, b: Point| {
            let d2 = (b.x - a.x) * (b.x - a.x) + (b.y - a.y) * (b.y - a.y);
            ti + d2.powf(alpha / 2.0).max(KNOT_EPSILON)
        };
        let t0 = 0.0;
        let t1 = knot(t0, p[0], p[1]);
        let t2 = knot(t1, p[1], p[2]);
        let t3 = knot(t2, p[2], p[3]);

        // Weighted mix of `a` at knot `ta` and `b` at knot `tb`
        let mix = |a: Point, b: Point, ta: f32, tb: f32, t: f32| {
            a * ((tb - t) / (tb - ta)) + b * ((t - ta) / (tb - ta))
        };

        let sides = self.sides();
        let points = (0..=sides)
            .map(|i| {
                if i == 0 {
                    return p[1];
                }
                if i == sides {
                    return p[2];
                }
                let t = t1 + (t2 - t1) * (i as f32 / sides as f32);
                let a1 = mix(p[0], p[1], t0, t1, t);
                let a2 = mix(p[1], p[2], t1, t2, t);
                let a3 = mix(p[2], p[3], t2, t3, t);
                let b1 = mix(a1, a2, t0, t2, t);
                let b2 = mix(a2, a3, t1, t3, t);
                mix(b1, b2, t1, t2, t)
            })
            .collect();
        out.outlines.push(Outline::open(points));
        out
    }

    /// Outer contour plus holes; every contour is stroked closed
    pub fn polygon(&mut self, style: &Style, contours: &[Vec<Point>]) -> Tessellation {
        let mut out = Tessellation::default();
        let Some((outer, holes)) = contours.split_first() else {
            return out;
        };
        if outer.len() < 3 {
            return out;
        }

        if style.has_fill() {
            out.fill = self.triangulator.triangulate(outer, holes);
        }
        if style.has_stroke() {
            for contour in contours.iter().filter(|c| !c.is_empty()) {
                out.outlines.push(Outline::closed(contour.clone()));
            }
        }
        out
    }
}

/// Split a quad into two triangles, skipping collapsed quads
fn push_quad(fill: &mut Vec<Triangle>, [a, b, c, d]: [Point; 4]) {
    let first = Triangle::new(a, b, c);
    let second = Triangle::new(a, c, d);
    if first.area() + second.area() > 0.0 {
        fill.push(first);
        fill.push(second);
    }
}

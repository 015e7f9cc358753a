//! Tessellation cache for ellipse and arc point rings
//!
//! Rings are stored untransformed and centered on the origin. Entries are
//! shared as `Arc<[Point]>` and never mutated, so a hit hands back the very
//! same allocation. The cache is unbounded; changing the segment count
//! drops every entry.

use std::f32::consts::TAU;
use std::sync::Arc;

use easel_core::Point;
use rustc_hash::FxHashMap;

/// Lowest usable segment count
pub const MIN_SIDES: u32 = 3;

/// Hit/miss counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

type EllipseKey = (u32, u32);
type ArcKey = (u32, u32, u32, u32);

/// Memoized point rings keyed by radii (and angle range for arcs)
#[derive(Debug)]
pub struct GeometryCache {
    sides: u32,
    ellipses: FxHashMap<EllipseKey, Arc<[Point]>>,
    arcs: FxHashMap<ArcKey, Arc<[Point]>>,
    hits: u64,
    misses: u64,
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new(30)
    }
}

impl GeometryCache {
    pub fn new(sides: u32) -> Self {
        Self {
            sides: sides.max(MIN_SIDES),
            ellipses: FxHashMap::default(),
            arcs: FxHashMap::default(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn sides(&self) -> u32 {
        self.sides
    }

    /// Change the segment count, invalidating every entry
    ///
    /// Values below [`MIN_SIDES`] are raised to it.
    pub fn set_sides(&mut self, sides: u32) {
        let sides = sides.max(MIN_SIDES);
        if sides == self.sides {
            return;
        }
        tracing::debug!(
            from = self.sides,
            to = sides,
            dropped = self.len(),
            "geometry cache invalidated"
        );
        self.sides = sides;
        self.clear();
    }

    /// `sides` points around an origin-centered ellipse, starting at angle 0
    pub fn ellipse(&mut self, rx: f32, ry: f32) -> Arc<[Point]> {
        let key = (rx.to_bits(), ry.to_bits());
        if let Some(ring) = self.ellipses.get(&key) {
            self.hits += 1;
            return Arc::clone(ring);
        }

        self.misses += 1;
        let sides = self.sides;
        let step = TAU / sides as f32;
        let ring: Arc<[Point]> = (0..sides)
            .map(|i| {
                let angle = step * i as f32;
                Point::new(rx * angle.cos(), ry * angle.sin())
            })
            .collect();
        self.ellipses.insert(key, Arc::clone(&ring));
        ring
    }

    /// `sides + 1` points from `start` to `stop` on an origin-centered ellipse
    ///
    /// The last point sits exactly at `stop`.
    pub fn arc(&mut self, rx: f32, ry: f32, start: f32, stop: f32) -> Arc<[Point]> {
        let key = (rx.to_bits(), ry.to_bits(), start.to_bits(), stop.to_bits());
        if let Some(points) = self.arcs.get(&key) {
            self.hits += 1;
            return Arc::clone(points);
        }

        self.misses += 1;
        let sides = self.sides;
        let step = (stop - start) / sides as f32;
        let points: Arc<[Point]> = (0..=sides)
            .map(|i| {
                let angle = if i == sides {
                    stop
                } else {
                    start + step * i as f32
                };
                Point::new(rx * angle.cos(), ry * angle.sin())
            })
            .collect();
        self.arcs.insert(key, Arc::clone(&points));
        points
    }

    pub fn len(&self) -> usize {
        self.ellipses.len() + self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.ellipses.clear();
        self.arcs.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.len(),
        }
    }
}

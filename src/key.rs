//! Spatial keys and segment decomposition
//!
//! The spatial index compares keys one dimension at a time, and a range query
//! only yields a value when *every* dimension of its key falls inside the
//! query bounds. A long segment therefore has to be chopped into sub-keys of
//! bounded extent ([`DELTA`]) before insertion, or a query window smaller than
//! the segment would never contain all five dimensions at once.

use crate::geometry::{Point, RoadClass, Segment};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance for every floating-point comparison in key handling: dimension
/// comparison, mean matching during tree construction, and decomposition.
pub const EPSILON: f64 = 1e-9;

/// Maximum extent of a decomposed sub-key along its dominant axis, in map
/// distance units.
pub const DELTA: f64 = 200.0;

/// A key comparable dimension by dimension, for use in the K-D tree.
pub trait KdComparable {
    /// Number of dimensions. Must be at least 1.
    const DIMENSIONS: usize;

    /// The value of this key in `dimension`.
    ///
    /// # Panics
    /// Panics if `dimension >= Self::DIMENSIONS`.
    fn dimension_value(&self, dimension: usize) -> f64;

    /// Compare this key against `other` in a single dimension.
    fn compare_in_dimension(&self, other: &Self, dimension: usize) -> Ordering;
}

/// The 5-dimensional bounding key of a (sub-)segment.
///
/// Dimensions 0..4 are start x/y and end x/y; dimension 4 is the road
/// class's zoom threshold, so range queries can filter by visibility class.
/// One key maps to exactly one segment in the spatial index, but a segment
/// longer than [`DELTA`] is represented by several keys.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpatialKey {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub road_class: RoadClass,
}

impl SpatialKey {
    pub fn new(start: Point, end: Point, road_class: RoadClass) -> Self {
        Self {
            start_x: start.x(),
            start_y: start.y(),
            end_x: end.x(),
            end_y: end.y(),
            road_class,
        }
    }

    fn compare_value(a: f64, b: f64) -> Ordering {
        if (a - b).abs() < EPSILON {
            Ordering::Equal
        } else if a < b {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

impl KdComparable for SpatialKey {
    const DIMENSIONS: usize = 5;

    fn dimension_value(&self, dimension: usize) -> f64 {
        match dimension {
            0 => self.start_x,
            1 => self.start_y,
            2 => self.end_x,
            3 => self.end_y,
            4 => f64::from(self.road_class.zoom_threshold()),
            _ => panic!("invalid dimension: {dimension}"),
        }
    }

    fn compare_in_dimension(&self, other: &Self, dimension: usize) -> Ordering {
        Self::compare_value(
            self.dimension_value(dimension),
            other.dimension_value(dimension),
        )
    }
}

impl PartialEq for SpatialKey {
    fn eq(&self, other: &Self) -> bool {
        self.start_x.to_bits() == other.start_x.to_bits()
            && self.start_y.to_bits() == other.start_y.to_bits()
            && self.end_x.to_bits() == other.end_x.to_bits()
            && self.end_y.to_bits() == other.end_y.to_bits()
            && self.road_class == other.road_class
    }
}

impl Eq for SpatialKey {}

impl Hash for SpatialKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start_x.to_bits().hash(state);
        self.start_y.to_bits().hash(state);
        self.end_x.to_bits().hash(state);
        self.end_y.to_bits().hash(state);
        self.road_class.hash(state);
    }
}

/// Split a segment into sub-keys of at most [`DELTA`] extent along the
/// dominant axis.
///
/// Steps along the segment's line equation, recomputing each step's
/// coordinates from the equation itself so accumulation error stays within
/// [`EPSILON`]. The dominant axis is the one with the larger absolute delta,
/// ties preferring x. A vertical segment (`dx == 0`) iterates along y with
/// x held fixed. The final partial remainder becomes one more key unless it
/// has zero extent; a degenerate point segment still yields its single
/// endpoint key, so every segment is reachable through the spatial index.
pub fn decompose(segment: &Segment) -> SmallVec<[SpatialKey; 4]> {
    let start = segment.start();
    let end = segment.end();
    let class = segment.road_class();

    let dx = end.x() - start.x();
    let dy = end.y() - start.y();

    // Tie on absolute deltas prefers the x axis.
    let x_dominant = (dx.abs() - dy.abs()).abs() < EPSILON || dx.abs() > dy.abs();
    let dominant = if x_dominant { dx } else { dy };

    let steps = (dominant.abs() / DELTA) as usize;

    let mut keys = SmallVec::new();
    if steps == 0 {
        keys.push(SpatialKey::new(start, end, class));
        return keys;
    }

    let direction = dominant.signum();
    let slope = if dx == 0.0 { 0.0 } else { dy / dx };
    let intercept = start.y() - slope * start.x();

    let mut cur_x = start.x();
    let mut cur_y = start.y();
    for step in 1..=steps {
        let (next_x, next_y) = if x_dominant {
            let x = start.x() + DELTA * direction * step as f64;
            let y = if dy == 0.0 { start.y() } else { slope * x + intercept };
            (x, y)
        } else {
            let y = start.y() + DELTA * direction * step as f64;
            let x = if dx == 0.0 {
                start.x()
            } else {
                (y - intercept) / slope
            };
            (x, y)
        };
        keys.push(SpatialKey::new(
            Point::new(cur_x, cur_y),
            Point::new(next_x, next_y),
            class,
        ));
        cur_x = next_x;
        cur_y = next_y;
    }

    // Remainder shorter than DELTA, skipped only when zero-length.
    if (cur_x - end.x()).abs() >= EPSILON || (cur_y - end.y()).abs() >= EPSILON {
        keys.push(SpatialKey::new(Point::new(cur_x, cur_y), end, class));
    }

    keys
}

//! Geometric value types: points, road classes and directed road segments
//!
//! Everything in this module is an immutable value type. A [`Segment`] caches
//! its Euclidean length at construction, and "inverting" a segment produces a
//! new value rather than mutating the original.

use geo::{Distance, Euclidean};
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A node of the road network in map coordinates.
///
/// The `id` indexes the vertex in the routing graph's adjacency array. The
/// loader may normalize ids once while assembling the dataset, via
/// [`Point::set_id`]; after a point has entered an index it is never touched
/// again (points are `Copy`, so every index holds its own frozen copy).
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    x: f64,
    y: f64,
    id: usize,
}

impl Point {
    /// Create a point with an explicit vertex id.
    pub fn with_id(id: usize, x: f64, y: f64) -> Self {
        Self { x, y, id }
    }

    /// Create a point with the default id (0), for points that never become
    /// graph vertices (query bounds, decomposed sub-key endpoints).
    pub fn new(x: f64, y: f64) -> Self {
        Self::with_id(0, x, y)
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Reassign this point's id. Only the loader calls this, before the
    /// point enters any index.
    pub fn set_id(&mut self, id: usize) {
        self.id = id;
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits()
            && self.y.to_bits() == other.y.to_bits()
            && self.id == other.id
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
        self.id.hash(state);
    }
}

/// Points order lexicographically by `x` only. This is a display ordering
/// (stable canonical listing), not an index ordering.
impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.x.partial_cmp(&other.x)
    }
}

/// Classification of a road, carrying the zoom level at which the road
/// becomes visible and the zoom level at which its name label appears.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RoadClass {
    Motorway,
    Expressway,
    Primary,
    Secondary,
    Road,
    MinorRoad,
    Pedestrian,
    Path,
    Ferry,
    Place,
}

impl RoadClass {
    /// Every variant, in declaration order.
    pub const ALL: [RoadClass; 10] = [
        RoadClass::Motorway,
        RoadClass::Expressway,
        RoadClass::Primary,
        RoadClass::Secondary,
        RoadClass::Road,
        RoadClass::MinorRoad,
        RoadClass::Pedestrian,
        RoadClass::Path,
        RoadClass::Ferry,
        RoadClass::Place,
    ];

    /// Minimum zoom level at which roads of this class are visible.
    pub fn zoom_threshold(&self) -> u32 {
        match self {
            RoadClass::Motorway | RoadClass::Expressway | RoadClass::Primary => 0,
            RoadClass::Ferry => 4,
            RoadClass::Secondary => 5,
            RoadClass::Place => 20,
            RoadClass::Road => 22,
            RoadClass::MinorRoad | RoadClass::Pedestrian => 28,
            RoadClass::Path => 35,
        }
    }

    /// Minimum zoom level at which this class's name labels are drawn.
    pub fn name_threshold(&self) -> u32 {
        match self {
            RoadClass::Motorway | RoadClass::Expressway | RoadClass::Ferry => 1,
            RoadClass::Primary => 3,
            RoadClass::Secondary => 12,
            RoadClass::Place => 20,
            RoadClass::Road | RoadClass::MinorRoad | RoadClass::Pedestrian => 21,
            RoadClass::Path => 23,
        }
    }

    /// The largest zoom threshold over all variants.
    pub fn max_zoom() -> u32 {
        Self::ALL
            .iter()
            .map(RoadClass::zoom_threshold)
            .max()
            .unwrap_or(0)
    }

    /// The class with the largest zoom threshold not exceeding `zoom`.
    ///
    /// Used to turn a viewport zoom level into the upper bound of a range
    /// query's fifth dimension. `zoom` is clamped to `[0, max_zoom()]`.
    pub fn from_zoom(zoom: u32) -> RoadClass {
        let zoom = zoom.min(Self::max_zoom());
        let mut best = RoadClass::Motorway;
        for class in Self::ALL {
            if class.zoom_threshold() <= zoom && class.zoom_threshold() > best.zoom_threshold() {
                best = class;
            }
        }
        best
    }
}

/// Legal traversal directions of a segment.
///
/// `Forward` allows start→end only, `Backward` end→start only, `None` both.
/// `NoDriving` segments are displayable but contribute no routable edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OneWay {
    None,
    Forward,
    Backward,
    NoDriving,
}

impl OneWay {
    /// The traversal rule of the reversed segment.
    fn inverted(self) -> OneWay {
        match self {
            OneWay::Forward => OneWay::Backward,
            OneWay::Backward => OneWay::Forward,
            other => other,
        }
    }
}

/// A directed road segment between two points.
///
/// Immutable; the Euclidean `length` is derived once at construction.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    start: Point,
    end: Point,
    name: String,
    road_class: RoadClass,
    one_way: OneWay,
    postal_left: String,
    postal_right: String,
    length: f64,
}

impl Segment {
    pub fn new(
        start: Point,
        end: Point,
        name: impl Into<String>,
        road_class: RoadClass,
        one_way: OneWay,
        postal_left: impl Into<String>,
        postal_right: impl Into<String>,
    ) -> Self {
        let length = Euclidean.distance(
            geo::Point::new(start.x(), start.y()),
            geo::Point::new(end.x(), end.y()),
        );
        Self {
            start,
            end,
            name: name.into(),
            road_class,
            one_way,
            postal_left: postal_left.into(),
            postal_right: postal_right.into(),
            length,
        }
    }

    /// Convenience constructor for bidirectional segments without postal data.
    pub fn bidirectional(
        start: Point,
        end: Point,
        name: impl Into<String>,
        road_class: RoadClass,
    ) -> Self {
        Self::new(start, end, name, road_class, OneWay::None, "", "")
    }

    /// A new segment with endpoints swapped and Forward/Backward flipped.
    pub fn inverted(&self) -> Segment {
        Segment::new(
            self.end,
            self.start,
            self.name.clone(),
            self.road_class,
            self.one_way.inverted(),
            self.postal_left.clone(),
            self.postal_right.clone(),
        )
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Point {
        self.end
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn road_class(&self) -> RoadClass {
        self.road_class
    }

    #[inline]
    pub fn one_way(&self) -> OneWay {
        self.one_way
    }

    #[inline]
    pub fn postal_left(&self) -> &str {
        &self.postal_left
    }

    #[inline]
    pub fn postal_right(&self) -> &str {
        &self.postal_right
    }

    /// Euclidean distance between the endpoints.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
            && self.end == other.end
            && self.name == other.name
            && self.road_class == other.road_class
            && self.one_way == other.one_way
            && self.postal_left == other.postal_left
            && self.postal_right == other.postal_right
    }
}

impl Eq for Segment {}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        self.end.hash(state);
        self.name.hash(state);
        self.road_class.hash(state);
        self.one_way.hash(state);
    }
}

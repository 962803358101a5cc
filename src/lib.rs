//! Road network indexing and routing
//!
//! This library answers three kinds of queries over a large static set of
//! directed road segments:
//!
//! - **Range queries** — which segments intersect a rectangular window at a
//!   given zoom level, via a 5-dimensional balanced K-D tree over decomposed
//!   segment keys ([`kdtree`], [`key`]).
//! - **Name queries** — exact, prefix and single-char-wildcard lookup of
//!   road names, via a ternary search trie ([`trie`]).
//! - **Routing** — shortest drivable route between two segments, honoring
//!   one-way restrictions, via Dijkstra over a directed graph ([`graph`],
//!   [`router`]).
//!
//! All three indices hang off one [`RoadAtlas`], which is built once from
//! the segment set and then queried immutably through `&self`; build
//! progress is observable through [`ProgressHandle`]s.
//!
//! ```
//! use geo::{Coord, Rect};
//! use roadnet::{Point, RoadAtlas, RoadClass, Segment};
//!
//! let segments = vec![Segment::bidirectional(
//!     Point::with_id(0, 0.0, 0.0),
//!     Point::with_id(1, 10.0, 0.0),
//!     "A St",
//!     RoadClass::Primary,
//! )];
//! let mut atlas = RoadAtlas::new();
//! atlas.build(segments, 2)?;
//!
//! let window = Rect::new(Coord { x: -5.0, y: -5.0 }, Coord { x: 15.0, y: 5.0 });
//! assert_eq!(atlas.range_query(window, 0).len(), 1);
//! assert_eq!(atlas.prefix_match("a"), vec!["A St".to_string()]);
//! # Ok::<(), roadnet::AtlasError>(())
//! ```

pub mod atlas;
pub mod geometry;
pub mod graph;
pub mod kdtree;
pub mod key;
mod pq;
pub mod progress;
pub mod route;
pub mod router;
pub mod sort;
pub mod trie;

pub use atlas::RoadAtlas;
pub use geometry::{OneWay, Point, RoadClass, Segment};
pub use graph::RoadGraph;
pub use kdtree::KdTree;
pub use key::{DELTA, EPSILON, KdComparable, SpatialKey, decompose};
pub use progress::ProgressHandle;
pub use route::{Route, RouteLabel};
pub use router::{ShortestPaths, shortest_route};
pub use trie::TernaryTrie;

use thiserror::Error;

/// Errors surfaced by atlas construction and queries.
///
/// "No path found" is deliberately not here: an unreachable routing target
/// is normal data, reported as an empty [`Route`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AtlasError {
    /// A text-index operation was given an empty key.
    #[error("empty key")]
    EmptyKey,

    /// A segment endpoint's id does not fit the declared vertex count.
    #[error("vertex id {id} out of range for a graph of {vertices} vertices")]
    VertexOutOfRange { id: usize, vertices: usize },

    /// A routing query arrived before the atlas was built.
    #[error("no route configured: build the atlas before routing")]
    GraphNotBuilt,
}

pub type Result<T> = std::result::Result<T, AtlasError>;

//! The atlas: one context object owning all three indices
//!
//! [`RoadAtlas`] is the crate's main entry point. `build` ingests the full
//! segment set once and constructs the spatial index, the name index and the
//! routing graph in that order; afterwards the atlas is an immutable
//! snapshot and every query takes `&self`. Long builds are observable
//! through per-index [`ProgressHandle`]s.

use crate::geometry::{RoadClass, Segment};
use crate::graph::RoadGraph;
use crate::kdtree::KdTree;
use crate::key::{self, SpatialKey};
use crate::progress::ProgressHandle;
use crate::route::Route;
use crate::router;
use crate::trie::TernaryTrie;
use crate::{AtlasError, Result};
use geo::{Coord, Rect};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Padding added around a range-query window, in map units.
///
/// Decomposed sub-keys extend up to [`key::DELTA`] from the window edge, so
/// the query bounds grow by slightly more than that to catch keys whose
/// bounding coordinates straddle the edge.
const RANGE_PAD: f64 = 210.0;

/// All indices over one road dataset.
#[derive(Default)]
pub struct RoadAtlas {
    spatial: KdTree<SpatialKey, Arc<Segment>>,
    text: TernaryTrie<HashSet<Arc<Segment>>>,
    graph: Option<RoadGraph>,
    graph_progress: ProgressHandle,
    segments: Vec<Arc<Segment>>,
    bounds: Option<Rect<f64>>,
}

impl RoadAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every index from the segment set.
    ///
    /// `total_point_count` is the number of distinct point ids in the
    /// dataset; the routing graph allocates one adjacency list per id and
    /// rejects segments referencing ids beyond it. Indices are built
    /// spatial, then text, then graph; each reports through its own
    /// progress handle.
    pub fn build(&mut self, segments: Vec<Segment>, total_point_count: usize) -> Result<()> {
        let segments: Vec<Arc<Segment>> = segments.into_iter().map(Arc::new).collect();

        let spatial_map: HashMap<SpatialKey, Arc<Segment>> = segments
            .par_iter()
            .flat_map_iter(|segment| {
                key::decompose(segment)
                    .into_iter()
                    .map(move |k| (k, segment.clone()))
            })
            .collect();
        debug!(
            segments = segments.len(),
            keys = spatial_map.len(),
            "decomposed segments into spatial keys"
        );
        self.spatial.build(spatial_map);
        debug!(
            nodes = self.spatial.size(),
            max_depth = self.spatial.max_depth(),
            "spatial index built"
        );

        let mut by_name: HashMap<String, HashSet<Arc<Segment>>> = HashMap::new();
        for segment in &segments {
            by_name
                .entry(segment.name().to_string())
                .or_default()
                .insert(segment.clone());
        }
        self.text.build(by_name);
        debug!(names = self.text.size(), "name index built");

        let graph = RoadGraph::build(&segments, total_point_count, &self.graph_progress)?;
        info!(
            segments = segments.len(),
            vertices = graph.vertices(),
            edges = graph.edge_count(),
            "road atlas built"
        );
        self.graph = Some(graph);

        self.bounds = dataset_bounds(&segments);
        self.segments = segments;
        Ok(())
    }

    /// Every segment intersecting `window`, restricted to road classes
    /// visible at `zoom`.
    ///
    /// The window is padded by [`RANGE_PAD`] so segments whose decomposed
    /// keys straddle the edge still match.
    pub fn range_query(&self, window: Rect<f64>, zoom: u32) -> HashSet<Arc<Segment>> {
        let min = window.min();
        let max = window.max();
        let low = SpatialKey {
            start_x: min.x - RANGE_PAD,
            start_y: min.y - RANGE_PAD,
            end_x: min.x - RANGE_PAD,
            end_y: min.y - RANGE_PAD,
            road_class: RoadClass::Motorway,
        };
        let high = SpatialKey {
            start_x: max.x + RANGE_PAD,
            start_y: max.y + RANGE_PAD,
            end_x: max.x + RANGE_PAD,
            end_y: max.y + RANGE_PAD,
            road_class: RoadClass::from_zoom(zoom),
        };
        self.spatial.get_range(&low, &high)
    }

    /// The full segment set, in load order.
    pub fn all_segments(&self) -> &[Arc<Segment>] {
        &self.segments
    }

    /// Road names starting with `prefix`, after normalizing each word of the
    /// prefix to the dataset's Name Casing convention.
    pub fn prefix_match(&self, prefix: &str) -> Vec<String> {
        self.text.prefix_match(&capitalize_words(prefix))
    }

    /// The segments of one exactly-named road.
    pub fn exact_lookup(&self, name: &str) -> Result<Option<&HashSet<Arc<Segment>>>> {
        self.text.get(name)
    }

    /// Road names matching `pattern`, where `.` matches any one character.
    pub fn wildcard_match(&self, pattern: &str) -> Vec<String> {
        self.text.wildcard_match(pattern)
    }

    /// Shortest drivable route between two segments of this atlas.
    ///
    /// Unreachable targets produce an empty route; querying before `build`
    /// is an error.
    pub fn shortest_path(&self, from: &Arc<Segment>, to: &Arc<Segment>) -> Result<Route> {
        let graph = self.graph.as_ref().ok_or(AtlasError::GraphNotBuilt)?;
        router::shortest_route(graph, from, to)
    }

    /// Bounding box of every segment endpoint, or `None` before `build` (or
    /// for an empty dataset).
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.bounds
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of routable vertices, 0 before `build`.
    pub fn vertex_count(&self) -> usize {
        self.graph.as_ref().map_or(0, RoadGraph::vertices)
    }

    pub fn spatial_progress(&self) -> ProgressHandle {
        self.spatial.progress()
    }

    pub fn text_progress(&self) -> ProgressHandle {
        self.text.progress()
    }

    pub fn graph_progress(&self) -> ProgressHandle {
        self.graph_progress.clone()
    }
}

fn dataset_bounds(segments: &[Arc<Segment>]) -> Option<Rect<f64>> {
    let mut points = segments.iter().flat_map(|s| [s.start(), s.end()]);
    let first = points.next()?;
    let (mut min_x, mut min_y) = (first.x(), first.y());
    let (mut max_x, mut max_y) = (first.x(), first.y());
    for p in points {
        min_x = min_x.min(p.x());
        min_y = min_y.min(p.y());
        max_x = max_x.max(p.x());
        max_y = max_y.max(p.y());
    }
    Some(Rect::new(
        Coord { x: min_x, y: min_y },
        Coord { x: max_x, y: max_y },
    ))
}

// "nørre alle" -> "Nørre Alle": uppercase each word's first character,
// lowercase the rest, preserving the whitespace between words.
fn capitalize_words(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;
    for c in input.chars() {
        if c.is_whitespace() {
            out.push(c);
            at_word_start = true;
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{OneWay, Point, RoadClass};

    fn seg(
        from: (usize, f64, f64),
        to: (usize, f64, f64),
        name: &str,
        class: RoadClass,
    ) -> Segment {
        Segment::bidirectional(
            Point::with_id(from.0, from.1, from.2),
            Point::with_id(to.0, to.1, to.2),
            name,
            class,
        )
    }

    // Small network: an L of primary roads plus a detached footpath.
    fn sample_atlas() -> RoadAtlas {
        let segments = vec![
            seg((0, 0.0, 0.0), (1, 10.0, 0.0), "A St", RoadClass::Primary),
            seg((1, 10.0, 0.0), (2, 10.0, 10.0), "B Ave", RoadClass::Primary),
            seg((3, 500.0, 500.0), (4, 510.0, 500.0), "Garden Path", RoadClass::Path),
        ];
        let mut atlas = RoadAtlas::new();
        atlas.build(segments, 5).unwrap();
        atlas
    }

    fn window(x1: f64, y1: f64, x2: f64, y2: f64) -> Rect<f64> {
        Rect::new(Coord { x: x1, y: y1 }, Coord { x: x2, y: y2 })
    }

    #[test]
    fn build_populates_every_index() {
        let atlas = sample_atlas();
        assert_eq!(atlas.segment_count(), 3);
        assert_eq!(atlas.vertex_count(), 5);
        assert_eq!(atlas.spatial_progress().fraction(), 1.0);
        assert_eq!(atlas.text_progress().fraction(), 1.0);
        assert_eq!(atlas.graph_progress().fraction(), 1.0);
    }

    #[test]
    fn range_query_filters_by_window_and_zoom() {
        let atlas = sample_atlas();

        // Wide window at maximum zoom sees everything.
        let all = atlas.range_query(window(-100.0, -100.0, 600.0, 600.0), RoadClass::max_zoom());
        assert_eq!(all.len(), 3);

        // Same window at zoom 0 drops the footpath.
        let visible = atlas.range_query(window(-100.0, -100.0, 600.0, 600.0), 0);
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|s| s.road_class() == RoadClass::Primary));

        // Narrow window far from the footpath sees only the L.
        let near = atlas.range_query(window(-1.0, -1.0, 11.0, 11.0), RoadClass::max_zoom());
        assert_eq!(near.len(), 2);
    }

    #[test]
    fn name_queries_cover_prefix_exact_and_wildcard() {
        let atlas = sample_atlas();

        assert_eq!(atlas.prefix_match("A"), vec!["A St".to_string()]);
        // Case is normalized word by word before matching.
        assert_eq!(atlas.prefix_match("a s"), vec!["A St".to_string()]);
        assert_eq!(atlas.prefix_match("").len(), 3);

        let exact = atlas.exact_lookup("B Ave").unwrap().unwrap();
        assert_eq!(exact.len(), 1);
        assert!(atlas.exact_lookup("Nowhere Rd").unwrap().is_none());

        assert_eq!(atlas.wildcard_match("A S."), vec!["A St".to_string()]);
    }

    #[test]
    fn shortest_path_routes_through_the_network() {
        let atlas = sample_atlas();
        let a = atlas.all_segments()[0].clone();
        let b = atlas.all_segments()[1].clone();

        let route = atlas.shortest_path(&a, &b).unwrap();
        let names: Vec<&str> = route.segments().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["A St", "B Ave"]);
        assert_eq!(route.total_length(), 20.0);

        // The footpath's island is unreachable: empty route, not an error.
        let path = atlas.all_segments()[2].clone();
        assert!(atlas.shortest_path(&a, &path).unwrap().is_empty());
    }

    #[test]
    fn querying_routes_before_build_is_an_error() {
        let atlas = RoadAtlas::new();
        let s = Arc::new(seg((0, 0.0, 0.0), (1, 1.0, 0.0), "A St", RoadClass::Road));
        assert!(matches!(
            atlas.shortest_path(&s, &s),
            Err(AtlasError::GraphNotBuilt)
        ));
    }

    #[test]
    fn no_driving_segments_are_displayed_but_never_traversed() {
        // The plaza is a direct shortcut from 1 to 3, but driving is not
        // allowed on it, so the route must take the long way through 2.
        let segments = vec![
            seg((0, 0.0, 0.0), (1, 10.0, 0.0), "A St", RoadClass::Primary),
            Segment::new(
                Point::with_id(1, 10.0, 0.0),
                Point::with_id(3, 10.0, 10.0),
                "Plaza",
                RoadClass::Pedestrian,
                OneWay::NoDriving,
                "",
                "",
            ),
            seg((1, 10.0, 0.0), (2, 40.0, 0.0), "B Ave", RoadClass::Primary),
            seg((2, 40.0, 0.0), (3, 10.0, 10.0), "C Rd", RoadClass::Primary),
        ];
        let mut atlas = RoadAtlas::new();
        atlas.build(segments, 4).unwrap();

        // Still visible in the spatial index.
        let visible = atlas.range_query(window(-1.0, -1.0, 41.0, 11.0), RoadClass::max_zoom());
        assert_eq!(visible.len(), 4);

        let a = atlas.all_segments()[0].clone();
        let c = atlas.all_segments()[3].clone();
        let route = atlas.shortest_path(&a, &c).unwrap();
        let names: Vec<&str> = route.segments().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["A St", "B Ave", "C Rd"]);
    }

    #[test]
    fn long_segments_are_found_through_sub_keys() {
        // One 1000-unit road; a small window over its middle must still find
        // it via a decomposed sub-key.
        let segments = vec![seg(
            (0, 0.0, 0.0),
            (1, 1000.0, 0.0),
            "Long Rd",
            RoadClass::Primary,
        )];
        let mut atlas = RoadAtlas::new();
        atlas.build(segments, 2).unwrap();

        let mid = atlas.range_query(window(450.0, -10.0, 550.0, 10.0), 0);
        assert_eq!(mid.len(), 1);
    }

    #[test]
    fn bounds_cover_every_endpoint() {
        let atlas = sample_atlas();
        let bounds = atlas.bounds().unwrap();
        assert_eq!(bounds.min(), Coord { x: 0.0, y: 0.0 });
        assert_eq!(bounds.max(), Coord { x: 510.0, y: 500.0 });

        assert!(RoadAtlas::new().bounds().is_none());
    }

    #[test]
    fn capitalize_words_normalizes_each_word() {
        assert_eq!(capitalize_words("nørre alle"), "Nørre Alle");
        assert_eq!(capitalize_words("AMAGERBROGADE"), "Amagerbrogade");
        assert_eq!(capitalize_words("  h c andersens blvd"), "  H C Andersens Blvd");
        assert_eq!(capitalize_words(""), "");
    }
}

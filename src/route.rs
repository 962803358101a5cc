//! Assembled routes and their turn-by-turn labels
//!
//! A [`Route`] is the ordered segment list a shortest-path query produces,
//! plus one label per segment for presentation. Consecutive segments of the
//! same road collapse into a single named step: the earlier one becomes
//! [`RouteLabel::Continues`], the last of the run keeps the name.

use crate::geometry::Segment;
use std::sync::Arc;

/// Presentation label of one route segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteLabel {
    /// The road's name, shown where a run of same-name segments ends.
    Road(String),
    /// Same road as the next segment; no new step.
    Continues,
}

/// An ordered drive from a source segment to a target segment.
///
/// An empty route means no path was found; that is a normal outcome, not an
/// error.
#[derive(Clone, Debug, Default)]
pub struct Route {
    segments: Vec<Arc<Segment>>,
    labels: Vec<RouteLabel>,
}

impl Route {
    /// The no-path route.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble a route from segments listed target-first, the order path
    /// reconstruction naturally produces.
    pub fn from_reversed(mut reversed: Vec<Arc<Segment>>) -> Self {
        reversed.reverse();
        let labels = reversed
            .iter()
            .enumerate()
            .map(|(i, segment)| match reversed.get(i + 1) {
                Some(next) if next.name() == segment.name() => RouteLabel::Continues,
                _ => RouteLabel::Road(segment.name().to_string()),
            })
            .collect();
        Self {
            segments: reversed,
            labels,
        }
    }

    pub fn segments(&self) -> &[Arc<Segment>] {
        &self.segments
    }

    /// One label per segment, parallel to [`segments`](Self::segments).
    pub fn labels(&self) -> &[RouteLabel] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Sum of the segment lengths.
    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, RoadClass};

    fn segment(x1: f64, x2: f64, name: &str) -> Arc<Segment> {
        Arc::new(Segment::bidirectional(
            Point::new(x1, 0.0),
            Point::new(x2, 0.0),
            name,
            RoadClass::Road,
        ))
    }

    #[test]
    fn from_reversed_restores_travel_order() {
        let route = Route::from_reversed(vec![
            segment(20.0, 30.0, "C"),
            segment(10.0, 20.0, "B"),
            segment(0.0, 10.0, "A"),
        ]);
        let names: Vec<&str> = route.segments().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(route.total_length(), 30.0);
        assert_eq!(
            route.labels(),
            [
                RouteLabel::Road("A".into()),
                RouteLabel::Road("B".into()),
                RouteLabel::Road("C".into()),
            ]
        );
    }

    #[test]
    fn same_name_runs_collapse_to_continues() {
        let route = Route::from_reversed(vec![
            segment(30.0, 40.0, "B Ave"),
            segment(20.0, 30.0, "A St"),
            segment(10.0, 20.0, "A St"),
            segment(0.0, 10.0, "A St"),
        ]);
        assert_eq!(
            route.labels(),
            [
                RouteLabel::Continues,
                RouteLabel::Continues,
                RouteLabel::Road("A St".into()),
                RouteLabel::Road("B Ave".into()),
            ]
        );
    }

    #[test]
    fn empty_route_has_no_labels_and_zero_length() {
        let route = Route::empty();
        assert!(route.is_empty());
        assert_eq!(route.len(), 0);
        assert!(route.labels().is_empty());
        assert_eq!(route.total_length(), 0.0);
    }
}

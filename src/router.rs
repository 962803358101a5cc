//! Dijkstra shortest paths and segment-to-segment routing
//!
//! Routing runs between two *segments*, not two vertices: the caller stands
//! somewhere on `from` and wants to reach somewhere on `to`. Each segment
//! has two candidate endpoints, so the solver runs Dijkstra from both
//! endpoints of `from` and compares the four endpoint pairings, taking the
//! first minimum in a fixed order so equal-cost routes resolve
//! deterministically.

use crate::geometry::Segment;
use crate::graph::RoadGraph;
use crate::pq::IndexMinPq;
use crate::route::Route;
use crate::{AtlasError, Result};
use std::sync::Arc;

/// Single-source shortest paths over a [`RoadGraph`], weighted by segment
/// length.
pub struct ShortestPaths {
    source: usize,
    dist_to: Vec<f64>,
    edge_to: Vec<Option<Arc<Segment>>>,
}

impl ShortestPaths {
    pub fn new(graph: &RoadGraph, source: usize) -> Result<Self> {
        let vertices = graph.vertices();
        if source >= vertices {
            return Err(AtlasError::VertexOutOfRange {
                id: source,
                vertices,
            });
        }

        let mut sp = Self {
            source,
            dist_to: vec![f64::INFINITY; vertices],
            edge_to: vec![None; vertices],
        };
        sp.dist_to[source] = 0.0;

        let mut pq = IndexMinPq::with_capacity(vertices);
        pq.insert(source, 0.0);
        while !pq.is_empty() {
            let v = pq.del_min();
            for edge in graph.adjacent(v) {
                sp.relax(edge, &mut pq);
            }
        }
        Ok(sp)
    }

    fn relax(&mut self, edge: &Arc<Segment>, pq: &mut IndexMinPq) {
        let v = edge.start().id();
        let w = edge.end().id();
        let candidate = self.dist_to[v] + edge.length();
        if self.dist_to[w] > candidate {
            self.dist_to[w] = candidate;
            self.edge_to[w] = Some(edge.clone());
            if pq.contains(w) {
                pq.decrease_key(w, candidate);
            } else {
                pq.insert(w, candidate);
            }
        }
    }

    /// Length of the shortest path to `v`, or `f64::INFINITY` if unreachable.
    pub fn dist_to(&self, v: usize) -> f64 {
        self.dist_to[v]
    }

    pub fn has_path_to(&self, v: usize) -> bool {
        self.dist_to[v] < f64::INFINITY
    }

    /// Edges of the shortest path to `v`, listed target-first. Empty when
    /// `v` is the source or unreachable.
    pub fn path_to(&self, v: usize) -> Vec<Arc<Segment>> {
        let mut path = Vec::new();
        if !self.has_path_to(v) {
            return path;
        }
        let mut cursor = v;
        while cursor != self.source {
            // has_path_to guarantees an incoming edge until the source.
            let Some(edge) = &self.edge_to[cursor] else {
                break;
            };
            path.push(edge.clone());
            cursor = edge.start().id();
        }
        path
    }
}

/// Shortest drivable route from segment `from` to segment `to`.
///
/// Runs Dijkstra from both endpoints of `from` and evaluates the four
/// endpoint pairings in the order start-start, start-end, end-start,
/// end-end; the first pairing achieving the minimum distance wins. An
/// unreachable pairing counts as infinite, and if all four are infinite the
/// result is the empty route.
pub fn shortest_route(graph: &RoadGraph, from: &Arc<Segment>, to: &Arc<Segment>) -> Result<Route> {
    let targets = [to.start().id(), to.end().id()];
    for id in targets {
        if id >= graph.vertices() {
            return Err(AtlasError::VertexOutOfRange {
                id,
                vertices: graph.vertices(),
            });
        }
    }

    let from_start = ShortestPaths::new(graph, from.start().id())?;
    let from_end = ShortestPaths::new(graph, from.end().id())?;

    let candidates = [
        (&from_start, targets[0]),
        (&from_start, targets[1]),
        (&from_end, targets[0]),
        (&from_end, targets[1]),
    ];

    let mut best: Option<(f64, &ShortestPaths, usize)> = None;
    for (sp, target) in candidates {
        let dist = sp.dist_to(target);
        // Strict comparison: the earliest pairing keeps ties.
        if best.as_ref().is_none_or(|(d, _, _)| dist < *d) {
            best = Some((dist, sp, target));
        }
    }

    // The candidate array is non-empty, so `best` is always set.
    let Some((dist, sp, target)) = best else {
        return Ok(Route::empty());
    };
    if dist.is_infinite() {
        return Ok(Route::empty());
    }

    let mut reversed = vec![to.clone()];
    reversed.extend(sp.path_to(target));
    reversed.push(from.clone());
    Ok(Route::from_reversed(reversed))
}

//! Directed routing graph over road segments
//!
//! Adjacency lists are indexed by `Point` id. Each stored edge is a segment
//! whose `start` is the list's vertex, so traversal never has to reorient:
//! a `Backward` one-way segment enters the graph already inverted, `None`
//! contributes both directions, and `NoDriving` segments are displayable but
//! never become edges.

use crate::geometry::{OneWay, Segment};
use crate::progress::ProgressHandle;
use crate::{AtlasError, Result};
use smallvec::SmallVec;
use std::sync::Arc;

/// Immutable directed graph, built once from the segment set.
#[derive(Debug)]
pub struct RoadGraph {
    adj: Vec<SmallVec<[Arc<Segment>; 4]>>,
    edge_count: usize,
}

impl RoadGraph {
    /// Build the graph over `vertices` point ids.
    ///
    /// Fails if any routable segment references a point id outside
    /// `0..vertices`.
    pub fn build(
        segments: &[Arc<Segment>],
        vertices: usize,
        progress: &ProgressHandle,
    ) -> Result<Self> {
        progress.reset();
        let mut graph = Self {
            adj: vec![SmallVec::new(); vertices],
            edge_count: 0,
        };

        let total = segments.len();
        for (done, segment) in segments.iter().enumerate() {
            match segment.one_way() {
                OneWay::NoDriving => {}
                OneWay::Forward => graph.add_edge(segment.clone())?,
                OneWay::Backward => graph.add_edge(Arc::new(segment.inverted()))?,
                OneWay::None => {
                    graph.add_edge(segment.clone())?;
                    graph.add_edge(Arc::new(segment.inverted()))?;
                }
            }
            progress.report((done + 1) as f64 / total.max(1) as f64);
        }

        progress.report(1.0);
        Ok(graph)
    }

    fn add_edge(&mut self, edge: Arc<Segment>) -> Result<()> {
        let from = edge.start().id();
        let to = edge.end().id();
        let vertices = self.adj.len();
        for id in [from, to] {
            if id >= vertices {
                return Err(AtlasError::VertexOutOfRange { id, vertices });
            }
        }
        self.adj[from].push(edge);
        self.edge_count += 1;
        Ok(())
    }

    /// Number of vertices (point ids) the graph was built over.
    pub fn vertices(&self) -> usize {
        self.adj.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Edges leaving vertex `v`. Every returned segment starts at `v`.
    pub fn adjacent(&self, v: usize) -> &[Arc<Segment>] {
        &self.adj[v]
    }

    pub fn out_degree(&self, v: usize) -> usize {
        self.adj[v].len()
    }

    /// All directed edges, in vertex order.
    pub fn edges(&self) -> impl Iterator<Item = &Arc<Segment>> {
        self.adj.iter().flatten()
    }
}

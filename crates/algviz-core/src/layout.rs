//! Boundary to the layout engine.
//!
//! Engines only see compact integer ids. [`LayoutAdapter`] allocates them through two
//! [`IdentityMap`]s (nodes and edges), calls the engine, checks that every requested node came
//! back with a finite position and maps the answer back to identities.

use crate::arena::NodeId;
use crate::geom::{Box2, Point, bounds_of, point};
use crate::identity::IdentityMap;
use crate::topology::{EdgeKey, Topology, TopologyDiff};
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout engine failed: {message}")]
    Engine { message: String },
    #[error("layout engine returned no position for node {id}")]
    MissingNode { id: u32 },
    #[error("layout engine returned a non-finite position for node {id}")]
    NonFinite { id: u32 },
    #[error(transparent)]
    UnknownId(#[from] UnknownCompactId),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("layout engine answered for unknown compact id {id}")]
pub struct UnknownCompactId {
    pub id: u32,
}

/// Rank direction hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankDir {
    #[default]
    TB,
    BT,
    LR,
    RL,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEdge {
    pub id: u32,
    pub source: u32,
    pub target: u32,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRequest {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub directed: bool,
    pub rankdir: RankDir,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedNode {
    pub center: Point,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResponse {
    pub nodes: HashMap<u32, PlacedNode>,
    pub edges: HashMap<u32, Vec<Point>>,
}

pub trait LayoutEngine {
    fn layout(&self, request: &LayoutRequest) -> Result<LayoutResponse, LayoutError>;
}

/// Positions of one frame, keyed by identity.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    pub nodes: HashMap<NodeId, PlacedNode>,
    pub edges: HashMap<EdgeKey, Vec<Point>>,
    pub bounds: Box2,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            nodes: HashMap::default(),
            edges: HashMap::default(),
            bounds: Box2::zero(),
        }
    }
}

impl SceneLayout {
    /// Bounding box of every node box and edge point.
    pub fn compute_bounds(&mut self) {
        let corners = self.nodes.values().flat_map(|n| {
            let (hw, hh) = (n.width / 2.0, n.height / 2.0);
            [
                point(n.center.x - hw, n.center.y - hh),
                point(n.center.x + hw, n.center.y + hh),
            ]
        });
        let paths = self.edges.values().flat_map(|p| p.iter().copied());
        self.bounds = bounds_of(corners.chain(paths)).unwrap_or_else(Box2::zero);
    }
}

pub struct LayoutAdapter {
    engine: Box<dyn LayoutEngine>,
    nodes: IdentityMap<NodeId>,
    edges: IdentityMap<EdgeKey>,
}

impl std::fmt::Debug for LayoutAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutAdapter")
            .field("nodes", &self.nodes)
            .field("edges", &self.edges)
            .finish_non_exhaustive()
    }
}

impl LayoutAdapter {
    pub fn new(engine: Box<dyn LayoutEngine>, node_offset: u32, edge_offset: u32) -> Self {
        Self {
            engine,
            nodes: IdentityMap::new(node_offset),
            edges: IdentityMap::new(edge_offset),
        }
    }

    pub fn node_ids(&self) -> &IdentityMap<NodeId> {
        &self.nodes
    }

    pub fn edge_ids(&self) -> &IdentityMap<EdgeKey> {
        &self.edges
    }

    /// Lays out `topology`. On error no compact id is left allocated by this call.
    pub fn resolve(
        &mut self,
        topology: &Topology,
        labels: &HashMap<NodeId, String>,
        directed: bool,
        rankdir: RankDir,
    ) -> Result<SceneLayout, LayoutError> {
        let saved = (self.nodes.clone(), self.edges.clone());
        let out = self.resolve_inner(topology, labels, directed, rankdir);
        if out.is_err() {
            (self.nodes, self.edges) = saved;
        }
        out
    }

    fn resolve_inner(
        &mut self,
        topology: &Topology,
        labels: &HashMap<NodeId, String>,
        directed: bool,
        rankdir: RankDir,
    ) -> Result<SceneLayout, LayoutError> {
        let nodes: Vec<LayoutNode> = topology
            .nodes
            .iter()
            .map(|id| LayoutNode {
                id: self.nodes.to_compact(*id),
                label: labels.get(id).cloned().unwrap_or_default(),
            })
            .collect();
        let mut edges: Vec<LayoutEdge> = Vec::with_capacity(topology.edges.len());
        for (key, label) in &topology.edges {
            let id = self.edges.to_compact(*key);
            edges.push(LayoutEdge {
                id,
                source: self.nodes.to_compact(key.source),
                target: self.nodes.to_compact(key.target),
                label: label.clone(),
            });
        }
        let request = LayoutRequest {
            nodes,
            edges,
            directed,
            rankdir,
        };

        tracing::debug!(
            nodes = request.nodes.len(),
            edges = request.edges.len(),
            "invoking layout engine"
        );
        let response = self.engine.layout(&request)?;

        let mut out = SceneLayout::default();
        for n in &request.nodes {
            let placed = response
                .nodes
                .get(&n.id)
                .ok_or(LayoutError::MissingNode { id: n.id })?;
            let finite = placed.center.x.is_finite()
                && placed.center.y.is_finite()
                && placed.width.is_finite()
                && placed.height.is_finite();
            if !finite {
                return Err(LayoutError::NonFinite { id: n.id });
            }
            let identity = self
                .nodes
                .to_identity(n.id)
                .map_err(|_| UnknownCompactId { id: n.id })?;
            out.nodes.insert(identity, *placed);
        }
        for e in &request.edges {
            let identity = self
                .edges
                .to_identity(e.id)
                .map_err(|_| UnknownCompactId { id: e.id })?;
            let path = response.edges.get(&e.id).cloned().unwrap_or_else(|| {
                // Engines may skip routing; fall back to a straight segment.
                let center = |id: &NodeId| out.nodes.get(id).map(|n| n.center);
                center(&identity.source)
                    .into_iter()
                    .chain(center(&identity.target))
                    .collect()
            });
            out.edges.insert(identity, path);
        }
        out.compute_bounds();
        Ok(out)
    }

    /// Frees the compact ids of everything that disappeared.
    pub fn release(&mut self, diff: &TopologyDiff) {
        for id in &diff.disappeared_nodes {
            self.nodes.release(id);
        }
        for key in &diff.disappeared_edges {
            self.edges.release(key);
        }
    }
}

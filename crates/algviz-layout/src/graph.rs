//! Graph container used by the layout passes.
//!
//! Nodes and edges are addressed by the caller's compact integer ids. Nodes keep their
//! insertion order, which is the tie break for every ordering decision made by the passes.

use crate::{EdgeLabel, GraphLabel, NodeLabel};
use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone, Copy)]
pub struct GraphOptions {
    pub directed: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self { directed: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub id: u32,
    pub v: u32,
    pub w: u32,
}

#[derive(Debug, Clone)]
struct NodeEntry {
    id: u32,
    label: NodeLabel,
}

#[derive(Debug, Clone)]
struct EdgeEntry {
    key: EdgeKey,
    label: EdgeLabel,
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    options: GraphOptions,
    graph_label: GraphLabel,

    nodes: Vec<NodeEntry>,
    node_index: HashMap<u32, usize>,

    edges: Vec<EdgeEntry>,
    edge_index: HashMap<u32, usize>,
}

impl Graph {
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn is_directed(&self) -> bool {
        self.options.directed
    }

    pub fn set_graph(&mut self, label: GraphLabel) -> &mut Self {
        self.graph_label = label;
        self
    }

    pub fn graph(&self) -> &GraphLabel {
        &self.graph_label
    }

    pub fn has_node(&self, id: u32) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn set_node(&mut self, id: u32, label: NodeLabel) -> &mut Self {
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return self;
        }
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry { id, label });
        self.node_index.insert(id, idx);
        self
    }

    pub fn node(&self, id: u32) -> Option<&NodeLabel> {
        self.node_index.get(&id).map(|&idx| &self.nodes[idx].label)
    }

    pub fn node_mut(&mut self, id: u32) -> Option<&mut NodeLabel> {
        self.node_index
            .get(&id)
            .copied()
            .map(move |idx| &mut self.nodes[idx].label)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> Vec<u32> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter().map(|e| &e.key)
    }

    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.edges.iter().map(|e| e.key).collect()
    }

    /// Inserts (or replaces) the edge with compact id `id`. Endpoints are not created
    /// implicitly; the layout entry point validates them.
    pub fn set_edge(&mut self, id: u32, v: u32, w: u32, label: EdgeLabel) -> &mut Self {
        let key = EdgeKey { id, v, w };
        if let Some(&idx) = self.edge_index.get(&id) {
            self.edges[idx] = EdgeEntry { key, label };
            return self;
        }
        let idx = self.edges.len();
        self.edges.push(EdgeEntry { key, label });
        self.edge_index.insert(id, idx);
        self
    }

    pub fn edge(&self, id: u32) -> Option<&EdgeLabel> {
        self.edge_index.get(&id).map(|&idx| &self.edges[idx].label)
    }

    pub fn edge_mut(&mut self, id: u32) -> Option<&mut EdgeLabel> {
        self.edge_index
            .get(&id)
            .copied()
            .map(move |idx| &mut self.edges[idx].label)
    }

    pub fn edge_key(&self, id: u32) -> Option<EdgeKey> {
        self.edge_index.get(&id).map(|&idx| self.edges[idx].key)
    }

    /// Rewrites the endpoints of an existing edge, keeping its id and label.
    pub(crate) fn reverse_edge(&mut self, id: u32) {
        if let Some(&idx) = self.edge_index.get(&id) {
            let key = &mut self.edges[idx].key;
            std::mem::swap(&mut key.v, &mut key.w);
        }
    }

    /// Outgoing edges of `v` in edge insertion order. Self-loops are included.
    pub fn out_edges(&self, v: u32) -> Vec<EdgeKey> {
        self.edges
            .iter()
            .filter(|e| e.key.v == v)
            .map(|e| e.key)
            .collect()
    }

    /// Incoming edges of `w` in edge insertion order. Self-loops are included.
    pub fn in_edges(&self, w: u32) -> Vec<EdgeKey> {
        self.edges
            .iter()
            .filter(|e| e.key.w == w)
            .map(|e| e.key)
            .collect()
    }

    pub fn successors(&self, v: u32) -> Vec<u32> {
        let mut out = Vec::new();
        for e in &self.edges {
            if e.key.v == v && e.key.w != v && !out.contains(&e.key.w) {
                out.push(e.key.w);
            }
        }
        out
    }

    pub fn predecessors(&self, w: u32) -> Vec<u32> {
        let mut out = Vec::new();
        for e in &self.edges {
            if e.key.w == w && e.key.v != w && !out.contains(&e.key.v) {
                out.push(e.key.v);
            }
        }
        out
    }
}

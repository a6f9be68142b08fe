//! Topology walking and diffing.
//!
//! A walk starts from the seed sequence `previous ++ added` and follows links depth first, in
//! link enumeration order. The visited set is keyed by [`NodeId`], so cycles and aliased
//! nodes are enumerated once. Removed identities are pre-marked as visited, which keeps a
//! removed subtree from being rediscovered through a stale link.

use crate::arena::{Adjacency, NodeId};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use serde::{Deserialize, Serialize};

/// Ordered `(source, target)` pair naming a visual edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source: NodeId,
    pub target: NodeId,
}

impl EdgeKey {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }

    /// Key under which an adjacency is stored: as given when `directed`, otherwise ordered
    /// by identity.
    pub fn stored(source: NodeId, target: NodeId, directed: bool) -> Self {
        if directed || source <= target {
            Self::new(source, target)
        } else {
            Self::new(target, source)
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    /// Nodes in walk order.
    pub nodes: Vec<NodeId>,
    /// Edge labels in discovery order.
    pub edges: IndexMap<EdgeKey, Option<String>>,
}

impl Topology {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_set(&self) -> HashSet<NodeId> {
        self.nodes.iter().copied().collect()
    }

    pub fn has_edge(&self, source: NodeId, target: NodeId, directed: bool) -> bool {
        self.edges
            .contains_key(&EdgeKey::stored(source, target, directed))
    }
}

/// Seeds of one walk.
#[derive(Debug, Clone, Copy)]
pub struct WalkSeeds<'a> {
    pub previous: &'a [NodeId],
    pub added: &'a [NodeId],
    pub removed: &'a HashSet<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Walk {
    pub topology: Topology,
    pub labels: HashMap<NodeId, String>,
}

pub fn walk<A: Adjacency + ?Sized>(source: &A, seeds: WalkSeeds<'_>, directed: bool) -> Walk {
    let mut visited: HashSet<NodeId> = seeds.removed.iter().copied().collect();
    let mut stack: Vec<NodeId> = seeds
        .previous
        .iter()
        .chain(seeds.added)
        .rev()
        .copied()
        .collect();

    let mut out = Walk::default();
    while let Some(cur) = stack.pop() {
        if !visited.insert(cur) {
            continue;
        }
        let Some(label) = source.label(cur) else {
            continue;
        };
        out.topology.nodes.push(cur);
        out.labels.insert(cur, label);

        let links = source.links(cur);
        for link in &links {
            let Some(target) = link.target else {
                continue;
            };
            if seeds.removed.contains(&target) {
                continue;
            }
            out.topology
                .edges
                .entry(EdgeKey::stored(cur, target, directed))
                .or_insert_with(|| link.label.clone());
        }
        for link in links.iter().rev() {
            if let Some(target) = link.target {
                if !visited.contains(&target) {
                    stack.push(target);
                }
            }
        }
    }

    let present = out.topology.node_set();
    out.topology
        .edges
        .retain(|k, _| present.contains(&k.source) && present.contains(&k.target));

    tracing::trace!(
        nodes = out.topology.nodes.len(),
        edges = out.topology.edges.len(),
        "walked topology"
    );
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyDiff {
    /// In new walk order.
    pub appeared_nodes: Vec<NodeId>,
    /// In old walk order.
    pub disappeared_nodes: Vec<NodeId>,
    pub appeared_edges: Vec<EdgeKey>,
    pub disappeared_edges: Vec<EdgeKey>,
}

impl TopologyDiff {
    pub fn between(old: &Topology, new: &Topology) -> Self {
        let old_nodes = old.node_set();
        let new_nodes = new.node_set();
        Self {
            appeared_nodes: new
                .nodes
                .iter()
                .copied()
                .filter(|n| !old_nodes.contains(n))
                .collect(),
            disappeared_nodes: old
                .nodes
                .iter()
                .copied()
                .filter(|n| !new_nodes.contains(n))
                .collect(),
            appeared_edges: new
                .edges
                .keys()
                .copied()
                .filter(|k| !old.edges.contains_key(k))
                .collect(),
            disappeared_edges: old
                .edges
                .keys()
                .copied()
                .filter(|k| !new.edges.contains_key(k))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.appeared_nodes.is_empty()
            && self.disappeared_nodes.is_empty()
            && self.appeared_edges.is_empty()
            && self.disappeared_edges.is_empty()
    }
}

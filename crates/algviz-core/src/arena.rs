//! Linked data-structure nodes with explicit change notification.
//!
//! Scenes never intercept field access. Every link or label change goes through a
//! [`NodeArena`] setter, which appends a [`Mutation`] to the arena journal; scenes read the
//! journal from their own cursor before each render. The journal grows with every setter call;
//! long sessions trim it with [`NodeArena::compact_journal`] once every scene has read it.

use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a data-structure node. Never reused within one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// One outgoing link of a node. `target: None` is an empty slot (a missing child).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub target: Option<NodeId>,
    pub label: Option<String>,
}

/// Read access to a linked structure.
pub trait Adjacency {
    /// Display value of `id`, or `None` once the node no longer exists.
    fn label(&self, id: NodeId) -> Option<String>;

    /// Links of `id` in enumeration order.
    fn links(&self, id: NodeId) -> Vec<Link>;

    /// Retained mutations, oldest first.
    fn journal(&self) -> &[Mutation] {
        &[]
    }

    /// Position of the first retained mutation in the whole history of the structure.
    fn journal_base(&self) -> u64 {
        0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Created { node: NodeId },
    Relabeled { node: NodeId },
    Linked { node: NodeId, target: NodeId },
    Unlinked { node: NodeId, target: NodeId },
    Freed { node: NodeId },
}

#[derive(Debug, Clone, PartialEq)]
enum Links {
    List {
        next: Option<NodeId>,
    },
    Tree {
        left: Option<NodeId>,
        right: Option<NodeId>,
    },
    Graph {
        neighbors: Vec<(NodeId, Option<String>)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct ArenaNode {
    label: String,
    links: Links,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Next,
    Left,
    Right,
}

/// Owner of list, binary-tree and graph nodes.
///
/// Setters return `false` (and record nothing) when the node does not exist or is of the
/// wrong kind, e.g. `set_left` on a list node.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    next_id: u64,
    nodes: HashMap<NodeId, ArenaNode>,
    journal: Vec<Mutation>,
    journal_base: u64,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, label: impl Into<String>, links: Links) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            ArenaNode {
                label: label.into(),
                links,
            },
        );
        self.journal.push(Mutation::Created { node: id });
        id
    }

    /// Position one past the newest mutation.
    pub fn journal_end(&self) -> u64 {
        self.journal_base + self.journal.len() as u64
    }

    /// Drops the mutations before position `upto` and returns how many were dropped.
    ///
    /// Pass the smallest [`GraphScene::journal_position`](crate::GraphScene::journal_position)
    /// among the scenes reading this arena; a scene behind `upto` misses the dropped entries.
    pub fn compact_journal(&mut self, upto: u64) -> usize {
        let dropped = upto
            .saturating_sub(self.journal_base)
            .min(self.journal.len() as u64) as usize;
        self.journal.drain(..dropped);
        self.journal_base += dropped as u64;
        dropped
    }

    pub fn list_node(&mut self, label: impl Into<String>) -> NodeId {
        self.insert(label, Links::List { next: None })
    }

    pub fn tree_node(&mut self, label: impl Into<String>) -> NodeId {
        self.insert(
            label,
            Links::Tree {
                left: None,
                right: None,
            },
        )
    }

    pub fn graph_node(&mut self, label: impl Into<String>) -> NodeId {
        self.insert(
            label,
            Links::Graph {
                neighbors: Vec::new(),
            },
        )
    }

    /// Builds a singly linked list and returns its head.
    pub fn list_from<I, S>(&mut self, labels: I) -> Option<NodeId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<NodeId> = labels.into_iter().map(|l| self.list_node(l)).collect();
        for pair in ids.windows(2) {
            self.set_next(pair[0], Some(pair[1]));
        }
        ids.first().copied()
    }

    /// Builds a binary tree from level-order values where `None` is a missing child.
    pub fn tree_from_level_order<S: AsRef<str>>(&mut self, values: &[Option<S>]) -> Option<NodeId> {
        let root_label: &str = values.first()?.as_ref()?.as_ref();
        let root = self.tree_node(root_label);
        let mut parents = std::collections::VecDeque::from([root]);
        let mut rest = values[1..].iter();
        while let Some(parent) = parents.pop_front() {
            for side in [Side::Left, Side::Right] {
                let Some(value) = rest.next() else {
                    return Some(root);
                };
                if let Some(value) = value {
                    let label: &str = value.as_ref();
                    let child = self.tree_node(label);
                    self.set_link(parent, side, Some(child));
                    parents.push_back(child);
                }
            }
        }
        Some(root)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn label_of(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.label.as_str())
    }

    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        let label = label.into();
        if node.label != label {
            node.label = label;
            self.journal.push(Mutation::Relabeled { node: id });
        }
        true
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        match self.nodes.get(&id)?.links {
            Links::List { next } => next,
            _ => None,
        }
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        match self.nodes.get(&id)?.links {
            Links::Tree { left, .. } => left,
            _ => None,
        }
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        match self.nodes.get(&id)?.links {
            Links::Tree { right, .. } => right,
            _ => None,
        }
    }

    pub fn set_next(&mut self, id: NodeId, target: Option<NodeId>) -> bool {
        self.set_link(id, Side::Next, target)
    }

    pub fn set_left(&mut self, id: NodeId, target: Option<NodeId>) -> bool {
        self.set_link(id, Side::Left, target)
    }

    pub fn set_right(&mut self, id: NodeId, target: Option<NodeId>) -> bool {
        self.set_link(id, Side::Right, target)
    }

    fn set_link(&mut self, id: NodeId, side: Side, target: Option<NodeId>) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        let slot = match (&mut node.links, side) {
            (Links::List { next }, Side::Next) => next,
            (Links::Tree { left, .. }, Side::Left) => left,
            (Links::Tree { right, .. }, Side::Right) => right,
            _ => return false,
        };
        let previous = std::mem::replace(slot, target);
        if previous == target {
            return true;
        }
        if let Some(old) = previous {
            self.journal.push(Mutation::Unlinked {
                node: id,
                target: old,
            });
        }
        if let Some(new) = target {
            self.journal.push(Mutation::Linked {
                node: id,
                target: new,
            });
        }
        true
    }

    pub fn neighbors(&self, id: NodeId) -> &[(NodeId, Option<String>)] {
        match self.nodes.get(&id).map(|n| &n.links) {
            Some(Links::Graph { neighbors }) => neighbors,
            _ => &[],
        }
    }

    /// Appends `target` to the neighbors of `id`, or updates the weight of an existing link.
    pub fn add_neighbor(&mut self, id: NodeId, target: NodeId, weight: Option<String>) -> bool {
        let Some(ArenaNode {
            links: Links::Graph { neighbors },
            ..
        }) = self.nodes.get_mut(&id)
        else {
            return false;
        };
        match neighbors.iter_mut().find(|(n, _)| *n == target) {
            Some(entry) => entry.1 = weight,
            None => {
                neighbors.push((target, weight));
                self.journal.push(Mutation::Linked { node: id, target });
            }
        }
        true
    }

    pub fn remove_neighbor(&mut self, id: NodeId, target: NodeId) -> bool {
        let Some(ArenaNode {
            links: Links::Graph { neighbors },
            ..
        }) = self.nodes.get_mut(&id)
        else {
            return false;
        };
        let before = neighbors.len();
        neighbors.retain(|(n, _)| *n != target);
        if neighbors.len() == before {
            return false;
        }
        self.journal.push(Mutation::Unlinked { node: id, target });
        true
    }

    /// Drops the node. Links pointing at it from other nodes become dangling and are ignored
    /// by walks.
    pub fn free(&mut self, id: NodeId) -> bool {
        if self.nodes.remove(&id).is_none() {
            return false;
        }
        self.journal.push(Mutation::Freed { node: id });
        true
    }
}

impl Adjacency for NodeArena {
    fn label(&self, id: NodeId) -> Option<String> {
        self.label_of(id).map(str::to_string)
    }

    fn links(&self, id: NodeId) -> Vec<Link> {
        let Some(node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let link = |target: Option<NodeId>| Link {
            target,
            label: None,
        };
        match &node.links {
            Links::List { next } => vec![link(*next)],
            Links::Tree { left, right } => vec![link(*left), link(*right)],
            Links::Graph { neighbors } => neighbors
                .iter()
                .map(|(target, weight)| Link {
                    target: Some(*target),
                    label: weight.clone(),
                })
                .collect(),
        }
    }

    fn journal(&self) -> &[Mutation] {
        &self.journal
    }

    fn journal_base(&self) -> u64 {
        self.journal_base
    }
}

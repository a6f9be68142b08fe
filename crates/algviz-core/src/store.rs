use crate::arena::NodeId;
use crate::color::Rgb;
use crate::layout::SceneLayout;
use crate::topology::{EdgeKey, Topology};
use crate::trace::{ColorStacks, Element};
use rustc_hash::FxHashMap as HashMap;

/// Committed render state of one scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub topology: Topology,
    pub labels: HashMap<NodeId, String>,
    pub node_fills: HashMap<NodeId, Rgb>,
    pub edge_strokes: HashMap<EdgeKey, Rgb>,
    pub layout: SceneLayout,
}

impl Snapshot {
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.labels.get(&id).map(String::as_str)
    }

    pub fn edge_label(&self, key: &EdgeKey) -> Option<&str> {
        self.topology.edges.get(key).and_then(|l| l.as_deref())
    }

    /// Resolved color of an element present in this snapshot.
    pub fn color(&self, element: Element) -> Option<Rgb> {
        match element {
            Element::Node(id) => self.node_fills.get(&id).copied(),
            Element::Edge(key) => self.edge_strokes.get(&key).copied(),
        }
    }

    pub fn contains(&self, element: Element) -> bool {
        match element {
            Element::Node(id) => self.labels.contains_key(&id),
            Element::Edge(key) => self.topology.edges.contains_key(&key),
        }
    }
}

/// Owner of the committed snapshot and the live highlight stacks.
#[derive(Debug, Clone, Default)]
pub struct SceneStore {
    snapshot: Snapshot,
    stacks: ColorStacks,
    commits: u64,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn stacks(&self) -> &ColorStacks {
        &self.stacks
    }

    /// Live stacks, for highlights recorded between renders.
    pub fn stacks_mut(&mut self) -> &mut ColorStacks {
        &mut self.stacks
    }

    /// Committed snapshot next to the live stacks.
    pub fn split_mut(&mut self) -> (&Snapshot, &mut ColorStacks) {
        (&self.snapshot, &mut self.stacks)
    }

    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// Replaces the committed state. Stacks of elements that left the topology are dropped and
    /// new elements get an empty stack unless a highlight already created one.
    pub fn commit(&mut self, snapshot: Snapshot, mut stacks: ColorStacks) {
        stacks.sync(&snapshot.topology);
        self.snapshot = snapshot;
        self.stacks = stacks;
        self.commits += 1;
        tracing::trace!(commit = self.commits, "committed snapshot");
    }

    /// Accepts settled highlight stacks without a new snapshot.
    pub fn replace_stacks(&mut self, stacks: ColorStacks) {
        self.stacks = stacks;
    }
}

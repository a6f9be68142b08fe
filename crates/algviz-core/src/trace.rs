//! Trace cursors and highlight routing.
//!
//! Every cursor owns one palette color. Visits push that color onto the target's
//! [`ColorStack`] and record a frame event. Events with `hold = false` are transient: at the
//! next render they become expiry candidates, and the render after that removes them unless the
//! same `(element, color)` was highlighted again in between.

use crate::arena::NodeId;
use crate::color::{ColorStack, Rgb};
use crate::topology::{EdgeKey, Topology};
use rustc_hash::FxHashMap as HashMap;
use rustc_hash::FxHashSet as HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    Node(NodeId),
    Edge(EdgeKey),
}

/// Live highlight stacks of one scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorStacks {
    nodes: HashMap<NodeId, ColorStack>,
    edges: HashMap<EdgeKey, ColorStack>,
}

impl ColorStacks {
    pub fn get(&self, element: Element) -> Option<&ColorStack> {
        match element {
            Element::Node(id) => self.nodes.get(&id),
            Element::Edge(key) => self.edges.get(&key),
        }
    }

    pub fn get_mut(&mut self, element: Element) -> Option<&mut ColorStack> {
        match element {
            Element::Node(id) => self.nodes.get_mut(&id),
            Element::Edge(key) => self.edges.get_mut(&key),
        }
    }

    /// The element's stack, created empty on first use.
    pub fn stack_mut(&mut self, element: Element) -> &mut ColorStack {
        match element {
            Element::Node(id) => self.nodes.entry(id).or_default(),
            Element::Edge(key) => self.edges.entry(key).or_default(),
        }
    }

    /// Resolved fill, `background` when the element carries no highlight.
    pub fn fill(&self, element: Element, background: Rgb) -> Rgb {
        self.get(element)
            .map(|s| s.resolve_over(background))
            .unwrap_or(background)
    }

    /// Elements whose stack currently contains `color`.
    pub fn holding(&self, color: Rgb) -> Vec<Element> {
        let mut out: Vec<Element> = self
            .nodes
            .iter()
            .filter(|(_, s)| s.contains(color))
            .map(|(id, _)| Element::Node(*id))
            .chain(
                self.edges
                    .iter()
                    .filter(|(_, s)| s.contains(color))
                    .map(|(k, _)| Element::Edge(*k)),
            )
            .collect();
        out.sort_unstable();
        out
    }

    /// Drops stacks of elements that left `topology` and seeds empty stacks for new ones.
    pub fn sync(&mut self, topology: &Topology) {
        let present = topology.node_set();
        self.nodes.retain(|id, _| present.contains(id));
        self.edges.retain(|k, _| topology.edges.contains_key(k));
        for id in &topology.nodes {
            self.nodes.entry(*id).or_default();
        }
        for k in topology.edges.keys() {
            self.edges.entry(*k).or_default();
        }
    }
}

/// Caller-owned handle of one trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceCursor {
    color: Rgb,
    hold: bool,
    name: Option<String>,
    position: Option<NodeId>,
}

impl TraceCursor {
    pub(crate) fn new(color: Rgb, hold: bool, name: Option<&str>) -> Self {
        Self {
            color,
            hold,
            name: name.map(str::to_string),
            position: None,
        }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn hold(&self) -> bool {
        self.hold
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Node visited last, if any.
    pub fn position(&self) -> Option<NodeId> {
        self.position
    }

    pub(crate) fn set_position(&mut self, node: Option<NodeId>) {
        self.position = node;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightEvent {
    pub element: Element,
    pub color: Rgb,
    pub hold: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TraceRouter {
    last_visit: HashMap<Rgb, NodeId>,
    events: Vec<HighlightEvent>,
    expiring: Vec<(Element, Rgb)>,
    retired: Vec<Element>,
    /// Held edges walked before any render showed them.
    deferred: Vec<(EdgeKey, Rgb)>,
}

impl TraceRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the cursor of `color` to `target`. Returns `false` when it was already there.
    ///
    /// With `hold`, the edge from the previous position is highlighted too. An edge missing
    /// from `edges` waits for [`TraceRouter::resolve_deferred`].
    pub fn visit(
        &mut self,
        stacks: &mut ColorStacks,
        edges: &Topology,
        directed: bool,
        color: Rgb,
        hold: bool,
        target: NodeId,
    ) -> bool {
        let previous = self.last_visit.get(&color).copied();
        if previous == Some(target) {
            return false;
        }
        self.highlight(stacks, Element::Node(target), color, hold);
        if hold {
            if let Some(prev) = previous {
                let key = EdgeKey::stored(prev, target, directed);
                if edges.edges.contains_key(&key) {
                    self.highlight(stacks, Element::Edge(key), color, hold);
                } else if !self.deferred.contains(&(key, color)) {
                    self.deferred.push((key, color));
                }
            }
        }
        self.last_visit.insert(color, target);
        true
    }

    pub fn highlight(&mut self, stacks: &mut ColorStacks, element: Element, color: Rgb, hold: bool) {
        stacks.stack_mut(element).add(color);
        self.events.push(HighlightEvent {
            element,
            color,
            hold,
        });
    }

    /// Ends the trace of `color`. Held highlights are removed right away; transient ones expire
    /// on their normal schedule.
    pub fn retire(&mut self, stacks: &mut ColorStacks, color: Rgb, hold: bool) -> Vec<Element> {
        self.last_visit.remove(&color);
        self.deferred.retain(|(_, c)| *c != color);
        if !hold {
            return Vec::new();
        }
        let touched = stacks.holding(color);
        for element in &touched {
            if let Some(stack) = stacks.get_mut(*element) {
                stack.remove(color);
            }
        }
        self.retired.extend(touched.iter().copied());
        touched
    }

    /// Highlights the deferred edges that `topology` now contains. The others are dropped: the
    /// cursor walked a link that no longer exists.
    pub fn resolve_deferred(&mut self, stacks: &mut ColorStacks, topology: &Topology) {
        for (key, color) in std::mem::take(&mut self.deferred) {
            if topology.edges.contains_key(&key) {
                self.highlight(stacks, Element::Edge(key), color, true);
            }
        }
    }

    /// Removes `color` from one element, as a mark removal does.
    pub fn unmark(&mut self, stacks: &mut ColorStacks, element: Element, color: Rgb) -> bool {
        let removed = stacks.get_mut(element).is_some_and(|s| s.remove(color));
        if removed {
            self.retired.push(element);
        }
        removed
    }

    /// Forgets cursor positions at a node that no longer exists.
    pub fn forget_node(&mut self, node: NodeId) {
        self.last_visit.retain(|_, n| *n != node);
    }

    pub fn last_visit(&self, color: Rgb) -> Option<NodeId> {
        self.last_visit.get(&color).copied()
    }

    /// Nodes where some cursor currently stands.
    pub fn positions(&self) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self.last_visit.values().copied().collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Whether the next settle will change any highlight.
    pub fn has_pending(&self) -> bool {
        !self.events.is_empty()
            || !self.expiring.is_empty()
            || !self.retired.is_empty()
            || !self.deferred.is_empty()
    }

    pub fn events(&self) -> &[HighlightEvent] {
        &self.events
    }

    /// Closes the frame: expires stale transient highlights and returns every element whose
    /// highlight state was touched, in first-touch order.
    pub fn settle(&mut self, stacks: &mut ColorStacks) -> Vec<Element> {
        let mut touched: Vec<Element> = Vec::new();

        for (element, color) in std::mem::take(&mut self.expiring) {
            let reasserted = self
                .events
                .iter()
                .any(|e| e.element == element && e.color == color);
            if !reasserted {
                if let Some(stack) = stacks.get_mut(element) {
                    stack.remove(color);
                }
            }
            touched.push(element);
        }

        for event in std::mem::take(&mut self.events) {
            touched.push(event.element);
            if !event.hold {
                self.expiring.push((event.element, event.color));
            }
        }
        touched.append(&mut self.retired);

        let mut seen: HashSet<Element> = HashSet::default();
        touched.retain(|e| seen.insert(*e));
        touched
    }
}

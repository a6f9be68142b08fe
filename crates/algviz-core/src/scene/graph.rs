use crate::arena::{Adjacency, Mutation, NodeId};
use crate::color::{Palette, Rgb};
use crate::config::SceneConfig;
use crate::directive::{Frame, RenderOutcome};
use crate::layout::{LayoutAdapter, LayoutEngine, SceneLayout};
use crate::store::{SceneStore, Snapshot};
use crate::synth::{self, SynthesisInput};
use crate::topology::{self, TopologyDiff, WalkSeeds};
use crate::trace::{ColorStacks, Element, TraceCursor, TraceRouter};
use crate::Result;
use rustc_hash::FxHashMap as HashMap;
use rustc_hash::FxHashSet as HashSet;

/// Render pipeline for linked structures: lists, trees and graphs.
#[derive(Debug)]
pub struct GraphScene {
    config: SceneConfig,
    palette: Palette,
    adapter: LayoutAdapter,
    store: SceneStore,
    router: TraceRouter,
    pending: Vec<NodeId>,
    hidden: HashSet<NodeId>,
    roots: Vec<NodeId>,
    journal_cursor: u64,
}

impl GraphScene {
    pub fn new(config: SceneConfig, engine: Box<dyn LayoutEngine>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            palette: Palette::new(config.trace_colors.clone()),
            adapter: LayoutAdapter::new(engine, config.node_id_offset, config.edge_id_offset),
            store: SceneStore::new(),
            router: TraceRouter::new(),
            pending: Vec::new(),
            hidden: HashSet::default(),
            roots: Vec::new(),
            journal_cursor: 0,
            config,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Committed state of the last successful render.
    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    pub fn stacks(&self) -> &ColorStacks {
        self.store.stacks()
    }

    pub fn layout_ids(&self) -> &LayoutAdapter {
        &self.adapter
    }

    /// Shows `node` and everything reachable from it at the next render.
    pub fn add_node(&mut self, node: NodeId) {
        self.hidden.remove(&node);
        if !self.pending.contains(&node) {
            self.pending.push(node);
        }
    }

    /// Hides `node` until it is added again. Links through it are not followed.
    pub fn remove_node(&mut self, node: NodeId) {
        self.pending.retain(|n| *n != node);
        self.roots.retain(|n| *n != node);
        self.hidden.insert(node);
    }

    /// Adds `node` and keeps it as a walk seed when unreachable nodes are pruned.
    pub fn track_root(&mut self, node: NodeId) {
        if !self.roots.contains(&node) {
            self.roots.push(node);
        }
        self.add_node(node);
    }

    /// Claims a trace color. Fails with `TraceOverflow` once every palette color is taken.
    pub fn create_trace(&mut self, name: Option<&str>, hold: bool) -> Result<TraceCursor> {
        let color = self.palette.claim(name)?;
        tracing::debug!(%color, ?name, hold, "created trace");
        Ok(TraceCursor::new(color, hold, name))
    }

    /// Moves `cursor` to `node`, highlighting it (and with `hold`, the edge walked).
    pub fn visit(&mut self, cursor: &mut TraceCursor, node: NodeId) {
        if !self.store.snapshot().labels.contains_key(&node) {
            self.add_node(node);
        }
        let (committed, stacks) = self.store.split_mut();
        self.router.visit(
            stacks,
            &committed.topology,
            self.config.directed,
            cursor.color(),
            cursor.hold(),
            node,
        );
        cursor.set_position(Some(node));
    }

    /// Ends a trace and returns its color to the palette.
    pub fn retire(&mut self, cursor: TraceCursor) {
        let touched = self
            .router
            .retire(self.store.stacks_mut(), cursor.color(), cursor.hold());
        self.palette.release(cursor.color());
        tracing::debug!(color = %cursor.color(), touched = touched.len(), "retired trace");
    }

    /// Highlights one element without a cursor.
    pub fn mark(&mut self, element: Element, color: Rgb, hold: bool) {
        self.router
            .highlight(self.store.stacks_mut(), element, color, hold);
    }

    /// Removes a mark placed with [`GraphScene::mark`].
    pub fn remove_mark(&mut self, element: Element, color: Rgb) -> bool {
        self.router.unmark(self.store.stacks_mut(), element, color)
    }

    /// Journal position this scene has read up to; see [`crate::NodeArena::compact_journal`].
    pub fn journal_position(&self) -> u64 {
        self.journal_cursor
    }

    fn drain_journal<A: Adjacency + ?Sized>(&mut self, source: &A) {
        let base = source.journal_base();
        let journal = source.journal();
        let end = base + journal.len() as u64;
        if self.journal_cursor > end {
            // A different source; start over from what it retains.
            self.journal_cursor = base;
        }
        if self.journal_cursor < base {
            tracing::debug!(
                missed = base - self.journal_cursor,
                "journal compacted past this scene"
            );
            self.journal_cursor = base;
        }
        let shown: HashSet<NodeId> = self.store.snapshot().topology.node_set();
        let start = (self.journal_cursor - base) as usize;
        for m in &journal[start..] {
            match *m {
                Mutation::Linked { node, target } => {
                    let visible = shown.contains(&node) || self.pending.contains(&node);
                    if visible
                        && !self.hidden.contains(&node)
                        && !self.hidden.contains(&target)
                        && !self.pending.contains(&target)
                    {
                        self.pending.push(target);
                    }
                }
                Mutation::Freed { node } => {
                    self.pending.retain(|n| *n != node);
                    self.roots.retain(|n| *n != node);
                    self.hidden.remove(&node);
                    self.router.forget_node(node);
                }
                Mutation::Created { .. } | Mutation::Relabeled { .. } | Mutation::Unlinked { .. } => {}
            }
        }
        self.journal_cursor = end;
    }

    fn seeds(&self) -> Vec<NodeId> {
        if self.config.retain_unreachable {
            return self.store.snapshot().topology.nodes.clone();
        }
        let mut seeds = self.roots.clone();
        for n in self.router.positions() {
            if !seeds.contains(&n) {
                seeds.push(n);
            }
        }
        seeds
    }

    /// Walks `source`, lays out if the topology changed, settles highlights and commits.
    ///
    /// On error nothing is committed and pending additions are kept for the next attempt.
    #[tracing::instrument(skip_all, fields(commit = self.store.commits()))]
    pub fn render<A: Adjacency + ?Sized>(&mut self, source: &A) -> Result<RenderOutcome> {
        self.drain_journal(source);

        let previous = self.seeds();
        let walk = topology::walk(
            source,
            WalkSeeds {
                previous: &previous,
                added: &self.pending,
                removed: &self.hidden,
            },
            self.config.directed,
        );
        let old = self.store.snapshot();
        let diff = TopologyDiff::between(&old.topology, &walk.topology);
        tracing::debug!(
            nodes = walk.topology.nodes.len(),
            appeared = diff.appeared_nodes.len() + diff.appeared_edges.len(),
            disappeared = diff.disappeared_nodes.len() + diff.disappeared_edges.len(),
            "walked scene"
        );

        let layout: SceneLayout = if diff.is_empty() && self.store.commits() > 0 {
            old.layout.clone()
        } else {
            self.adapter.resolve(
                &walk.topology,
                &walk.labels,
                self.config.directed,
                self.config.rankdir,
            )?
        };

        let mut stacks = self.store.stacks().clone();
        let mut router = self.router.clone();
        router.resolve_deferred(&mut stacks, &walk.topology);
        let touched = router.settle(&mut stacks);

        let node_fills: HashMap<_, _> = walk
            .topology
            .nodes
            .iter()
            .map(|id| (*id, stacks.fill(Element::Node(*id), self.config.background)))
            .collect();
        let edge_strokes: HashMap<_, _> = walk
            .topology
            .edges
            .keys()
            .map(|k| {
                let stroke = match stacks.get(Element::Edge(*k)) {
                    Some(s) if !s.is_empty() => s.resolve(),
                    _ => self.config.edge_color,
                };
                (*k, stroke)
            })
            .collect();
        let new = Snapshot {
            topology: walk.topology,
            labels: walk.labels,
            node_fills,
            edge_strokes,
            layout,
        };

        let synthesis = synth::synthesize(
            &SynthesisInput {
                old,
                new: &new,
                diff: &diff,
                touched: &touched,
                node_shape: self.config.node_shape,
                directed: self.config.directed,
            },
            &self.config.animation,
        );
        self.router = router;
        self.pending.clear();

        let Some(synthesis) = synthesis else {
            tracing::debug!("scene unchanged");
            self.store.replace_stacks(stacks);
            return Ok(RenderOutcome::Unchanged);
        };

        self.store.commit(new, stacks);
        self.adapter.release(&diff);
        Ok(RenderOutcome::Changed(Frame {
            title: self.config.name.clone(),
            directives: synthesis.directives,
            resting: synthesis.resting,
            canvas: synthesis.canvas,
            annotations: Vec::new(),
            legend: super::legend(&self.palette),
        }))
    }
}

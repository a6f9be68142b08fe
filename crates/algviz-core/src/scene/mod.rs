//! Scenes: one render pipeline per displayed structure.

mod graph;
mod table;
mod vector;

pub use graph::GraphScene;
pub use table::TableScene;
pub use vector::{IndexCursor, VectorScene};

use crate::arena::NodeId;
use crate::color::{Palette, Rgb};
use crate::config::AnimationConfig;
use crate::directive::{Annotation, Frame, LegendEntry, RenderOutcome, ShapeKind};
use crate::layout::SceneLayout;
use crate::store::{SceneStore, Snapshot};
use crate::synth::{self, SynthesisInput};
use crate::topology::{Topology, TopologyDiff};
use crate::trace::{Element, TraceRouter};
use rustc_hash::FxHashMap as HashMap;

/// Trace handle over table cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellCursor {
    color: Rgb,
    hold: bool,
    name: Option<String>,
}

impl CellCursor {
    pub(crate) fn new(color: Rgb, hold: bool, name: Option<&str>) -> Self {
        Self {
            color,
            hold,
            name: name.map(str::to_string),
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
}

/// Per-scene style of a cell frame.
pub(crate) struct CellStyle<'a> {
    pub title: Option<&'a str>,
    pub background: Rgb,
    pub shape: ShapeKind,
    pub animation: &'a AnimationConfig,
    pub annotations: Vec<Annotation>,
}

/// Settles highlights and commits a cell scene whose layout is computed by the caller.
pub(crate) fn render_cells(
    store: &mut SceneStore,
    router: &mut TraceRouter,
    palette: &Palette,
    cells: Vec<(NodeId, String)>,
    layout: SceneLayout,
    style: CellStyle<'_>,
) -> RenderOutcome {
    let topology = Topology {
        nodes: cells.iter().map(|(id, _)| *id).collect(),
        ..Default::default()
    };
    let labels: HashMap<NodeId, String> = cells.into_iter().collect();

    let mut stacks = store.stacks().clone();
    let touched = router.settle(&mut stacks);
    let node_fills = topology
        .nodes
        .iter()
        .map(|id| (*id, stacks.fill(Element::Node(*id), style.background)))
        .collect();
    let new = Snapshot {
        topology,
        labels,
        node_fills,
        edge_strokes: HashMap::default(),
        layout,
    };

    let old = store.snapshot();
    let diff = TopologyDiff::between(&old.topology, &new.topology);
    let synthesis = synth::synthesize(
        &SynthesisInput {
            old,
            new: &new,
            diff: &diff,
            touched: &touched,
            node_shape: style.shape,
            directed: false,
        },
        style.animation,
    );
    let Some(synthesis) = synthesis else {
        store.replace_stacks(stacks);
        return RenderOutcome::Unchanged;
    };
    store.commit(new, stacks);
    RenderOutcome::Changed(Frame {
        title: style.title.map(str::to_string),
        directives: synthesis.directives,
        resting: synthesis.resting,
        canvas: synthesis.canvas,
        annotations: style.annotations,
        legend: legend(palette),
    })
}

pub(crate) fn legend(palette: &Palette) -> Vec<LegendEntry> {
    palette
        .legend()
        .into_iter()
        .map(|(color, name)| LegendEntry { name, color })
        .collect()
}

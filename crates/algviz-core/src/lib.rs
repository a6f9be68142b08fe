#![forbid(unsafe_code)]

//! Incremental scene differ and animation synthesizer for algviz.
//!
//! A render cycle walks the caller's structure through [`Adjacency`], lays the topology out
//! when it changed, settles trace highlights and diffs the result against the committed
//! [`Snapshot`]. The outcome is either [`RenderOutcome::Unchanged`] or a [`Frame`] of ordered
//! [`Directive`]s for a presentation sink.

pub mod arena;
pub mod color;
pub mod config;
pub mod directive;
pub mod error;
pub mod geom;
pub mod identity;
pub mod layout;
pub mod scene;
pub mod store;
pub mod synth;
pub mod topology;
pub mod trace;

pub use arena::{Adjacency, Link, Mutation, NodeArena, NodeId};
pub use color::{ColorStack, DEFAULT_TRACE_COLORS, Palette, Rgb};
pub use config::{AnimationConfig, SceneConfig, TableConfig, VectorConfig, VisualizerConfig};
pub use directive::{
    Annotation, Canvas, Directive, DirectiveKind, EdgeShape, Frame, LegendEntry, MotionPath,
    NodeShape, RenderOutcome, Shape, ShapeKind, TimeWindow,
};
pub use error::{CellIndex, Error, Result};
pub use identity::IdentityMap;
pub use layout::{
    LayoutEdge, LayoutEngine, LayoutError, LayoutNode, LayoutRequest, LayoutResponse, PlacedNode,
    RankDir, SceneLayout,
};
pub use scene::{CellCursor, GraphScene, IndexCursor, TableScene, VectorScene};
pub use store::{SceneStore, Snapshot};
pub use topology::{EdgeKey, Topology, TopologyDiff};
pub use trace::{ColorStacks, Element, TraceCursor, TraceRouter};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

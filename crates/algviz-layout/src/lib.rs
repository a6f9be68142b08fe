#![forbid(unsafe_code)]

//! Layered graph layout for algviz scenes.
//!
//! The pipeline follows the shape of dagre's layout with the expensive stages replaced by
//! deterministic, lightweight passes:
//! - [`acyclic`]: reverse a DFS feedback arc set so ranking sees a DAG
//! - [`rank`]: longest-path ranking in Kahn order
//! - [`order`]: barycenter sweeps that keep the ordering with the fewest crossings
//! - [`position`]: centered ranks, straight edge routes and rank-direction transforms
//!
//! Node and edge ids are the caller's compact integer ids; output is written back into the
//! node and edge labels of the [`Graph`].

pub mod acyclic;
pub mod graph;
pub mod order;
pub mod position;
pub mod rank;

pub use graph::{EdgeKey, Graph, GraphOptions};
pub use position::bounds;

use serde::{Deserialize, Serialize};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("edge {edge} references undeclared node {node}")]
    UnknownNode { edge: u32, node: u32 },
    #[error("node {node} has a non-finite or negative size ({width} x {height})")]
    InvalidSize { node: u32, width: f64, height: f64 },
    #[error("invalid graph spacing: {message}")]
    InvalidSpacing { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankDir {
    #[default]
    TB,
    BT,
    LR,
    RL,
}

impl RankDir {
    pub fn is_horizontal(self) -> bool {
        matches!(self, RankDir::LR | RankDir::RL)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphLabel {
    pub rankdir: RankDir,
    pub nodesep: f64,
    pub ranksep: f64,
    pub edgesep: f64,
    /// Empty space kept between the drawing and the origin.
    pub margin: f64,
}

impl Default for GraphLabel {
    fn default() -> Self {
        Self {
            rankdir: RankDir::TB,
            nodesep: 50.0,
            ranksep: 50.0,
            edgesep: 10.0,
            margin: 8.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeLabel {
    pub width: f64,
    pub height: f64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rank: Option<usize>,
    pub order: Option<usize>,
}

impl NodeLabel {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLabel {
    pub width: f64,
    pub height: f64,
    pub minlen: usize,
    pub weight: f64,
    pub reversed: bool,

    pub x: Option<f64>,
    pub y: Option<f64>,
    pub points: Vec<Point>,
}

impl Default for EdgeLabel {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            minlen: 1,
            weight: 1.0,
            reversed: false,
            x: None,
            y: None,
            points: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Runs the full layout pipeline and writes coordinates into `g`.
///
/// On error the graph is left untouched.
pub fn layout(g: &mut Graph) -> Result<()> {
    validate(g)?;

    acyclic::run(g);
    rank::longest_path(g);
    order::order(g);
    position::position(g);
    acyclic::undo(g);
    Ok(())
}

fn validate(g: &Graph) -> Result<()> {
    let label = g.graph();
    for (name, v) in [
        ("nodesep", label.nodesep),
        ("ranksep", label.ranksep),
        ("edgesep", label.edgesep),
        ("margin", label.margin),
    ] {
        if !v.is_finite() || v < 0.0 {
            return Err(Error::InvalidSpacing {
                message: format!("{name} = {v}"),
            });
        }
    }

    for id in g.node_ids() {
        let Some(n) = g.node(id) else {
            continue;
        };
        let ok = n.width.is_finite() && n.height.is_finite() && n.width >= 0.0 && n.height >= 0.0;
        if !ok {
            return Err(Error::InvalidSize {
                node: id,
                width: n.width,
                height: n.height,
            });
        }
    }

    for e in g.edges() {
        for node in [e.v, e.w] {
            if !g.has_node(node) {
                return Err(Error::UnknownNode { edge: e.id, node });
            }
        }
    }
    Ok(())
}

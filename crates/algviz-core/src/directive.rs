//! Output contract of a render: directives, resting shapes and the canvas.

use crate::arena::NodeId;
use crate::color::Rgb;
use crate::geom::{Box2, Point, Vector};
use crate::topology::EdgeKey;
use crate::trace::Element;
use serde::{Deserialize, Serialize};

/// Seconds, relative to the start of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub begin: f64,
    pub duration: f64,
}

impl TimeWindow {
    pub const INSTANT: TimeWindow = TimeWindow {
        begin: 0.0,
        duration: 0.0,
    };

    pub fn new(begin: f64, duration: f64) -> Self {
        Self { begin, duration }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionPath {
    #[default]
    Straight,
    Curved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Circle,
    RoundedRect,
    Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeShape {
    pub center: Point,
    pub width: f64,
    pub height: f64,
    pub kind: ShapeKind,
    pub label: String,
    pub fill: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeShape {
    pub path: Vec<Point>,
    pub label: Option<String>,
    pub stroke: Rgb,
    pub directed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Node(NodeShape),
    Edge(EdgeShape),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    FadeIn,
    FadeOut,
    Translate,
    Redraw,
    Recolor,
    Relabel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    FadeIn {
        target: Element,
        shape: Shape,
        window: TimeWindow,
    },
    FadeOut {
        target: Element,
        shape: Shape,
        window: TimeWindow,
    },
    Translate {
        node: NodeId,
        delta: Vector,
        motion: MotionPath,
        window: TimeWindow,
    },
    /// Edge re-routed because an endpoint moved or its path changed.
    Redraw {
        edge: EdgeKey,
        from: Vec<Point>,
        to: Vec<Point>,
        window: TimeWindow,
    },
    Recolor {
        target: Element,
        color: Rgb,
        window: TimeWindow,
    },
    Relabel {
        target: Element,
        label: Option<String>,
        window: TimeWindow,
    },
}

impl Directive {
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::FadeIn { .. } => DirectiveKind::FadeIn,
            Directive::FadeOut { .. } => DirectiveKind::FadeOut,
            Directive::Translate { .. } => DirectiveKind::Translate,
            Directive::Redraw { .. } => DirectiveKind::Redraw,
            Directive::Recolor { .. } => DirectiveKind::Recolor,
            Directive::Relabel { .. } => DirectiveKind::Relabel,
        }
    }

    pub fn target(&self) -> Element {
        match self {
            Directive::FadeIn { target, .. }
            | Directive::FadeOut { target, .. }
            | Directive::Recolor { target, .. }
            | Directive::Relabel { target, .. } => *target,
            Directive::Translate { node, .. } => Element::Node(*node),
            Directive::Redraw { edge, .. } => Element::Edge(*edge),
        }
    }

    pub fn window(&self) -> TimeWindow {
        match self {
            Directive::FadeIn { window, .. }
            | Directive::FadeOut { window, .. }
            | Directive::Translate { window, .. }
            | Directive::Redraw { window, .. }
            | Directive::Recolor { window, .. }
            | Directive::Relabel { window, .. } => *window,
        }
    }
}

/// Drawing area of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub old: Box2,
    pub new: Box2,
    /// Extent covering both, used while the animation runs.
    pub animated: Box2,
}

/// Text drawn outside any element, such as table indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub position: Point,
    pub text: String,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub name: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub title: Option<String>,
    pub directives: Vec<Directive>,
    /// Elements present before and after the frame, drawn at their starting geometry with
    /// their final style.
    pub resting: Vec<(Element, Shape)>,
    pub canvas: Canvas,
    pub annotations: Vec<Annotation>,
    pub legend: Vec<LegendEntry>,
}

impl Frame {
    pub fn count(&self, kind: DirectiveKind) -> usize {
        self.directives.iter().filter(|d| d.kind() == kind).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Unchanged,
    Changed(Frame),
}

impl RenderOutcome {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, RenderOutcome::Unchanged)
    }

    pub fn frame(&self) -> Option<&Frame> {
        match self {
            RenderOutcome::Changed(frame) => Some(frame),
            RenderOutcome::Unchanged => None,
        }
    }
}

//! Animation synthesis.
//!
//! Compares the committed snapshot with the freshly computed one and emits the directives of
//! one frame. Classification goes by identity only. Directives come out grouped as fade-outs
//! (nodes, then edges), translates, redraws, fade-ins (nodes, then edges), recolors and
//! relabels; within a group they follow walk order.

use crate::arena::NodeId;
use crate::config::AnimationConfig;
use crate::directive::{Canvas, Directive, EdgeShape, NodeShape, Shape, ShapeKind, TimeWindow};
use crate::geom::{same_path, union};
use crate::store::Snapshot;
use crate::topology::{EdgeKey, TopologyDiff};
use crate::trace::Element;
use rustc_hash::FxHashSet as HashSet;

#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    pub old: &'a Snapshot,
    pub new: &'a Snapshot,
    pub diff: &'a TopologyDiff,
    /// Elements whose highlight state changed this frame.
    pub touched: &'a [Element],
    pub node_shape: ShapeKind,
    pub directed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub directives: Vec<Directive>,
    pub resting: Vec<(Element, Shape)>,
    pub canvas: Canvas,
}

pub fn node_shape(snapshot: &Snapshot, id: NodeId, kind: ShapeKind) -> Option<NodeShape> {
    let placed = snapshot.layout.nodes.get(&id)?;
    Some(NodeShape {
        center: placed.center,
        width: placed.width,
        height: placed.height,
        kind,
        label: snapshot.label(id).unwrap_or_default().to_string(),
        fill: snapshot.color(Element::Node(id))?,
    })
}

pub fn edge_shape(snapshot: &Snapshot, key: &EdgeKey, directed: bool) -> Option<EdgeShape> {
    Some(EdgeShape {
        path: snapshot.layout.edges.get(key)?.clone(),
        label: snapshot.edge_label(key).map(str::to_string),
        stroke: snapshot.color(Element::Edge(*key))?,
        directed,
    })
}

/// Directives turning `old` into `new`, or `None` when nothing visible changed.
pub fn synthesize(input: &SynthesisInput<'_>, animation: &AnimationConfig) -> Option<Synthesis> {
    let SynthesisInput {
        old,
        new,
        diff,
        touched,
        node_shape: kind,
        directed,
    } = *input;
    let window = TimeWindow::new(0.0, animation.delay);

    let appeared_nodes: HashSet<NodeId> = diff.appeared_nodes.iter().copied().collect();
    let appeared_edges: HashSet<EdgeKey> = diff.appeared_edges.iter().copied().collect();
    let kept_nodes: Vec<NodeId> = new
        .topology
        .nodes
        .iter()
        .copied()
        .filter(|n| !appeared_nodes.contains(n))
        .collect();
    let kept_edges: Vec<EdgeKey> = new
        .topology
        .edges
        .keys()
        .copied()
        .filter(|k| !appeared_edges.contains(k))
        .collect();

    let mut fade_outs = Vec::new();
    for id in &diff.disappeared_nodes {
        if let Some(shape) = node_shape(old, *id, kind) {
            fade_outs.push(Directive::FadeOut {
                target: Element::Node(*id),
                shape: Shape::Node(shape),
                window,
            });
        }
    }
    for key in &diff.disappeared_edges {
        if let Some(shape) = edge_shape(old, key, directed) {
            fade_outs.push(Directive::FadeOut {
                target: Element::Edge(*key),
                shape: Shape::Edge(shape),
                window,
            });
        }
    }

    let mut moved: HashSet<NodeId> = HashSet::default();
    let mut translates = Vec::new();
    for id in &kept_nodes {
        let (Some(from), Some(to)) = (old.layout.nodes.get(id), new.layout.nodes.get(id)) else {
            continue;
        };
        let delta = to.center - from.center;
        if delta.length() > animation.movement_epsilon {
            moved.insert(*id);
            translates.push(Directive::Translate {
                node: *id,
                delta,
                motion: animation.motion,
                window,
            });
        }
    }

    let mut redraws = Vec::new();
    for key in &kept_edges {
        let (Some(from), Some(to)) = (old.layout.edges.get(key), new.layout.edges.get(key)) else {
            continue;
        };
        let endpoint_moved = moved.contains(&key.source) || moved.contains(&key.target);
        if endpoint_moved || !same_path(from, to, animation.movement_epsilon) {
            redraws.push(Directive::Redraw {
                edge: *key,
                from: from.clone(),
                to: to.clone(),
                window,
            });
        }
    }

    let mut fade_ins = Vec::new();
    for id in &diff.appeared_nodes {
        if let Some(shape) = node_shape(new, *id, kind) {
            fade_ins.push(Directive::FadeIn {
                target: Element::Node(*id),
                shape: Shape::Node(shape),
                window,
            });
        }
    }
    for key in &diff.appeared_edges {
        if let Some(shape) = edge_shape(new, key, directed) {
            fade_ins.push(Directive::FadeIn {
                target: Element::Edge(*key),
                shape: Shape::Edge(shape),
                window,
            });
        }
    }

    let kept: Vec<Element> = kept_nodes
        .iter()
        .map(|n| Element::Node(*n))
        .chain(kept_edges.iter().map(|k| Element::Edge(*k)))
        .collect();
    let kept_set: HashSet<Element> = kept.iter().copied().collect();

    let mut recolor_targets: Vec<Element> = kept
        .iter()
        .copied()
        .filter(|e| old.color(*e) != new.color(*e))
        .collect();
    for e in touched {
        if kept_set.contains(e) && !recolor_targets.contains(e) {
            recolor_targets.push(*e);
        }
    }
    let recolors = recolor_targets.into_iter().filter_map(|target| {
        Some(Directive::Recolor {
            target,
            color: new.color(target)?,
            window: TimeWindow::INSTANT,
        })
    });

    let mut relabels = Vec::new();
    for id in &kept_nodes {
        if old.label(*id) != new.label(*id) {
            relabels.push(Directive::Relabel {
                target: Element::Node(*id),
                label: new.label(*id).map(str::to_string),
                window: TimeWindow::INSTANT,
            });
        }
    }
    for key in &kept_edges {
        if old.edge_label(key) != new.edge_label(key) {
            relabels.push(Directive::Relabel {
                target: Element::Edge(*key),
                label: new.edge_label(key).map(str::to_string),
                window: TimeWindow::INSTANT,
            });
        }
    }

    let mut directives = fade_outs;
    directives.extend(translates);
    directives.extend(redraws);
    directives.extend(fade_ins);
    directives.extend(recolors);
    directives.extend(relabels);
    if directives.is_empty() {
        return None;
    }

    // Kept elements start the animation where they were and carry their new style.
    let mut resting = Vec::with_capacity(kept.len());
    for id in &kept_nodes {
        let Some(mut shape) = node_shape(new, *id, kind) else {
            continue;
        };
        if let Some(from) = old.layout.nodes.get(id) {
            shape.center = from.center;
        }
        resting.push((Element::Node(*id), Shape::Node(shape)));
    }
    for key in &kept_edges {
        let Some(mut shape) = edge_shape(new, key, directed) else {
            continue;
        };
        if let Some(from) = old.layout.edges.get(key) {
            shape.path = from.clone();
        }
        resting.push((Element::Edge(*key), Shape::Edge(shape)));
    }

    let canvas = Canvas {
        old: old.layout.bounds,
        new: new.layout.bounds,
        animated: union(&old.layout.bounds, &new.layout.bounds),
    };
    Some(Synthesis {
        directives,
        resting,
        canvas,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::directive::DirectiveKind;
    use crate::geom::point;
    use crate::layout::PlacedNode;

    fn n(raw: u64) -> NodeId {
        NodeId::from_raw(raw)
    }

    fn snapshot(nodes: &[(u64, f64, f64)]) -> Snapshot {
        let mut s = Snapshot::default();
        for &(id, x, y) in nodes {
            s.topology.nodes.push(n(id));
            s.labels.insert(n(id), id.to_string());
            s.node_fills.insert(n(id), Rgb::WHITE);
            s.layout.nodes.insert(
                n(id),
                PlacedNode {
                    center: point(x, y),
                    width: 30.0,
                    height: 30.0,
                },
            );
        }
        s.layout.compute_bounds();
        s
    }

    fn run(old: &Snapshot, new: &Snapshot) -> Option<Synthesis> {
        let diff = TopologyDiff::between(&old.topology, &new.topology);
        synthesize(
            &SynthesisInput {
                old,
                new,
                diff: &diff,
                touched: &[],
                node_shape: ShapeKind::Circle,
                directed: true,
            },
            &AnimationConfig::default(),
        )
    }

    #[test]
    fn identical_snapshots_are_unchanged() {
        let s = snapshot(&[(0, 10.0, 10.0)]);
        assert_eq!(run(&s, &s), None);
    }

    #[test]
    fn movement_threshold_is_exclusive() {
        let old = snapshot(&[(0, 10.0, 10.0)]);
        let eps = AnimationConfig::default().movement_epsilon;

        let within = snapshot(&[(0, 10.0 + eps, 10.0)]);
        assert_eq!(run(&old, &within), None);

        let beyond = snapshot(&[(0, 10.0 + eps + 0.0001, 10.0)]);
        let s = run(&old, &beyond).expect("moved");
        assert_eq!(s.directives.len(), 1);
        assert_eq!(s.directives[0].kind(), DirectiveKind::Translate);
    }

    #[test]
    fn resting_nodes_start_from_their_old_position() {
        let old = snapshot(&[(0, 10.0, 10.0), (1, 60.0, 10.0)]);
        let new = snapshot(&[(0, 10.0, 10.0), (1, 60.0, 80.0)]);
        let s = run(&old, &new).expect("moved");
        let Some((_, Shape::Node(shape))) = s.resting.iter().find(|(e, _)| *e == Element::Node(n(1)))
        else {
            panic!("node 1 should rest");
        };
        assert_eq!(shape.center, point(60.0, 10.0));
        assert!(s.canvas.animated.max.y >= 95.0);
    }

    fn with_edge(mut s: Snapshot, source: u64, target: u64, label: &str) -> Snapshot {
        let key = EdgeKey::new(n(source), n(target));
        let path: Vec<_> = [source, target]
            .iter()
            .filter_map(|id| s.layout.nodes.get(&n(*id)).map(|p| p.center))
            .collect();
        s.topology.edges.insert(key, Some(label.to_string()));
        s.edge_strokes.insert(key, Rgb::new(123, 123, 123));
        s.layout.edges.insert(key, path);
        s
    }

    #[test]
    fn edges_follow_a_moved_endpoint() {
        let old = with_edge(snapshot(&[(1, 10.0, 10.0), (2, 60.0, 10.0)]), 1, 2, "5");
        let new = with_edge(snapshot(&[(1, 10.0, 80.0), (2, 60.0, 10.0)]), 1, 2, "5");
        let s = run(&old, &new).expect("moved");

        let kinds: Vec<DirectiveKind> = s.directives.iter().map(Directive::kind).collect();
        assert_eq!(kinds, vec![DirectiveKind::Translate, DirectiveKind::Redraw]);
        assert_eq!(
            s.directives[1],
            Directive::Redraw {
                edge: EdgeKey::new(n(1), n(2)),
                from: vec![point(10.0, 10.0), point(60.0, 10.0)],
                to: vec![point(10.0, 80.0), point(60.0, 10.0)],
                window: TimeWindow::new(0.0, AnimationConfig::default().delay),
            }
        );
        let edge = s
            .resting
            .iter()
            .find_map(|(e, shape)| match (e, shape) {
                (Element::Edge(_), Shape::Edge(edge)) => Some(edge),
                _ => None,
            })
            .expect("edge rests");
        assert_eq!(edge.label.as_deref(), Some("5"));
        assert_eq!(edge.path, vec![point(10.0, 10.0), point(60.0, 10.0)]);
    }

    #[test]
    fn relabel_counts_as_change() {
        let old = snapshot(&[(0, 10.0, 10.0)]);
        let mut new = old.clone();
        new.labels.insert(n(0), "x".to_string());
        let s = run(&old, &new).expect("relabeled");
        assert_eq!(
            s.directives,
            vec![Directive::Relabel {
                target: Element::Node(n(0)),
                label: Some("x".to_string()),
                window: TimeWindow::INSTANT,
            }]
        );
    }
}

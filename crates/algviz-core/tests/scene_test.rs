mod common;

use algviz_core::geom::vector;
use algviz_core::{
    DEFAULT_TRACE_COLORS, Directive, DirectiveKind, EdgeKey, Element, Error, GraphScene,
    LayoutError, NodeArena, NodeId, RenderOutcome, Rgb, SceneConfig,
};
use common::{ColumnEngine, ROW};

fn scene(engine: &ColumnEngine) -> GraphScene {
    common::init_tracing();
    GraphScene::new(SceneConfig::default(), engine.boxed()).expect("scene")
}

fn chain(arena: &mut NodeArena) -> (NodeId, NodeId, NodeId) {
    let a = arena.list_from(["A", "B", "C"]).expect("head");
    let b = arena.next(a).expect("B");
    let c = arena.next(b).expect("C");
    (a, b, c)
}

fn frame_of(outcome: RenderOutcome) -> algviz_core::Frame {
    match outcome {
        RenderOutcome::Changed(frame) => frame,
        RenderOutcome::Unchanged => panic!("expected a changed frame"),
    }
}

#[test]
fn chain_removal_fades_out_and_slides_up() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let (a, b, c) = chain(&mut arena);
    let mut scene = scene(&engine);
    scene.add_node(a);

    let first = frame_of(scene.render(&arena).expect("render"));
    assert_eq!(first.count(DirectiveKind::FadeIn), 5);
    assert_eq!(scene.snapshot().topology.nodes, vec![a, b, c]);

    arena.set_next(a, Some(c));
    scene.remove_node(b);
    let frame = frame_of(scene.render(&arena).expect("render"));

    let summary: Vec<(DirectiveKind, Element)> = frame
        .directives
        .iter()
        .map(|d| (d.kind(), d.target()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (DirectiveKind::FadeOut, Element::Node(b)),
            (DirectiveKind::FadeOut, Element::Edge(EdgeKey::new(a, b))),
            (DirectiveKind::FadeOut, Element::Edge(EdgeKey::new(b, c))),
            (DirectiveKind::Translate, Element::Node(c)),
            (DirectiveKind::FadeIn, Element::Edge(EdgeKey::new(a, c))),
        ]
    );
    let Directive::Translate { delta, .. } = &frame.directives[3] else {
        panic!("translate expected");
    };
    assert_eq!(*delta, vector(0.0, -ROW));

    assert!(scene.render(&arena).expect("render").is_unchanged());
}

#[test]
fn unchanged_render_skips_layout() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let (a, _, _) = chain(&mut arena);
    let mut scene = scene(&engine);
    scene.add_node(a);
    scene.render(&arena).expect("render");
    assert_eq!(engine.calls.get(), 1);

    assert!(scene.render(&arena).expect("render").is_unchanged());
    arena.set_label(a, "A2");
    let frame = frame_of(scene.render(&arena).expect("render"));
    assert_eq!(frame.count(DirectiveKind::Relabel), 1);
    assert_eq!(engine.calls.get(), 1);
}

#[test]
fn walk_is_deterministic_across_scenes() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let root = arena
        .tree_from_level_order(&[Some("1"), Some("2"), Some("3"), None, Some("5")])
        .expect("root");

    let mut first = scene(&engine);
    let mut second = scene(&engine);
    first.add_node(root);
    second.add_node(root);
    first.render(&arena).expect("render");
    second.render(&arena).expect("render");
    assert_eq!(first.snapshot(), second.snapshot());
    assert!(first.render(&arena).expect("render").is_unchanged());
}

#[test]
fn linking_a_new_node_shows_it() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let (a, _, c) = chain(&mut arena);
    let mut scene = scene(&engine);
    scene.add_node(a);
    scene.render(&arena).expect("render");

    let d = arena.list_node("D");
    arena.set_next(c, Some(d));
    let frame = frame_of(scene.render(&arena).expect("render"));
    let fade_ins: Vec<Element> = frame
        .directives
        .iter()
        .filter(|d| d.kind() == DirectiveKind::FadeIn)
        .map(|d| d.target())
        .collect();
    assert_eq!(
        fade_ins,
        vec![Element::Node(d), Element::Edge(EdgeKey::new(c, d))]
    );
}

#[test]
fn freed_node_fades_out() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let (a, b, c) = chain(&mut arena);
    let mut scene = scene(&engine);
    scene.add_node(a);
    scene.render(&arena).expect("render");

    arena.set_next(b, None);
    arena.free(c);
    let frame = frame_of(scene.render(&arena).expect("render"));
    assert_eq!(frame.count(DirectiveKind::FadeOut), 2);
    assert_eq!(scene.snapshot().topology.nodes, vec![a, b]);
}

#[test]
fn unreachable_nodes_persist_unless_pruned() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let (a, b, c) = chain(&mut arena);

    let mut retained = scene(&engine);
    retained.add_node(a);
    let mut pruned = GraphScene::new(
        SceneConfig {
            retain_unreachable: false,
            ..Default::default()
        },
        engine.boxed(),
    )
    .expect("scene");
    pruned.track_root(a);
    retained.render(&arena).expect("render");
    pruned.render(&arena).expect("render");

    arena.set_next(a, None);
    let frame = frame_of(retained.render(&arena).expect("render"));
    assert_eq!(frame.count(DirectiveKind::FadeOut), 1, "only the edge A-B goes");
    assert_eq!(retained.snapshot().topology.nodes, vec![a, b, c]);

    pruned.render(&arena).expect("render");
    assert_eq!(pruned.snapshot().topology.nodes, vec![a]);
}

#[test]
fn transient_trace_highlight_expires_after_one_frame() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let (a, _, _) = chain(&mut arena);
    let mut scene = scene(&engine);
    scene.add_node(a);
    scene.render(&arena).expect("render");

    let mut cursor = scene.create_trace(Some("p"), false).expect("trace");
    scene.visit(&mut cursor, a);
    let frame = frame_of(scene.render(&arena).expect("render"));
    assert_eq!(
        frame.directives,
        vec![Directive::Recolor {
            target: Element::Node(a),
            color: DEFAULT_TRACE_COLORS[0],
            window: algviz_core::TimeWindow::INSTANT,
        }]
    );
    assert_eq!(frame.legend.len(), 1);
    assert_eq!(frame.legend[0].name, "p");

    let frame = frame_of(scene.render(&arena).expect("render"));
    assert_eq!(frame.count(DirectiveKind::Recolor), 1);
    assert_eq!(
        scene.snapshot().node_fills.get(&a).copied(),
        Some(Rgb::WHITE)
    );
    assert!(scene.render(&arena).expect("render").is_unchanged());
}

#[test]
fn held_trace_marks_the_path_until_retired() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let (a, b, _) = chain(&mut arena);
    let mut scene = scene(&engine);
    scene.add_node(a);
    scene.render(&arena).expect("render");

    let mut cursor = scene.create_trace(None, true).expect("trace");
    scene.visit(&mut cursor, a);
    scene.visit(&mut cursor, b);
    assert_eq!(cursor.position(), Some(b));
    scene.render(&arena).expect("render");

    let color = cursor.color();
    let edge = EdgeKey::new(a, b);
    assert_eq!(scene.snapshot().node_fills.get(&a).copied(), Some(color));
    assert_eq!(scene.snapshot().edge_strokes.get(&edge).copied(), Some(color));
    assert!(scene.render(&arena).expect("render").is_unchanged());

    scene.retire(cursor);
    let frame = frame_of(scene.render(&arena).expect("render"));
    assert_eq!(frame.count(DirectiveKind::Recolor), 3);
    assert_eq!(
        scene.snapshot().edge_strokes.get(&edge).copied(),
        Some(SceneConfig::default().edge_color)
    );
}

#[test]
fn overlapping_traces_blend_and_retire_independently() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let (a, _, _) = chain(&mut arena);
    let mut scene = scene(&engine);
    scene.add_node(a);
    scene.render(&arena).expect("render");

    let mut first = scene.create_trace(None, true).expect("trace");
    let mut second = scene.create_trace(None, true).expect("trace");
    scene.visit(&mut first, a);
    scene.visit(&mut second, a);
    scene.render(&arena).expect("render");
    let blended = scene.snapshot().node_fills[&a];
    assert_ne!(blended, first.color());

    let second_color = second.color();
    scene.retire(first);
    scene.render(&arena).expect("render");
    assert_eq!(scene.snapshot().node_fills[&a], second_color);
}

#[test]
fn trace_overflow_leaves_stacks_untouched() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let (a, _, _) = chain(&mut arena);
    let mut scene = scene(&engine);
    scene.add_node(a);
    scene.render(&arena).expect("render");

    let cursors: Vec<_> = (0..DEFAULT_TRACE_COLORS.len())
        .map(|_| scene.create_trace(None, true).expect("trace"))
        .collect();
    let before = scene.stacks().clone();
    assert_eq!(
        scene.create_trace(None, true),
        Err(Error::TraceOverflow { capacity: 8 })
    );
    assert_eq!(scene.stacks(), &before);

    let mut iter = cursors.into_iter();
    if let Some(c) = iter.next() {
        scene.retire(c);
    }
    assert!(scene.create_trace(None, false).is_ok());
}

#[test]
fn layout_failure_keeps_the_committed_snapshot() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let (a, _, c) = chain(&mut arena);
    let mut scene = scene(&engine);
    scene.add_node(a);
    scene.render(&arena).expect("render");
    let before = scene.snapshot().clone();

    let d = arena.list_node("D");
    arena.set_next(c, Some(d));
    engine.fail.set(true);
    let err = scene.render(&arena).expect_err("layout fails");
    assert!(matches!(err, Error::Layout(LayoutError::Engine { .. })));
    assert_eq!(scene.snapshot(), &before);
    assert_eq!(scene.layout_ids().node_ids().get(&d), None);

    engine.fail.set(false);
    let frame = frame_of(scene.render(&arena).expect("render"));
    assert_eq!(frame.count(DirectiveKind::FadeIn), 2);
}

#[test]
fn undirected_hold_trace_follows_either_orientation() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let a = arena.graph_node("a");
    let b = arena.graph_node("b");
    arena.add_neighbor(a, b, Some("4".into()));
    arena.add_neighbor(b, a, Some("4".into()));

    let mut scene = GraphScene::new(
        SceneConfig {
            directed: false,
            ..Default::default()
        },
        engine.boxed(),
    )
    .expect("scene");
    scene.add_node(a);
    scene.render(&arena).expect("render");
    assert_eq!(scene.snapshot().topology.edges.len(), 1);

    let mut cursor = scene.create_trace(None, true).expect("trace");
    scene.visit(&mut cursor, b);
    scene.visit(&mut cursor, a);
    scene.render(&arena).expect("render");
    let edge = EdgeKey::new(a.min(b), a.max(b));
    assert_eq!(
        scene.snapshot().edge_strokes.get(&edge).copied(),
        Some(cursor.color())
    );
    assert_eq!(scene.snapshot().edge_label(&edge), Some("4"));
}

#[test]
fn compact_ids_are_recycled_after_commit() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let (a, b, c) = chain(&mut arena);
    let mut scene = scene(&engine);
    scene.add_node(a);
    scene.render(&arena).expect("render");
    let b_id = scene.layout_ids().node_ids().get(&b).expect("b id");

    arena.set_next(a, Some(c));
    scene.remove_node(b);
    scene.render(&arena).expect("render");
    assert_eq!(scene.layout_ids().node_ids().get(&b), None);

    let d = arena.list_node("D");
    arena.set_next(c, Some(d));
    scene.render(&arena).expect("render");
    assert_eq!(scene.layout_ids().node_ids().get(&d), Some(b_id));
}

#[test]
fn scene_keeps_reading_a_compacted_journal() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let (a, _, c) = chain(&mut arena);
    let mut scene = scene(&engine);
    scene.add_node(a);
    scene.render(&arena).expect("render");
    assert_eq!(scene.journal_position(), arena.journal_end());

    let dropped = arena.compact_journal(scene.journal_position());
    assert!(dropped > 0);
    assert!(scene.render(&arena).expect("render").is_unchanged());

    let d = arena.list_node("D");
    arena.set_next(c, Some(d));
    let frame = frame_of(scene.render(&arena).expect("render"));
    assert_eq!(frame.count(DirectiveKind::FadeIn), 2);
    assert_eq!(scene.journal_position(), arena.journal_end());
    assert!(scene.snapshot().topology.nodes.contains(&d));
}

#[test]
fn held_trace_colors_an_edge_linked_in_the_same_frame() {
    let engine = ColumnEngine::default();
    let mut arena = NodeArena::new();
    let a = arena.list_node("A");
    let mut scene = scene(&engine);
    scene.add_node(a);
    scene.render(&arena).expect("render");

    let d = arena.list_node("D");
    arena.set_next(a, Some(d));
    let mut cursor = scene.create_trace(None, true).expect("trace");
    scene.visit(&mut cursor, a);
    scene.visit(&mut cursor, d);
    scene.render(&arena).expect("render");

    let color = cursor.color();
    assert_eq!(
        scene.snapshot().edge_strokes.get(&EdgeKey::new(a, d)).copied(),
        Some(color)
    );
    assert_eq!(scene.snapshot().node_fills.get(&d).copied(), Some(color));
}

use algviz_layout::{
    EdgeLabel, Error, Graph, GraphLabel, GraphOptions, NodeLabel, RankDir, bounds, layout,
};

fn approx_gt(a: f64, b: f64) -> bool {
    a > b + 1e-6
}

fn chain(rankdir: RankDir) -> Graph {
    let mut g = Graph::new(GraphOptions::default());
    g.set_graph(GraphLabel {
        rankdir,
        ..Default::default()
    });
    for id in 0..3 {
        g.set_node(id, NodeLabel::sized(30.0, 30.0));
    }
    g.set_edge(0, 0, 1, EdgeLabel::default());
    g.set_edge(1, 1, 2, EdgeLabel::default());
    g
}

fn xy(g: &Graph, id: u32) -> (f64, f64) {
    let n = g.node(id).expect("node");
    (n.x.expect("x"), n.y.expect("y"))
}

#[test]
fn chain_is_stacked_top_to_bottom() {
    let mut g = chain(RankDir::TB);
    layout(&mut g).expect("layout ok");

    let (ax, ay) = xy(&g, 0);
    let (bx, by) = xy(&g, 1);
    let (_, cy) = xy(&g, 2);
    assert!(approx_gt(by, ay), "1 should be below 0");
    assert!(approx_gt(cy, by), "2 should be below 1");
    assert!((ax - bx).abs() < 1e-9);

    for e in g.edges() {
        let lbl = g.edge(e.id).expect("edge");
        assert!(lbl.points.len() >= 2, "edge {} should be routed", e.id);
    }
}

#[test]
fn chain_respects_lr_direction() {
    let mut g = chain(RankDir::LR);
    layout(&mut g).expect("layout ok");
    let (ax, _) = xy(&g, 0);
    let (bx, _) = xy(&g, 1);
    let (cx, _) = xy(&g, 2);
    assert!(approx_gt(bx, ax));
    assert!(approx_gt(cx, bx));
}

#[test]
fn drawing_starts_at_the_margin() {
    let mut g = chain(RankDir::BT);
    layout(&mut g).expect("layout ok");
    let b = bounds(&g).expect("bounds");
    let margin = GraphLabel::default().margin;
    assert!((b.min_x - margin).abs() < 1e-9);
    assert!((b.min_y - margin).abs() < 1e-9);
    let (_, ay) = xy(&g, 0);
    let (_, cy) = xy(&g, 2);
    assert!(approx_gt(ay, cy), "BT puts the source at the bottom");
}

#[test]
fn cycles_are_laid_out_and_keep_their_direction() {
    let mut g = chain(RankDir::TB);
    g.set_edge(2, 2, 0, EdgeLabel::default());
    layout(&mut g).expect("layout ok");

    let key = g.edge_key(2).expect("edge 2");
    assert_eq!((key.v, key.w), (2, 0));
    let lbl = g.edge(2).expect("edge 2");
    assert!(!lbl.reversed);
    let first = lbl.points.first().expect("points");
    let last = lbl.points.last().expect("points");
    let (_, ay) = xy(&g, 0);
    let (_, cy) = xy(&g, 2);
    assert!((first.y - cy).abs() < (first.y - ay).abs(), "route starts at 2");
    assert!((last.y - ay).abs() < (last.y - cy).abs(), "route ends at 0");
}

#[test]
fn binary_tree_keeps_children_in_walk_order() {
    let mut g = Graph::new(GraphOptions::default());
    for id in 0..5 {
        g.set_node(id, NodeLabel::sized(30.0, 30.0));
    }
    g.set_edge(0, 0, 1, EdgeLabel::default());
    g.set_edge(1, 1, 3, EdgeLabel::default());
    g.set_edge(2, 0, 2, EdgeLabel::default());
    g.set_edge(3, 2, 4, EdgeLabel::default());
    layout(&mut g).expect("layout ok");

    let (lx, _) = xy(&g, 1);
    let (rx, _) = xy(&g, 2);
    let (llx, _) = xy(&g, 3);
    let (rrx, _) = xy(&g, 4);
    assert!(approx_gt(rx, lx));
    assert!(approx_gt(rrx, llx));
}

#[test]
fn undeclared_endpoint_is_rejected() {
    let mut g = chain(RankDir::TB);
    g.set_edge(9, 1, 42, EdgeLabel::default());
    assert_eq!(
        layout(&mut g),
        Err(Error::UnknownNode { edge: 9, node: 42 })
    );
}

#[test]
fn non_finite_size_is_rejected() {
    let mut g = chain(RankDir::TB);
    g.set_node(1, NodeLabel::sized(f64::NAN, 10.0));
    assert!(matches!(
        layout(&mut g),
        Err(Error::InvalidSize { node: 1, .. })
    ));
}

#[test]
fn self_loop_is_routed_beside_the_node() {
    let mut g = Graph::new(GraphOptions::default());
    g.set_node(0, NodeLabel::sized(30.0, 30.0));
    g.set_edge(0, 0, 0, EdgeLabel::default());
    layout(&mut g).expect("layout ok");
    let (x, _) = xy(&g, 0);
    let lbl = g.edge(0).expect("edge");
    assert!(!lbl.points.is_empty());
    assert!(lbl.points.iter().all(|p| p.x >= x));
}

#[test]
fn two_cycle_keeps_later_edges_between_ranks() {
    // Insertion order a, c, b, d.
    let (a, c, b, d) = (0, 1, 2, 3);
    let mut g = Graph::new(GraphOptions::default());
    for id in [a, c, b, d] {
        g.set_node(id, NodeLabel::sized(30.0, 30.0));
    }
    g.set_edge(0, a, c, EdgeLabel::default());
    g.set_edge(1, a, b, EdgeLabel::default());
    g.set_edge(2, b, a, EdgeLabel::default());
    g.set_edge(3, b, c, EdgeLabel::default());
    g.set_edge(4, c, d, EdgeLabel::default());
    layout(&mut g).expect("layout ok");

    let rank = |id: u32| g.node(id).and_then(|n| n.rank).expect("rank");
    assert!(rank(b) > rank(a));
    assert!(rank(c) > rank(b));
    assert!(rank(d) > rank(c));
    let (_, cy) = xy(&g, c);
    let (_, dy) = xy(&g, d);
    assert!(approx_gt(dy, cy), "d should be below c");
}

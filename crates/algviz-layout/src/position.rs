//! Coordinate assignment and edge routing.
//!
//! Ranks are stacked along the rank axis and centered on the cross axis. Coordinates are first
//! computed top-to-bottom and then transformed for the requested [`RankDir`]; horizontal
//! directions swap node width and height while positioning so ranks are spaced by the correct
//! extent. Finally the drawing is translated so its bounding box starts at `margin`.

use crate::graph::Graph;
use crate::order::build_layers;
use crate::{Bounds, Point, RankDir};

pub fn position(g: &mut Graph) {
    let graph = g.graph().clone();
    let rankdir = graph.rankdir;
    let node_ids = g.node_ids();
    let edge_keys = g.edge_keys();

    let mut ranks = build_layers(g);
    for layer in &mut ranks {
        layer.sort_by_key(|&id| g.node(id).and_then(|n| n.order).unwrap_or(0));
    }

    let node_size = |g: &Graph, id: u32| -> (f64, f64) {
        match g.node(id) {
            Some(n) if rankdir.is_horizontal() => (n.height, n.width),
            Some(n) => (n.width, n.height),
            None => (0.0, 0.0),
        }
    };

    let mut rank_heights: Vec<f64> = Vec::with_capacity(ranks.len());
    let mut rank_widths: Vec<f64> = Vec::with_capacity(ranks.len());
    for ids in &ranks {
        let mut h: f64 = 0.0;
        let mut w: f64 = 0.0;
        for (i, &id) in ids.iter().enumerate() {
            let (nw, nh) = node_size(g, id);
            h = h.max(nh);
            w += nw;
            if i + 1 < ids.len() {
                w += graph.nodesep;
            }
        }
        rank_heights.push(h);
        rank_widths.push(w);
    }
    let max_rank_width = rank_widths.iter().copied().fold(0.0_f64, f64::max);

    let mut y_cursor: f64 = 0.0;
    for (rank_idx, ids) in ranks.iter().enumerate() {
        let rank_h = rank_heights[rank_idx];
        let y = y_cursor + rank_h / 2.0;

        let mut x_cursor = (max_rank_width - rank_widths[rank_idx]) / 2.0;
        for &id in ids {
            let (nw, _) = node_size(g, id);
            let x = x_cursor + nw / 2.0;
            if let Some(n) = g.node_mut(id) {
                n.x = Some(x);
                n.y = Some(y);
            }
            x_cursor += nw + graph.nodesep;
        }

        y_cursor += rank_h;
        if rank_idx + 1 < ranks.len() {
            y_cursor += graph.ranksep;
        }
    }
    let total_height = y_cursor;

    for e in &edge_keys {
        let center = |id: u32| {
            g.node(id)
                .map(|n| (n.x.unwrap_or(0.0), n.y.unwrap_or(0.0)))
                .unwrap_or((0.0, 0.0))
        };
        let (sx, sy) = center(e.v);
        let (tx, ty) = center(e.w);
        let (sw, sh) = node_size(g, e.v);
        let (_, th) = node_size(g, e.w);

        let Some(lbl) = g.edge_mut(e.id) else {
            continue;
        };
        lbl.points.clear();
        lbl.x = None;
        lbl.y = None;

        if e.v == e.w {
            let x0 = sx + sw / 2.0;
            let x1 = x0 + graph.edgesep.max(1.0) * 2.0;
            let y_top = sy - sh / 4.0;
            let y_bot = sy + sh / 4.0;
            lbl.points.extend([
                Point { x: x0, y: y_top },
                Point { x: x1, y: y_top },
                Point { x: x1, y: y_bot },
                Point { x: x0, y: y_bot },
            ]);
            continue;
        }

        let start = Point {
            x: sx,
            y: sy + sh / 2.0,
        };
        let end = Point {
            x: tx,
            y: ty - th / 2.0,
        };

        let minlen = lbl.minlen.max(1);
        let count = 2 * minlen + 1;
        for i in 0..count {
            let t = (i as f64) / ((count - 1) as f64);
            lbl.points.push(Point {
                x: start.x + (end.x - start.x) * t,
                y: start.y + (end.y - start.y) * t,
            });
        }
        if let Some(mid) = lbl.points.get(count / 2).copied() {
            lbl.x = Some(mid.x);
            lbl.y = Some(mid.y);
        }
    }

    let transform = |p: Point| -> Point {
        match rankdir {
            RankDir::TB => p,
            RankDir::BT => Point {
                x: p.x,
                y: total_height - p.y,
            },
            RankDir::LR => Point { x: p.y, y: p.x },
            RankDir::RL => Point {
                x: total_height - p.y,
                y: p.x,
            },
        }
    };

    if rankdir != RankDir::TB {
        for &id in &node_ids {
            if let Some(n) = g.node_mut(id) {
                let (Some(x), Some(y)) = (n.x, n.y) else {
                    continue;
                };
                let p = transform(Point { x, y });
                n.x = Some(p.x);
                n.y = Some(p.y);
            }
        }
        for e in &edge_keys {
            if let Some(lbl) = g.edge_mut(e.id) {
                for p in &mut lbl.points {
                    *p = transform(*p);
                }
                if let (Some(x), Some(y)) = (lbl.x, lbl.y) {
                    let p = transform(Point { x, y });
                    lbl.x = Some(p.x);
                    lbl.y = Some(p.y);
                }
            }
        }
    }

    translate_to_margin(g, graph.margin);
}

fn translate_to_margin(g: &mut Graph, margin: f64) {
    let Some(b) = bounds(g) else {
        return;
    };
    let dx = margin - b.min_x;
    let dy = margin - b.min_y;
    for id in g.node_ids() {
        if let Some(n) = g.node_mut(id) {
            n.x = n.x.map(|x| x + dx);
            n.y = n.y.map(|y| y + dy);
        }
    }
    for e in g.edge_keys() {
        if let Some(lbl) = g.edge_mut(e.id) {
            for p in &mut lbl.points {
                p.x += dx;
                p.y += dy;
            }
            lbl.x = lbl.x.map(|x| x + dx);
            lbl.y = lbl.y.map(|y| y + dy);
        }
    }
}

/// Bounding box of every positioned node box and every routed edge point.
pub fn bounds(g: &Graph) -> Option<Bounds> {
    let mut pts: Vec<(f64, f64)> = Vec::new();
    for id in g.node_ids() {
        let Some(n) = g.node(id) else {
            continue;
        };
        let (Some(x), Some(y)) = (n.x, n.y) else {
            continue;
        };
        pts.push((x - n.width / 2.0, y - n.height / 2.0));
        pts.push((x + n.width / 2.0, y + n.height / 2.0));
    }
    for e in g.edges() {
        if let Some(lbl) = g.edge(e.id) {
            pts.extend(lbl.points.iter().map(|p| (p.x, p.y)));
        }
    }
    Bounds::from_points(pts)
}

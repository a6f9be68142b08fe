//! Cycle breaking.
//!
//! Ranking needs a DAG, so the edges of a DFS feedback arc set are reversed before ranking and
//! restored (with their routed points flipped) once positions are known. Self-loops never join
//! the feedback arc set: reversing them cannot break a cycle.

use crate::graph::{EdgeKey, Graph};
use rustc_hash::FxHashSet as HashSet;

pub fn run(g: &mut Graph) {
    for e in dfs_fas(g) {
        g.reverse_edge(e.id);
        if let Some(label) = g.edge_mut(e.id) {
            label.reversed = true;
        }
    }
}

pub fn undo(g: &mut Graph) {
    for e in g.edge_keys() {
        let Some(label) = g.edge_mut(e.id) else {
            continue;
        };
        if !label.reversed {
            continue;
        }
        label.reversed = false;
        label.points.reverse();
        g.reverse_edge(e.id);
    }
}

/// Iterative DFS over out-edges in insertion order; an edge into a node that is still on the
/// DFS stack closes a cycle and joins the arc set.
fn dfs_fas(g: &Graph) -> Vec<EdgeKey> {
    let mut fas: Vec<EdgeKey> = Vec::new();
    let mut visited: HashSet<u32> = HashSet::default();
    let mut on_stack: HashSet<u32> = HashSet::default();

    for root in g.node_ids() {
        if !visited.insert(root) {
            continue;
        }
        on_stack.insert(root);
        let mut stack: Vec<(u32, Vec<EdgeKey>, usize)> = vec![(root, g.out_edges(root), 0)];

        while let Some((v, out, next)) = stack.last_mut() {
            let v = *v;
            let Some(e) = out.get(*next).copied() else {
                on_stack.remove(&v);
                stack.pop();
                continue;
            };
            *next += 1;

            if e.v == e.w {
                continue;
            }
            if on_stack.contains(&e.w) {
                fas.push(e);
                continue;
            }
            if visited.insert(e.w) {
                on_stack.insert(e.w);
                stack.push((e.w, g.out_edges(e.w), 0));
            }
        }
    }
    fas
}

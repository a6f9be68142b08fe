//! Longest-path ranking.

use crate::graph::Graph;
use rustc_hash::FxHashMap as HashMap;
use std::collections::VecDeque;

/// Assigns `rank` to every node. Expects an acyclic graph (see [`crate::acyclic`]); if a cycle
/// slipped through, the remaining nodes are ranked in insertion order.
pub fn longest_path(g: &mut Graph) {
    let node_ids = g.node_ids();

    let mut indegree: HashMap<u32, usize> = node_ids.iter().map(|&id| (id, 0)).collect();
    for e in g.edges() {
        if e.v == e.w {
            continue;
        }
        if let Some(v) = indegree.get_mut(&e.w) {
            *v += 1;
        }
    }

    // Deterministic Kahn order: initial nodes in insertion order.
    let mut queue: VecDeque<u32> = node_ids
        .iter()
        .copied()
        .filter(|id| indegree.get(id).copied().unwrap_or(0) == 0)
        .collect();

    let mut topo: Vec<u32> = Vec::with_capacity(node_ids.len());
    while let Some(n) = queue.pop_front() {
        topo.push(n);
        // One decrement per edge, matching how indegree was counted.
        for e in g.out_edges(n) {
            if e.v == e.w {
                continue;
            }
            if let Some(v) = indegree.get_mut(&e.w) {
                *v = v.saturating_sub(1);
                if *v == 0 {
                    queue.push_back(e.w);
                }
            }
        }
    }

    if topo.len() != node_ids.len() {
        for &id in &node_ids {
            if !topo.contains(&id) {
                topo.push(id);
            }
        }
    }

    let mut rank: HashMap<u32, usize> = node_ids.iter().map(|&id| (id, 0)).collect();
    for n in &topo {
        let r = rank.get(n).copied().unwrap_or(0);
        for e in g.out_edges(*n) {
            if e.v == e.w {
                continue;
            }
            let minlen = g.edge(e.id).map(|l| l.minlen).unwrap_or(1).max(1);
            let next = r.saturating_add(minlen);
            let entry = rank.entry(e.w).or_insert(0);
            if next > *entry {
                *entry = next;
            }
        }
    }

    for id in node_ids {
        let r = rank.get(&id).copied().unwrap_or(0);
        if let Some(n) = g.node_mut(id) {
            n.rank = Some(r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeLabel, NodeLabel};

    #[test]
    fn chain_ranks_increase_along_edges() {
        let mut g = Graph::default();
        for id in 0..4 {
            g.set_node(id, NodeLabel::default());
        }
        g.set_edge(0, 0, 1, EdgeLabel::default());
        g.set_edge(1, 1, 2, EdgeLabel::default());
        g.set_edge(2, 0, 3, EdgeLabel::default());
        g.set_edge(3, 3, 2, EdgeLabel::default());
        longest_path(&mut g);
        let ranks: Vec<Option<usize>> = (0..4).map(|id| g.node(id).and_then(|n| n.rank)).collect();
        assert_eq!(ranks, vec![Some(0), Some(1), Some(2), Some(1)]);
    }

    #[test]
    fn minlen_stretches_ranks() {
        let mut g = Graph::default();
        g.set_node(0, NodeLabel::default());
        g.set_node(1, NodeLabel::default());
        g.set_edge(
            0,
            0,
            1,
            EdgeLabel {
                minlen: 3,
                ..Default::default()
            },
        );
        longest_path(&mut g);
        assert_eq!(g.node(1).and_then(|n| n.rank), Some(3));
    }

    #[test]
    fn parallel_edges_release_their_target_once_each() {
        let mut g = Graph::default();
        for id in 0..3 {
            g.set_node(id, NodeLabel::default());
        }
        g.set_edge(0, 0, 1, EdgeLabel::default());
        g.set_edge(1, 0, 1, EdgeLabel::default());
        g.set_edge(2, 1, 2, EdgeLabel::default());
        longest_path(&mut g);
        let ranks: Vec<Option<usize>> = (0..3).map(|id| g.node(id).and_then(|n| n.rank)).collect();
        assert_eq!(ranks, vec![Some(0), Some(1), Some(2)]);
    }
}

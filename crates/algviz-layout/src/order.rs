//! Ordering within ranks.
//!
//! Starts from insertion order (which, for walked data structures, is the walk order and keeps
//! siblings like `left`/`right` in place) and runs alternating barycenter sweeps, keeping the
//! layering with the fewest crossings. Layerings that start crossing-free are never touched.

use crate::graph::Graph;
use rustc_hash::FxHashMap as HashMap;

const MAX_SWEEPS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct BarycenterEntry {
    pub v: u32,
    pub barycenter: Option<f64>,
    pub weight: Option<f64>,
}

pub fn order(g: &mut Graph) {
    let layers = build_layers(g);

    let mut best = layers.clone();
    let mut best_cc = crossing_count(g, &best);
    let mut current = layers;
    for i in 0..MAX_SWEEPS {
        if best_cc == 0 {
            break;
        }
        sweep(g, &mut current, i % 2 == 0);
        let cc = crossing_count(g, &current);
        if cc < best_cc {
            best = current.clone();
            best_cc = cc;
        }
    }

    for layer in &best {
        for (idx, &v) in layer.iter().enumerate() {
            if let Some(n) = g.node_mut(v) {
                n.order = Some(idx);
            }
        }
    }
}

/// Groups nodes by rank, each layer in insertion order.
pub fn build_layers(g: &Graph) -> Vec<Vec<u32>> {
    let mut layers: Vec<Vec<u32>> = Vec::new();
    for id in g.node_ids() {
        let r = g.node(id).and_then(|n| n.rank).unwrap_or(0);
        if layers.len() <= r {
            layers.resize_with(r + 1, Vec::new);
        }
        layers[r].push(id);
    }
    layers
}

fn sweep(g: &Graph, layers: &mut [Vec<u32>], down: bool) {
    if layers.len() < 2 {
        return;
    }
    if down {
        for r in 1..layers.len() {
            let fixed = positions(&layers[r - 1]);
            let entries = barycenter(g, &layers[r], &fixed, true);
            layers[r] = resolve(&entries);
        }
    } else {
        for r in (0..layers.len() - 1).rev() {
            let fixed = positions(&layers[r + 1]);
            let entries = barycenter(g, &layers[r], &fixed, false);
            layers[r] = resolve(&entries);
        }
    }
}

fn positions(layer: &[u32]) -> HashMap<u32, usize> {
    layer.iter().enumerate().map(|(i, &v)| (v, i)).collect()
}

/// Weighted mean position of each movable node's neighbors in the fixed layer.
pub fn barycenter(
    g: &Graph,
    movable: &[u32],
    fixed: &HashMap<u32, usize>,
    use_predecessors: bool,
) -> Vec<BarycenterEntry> {
    movable
        .iter()
        .map(|&v| {
            let edges = if use_predecessors {
                g.in_edges(v)
            } else {
                g.out_edges(v)
            };
            let mut sum = 0.0;
            let mut weight = 0.0;
            for e in edges {
                let other = if use_predecessors { e.v } else { e.w };
                let Some(&pos) = fixed.get(&other) else {
                    continue;
                };
                let w = g.edge(e.id).map(|l| l.weight).unwrap_or(1.0).max(0.0);
                sum += w * pos as f64;
                weight += w;
            }
            if weight > 0.0 {
                BarycenterEntry {
                    v,
                    barycenter: Some(sum / weight),
                    weight: Some(weight),
                }
            } else {
                BarycenterEntry {
                    v,
                    barycenter: None,
                    weight: None,
                }
            }
        })
        .collect()
}

/// Sorts the entries that have a barycenter and keeps the others at their original index.
fn resolve(entries: &[BarycenterEntry]) -> Vec<u32> {
    let mut sortable: Vec<(usize, f64, u32)> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.barycenter.map(|bc| (i, bc, e.v)))
        .collect();
    sortable.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    let mut out: Vec<Option<u32>> = vec![None; entries.len()];
    for (i, e) in entries.iter().enumerate() {
        if e.barycenter.is_none() {
            out[i] = Some(e.v);
        }
    }
    let mut it = sortable.into_iter().map(|(_, _, v)| v);
    for slot in out.iter_mut() {
        if slot.is_none() {
            *slot = it.next();
        }
    }
    out.into_iter().flatten().collect()
}

/// Number of crossings between edges that join adjacent layers.
pub fn crossing_count(g: &Graph, layers: &[Vec<u32>]) -> usize {
    let mut total = 0;
    for pair in layers.windows(2) {
        let north = positions(&pair[0]);
        let south = positions(&pair[1]);
        let mut segments: Vec<(usize, usize)> = Vec::new();
        for e in g.edges() {
            if let (Some(&a), Some(&b)) = (north.get(&e.v), south.get(&e.w)) {
                segments.push((a, b));
            } else if let (Some(&a), Some(&b)) = (north.get(&e.w), south.get(&e.v)) {
                segments.push((a, b));
            }
        }
        for (i, s) in segments.iter().enumerate() {
            for t in &segments[i + 1..] {
                if (s.0 < t.0 && s.1 > t.1) || (s.0 > t.0 && s.1 < t.1) {
                    total += 1;
                }
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeLabel, NodeLabel, rank};

    #[test]
    fn removes_a_crossing_between_two_layers() {
        let mut g = Graph::default();
        for id in 0..4 {
            g.set_node(id, NodeLabel::default());
        }
        // 0 -> 3, 1 -> 2 with layer 1 initially [2, 3]: one crossing.
        g.set_edge(0, 0, 3, EdgeLabel::default());
        g.set_edge(1, 1, 2, EdgeLabel::default());
        rank::longest_path(&mut g);
        assert_eq!(crossing_count(&g, &build_layers(&g)), 1);

        order(&mut g);
        let o = |id| g.node(id).and_then(|n| n.order);
        assert_eq!(o(3), Some(0));
        assert_eq!(o(2), Some(1));
    }

    #[test]
    fn nodes_without_neighbors_keep_their_slot() {
        let entries = vec![
            BarycenterEntry {
                v: 10,
                barycenter: Some(2.0),
                weight: Some(1.0),
            },
            BarycenterEntry {
                v: 11,
                barycenter: None,
                weight: None,
            },
            BarycenterEntry {
                v: 12,
                barycenter: Some(0.0),
                weight: Some(1.0),
            },
        ];
        assert_eq!(resolve(&entries), vec![12, 11, 10]);
    }
}

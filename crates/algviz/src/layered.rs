//! [`LayoutEngine`] backed by `algviz-layout`.

use algviz_core::geom::point;
use algviz_core::{LayoutEngine, LayoutError, LayoutRequest, LayoutResponse, PlacedNode, RankDir};
use algviz_layout::{EdgeLabel, Graph, GraphLabel, GraphOptions, NodeLabel};

/// Layered layout with every node drawn in the same square box.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredEngine {
    pub node_size: f64,
    pub nodesep: f64,
    pub ranksep: f64,
    pub margin: f64,
}

impl Default for LayeredEngine {
    fn default() -> Self {
        Self {
            node_size: 36.0,
            nodesep: 18.0,
            ranksep: 36.0,
            margin: 8.0,
        }
    }
}

fn rankdir(dir: RankDir) -> algviz_layout::RankDir {
    match dir {
        RankDir::TB => algviz_layout::RankDir::TB,
        RankDir::BT => algviz_layout::RankDir::BT,
        RankDir::LR => algviz_layout::RankDir::LR,
        RankDir::RL => algviz_layout::RankDir::RL,
    }
}

impl LayoutEngine for LayeredEngine {
    fn layout(&self, request: &LayoutRequest) -> Result<LayoutResponse, LayoutError> {
        let mut g = Graph::new(GraphOptions {
            directed: request.directed,
        });
        g.set_graph(GraphLabel {
            rankdir: rankdir(request.rankdir),
            nodesep: self.nodesep,
            ranksep: self.ranksep,
            margin: self.margin,
            ..Default::default()
        });
        for node in &request.nodes {
            g.set_node(node.id, NodeLabel::sized(self.node_size, self.node_size));
        }
        for edge in &request.edges {
            g.set_edge(edge.id, edge.source, edge.target, EdgeLabel::default());
        }

        algviz_layout::layout(&mut g).map_err(|err| LayoutError::Engine {
            message: err.to_string(),
        })?;

        let mut response = LayoutResponse::default();
        for node in &request.nodes {
            let Some(label) = g.node(node.id) else {
                continue;
            };
            let (Some(x), Some(y)) = (label.x, label.y) else {
                continue;
            };
            response.nodes.insert(
                node.id,
                PlacedNode {
                    center: point(x, y),
                    width: label.width,
                    height: label.height,
                },
            );
        }
        for edge in &request.edges {
            if let Some(label) = g.edge(edge.id) {
                let path = label.points.iter().map(|p| point(p.x, p.y)).collect();
                response.edges.insert(edge.id, path);
            }
        }
        tracing::trace!(
            nodes = response.nodes.len(),
            edges = response.edges.len(),
            "layered layout done"
        );
        Ok(response)
    }
}

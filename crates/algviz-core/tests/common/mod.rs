#![allow(dead_code)]

use algviz_core::geom::point;
use algviz_core::{LayoutEngine, LayoutError, LayoutRequest, LayoutResponse, PlacedNode};
use std::cell::Cell;
use std::rc::Rc;

pub const ROW: f64 = 60.0;

/// Routes `tracing` output through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Stacks nodes in request order, one per row; edges are straight segments.
#[derive(Debug, Clone, Default)]
pub struct ColumnEngine {
    pub fail: Rc<Cell<bool>>,
    pub calls: Rc<Cell<usize>>,
}

impl ColumnEngine {
    pub fn boxed(&self) -> Box<dyn LayoutEngine> {
        Box::new(self.clone())
    }
}

impl LayoutEngine for ColumnEngine {
    fn layout(&self, request: &LayoutRequest) -> Result<LayoutResponse, LayoutError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail.get() {
            return Err(LayoutError::Engine {
                message: "engine offline".to_string(),
            });
        }
        let mut out = LayoutResponse::default();
        for (i, n) in request.nodes.iter().enumerate() {
            out.nodes.insert(
                n.id,
                PlacedNode {
                    center: point(40.0, 40.0 + ROW * i as f64),
                    width: 30.0,
                    height: 30.0,
                },
            );
        }
        for e in &request.edges {
            let (Some(s), Some(t)) = (out.nodes.get(&e.source), out.nodes.get(&e.target)) else {
                continue;
            };
            let path = vec![s.center, t.center];
            out.edges.insert(e.id, path);
        }
        Ok(out)
    }
}

#![forbid(unsafe_code)]

//! SVG presentation sink for algviz.
//!
//! [`render_frame_svg`] writes one [`Frame`] as a self-contained document; [`SvgSink`] keeps
//! the last document so an unchanged render can be presented again without re-rendering.

mod sink;
pub mod svg;
mod util;

pub use sink::SvgSink;
pub use svg::render_frame_svg;

use algviz_core::Rgb;

#[derive(Debug, Clone, PartialEq)]
pub struct SvgRenderOptions {
    pub font_family: String,
    /// Outline of node shapes and color of edge labels.
    pub node_stroke: Rgb,
    pub edge_width: f64,
    pub edge_label_font_size: f64,
    pub arrow_size: f64,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            font_family: "Times,serif".to_string(),
            node_stroke: Rgb::new(123, 123, 123),
            edge_width: 1.5,
            edge_label_font_size: 12.0,
            arrow_size: 8.0,
        }
    }
}

#![forbid(unsafe_code)]

//! `algviz` turns a running algorithm into animated SVG diagrams.
//!
//! Structures live in a [`NodeArena`] (or any type implementing [`Adjacency`]); cells live in
//! [`TableScene`]s and [`VectorScene`]s. A [`display::Visualizer`] owns the displays and, on
//! every refresh, renders what changed since the previous one: nodes fade in and out, move to
//! their new layout positions and take the colors of the traces visiting them.
//!
//! ```no_run
//! use algviz::NodeArena;
//! use algviz::display::Visualizer;
//!
//! let mut arena = NodeArena::new();
//! let head = arena.list_from(["1", "2", "3"]).expect("non-empty");
//! let mut viz = Visualizer::default();
//! let list = viz.create_graph(Some("list")).expect("graph");
//! list.borrow_mut().track_root(head);
//! for update in viz.refresh(&arena).updates {
//!     println!("{} {:?}: {} bytes", update.id, update.kind, update.svg.len());
//! }
//! ```

pub use algviz_core::*;

pub mod display;
pub mod layered;

pub mod render {
    pub use algviz_render::{SvgRenderOptions, SvgSink, render_frame_svg};
}

pub use algviz_core::Error as SceneError;
pub use layered::LayeredEngine;

use display::DisplayId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Scene(#[from] algviz_core::Error),
    #[error("display {id} is not registered")]
    UnknownDisplay { id: DisplayId },
    #[error("display {id} is borrowed while refreshing")]
    Busy { id: DisplayId },
}

pub type Result<T> = std::result::Result<T, Error>;

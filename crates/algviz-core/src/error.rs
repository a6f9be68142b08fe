use crate::layout::LayoutError;
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("unknown compact id {id}")]
    UnknownId { id: u32 },

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Too many traces: all {capacity} trace colors are in use")]
    TraceOverflow { capacity: usize },

    #[error("index {index} out of range for {extent}")]
    IndexOutOfRange { index: CellIndex, extent: CellIndex },

    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}

/// Address of a table or vector cell as the caller passed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellIndex {
    Linear(isize),
    Grid(isize, isize),
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellIndex::Linear(i) => write!(f, "{i}"),
            CellIndex::Grid(r, c) => write!(f, "({r}, {c})"),
        }
    }
}

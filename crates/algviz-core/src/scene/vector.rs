use super::{CellStyle, render_cells};
use crate::arena::NodeId;
use crate::color::{Palette, Rgb};
use crate::config::VectorConfig;
use crate::directive::{Annotation, RenderOutcome, ShapeKind};
use crate::error::CellIndex;
use crate::geom::{Box2, point};
use crate::layout::{PlacedNode, SceneLayout};
use crate::store::{SceneStore, Snapshot};
use crate::trace::{Element, TraceRouter};
use crate::{Error, Result};

/// Trace handle over vector positions.
///
/// Accesses through a cursor wrap its index once: `-1` is the last cell and `len` the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCursor {
    color: Rgb,
    hold: bool,
    name: Option<String>,
    index: isize,
}

impl IndexCursor {
    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn hold(&self) -> bool {
        self.hold
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn index(&self) -> isize {
        self.index
    }

    pub fn set_index(&mut self, index: isize) {
        self.index = index;
    }

    pub fn advance(&mut self, delta: isize) {
        self.index += delta;
    }
}

/// Row of cells whose identities follow the values through inserts and pops.
#[derive(Debug)]
pub struct VectorScene {
    values: Vec<String>,
    ids: Vec<NodeId>,
    next_id: u64,
    config: VectorConfig,
    palette: Palette,
    store: SceneStore,
    router: TraceRouter,
}

impl VectorScene {
    pub fn new<I, S>(data: I, config: VectorConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        config.validate()?;
        let values: Vec<String> = data.into_iter().map(Into::into).collect();
        let ids = (0..values.len() as u64).map(NodeId::from_raw).collect();
        Ok(Self {
            next_id: values.len() as u64,
            values,
            ids,
            palette: Palette::new(config.trace_colors.clone()),
            store: SceneStore::new(),
            router: TraceRouter::new(),
            config,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Identity of the cell currently at `index`.
    pub fn cell_id(&self, index: usize) -> Option<NodeId> {
        self.ids.get(index).copied()
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    fn out_of_range(&self, index: isize) -> Error {
        Error::IndexOutOfRange {
            index: CellIndex::Linear(index),
            extent: CellIndex::Linear(self.values.len() as isize),
        }
    }

    fn slot(&self, index: isize) -> Result<usize> {
        if (0..self.values.len() as isize).contains(&index) {
            Ok(index as usize)
        } else {
            Err(self.out_of_range(index))
        }
    }

    /// Applies the one-step wrap of cursor indices and stores the result back into the cursor.
    fn wrap(&self, cursor: &mut IndexCursor) -> Result<usize> {
        let len = self.values.len() as isize;
        let index = if cursor.index < 0 {
            cursor.index + len
        } else if cursor.index >= len {
            cursor.index - len
        } else {
            cursor.index
        };
        let slot = self.slot(index)?;
        cursor.index = index;
        Ok(slot)
    }

    fn flash(&mut self, slot: usize, color: Rgb, hold: bool) {
        let element = Element::Node(self.ids[slot]);
        self.router
            .highlight(self.store.stacks_mut(), element, color, hold);
    }

    fn insert_slot(&mut self, slot: usize, value: String) {
        let id = NodeId::from_raw(self.next_id);
        self.next_id += 1;
        self.values.insert(slot, value);
        self.ids.insert(slot, id);
    }

    pub fn get(&mut self, index: isize) -> Result<String> {
        let slot = self.slot(index)?;
        self.flash(slot, self.config.read_color, false);
        Ok(self.values[slot].clone())
    }

    pub fn set(&mut self, index: isize, value: impl Into<String>) -> Result<()> {
        let slot = self.slot(index)?;
        self.flash(slot, self.config.write_color, false);
        self.values[slot] = value.into();
        Ok(())
    }

    /// Inserts before `index`; an index at or past the end appends.
    pub fn insert(&mut self, index: isize, value: impl Into<String>) -> Result<()> {
        if index < 0 {
            return Err(self.out_of_range(index));
        }
        let slot = (index as usize).min(self.values.len());
        self.insert_slot(slot, value.into());
        Ok(())
    }

    pub fn push(&mut self, value: impl Into<String>) {
        self.insert_slot(self.values.len(), value.into());
    }

    pub fn pop(&mut self, index: isize) -> Result<String> {
        let slot = self.slot(index)?;
        self.ids.remove(slot);
        Ok(self.values.remove(slot))
    }

    pub fn mark(&mut self, index: isize, color: Rgb, hold: bool) -> Result<()> {
        let slot = self.slot(index)?;
        self.flash(slot, color, hold);
        Ok(())
    }

    /// Removes `color` from every cell. Returns how many cells carried it.
    pub fn remove_mark(&mut self, color: Rgb) -> usize {
        let holding = self.store.stacks().holding(color);
        holding
            .into_iter()
            .filter(|e| self.router.unmark(self.store.stacks_mut(), *e, color))
            .count()
    }

    pub fn create_trace(&mut self, name: Option<&str>, hold: bool, index: isize) -> Result<IndexCursor> {
        let color = self.palette.claim(name)?;
        Ok(IndexCursor {
            color,
            hold,
            name: name.map(str::to_string),
            index,
        })
    }

    pub fn read(&mut self, cursor: &mut IndexCursor) -> Result<String> {
        let slot = self.wrap(cursor)?;
        self.flash(slot, cursor.color, cursor.hold);
        Ok(self.values[slot].clone())
    }

    pub fn write(&mut self, cursor: &mut IndexCursor, value: impl Into<String>) -> Result<()> {
        let slot = self.wrap(cursor)?;
        self.flash(slot, cursor.color, cursor.hold);
        self.values[slot] = value.into();
        Ok(())
    }

    /// Inserts at the cursor. A cursor past the end is moved to the end first.
    pub fn insert_at(&mut self, cursor: &mut IndexCursor, value: impl Into<String>) -> Result<()> {
        if cursor.index < 0 {
            return Err(self.out_of_range(cursor.index));
        }
        cursor.index = cursor.index.min(self.values.len() as isize);
        self.insert_slot(cursor.index as usize, value.into());
        Ok(())
    }

    pub fn pop_at(&mut self, cursor: &IndexCursor) -> Result<String> {
        self.pop(cursor.index)
    }

    pub fn retire(&mut self, cursor: IndexCursor) {
        self.router
            .retire(self.store.stacks_mut(), cursor.color, cursor.hold);
        self.palette.release(cursor.color);
    }

    fn layout(&self) -> (SceneLayout, Vec<Annotation>) {
        let size = self.config.cell_size;
        let margin = self.config.margin;
        let mut layout = SceneLayout::default();
        for (i, id) in self.ids.iter().enumerate() {
            let x = size * i as f64 + margin * (i as f64 + 1.0);
            layout.nodes.insert(
                *id,
                PlacedNode {
                    center: point(x + size / 2.0, margin + size / 2.0),
                    width: size,
                    height: size,
                },
            );
        }

        let n = self.values.len() as f64;
        let width = n * size + (n + 1.0) * margin;
        let mut height = size + 2.0 * margin;
        let mut annotations = Vec::new();
        if self.config.show_index && !self.values.is_empty() {
            let digits = (self.values.len() - 1).to_string().len() as f64;
            let fs = (size / digits).min(12.0).floor();
            height += fs;
            for i in 0..self.values.len() {
                let x = size * i as f64 + margin * (i as f64 + 1.0);
                annotations.push(Annotation {
                    position: point(
                        x + size / 2.0 - fs * i.to_string().len() as f64 * 0.25,
                        size + margin + 1.0 + fs,
                    ),
                    text: i.to_string(),
                    font_size: fs,
                });
            }
        }
        layout.bounds = Box2::new(point(0.0, 0.0), point(width, height));
        (layout, annotations)
    }

    #[tracing::instrument(skip_all, fields(len = self.values.len()))]
    pub fn render(&mut self) -> RenderOutcome {
        let cells: Vec<(NodeId, String)> = self
            .ids
            .iter()
            .copied()
            .zip(self.values.iter().cloned())
            .collect();
        let (layout, annotations) = self.layout();
        render_cells(
            &mut self.store,
            &mut self.router,
            &self.palette,
            cells,
            layout,
            CellStyle {
                title: self.config.name.as_deref(),
                background: self.config.background,
                shape: ShapeKind::RoundedRect,
                animation: &self.config.animation,
                annotations,
            },
        )
    }
}

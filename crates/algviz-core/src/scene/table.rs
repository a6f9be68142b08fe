use super::{CellCursor, CellStyle, render_cells};
use crate::arena::NodeId;
use crate::color::{Palette, Rgb};
use crate::config::TableConfig;
use crate::directive::{Annotation, RenderOutcome, ShapeKind};
use crate::error::CellIndex;
use crate::geom::{Box2, point};
use crate::layout::{PlacedNode, SceneLayout};
use crate::store::{SceneStore, Snapshot};
use crate::trace::{Element, TraceRouter};
use crate::{Error, Result};

/// Fixed grid of cells. Reads and writes flash the cell; marks and cursors color it.
#[derive(Debug)]
pub struct TableScene {
    rows: usize,
    cols: usize,
    cells: Vec<Option<String>>,
    config: TableConfig,
    palette: Palette,
    store: SceneStore,
    router: TraceRouter,
}

impl TableScene {
    pub fn new(rows: usize, cols: usize, config: TableConfig) -> Result<Self> {
        config.validate()?;
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidConfig {
                message: format!("table must have at least one cell, got {rows}x{cols}"),
            });
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
            palette: Palette::new(config.trace_colors.clone()),
            store: SceneStore::new(),
            router: TraceRouter::new(),
            config,
        })
    }

    /// Table sized to `data`: one row per inner vector, as many columns as the longest row.
    pub fn from_rows<R, S>(data: R, config: TableConfig) -> Result<Self>
    where
        R: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        let data: Vec<Vec<S>> = data.into_iter().collect();
        let cols = data.iter().map(Vec::len).max().unwrap_or(0);
        let mut table = Self::new(data.len(), cols, config)?;
        for (r, row) in data.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                table.cells[r * cols + c] = Some(value.into());
            }
        }
        Ok(table)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    /// Identity of the cell at `(r, c)`; stable for the table's lifetime.
    pub fn cell_id(&self, r: usize, c: usize) -> NodeId {
        NodeId::from_raw((r * self.cols + c) as u64)
    }

    fn slot(&self, r: isize, c: isize) -> Result<usize> {
        let in_range = (0..self.rows as isize).contains(&r) && (0..self.cols as isize).contains(&c);
        if !in_range {
            return Err(Error::IndexOutOfRange {
                index: CellIndex::Grid(r, c),
                extent: CellIndex::Grid(self.rows as isize, self.cols as isize),
            });
        }
        Ok(r as usize * self.cols + c as usize)
    }

    fn flash(&mut self, slot: usize, color: Rgb, hold: bool) {
        let element = Element::Node(NodeId::from_raw(slot as u64));
        self.router
            .highlight(self.store.stacks_mut(), element, color, hold);
    }

    /// Value at `(r, c)`; the cell flashes with the read color.
    pub fn get(&mut self, r: isize, c: isize) -> Result<Option<String>> {
        let slot = self.slot(r, c)?;
        self.flash(slot, self.config.read_color, false);
        Ok(self.cells[slot].clone())
    }

    /// Stores `value` at `(r, c)`; the cell flashes with the write color.
    pub fn set(&mut self, r: isize, c: isize, value: impl Into<String>) -> Result<()> {
        let slot = self.slot(r, c)?;
        self.flash(slot, self.config.write_color, false);
        self.cells[slot] = Some(value.into());
        Ok(())
    }

    /// Empties `(r, c)`; the cell flashes with the write color.
    pub fn clear(&mut self, r: isize, c: isize) -> Result<()> {
        let slot = self.slot(r, c)?;
        self.flash(slot, self.config.write_color, false);
        self.cells[slot] = None;
        Ok(())
    }

    pub fn mark(&mut self, r: isize, c: isize, color: Rgb, hold: bool) -> Result<()> {
        let slot = self.slot(r, c)?;
        self.flash(slot, color, hold);
        Ok(())
    }

    /// Removes `color` from every cell. Returns how many cells carried it.
    pub fn remove_mark(&mut self, color: Rgb) -> usize {
        let holding = self.store.stacks().holding(color);
        let mut removed = 0;
        for element in holding {
            if self.router.unmark(self.store.stacks_mut(), element, color) {
                removed += 1;
            }
        }
        removed
    }

    pub fn create_trace(&mut self, name: Option<&str>, hold: bool) -> Result<CellCursor> {
        let color = self.palette.claim(name)?;
        Ok(CellCursor::new(color, hold, name))
    }

    /// Highlights `(r, c)` with the cursor's color without touching the value.
    pub fn visit(&mut self, cursor: &CellCursor, r: isize, c: isize) -> Result<()> {
        let slot = self.slot(r, c)?;
        self.flash(slot, cursor.color(), cursor.hold());
        Ok(())
    }

    pub fn read(&mut self, cursor: &CellCursor, r: isize, c: isize) -> Result<Option<String>> {
        let slot = self.slot(r, c)?;
        self.flash(slot, cursor.color(), cursor.hold());
        Ok(self.cells[slot].clone())
    }

    pub fn write(
        &mut self,
        cursor: &CellCursor,
        r: isize,
        c: isize,
        value: impl Into<String>,
    ) -> Result<()> {
        let slot = self.slot(r, c)?;
        self.flash(slot, cursor.color(), cursor.hold());
        self.cells[slot] = Some(value.into());
        Ok(())
    }

    pub fn retire(&mut self, cursor: CellCursor) {
        self.router
            .retire(self.store.stacks_mut(), cursor.color(), cursor.hold());
        self.palette.release(cursor.color());
    }

    fn label_font_size(&self) -> f64 {
        let digits = (self.rows.max(self.cols) - 1).to_string().len() as f64;
        (self.config.cell_size / digits).min(12.0).floor()
    }

    fn layout(&self) -> (SceneLayout, Vec<Annotation>) {
        let size = self.config.cell_size;
        let margin = self.config.margin;
        let mut layout = SceneLayout::default();
        for r in 0..self.rows {
            for c in 0..self.cols {
                layout.nodes.insert(
                    self.cell_id(r, c),
                    PlacedNode {
                        center: point(
                            c as f64 * size + margin + size / 2.0,
                            r as f64 * size + margin + size / 2.0,
                        ),
                        width: size,
                        height: size,
                    },
                );
            }
        }

        let mut width = self.cols as f64 * size + margin * 2.0;
        let mut height = self.rows as f64 * size + margin * 2.0;
        let mut annotations = Vec::new();
        if self.config.show_index {
            let fs = self.label_font_size();
            width += (self.rows - 1).to_string().len() as f64 * fs;
            height += fs;
            for r in 0..self.rows {
                annotations.push(Annotation {
                    position: point(
                        self.cols as f64 * size + margin * 2.0,
                        (r as f64 + 0.5) * size + fs * 0.5 + margin,
                    ),
                    text: r.to_string(),
                    font_size: fs,
                });
            }
            for c in 0..self.cols {
                let digits = c.to_string().len() as f64;
                annotations.push(Annotation {
                    position: point(
                        (c as f64 + 0.5) * size - fs * digits * 0.25 + margin,
                        self.rows as f64 * size + 1.0 + fs + margin,
                    ),
                    text: c.to_string(),
                    font_size: fs,
                });
            }
        }
        layout.bounds = Box2::new(point(0.0, 0.0), point(width, height));
        (layout, annotations)
    }

    #[tracing::instrument(skip_all, fields(rows = self.rows, cols = self.cols))]
    pub fn render(&mut self) -> RenderOutcome {
        let cells: Vec<(NodeId, String)> = self
            .cells
            .iter()
            .enumerate()
            .map(|(slot, v)| {
                (
                    NodeId::from_raw(slot as u64),
                    v.clone().unwrap_or_default(),
                )
            })
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
                shape: ShapeKind::Rect,
                animation: &self.config.animation,
                annotations,
            },
        )
    }
}

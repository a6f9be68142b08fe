//! Display registry: which scenes are on screen and what each one shows.
//!
//! The [`Visualizer`] holds scenes weakly. A scene stays displayed while the caller keeps a
//! [`Handle`] to it; once the last handle is dropped (or [`Visualizer::remove`] is called) the
//! display is cleared.

use crate::layered::LayeredEngine;
use crate::{Error, Result};
use algviz_core::{
    Adjacency, GraphScene, LayoutEngine, Link, NodeId, RenderOutcome, TableScene, VectorScene,
    VisualizerConfig,
};
use algviz_render::{SvgRenderOptions, SvgSink};
use indexmap::IndexMap;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

/// A scene the [`Visualizer`] can refresh.
pub trait Displayable {
    fn refresh(&mut self, source: &dyn Adjacency) -> algviz_core::Result<RenderOutcome>;
}

impl Displayable for GraphScene {
    fn refresh(&mut self, source: &dyn Adjacency) -> algviz_core::Result<RenderOutcome> {
        self.render(source)
    }
}

impl Displayable for TableScene {
    fn refresh(&mut self, _source: &dyn Adjacency) -> algviz_core::Result<RenderOutcome> {
        Ok(self.render())
    }
}

impl Displayable for VectorScene {
    fn refresh(&mut self, _source: &dyn Adjacency) -> algviz_core::Result<RenderOutcome> {
        Ok(self.render())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(u32);

impl DisplayId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "algviz_{}", self.0)
    }
}

/// Hands out display ids in increasing order. Ids are never reused.
#[derive(Debug, Default)]
pub struct DisplayIdAllocator {
    next: u32,
}

impl DisplayIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> DisplayId {
        let id = DisplayId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Show,
    Update,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUpdate {
    pub id: DisplayId,
    pub kind: UpdateKind,
    /// Document to show; empty for [`UpdateKind::Clear`].
    pub svg: String,
}

impl DisplayUpdate {
    fn clear(id: DisplayId) -> Self {
        Self {
            id,
            kind: UpdateKind::Clear,
            svg: String::new(),
        }
    }
}

/// Result of one [`Visualizer::refresh`].
///
/// Updates of the displays that rendered are delivered even when others failed, since their new
/// snapshot is already committed.
#[derive(Debug, Default)]
pub struct Refresh {
    pub updates: Vec<DisplayUpdate>,
    pub failures: Vec<(DisplayId, Error)>,
}

impl Refresh {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Strong reference to a displayed scene.
#[derive(Debug)]
pub struct Handle<T> {
    id: DisplayId,
    scene: Rc<RefCell<T>>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            scene: Rc::clone(&self.scene),
        }
    }
}

impl<T> Handle<T> {
    pub fn id(&self) -> DisplayId {
        self.id
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.scene.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.scene.borrow_mut()
    }
}

struct Entry {
    object: Weak<RefCell<dyn Displayable>>,
    sink: SvgSink,
    shown: bool,
}

/// Source with no nodes, for refreshing cell scenes only.
struct Detached;

impl Adjacency for Detached {
    fn label(&self, _id: NodeId) -> Option<String> {
        None
    }

    fn links(&self, _id: NodeId) -> Vec<Link> {
        Vec::new()
    }
}

pub struct Visualizer {
    config: VisualizerConfig,
    options: SvgRenderOptions,
    ids: DisplayIdAllocator,
    entries: IndexMap<DisplayId, Entry>,
}

impl fmt::Debug for Visualizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Visualizer")
            .field("config", &self.config)
            .field("displays", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new(VisualizerConfig::default())
    }
}

impl Visualizer {
    pub fn new(config: VisualizerConfig) -> Self {
        Self {
            config,
            options: SvgRenderOptions::default(),
            ids: DisplayIdAllocator::new(),
            entries: IndexMap::new(),
        }
    }

    /// Visualizer configured from a partial JSON document merged over the defaults.
    pub fn from_json_value(overrides: &serde_json::Value) -> Result<Self> {
        Ok(Self::new(VisualizerConfig::from_json_value(overrides)?))
    }

    pub fn with_svg_options(mut self, options: SvgRenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// Ids of the live displays, in creation order.
    pub fn display_ids(&self) -> Vec<DisplayId> {
        self.entries.keys().copied().collect()
    }

    fn register<T: Displayable + 'static>(&mut self, scene: T) -> Handle<T> {
        let id = self.ids.allocate();
        let scene = Rc::new(RefCell::new(scene));
        let object: Rc<RefCell<dyn Displayable>> = scene.clone();
        self.entries.insert(
            id,
            Entry {
                object: Rc::downgrade(&object),
                sink: SvgSink::new(self.options.clone()),
                shown: false,
            },
        );
        tracing::debug!(%id, "registered display");
        Handle { id, scene }
    }

    pub fn create_graph(&mut self, name: Option<&str>) -> Result<Handle<GraphScene>> {
        self.create_graph_with_engine(name, Box::new(LayeredEngine::default()))
    }

    pub fn create_graph_with_engine(
        &mut self,
        name: Option<&str>,
        engine: Box<dyn LayoutEngine>,
    ) -> Result<Handle<GraphScene>> {
        let mut config = self.config.graph.clone();
        config.name = name.map(str::to_string);
        let scene = GraphScene::new(config, engine)?;
        Ok(self.register(scene))
    }

    pub fn create_table<R, S>(&mut self, data: R, name: Option<&str>) -> Result<Handle<TableScene>>
    where
        R: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        let mut config = self.config.table.clone();
        config.name = name.map(str::to_string);
        let scene = TableScene::from_rows(data, config)?;
        Ok(self.register(scene))
    }

    pub fn create_vector<I, S>(&mut self, data: I, name: Option<&str>) -> Result<Handle<VectorScene>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = self.config.vector.clone();
        config.name = name.map(str::to_string);
        let scene = VectorScene::new(data, config)?;
        Ok(self.register(scene))
    }

    /// Clears a display right away. Later refreshes skip it even if the scene is still alive.
    pub fn remove(&mut self, id: DisplayId) -> Result<DisplayUpdate> {
        match self.entries.shift_remove(&id) {
            Some(_) => Ok(DisplayUpdate::clear(id)),
            None => Err(Error::UnknownDisplay { id }),
        }
    }

    /// Renders every live scene against `source`.
    ///
    /// Scenes that changed produce `Show` (first time) or `Update`; scenes whose last handle was
    /// dropped produce `Clear` once and are forgotten. A scene that fails is reported in
    /// [`Refresh::failures`] and keeps its previous document; the other displays still refresh.
    pub fn refresh(&mut self, source: &dyn Adjacency) -> Refresh {
        let mut report = Refresh::default();
        let mut dropped = Vec::new();
        for (id, entry) in &mut self.entries {
            let Some(object) = entry.object.upgrade() else {
                if entry.shown {
                    report.updates.push(DisplayUpdate::clear(*id));
                }
                dropped.push(*id);
                continue;
            };
            let outcome = match object.try_borrow_mut() {
                Ok(mut scene) => scene.refresh(source).map_err(Error::from),
                Err(_) => Err(Error::Busy { id: *id }),
            };
            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::debug!(%id, error = %err, "display failed to refresh");
                    report.failures.push((*id, err));
                    continue;
                }
            };
            // Nothing to show yet, or nothing new.
            if outcome.is_unchanged() && (entry.shown || entry.sink.last().is_empty()) {
                continue;
            }
            let svg = entry.sink.present(&outcome).to_string();
            let kind = if entry.shown {
                UpdateKind::Update
            } else {
                UpdateKind::Show
            };
            entry.shown = true;
            report.updates.push(DisplayUpdate { id: *id, kind, svg });
        }
        for id in dropped {
            self.entries.shift_remove(&id);
        }
        tracing::debug!(
            updates = report.updates.len(),
            failures = report.failures.len(),
            live = self.entries.len(),
            "refreshed displays"
        );
        report
    }

    /// [`Visualizer::refresh`] for sessions without linked structures.
    pub fn refresh_cells(&mut self) -> Refresh {
        self.refresh(&Detached)
    }
}

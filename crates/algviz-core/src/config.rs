//! Scene configuration.
//!
//! Every struct deserializes with `#[serde(default)]`, so partial JSON works. Colors are
//! `#rrggbb` strings. [`VisualizerConfig::from_json_value`] deep-merges a partial value over
//! the defaults before deserializing.

use crate::color::{DEFAULT_TRACE_COLORS, Rgb};
use crate::directive::{MotionPath, ShapeKind};
use crate::layout::RankDir;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_DELAY: f64 = 3.0;
pub const DEFAULT_MOVEMENT_EPSILON: f64 = 0.001;
pub const DEFAULT_EDGE_COLOR: Rgb = Rgb::new(123, 123, 123);
pub const DEFAULT_READ_COLOR: Rgb = Rgb::new(176, 224, 230);
pub const DEFAULT_WRITE_COLOR: Rgb = Rgb::new(255, 160, 122);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Duration of every transition, in seconds.
    pub delay: f64,
    /// Center displacement at or below which a node counts as not moved.
    pub movement_epsilon: f64,
    pub motion: MotionPath,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            movement_epsilon: DEFAULT_MOVEMENT_EPSILON,
            motion: MotionPath::Straight,
        }
    }
}

impl AnimationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.delay.is_finite() && self.delay > 0.0) {
            return Err(invalid(format!("delay must be positive, got {}", self.delay)));
        }
        if !(self.movement_epsilon.is_finite() && self.movement_epsilon >= 0.0) {
            return Err(invalid(format!(
                "movement_epsilon must be non-negative, got {}",
                self.movement_epsilon
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub name: Option<String>,
    pub directed: bool,
    pub rankdir: RankDir,
    /// Keep nodes until they are removed or freed. When `false`, nodes that are no longer
    /// reachable from a tracked root or a cursor position disappear.
    pub retain_unreachable: bool,
    pub node_shape: ShapeKind,
    pub background: Rgb,
    pub edge_color: Rgb,
    pub trace_colors: Vec<Rgb>,
    pub node_id_offset: u32,
    pub edge_id_offset: u32,
    pub animation: AnimationConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: None,
            directed: true,
            rankdir: RankDir::TB,
            retain_unreachable: true,
            node_shape: ShapeKind::Circle,
            background: Rgb::WHITE,
            edge_color: DEFAULT_EDGE_COLOR,
            trace_colors: DEFAULT_TRACE_COLORS.to_vec(),
            node_id_offset: 0,
            edge_id_offset: 0,
            animation: AnimationConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> Result<()> {
        validate_palette(&self.trace_colors)?;
        self.animation.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub name: Option<String>,
    pub cell_size: f64,
    pub margin: f64,
    pub show_index: bool,
    pub background: Rgb,
    pub read_color: Rgb,
    pub write_color: Rgb,
    pub trace_colors: Vec<Rgb>,
    pub animation: AnimationConfig,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: None,
            cell_size: 40.0,
            margin: 3.0,
            show_index: true,
            background: Rgb::WHITE,
            read_color: DEFAULT_READ_COLOR,
            write_color: DEFAULT_WRITE_COLOR,
            trace_colors: DEFAULT_TRACE_COLORS.to_vec(),
            animation: AnimationConfig::default(),
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<()> {
        validate_cells(self.cell_size, self.margin)?;
        validate_palette(&self.trace_colors)?;
        self.animation.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    pub name: Option<String>,
    pub cell_size: f64,
    pub margin: f64,
    pub show_index: bool,
    pub background: Rgb,
    pub read_color: Rgb,
    pub write_color: Rgb,
    pub trace_colors: Vec<Rgb>,
    pub animation: AnimationConfig,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            name: None,
            cell_size: 50.0,
            margin: 3.0,
            show_index: true,
            background: Rgb::WHITE,
            read_color: DEFAULT_READ_COLOR,
            write_color: DEFAULT_WRITE_COLOR,
            trace_colors: DEFAULT_TRACE_COLORS.to_vec(),
            animation: AnimationConfig::default(),
        }
    }
}

impl VectorConfig {
    pub fn validate(&self) -> Result<()> {
        validate_cells(self.cell_size, self.margin)?;
        validate_palette(&self.trace_colors)?;
        self.animation.validate()
    }
}

/// Defaults for every scene a visualizer creates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub graph: SceneConfig,
    pub table: TableConfig,
    pub vector: VectorConfig,
}

impl VisualizerConfig {
    /// Deep-merges `overrides` over the defaults and validates the result.
    pub fn from_json_value(overrides: &Value) -> Result<Self> {
        let mut base = serde_json::to_value(Self::default())
            .map_err(|e| invalid(format!("serialize defaults: {e}")))?;
        deep_merge(&mut base, overrides);
        let cfg: Self = serde_json::from_value(base).map_err(|e| invalid(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Sets the transition duration of every scene kind.
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.graph.animation.delay = delay;
        self.table.animation.delay = delay;
        self.vector.animation.delay = delay;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.graph.validate()?;
        self.table.validate()?;
        self.vector.validate()
    }
}

pub fn deep_merge(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidConfig { message }
}

fn validate_palette(colors: &[Rgb]) -> Result<()> {
    if colors.is_empty() {
        return Err(invalid("trace_colors must not be empty".to_string()));
    }
    let mut sorted = colors.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() != colors.len() {
        return Err(invalid("trace_colors must be distinct".to_string()));
    }
    Ok(())
}

fn validate_cells(cell_size: f64, margin: f64) -> Result<()> {
    if !(cell_size.is_finite() && cell_size > 0.0) {
        return Err(invalid(format!("cell_size must be positive, got {cell_size}")));
    }
    if !(margin.is_finite() && margin >= 0.0) {
        return Err(invalid(format!("margin must be non-negative, got {margin}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_the_documented_values() {
        let cfg = VisualizerConfig::default();
        assert_eq!(cfg.graph.animation.delay, 3.0);
        assert_eq!(cfg.graph.animation.movement_epsilon, 0.001);
        assert_eq!(cfg.graph.trace_colors.len(), 8);
        assert_eq!(cfg.table.cell_size, 40.0);
        assert_eq!(cfg.vector.cell_size, 50.0);
        assert!(cfg.graph.retain_unreachable);
    }

    #[test]
    fn partial_json_is_merged_over_defaults() {
        let cfg = VisualizerConfig::from_json_value(&json!({
            "graph": { "rankdir": "LR", "animation": { "delay": 1.5 } },
            "vector": { "read_color": "#112233" }
        }))
        .expect("valid config");
        assert_eq!(cfg.graph.rankdir, RankDir::LR);
        assert_eq!(cfg.graph.animation.delay, 1.5);
        assert_eq!(cfg.graph.animation.movement_epsilon, 0.001);
        assert_eq!(cfg.vector.read_color, Rgb::new(0x11, 0x22, 0x33));
        assert_eq!(cfg.table, TableConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        for bad in [
            json!({ "graph": { "animation": { "delay": 0.0 } } }),
            json!({ "table": { "trace_colors": [] } }),
            json!({ "vector": { "animation": { "movement_epsilon": -1.0 } } }),
            json!({ "graph": { "background": "white" } }),
        ] {
            let err = VisualizerConfig::from_json_value(&bad).expect_err("rejected");
            assert!(matches!(err, Error::InvalidConfig { .. }), "{bad}: {err}");
        }
    }
}

//! Host configuration: plate geometry and motion tuning.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub plate: PlateConfig,
    #[serde(default)]
    pub motion: MotionTuning,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlateConfig {
    /// Plate radius in drawing units; both arms are half of it.
    #[serde(default = "default_radius")]
    pub radius: f64,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
        }
    }
}

/// Motion constants tuned for visual smoothness. Empirical, not invariants.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MotionTuning {
    /// Milliseconds one motor step takes under the linear time model.
    #[serde(default = "default_ms_per_step")]
    pub ms_per_step: u64,
    /// Largest sub-rotation issued at once; smaller chunks mean more
    /// intermediate render events, never a different end state.
    #[serde(default = "default_chunk_steps")]
    pub chunk_steps: u32,
    /// Half-width, in steps per axis, of the positioning refinement window.
    #[serde(default = "default_grid_search_width")]
    pub grid_search_width: i64,
    /// Longest hop a line is subdivided into.
    #[serde(default = "default_line_max_step")]
    pub line_max_step: f64,
    /// Longest hop an arc is subdivided into.
    #[serde(default = "default_arc_max_step")]
    pub arc_max_step: f64,
    /// Single positioning hops beyond this distance get a warning.
    #[serde(default = "default_goto_warn_distance")]
    pub goto_warn_distance: f64,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            ms_per_step: default_ms_per_step(),
            chunk_steps: default_chunk_steps(),
            grid_search_width: default_grid_search_width(),
            line_max_step: default_line_max_step(),
            arc_max_step: default_arc_max_step(),
            goto_warn_distance: default_goto_warn_distance(),
        }
    }
}

fn default_radius() -> f64 {
    400.0
}

fn default_ms_per_step() -> u64 {
    3
}

fn default_chunk_steps() -> u32 {
    5
}

fn default_grid_search_width() -> i64 {
    5
}

fn default_line_max_step() -> f64 {
    3.0
}

fn default_arc_max_step() -> f64 {
    3.0
}

fn default_goto_warn_distance() -> f64 {
    10.0
}

/// Load configuration from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

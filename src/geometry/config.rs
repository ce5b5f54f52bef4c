//! Configuration for geometry normalization and default layout

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors when loading a geometry configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunable constants of the geometry engine.
///
/// Every value has a default; a TOML config file may override any subset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Pixels per size-expression column/row
    pub grid_unit: f64,

    /// Column count assumed when a size expression has no usable left side
    pub default_columns: u32,

    /// Row count assumed when a size expression has no usable right side
    pub default_rows: u32,

    /// Smallest width/height an inner component may be clamped to
    pub min_component_size: f64,

    /// Gap of the 2-column fallback grid for unpositioned inner components
    pub inner_gap: f64,

    /// Default offset outside the parent for unmargined outer components
    pub outer_gap: f64,

    /// Columns of the default canvas grid
    pub canvas_columns: usize,

    /// Horizontal spacing of the default canvas grid
    pub canvas_spacing_x: f64,

    /// Vertical spacing of the default canvas grid
    pub canvas_spacing_y: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            grid_unit: 40.0,
            default_columns: 4,
            default_rows: 2,
            min_component_size: 10.0,
            inner_gap: 10.0,
            outer_gap: 20.0,
            canvas_columns: 3,
            canvas_spacing_x: 260.0,
            canvas_spacing_y: 200.0,
        }
    }
}

impl GeometryConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load a configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the grid cell unit
    pub fn with_grid_unit(mut self, unit: f64) -> Self {
        self.grid_unit = unit;
        self
    }

    /// Set the minimum inner component size
    pub fn with_min_component_size(mut self, size: f64) -> Self {
        self.min_component_size = size;
        self
    }

    /// Set the default outer placement gap
    pub fn with_outer_gap(mut self, gap: f64) -> Self {
        self.outer_gap = gap;
        self
    }

    /// Set the default canvas grid shape
    pub fn with_canvas_grid(mut self, columns: usize, spacing_x: f64, spacing_y: f64) -> Self {
        self.canvas_columns = columns;
        self.canvas_spacing_x = spacing_x;
        self.canvas_spacing_y = spacing_y;
        self
    }

    /// Width derived from a missing size expression
    pub fn default_width(&self) -> f64 {
        self.default_columns as f64 * self.grid_unit
    }

    /// Height derived from a missing size expression
    pub fn default_height(&self) -> f64 {
        self.default_rows as f64 * self.grid_unit
    }
}

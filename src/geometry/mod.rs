//! Geometry normalization and derived layout views
//!
//! This module turns possibly-incomplete imported pattern data into concrete
//! pixel-space bounds (normalization), and computes the read-only views the
//! canvas needs: union bounding boxes and default grid positions.

pub mod bbox;
pub mod config;
pub mod normalize;
pub mod types;

pub use bbox::{bounding_box_of, default_canvas_positions};
pub use config::{ConfigError, GeometryConfig};
pub use normalize::normalize;
pub use types::{BoundingBox, Point};

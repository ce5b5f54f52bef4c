//! Union bounding boxes and default canvas placement
//!
//! The canvas keeps a map of resolved on-screen boxes per pattern. From that,
//! this module computes the enclosing border of a selection (a pattern plus
//! its inner elements) and deterministic initial positions for patterns the
//! user has never arranged.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::model::Pattern;

use super::config::GeometryConfig;
use super::types::{BoundingBox, Point};

/// Union of the pattern's own box and all resolved inner element boxes.
///
/// Outer elements are context, not content, and are excluded. Inner
/// references with no known visual element are skipped. With no inner
/// elements at all this degenerates to the pattern's own box; a pattern with
/// no recorded box falls back to its `editor_bounds` at the origin.
pub fn bounding_box_of(
    name: &str,
    pattern: &Pattern,
    positions: &HashMap<String, BoundingBox>,
) -> BoundingBox {
    let own = positions.get(name).copied().unwrap_or_else(|| {
        let (width, height) = pattern
            .editor_bounds
            .map_or((0.0, 0.0), |b| (b.width, b.height));
        BoundingBox::new(0.0, 0.0, width, height)
    });

    let mut bounds = own;
    for component in pattern.inner.iter().flatten().map(|(_, c)| c) {
        let Some(target) = component.pattern.as_deref() else {
            continue;
        };
        if let Some(inner) = positions.get(target) {
            bounds = bounds.union(inner);
        }
    }
    bounds
}

/// Default canvas positions for patterns without a saved one.
///
/// Patterns flow into a fixed-column grid keyed by insertion index, so the
/// canvas has a deterministic initial arrangement before the user moves
/// anything. Saved positions pass through unchanged.
pub fn default_canvas_positions(
    patterns: &IndexMap<String, Pattern>,
    saved: &HashMap<String, Point>,
    config: &GeometryConfig,
) -> IndexMap<String, Point> {
    let columns = config.canvas_columns.max(1);
    patterns
        .keys()
        .enumerate()
        .map(|(index, name)| {
            let point = saved.get(name).copied().unwrap_or_else(|| {
                Point::new(
                    (index % columns) as f64 * config.canvas_spacing_x,
                    (index / columns) as f64 * config.canvas_spacing_y,
                )
            });
            (name.clone(), point)
        })
        .collect()
}

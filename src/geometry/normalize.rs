//! Geometry normalization for imported grammar documents
//!
//! Imported patterns routinely arrive without bounds, with symbolic location
//! forms, or with inner boxes that do not fit their parent. Normalization
//! deterministically resolves all of that into concrete pixel-space fields so
//! the canvas can render without any user interaction. Re-running it on an
//! already-normalized document changes nothing.
//!
//! Steps, per document:
//!
//! 1. Materialize inline `pattern_definition` entries into the pattern table
//!    under synthetic names.
//! 2. Derive `editor_bounds` for every pattern lacking usable bounds, from
//!    the `size` expression or the configured defaults.
//! 3. Place inner components inside the parent box (overlay forms fill it,
//!    explicit positions are honored, everything is clamped into the parent).
//! 4. Place outer components fully outside the parent box on the side their
//!    margins imply, round-robin when no margin says otherwise.
//!
//! Manual drags and resizes later write straight into the resolved location
//! fields; those fields are honored here, so a re-import does not undo them.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::model::{Bounds, ComponentPattern, GrammarDocument, Location, LocationFields, Pattern};

use super::config::GeometryConfig;

/// Normalize a grammar document in place. Idempotent.
pub fn normalize(doc: &mut GrammarDocument, config: &GeometryConfig) {
    materialize_inline_definitions(&mut doc.patterns);
    for pattern in doc.patterns.values_mut() {
        derive_bounds(pattern, config);
    }
    for pattern in doc.patterns.values_mut() {
        place_inner(pattern, config);
        place_outer(pattern, config);
    }
}

/// Move inline inner `pattern_definition`s into the pattern table and rewrite
/// the component to a plain name reference. Definitions may nest, so this
/// loops until the table stops growing.
fn materialize_inline_definitions(patterns: &mut IndexMap<String, Pattern>) {
    let mut taken: HashSet<String> = patterns.keys().cloned().collect();
    loop {
        let mut pending: Vec<(String, Pattern)> = Vec::new();
        for (parent_name, pattern) in patterns.iter_mut() {
            let Some(inner) = pattern.inner.as_mut() else {
                continue;
            };
            for (key, component) in inner.iter_mut() {
                let Some(definition) = component.pattern_definition.take() else {
                    continue;
                };
                let name = synthetic_name(parent_name, key, &taken);
                taken.insert(name.clone());
                component.pattern = Some(name.clone());
                pending.push((name, *definition));
            }
        }
        if pending.is_empty() {
            return;
        }
        patterns.extend(pending);
    }
}

fn synthetic_name(parent: &str, key: &str, taken: &HashSet<String>) -> String {
    let base = format!("{parent}_{key}_def");
    if !taken.contains(&base) {
        return base;
    }
    let mut n = 2u64;
    loop {
        let candidate = format!("{base}_{n}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Ensure the pattern has positive, finite `editor_bounds`.
///
/// Usable bounds pass through untouched. Otherwise the `size` expression is
/// mined for one integer per side of its `x` separator; missing sides fall
/// back to the configured default column/row counts.
fn derive_bounds(pattern: &mut Pattern, config: &GeometryConfig) {
    if pattern.editor_bounds.is_some_and(|b| b.is_usable()) {
        return;
    }
    let (cols, rows) = match pattern.size.as_deref() {
        Some(size) => match size.split_once('x') {
            Some((left, right)) => (
                first_integer(left).unwrap_or(config.default_columns),
                first_integer(right).unwrap_or(config.default_rows),
            ),
            None => (
                first_integer(size).unwrap_or(config.default_columns),
                config.default_rows,
            ),
        },
        None => (config.default_columns, config.default_rows),
    };
    pattern.editor_bounds = Some(Bounds::new(
        cols.max(1) as f64 * config.grid_unit,
        rows.max(1) as f64 * config.grid_unit,
    ));
}

/// First run of decimal digits in `s`, if any.
fn first_integer(s: &str) -> Option<u32> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let digits: String = s[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn place_inner(pattern: &mut Pattern, config: &GeometryConfig) {
    let Some(parent) = pattern.editor_bounds else {
        return;
    };
    let Some(inner) = pattern.inner.as_mut() else {
        return;
    };
    for (index, component) in inner.values_mut().enumerate() {
        place_inner_component(component, index, parent, config);
    }
}

fn place_inner_component(
    component: &mut ComponentPattern,
    index: usize,
    parent: Bounds,
    config: &GeometryConfig,
) {
    // "coinside" and the four-keyword form fill the parent exactly
    if component.location.as_ref().is_some_and(Location::is_overlay) {
        component.location = Some(Location::Explicit(LocationFields {
            left: Some("0".into()),
            top: Some("0".into()),
            width: Some(parent.width),
            height: Some(parent.height),
            ..Default::default()
        }));
        return;
    }

    let mut fields = match component.location.take() {
        Some(Location::Explicit(fields)) => fields,
        // An unrecognized symbolic form carries no usable geometry
        _ => LocationFields::default(),
    };

    let width = fields
        .width
        .unwrap_or_else(|| config.default_width())
        .max(config.min_component_size)
        .min(parent.width);
    let height = fields
        .height
        .unwrap_or_else(|| config.default_height())
        .max(config.min_component_size)
        .min(parent.height);

    let explicit_x = coordinate(fields.left.as_deref()).or_else(|| spacing(fields.padding_left.as_deref()));
    let explicit_y = coordinate(fields.top.as_deref()).or_else(|| spacing(fields.padding_top.as_deref()));

    // 2-column grid fallback for components with no position of their own
    let column = (index % 2) as f64;
    let row = (index / 2) as f64;
    let x = explicit_x.unwrap_or_else(|| config.inner_gap + column * (width + config.inner_gap));
    let y = explicit_y.unwrap_or_else(|| config.inner_gap + row * (height + config.inner_gap));

    // The containment clamp is final and overrides any position above
    let x = x.max(0.0).min((parent.width - width).max(0.0));
    let y = y.max(0.0).min((parent.height - height).max(0.0));

    fields.left = Some(format_px(x));
    fields.top = Some(format_px(y));
    fields.width = Some(width);
    fields.height = Some(height);
    component.location = Some(Location::Explicit(fields));
}

#[derive(Clone, Copy)]
enum VerticalSide {
    Above,
    Below,
}

#[derive(Clone, Copy)]
enum HorizontalSide {
    LeftOf,
    RightOf,
}

fn place_outer(pattern: &mut Pattern, config: &GeometryConfig) {
    let Some(parent) = pattern.editor_bounds else {
        return;
    };
    let Some(outer) = pattern.outer.as_mut() else {
        return;
    };
    for (index, component) in outer.values_mut().enumerate() {
        place_outer_component(component, index, parent, config);
    }
}

fn place_outer_component(
    component: &mut ComponentPattern,
    index: usize,
    parent: Bounds,
    config: &GeometryConfig,
) {
    let mut fields = match component.location.take() {
        Some(Location::Explicit(fields)) => fields,
        _ => LocationFields::default(),
    };

    let width = fields
        .width
        .unwrap_or_else(|| config.default_width())
        .max(config.min_component_size);
    let height = fields
        .height
        .unwrap_or_else(|| config.default_height())
        .max(config.min_component_size);

    // A fully positioned outer component (normalized earlier, or dragged by
    // the user) keeps its place
    if let (Some(x), Some(y)) = (
        coordinate(fields.left.as_deref()),
        coordinate(fields.top.as_deref()),
    ) {
        fields.left = Some(format_px(x));
        fields.top = Some(format_px(y));
        fields.width = Some(width);
        fields.height = Some(height);
        component.location = Some(Location::Explicit(fields));
        return;
    }

    let top = spacing(fields.margin_top.as_deref());
    let bottom = spacing(fields.margin_bottom.as_deref());
    let left = spacing(fields.margin_left.as_deref());
    let right = spacing(fields.margin_right.as_deref());

    let mut vertical = match (top, bottom) {
        // Both margins present: the smaller one picks the side
        (Some(t), Some(b)) => Some(if t <= b {
            (VerticalSide::Above, t)
        } else {
            (VerticalSide::Below, b)
        }),
        (Some(t), None) => Some((VerticalSide::Above, t)),
        (None, Some(b)) => Some((VerticalSide::Below, b)),
        (None, None) => None,
    };
    let mut horizontal = match (left, right) {
        (Some(l), Some(r)) => Some(if l <= r {
            (HorizontalSide::LeftOf, l)
        } else {
            (HorizontalSide::RightOf, r)
        }),
        (Some(l), None) => Some((HorizontalSide::LeftOf, l)),
        (None, Some(r)) => Some((HorizontalSide::RightOf, r)),
        (None, None) => None,
    };

    // No margin anywhere: round-robin the four sides by sibling index so
    // unpositioned context elements do not pile on top of each other
    if vertical.is_none() && horizontal.is_none() {
        match index % 4 {
            0 => vertical = Some((VerticalSide::Above, config.outer_gap)),
            1 => horizontal = Some((HorizontalSide::RightOf, config.outer_gap)),
            2 => vertical = Some((VerticalSide::Below, config.outer_gap)),
            _ => horizontal = Some((HorizontalSide::LeftOf, config.outer_gap)),
        }
    }

    // The undetermined axis centers on the parent's midline
    let y = match vertical {
        Some((VerticalSide::Above, margin)) => -(height + margin),
        Some((VerticalSide::Below, margin)) => parent.height + margin,
        None => (parent.height - height) / 2.0,
    };
    let x = match horizontal {
        Some((HorizontalSide::LeftOf, margin)) => -(width + margin),
        Some((HorizontalSide::RightOf, margin)) => parent.width + margin,
        None => (parent.width - width) / 2.0,
    };

    fields.left = Some(format_px(x));
    fields.top = Some(format_px(y));
    fields.width = Some(width);
    fields.height = Some(height);
    component.location = Some(Location::Explicit(fields));
}

/// Parse a resolved pixel coordinate string (`"25"`, `"-60"`, `"12.5"`).
fn coordinate(value: Option<&str>) -> Option<f64> {
    let raw = value?.trim();
    if let Ok(v) = raw.parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    first_integer(raw).map(f64::from)
}

/// Numeric magnitude of a spacing expression (`"10"`, `"5+"`, `"5..8"` → 5).
fn spacing(value: Option<&str>) -> Option<f64> {
    first_integer(value?).map(f64::from)
}

/// Format a pixel value the way it reparses: integers without a fraction.
fn format_px(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::model::PatternKind;

    use super::*;

    fn doc_from(json: &str) -> GrammarDocument {
        GrammarDocument::from_json(json).unwrap()
    }

    fn explicit<'a>(pattern: &'a Pattern, key: &str) -> &'a LocationFields {
        pattern.inner.as_ref().unwrap()[key]
            .location
            .as_ref()
            .unwrap()
            .as_explicit()
            .unwrap()
    }

    #[test]
    fn test_bounds_from_size_expression() {
        let mut doc = doc_from(r#"{"patterns": {"a": {"kind": "cell", "size": "3 x 2"}}}"#);
        normalize(&mut doc, &GeometryConfig::default());
        assert_eq!(doc.patterns["a"].editor_bounds, Some(Bounds::new(120.0, 80.0)));
    }

    #[test]
    fn test_bounds_from_range_size_takes_first_integer() {
        let mut doc = doc_from(r#"{"patterns": {"a": {"kind": "cell", "size": "2..4 x 10+"}}}"#);
        normalize(&mut doc, &GeometryConfig::default());
        assert_eq!(doc.patterns["a"].editor_bounds, Some(Bounds::new(80.0, 400.0)));
    }

    #[test]
    fn test_bounds_default_when_size_missing_or_garbage() {
        let mut doc = doc_from(
            r#"{"patterns": {
                "a": {"kind": "cell"},
                "b": {"kind": "cell", "size": "wide"}
            }}"#,
        );
        let config = GeometryConfig::default();
        normalize(&mut doc, &config);
        let expected = Bounds::new(config.default_width(), config.default_height());
        assert_eq!(doc.patterns["a"].editor_bounds, Some(expected));
        assert_eq!(doc.patterns["b"].editor_bounds, Some(expected));
    }

    #[test]
    fn test_existing_bounds_untouched() {
        let mut doc = doc_from(
            r#"{"patterns": {"a": {
                "kind": "cell", "size": "3 x 2",
                "editor_bounds": {"width": 55.0, "height": 66.0}
            }}}"#,
        );
        normalize(&mut doc, &GeometryConfig::default());
        assert_eq!(doc.patterns["a"].editor_bounds, Some(Bounds::new(55.0, 66.0)));
    }

    #[test]
    fn test_nonpositive_bounds_rederived() {
        let mut doc = doc_from(
            r#"{"patterns": {"a": {
                "kind": "cell",
                "editor_bounds": {"width": 0.0, "height": 80.0}
            }}}"#,
        );
        let config = GeometryConfig::default();
        normalize(&mut doc, &config);
        assert!(doc.patterns["a"].editor_bounds.unwrap().is_usable());
    }

    #[test]
    fn test_overlay_inner_fills_parent() {
        let mut doc = doc_from(
            r#"{"patterns": {
                "page": {
                    "kind": "area",
                    "editor_bounds": {"width": 200.0, "height": 100.0},
                    "inner": {"body": {
                        "pattern": "body",
                        "location": ["top", "left", "right", "bottom"]
                    }}
                },
                "body": {"kind": "cell"}
            }}"#,
        );
        normalize(&mut doc, &GeometryConfig::default());
        let fields = explicit(&doc.patterns["page"], "body");
        assert_eq!(fields.left.as_deref(), Some("0"));
        assert_eq!(fields.top.as_deref(), Some("0"));
        assert_eq!(fields.width, Some(200.0));
        assert_eq!(fields.height, Some(100.0));
    }

    #[test]
    fn test_oversized_inner_clamped_into_parent() {
        let mut doc = doc_from(
            r#"{"patterns": {
                "page": {
                    "kind": "area",
                    "editor_bounds": {"width": 200.0, "height": 100.0},
                    "inner": {"body": {
                        "pattern": "body",
                        "location": {"width": 500.0, "height": 500.0}
                    }}
                },
                "body": {"kind": "cell"}
            }}"#,
        );
        normalize(&mut doc, &GeometryConfig::default());
        let fields = explicit(&doc.patterns["page"], "body");
        let (w, h) = (fields.width.unwrap(), fields.height.unwrap());
        assert!(w <= 200.0 && h <= 100.0);
        let x: f64 = fields.left.as_deref().unwrap().parse().unwrap();
        let y: f64 = fields.top.as_deref().unwrap().parse().unwrap();
        assert!(x >= 0.0 && x <= 200.0 - w);
        assert!(y >= 0.0 && y <= 100.0 - h);
    }

    #[test]
    fn test_explicit_inner_position_honored_then_clamped() {
        let mut doc = doc_from(
            r#"{"patterns": {
                "page": {
                    "kind": "area",
                    "editor_bounds": {"width": 400.0, "height": 300.0},
                    "inner": {
                        "a": {"pattern": "c", "location": {"left": "30", "top": "40", "width": 50.0, "height": 50.0}},
                        "b": {"pattern": "c", "location": {"left": "999", "top": "0", "width": 50.0, "height": 50.0}}
                    }
                },
                "c": {"kind": "cell"}
            }}"#,
        );
        normalize(&mut doc, &GeometryConfig::default());
        let a = explicit(&doc.patterns["page"], "a");
        assert_eq!(a.left.as_deref(), Some("30"));
        assert_eq!(a.top.as_deref(), Some("40"));
        // Out-of-bounds explicit position is pulled back inside
        let b = explicit(&doc.patterns["page"], "b");
        assert_eq!(b.left.as_deref(), Some("350"));
    }

    #[test]
    fn test_unpositioned_inner_uses_two_column_grid() {
        let mut doc = doc_from(
            r#"{"patterns": {
                "page": {
                    "kind": "area",
                    "editor_bounds": {"width": 500.0, "height": 400.0},
                    "inner": {
                        "a": {"pattern": "c", "location": {"width": 60.0, "height": 40.0}},
                        "b": {"pattern": "c", "location": {"width": 60.0, "height": 40.0}},
                        "c3": {"pattern": "c", "location": {"width": 60.0, "height": 40.0}}
                    }
                },
                "c": {"kind": "cell"}
            }}"#,
        );
        normalize(&mut doc, &GeometryConfig::default());
        let a = explicit(&doc.patterns["page"], "a");
        let b = explicit(&doc.patterns["page"], "b");
        let c3 = explicit(&doc.patterns["page"], "c3");
        // index 0 -> column 0 row 0, index 1 -> column 1 row 0, index 2 -> row 1
        assert_eq!(a.left.as_deref(), Some("10"));
        assert_eq!(a.top.as_deref(), Some("10"));
        assert_eq!(b.left.as_deref(), Some("80"));
        assert_eq!(b.top.as_deref(), Some("10"));
        assert_eq!(c3.left.as_deref(), Some("10"));
        assert_eq!(c3.top.as_deref(), Some("60"));
    }

    #[test]
    fn test_outer_side_follows_margins() {
        let mut doc = doc_from(
            r#"{"patterns": {
                "page": {
                    "kind": "area",
                    "editor_bounds": {"width": 200.0, "height": 100.0},
                    "outer": {
                        "above": {"pattern": "c", "location": {"margin-top": "15", "width": 40.0, "height": 20.0}},
                        "below": {"pattern": "c", "location": {"margin-bottom": "5", "width": 40.0, "height": 20.0}},
                        "closer": {"pattern": "c", "location": {"margin-top": "30", "margin-bottom": "10", "width": 40.0, "height": 20.0}}
                    }
                },
                "c": {"kind": "cell"}
            }}"#,
        );
        normalize(&mut doc, &GeometryConfig::default());
        let outer = doc.patterns["page"].outer.as_ref().unwrap();
        let field = |key: &str| outer[key].location.as_ref().unwrap().as_explicit().unwrap();

        let above = field("above");
        assert_eq!(above.top.as_deref(), Some("-35")); // -(20 + 15)
        assert_eq!(above.left.as_deref(), Some("80")); // centered on 200 wide

        let below = field("below");
        assert_eq!(below.top.as_deref(), Some("105")); // 100 + 5

        // Both margins populated: the smaller one wins
        let closer = field("closer");
        assert_eq!(closer.top.as_deref(), Some("110")); // 100 + 10
    }

    #[test]
    fn test_outer_round_robin_covers_four_sides() {
        let mut doc = doc_from(
            r#"{"patterns": {
                "page": {
                    "kind": "area",
                    "editor_bounds": {"width": 200.0, "height": 100.0},
                    "outer": {
                        "o1": {"pattern": "c"},
                        "o2": {"pattern": "c"},
                        "o3": {"pattern": "c"},
                        "o4": {"pattern": "c"}
                    }
                },
                "c": {"kind": "cell"}
            }}"#,
        );
        let config = GeometryConfig::default();
        normalize(&mut doc, &config);
        let outer = doc.patterns["page"].outer.as_ref().unwrap();
        let pos = |key: &str| {
            let f = outer[key].location.as_ref().unwrap().as_explicit().unwrap();
            (
                f.left.as_deref().unwrap().parse::<f64>().unwrap(),
                f.top.as_deref().unwrap().parse::<f64>().unwrap(),
            )
        };
        let (w, h) = (config.default_width(), config.default_height());
        assert_eq!(pos("o1"), ((200.0 - w) / 2.0, -(h + 20.0))); // above
        assert_eq!(pos("o2"), (220.0, (100.0 - h) / 2.0)); // right
        assert_eq!(pos("o3"), ((200.0 - w) / 2.0, 120.0)); // below
        assert_eq!(pos("o4"), (-(w + 20.0), (100.0 - h) / 2.0)); // left
    }

    #[test]
    fn test_inline_definition_materialized() {
        let mut doc = doc_from(
            r#"{"patterns": {
                "page": {
                    "kind": "area",
                    "inner": {"body": {
                        "pattern_definition": {"kind": "cell", "size": "2 x 1"}
                    }}
                }
            }}"#,
        );
        normalize(&mut doc, &GeometryConfig::default());
        let component = &doc.patterns["page"].inner.as_ref().unwrap()["body"];
        assert_eq!(component.pattern.as_deref(), Some("page_body_def"));
        assert!(component.pattern_definition.is_none());
        let materialized = &doc.patterns["page_body_def"];
        assert_eq!(materialized.kind, PatternKind::Cell);
        assert!(materialized.editor_bounds.unwrap().is_usable());
    }

    #[test]
    fn test_synthetic_name_probes_collisions() {
        let mut doc = doc_from(
            r#"{"patterns": {
                "page": {
                    "kind": "area",
                    "inner": {"body": {
                        "pattern_definition": {"kind": "cell"}
                    }}
                },
                "page_body_def": {"kind": "cell"}
            }}"#,
        );
        normalize(&mut doc, &GeometryConfig::default());
        let component = &doc.patterns["page"].inner.as_ref().unwrap()["body"];
        assert_eq!(component.pattern.as_deref(), Some("page_body_def_2"));
        assert!(doc.patterns.contains_key("page_body_def_2"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut doc = doc_from(
            r#"{"patterns": {
                "page": {
                    "kind": "area",
                    "size": "4 x 3",
                    "root": true,
                    "inner": {
                        "body": {"pattern": "body", "location": "coinside"},
                        "note": {"pattern": "body", "location": {"padding-left": "12"}}
                    },
                    "outer": {
                        "header": {"pattern": "body", "location": {"margin-top": "8"}},
                        "aside": {"pattern": "body"}
                    }
                },
                "body": {"kind": "cell", "size": "2 x 1"}
            }}"#,
        );
        let config = GeometryConfig::default();
        normalize(&mut doc, &config);
        let once = doc.to_json().unwrap();
        normalize(&mut doc, &config);
        let twice = doc.to_json().unwrap();
        assert_eq!(once, twice);
    }
}

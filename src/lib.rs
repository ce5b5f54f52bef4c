//! Grammar Studio - core engine for a visual document-layout grammar editor
//!
//! This library provides the structural model, geometry normalization, and
//! derived graph views behind a canvas editor for document grammars: named
//! patterns (cells, areas, arrays) composed through inner containment, outer
//! context, array repetition, and cell inheritance.
//!
//! The rendering shell, drag handling, and on-disk format choice are external
//! collaborators; this crate takes a parsed grammar document, makes its
//! geometry concrete and consistent, and hands back derived views.
//!
//! # Example
//!
//! ```rust
//! use grammar_studio::{import_document, GeometryConfig};
//!
//! let doc = import_document(
//!     r#"{"patterns": {"page": {"kind": "area", "root": true}}}"#,
//!     &GeometryConfig::default(),
//! )
//! .unwrap();
//! assert!(doc.patterns["page"].editor_bounds.unwrap().is_usable());
//! ```

pub mod error;
pub mod geometry;
pub mod graph;
pub mod model;
pub mod value;

pub use error::ImportError;
pub use geometry::{
    bounding_box_of, default_canvas_positions, normalize, BoundingBox, GeometryConfig, Point,
};
pub use graph::{build_graph, layout_levels, GraphConfig, PatternGraph};
pub use model::{
    GrammarDocument, Location, LocationFields, Outcome, Pattern, PatternKind, PatternPatch,
    PatternStore,
};
pub use value::ValueGrammar;

/// Parse and normalize a grammar document from JSON text.
///
/// This is the import pipeline in one call: the payload either yields a fully
/// normalized document or one error, never a half-normalized document.
pub fn import_document(
    text: &str,
    config: &GeometryConfig,
) -> Result<GrammarDocument, ImportError> {
    let mut doc = GrammarDocument::from_json(text)?;
    normalize(&mut doc, config);
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_normalizes_bounds() {
        let doc = import_document(
            r#"{"patterns": {"a": {"kind": "cell", "size": "2 x 3"}}}"#,
            &GeometryConfig::default(),
        )
        .unwrap();
        assert_eq!(
            doc.patterns["a"].editor_bounds.map(|b| (b.width, b.height)),
            Some((80.0, 120.0))
        );
    }

    #[test]
    fn test_import_failure_is_single_error() {
        let result = import_document("not json", &GeometryConfig::default());
        assert!(matches!(result, Err(ImportError::Malformed(_))));
    }
}

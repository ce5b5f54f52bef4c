//! The grammar document: the unit of import and export

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ImportError;

use super::pattern::Pattern;

/// A complete grammar document.
///
/// The on-disk format (YAML vs JSON) is an external collaborator's choice;
/// the model only promises a serde shape. The JSON helpers below exist for
/// the CLI and tests.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GrammarDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_types_filepath: Option<String>,
    #[serde(default)]
    pub patterns: IndexMap<String, Pattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Free-form document metadata, passed through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl GrammarDocument {
    /// Parse a document from JSON text. Fails as a whole: a payload that does
    /// not deserialize yields one error and no partial document.
    pub fn from_json(text: &str) -> Result<Self, ImportError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize the document as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ImportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let doc = GrammarDocument::from_json(r#"{"patterns": {}}"#).unwrap();
        assert!(doc.patterns.is_empty());
        assert!(doc.metadata.is_none());
    }

    #[test]
    fn test_parse_preserves_pattern_order() {
        let doc = GrammarDocument::from_json(
            r#"{"patterns": {
                "zebra": {"kind": "cell"},
                "alpha": {"kind": "area"},
                "mid": {"kind": "array"}
            }}"#,
        )
        .unwrap();
        let names: Vec<_> = doc.patterns.keys().cloned().collect();
        assert_eq!(names, vec!["zebra", "alpha", "mid"]);
    }

    #[test]
    fn test_unparseable_payload_is_one_error() {
        assert!(GrammarDocument::from_json("{not json").is_err());
        assert!(GrammarDocument::from_json(r#"{"patterns": {"a": {"kind": "blob"}}}"#).is_err());
    }
}

//! Pattern records and their reference types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The closed set of pattern kinds.
///
/// `array-in-context` appears in older documents as an alternate tag for
/// arrays; it deserializes as [`PatternKind::Array`] and is written back as
/// plain `array`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Cell,
    Area,
    #[serde(alias = "array-in-context")]
    Array,
}

impl PatternKind {
    /// Whether this kind carries inner/outer component maps.
    pub fn supports_components(&self) -> bool {
        !matches!(self, PatternKind::Cell)
    }
}

/// Repetition direction of an array pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayDirection {
    Row,
    Column,
    Fill,
}

/// Canonical layout size of a pattern, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Bounds usable for layout: both dimensions finite and positive.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.width > 0.0 && self.height.is_finite() && self.height > 0.0
    }
}

/// Placement of a component relative to its parent.
///
/// The wire format allows three shapes: a keyword list (`["top","left",
/// "right","bottom"]` meaning fill the parent), a free string (`"coinside"`
/// meaning identical bounds), or a structured object. Normalization resolves
/// the symbolic forms into [`Location::Explicit`] once; the ambiguity is not
/// carried any deeper than this enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Keywords(Vec<String>),
    Symbolic(String),
    Explicit(LocationFields),
}

impl Location {
    /// True if this location means "same box as the parent": either the
    /// `coinside` keyword or all four side keywords, in any order or casing.
    pub fn is_overlay(&self) -> bool {
        match self {
            Location::Symbolic(s) => {
                s.trim().eq_ignore_ascii_case("coinside")
                    || is_overlay_words(s.split(|c: char| !c.is_ascii_alphanumeric()))
            }
            Location::Keywords(words) => is_overlay_words(words.iter().map(String::as_str)),
            Location::Explicit(_) => false,
        }
    }

    /// The explicit fields, if this location already carries them.
    pub fn as_explicit(&self) -> Option<&LocationFields> {
        match self {
            Location::Explicit(fields) => Some(fields),
            _ => None,
        }
    }
}

fn is_overlay_words<'a>(words: impl Iterator<Item = &'a str>) -> bool {
    let mut seen = [false; 4];
    let mut count = 0usize;
    for word in words.filter(|w| !w.trim().is_empty()) {
        let slot = match word.trim().to_ascii_lowercase().as_str() {
            "top" => 0,
            "left" => 1,
            "right" => 2,
            "bottom" => 3,
            _ => return false,
        };
        if seen[slot] {
            return false;
        }
        seen[slot] = true;
        count += 1;
    }
    count == 4
}

/// The structured location form: spacing fields plus resolved pixel bounds.
///
/// Side offsets are strings because they pass through the spacing grammar
/// (`"10"`, `"5+"`); resolved width/height are plain numbers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationFields {
    #[serde(rename = "padding-top", skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<String>,
    #[serde(rename = "padding-left", skip_serializing_if = "Option::is_none")]
    pub padding_left: Option<String>,
    #[serde(rename = "padding-right", skip_serializing_if = "Option::is_none")]
    pub padding_right: Option<String>,
    #[serde(rename = "padding-bottom", skip_serializing_if = "Option::is_none")]
    pub padding_bottom: Option<String>,
    #[serde(rename = "margin-top", skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<String>,
    #[serde(rename = "margin-left", skip_serializing_if = "Option::is_none")]
    pub margin_left: Option<String>,
    #[serde(rename = "margin-right", skip_serializing_if = "Option::is_none")]
    pub margin_right: Option<String>,
    #[serde(rename = "margin-bottom", skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl LocationFields {
    /// Shallow-merge `patch` over these fields; `Some` values win.
    pub fn merge(&mut self, patch: LocationFields) {
        macro_rules! take {
            ($field:ident) => {
                if let Some(v) = patch.$field {
                    self.$field = Some(v);
                }
            };
        }
        take!(padding_top);
        take!(padding_left);
        take!(padding_right);
        take!(padding_bottom);
        take!(margin_top);
        take!(margin_left);
        take!(margin_right);
        take!(margin_bottom);
        take!(left);
        take!(top);
        take!(width);
        take!(height);
    }
}

/// A reference from a containing pattern to a contained or contextual one.
///
/// Inner references may carry an inline `pattern_definition` instead of a
/// name; normalization materializes those into the pattern table under a
/// synthetic name and rewrites the reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentPattern {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_definition: Option<Box<Pattern>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ComponentPattern {
    /// Reference an existing pattern by name, with no location yet.
    pub fn reference(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            pattern_definition: None,
            location: None,
        }
    }
}

/// A named node of the grammar.
///
/// Field presence follows the kind: `content_type`/`extends` are cell-only,
/// `inner`/`outer` belong to areas and arrays, and `direction`/`item_pattern`/
/// `item_count`/`gap` are array-only. The store's kind-change logic keeps
/// these consistent; the type itself does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub kind: PatternKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub root: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_in_document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner: Option<IndexMap<String, ComponentPattern>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outer: Option<IndexMap<String, ComponentPattern>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<ArrayDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !b
}

impl Pattern {
    /// A blank pattern with the defaults of its kind.
    pub fn new(kind: PatternKind) -> Self {
        let components = kind.supports_components();
        Self {
            kind,
            description: None,
            size: None,
            root: false,
            count_in_document: None,
            style: None,
            editor_bounds: None,
            content_type: None,
            extends: None,
            inner: components.then(IndexMap::new),
            outer: components.then(IndexMap::new),
            direction: matches!(kind, PatternKind::Array).then_some(ArrayDirection::Row),
            item_pattern: None,
            item_count: None,
            gap: None,
        }
    }
}

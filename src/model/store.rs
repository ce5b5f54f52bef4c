//! The pattern store: every mutation of the grammar goes through here
//!
//! The store favors UI resilience over strict error surfacing: operations on
//! a name that no longer exists return [`Outcome::NotFound`] instead of
//! panicking or corrupting state. Each successful mutation bumps a revision
//! marker and notifies subscribers, which is what autosave and dirty
//! indicators hang off.

use std::fmt;

use indexmap::IndexMap;

use super::pattern::{
    ArrayDirection, Bounds, ComponentPattern, Location, LocationFields, Pattern, PatternKind,
};

/// Result of a store mutation. Never an error, never a panic.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    NotFound,
}

impl Outcome {
    pub fn applied(self) -> bool {
        self == Outcome::Applied
    }
}

/// Which component map an event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentSlot {
    Inner,
    Outer,
}

/// A completed store mutation, delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Created { name: String },
    Updated { name: String },
    Deleted { name: String },
    ComponentAdded {
        pattern: String,
        key: String,
        slot: ComponentSlot,
    },
    LocationChanged {
        pattern: String,
        key: String,
        slot: ComponentSlot,
    },
}

/// Partial update for [`PatternStore::update_pattern`]. `Some` fields are
/// merged over the existing record.
#[derive(Debug, Clone, Default)]
pub struct PatternPatch {
    pub kind: Option<PatternKind>,
    pub description: Option<String>,
    pub size: Option<String>,
    pub root: Option<bool>,
    pub count_in_document: Option<String>,
    pub style: Option<serde_json::Value>,
    pub editor_bounds: Option<Bounds>,
    pub content_type: Option<String>,
    pub extends: Option<Vec<String>>,
    pub direction: Option<ArrayDirection>,
    pub item_pattern: Option<String>,
    pub item_count: Option<String>,
    pub gap: Option<String>,
}

/// Inbound references to one pattern, for deletion-impact analysis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternUsages {
    /// Cells listing this pattern in `extends`
    pub extended_by: Vec<String>,
    /// Arrays repeating this pattern as `item_pattern`
    pub array_item_of: Vec<String>,
    /// `(pattern, key)` pairs referencing this one as inner
    pub inner_of: Vec<(String, String)>,
    /// `(pattern, key)` pairs referencing this one as outer
    pub outer_of: Vec<(String, String)>,
}

impl PatternUsages {
    pub fn is_empty(&self) -> bool {
        self.extended_by.is_empty()
            && self.array_item_of.is_empty()
            && self.inner_of.is_empty()
            && self.outer_of.is_empty()
    }
}

type Listener = Box<dyn FnMut(&ChangeEvent)>;

/// The canonical, mutable table of patterns for one open grammar.
#[derive(Default)]
pub struct PatternStore {
    patterns: IndexMap<String, Pattern>,
    revision: u64,
    listeners: Vec<Listener>,
}

impl fmt::Debug for PatternStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternStore")
            .field("patterns", &self.patterns)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from an imported pattern table.
    pub fn from_patterns(patterns: IndexMap<String, Pattern>) -> Self {
        Self {
            patterns,
            revision: 0,
            listeners: vec![],
        }
    }

    /// Monotonic marker bumped by every successful mutation. Persistence
    /// collaborators poll or diff this to coalesce saves.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a change listener. Listeners see every applied mutation;
    /// `NotFound` outcomes produce no event.
    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, event: ChangeEvent) {
        self.revision += 1;
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    // ---- queries ----

    pub fn get(&self, name: &str) -> Option<&Pattern> {
        self.patterns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// All patterns in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Pattern)> {
        self.patterns.iter()
    }

    /// The raw table, for derived views (graph, geometry).
    pub fn patterns(&self) -> &IndexMap<String, Pattern> {
        &self.patterns
    }

    /// Consume the store, yielding the pattern table for export.
    pub fn into_patterns(self) -> IndexMap<String, Pattern> {
        self.patterns
    }

    pub fn patterns_of_kind(&self, kind: PatternKind) -> Vec<&String> {
        self.patterns
            .iter()
            .filter(|(_, p)| p.kind == kind)
            .map(|(name, _)| name)
            .collect()
    }

    /// Every inbound reference to `name` across the table.
    pub fn usages_of(&self, name: &str) -> PatternUsages {
        let mut usages = PatternUsages::default();
        for (other, pattern) in &self.patterns {
            if pattern
                .extends
                .as_ref()
                .is_some_and(|parents| parents.iter().any(|p| p == name))
            {
                usages.extended_by.push(other.clone());
            }
            if pattern.item_pattern.as_deref() == Some(name) {
                usages.array_item_of.push(other.clone());
            }
            for (key, component) in pattern.inner.iter().flatten() {
                if component.pattern.as_deref() == Some(name) {
                    usages.inner_of.push((other.clone(), key.clone()));
                }
            }
            for (key, component) in pattern.outer.iter().flatten() {
                if component.pattern.as_deref() == Some(name) {
                    usages.outer_of.push((other.clone(), key.clone()));
                }
            }
        }
        usages
    }

    // ---- mutations ----

    /// Create a blank pattern and return its generated name.
    ///
    /// Names continue from the highest `pattern_N` suffix currently in the
    /// table. Generation is best-effort: the candidate is probed upward until
    /// it does not collide, since imported names may occupy the counter space.
    pub fn create_pattern(&mut self, kind: PatternKind) -> String {
        let mut next = self
            .patterns
            .keys()
            .filter_map(|name| name.strip_prefix("pattern_"))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1);
        let mut name = format!("pattern_{next}");
        while self.patterns.contains_key(&name) {
            next += 1;
            name = format!("pattern_{next}");
        }
        self.patterns.insert(name.clone(), Pattern::new(kind));
        self.notify(ChangeEvent::Created { name: name.clone() });
        name
    }

    /// Merge `patch` into an existing pattern.
    ///
    /// A kind change is destructive: kind-specific fields are dropped, then
    /// the target kind's defaults are re-initialized. Any inner/outer wiring
    /// is lost; callers are expected to confirm with the user first.
    pub fn update_pattern(&mut self, name: &str, patch: PatternPatch) -> Outcome {
        let Some(pattern) = self.patterns.get_mut(name) else {
            return Outcome::NotFound;
        };

        if let Some(kind) = patch.kind {
            if kind != pattern.kind {
                change_kind(pattern, kind);
            }
        }

        macro_rules! merge {
            ($field:ident) => {
                if let Some(v) = patch.$field {
                    pattern.$field = Some(v);
                }
            };
        }
        merge!(description);
        merge!(size);
        merge!(count_in_document);
        merge!(style);
        merge!(editor_bounds);
        merge!(content_type);
        merge!(extends);
        merge!(direction);
        merge!(item_pattern);
        merge!(item_count);
        merge!(gap);
        if let Some(root) = patch.root {
            pattern.root = root;
        }

        self.notify(ChangeEvent::Updated { name: name.to_string() });
        Outcome::Applied
    }

    /// Remove a pattern. Does not cascade: references from other patterns
    /// remain and become a validation concern for the caller.
    pub fn delete_pattern(&mut self, name: &str) -> Outcome {
        if self.patterns.shift_remove(name).is_none() {
            return Outcome::NotFound;
        }
        self.notify(ChangeEvent::Deleted { name: name.to_string() });
        Outcome::Applied
    }

    /// Add an inner reference under `key`. The store performs no uniqueness
    /// check: an existing key is overwritten, callers pre-check.
    pub fn add_inner_element(&mut self, name: &str, key: &str, target: &str) -> Outcome {
        self.add_component(name, key, target, ComponentSlot::Inner)
    }

    /// Add an outer reference under `key`. Same overwrite semantics as
    /// [`PatternStore::add_inner_element`].
    pub fn add_outer_element(&mut self, name: &str, key: &str, target: &str) -> Outcome {
        self.add_component(name, key, target, ComponentSlot::Outer)
    }

    fn add_component(
        &mut self,
        name: &str,
        key: &str,
        target: &str,
        slot: ComponentSlot,
    ) -> Outcome {
        let Some(pattern) = self.patterns.get_mut(name) else {
            return Outcome::NotFound;
        };
        let map = match slot {
            ComponentSlot::Inner => &mut pattern.inner,
            ComponentSlot::Outer => &mut pattern.outer,
        };
        let Some(map) = map.as_mut() else {
            // Cells carry no component maps
            return Outcome::NotFound;
        };
        map.insert(key.to_string(), ComponentPattern::reference(target));
        self.notify(ChangeEvent::ComponentAdded {
            pattern: name.to_string(),
            key: key.to_string(),
            slot,
        });
        Outcome::Applied
    }

    /// Merge location fields into an inner component.
    ///
    /// If the stored location is still a symbolic form (keyword list or
    /// string) it is replaced wholesale: once numeric fields exist, the
    /// symbolic form is abandoned.
    pub fn update_inner_location(
        &mut self,
        name: &str,
        key: &str,
        patch: LocationFields,
    ) -> Outcome {
        self.update_location(name, key, patch, ComponentSlot::Inner)
    }

    /// Merge location fields into an outer component. Same replacement rule
    /// as [`PatternStore::update_inner_location`].
    pub fn update_outer_location(
        &mut self,
        name: &str,
        key: &str,
        patch: LocationFields,
    ) -> Outcome {
        self.update_location(name, key, patch, ComponentSlot::Outer)
    }

    fn update_location(
        &mut self,
        name: &str,
        key: &str,
        patch: LocationFields,
        slot: ComponentSlot,
    ) -> Outcome {
        let Some(pattern) = self.patterns.get_mut(name) else {
            return Outcome::NotFound;
        };
        let map = match slot {
            ComponentSlot::Inner => pattern.inner.as_mut(),
            ComponentSlot::Outer => pattern.outer.as_mut(),
        };
        let Some(component) = map.and_then(|m| m.get_mut(key)) else {
            return Outcome::NotFound;
        };
        match &mut component.location {
            Some(Location::Explicit(fields)) => fields.merge(patch),
            other => *other = Some(Location::Explicit(patch)),
        }
        self.notify(ChangeEvent::LocationChanged {
            pattern: name.to_string(),
            key: key.to_string(),
            slot,
        });
        Outcome::Applied
    }
}

/// Drop kind-specific fields, then re-initialize the target kind's defaults.
fn change_kind(pattern: &mut Pattern, kind: PatternKind) {
    pattern.kind = kind;
    pattern.content_type = None;
    pattern.inner = None;
    pattern.direction = None;
    pattern.item_pattern = None;
    pattern.item_count = None;
    pattern.gap = None;
    match kind {
        PatternKind::Cell => {
            pattern.outer = None;
        }
        PatternKind::Area => {
            pattern.inner = Some(IndexMap::new());
            pattern.outer = Some(IndexMap::new());
        }
        PatternKind::Array => {
            pattern.inner = Some(IndexMap::new());
            pattern.outer = Some(IndexMap::new());
            pattern.direction = Some(ArrayDirection::Row);
        }
    }
}

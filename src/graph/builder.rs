//! Graph construction and layered layout
//!
//! Levels come from a breadth-first traversal seeded at root patterns.
//! Containment relations (`inner`, `array_item`) advance the level; `outer`
//! and `extends` edges are recorded for rendering but stay level-neutral, so
//! context and inheritance never reshuffle the containment hierarchy.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use serde::Serialize;

use crate::geometry::Point;
use crate::model::Pattern;

/// Relationship type of a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Inner,
    Outer,
    ArrayItem,
    Extends,
}

/// Which endpoint's styling governs an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwningEnd {
    Source,
    Target,
}

impl EdgeKind {
    /// Whether this relation advances the BFS level of its target.
    pub fn is_containment(&self) -> bool {
        matches!(self, EdgeKind::Inner | EdgeKind::ArrayItem)
    }

    /// For `extends` the extended parent owns the edge; every other edge is
    /// owned by the pattern it starts from.
    pub fn owning_end(&self) -> OwningEnd {
        match self {
            EdgeKind::Extends => OwningEnd::Target,
            _ => OwningEnd::Source,
        }
    }
}

/// A directed edge between two existing patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

impl GraphEdge {
    /// Name of the node whose styling governs this edge.
    pub fn owning_node(&self) -> &str {
        match self.kind.owning_end() {
            OwningEnd::Source => &self.from,
            OwningEnd::Target => &self.to,
        }
    }
}

/// A pattern node with its hierarchical level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub name: String,
    pub level: usize,
}

/// The derived dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternGraph {
    /// All patterns in insertion order
    pub nodes: Vec<GraphNode>,
    /// All resolvable edges in declaration order
    pub edges: Vec<GraphEdge>,
}

impl PatternGraph {
    pub fn level_of(&self, name: &str) -> Option<usize> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.level)
    }
}

/// Spacing of the layered band layout.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfig {
    /// Horizontal spacing between nodes within a level band
    pub node_spacing: f64,
    /// Vertical spacing between level bands
    pub level_spacing: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            node_spacing: 160.0,
            level_spacing: 120.0,
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the in-band node spacing
    pub fn with_node_spacing(mut self, spacing: f64) -> Self {
        self.node_spacing = spacing;
        self
    }

    /// Set the band-to-band spacing
    pub fn with_level_spacing(mut self, spacing: f64) -> Self {
        self.level_spacing = spacing;
        self
    }
}

/// Build the dependency graph for a pattern table.
///
/// Edges materialize only when both endpoints exist; dangling references are
/// skipped, not errors. Seeds are the `root` patterns, or the first pattern
/// in insertion order when no root is flagged. Patterns the traversal never
/// reaches sit at level 0.
pub fn build_graph(patterns: &IndexMap<String, Pattern>) -> PatternGraph {
    let mut edges = Vec::new();
    for (name, pattern) in patterns {
        for component in pattern.inner.iter().flatten().map(|(_, c)| c) {
            push_edge(&mut edges, patterns, name, component.pattern.as_deref(), EdgeKind::Inner);
        }
        for component in pattern.outer.iter().flatten().map(|(_, c)| c) {
            push_edge(&mut edges, patterns, name, component.pattern.as_deref(), EdgeKind::Outer);
        }
        push_edge(
            &mut edges,
            patterns,
            name,
            pattern.item_pattern.as_deref(),
            EdgeKind::ArrayItem,
        );
        for parent in pattern.extends.iter().flatten() {
            push_edge(&mut edges, patterns, name, Some(parent.as_str()), EdgeKind::Extends);
        }
    }

    // Containment adjacency for the level traversal
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges.iter().filter(|e| e.kind.is_containment()) {
        children
            .entry(edge.from.as_str())
            .or_default()
            .push(edge.to.as_str());
    }

    let seeds: Vec<&str> = {
        let roots: Vec<&str> = patterns
            .iter()
            .filter(|(_, p)| p.root)
            .map(|(name, _)| name.as_str())
            .collect();
        if roots.is_empty() {
            patterns.keys().take(1).map(String::as_str).collect()
        } else {
            roots
        }
    };

    let mut levels: HashMap<&str, usize> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for seed in seeds {
        if !levels.contains_key(seed) {
            levels.insert(seed, 0);
            queue.push_back(seed);
        }
    }
    while let Some(current) = queue.pop_front() {
        let level = levels[current];
        for &child in children.get(current).into_iter().flatten() {
            if !levels.contains_key(child) {
                levels.insert(child, level + 1);
                queue.push_back(child);
            }
        }
    }

    let nodes = patterns
        .keys()
        .map(|name| GraphNode {
            name: name.clone(),
            level: levels.get(name.as_str()).copied().unwrap_or(0),
        })
        .collect();

    PatternGraph { nodes, edges }
}

fn push_edge(
    edges: &mut Vec<GraphEdge>,
    patterns: &IndexMap<String, Pattern>,
    from: &str,
    to: Option<&str>,
    kind: EdgeKind,
) {
    let Some(to) = to else {
        return;
    };
    if !patterns.contains_key(to) {
        return;
    }
    edges.push(GraphEdge {
        from: from.to_string(),
        to: to.to_string(),
        kind,
    });
}

/// Position nodes in one centered horizontal band per level.
pub fn layout_levels(graph: &PatternGraph, config: &GraphConfig) -> IndexMap<String, Point> {
    let mut by_level: IndexMap<usize, Vec<&str>> = IndexMap::new();
    let mut max_level = 0usize;
    for node in &graph.nodes {
        by_level.entry(node.level).or_default().push(node.name.as_str());
        max_level = max_level.max(node.level);
    }

    let mut positions = IndexMap::new();
    for level in 0..=max_level {
        let Some(names) = by_level.get(&level) else {
            continue;
        };
        let band_width = (names.len().saturating_sub(1)) as f64 * config.node_spacing;
        for (i, name) in names.iter().enumerate() {
            positions.insert(
                name.to_string(),
                Point::new(
                    i as f64 * config.node_spacing - band_width / 2.0,
                    level as f64 * config.level_spacing,
                ),
            );
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use crate::model::GrammarDocument;

    use super::*;

    fn patterns_from(json: &str) -> IndexMap<String, Pattern> {
        GrammarDocument::from_json(json).unwrap().patterns
    }

    #[test]
    fn test_single_inner_edge_and_levels() {
        let patterns = patterns_from(
            r#"{"patterns": {
                "R": {"kind": "area", "root": true, "inner": {"a": {"pattern": "A"}}},
                "A": {"kind": "cell"}
            }}"#,
        );
        let graph = build_graph(&patterns);
        assert_eq!(
            graph.edges,
            vec![GraphEdge {
                from: "R".into(),
                to: "A".into(),
                kind: EdgeKind::Inner
            }]
        );
        assert_eq!(graph.level_of("R"), Some(0));
        assert_eq!(graph.level_of("A"), Some(1));
    }

    #[test]
    fn test_array_item_advances_level() {
        let patterns = patterns_from(
            r#"{"patterns": {
                "list": {"kind": "array", "root": true, "item_pattern": "entry"},
                "entry": {"kind": "cell"}
            }}"#,
        );
        let graph = build_graph(&patterns);
        assert_eq!(graph.level_of("entry"), Some(1));
        assert_eq!(graph.edges[0].kind, EdgeKind::ArrayItem);
    }

    #[test]
    fn test_outer_and_extends_are_level_neutral() {
        let patterns = patterns_from(
            r#"{"patterns": {
                "page": {"kind": "area", "root": true, "outer": {"ctx": {"pattern": "header"}}},
                "header": {"kind": "cell"},
                "fancy": {"kind": "cell", "extends": ["header"]}
            }}"#,
        );
        let graph = build_graph(&patterns);
        // Both relations appear as edges
        let kinds: Vec<EdgeKind> = graph.edges.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EdgeKind::Outer, EdgeKind::Extends]);
        // Neither moved its target off level 0
        assert_eq!(graph.level_of("header"), Some(0));
        assert_eq!(graph.level_of("fancy"), Some(0));
    }

    #[test]
    fn test_no_root_seeds_first_pattern() {
        let patterns = patterns_from(
            r#"{"patterns": {
                "first": {"kind": "area", "inner": {"a": {"pattern": "second"}}},
                "second": {"kind": "cell"}
            }}"#,
        );
        let graph = build_graph(&patterns);
        assert_eq!(graph.level_of("first"), Some(0));
        assert_eq!(graph.level_of("second"), Some(1));
    }

    #[test]
    fn test_dangling_reference_produces_no_edge() {
        let patterns = patterns_from(
            r#"{"patterns": {
                "page": {"kind": "area", "root": true, "inner": {"a": {"pattern": "missing"}}}
            }}"#,
        );
        let graph = build_graph(&patterns);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.nodes.len(), 1);
    }

    #[test]
    fn test_cycle_terminates_with_first_visit_level() {
        let patterns = patterns_from(
            r#"{"patterns": {
                "a": {"kind": "area", "root": true, "inner": {"x": {"pattern": "b"}}},
                "b": {"kind": "area", "inner": {"x": {"pattern": "a"}}}
            }}"#,
        );
        let graph = build_graph(&patterns);
        assert_eq!(graph.level_of("a"), Some(0));
        assert_eq!(graph.level_of("b"), Some(1));
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn test_multi_parent_keeps_first_bfs_level() {
        // "shared" is inner to both a root (level 0) and a deeper area
        let patterns = patterns_from(
            r#"{"patterns": {
                "root": {"kind": "area", "root": true, "inner": {
                    "s": {"pattern": "shared"},
                    "mid": {"pattern": "mid"}
                }},
                "mid": {"kind": "area", "inner": {"s": {"pattern": "shared"}}},
                "shared": {"kind": "cell"}
            }}"#,
        );
        let graph = build_graph(&patterns);
        // BFS reaches it from the root first
        assert_eq!(graph.level_of("shared"), Some(1));
        assert_eq!(graph.level_of("mid"), Some(1));
    }

    #[test]
    fn test_edge_ownership() {
        let edge = GraphEdge {
            from: "child".into(),
            to: "parent".into(),
            kind: EdgeKind::Extends,
        };
        assert_eq!(edge.owning_node(), "parent");

        let edge = GraphEdge {
            from: "area".into(),
            to: "cell".into(),
            kind: EdgeKind::Inner,
        };
        assert_eq!(edge.owning_node(), "area");
    }

    #[test]
    fn test_unreached_patterns_default_to_level_zero() {
        let patterns = patterns_from(
            r#"{"patterns": {
                "root": {"kind": "area", "root": true},
                "island": {"kind": "cell"}
            }}"#,
        );
        let graph = build_graph(&patterns);
        assert_eq!(graph.level_of("island"), Some(0));
    }

    #[test]
    fn test_layout_groups_by_level_and_centers_bands() {
        let patterns = patterns_from(
            r#"{"patterns": {
                "root": {"kind": "area", "root": true, "inner": {
                    "a": {"pattern": "a"},
                    "b": {"pattern": "b"}
                }},
                "a": {"kind": "cell"},
                "b": {"kind": "cell"}
            }}"#,
        );
        let graph = build_graph(&patterns);
        let config = GraphConfig::default();
        let positions = layout_levels(&graph, &config);

        // Single node on level 0 sits at the band center
        assert_eq!(positions["root"], Point::new(0.0, 0.0));
        // Two nodes on level 1, centered around 0
        assert_eq!(positions["a"], Point::new(-80.0, 120.0));
        assert_eq!(positions["b"], Point::new(80.0, 120.0));
    }
}

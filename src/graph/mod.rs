//! Dependency graph over pattern names
//!
//! A read-only derived view of the pattern table for the graph panel: nodes
//! with hierarchical levels, typed edges, and a layered band layout.

pub mod builder;

pub use builder::{
    build_graph, layout_levels, EdgeKind, GraphConfig, GraphEdge, GraphNode, OwningEnd,
    PatternGraph,
};

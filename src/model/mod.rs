//! The pattern data model
//!
//! This module owns the live, mutable grammar: pattern records, the
//! references between them, and the store that mediates every mutation.

pub mod document;
pub mod pattern;
pub mod store;

pub use document::{GrammarDocument, Metadata};
pub use pattern::{
    ArrayDirection, Bounds, ComponentPattern, Location, LocationFields, Pattern, PatternKind,
};
pub use store::{ChangeEvent, ComponentSlot, Outcome, PatternPatch, PatternStore, PatternUsages};

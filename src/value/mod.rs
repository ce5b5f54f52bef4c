//! Validators for the constrained numeric value mini-language
//!
//! Spacing, count, and size fields share a tiny grammar of exact values
//! (`5`), open ranges (`5+`, `5-`) and closed ranges (`5..10`). Each field
//! kind restricts the grammar differently, and each exposes two independent
//! checks: a keystroke filter that tolerates half-typed values, and a
//! commit-time validity check that does not.

pub mod lexer;
pub mod rules;

pub use rules::ValueGrammar;

//! Grammar rules for spacing, count, and size values
//!
//! Each grammar exposes three pure predicates:
//!
//! - [`ValueGrammar::is_allowed_input`] — keystroke filter. Accepts the empty
//!   string and any prefix that can still be completed into a valid value, so
//!   `5.` and `5..2` pass while the user is typing a range.
//! - [`ValueGrammar::is_valid`] — commit-time check. A value must be a
//!   complete form with all endpoint constraints satisfied.
//! - [`ValueGrammar::has_range_error`] — logical flag for inline display:
//!   a closed range with `min >= max`, or a range left dangling (`5.`, `5..`).
//!
//! The caller gates live input on the first predicate and persistence on the
//! second; the two are independent checks and both must be honored.

use super::lexer::{classify, Number, Shape};

/// The literal separator of the size grammar: one space, `x`, one space.
const SIZE_SEPARATOR: &str = " x ";

/// Endpoint constraints for one range expression.
#[derive(Debug, Clone, Copy)]
struct SideRules {
    min: u64,
    allow_leading_zero: bool,
    allow_open_down: bool,
}

const SPACING_RULES: SideRules = SideRules {
    min: 0,
    allow_leading_zero: true,
    allow_open_down: true,
};

const COUNT_RULES: SideRules = SideRules {
    min: 1,
    allow_leading_zero: false,
    allow_open_down: false,
};

impl SideRules {
    /// A number that can still become acceptable by appending digits.
    ///
    /// A leading zero never recovers, and a bare `0` under a nonzero minimum
    /// can only grow into a leading-zero form.
    fn number_input_ok(&self, n: &Number) -> bool {
        if n.leading_zero && !self.allow_leading_zero {
            return false;
        }
        if n.value < self.min && !self.allow_leading_zero {
            return false;
        }
        true
    }

    /// A number acceptable as a finished endpoint.
    fn number_final_ok(&self, n: &Number) -> bool {
        self.number_input_ok(n) && n.value >= self.min
    }

    fn allowed_input(&self, raw: &str) -> bool {
        match classify(raw) {
            Shape::Empty => true,
            Shape::Exact(n) => self.number_input_ok(&n),
            // The `+` ends the number, so it must already be a valid endpoint
            Shape::OpenUp(n) => self.number_final_ok(&n),
            Shape::OpenDown(n) => self.allow_open_down && self.number_final_ok(&n),
            Shape::RangePartial(n) => self.number_final_ok(&n),
            // `5..2` stays allowed: appending digits to the upper endpoint
            // can still produce a valid range
            Shape::Range(n, m) => self.number_final_ok(&n) && self.number_input_ok(&m),
            Shape::Malformed => false,
        }
    }

    fn valid(&self, raw: &str) -> bool {
        match classify(raw) {
            Shape::Exact(n) | Shape::OpenUp(n) => self.number_final_ok(&n),
            Shape::OpenDown(n) => self.allow_open_down && self.number_final_ok(&n),
            Shape::Range(n, m) => {
                self.number_final_ok(&n) && self.number_final_ok(&m) && n.value < m.value
            }
            _ => false,
        }
    }

    fn range_error(&self, raw: &str) -> bool {
        match classify(raw) {
            Shape::RangePartial(_) => true,
            Shape::Range(n, m) => n.value >= m.value,
            _ => false,
        }
    }
}

/// The three field grammars of the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueGrammar {
    /// Padding and margin components: integer >= 0, `n+`, `n-`, `n..m`
    Spacing,
    /// Document and item counts: integer >= 1 without leading zeros, `n+`, `n..m`
    Count,
    /// `<count> x <count>` with exactly one space on each side of the `x`
    Size,
}

impl ValueGrammar {
    /// Keystroke filter: true for the empty string and any completable prefix.
    pub fn is_allowed_input(&self, raw: &str) -> bool {
        match self {
            ValueGrammar::Spacing => SPACING_RULES.allowed_input(raw),
            ValueGrammar::Count => COUNT_RULES.allowed_input(raw),
            ValueGrammar::Size => size_allowed_input(raw),
        }
    }

    /// Commit-time check: the value is a complete, logically sound form.
    pub fn is_valid(&self, raw: &str) -> bool {
        match self {
            ValueGrammar::Spacing => SPACING_RULES.valid(raw),
            ValueGrammar::Count => COUNT_RULES.valid(raw),
            ValueGrammar::Size => match raw.split_once(SIZE_SEPARATOR) {
                Some((left, right)) => COUNT_RULES.valid(left) && COUNT_RULES.valid(right),
                None => false,
            },
        }
    }

    /// Logical range flag: `min >= max`, or a dangling `n.` / `n..`.
    pub fn has_range_error(&self, raw: &str) -> bool {
        match self {
            ValueGrammar::Spacing => SPACING_RULES.range_error(raw),
            ValueGrammar::Count => COUNT_RULES.range_error(raw),
            ValueGrammar::Size => match raw.split_once(SIZE_SEPARATOR) {
                Some((left, right)) => {
                    COUNT_RULES.range_error(left) || COUNT_RULES.range_error(right)
                }
                None => COUNT_RULES.range_error(raw),
            },
        }
    }
}

/// Input filter for the size grammar.
///
/// The separator is typed left to right, so once any part of it is present
/// the left side is frozen and must already be a fully valid count value.
fn size_allowed_input(raw: &str) -> bool {
    if raw.is_empty() {
        return true;
    }
    if let Some((left, right)) = raw.split_once(SIZE_SEPARATOR) {
        return COUNT_RULES.valid(left) && COUNT_RULES.allowed_input(right);
    }
    if let Some(left) = raw.strip_suffix(" x") {
        return COUNT_RULES.valid(left);
    }
    if let Some(left) = raw.strip_suffix(' ') {
        return COUNT_RULES.valid(left);
    }
    COUNT_RULES.allowed_input(raw)
}

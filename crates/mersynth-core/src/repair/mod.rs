//! Targeted fixes for [`Issue`]s.
//!
//! Missing closers are appended at the end of the text, not at the position they belong. The
//! result is balanced, not necessarily meaningful.

use crate::declaration::ensure_declaration;
use crate::normalize::expand_shorthand_edges;
use crate::validate::{Issue, Missing, detect};

/// Applies one fix per issue, in the order given.
pub fn repair(code: &str, issues: &[Issue]) -> String {
    issues.iter().fold(code.to_string(), |code, issue| {
        tracing::debug!(%issue, "repairing");
        apply_fix(&code, issue)
    })
}

/// Detects and repairs in one step.
pub fn validate_and_repair(code: &str) -> String {
    repair(code, &detect(code))
}

fn apply_fix(code: &str, issue: &Issue) -> String {
    match *issue {
        Issue::MissingDiagramType => ensure_declaration(code),
        Issue::InvalidArrowSyntax => expand_shorthand_edges(code),
        Issue::UnclosedBrackets { count, missing } => fix_delimiters(code, '[', ']', count, missing),
        Issue::UnclosedBraces { count, missing } => fix_delimiters(code, '{', '}', count, missing),
    }
}

fn fix_delimiters(code: &str, open: char, close: char, count: usize, missing: Missing) -> String {
    match missing {
        Missing::Closing => append_closers(code, close, count),
        Missing::Opening => blank_unmatched_closers(code, open, close, count),
    }
}

fn append_closers(code: &str, close: char, count: usize) -> String {
    let mut out = String::with_capacity(code.len() + count);
    out.push_str(code);
    out.extend(std::iter::repeat_n(close, count));
    out
}

/// Replaces the first `count` closers that have no matching opener with a space.
///
/// Openers are never removed. Neighbouring tokens must not fuse into a new edge or keyword.
fn blank_unmatched_closers(code: &str, open: char, close: char, count: usize) -> String {
    let mut out = String::with_capacity(code.len());
    let mut depth = 0usize;
    let mut remaining = count;
    for ch in code.chars() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            if depth > 0 {
                depth -= 1;
            } else if remaining > 0 {
                remaining -= 1;
                out.push(' ');
                continue;
            }
        }
        out.push(ch);
    }
    out
}

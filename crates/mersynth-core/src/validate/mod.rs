//! Structural defect detection.
//!
//! This is a heuristic check over delimiter counts and edge tokens, not a Mermaid parser.

use crate::declaration::has_declaration;
use crate::normalize::{CANONICAL_EDGE, has_shorthand_arrow};
use serde::Serialize;
use std::fmt;

/// Which side of a delimiter pair is short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Missing {
    /// More openers than closers.
    Closing,
    /// More closers than openers.
    Opening,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Issue {
    MissingDiagramType,
    InvalidArrowSyntax,
    UnclosedBrackets { count: usize, missing: Missing },
    UnclosedBraces { count: usize, missing: Missing },
}

impl Issue {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDiagramType => write!(f, "Missing diagram type declaration"),
            Self::InvalidArrowSyntax => {
                write!(f, "Invalid arrow syntax: use `{CANONICAL_EDGE}` for edges")
            }
            Self::UnclosedBrackets { count, missing } => match missing {
                Missing::Closing => write!(f, "{count} unclosed bracket(s) `[`"),
                Missing::Opening => write!(f, "{count} unmatched closing bracket(s) `]`"),
            },
            Self::UnclosedBraces { count, missing } => match missing {
                Missing::Closing => write!(f, "{count} unclosed brace(s) `{{`"),
                Missing::Opening => write!(f, "{count} unmatched closing brace(s) `}}`"),
            },
        }
    }
}

/// Returns the imbalance between `open` and `close` in `code`, if any.
pub fn delimiter_imbalance(code: &str, open: char, close: char) -> Option<(usize, Missing)> {
    let opened = code.chars().filter(|&c| c == open).count();
    let closed = code.chars().filter(|&c| c == close).count();
    match opened.cmp(&closed) {
        std::cmp::Ordering::Greater => Some((opened - closed, Missing::Closing)),
        std::cmp::Ordering::Less => Some((closed - opened, Missing::Opening)),
        std::cmp::Ordering::Equal => None,
    }
}

/// Detects structural defects, in a fixed order: declaration, arrows, brackets, braces.
pub fn detect(code: &str) -> Vec<Issue> {
    let mut issues = Vec::new();

    if !has_declaration(code) {
        issues.push(Issue::MissingDiagramType);
    }
    if has_shorthand_arrow(code) && !code.contains(CANONICAL_EDGE) {
        issues.push(Issue::InvalidArrowSyntax);
    }
    if let Some((count, missing)) = delimiter_imbalance(code, '[', ']') {
        issues.push(Issue::UnclosedBrackets { count, missing });
    }
    if let Some((count, missing)) = delimiter_imbalance(code, '{', '}') {
        issues.push(Issue::UnclosedBraces { count, missing });
    }

    issues
}

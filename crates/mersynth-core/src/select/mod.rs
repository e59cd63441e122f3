//! Rule-ordered template selection.
//!
//! Both selection and suite relevance are sequences of independent keyword tests evaluated
//! top-to-bottom. The first matching rule wins; there is no scoring.

use crate::GenerationOptions;
use crate::catalog::{self, Template};
use indexmap::IndexSet;

/// Maximum number of diagrams produced by one suite request.
pub const SUITE_CAP: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub keywords: &'static [&'static str],
    pub template_id: &'static str,
}

impl KeywordRule {
    /// `lowered` must already be lower-cased.
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

/// Selection rules, in priority order.
///
/// The process rule sits just ahead of the state rule: `flow` is a substring of `workflow`, so a
/// "workflow" description selects the flowchart unless an earlier rule already matched.
pub const SELECTION_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["api", "integration", "sequence"],
        template_id: "sequence-api",
    },
    KeywordRule {
        keywords: &["architecture", "system", "component"],
        template_id: "architecture-system",
    },
    KeywordRule {
        keywords: &["class", "entity", "model"],
        template_id: "class-entity",
    },
    KeywordRule {
        keywords: &["process", "flow", "procedure"],
        template_id: "flowchart-basic",
    },
    KeywordRule {
        keywords: &["state", "workflow", "lifecycle"],
        template_id: "state-workflow",
    },
    KeywordRule {
        keywords: &["project", "timeline", "schedule"],
        template_id: "gantt-project",
    },
    KeywordRule {
        keywords: &["concept", "mind", "map"],
        template_id: "mindmap-concept",
    },
];

/// Broad suite categories, in priority order. Each category contributes one candidate.
pub const SUITE_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["process", "flow", "workflow", "procedure"],
        template_id: "flowchart-basic",
    },
    KeywordRule {
        keywords: &["system", "architecture", "component", "infrastructure"],
        template_id: "architecture-system",
    },
    KeywordRule {
        keywords: &["api", "interaction", "integration"],
        template_id: "sequence-api",
    },
    KeywordRule {
        keywords: &["concept", "strategy", "brainstorm"],
        template_id: "mindmap-concept",
    },
];

pub fn select(text: &str, options: &GenerationOptions) -> &'static Template {
    if let Some(id) = options.template_override.as_deref() {
        match catalog::find(id) {
            Some(template) => return template,
            None => tracing::debug!(template = id, "ignoring unknown template override"),
        }
    }

    let lowered = text.to_lowercase();
    let template = SELECTION_RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .and_then(|rule| catalog::find(rule.template_id))
        .unwrap_or_else(catalog::default_template);

    tracing::debug!(template = template.id, "selected template");
    template
}

/// Templates relevant to `text` for suite generation, in category order, capped at
/// [`SUITE_CAP`]. Falls back to the default template when no category matches.
pub fn suite_candidates(text: &str) -> Vec<&'static Template> {
    let lowered = text.to_lowercase();
    let ids: IndexSet<&'static str> = SUITE_RULES
        .iter()
        .filter(|rule| rule.matches(&lowered))
        .map(|rule| rule.template_id)
        .collect();

    let mut out: Vec<&'static Template> = ids
        .into_iter()
        .filter_map(catalog::find)
        .take(SUITE_CAP)
        .collect();
    if out.is_empty() {
        out.push(catalog::default_template());
    }
    out
}

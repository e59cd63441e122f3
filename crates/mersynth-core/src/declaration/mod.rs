use regex::Regex;

/// Header used when no content heuristic applies.
pub const FALLBACK_HEADER: &str = "flowchart TD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration {
    /// Stable diagram kind, e.g. `sequence` for `sequenceDiagram`.
    pub id: &'static str,
    /// Regex fragment for the keyword itself (case-sensitive).
    pub keyword: &'static str,
}

/// Recognized declaration keywords. The order mirrors Mermaid's own detector registration.
pub const DECLARATIONS: &[Declaration] = &[
    Declaration { id: "mindmap", keyword: "mindmap" },
    Declaration { id: "architecture", keyword: "architecture(?:-beta)?" },
    Declaration { id: "c4", keyword: "C4(?:Context|Container|Component|Dynamic|Deployment)" },
    Declaration { id: "kanban", keyword: "kanban" },
    Declaration { id: "class", keyword: "classDiagram(?:-v2)?" },
    Declaration { id: "er", keyword: "erDiagram" },
    Declaration { id: "gantt", keyword: "gantt" },
    Declaration { id: "pie", keyword: "pie" },
    Declaration { id: "requirement", keyword: "requirementDiagram" },
    Declaration { id: "sequence", keyword: "sequenceDiagram" },
    Declaration { id: "flowchart", keyword: "flowchart(?:-elk)?" },
    Declaration { id: "graph", keyword: "graph" },
    Declaration { id: "timeline", keyword: "timeline" },
    Declaration { id: "gitGraph", keyword: "gitGraph" },
    Declaration { id: "state", keyword: "stateDiagram(?:-v2)?" },
    Declaration { id: "journey", keyword: "journey" },
    Declaration { id: "quadrantChart", keyword: "quadrantChart" },
    Declaration { id: "sankey", keyword: "sankey(?:-beta)?" },
    Declaration { id: "packet", keyword: "packet(?:-beta)?" },
    Declaration { id: "xychart", keyword: "xychart(?:-beta)?" },
    Declaration { id: "block", keyword: "block(?:-beta)?" },
    Declaration { id: "radar", keyword: "radar-beta" },
    Declaration { id: "treemap", keyword: "treemap" },
];

fn declaration_regexes() -> &'static [(Declaration, Regex)] {
    static RES: std::sync::OnceLock<Vec<(Declaration, Regex)>> = std::sync::OnceLock::new();
    RES.get_or_init(|| {
        DECLARATIONS
            .iter()
            .map(|decl| {
                // The keyword must end at a non-identifier character so `pie` does not match
                // `pieces` and `graph` does not match `graphic`.
                let re = Regex::new(&format!(r"^\s*(?:{})(?:[^\w-]|$)", decl.keyword))
                    .expect("valid regex");
                (*decl, re)
            })
            .collect()
    })
}

fn frontmatter_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A-{3}[ \t]*\n(?:.*?\n)?-{3}[ \t]*(?:\n|\z)").expect("valid regex")
    })
}

/// Splits `code` into its preamble and the diagram body.
///
/// The preamble is an optional leading `---` frontmatter block followed by any `%%` comment or
/// `%%{...}%%` directive lines and the blank lines between them. Code without frontmatter or
/// `%%` lines has an empty preamble.
pub fn split_preamble(code: &str) -> (&str, &str) {
    let mut offset = frontmatter_regex().find(code).map_or(0, |m| m.end());
    let mut has_marker = offset > 0;
    let mut end = offset;
    while offset < code.len() {
        let rest = &code[offset..];
        let consumed = rest.find('\n').map_or(rest.len(), |i| i + 1);
        let line = rest[..consumed].trim();
        if line.starts_with("%%") {
            has_marker = true;
        } else if !line.is_empty() {
            break;
        }
        offset += consumed;
        if has_marker {
            end = offset;
        }
    }
    code.split_at(end)
}

/// Returns the declaration `code` starts with, if any. A leading preamble is skipped.
pub fn detect_declaration(code: &str) -> Option<&'static Declaration> {
    let (_, body) = split_preamble(code);
    declaration_regexes()
        .iter()
        .find(|(_, re)| re.is_match(body))
        .map(|(decl, _)| decl)
}

pub fn has_declaration(code: &str) -> bool {
    detect_declaration(code).is_some()
}

pub type InferenceFn = fn(code: &str) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct InferenceRule {
    pub header: &'static str,
    pub matches: InferenceFn,
}

/// Content heuristics for undeclared text, in priority order.
pub const INFERENCE_RULES: &[InferenceRule] = &[
    InferenceRule {
        header: "sequenceDiagram",
        matches: looks_like_sequence,
    },
    InferenceRule {
        header: "classDiagram",
        matches: looks_like_class,
    },
    InferenceRule {
        header: "stateDiagram-v2",
        matches: looks_like_state,
    },
    InferenceRule {
        header: "gantt",
        matches: looks_like_gantt,
    },
];

fn looks_like_sequence(code: &str) -> bool {
    code.contains("participant") || code.contains("->>")
}

// A brace block is a line opening `{`, as in `class Account {`. Inline decision nodes such as
// `B{Approved?}` do not count.
fn looks_like_class(code: &str) -> bool {
    code.contains("class ") || code.lines().any(|line| line.trim_end().ends_with('{'))
}

fn looks_like_state(code: &str) -> bool {
    code.contains("state ") || code.contains("[*]")
}

fn looks_like_gantt(code: &str) -> bool {
    code.contains("title") && code.contains("section")
}

/// The header [`ensure_declaration`] would prepend to undeclared `code`.
pub fn infer_header(code: &str) -> &'static str {
    INFERENCE_RULES
        .iter()
        .find(|rule| (rule.matches)(code))
        .map(|rule| rule.header)
        .unwrap_or(FALLBACK_HEADER)
}

/// Inserts an inferred declaration line when `code` lacks one. The line goes after any preamble,
/// which must stay first. The rest of the text is never touched.
pub fn ensure_declaration(code: &str) -> String {
    if has_declaration(code) {
        return code.to_string();
    }
    let (preamble, body) = split_preamble(code);
    let header = infer_header(body);
    tracing::debug!(header, "inferred missing diagram declaration");

    let mut out = String::with_capacity(code.len() + header.len() + 2);
    out.push_str(preamble);
    if !preamble.is_empty() && !preamble.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(header);
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
    }
    out
}

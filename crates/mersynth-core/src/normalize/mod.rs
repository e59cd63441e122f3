//! Deterministic cleanup of backend-produced Mermaid text.
//!
//! [`normalize`] runs [`PASSES`] in order. The order is significant: fences must be gone before
//! connective runs are collapsed, and collapsed runs must be canonical before shorthand edges are
//! expanded. Every pass is total and idempotent, so the whole pipeline is too.

use regex::Regex;

/// The canonical directed edge token.
pub const CANONICAL_EDGE: &str = "-->";

pub type Pass = fn(&str) -> String;

pub const PASSES: &[(&str, Pass)] = &[
    ("trim_input", trim_input),
    ("strip_fences", strip_fences),
    ("collapse_connectives", collapse_connectives),
    ("expand_shorthand_edges", expand_shorthand_edges),
    ("rewrap_labels", rewrap_labels),
    ("tidy_lines", tidy_lines),
];

pub fn normalize(raw: &str) -> String {
    PASSES
        .iter()
        .fold(raw.to_string(), |code, (_, pass)| pass(&code))
}

fn line_ending_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r\n?").expect("valid regex"))
}

fn tagged_fence_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)`{3,}[ \t]*mermaid\b").expect("valid regex"))
}

fn bare_fence_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`{3,}").expect("valid regex"))
}

fn bracket_label_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\[\]\n]*)\]").expect("valid regex"))
}

fn brace_label_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}\n]*)\}").expect("valid regex"))
}

/// Unifies line endings and trims surrounding whitespace.
pub fn trim_input(input: &str) -> String {
    line_ending_regex()
        .replace_all(input, "\n")
        .trim()
        .to_string()
}

/// Removes ```` ```mermaid ```` openers and bare fences, then drops lines that consist of
/// nothing but fence markers.
pub fn strip_fences(input: &str) -> String {
    let without_tagged = tagged_fence_regex().replace_all(input, "");
    let without_bare = bare_fence_regex().replace_all(&without_tagged, "");
    without_bare
        .split('\n')
        .filter(|line| !is_fence_marker_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_fence_marker_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    trimmed.chars().all(|c| c == '`') || (trimmed.len() >= 3 && trimmed.chars().all(|c| c == '~'))
}

/// Collapses corrupted connective runs into a single spaced [`CANONICAL_EDGE`].
///
/// A connective run is a maximal span of `-`, `>`, spaces and tabs on one line. It is treated as
/// corrupted when it carries an arrowhead and either the punctuation is split by whitespace
/// (`- - - --> > >`), it has three or more arrowheads (`-->>>`), or an arrowhead is followed by
/// more dashes (`-->-->`). Well-formed edges such as `-->`, `--->`, `->>` and `-->>` are left
/// alone.
pub fn collapse_connectives(input: &str) -> String {
    input
        .split('\n')
        .map(collapse_connectives_in_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_connective_char(ch: char) -> bool {
    matches!(ch, '-' | '>' | ' ' | '\t')
}

fn collapse_connectives_in_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find(is_connective_char) {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let len = tail.find(|c| !is_connective_char(c)).unwrap_or(tail.len());
        let span = &tail[..len];
        if is_corrupted_connective(span) {
            out.push(' ');
            out.push_str(CANONICAL_EDGE);
            out.push(' ');
        } else {
            out.push_str(span);
        }
        rest = &tail[len..];
    }
    out.push_str(rest);
    out
}

fn is_corrupted_connective(span: &str) -> bool {
    let trimmed = span.trim_matches(|c| c == ' ' || c == '\t');
    if !trimmed.contains('>') {
        return false;
    }
    if trimmed.contains([' ', '\t']) {
        return true;
    }
    trimmed.matches('>').count() >= 3 || trimmed.contains(">-")
}

/// Expands shorthand edges: a lone `->` becomes ` --> ` and `->|` becomes ` -->|`.
///
/// `-->`, `->>` (sequence messages), `<->` and `-.->` are not shorthand and stay untouched.
pub fn expand_shorthand_edges(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        if !is_shorthand_arrow_at(&chars, i) {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        while out.ends_with(' ') || out.ends_with('\t') {
            out.pop();
        }
        i += 2;
        if chars.get(i) == Some(&'|') {
            out.push(' ');
            out.push_str(CANONICAL_EDGE);
        } else {
            out.push(' ');
            out.push_str(CANONICAL_EDGE);
            out.push(' ');
            while matches!(chars.get(i), Some(' ' | '\t')) {
                i += 1;
            }
        }
    }
    out
}

fn is_shorthand_arrow_at(chars: &[char], i: usize) -> bool {
    let prev = i.checked_sub(1).and_then(|p| chars.get(p));
    chars.get(i) == Some(&'-')
        && chars.get(i + 1) == Some(&'>')
        && !matches!(prev, Some('-' | '<' | '=' | '.'))
        && !matches!(chars.get(i + 2), Some('>' | '-'))
}

/// Whether `code` contains a lone `->` that [`expand_shorthand_edges`] would rewrite.
pub fn has_shorthand_arrow(code: &str) -> bool {
    let chars: Vec<char> = code.chars().collect();
    (0..chars.len()).any(|i| is_shorthand_arrow_at(&chars, i))
}

/// Re-applies `[...]` and `{...}` label wrapping. Well-formed labels come out unchanged.
pub fn rewrap_labels(input: &str) -> String {
    let bracketed = bracket_label_regex().replace_all(input, |caps: &regex::Captures| {
        format!("[{}]", &caps[1])
    });
    brace_label_regex()
        .replace_all(&bracketed, |caps: &regex::Captures| format!("{{{}}}", &caps[1]))
        .to_string()
}

/// Strips indentation and trailing whitespace from every line and collapses runs of blank lines.
pub fn tidy_lines(input: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in input.split('\n') {
        let line = line.trim();
        if line.is_empty() && lines.last().is_some_and(|prev| prev.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    lines.join("\n").trim().to_string()
}

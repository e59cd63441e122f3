use crate::catalog::{self, Template};
use crate::options::{Complexity, GenerationOptions, Style};

const SIMPLE_DIRECTIVE: &str = "Keep the diagram simple with 3-5 elements.";
const COMPLEX_DIRECTIVE: &str = "Make the diagram comprehensive with detailed relationships.";
const MINIMAL_DIRECTIVE: &str = "Use a minimal style with short labels.";
const DETAILED_DIRECTIVE: &str = "Use a detailed style with descriptive labels and annotations.";

/// Builds the generation prompt for `text`.
///
/// Sentence order is fixed: base prompt, industry context, complexity, style, examples.
pub fn compose(text: &str, template: &Template, options: &GenerationOptions) -> String {
    let industry = options.industry();
    // `{industry}` first, so a description that happens to contain the literal placeholder
    // is left as written.
    let base = template
        .base_prompt
        .replace("{industry}", industry)
        .replace("{description}", text.trim());

    let mut sentences = vec![base];
    push_directives(&mut sentences, options);

    if options.include_examples && !template.examples.is_empty() {
        sentences.push(format!("Examples: {}.", template.examples.join(", ")));
    }

    sentences.join(" ")
}

/// Builds the regeneration prompt used when deterministic repair is not enough.
pub fn compose_repair(
    corrupted: &str,
    original_text: &str,
    template: &Template,
    options: &GenerationOptions,
) -> String {
    let mut sentences = vec![
        format!(
            "The following Mermaid {} code is corrupted and does not render:",
            template.diagram_type_hint()
        ),
        format!("```mermaid\n{}\n```", corrupted.trim()),
        format!(
            "Regenerate it as clean, valid Mermaid code for the {} industry that describes: {}.",
            options.industry(),
            original_text.trim()
        ),
        "Keep the original intent, use a single diagram declaration on the first line, use `-->` for edges, and balance every bracket and brace. Return only valid Mermaid code.".to_string(),
    ];
    push_directives(&mut sentences, options);
    sentences.join(" ")
}

fn push_directives(sentences: &mut Vec<String>, options: &GenerationOptions) {
    if let Some(context) = catalog::industry_context(options.industry()) {
        sentences.push(context.to_string());
    }
    match options.complexity {
        Complexity::Simple => sentences.push(SIMPLE_DIRECTIVE.to_string()),
        Complexity::Complex => sentences.push(COMPLEX_DIRECTIVE.to_string()),
        Complexity::Medium => {}
    }
    match options.style {
        Style::Minimal => sentences.push(MINIMAL_DIRECTIVE.to_string()),
        Style::Detailed => sentences.push(DETAILED_DIRECTIVE.to_string()),
        Style::Professional => {}
    }
}

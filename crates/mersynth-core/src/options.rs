use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_INDUSTRY: &str = "general";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Medium,
    Complex,
}

impl Complexity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
        }
    }
}

impl FromStr for Complexity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "medium" => Ok(Self::Medium),
            "complex" => Ok(Self::Complex),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Minimal,
    Detailed,
    #[default]
    Professional,
}

impl Style {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Detailed => "detailed",
            Self::Professional => "professional",
        }
    }
}

impl FromStr for Style {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(Self::Minimal),
            "detailed" => Ok(Self::Detailed),
            "professional" => Ok(Self::Professional),
            _ => Err(()),
        }
    }
}

/// Caller-supplied knobs for a single generation.
///
/// Every field is optional on the wire; missing fields fall back to the defaults
/// (`general` industry, medium complexity, professional style, no examples).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
    pub template_override: Option<String>,
    pub industry: Option<String>,
    pub complexity: Complexity,
    pub style: Style,
    pub include_examples: bool,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_override = Some(template_id.into());
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_examples(mut self, include_examples: bool) -> Self {
        self.include_examples = include_examples;
        self
    }

    /// The industry to substitute into prompts. Blank values count as unset.
    pub fn industry(&self) -> &str {
        match self.industry.as_deref().map(str::trim) {
            Some(industry) if !industry.is_empty() => industry,
            _ => DEFAULT_INDUSTRY,
        }
    }
}

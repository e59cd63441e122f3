//! Built-in generation templates.
//!
//! The catalog is a fixed, ordered table. Lookups by id are linear; the table is small and its
//! order is significant for selection (see [`crate::select`]).

use crate::options::Complexity;
use crate::{Error, Result};
use serde::Serialize;

pub const DEFAULT_TEMPLATE_ID: &str = "flowchart-basic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateCategory {
    Process,
    Integration,
    Architecture,
    DataModel,
    Lifecycle,
    Planning,
    Strategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Applicability {
    All,
    Only(&'static [&'static str]),
}

impl Applicability {
    pub fn contains(&self, industry: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(list) => list.iter().any(|i| i.eq_ignore_ascii_case(industry)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: TemplateCategory,
    pub applicable_industries: Applicability,
    pub applicable_complexities: &'static [Complexity],
    /// Prompt skeleton with `{description}` and `{industry}` placeholders.
    pub base_prompt: &'static str,
    pub examples: &'static [&'static str],
}

impl Template {
    /// Diagram-type hint sent to the completion backend, e.g. `sequence` for `sequence-api`.
    pub fn diagram_type_hint(&self) -> &'static str {
        self.id.split('-').next().unwrap_or(self.id)
    }

    pub fn applies_to(&self, industry: &str, complexity: Complexity) -> bool {
        self.applicable_industries.contains(industry)
            && self.applicable_complexities.contains(&complexity)
    }
}

/// Industries that plan delivery as phased projects. Retail and healthcare requests are better
/// served by the process and lifecycle templates.
const PROJECT_INDUSTRIES: &[&str] = &[
    "general",
    "banking",
    "insurance",
    "manufacturing",
    "telecommunications",
    "government",
    "education",
    "logistics",
];

const ALL_COMPLEXITIES: &[Complexity] =
    &[Complexity::Simple, Complexity::Medium, Complexity::Complex];

static TEMPLATES: [Template; 7] = [
    Template {
        id: "flowchart-basic",
        name: "Process Flowchart",
        description: "Step-by-step business process or decision flow.",
        category: TemplateCategory::Process,
        applicable_industries: Applicability::All,
        applicable_complexities: ALL_COMPLEXITIES,
        base_prompt: "Create a Mermaid flowchart for the {industry} industry that shows the following process: {description}. Use clear node labels and decision points where appropriate. Return only valid Mermaid code.",
        examples: &[
            "customer onboarding process",
            "order approval flow",
            "incident escalation procedure",
        ],
    },
    Template {
        id: "sequence-api",
        name: "API Sequence Diagram",
        description: "Interactions between services, APIs and external parties over time.",
        category: TemplateCategory::Integration,
        applicable_industries: Applicability::All,
        applicable_complexities: ALL_COMPLEXITIES,
        base_prompt: "Create a Mermaid sequence diagram for the {industry} industry that shows the interactions for: {description}. Declare every participant and label each message. Return only valid Mermaid code.",
        examples: &[
            "payment authorization between checkout and gateway",
            "OAuth token exchange",
            "order status webhook delivery",
        ],
    },
    Template {
        id: "architecture-system",
        name: "System Architecture",
        description: "Components, services and data stores of a system and how they connect.",
        category: TemplateCategory::Architecture,
        applicable_industries: Applicability::All,
        applicable_complexities: &[Complexity::Medium, Complexity::Complex],
        base_prompt: "Create a Mermaid architecture-beta diagram that describes the system architecture for the {industry} industry: {description}. Place related services in groups and show the connections between them. Return only valid Mermaid code.",
        examples: &[
            "microservice platform with API gateway",
            "core banking integration layer",
            "event-driven data pipeline",
        ],
    },
    Template {
        id: "class-entity",
        name: "Entity Class Diagram",
        description: "Domain entities, their attributes and relationships.",
        category: TemplateCategory::DataModel,
        applicable_industries: Applicability::All,
        applicable_complexities: ALL_COMPLEXITIES,
        base_prompt: "Create a Mermaid class diagram for the {industry} industry that models: {description}. Include key attributes and the relationships between entities. Return only valid Mermaid code.",
        examples: &[
            "customer and account model",
            "product catalog entities",
            "policy and claim model",
        ],
    },
    Template {
        id: "state-workflow",
        name: "State Workflow",
        description: "Lifecycle states of an entity and the transitions between them.",
        category: TemplateCategory::Lifecycle,
        applicable_industries: Applicability::All,
        applicable_complexities: ALL_COMPLEXITIES,
        base_prompt: "Create a Mermaid state diagram for the {industry} industry that shows the lifecycle of: {description}. Include the start and end states and label each transition. Return only valid Mermaid code.",
        examples: &[
            "loan application lifecycle",
            "support ticket states",
            "order lifecycle",
        ],
    },
    Template {
        id: "gantt-project",
        name: "Project Timeline",
        description: "Project phases, tasks and milestones on a timeline.",
        category: TemplateCategory::Planning,
        applicable_industries: Applicability::Only(PROJECT_INDUSTRIES),
        applicable_complexities: &[Complexity::Medium, Complexity::Complex],
        base_prompt: "Create a Mermaid gantt chart for the {industry} industry that plans: {description}. Include a title, sections for each phase and realistic task durations. Return only valid Mermaid code.",
        examples: &[
            "core system migration",
            "regulatory reporting rollout",
            "store opening schedule",
        ],
    },
    Template {
        id: "mindmap-concept",
        name: "Concept Mind Map",
        description: "Ideas, capabilities or strategy themes arranged around a central concept.",
        category: TemplateCategory::Strategy,
        applicable_industries: Applicability::All,
        applicable_complexities: &[Complexity::Simple, Complexity::Medium],
        base_prompt: "Create a Mermaid mindmap for the {industry} industry that explores: {description}. Start from a single root concept and branch into related themes. Return only valid Mermaid code.",
        examples: &[
            "digital transformation strategy",
            "customer experience capabilities",
            "data governance concepts",
        ],
    },
];

/// All templates, in selection order.
pub fn templates() -> &'static [Template] {
    &TEMPLATES
}

pub fn find(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

pub fn get(id: &str) -> Result<&'static Template> {
    find(id).ok_or_else(|| Error::UnknownTemplate { id: id.to_string() })
}

pub fn default_template() -> &'static Template {
    // The default id is part of the table above.
    find(DEFAULT_TEMPLATE_ID).unwrap_or(&TEMPLATES[0])
}

/// Templates whose applicability metadata admits the given industry and complexity.
pub fn applicable(industry: &str, complexity: Complexity) -> Vec<&'static Template> {
    TEMPLATES
        .iter()
        .filter(|t| t.applies_to(industry, complexity))
        .collect()
}

/// One-sentence industry context appended to prompts. Unknown industries contribute nothing.
pub fn industry_context(industry: &str) -> Option<&'static str> {
    let key = industry.trim().to_ascii_lowercase();
    INDUSTRY_CONTEXT
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, sentence)| *sentence)
}

pub fn known_industries() -> impl Iterator<Item = &'static str> {
    INDUSTRY_CONTEXT.iter().map(|(k, _)| *k)
}

const INDUSTRY_CONTEXT: &[(&str, &str)] = &[
    (
        "banking",
        "Consider banking concerns such as core banking systems, payment rails, KYC checks and regulatory compliance.",
    ),
    (
        "insurance",
        "Consider insurance concerns such as policy administration, underwriting, claims handling and actuarial data.",
    ),
    (
        "healthcare",
        "Consider healthcare concerns such as patient records, clinical workflows, HIPAA privacy and care coordination.",
    ),
    (
        "retail",
        "Consider retail concerns such as inventory, point of sale, omnichannel orders and customer loyalty.",
    ),
    (
        "manufacturing",
        "Consider manufacturing concerns such as production planning, supply chain, quality control and shop-floor systems.",
    ),
    (
        "telecommunications",
        "Consider telecommunications concerns such as network provisioning, subscriber management, billing and service assurance.",
    ),
    (
        "government",
        "Consider public sector concerns such as citizen services, case management, records retention and accessibility.",
    ),
    (
        "education",
        "Consider education concerns such as enrollment, learning management, assessment and student records.",
    ),
    (
        "logistics",
        "Consider logistics concerns such as shipment tracking, warehouse operations, route planning and carrier integration.",
    ),
];

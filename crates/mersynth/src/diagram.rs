use chrono::{DateTime, Utc};
use mersynth_core::{Complexity, Style};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A generated, cleaned diagram plus its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDiagram {
    pub id: String,
    /// Declared kind of `source_code`, e.g. `flowchart` or `sequence`.
    #[serde(rename = "type")]
    pub diagram_type: String,
    pub title: String,
    pub description: String,
    /// Mermaid text. Always starts with a recognized declaration and has balanced `[]`/`{}`.
    pub source_code: String,
    pub template_id: String,
    pub industry: String,
    pub complexity: Complexity,
    pub style: Style,
    pub created_at: DateTime<Utc>,
    pub metadata: DiagramMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramMetadata {
    pub generation_time_ms: u64,
    pub tokens_used: u32,
    pub version: String,
}

/// `diagram-<unix millis>-<sequence>-<random>`; unique for the lifetime of the process.
pub fn next_diagram_id() -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let millis = Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("diagram-{millis}-{seq}-{}", &random[..8])
}

/// Rough token estimate (four characters per token) for backends that do not report usage.
pub fn estimate_tokens(prompt: &str, content: &str) -> u32 {
    let chars = prompt.chars().count() + content.chars().count();
    u32::try_from(chars.div_ceil(4)).unwrap_or(u32::MAX)
}

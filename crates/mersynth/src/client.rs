//! The completion backend boundary.
//!
//! `mersynth` never talks to a network itself. Callers plug in a [`GenerationClient`] that
//! forwards a [`GenerationRequest`] to whatever text-completion service they use.

use mersynth_core::SamplingParams;
use serde::{Deserialize, Serialize};
use std::future::Future;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Requested diagram kind, derived from the template id (e.g. `sequence`).
    pub diagram_type_hint: String,
    pub prompt_text: String,
    #[serde(rename = "params")]
    pub sampling: SamplingParams,
}

/// Untrusted backend output. `content` may be fenced, corrupted or missing its declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCompletion {
    pub content: String,
    pub title: String,
    pub description: String,
    /// Token usage, when the backend reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
}

impl RawCompletion {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub trait GenerationClient {
    /// Executes one completion. Errors are surfaced to the caller as-is; nothing is retried.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<RawCompletion, BackendError>> + Send;
}

/// A client that answers every request with the same completion.
///
/// Useful for replaying a recorded backend response through the pipeline.
#[derive(Debug, Clone, Default)]
pub struct StaticClient {
    completion: RawCompletion,
}

impl StaticClient {
    pub fn new(completion: RawCompletion) -> Self {
        Self { completion }
    }
}

impl GenerationClient for StaticClient {
    async fn generate(&self, _request: &GenerationRequest) -> Result<RawCompletion, BackendError> {
        Ok(self.completion.clone())
    }
}

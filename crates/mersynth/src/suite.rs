//! Best-effort generation of several related diagrams for one request.

use crate::client::GenerationClient;
use crate::diagram::GeneratedDiagram;
use crate::synth::Synthesizer;
use futures::future::join_all;
use mersynth_core::{GenerationOptions, suite_candidates};

/// Per-candidate result of a suite run.
#[derive(Debug, Clone)]
pub enum CandidateOutcome {
    Success(GeneratedDiagram),
    Failure {
        template_id: &'static str,
        reason: String,
    },
}

impl CandidateOutcome {
    pub fn template_id(&self) -> &str {
        match self {
            Self::Success(diagram) => &diagram.template_id,
            Self::Failure { template_id, .. } => template_id,
        }
    }
}

/// Outcomes of a suite run, in candidate priority order.
#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub outcomes: Vec<CandidateOutcome>,
}

impl SuiteReport {
    pub fn diagrams(&self) -> impl Iterator<Item = &GeneratedDiagram> {
        self.outcomes.iter().filter_map(|o| match o {
            CandidateOutcome::Success(diagram) => Some(diagram),
            CandidateOutcome::Failure { .. } => None,
        })
    }

    /// `(template_id, reason)` for every failed candidate.
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            CandidateOutcome::Failure {
                template_id,
                reason,
            } => Some((*template_id, reason.as_str())),
            CandidateOutcome::Success(_) => None,
        })
    }

    pub fn into_diagrams(self) -> Vec<GeneratedDiagram> {
        self.outcomes
            .into_iter()
            .filter_map(|o| match o {
                CandidateOutcome::Success(diagram) => Some(diagram),
                CandidateOutcome::Failure { .. } => None,
            })
            .collect()
    }
}

impl<C: GenerationClient> Synthesizer<C> {
    /// Generates up to three diagrams for `text`, one per relevant template.
    ///
    /// Failed candidates are logged and left out; the result may be shorter than the candidate
    /// list, or empty when every candidate failed.
    pub async fn generate_diagram_suite(
        &self,
        text: &str,
        options: &GenerationOptions,
    ) -> Vec<GeneratedDiagram> {
        self.generate_diagram_suite_report(text, options)
            .await
            .into_diagrams()
    }

    /// Like [`Synthesizer::generate_diagram_suite`], but keeps failed candidates in the report.
    ///
    /// Candidates run concurrently and every one is attempted regardless of sibling failures.
    /// Outcomes follow candidate order, not completion order.
    pub async fn generate_diagram_suite_report(
        &self,
        text: &str,
        options: &GenerationOptions,
    ) -> SuiteReport {
        let candidates = suite_candidates(text);
        tracing::debug!(
            candidates = ?candidates.iter().map(|t| t.id).collect::<Vec<_>>(),
            "generating diagram suite"
        );

        let attempts = candidates.into_iter().map(|template| {
            let forced = options.clone().with_template(template.id);
            async move {
                match self.generate_diagram(text, &forced).await {
                    Ok(diagram) => CandidateOutcome::Success(diagram),
                    Err(err) => {
                        tracing::warn!(template = template.id, error = %err, "suite candidate failed");
                        CandidateOutcome::Failure {
                            template_id: template.id,
                            reason: err.to_string(),
                        }
                    }
                }
            }
        });

        SuiteReport {
            outcomes: join_all(attempts).await,
        }
    }
}

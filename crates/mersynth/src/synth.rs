use crate::client::{BackendError, GenerationClient, GenerationRequest, RawCompletion};
use crate::diagram::{DiagramMetadata, GeneratedDiagram, estimate_tokens, next_diagram_id};
use mersynth_core::{
    GenerationOptions, SamplingParams, SynthesisConfig, Template, declaration, normalize, prompt,
    repair, select, validate,
};
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("Diagram generation failed for template `{template_id}`: {source}")]
    Generation {
        template_id: String,
        #[source]
        source: BackendError,
    },

    #[error("Generation backend returned no diagram content for template `{template_id}`")]
    EmptyCompletion { template_id: String },

    #[error(transparent)]
    Config(#[from] mersynth_core::Error),
}

pub type SynthesisResult<T> = std::result::Result<T, SynthesisError>;

/// Turns descriptions into cleaned Mermaid diagrams using a [`GenerationClient`].
///
/// Calls are independent: a `Synthesizer` holds no per-call state and may be shared across
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct Synthesizer<C> {
    client: C,
    config: SynthesisConfig,
}

impl<C: GenerationClient> Synthesizer<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            config: SynthesisConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SynthesisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Selects a template, asks the backend for a diagram and cleans the answer.
    ///
    /// Backend failures are returned as [`SynthesisError::Generation`]; nothing is retried and no
    /// partial diagram is produced.
    pub async fn generate_diagram(
        &self,
        text: &str,
        options: &GenerationOptions,
    ) -> SynthesisResult<GeneratedDiagram> {
        let started = Instant::now();
        let options = self.effective_options(options);
        let template = select::select(text, &options);
        let request = self.request_for(
            template,
            prompt::compose(text, template, &options),
            self.config.sampling,
        );

        let completion = self.complete(template, &request).await?;
        Ok(self.package(text, template, &options, &request, completion, started))
    }

    /// Asks the backend to regenerate `corrupted_code` from scratch, keeping the original intent.
    ///
    /// This is the manual escape hatch for output the deterministic pipeline cannot fix locally
    /// (e.g. the wrong graph shape). The regenerated text goes through the same cleanup.
    pub async fn fix_corrupted_code(
        &self,
        corrupted_code: &str,
        original_text: &str,
        options: &GenerationOptions,
    ) -> SynthesisResult<GeneratedDiagram> {
        let started = Instant::now();
        let options = self.effective_options(options);
        let template = select::select(original_text, &options);
        let request = self.request_for(
            template,
            prompt::compose_repair(corrupted_code, original_text, template, &options),
            self.config.repair_sampling,
        );

        let completion = self.complete(template, &request).await?;
        Ok(self.package(original_text, template, &options, &request, completion, started))
    }

    fn effective_options(&self, options: &GenerationOptions) -> GenerationOptions {
        let mut options = options.clone();
        if options.industry.as_deref().is_none_or(|i| i.trim().is_empty()) {
            options.industry = Some(self.config.default_industry.clone());
        }
        options
    }

    fn request_for(
        &self,
        template: &Template,
        prompt_text: String,
        sampling: SamplingParams,
    ) -> GenerationRequest {
        GenerationRequest {
            diagram_type_hint: template.diagram_type_hint().to_string(),
            prompt_text,
            sampling,
        }
    }

    async fn complete(
        &self,
        template: &Template,
        request: &GenerationRequest,
    ) -> SynthesisResult<RawCompletion> {
        tracing::debug!(
            template = template.id,
            hint = %request.diagram_type_hint,
            "requesting completion"
        );
        let completion =
            self.client
                .generate(request)
                .await
                .map_err(|source| SynthesisError::Generation {
                    template_id: template.id.to_string(),
                    source,
                })?;

        if completion.content.trim().is_empty() {
            return Err(SynthesisError::EmptyCompletion {
                template_id: template.id.to_string(),
            });
        }
        Ok(completion)
    }

    fn package(
        &self,
        text: &str,
        template: &Template,
        options: &GenerationOptions,
        request: &GenerationRequest,
        completion: RawCompletion,
        started: Instant,
    ) -> GeneratedDiagram {
        let source_code = clean_completion(&completion.content);
        let diagram_type = declaration::detect_declaration(&source_code)
            .map(|d| d.id)
            .unwrap_or_else(|| template.diagram_type_hint());
        let tokens_used = completion
            .tokens_used
            .unwrap_or_else(|| estimate_tokens(&request.prompt_text, &completion.content));

        let title = match completion.title.trim() {
            "" => template.name.to_string(),
            title => title.to_string(),
        };
        let description = match completion.description.trim() {
            "" => text.trim().to_string(),
            description => description.to_string(),
        };

        let diagram = GeneratedDiagram {
            id: next_diagram_id(),
            diagram_type: diagram_type.to_string(),
            title,
            description,
            source_code,
            template_id: template.id.to_string(),
            industry: options.industry().to_string(),
            complexity: options.complexity,
            style: options.style,
            created_at: chrono::Utc::now(),
            metadata: DiagramMetadata {
                generation_time_ms: u64::try_from(started.elapsed().as_millis())
                    .unwrap_or(u64::MAX),
                tokens_used,
                version: self.config.version.clone(),
            },
        };
        tracing::info!(
            id = %diagram.id,
            template = template.id,
            diagram_type = %diagram.diagram_type,
            "generated diagram"
        );
        diagram
    }
}

/// normalize -> ensure declaration -> detect -> repair.
fn clean_completion(content: &str) -> String {
    let code = declaration::ensure_declaration(&normalize::normalize(content));
    let issues = validate::detect(&code);
    if issues.is_empty() {
        return code;
    }
    tracing::debug!(count = issues.len(), "repairing structural issues");
    repair::repair(&code, &issues)
}

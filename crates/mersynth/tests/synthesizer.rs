use futures::executor::block_on;
use mersynth::{
    BackendError, Complexity, GenerationClient, GenerationOptions, GenerationRequest,
    RawCompletion, SamplingParams, StaticClient, SynthesisConfig, SynthesisError, Synthesizer,
};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};

/// Answers by diagram type hint and records every request it sees.
#[derive(Default)]
struct ScriptedClient {
    answers: HashMap<&'static str, Result<RawCompletion, BackendError>>,
    delays: HashMap<&'static str, usize>,
    requests: Mutex<Vec<GenerationRequest>>,
    completed: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn answer(mut self, hint: &'static str, content: &str) -> Self {
        self.answers.insert(hint, Ok(RawCompletion::new(content)));
        self
    }

    fn fail(mut self, hint: &'static str, message: &str) -> Self {
        self.answers.insert(hint, Err(BackendError::new(message)));
        self
    }

    fn delay(mut self, hint: &'static str, polls: usize) -> Self {
        self.delays.insert(hint, polls);
        self
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

impl GenerationClient for ScriptedClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<RawCompletion, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        let hint = request.diagram_type_hint.as_str();
        YieldNow(self.delays.get(hint).copied().unwrap_or(0)).await;
        self.completed.lock().unwrap().push(hint.to_string());
        self.answers
            .get(hint)
            .cloned()
            .unwrap_or_else(|| Err(BackendError::new(format!("no answer scripted for {hint}"))))
    }
}

/// Returns `Pending` a fixed number of times before completing.
struct YieldNow(usize);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 == 0 {
            return Poll::Ready(());
        }
        self.0 -= 1;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[test]
fn generate_diagram_cleans_fenced_flowchart() {
    let client = ScriptedClient::default().answer(
        "flowchart",
        "```mermaid\nflowchart TD\nA[Receive order] --> B{In stock?}\nB --> C[Ship]\n```",
    );
    let synth = Synthesizer::new(client);

    let diagram = block_on(synth.generate_diagram(
        "design an order fulfillment workflow",
        &GenerationOptions::default(),
    ))
    .unwrap();

    assert_eq!(diagram.template_id, "flowchart-basic");
    assert_eq!(diagram.diagram_type, "flowchart");
    assert_eq!(
        diagram.source_code,
        "flowchart TD\nA[Receive order] --> B{In stock?}\nB --> C[Ship]"
    );
    assert_eq!(diagram.industry, "general");
    assert_eq!(diagram.complexity, Complexity::Medium);
    assert_eq!(diagram.metadata.version, "1.0");
    assert!(diagram.metadata.tokens_used > 0);
    assert!(diagram.id.starts_with("diagram-"));
}

#[test]
fn generate_diagram_sends_hint_prompt_and_sampling() {
    let client = ScriptedClient::default().answer("sequence", "participant A\nA->>B: hi");
    let synth = Synthesizer::new(client);
    let options = GenerationOptions::default().with_industry("banking");

    let diagram =
        block_on(synth.generate_diagram("document the payment API", &options)).unwrap();

    let requests = synth.client().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].diagram_type_hint, "sequence");
    assert!(requests[0].prompt_text.contains("banking"));
    assert!(requests[0].prompt_text.contains("document the payment API"));
    assert_eq!(requests[0].sampling, SamplingParams::new(0.7, 2000));

    assert_eq!(diagram.template_id, "sequence-api");
    assert_eq!(diagram.diagram_type, "sequence");
    assert_eq!(diagram.source_code, "sequenceDiagram\nparticipant A\nA->>B: hi");
    assert_eq!(diagram.industry, "banking");
}

#[test]
fn generate_diagram_repairs_structural_defects() {
    let client = ScriptedClient::default().answer("flowchart", "A[Start ->B");
    let synth = Synthesizer::new(client);

    let diagram =
        block_on(synth.generate_diagram("a simple process", &GenerationOptions::default()))
            .unwrap();

    assert_eq!(diagram.source_code, "flowchart TD\nA[Start --> B]");
    assert!(mersynth::detect(&diagram.source_code).is_empty());
}

#[test]
fn generate_diagram_falls_back_to_template_name_and_input_text() {
    let client = ScriptedClient::default().answer("flowchart", "flowchart TD\nA --> B");
    let synth = Synthesizer::new(client);

    let diagram = block_on(
        synth.generate_diagram("  an approval process  ", &GenerationOptions::default()),
    )
    .unwrap();

    assert_eq!(diagram.title, "Process Flowchart");
    assert_eq!(diagram.description, "an approval process");
}

#[test]
fn generate_diagram_keeps_backend_title_and_description() {
    let completion = RawCompletion::new("flowchart TD\nA --> B")
        .with_title("Loan approval")
        .with_description("How loans get approved");
    let synth = Synthesizer::new(StaticClient::new(completion));

    let diagram =
        block_on(synth.generate_diagram("loan process", &GenerationOptions::default())).unwrap();

    assert_eq!(diagram.title, "Loan approval");
    assert_eq!(diagram.description, "How loans get approved");
}

#[test]
fn generate_diagram_honors_template_override() {
    let client = ScriptedClient::default().answer("gantt", "gantt\ntitle Plan\nsection A\nTask :a1, 2024-01-01, 3d");
    let synth = Synthesizer::new(client);
    let options = GenerationOptions::default().with_template("gantt-project");

    let diagram = block_on(synth.generate_diagram("an approval process", &options)).unwrap();

    assert_eq!(diagram.template_id, "gantt-project");
    assert_eq!(diagram.diagram_type, "gantt");
}

#[test]
fn backend_failure_surfaces_as_generation_error() {
    let client = ScriptedClient::default().fail("flowchart", "rate limited");
    let synth = Synthesizer::new(client);

    let err = block_on(synth.generate_diagram("a process", &GenerationOptions::default()))
        .unwrap_err();

    match &err {
        SynthesisError::Generation {
            template_id,
            source,
        } => {
            assert_eq!(template_id, "flowchart-basic");
            assert_eq!(source.message, "rate limited");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("rate limited"));
}

#[test]
fn blank_completion_is_rejected() {
    let synth = Synthesizer::new(StaticClient::new(RawCompletion::new("  \n ")));

    let err = block_on(synth.generate_diagram("a process", &GenerationOptions::default()))
        .unwrap_err();

    assert!(matches!(
        err,
        SynthesisError::EmptyCompletion { ref template_id } if template_id == "flowchart-basic"
    ));
}

#[test]
fn configured_default_industry_and_sampling_apply() {
    let config = SynthesisConfig::from_json_str(
        r#"{"sampling":{"temperature":0.3,"maxTokens":512},"defaultIndustry":"retail"}"#,
    )
    .unwrap();
    let client = ScriptedClient::default().answer("flowchart", "flowchart TD\nA --> B");
    let synth = Synthesizer::new(client).with_config(config);

    let diagram =
        block_on(synth.generate_diagram("a returns process", &GenerationOptions::default()))
            .unwrap();

    assert_eq!(diagram.industry, "retail");
    let requests = synth.client().requests();
    assert_eq!(requests[0].sampling, SamplingParams::new(0.3, 512));
    assert!(requests[0].prompt_text.contains("retail"));
}

#[test]
fn fix_corrupted_code_uses_repair_prompt_and_sampling() {
    let client = ScriptedClient::default().answer("flowchart", "flowchart TD\nA[Start] --> B[End]");
    let synth = Synthesizer::new(client);

    let diagram = block_on(synth.fix_corrupted_code(
        "flowchart TD\nA[Start -> > B",
        "a simple approval process",
        &GenerationOptions::default(),
    ))
    .unwrap();

    assert_eq!(diagram.source_code, "flowchart TD\nA[Start] --> B[End]");
    assert_eq!(diagram.description, "a simple approval process");

    let requests = synth.client().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].sampling, SamplingParams::new(0.2, 2000));
    assert!(
        requests[0]
            .prompt_text
            .starts_with("The following Mermaid flowchart code is corrupted")
    );
    assert!(requests[0].prompt_text.contains("A[Start -> > B"));
}

#[test]
fn suite_for_banking_integrations_returns_architecture_then_sequence() {
    let client = ScriptedClient::default()
        .answer("architecture", "architecture-beta\nservice api(server)[API]")
        .answer("sequence", "sequenceDiagram\nparticipant Core\nCore->>Ledger: post");
    let synth = Synthesizer::new(client);

    let diagrams = block_on(synth.generate_diagram_suite(
        "explain our microservice architecture and its API interactions",
        &GenerationOptions::default().with_industry("banking"),
    ));

    let ids: Vec<_> = diagrams.iter().map(|d| d.template_id.as_str()).collect();
    assert_eq!(ids, ["architecture-system", "sequence-api"]);
    assert_eq!(diagrams[0].diagram_type, "architecture");
    assert_eq!(diagrams[1].diagram_type, "sequence");
    assert_ne!(diagrams[0].id, diagrams[1].id);
}

#[test]
fn suite_excludes_failed_candidates() {
    let client = ScriptedClient::default()
        .answer("architecture", "architecture-beta\nservice api(server)[API]")
        .fail("sequence", "timeout");
    let synth = Synthesizer::new(client);
    let text = "core banking system with payment API integrations";

    let report = block_on(synth.generate_diagram_suite_report(text, &GenerationOptions::default()));

    let ids: Vec<_> = report.diagrams().map(|d| d.template_id.as_str()).collect();
    assert_eq!(ids, ["architecture-system"]);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "sequence-api");
    assert!(failures[0].1.contains("timeout"));

    // Both candidates were attempted.
    assert_eq!(synth.client().requests().len(), 2);
}

#[test]
fn suite_is_empty_when_every_candidate_fails() {
    let synth = Synthesizer::new(ScriptedClient::default());

    let diagrams = block_on(synth.generate_diagram_suite(
        "core banking system with payment API integrations",
        &GenerationOptions::default(),
    ));

    assert!(diagrams.is_empty());
    assert_eq!(synth.client().requests().len(), 2);
}

#[test]
fn suite_is_capped_at_three_candidates() {
    let client = ScriptedClient::default()
        .answer("flowchart", "flowchart TD\nA --> B")
        .answer("architecture", "architecture-beta\nservice a(server)[A]")
        .answer("sequence", "sequenceDiagram\nA->>B: x")
        .answer("mindmap", "mindmap\nroot");
    let synth = Synthesizer::new(client);

    let diagrams = block_on(synth.generate_diagram_suite(
        "process architecture for the api and a concept overview",
        &GenerationOptions::default(),
    ));

    let ids: Vec<_> = diagrams.iter().map(|d| d.template_id.as_str()).collect();
    assert_eq!(ids, ["flowchart-basic", "architecture-system", "sequence-api"]);
    assert_eq!(synth.client().requests().len(), 3);
}

#[test]
fn suite_falls_back_to_default_template() {
    let client = ScriptedClient::default().answer("flowchart", "flowchart TD\nA --> B");
    let synth = Synthesizer::new(client);

    let diagrams = block_on(synth.generate_diagram_suite(
        "quarterly revenue by region",
        &GenerationOptions::default(),
    ));

    assert_eq!(diagrams.len(), 1);
    assert_eq!(diagrams[0].template_id, "flowchart-basic");
}

#[test]
fn suite_order_follows_candidates_not_completion() {
    let client = ScriptedClient::default()
        .answer("architecture", "architecture-beta\nservice api(server)[API]")
        .answer("sequence", "sequenceDiagram\nA->>B: x")
        .delay("architecture", 5);
    let synth = Synthesizer::new(client);

    let diagrams = block_on(synth.generate_diagram_suite(
        "core banking system with payment API integrations",
        &GenerationOptions::default(),
    ));

    assert_eq!(synth.client().completed(), ["sequence", "architecture"]);
    let ids: Vec<_> = diagrams.iter().map(|d| d.template_id.as_str()).collect();
    assert_eq!(ids, ["architecture-system", "sequence-api"]);
}

#[test]
fn diagram_ids_are_unique() {
    let ids: std::collections::HashSet<_> = (0..500).map(|_| mersynth::next_diagram_id()).collect();
    assert_eq!(ids.len(), 500);
}

#[test]
fn generated_diagram_serializes_type_key() {
    let synth = Synthesizer::new(StaticClient::new(RawCompletion::new("pie\n\"A\" : 1")));

    let diagram =
        block_on(synth.generate_diagram("a process", &GenerationOptions::default())).unwrap();
    let json = serde_json::to_value(&diagram).unwrap();

    assert_eq!(json["type"], "pie");
    assert_eq!(json["templateId"], "flowchart-basic");
    assert_eq!(json["complexity"], "medium");
    assert!(json["metadata"]["generationTimeMs"].is_u64());
    assert!(json.get("diagramType").is_none());
}

#[test]
fn token_estimate_rounds_up() {
    assert_eq!(mersynth::estimate_tokens("abcd", "e"), 2);
    assert_eq!(mersynth::estimate_tokens("", ""), 0);
}

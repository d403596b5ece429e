//! End-to-end integration tests for the ragline pipeline.
//!
//! These exercise the full path from query to answer: retrieval against a
//! vector store, context assembly, the two-round tool-calling protocol, and
//! the real time tool speaking HTTP to a local stub server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use ragline_agent::{AgentService, NO_CONTEXT_SENTINEL, Orchestrator};
use ragline_core::error::ProviderError;
use ragline_core::event::EventBus;
use ragline_core::message::{Message, MessageToolCall, Role};
use ragline_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, Usage,
};
use ragline_core::tool::ToolRegistry;
use ragline_core::vector::Metadata;
use ragline_tools::CurrentTimeTool;
use ragline_vector::{EmbeddingService, InMemoryStore, VectorService};

// ── Mock provider ─────────────────────────────────────────────────────────

/// Returns scripted completion responses in sequence, records requests, and
/// embeds deterministically by leading word.
struct ScriptedProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
    served: Mutex<usize>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            served: Mutex::new(0),
        }
    }

    fn calls(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let mut served = self.served.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let resp = responses
            .get(*served)
            .unwrap_or_else(|| {
                panic!(
                    "ScriptedProvider exhausted: call #{}, have {}",
                    *served + 1,
                    responses.len()
                )
            })
            .clone();
        *served += 1;
        Ok(resp)
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        let embeddings = request
            .inputs
            .iter()
            .map(|t| {
                let topic = t.split_whitespace().next().unwrap_or("").to_lowercase();
                let h: u32 = topic
                    .bytes()
                    .fold(7u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
                vec![
                    (h & 0xff) as f32 / 255.0,
                    ((h >> 8) & 0xff) as f32 / 255.0,
                    ((h >> 16) & 0xff) as f32 / 255.0,
                ]
            })
            .collect();
        Ok(EmbeddingResponse {
            embeddings,
            model: request.model,
            usage: None,
        })
    }
}

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock".into(),
    }
}

fn tool_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    let mut msg = Message::assistant("");
    msg.tool_calls = tool_calls;
    ProviderResponse {
        message: msg,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock".into(),
    }
}

fn make_tool_call(id: &str, name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

// ── Stub time server ──────────────────────────────────────────────────────

/// Serve a fixed HTTP response on a random local port; returns the base URL.
async fn spawn_time_stub(status_line: &'static str, body: &'static str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });

    format!("http://{addr}")
}

// ── Wiring ────────────────────────────────────────────────────────────────

fn build_service(
    provider: Arc<ScriptedProvider>,
    tools: ToolRegistry,
) -> (AgentService, Arc<VectorService>) {
    let event_bus = Arc::new(EventBus::default());
    let vectors = Arc::new(VectorService::new(
        Arc::new(InMemoryStore::new("e2e")),
        EmbeddingService::new(provider.clone(), "embedding-query"),
    ));
    let orchestrator = Orchestrator::new(
        provider,
        "mock-model",
        0.3,
        Arc::new(tools),
        event_bus.clone(),
    );
    (
        AgentService::new(orchestrator, vectors.clone(), event_bus),
        vectors,
    )
}

fn seoul_metadata() -> Metadata {
    let mut m = Metadata::new();
    m.insert("office_name".into(), "Seoul HQ".into());
    m.insert("timezone".into(), "Asia/Seoul".into());
    m.insert("country".into(), "South Korea".into());
    m
}

// ── E2E: retrieval + real time tool ───────────────────────────────────────

#[tokio::test]
async fn e2e_seoul_office_call_with_live_time_tool() {
    let base_url = spawn_time_stub(
        "200 OK",
        r#"{"timezone":"Asia/Seoul","datetime":"2024-05-02T21:03:12.000000+09:00","utc_offset":"+09:00"}"#,
    )
    .await;

    let mut tools = ToolRegistry::new();
    tools.register(Box::new(
        CurrentTimeTool::new(&base_url, Duration::from_secs(5)).unwrap(),
    ));

    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![make_tool_call(
            "call_time",
            "current_time",
            serde_json::json!({"timezone": "Asia/Seoul"}),
        )]),
        text_response("It is 9pm in Seoul, so the office is closed right now."),
    ]));

    let (service, vectors) = build_service(provider.clone(), tools);
    vectors
        .add_documents(
            vec!["seoul office is open 9am to 6pm KST".into()],
            Some(vec![seoul_metadata()]),
            None,
        )
        .await
        .unwrap();

    let outcome = service
        .process_query("seoul office — can I call them now?", 3)
        .await
        .unwrap();

    // Final answer comes from the second completion.
    assert_eq!(
        outcome.answer,
        "It is 9pm in Seoul, so the office is closed right now."
    );

    let calls = provider.calls();
    assert_eq!(calls.len(), 2);

    // Round 1 carried the tool schemas; round 2 carried none.
    assert!(!calls[0].tools.is_empty());
    assert!(calls[1].tools.is_empty());

    // The tool result the model saw came from the stub time server.
    let tool_msg = calls[1]
        .messages
        .iter()
        .find(|m| m.role == Role::Tool)
        .unwrap();
    assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_time"));
    let payload: serde_json::Value = serde_json::from_str(&tool_msg.content).unwrap();
    assert_eq!(payload["timezone"], "Asia/Seoul");
    assert_eq!(payload["utc_offset"], "+09:00");
    assert!(
        payload["datetime"]
            .as_str()
            .unwrap()
            .starts_with("2024-05-02T21:03:12")
    );

    // Retrieval context reached the prompt.
    assert!(outcome.context_used.contains("Seoul HQ"));
    assert_eq!(outcome.retrieved_documents.len(), 1);
}

#[tokio::test]
async fn e2e_unknown_timezone_degrades_to_error_payload() {
    let base_url = spawn_time_stub("404 Not Found", r#"{"error":"unknown timezone"}"#).await;

    let mut tools = ToolRegistry::new();
    tools.register(Box::new(
        CurrentTimeTool::new(&base_url, Duration::from_secs(5)).unwrap(),
    ));

    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![make_tool_call(
            "call_mars",
            "current_time",
            serde_json::json!({"timezone": "Mars/Phobos"}),
        )]),
        text_response("I could not determine the time on Phobos."),
    ]));

    let (service, _vectors) = build_service(provider.clone(), tools);

    let outcome = service
        .process_query("what time is it on Mars/Phobos?", 3)
        .await
        .unwrap();

    // The turn still completed with an answer.
    assert_eq!(outcome.answer, "I could not determine the time on Phobos.");

    // The tool result is the exact structured error payload.
    let tool_msg = provider.calls()[1]
        .messages
        .iter()
        .find(|m| m.role == Role::Tool)
        .cloned()
        .unwrap();
    assert_eq!(
        tool_msg.content,
        r#"{"error":"Timezone 'Mars/Phobos' not found."}"#
    );
}

#[tokio::test]
async fn e2e_empty_collection_answers_via_sentinel() {
    let provider = Arc::new(ScriptedProvider::new(vec![text_response(
        "I do not have internal regulations about that.",
    )]));
    let (service, _vectors) = build_service(provider.clone(), ToolRegistry::new());

    let outcome = service.process_query("anything", 3).await.unwrap();

    assert_eq!(outcome.context_used, NO_CONTEXT_SENTINEL);
    assert!(!outcome.answer.is_empty());
    assert_eq!(provider.calls().len(), 1);
}

//! Shared test helpers: scripted providers and recording stub tools.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ragline_core::error::{ProviderError, ToolError};
use ragline_core::message::{Message, MessageToolCall};
use ragline_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use ragline_core::tool::{Tool, ToolResult};

/// A mock provider that returns a sequence of scripted responses and records
/// every request it receives.
pub struct ScriptedProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
    failure: Option<ProviderError>,
    served: Mutex<usize>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            failure: None,
            served: Mutex::new(0),
        }
    }

    /// A provider whose every call fails with the given error.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            failure: Some(error),
            served: Mutex::new(0),
        }
    }

    /// All requests received so far, in call order.
    pub fn calls(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let mut served = self.served.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let response = responses
            .get(*served)
            .unwrap_or_else(|| {
                panic!(
                    "ScriptedProvider: no response for call #{} (have {})",
                    *served + 1,
                    responses.len()
                )
            })
            .clone();
        *served += 1;
        Ok(response)
    }
}

/// Create a plain text response (no tool calls).
pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a pure tool-call response (null content on the wire).
pub fn tool_call_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    let mut msg = Message::assistant("");
    msg.tool_calls = tool_calls;
    ProviderResponse {
        message: msg,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call with explicit id, name, raw arguments.
pub fn tool_call(id: &str, name: &str, arguments: &str) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: arguments.into(),
    }
}

/// One recorded tool invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub arguments: serde_json::Value,
}

/// A stub tool that returns a fixed payload and records its invocations.
pub struct StubTool {
    name: String,
    output: String,
    log: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StubTool {
    /// Build a stub plus a handle to its invocation log.
    pub fn recording(
        name: &str,
        output: &str,
    ) -> (Self, Arc<Mutex<Vec<RecordedCall>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                name: name.into(),
                output: output.into(),
                log: log.clone(),
            },
            log,
        )
    }
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Stub tool for tests"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        self.log.lock().unwrap().push(RecordedCall { arguments });
        Ok(ToolResult::ok("", &self.output))
    }
}

//! The tool-calling orchestrator — the two-round conversation protocol.
//!
//! A turn spans at most two completion calls:
//!
//! 1. Submit `[system?, user]` with the full tool schema set, leaving the
//!    choice to the model. No tool calls in the reply → its content is the
//!    final answer.
//! 2. Otherwise dispatch every requested call through the registry, append
//!    one tool result per request (correlation ids preserved), and resubmit
//!    the full history **without** tool schemas. The second reply is the
//!    final answer; no further tool calls are permitted within the turn.
//!
//! A failing call never aborts the turn: unknown names, bad arguments, and
//! handler failures all degrade to error-shaped result strings the model
//! can explain. A correlation-id mismatch between requests and results is
//! an orchestration bug and fails the turn loudly.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use ragline_core::error::{Error, Result, ToolError};
use ragline_core::event::{DomainEvent, EventBus};
use ragline_core::message::{Message, MessageToolCall};
use ragline_core::provider::{Provider, ProviderRequest, ToolChoice};
use ragline_core::tool::{ToolCall, ToolRegistry, ToolResult};

/// Returned instead of an empty completion, so callers never see an empty
/// answer presented as success.
pub const FALLBACK_ANSWER: &str =
    "I checked the available information but could not produce an answer. \
     Please try rephrasing your question.";

/// The result of one orchestrated turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Turn id — also the key for this turn's domain events
    pub turn_id: String,

    /// The final natural-language answer
    pub answer: String,

    /// How many tool invocations were dispatched
    pub tool_calls: usize,

    /// Completion calls made (1 when the model answered directly, else 2)
    pub rounds: u8,
}

/// Drives the two-round tool-calling protocol.
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    event_bus: Arc<EventBus>,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            event_bus,
        }
    }

    /// Cap the tokens generated per completion.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Generate a fresh turn id.
    pub fn new_turn_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Run one turn. `turn_id` keys this turn's events and logs.
    pub async fn execute(
        &self,
        turn_id: &str,
        system_prompt: Option<&str>,
        user_prompt: &str,
    ) -> Result<TurnOutcome> {
        info!(turn_id, "Processing turn");
        self.event_bus.publish(DomainEvent::QueryReceived {
            turn_id: turn_id.into(),
            query_preview: preview(user_prompt),
            timestamp: chrono::Utc::now(),
        });

        let mut history = Vec::with_capacity(4);
        if let Some(system) = system_prompt {
            history.push(Message::system(system));
        }
        history.push(Message::user(user_prompt));

        // ── Round 1: full tool schema set, model decides ──
        let mut request = ProviderRequest::new(&self.model, history.clone());
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;
        request.tools = self.tools.definitions();
        if !request.tools.is_empty() {
            request.tool_choice = Some(ToolChoice::Auto);
        }

        let response = self.provider.complete(request).await?;
        self.publish_response(turn_id, 1, &response);

        if !response.message.has_tool_calls() {
            // One round trip — the content is the final answer.
            return Ok(TurnOutcome {
                turn_id: turn_id.into(),
                answer: ensure_non_empty(response.message.content.clone()),
                tool_calls: 0,
                rounds: 1,
            });
        }

        // ── Tool dispatch ──
        let requests = response.message.tool_calls.clone();
        history.push(response.message);

        debug!(turn_id, count = requests.len(), "Executing tool calls");

        let mut results = Vec::with_capacity(requests.len());
        for tc in &requests {
            results.push(self.dispatch(turn_id, tc).await);
        }

        verify_correlation(turn_id, &requests, &results)?;

        for result in &results {
            history.push(Message::tool_result(&result.call_id, &result.output));
        }

        // ── Round 2: resubmit without tool schemas ──
        let mut request = ProviderRequest::new(&self.model, history);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        let response = self.provider.complete(request).await?;
        self.publish_response(turn_id, 2, &response);

        Ok(TurnOutcome {
            turn_id: turn_id.into(),
            answer: ensure_non_empty(response.message.content),
            tool_calls: results.len(),
            rounds: 2,
        })
    }

    /// Execute one tool call, degrading every failure to an error-shaped
    /// result so one bad call cannot abort the others.
    async fn dispatch(&self, turn_id: &str, tc: &MessageToolCall) -> ToolResult {
        let start = Instant::now();

        let result = match serde_json::from_str::<serde_json::Value>(&tc.arguments) {
            Err(e) => {
                warn!(turn_id, tool = %tc.name, error = %e, "Tool arguments failed to parse");
                ToolResult::error(
                    &tc.id,
                    format!("Invalid arguments for tool '{}': {e}", tc.name),
                )
            }
            Ok(arguments) => {
                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments,
                };
                match self.tools.execute(&call).await {
                    Ok(result) => result,
                    Err(ToolError::NotFound(name)) => {
                        warn!(turn_id, tool = %name, "Unknown tool requested by model");
                        ToolResult::error(&tc.id, format!("Unknown tool '{name}'"))
                    }
                    Err(e) => {
                        warn!(turn_id, tool = %tc.name, error = %e, "Tool execution failed");
                        ToolResult::error(&tc.id, e.to_string())
                    }
                }
            }
        };

        self.event_bus.publish(DomainEvent::ToolExecuted {
            turn_id: turn_id.into(),
            tool_name: tc.name.clone(),
            success: result.success,
            duration_ms: start.elapsed().as_millis() as u64,
            timestamp: chrono::Utc::now(),
        });

        result
    }

    fn publish_response(
        &self,
        turn_id: &str,
        round: u8,
        response: &ragline_core::provider::ProviderResponse,
    ) {
        let tokens_used = response.usage.as_ref().map(|u| u.total_tokens).unwrap_or(0);
        self.event_bus.publish(DomainEvent::ResponseGenerated {
            turn_id: turn_id.into(),
            model: response.model.clone(),
            round,
            tokens_used,
            timestamp: chrono::Utc::now(),
        });
    }
}

/// Verify the invariant: exactly one result per request, every correlation
/// id matching, no duplicates and no omissions.
fn verify_correlation(
    turn_id: &str,
    requests: &[MessageToolCall],
    results: &[ToolResult],
) -> Result<()> {
    if requests.len() != results.len() {
        return Err(Error::Protocol {
            turn_id: turn_id.into(),
            detail: format!(
                "{} tool requests but {} results",
                requests.len(),
                results.len()
            ),
        });
    }

    let request_ids: HashSet<&str> = requests.iter().map(|r| r.id.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(results.len());

    for result in results {
        if !request_ids.contains(result.call_id.as_str()) {
            return Err(Error::Protocol {
                turn_id: turn_id.into(),
                detail: format!("result id '{}' matches no request", result.call_id),
            });
        }
        if !seen.insert(result.call_id.as_str()) {
            return Err(Error::Protocol {
                turn_id: turn_id.into(),
                detail: format!("duplicate result for id '{}'", result.call_id),
            });
        }
    }

    Ok(())
}

fn ensure_non_empty(answer: String) -> String {
    if answer.trim().is_empty() {
        FALLBACK_ANSWER.into()
    } else {
        answer
    }
}

fn preview(text: &str) -> String {
    text.chars().take(80).collect()
}

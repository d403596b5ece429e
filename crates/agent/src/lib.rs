//! Tool-calling orchestration and retrieval-augmented generation for ragline.
//!
//! The [`Orchestrator`] drives the two-round conversation protocol with the
//! LLM; the [`ContextBuilder`] turns similarity-search results into a
//! bounded natural-language context block; the [`AgentService`] composes
//! both into the query pipeline the gateway and CLI call.

pub mod context;
pub mod orchestrator;
pub mod service;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{ContextBuilder, NO_CONTEXT_SENTINEL, RetrievalContext, format_context};
pub use orchestrator::{FALLBACK_ANSWER, Orchestrator, TurnOutcome};
pub use service::{AgentService, IngestReport, QueryOutcome};

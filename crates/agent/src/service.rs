//! The agent service: the query pipeline the gateway and CLI call.
//!
//! retrieve → build context → compose prompt → orchestrate → answer with
//! retrieval metadata. Also wraps knowledge ingestion and collection stats.

use std::sync::Arc;
use tracing::info;

use ragline_core::error::Result;
use ragline_core::event::{DomainEvent, EventBus};
use ragline_core::vector::{CollectionStats, Metadata};
use ragline_vector::VectorService;

use crate::context::ContextBuilder;
use crate::orchestrator::Orchestrator;

/// System instructions for the RAG pipeline. The availability clause is what
/// pushes the model toward the time tool instead of guessing.
const SYSTEM_PROMPT: &str = "You are a smart AI assistant for a global company. \
    Use the provided Context to answer questions. \
    IMPORTANT: If the user asks about availability, office hours, or contact \
    (e.g., 'Can I call?'), you MUST use the 'current_time' tool to get the \
    real-time of that specific timezone. Do not guess the time. Check it using \
    the tool.";

/// The answer to one query, with retrieval metadata.
#[derive(Debug, Clone, serde::Serialize)]
pub struct QueryOutcome {
    pub query: String,
    pub answer: String,
    pub retrieved_documents: Vec<String>,
    pub document_distances: Vec<f32>,
    pub context_used: String,
    pub turn_id: String,
}

/// Result of a knowledge ingestion call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IngestReport {
    pub added: usize,
    pub ids: Vec<String>,
}

pub struct AgentService {
    orchestrator: Orchestrator,
    context: ContextBuilder,
    vectors: Arc<VectorService>,
    event_bus: Arc<EventBus>,
}

impl AgentService {
    pub fn new(
        orchestrator: Orchestrator,
        vectors: Arc<VectorService>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            orchestrator,
            context: ContextBuilder::new(vectors.clone()),
            vectors,
            event_bus,
        }
    }

    /// Answer a query with retrieval-augmented generation.
    pub async fn process_query(&self, query: &str, context_limit: usize) -> Result<QueryOutcome> {
        let turn_id = Orchestrator::new_turn_id();

        let retrieval = self.context.build_context(query, context_limit).await?;
        self.event_bus.publish(DomainEvent::DocumentsRetrieved {
            turn_id: turn_id.clone(),
            count: retrieval.outcome.len(),
            timestamp: chrono::Utc::now(),
        });

        let user_prompt = format!(
            "Context:\n{}\n\nQuestion: {}\n\nPlease provide a helpful response based on the context above.",
            retrieval.text, query
        );

        let turn = self
            .orchestrator
            .execute(&turn_id, Some(SYSTEM_PROMPT), &user_prompt)
            .await?;

        info!(
            turn_id = %turn.turn_id,
            retrieved = retrieval.outcome.len(),
            tool_calls = turn.tool_calls,
            rounds = turn.rounds,
            "Query answered"
        );

        Ok(QueryOutcome {
            query: query.into(),
            answer: turn.answer,
            retrieved_documents: retrieval.outcome.documents,
            document_distances: retrieval.outcome.distances,
            context_used: retrieval.text,
            turn_id: turn.turn_id,
        })
    }

    /// Add documents (with optional provenance metadata) to the knowledge
    /// collection.
    pub async fn add_knowledge(
        &self,
        documents: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
    ) -> Result<IngestReport> {
        let ids = self.vectors.add_documents(documents, metadatas, None).await?;
        self.event_bus.publish(DomainEvent::KnowledgeAdded {
            count: ids.len(),
            timestamp: chrono::Utc::now(),
        });
        Ok(IngestReport {
            added: ids.len(),
            ids,
        })
    }

    /// Delete knowledge documents by id.
    pub async fn delete_knowledge(&self, ids: &[String]) -> Result<()> {
        self.vectors.delete_documents(ids).await?;
        Ok(())
    }

    /// Knowledge collection statistics.
    pub async fn knowledge_stats(&self) -> Result<CollectionStats> {
        Ok(self.vectors.collection_info().await?)
    }
}

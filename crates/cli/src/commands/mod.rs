//! CLI command implementations.

pub mod ingest;
pub mod query;
pub mod serve;
pub mod stats;

use std::sync::Arc;
use std::time::Duration;

use ragline_agent::{AgentService, Orchestrator};
use ragline_config::AppConfig;
use ragline_core::event::EventBus;
use ragline_core::vector::VectorStore;
use ragline_gateway::GatewayState;
use ragline_gateway::users::{InMemoryUserRepository, UserService};
use ragline_vector::{ChromaStore, EmbeddingService, VectorService};

/// Wire the process-wide context: one provider handle, one vector-store
/// handle, one tool registry — constructed here once and shared by `Arc`
/// into everything that needs them.
pub(crate) fn build_state(config: &AppConfig) -> anyhow::Result<Arc<GatewayState>> {
    // Fatal when the credential is missing — never surfaced per-request.
    config.require_api_key()?;

    let provider = ragline_providers::from_config(config)?;

    let store: Arc<dyn VectorStore> = Arc::new(ChromaStore::new(
        config.chroma.base_url(),
        &config.chroma.collection_name,
        Duration::from_secs(config.chroma.request_timeout_secs),
    )?);
    let embeddings = EmbeddingService::new(provider.clone(), &config.llm.embedding_model);
    let vectors = Arc::new(VectorService::new(store, embeddings));

    let tools = Arc::new(ragline_tools::default_registry(
        &config.tools.time_api_base_url,
        Duration::from_secs(config.tools.http_timeout_secs),
    )?);

    let event_bus = Arc::new(EventBus::default());
    let orchestrator = Orchestrator::new(
        provider.clone(),
        &config.llm.chat_model,
        config.llm.temperature,
        tools,
        event_bus.clone(),
    )
    .with_max_tokens(config.llm.max_tokens);

    let agent = Arc::new(AgentService::new(orchestrator, vectors, event_bus));
    let users = Arc::new(UserService::new(Arc::new(InMemoryUserRepository::new())));

    Ok(Arc::new(GatewayState {
        agent,
        users,
        provider,
        chat_model: config.llm.chat_model.clone(),
        context_limit: config.retrieval.context_limit,
    }))
}

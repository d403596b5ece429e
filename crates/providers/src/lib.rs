//! LLM provider implementations for ragline.
//!
//! One real backend: the OpenAI-compatible client pointed at the Upstage
//! Solar endpoint (or any compatible server). Test code supplies mock
//! providers through the `Provider` trait instead.

pub mod openai_compat;

use std::sync::Arc;
use std::time::Duration;

use ragline_core::error::ProviderError;
use ragline_core::provider::Provider;

pub use openai_compat::OpenAiCompatProvider;

/// Build the process-wide provider handle from configuration.
///
/// The returned `Arc<dyn Provider>` is shared by the orchestrator, the
/// embedding service, and the streaming endpoint — one HTTP client, reused.
pub fn from_config(config: &ragline_config::AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .require_api_key()
        .map_err(|e| ProviderError::NotConfigured(e.to_string()))?;

    let provider = OpenAiCompatProvider::new(
        "upstage",
        &config.llm.base_url,
        api_key,
        Duration::from_secs(config.llm.request_timeout_secs),
    )?;

    Ok(Arc::new(provider))
}

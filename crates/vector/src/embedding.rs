//! Text-to-vector adapter over the provider's embedding endpoint.
//!
//! Provider failures are wrapped into `VectorError::EmbeddingFailed` so
//! callers can tell an unreachable embedding service apart from an
//! unreachable store.

use std::sync::Arc;
use tracing::debug;

use ragline_core::error::VectorError;
use ragline_core::provider::{EmbeddingRequest, Provider};

/// Converts text into fixed-dimension embedding vectors.
pub struct EmbeddingService {
    provider: Arc<dyn Provider>,
    model: String,
}

impl EmbeddingService {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Embed a batch of texts. Vectors are index-aligned with the input.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, VectorError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: self.model.clone(),
            inputs: texts.to_vec(),
        };

        let response = self
            .provider
            .embed(request)
            .await
            .map_err(|e| VectorError::EmbeddingFailed(e.to_string()))?;

        if response.embeddings.len() != texts.len() {
            return Err(VectorError::ShapeMismatch(format!(
                "requested {} embeddings, got {}",
                texts.len(),
                response.embeddings.len()
            )));
        }

        debug!(count = texts.len(), model = %self.model, "Embedded batch");
        Ok(response.embeddings)
    }

    /// Embed a single text — defined as `embed([text])[0]`, one round trip.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, VectorError> {
        let texts = [text.to_string()];
        let mut vectors = self.embed(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| VectorError::ShapeMismatch("empty embedding response".into()))
    }
}

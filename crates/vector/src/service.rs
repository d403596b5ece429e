//! The vector service facade: embed-then-store, embed-then-query.

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use ragline_core::error::VectorError;
use ragline_core::vector::{CollectionStats, Metadata, SearchOutcome, VectorStore};

use crate::embedding::EmbeddingService;

/// Couples the embedding adapter with a vector store.
pub struct VectorService {
    store: Arc<dyn VectorStore>,
    embeddings: EmbeddingService,
}

impl VectorService {
    pub fn new(store: Arc<dyn VectorStore>, embeddings: EmbeddingService) -> Self {
        Self { store, embeddings }
    }

    /// Embed and store a batch of documents.
    ///
    /// `metadatas` and `ids` are optional; when `ids` is omitted the service
    /// assigns fresh UUIDs. Returns the ids under which the documents were
    /// stored.
    pub async fn add_documents(
        &self,
        documents: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        ids: Option<Vec<String>>,
    ) -> Result<Vec<String>, VectorError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let metadatas =
            metadatas.unwrap_or_else(|| documents.iter().map(|_| Metadata::new()).collect());
        if metadatas.len() != documents.len() {
            return Err(VectorError::InvalidBatch(format!(
                "{} documents but {} metadatas",
                documents.len(),
                metadatas.len()
            )));
        }

        let ids = ids.unwrap_or_else(|| {
            documents
                .iter()
                .map(|_| Uuid::new_v4().to_string())
                .collect()
        });
        if ids.len() != documents.len() {
            return Err(VectorError::InvalidBatch(format!(
                "{} documents but {} ids",
                documents.len(),
                ids.len()
            )));
        }

        let embeddings = self.embeddings.embed(&documents).await?;
        self.store
            .add(ids.clone(), documents, embeddings, metadatas)
            .await?;

        info!(count = ids.len(), collection = %self.store.collection_name(), "Knowledge stored");
        Ok(ids)
    }

    /// Similarity-search the `n_results` nearest documents to `query`.
    ///
    /// The outcome's three sequences are index-aligned, ordered by ascending
    /// distance as the store returned them.
    pub async fn search(&self, query: &str, n_results: usize) -> Result<SearchOutcome, VectorError> {
        let embedding = self.embeddings.embed_one(query).await?;
        let outcome = self.store.query(&embedding, n_results).await?;
        debug!(
            query_len = query.len(),
            results = outcome.len(),
            "Similarity search complete"
        );
        Ok(outcome)
    }

    /// Delete documents by id.
    pub async fn delete_documents(&self, ids: &[String]) -> Result<(), VectorError> {
        self.store.delete(ids).await
    }

    /// Collection statistics.
    pub async fn collection_info(&self) -> Result<CollectionStats, VectorError> {
        Ok(CollectionStats {
            name: self.store.collection_name().to_string(),
            count: self.store.count().await?,
        })
    }
}

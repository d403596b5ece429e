//! Vector store trait and retrieval result types.
//!
//! The store is an external collection reached over the network (Chroma in
//! production, an in-memory implementation in tests). One logical collection
//! handle exists per process and is shared across all in-flight queries; the
//! trait takes `&self` everywhere and implementations hold no per-query state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::VectorError;

/// Arbitrary key-value provenance attached to a stored document
/// (e.g., `office_name`, `timezone`, `country`).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A document returned by a similarity search.
///
/// Ephemeral — produced per query, never persisted by this layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// The stored text content
    pub content: String,

    /// Relevance distance; lower = more similar. The metric is
    /// store-defined but monotonic, so ranking by it is valid.
    pub distance: f32,

    /// Provenance metadata stored alongside the document
    pub metadata: Metadata,
}

/// The result of one similarity search.
///
/// The three sequences are index-aligned and the same length, in ascending
/// distance order as returned by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub documents: Vec<String>,
    pub metadatas: Vec<Metadata>,
    pub distances: Vec<f32>,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// View the aligned sequences as per-document values, preserving order.
    pub fn iter(&self) -> impl Iterator<Item = RetrievedDocument> + '_ {
        self.documents
            .iter()
            .zip(self.metadatas.iter())
            .zip(self.distances.iter())
            .map(|((content, metadata), distance)| RetrievedDocument {
                content: content.clone(),
                distance: *distance,
                metadata: metadata.clone(),
            })
    }
}

/// Collection statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Collection name
    pub name: String,

    /// Number of stored documents
    pub count: usize,
}

/// The vector collection abstraction.
///
/// Implementations: the Chroma HTTP store and the in-memory test store.
/// Embedding happens above this trait — callers pass vectors in.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The collection name this store is bound to.
    fn collection_name(&self) -> &str;

    /// Add documents with their precomputed embeddings.
    ///
    /// `ids`, `documents`, `embeddings`, and `metadatas` are index-aligned.
    async fn add(
        &self,
        ids: Vec<String>,
        documents: Vec<String>,
        embeddings: Vec<Vec<f32>>,
        metadatas: Vec<Metadata>,
    ) -> std::result::Result<(), VectorError>;

    /// Query the `n_results` nearest documents to `embedding`.
    async fn query(
        &self,
        embedding: &[f32],
        n_results: usize,
    ) -> std::result::Result<SearchOutcome, VectorError>;

    /// Delete documents by id.
    async fn delete(&self, ids: &[String]) -> std::result::Result<(), VectorError>;

    /// Number of documents in the collection.
    async fn count(&self) -> std::result::Result<usize, VectorError>;
}

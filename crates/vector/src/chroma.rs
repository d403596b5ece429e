//! Chroma vector-store adapter.
//!
//! Speaks the Chroma collection REST API. The collection is retrieved or
//! created by name on first use and its handle is cached for the life of
//! the process — one logical connection, reused across all calls, never
//! re-established per request.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use ragline_core::error::VectorError;
use ragline_core::vector::{Metadata, SearchOutcome, VectorStore};

/// A Chroma collection reached over HTTP.
pub struct ChromaStore {
    http: reqwest::Client,
    base_url: String,
    collection_name: String,
    // Collection UUID, resolved once per process.
    collection_id: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    // Chroma returns one result list per query embedding; we always send one.
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
}

impl ChromaStore {
    /// Create a store bound to a collection name. No network traffic happens
    /// until the first operation.
    pub fn new(
        base_url: impl Into<String>,
        collection_name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, VectorError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VectorError::StoreFailed(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection_name: collection_name.into(),
            collection_id: OnceCell::new(),
        })
    }

    /// Resolve (get-or-create) the collection id, caching it for reuse.
    async fn collection_id(&self) -> Result<&str, VectorError> {
        self.collection_id
            .get_or_try_init(|| async {
                let url = format!("{}/api/v1/collections", self.base_url);
                let body = serde_json::json!({
                    "name": self.collection_name,
                    "get_or_create": true,
                    "metadata": { "description": "ragline knowledge collection" },
                });

                let response = self
                    .http
                    .post(&url)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| VectorError::StoreFailed(format!("store unreachable: {e}")))?;

                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    let text = response.text().await.unwrap_or_default();
                    return Err(VectorError::StoreFailed(format!(
                        "get_or_create collection failed (status {status}): {text}"
                    )));
                }

                let info: CollectionInfo = response
                    .json()
                    .await
                    .map_err(|e| VectorError::StoreFailed(format!("bad collection response: {e}")))?;

                info!(collection = %self.collection_name, id = %info.id, "Chroma collection ready");
                Ok(info.id)
            })
            .await
            .map(String::as_str)
    }

    async fn post(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, VectorError> {
        let id = self.collection_id().await?;
        let url = format!("{}/api/v1/collections/{}/{}", self.base_url, id, endpoint);

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| VectorError::StoreFailed(format!("store unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(VectorError::StoreFailed(format!(
                "{endpoint} failed (status {status}): {text}"
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl VectorStore for ChromaStore {
    fn collection_name(&self) -> &str {
        &self.collection_name
    }

    async fn add(
        &self,
        ids: Vec<String>,
        documents: Vec<String>,
        embeddings: Vec<Vec<f32>>,
        metadatas: Vec<Metadata>,
    ) -> Result<(), VectorError> {
        let count = ids.len();
        let body = serde_json::json!({
            "ids": ids,
            "documents": documents,
            "embeddings": embeddings,
            "metadatas": metadatas,
        });

        self.post("add", body).await?;
        debug!(count, collection = %self.collection_name, "Documents added");
        Ok(())
    }

    async fn query(
        &self,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<SearchOutcome, VectorError> {
        let body = serde_json::json!({
            "query_embeddings": [embedding],
            "n_results": n_results,
            "include": ["documents", "metadatas", "distances"],
        });

        let response = self.post("query", body).await?;
        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| VectorError::StoreFailed(format!("bad query response: {e}")))?;

        // Unwrap the per-query nesting (we sent exactly one embedding).
        let documents: Vec<String> = parsed
            .documents
            .and_then(|mut d| d.pop())
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        let metadatas: Vec<Metadata> = parsed
            .metadatas
            .and_then(|mut m| m.pop())
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        let distances: Vec<f32> = parsed
            .distances
            .and_then(|mut d| d.pop())
            .unwrap_or_default();

        if documents.len() != metadatas.len() || documents.len() != distances.len() {
            return Err(VectorError::ShapeMismatch(format!(
                "documents={}, metadatas={}, distances={}",
                documents.len(),
                metadatas.len(),
                distances.len()
            )));
        }

        Ok(SearchOutcome {
            documents,
            metadatas,
            distances,
        })
    }

    async fn delete(&self, ids: &[String]) -> Result<(), VectorError> {
        let body = serde_json::json!({ "ids": ids });
        self.post("delete", body).await?;
        debug!(count = ids.len(), collection = %self.collection_name, "Documents deleted");
        Ok(())
    }

    async fn count(&self) -> Result<usize, VectorError> {
        let id = self.collection_id().await?;
        let url = format!("{}/api/v1/collections/{}/count", self.base_url, id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| VectorError::StoreFailed(format!("store unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(VectorError::StoreFailed(format!(
                "count failed (status {})",
                response.status().as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| VectorError::StoreFailed(format!("bad count response: {e}")))
    }
}

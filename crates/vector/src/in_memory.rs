//! In-memory vector store — cosine distance over a `Vec`, for tests and
//! offline runs. Implements the same `VectorStore` trait as the Chroma
//! adapter so the rest of the stack cannot tell them apart.

use async_trait::async_trait;
use tokio::sync::RwLock;

use ragline_core::error::VectorError;
use ragline_core::vector::{Metadata, SearchOutcome, VectorStore};

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1]; 0.0 if either vector is empty, zero-length,
/// or the dimensions disagree.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Cosine distance: lower = more similar, 0.0 = identical direction.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

struct StoredDocument {
    id: String,
    content: String,
    embedding: Vec<f32>,
    metadata: Metadata,
}

/// An in-memory cosine-distance store.
pub struct InMemoryStore {
    collection_name: String,
    documents: RwLock<Vec<StoredDocument>>,
}

impl InMemoryStore {
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            documents: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
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
        if ids.len() != documents.len()
            || ids.len() != embeddings.len()
            || ids.len() != metadatas.len()
        {
            return Err(VectorError::InvalidBatch(format!(
                "ids={}, documents={}, embeddings={}, metadatas={}",
                ids.len(),
                documents.len(),
                embeddings.len(),
                metadatas.len()
            )));
        }

        let mut store = self.documents.write().await;
        for (((id, content), embedding), metadata) in ids
            .into_iter()
            .zip(documents)
            .zip(embeddings)
            .zip(metadatas)
        {
            // Same-id add replaces, matching collection upsert behavior.
            store.retain(|d| d.id != id);
            store.push(StoredDocument {
                id,
                content,
                embedding,
                metadata,
            });
        }
        Ok(())
    }

    async fn query(
        &self,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<SearchOutcome, VectorError> {
        let store = self.documents.read().await;

        let mut scored: Vec<(f32, &StoredDocument)> = store
            .iter()
            .map(|doc| (cosine_distance(&doc.embedding, embedding), doc))
            .collect();

        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(n_results);

        let mut outcome = SearchOutcome::default();
        for (distance, doc) in scored {
            outcome.documents.push(doc.content.clone());
            outcome.metadatas.push(doc.metadata.clone());
            outcome.distances.push(distance);
        }
        Ok(outcome)
    }

    async fn delete(&self, ids: &[String]) -> Result<(), VectorError> {
        let mut store = self.documents.write().await;
        store.retain(|d| !ids.contains(&d.id));
        Ok(())
    }

    async fn count(&self) -> Result<usize, VectorError> {
        Ok(self.documents.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(key: &str, value: &str) -> Metadata {
        let mut m = Metadata::new();
        m.insert(key.into(), value.into());
        m
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
        assert!(cosine_distance(&v, &v).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
        assert!((cosine_distance(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_mismatched_or_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[tokio::test]
    async fn query_ranks_by_ascending_distance() {
        let store = InMemoryStore::new("test");
        store
            .add(
                vec!["a".into(), "b".into(), "c".into()],
                vec!["doc a".into(), "doc b".into(), "doc c".into()],
                vec![
                    vec![0.0, 1.0, 0.0], // orthogonal to query
                    vec![1.0, 0.0, 0.0], // identical to query
                    vec![0.5, 0.5, 0.0], // partial
                ],
                vec![Metadata::new(), Metadata::new(), Metadata::new()],
            )
            .await
            .unwrap();

        let outcome = store.query(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(outcome.documents, vec!["doc b", "doc c", "doc a"]);
        assert!(outcome.distances[0] < outcome.distances[1]);
        assert!(outcome.distances[1] < outcome.distances[2]);
    }

    #[tokio::test]
    async fn query_respects_n_results() {
        let store = InMemoryStore::new("test");
        let n = 10;
        store
            .add(
                (0..n).map(|i| format!("id{i}")).collect(),
                (0..n).map(|i| format!("doc {i}")).collect(),
                (0..n).map(|i| vec![1.0, i as f32 * 0.1]).collect(),
                (0..n).map(|_| Metadata::new()).collect(),
            )
            .await
            .unwrap();

        let outcome = store.query(&[1.0, 0.0], 3).await.unwrap();
        assert_eq!(outcome.len(), 3);
    }

    #[tokio::test]
    async fn add_preserves_metadata_alignment() {
        let store = InMemoryStore::new("test");
        store
            .add(
                vec!["seoul".into(), "paris".into()],
                vec!["Seoul rules".into(), "Paris rules".into()],
                vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                vec![
                    meta("office_name", "Seoul HQ"),
                    meta("office_name", "Paris Office"),
                ],
            )
            .await
            .unwrap();

        let outcome = store.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(outcome.documents[0], "Seoul rules");
        assert_eq!(outcome.metadatas[0]["office_name"], "Seoul HQ");
        assert_eq!(outcome.metadatas[1]["office_name"], "Paris Office");
    }

    #[tokio::test]
    async fn same_id_add_replaces() {
        let store = InMemoryStore::new("test");
        for content in ["old", "new"] {
            store
                .add(
                    vec!["x".into()],
                    vec![content.into()],
                    vec![vec![1.0, 0.0]],
                    vec![Metadata::new()],
                )
                .await
                .unwrap();
        }
        assert_eq!(store.count().await.unwrap(), 1);
        let outcome = store.query(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(outcome.documents[0], "new");
    }

    #[tokio::test]
    async fn delete_removes_documents() {
        let store = InMemoryStore::new("test");
        store
            .add(
                vec!["a".into(), "b".into()],
                vec!["doc a".into(), "doc b".into()],
                vec![vec![1.0], vec![0.5]],
                vec![Metadata::new(), Metadata::new()],
            )
            .await
            .unwrap();

        store.delete(&["a".to_string()]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn misaligned_batch_rejected() {
        let store = InMemoryStore::new("test");
        let err = store
            .add(
                vec!["a".into()],
                vec!["doc a".into(), "doc b".into()],
                vec![vec![1.0]],
                vec![Metadata::new()],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::InvalidBatch(_)));
    }
}

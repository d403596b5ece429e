//! Retrieval context builder.
//!
//! Turns a similarity-search outcome into a numbered, provenance-annotated
//! context block for the prompt. The order the store returned (ascending
//! distance) is significant and is never re-sorted here.

use std::sync::Arc;
use tracing::debug;

use ragline_core::error::VectorError;
use ragline_core::vector::SearchOutcome;
use ragline_vector::VectorService;

/// Emitted when retrieval finds nothing; downstream consumers can tell it
/// apart from a real context block by content.
pub const NO_CONTEXT_SENTINEL: &str = "No relevant internal regulations found.";

/// A built context block plus the raw retrieval it came from.
#[derive(Debug, Clone)]
pub struct RetrievalContext {
    /// The formatted context text (or the sentinel)
    pub text: String,

    /// The underlying search outcome, for response metadata
    pub outcome: SearchOutcome,
}

/// Issues the similarity search and formats the result.
pub struct ContextBuilder {
    vectors: Arc<VectorService>,
}

impl ContextBuilder {
    pub fn new(vectors: Arc<VectorService>) -> Self {
        Self { vectors }
    }

    /// Retrieve the `top_k` nearest documents for `query` and format them.
    pub async fn build_context(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<RetrievalContext, VectorError> {
        let outcome = self.vectors.search(query, top_k).await?;
        debug!(retrieved = outcome.len(), "Context built");
        Ok(RetrievalContext {
            text: format_context(&outcome),
            outcome,
        })
    }
}

/// Format retrieved documents as numbered source blocks.
///
/// Metadata keys that are absent get explicit fallback labels rather than
/// being dropped, so the model always sees a complete provenance line.
pub fn format_context(outcome: &SearchOutcome) -> String {
    if outcome.is_empty() {
        return NO_CONTEXT_SENTINEL.into();
    }

    let blocks: Vec<String> = outcome
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let office = meta_str(&doc.metadata, "office_name").unwrap_or("Unknown Office");
            let timezone = meta_str(&doc.metadata, "timezone").unwrap_or("Unknown Timezone");
            let country = meta_str(&doc.metadata, "country").unwrap_or("");

            format!(
                "[Source {}: {} ({})]\nTimezone: {}\nRule Description: {}\n",
                i + 1,
                office,
                country,
                timezone,
                doc.content
            )
        })
        .collect();

    blocks.join("\n")
}

fn meta_str<'a>(metadata: &'a ragline_core::vector::Metadata, key: &str) -> Option<&'a str> {
    metadata.get(key).and_then(|v| v.as_str())
}
